//! Core types for Gym Network.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod like;
pub mod profile;

pub use email::{Email, EmailError};
pub use id::*;
pub use like::Like;
pub use profile::{ContactDetails, Profile, ProfileDraft, ProfileUpdate, SocialLinks};
