//! Gym Network Core - Shared types library.
//!
//! This crate provides the types and pure rules shared by the web front-end
//! and its tests:
//! - Type-safe identifiers for documents stored in the hosted backend
//! - The canonical [`Profile`] shape and its "complete profile" predicate
//! - The field normalizer that turns loosely-typed stored values into
//!   canonical mappings and sequences
//! - Profile editing rules (work-image cap, gym-location parsing)
//! - Share-link construction
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Anything that talks to the hosted backend lives in `gymnet-web`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod edit;
pub mod fields;
pub mod share;
pub mod types;

pub use types::*;
