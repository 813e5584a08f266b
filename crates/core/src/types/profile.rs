//! Member profile types.
//!
//! [`Profile`] is the canonical, fully-normalized shape handed to
//! presentation code. [`ProfileDraft`] and [`ProfileUpdate`] are the write
//! shapes; the web crate serializes their structured fields to strings before
//! they reach the hosted document store.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{AccountId, ProfileId};

/// Contact details shown on a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ContactDetails {
    /// Returns `true` if no contact detail is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.phone.is_none() && self.website.is_none() && self.address.is_none()
    }
}

/// Social network links shown on a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
}

impl SocialLinks {
    /// Returns `true` if no social link is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.instagram.is_none()
            && self.linkedin.is_none()
            && self.twitter.is_none()
            && self.facebook.is_none()
    }

    /// Iterate over the links that are set, labelled by network.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("Instagram", self.instagram.as_deref()),
            ("LinkedIn", self.linkedin.as_deref()),
            ("Twitter", self.twitter.as_deref()),
            ("Facebook", self.facebook.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, link)| link.map(|l| (label, l)))
    }
}

/// A gym-community member profile, fully normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub account_id: AccountId,
    pub email: String,
    pub name: String,
    pub username: String,
    /// Validated absolute image URL. `None` means "render initials".
    pub image_url: Option<String>,
    pub business_description: String,
    pub contact_details: ContactDetails,
    pub social_links: SocialLinks,
    pub work_images: Vec<String>,
    pub gym_locations: Vec<String>,
}

/// Returns `true` if both name and business description are non-blank.
#[must_use]
pub fn is_complete(name: &str, business_description: &str) -> bool {
    !name.trim().is_empty() && !business_description.trim().is_empty()
}

impl Profile {
    /// A profile is eligible for random discovery once the member has filled
    /// in both their name and what their business does.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        is_complete(&self.name, &self.business_description)
    }

    /// Up to two uppercase initials for the avatar fallback.
    #[must_use]
    pub fn initials(&self) -> String {
        let source = if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        };

        source
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Case-insensitive substring match against name or business description.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.name.to_lowercase().contains(&needle)
            || self.business_description.to_lowercase().contains(&needle)
    }

    /// Gym locations this profile shares with `other`, in this profile's order.
    #[must_use]
    pub fn mutual_locations<'a>(&'a self, other: &[String]) -> Vec<&'a str> {
        self.gym_locations
            .iter()
            .filter(|location| other.contains(location))
            .map(String::as_str)
            .collect()
    }
}

/// A profile that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub account_id: AccountId,
    pub email: String,
    pub name: String,
    pub username: String,
    pub image_url: String,
    pub business_description: String,
    pub contact_details: ContactDetails,
    pub social_links: SocialLinks,
    pub work_images: Vec<String>,
    pub gym_locations: Vec<String>,
}

impl ProfileDraft {
    /// Default profile for an account signing in for the first time.
    ///
    /// The username is derived from the email's local part and the avatar is
    /// the hosted initials image. Structured fields start empty.
    #[must_use]
    pub fn for_new_account(
        account_id: AccountId,
        name: &str,
        email: &Email,
        avatar_url: String,
    ) -> Self {
        let username = email.local_part().to_owned();
        let name = if name.trim().is_empty() {
            username.clone()
        } else {
            name.trim().to_owned()
        };

        Self {
            account_id,
            email: email.as_str().to_owned(),
            name,
            username,
            image_url: avatar_url,
            business_description: String::new(),
            contact_details: ContactDetails::default(),
            social_links: SocialLinks::default(),
            work_images: Vec::new(),
            gym_locations: Vec::new(),
        }
    }
}

/// A partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub image_url: Option<String>,
    pub business_description: Option<String>,
    pub contact_details: Option<ContactDetails>,
    pub social_links: Option<SocialLinks>,
    pub work_images: Option<Vec<String>>,
    pub gym_locations: Option<Vec<String>>,
}
