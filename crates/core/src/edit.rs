//! Profile editing rules.
//!
//! The editor form is submitted as one multipart request. Uploading files is
//! the web crate's job; this module turns the text fields and the resulting
//! file URLs into a [`ProfileUpdate`].

use crate::types::{ContactDetails, Profile, ProfileUpdate, SocialLinks};

/// New work images accepted in a single edit.
pub const MAX_NEW_WORK_IMAGES: usize = 4;

/// Work images kept on a profile. Older images are dropped first.
pub const MAX_STORED_WORK_IMAGES: usize = 5;

/// Errors raised while validating an edit.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("You can upload at most {max} work images at a time (got {attempted})")]
    TooManyWorkImages { attempted: usize, max: usize },

    #[error("Name cannot be empty")]
    EmptyName,
}

/// Reject an edit that uploads more than [`MAX_NEW_WORK_IMAGES`] files.
///
/// # Errors
///
/// Returns [`EditError::TooManyWorkImages`] when `count` exceeds the limit.
pub const fn check_new_work_images(count: usize) -> Result<(), EditError> {
    if count > MAX_NEW_WORK_IMAGES {
        return Err(EditError::TooManyWorkImages {
            attempted: count,
            max: MAX_NEW_WORK_IMAGES,
        });
    }
    Ok(())
}

/// Combine kept and newly uploaded work images, keeping the newest five.
///
/// ```
/// use gymnet_core::edit::merge_work_images;
///
/// let existing: Vec<String> = (1..=4).map(|i| format!("old{i}")).collect();
/// let merged = merge_work_images(&existing, &[], vec!["new1".into(), "new2".into()]);
/// assert_eq!(merged, ["old2", "old3", "old4", "new1", "new2"]);
/// ```
#[must_use]
pub fn merge_work_images(existing: &[String], removed: &[String], new: Vec<String>) -> Vec<String> {
    let mut images: Vec<String> = existing
        .iter()
        .filter(|image| !removed.contains(image))
        .cloned()
        .chain(new)
        .collect();

    if images.len() > MAX_STORED_WORK_IMAGES {
        images.drain(..images.len() - MAX_STORED_WORK_IMAGES);
    }
    images
}

/// Split a comma-separated list of gym locations.
#[must_use]
pub fn parse_gym_locations(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|location| !location.is_empty())
        .map(str::to_owned)
        .collect()
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Text fields of the profile editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEdit {
    pub name: String,
    pub username: String,
    pub business_description: String,
    pub phone: String,
    pub website: String,
    pub address: String,
    pub instagram: String,
    pub linkedin: String,
    pub twitter: String,
    pub facebook: String,
    /// Comma-separated.
    pub gym_locations: String,
    /// Existing work image URLs the member removed.
    pub removed_work_images: Vec<String>,
}

impl ProfileEdit {
    /// Pre-fill the editor from a stored profile.
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Self {
        let contact = &profile.contact_details;
        let social = &profile.social_links;
        Self {
            name: profile.name.clone(),
            username: profile.username.clone(),
            business_description: profile.business_description.clone(),
            phone: contact.phone.clone().unwrap_or_default(),
            website: contact.website.clone().unwrap_or_default(),
            address: contact.address.clone().unwrap_or_default(),
            instagram: social.instagram.clone().unwrap_or_default(),
            linkedin: social.linkedin.clone().unwrap_or_default(),
            twitter: social.twitter.clone().unwrap_or_default(),
            facebook: social.facebook.clone().unwrap_or_default(),
            gym_locations: profile.gym_locations.join(", "),
            removed_work_images: Vec::new(),
        }
    }

    /// Build the update for `current`.
    ///
    /// `image_url` is the URL of a newly uploaded profile image, if any;
    /// `new_work_images` are the URLs of newly uploaded work images.
    ///
    /// # Errors
    ///
    /// Returns an error when the name is blank or too many work images were
    /// uploaded.
    pub fn into_update(
        self,
        current: &Profile,
        image_url: Option<String>,
        new_work_images: Vec<String>,
    ) -> Result<ProfileUpdate, EditError> {
        check_new_work_images(new_work_images.len())?;
        let name = non_blank(&self.name).ok_or(EditError::EmptyName)?;

        Ok(ProfileUpdate {
            name: Some(name),
            username: non_blank(&self.username).or_else(|| Some(current.username.clone())),
            image_url,
            business_description: Some(self.business_description.trim().to_owned()),
            contact_details: Some(ContactDetails {
                phone: non_blank(&self.phone),
                website: non_blank(&self.website),
                address: non_blank(&self.address),
            }),
            social_links: Some(SocialLinks {
                instagram: non_blank(&self.instagram),
                linkedin: non_blank(&self.linkedin),
                twitter: non_blank(&self.twitter),
                facebook: non_blank(&self.facebook),
            }),
            work_images: Some(merge_work_images(
                &current.work_images,
                &self.removed_work_images,
                new_work_images,
            )),
            gym_locations: Some(parse_gym_locations(&self.gym_locations)),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{AccountId, ProfileId};

    fn urls(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("https://img/{prefix}{i}")).collect()
    }

    fn profile_with_images(images: Vec<String>) -> Profile {
        Profile {
            id: ProfileId::new("p"),
            account_id: AccountId::new("a"),
            email: "jo@gym.com".to_string(),
            name: "Jo".to_string(),
            username: "jo".to_string(),
            image_url: None,
            business_description: "Coach".to_string(),
            contact_details: ContactDetails::default(),
            social_links: SocialLinks::default(),
            work_images: images,
            gym_locations: vec!["Gym A".to_string()],
        }
    }

    #[test]
    fn test_four_existing_plus_two_new_keeps_five_most_recent() {
        let merged = merge_work_images(&urls("old", 4), &[], urls("new", 2));
        assert_eq!(merged.len(), MAX_STORED_WORK_IMAGES);
        assert_eq!(merged[0], "https://img/old2");
        assert_eq!(merged[4], "https://img/new2");
    }

    #[test]
    fn test_removed_images_are_dropped_before_capping() {
        let existing = urls("old", 4);
        let removed = vec![existing[0].clone(), existing[1].clone()];
        let merged = merge_work_images(&existing, &removed, urls("new", 3));
        assert_eq!(merged.len(), 5);
        assert_eq!(merged[0], "https://img/old3");
    }

    #[test]
    fn test_new_work_image_limit() {
        assert!(check_new_work_images(4).is_ok());
        assert_eq!(
            check_new_work_images(5),
            Err(EditError::TooManyWorkImages {
                attempted: 5,
                max: 4
            })
        );
    }

    #[test]
    fn test_parse_gym_locations() {
        assert_eq!(
            parse_gym_locations(" Gym A, ,Gym B ,, "),
            vec!["Gym A".to_string(), "Gym B".to_string()]
        );
        assert!(parse_gym_locations("").is_empty());
    }

    #[test]
    fn test_into_update_builds_structured_fields() {
        let current = profile_with_images(urls("old", 2));
        let edit = ProfileEdit {
            name: " Jo Smith ".to_string(),
            business_description: "Strength coach".to_string(),
            phone: "555-1234".to_string(),
            website: "  ".to_string(),
            instagram: "https://instagram.com/jo".to_string(),
            gym_locations: "Gym A, Gym C".to_string(),
            ..ProfileEdit::default()
        };

        let update = edit.into_update(&current, None, urls("new", 1)).unwrap();
        assert_eq!(update.name.as_deref(), Some("Jo Smith"));
        assert_eq!(update.username.as_deref(), Some("jo"));
        assert_eq!(update.image_url, None);
        let contact = update.contact_details.unwrap();
        assert_eq!(contact.phone.as_deref(), Some("555-1234"));
        assert_eq!(contact.website, None);
        assert_eq!(update.work_images.unwrap().len(), 3);
        assert_eq!(
            update.gym_locations.unwrap(),
            vec!["Gym A".to_string(), "Gym C".to_string()]
        );
    }

    #[test]
    fn test_into_update_rejects_blank_name_and_too_many_images() {
        let current = profile_with_images(vec![]);
        let blank = ProfileEdit::default();
        assert_eq!(
            blank.into_update(&current, None, vec![]),
            Err(EditError::EmptyName)
        );

        let edit = ProfileEdit::from_profile(&current);
        assert!(matches!(
            edit.into_update(&current, None, urls("new", 5)),
            Err(EditError::TooManyWorkImages { .. })
        ));
    }

    #[test]
    fn test_from_profile_round_trips_locations() {
        let mut current = profile_with_images(vec![]);
        current.gym_locations = vec!["Gym A".to_string(), "Gym B".to_string()];
        let edit = ProfileEdit::from_profile(&current);
        assert_eq!(edit.gym_locations, "Gym A, Gym B");
        assert_eq!(parse_gym_locations(&edit.gym_locations), current.gym_locations);
    }
}
