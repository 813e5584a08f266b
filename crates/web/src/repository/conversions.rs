//! Conversions between stored documents and profile types.
//!
//! This is the only place raw stored representations are seen. Reads go
//! through the field normalizer; writes serialize structured fields to JSON
//! strings because the collection stores them as string attributes.

use serde_json::{Map, Value};

use gymnet_core::fields::{
    StoredField, encode_contact_details, encode_sequence, encode_social_links,
    normalize_contact_details, normalize_image_url, normalize_sequence, normalize_social_links,
};
use gymnet_core::{AccountId, Profile, ProfileDraft, ProfileId, ProfileUpdate};

use crate::appwrite::Document;

// Attribute names in the users collection
pub(super) const ACCOUNT_ID: &str = "accountId";
pub(super) const NAME: &str = "name";
pub(super) const USERNAME: &str = "username";
pub(super) const EMAIL: &str = "email";
pub(super) const IMAGE_URL: &str = "imageUrl";
pub(super) const BUSINESS_DESCRIPTION: &str = "businessDescription";
pub(super) const CONTACT_DETAILS: &str = "contactDetails";
pub(super) const SOCIAL_LINKS: &str = "socialLinks";
pub(super) const WORK_IMAGES: &str = "workImages";
pub(super) const GYM_LOCATIONS: &str = "gymLocations";

fn stored(doc: &Document, key: &str) -> StoredField {
    StoredField::from_value(doc.get(key))
}

/// Build a normalized profile from a users-collection document.
pub(super) fn profile_from_document(doc: &Document) -> Profile {
    Profile {
        id: ProfileId::new(doc.id.as_str()),
        account_id: AccountId::new(doc.get_str(ACCOUNT_ID)),
        email: doc.get_str(EMAIL).to_string(),
        name: doc.get_str(NAME).to_string(),
        username: doc.get_str(USERNAME).to_string(),
        image_url: normalize_image_url(doc.get_str(IMAGE_URL)),
        business_description: doc.get_str(BUSINESS_DESCRIPTION).to_string(),
        contact_details: normalize_contact_details(&stored(doc, CONTACT_DETAILS)),
        social_links: normalize_social_links(&stored(doc, SOCIAL_LINKS)),
        work_images: normalize_sequence(&stored(doc, WORK_IMAGES), WORK_IMAGES),
        gym_locations: normalize_sequence(&stored(doc, GYM_LOCATIONS), GYM_LOCATIONS),
    }
}

/// Document attributes for a new profile.
pub(super) fn draft_to_data(draft: &ProfileDraft) -> Value {
    let mut data = Map::new();
    data.insert(ACCOUNT_ID.into(), draft.account_id.as_str().into());
    data.insert(EMAIL.into(), draft.email.as_str().into());
    data.insert(NAME.into(), draft.name.as_str().into());
    data.insert(USERNAME.into(), draft.username.as_str().into());
    data.insert(IMAGE_URL.into(), draft.image_url.as_str().into());
    data.insert(
        BUSINESS_DESCRIPTION.into(),
        draft.business_description.as_str().into(),
    );
    data.insert(
        CONTACT_DETAILS.into(),
        encode_contact_details(&draft.contact_details).into(),
    );
    data.insert(
        SOCIAL_LINKS.into(),
        encode_social_links(&draft.social_links).into(),
    );
    data.insert(WORK_IMAGES.into(), encode_sequence(&draft.work_images).into());
    data.insert(
        GYM_LOCATIONS.into(),
        encode_sequence(&draft.gym_locations).into(),
    );
    Value::Object(data)
}

/// Document attributes for a partial update. Unset fields are omitted.
pub(super) fn update_to_data(update: &ProfileUpdate) -> Value {
    let mut data = Map::new();
    let mut put = |key: &str, value: Option<String>| {
        if let Some(value) = value {
            data.insert(key.into(), Value::String(value));
        }
    };

    put(NAME, update.name.clone());
    put(USERNAME, update.username.clone());
    put(IMAGE_URL, update.image_url.clone());
    put(BUSINESS_DESCRIPTION, update.business_description.clone());
    put(
        CONTACT_DETAILS,
        update.contact_details.as_ref().map(encode_contact_details),
    );
    put(
        SOCIAL_LINKS,
        update.social_links.as_ref().map(encode_social_links),
    );
    put(
        WORK_IMAGES,
        update.work_images.as_deref().map(encode_sequence),
    );
    put(
        GYM_LOCATIONS,
        update.gym_locations.as_deref().map(encode_sequence),
    );

    Value::Object(data)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gymnet_core::{ContactDetails, Email};
    use serde_json::json;

    fn document(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_profile_from_legacy_document() {
        let doc = document(json!({
            "$id": "p1",
            "accountId": "acc-1",
            "email": "jo@gym.com",
            "name": "Jo",
            "username": "jo",
            "imageUrl": "\"https://cdn.example/jo.png\"",
            "businessDescription": "Coach",
            "contactDetails": "\"{\\\"phone\\\":\\\"555-1234\\\"}\"",
            "socialLinks": {"instagram": "https://instagram.com/jo", "myspace": "x"},
            "workImages": ["https://cdn.example/w1.png"],
            "gymLocations": "not json"
        }));

        let profile = profile_from_document(&doc);
        assert_eq!(profile.id.as_str(), "p1");
        assert_eq!(profile.account_id.as_str(), "acc-1");
        assert_eq!(profile.image_url.as_deref(), Some("https://cdn.example/jo.png"));
        assert_eq!(profile.contact_details.phone.as_deref(), Some("555-1234"));
        assert_eq!(
            profile.social_links.instagram.as_deref(),
            Some("https://instagram.com/jo")
        );
        assert_eq!(profile.work_images.len(), 1);
        assert!(profile.gym_locations.is_empty());
    }

    #[test]
    fn test_profile_from_sparse_document() {
        let profile = profile_from_document(&document(json!({"$id": "p2"})));
        assert_eq!(profile.name, "");
        assert_eq!(profile.image_url, None);
        assert!(profile.contact_details.is_empty());
        assert!(profile.work_images.is_empty());
        assert!(!profile.is_complete());
    }

    #[test]
    fn test_draft_serializes_structured_fields_as_strings() {
        let email = Email::parse("jo@gym.com").unwrap();
        let draft = ProfileDraft::for_new_account(
            AccountId::new("acc-1"),
            "Jo",
            &email,
            "https://cloud.example/v1/avatars/initials?name=Jo".to_string(),
        );

        let data = draft_to_data(&draft);
        assert_eq!(data["accountId"], "acc-1");
        assert_eq!(data["username"], "jo");
        assert_eq!(data["contactDetails"], "{}");
        assert_eq!(data["socialLinks"], "{}");
        assert_eq!(data["workImages"], "[]");
        assert_eq!(data["gymLocations"], "[]");
    }

    #[test]
    fn test_update_only_sends_set_fields() {
        let update = ProfileUpdate {
            business_description: Some("Coach".to_string()),
            contact_details: Some(ContactDetails {
                phone: Some("555-1234".to_string()),
                ..ContactDetails::default()
            }),
            gym_locations: Some(vec!["Gym A".to_string(), "Gym B".to_string()]),
            ..ProfileUpdate::default()
        };

        assert_eq!(
            update_to_data(&update),
            json!({
                "businessDescription": "Coach",
                "contactDetails": "{\"phone\":\"555-1234\"}",
                "gymLocations": "[\"Gym A\",\"Gym B\"]"
            })
        );
    }

    #[test]
    fn test_written_fields_normalize_back() {
        let update = ProfileUpdate {
            gym_locations: Some(vec!["Gym A".to_string(), "Gym B".to_string()]),
            ..ProfileUpdate::default()
        };
        let mut data = update_to_data(&update);
        data["$id"] = json!("p1");

        let profile = profile_from_document(&document(data));
        assert_eq!(profile.gym_locations, vec!["Gym A", "Gym B"]);
    }
}
