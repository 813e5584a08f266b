//! Normalization of profile fields persisted as strings.
//!
//! The hosted document store only holds flat attributes, so the structured
//! profile fields (contact details, social links, work images, gym
//! locations) are written as JSON strings. Older documents hold them in
//! several shapes: a proper JSON value, a JSON string, a JSON string that was
//! encoded twice, an empty string, or nothing at all. Everything here maps
//! those shapes onto the canonical types and never fails; malformed input
//! degrades to an empty value and a log line.

use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::types::{ContactDetails, SocialLinks};

/// A field value as it was found in a stored document.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredField {
    /// Already a structured JSON value (array or object).
    Raw(Value),
    /// A string that should contain JSON, possibly encoded twice.
    Encoded(String),
    /// Absent, `null`, or an empty string.
    Missing,
}

impl StoredField {
    /// Classify an attribute read from a document.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::String(s)) if s.trim().is_empty() => Self::Missing,
            Some(Value::String(s)) => Self::Encoded(s.clone()),
            Some(other) => Self::Raw(other.clone()),
        }
    }

    /// Decode to a JSON value, unwrapping at most one extra string layer.
    fn decode(&self, field: &str) -> Option<Value> {
        match self {
            Self::Missing => None,
            Self::Raw(value) => Some(value.clone()),
            Self::Encoded(encoded) => match serde_json::from_str::<Value>(encoded) {
                Ok(Value::String(inner)) => match serde_json::from_str::<Value>(&inner) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        debug!(field, error = %e, "Double-encoded field did not decode");
                        None
                    }
                },
                Ok(value) => Some(value),
                Err(e) => {
                    debug!(field, error = %e, "Stored field is not valid JSON");
                    None
                }
            },
        }
    }
}

impl From<Option<&Value>> for StoredField {
    fn from(value: Option<&Value>) -> Self {
        Self::from_value(value)
    }
}

// =============================================================================
// Sequences
// =============================================================================

/// Normalize a sequence field (work images, gym locations).
///
/// Non-string elements and blank strings are dropped.
#[must_use]
pub fn normalize_sequence(field: &StoredField, name: &str) -> Vec<String> {
    match field.decode(name) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        Some(other) => {
            warn!(field = name, kind = json_kind(&other), "Expected a sequence");
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// Encode a sequence field for storage.
#[must_use]
pub fn encode_sequence(items: &[String]) -> String {
    Value::from(items.to_vec()).to_string()
}

// =============================================================================
// Mappings
// =============================================================================

fn decode_mapping(field: &StoredField, name: &str) -> Option<Map<String, Value>> {
    match field.decode(name) {
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            warn!(field = name, kind = json_kind(&other), "Expected a mapping");
            None
        }
        None => None,
    }
}

/// A non-blank string entry; anything else counts as absent.
fn entry(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Normalize the contact details mapping. Unknown keys are ignored.
#[must_use]
pub fn normalize_contact_details(field: &StoredField) -> ContactDetails {
    decode_mapping(field, "contactDetails").map_or_else(ContactDetails::default, |map| {
        ContactDetails {
            phone: entry(&map, "phone"),
            website: entry(&map, "website"),
            address: entry(&map, "address"),
        }
    })
}

/// Normalize the social links mapping. Unknown keys are ignored.
#[must_use]
pub fn normalize_social_links(field: &StoredField) -> SocialLinks {
    decode_mapping(field, "socialLinks").map_or_else(SocialLinks::default, |map| SocialLinks {
        instagram: entry(&map, "instagram"),
        linkedin: entry(&map, "linkedin"),
        twitter: entry(&map, "twitter"),
        facebook: entry(&map, "facebook"),
    })
}

/// Encode contact details for storage.
#[must_use]
pub fn encode_contact_details(details: &ContactDetails) -> String {
    serde_json::to_string(details).unwrap_or_else(|_| "{}".to_owned())
}

/// Encode social links for storage.
#[must_use]
pub fn encode_social_links(links: &SocialLinks) -> String {
    serde_json::to_string(links).unwrap_or_else(|_| "{}".to_owned())
}

// =============================================================================
// Image URLs
// =============================================================================

/// Unwrap and validate a stored image URL.
///
/// Values may be wrapped in one layer of JSON quoting (`"\"https://...\""`)
/// or carry stray escape characters. Returns `None` when no absolute
/// `http`/`https` URL can be recovered; callers render initials instead.
///
/// ```
/// use gymnet_core::fields::normalize_image_url;
///
/// assert_eq!(
///     normalize_image_url("\"https://cdn.example.com/a.png\"").as_deref(),
///     Some("https://cdn.example.com/a.png"),
/// );
/// assert_eq!(normalize_image_url("not a url"), None);
/// ```
#[must_use]
pub fn normalize_image_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let unwrapped = if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed).unwrap_or_else(|_| strip_escapes(trimmed))
    } else if trimmed.contains('\\') {
        strip_escapes(trimmed)
    } else {
        trimmed.to_owned()
    };
    let candidate = unwrapped.trim().trim_matches('"');

    match Url::parse(candidate) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.to_string()),
        Ok(url) => {
            debug!(scheme = url.scheme(), "Image URL has unsupported scheme");
            None
        }
        Err(e) => {
            debug!(error = %e, "Image URL is not a valid absolute URL");
            None
        }
    }
}

fn strip_escapes(s: &str) -> String {
    s.replace('\\', "").trim_matches('"').to_owned()
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(value: &Value) -> StoredField {
        StoredField::from_value(Some(value))
    }

    #[test]
    fn test_classification() {
        assert_eq!(StoredField::from_value(None), StoredField::Missing);
        assert_eq!(stored(&Value::Null), StoredField::Missing);
        assert_eq!(stored(&json!("  ")), StoredField::Missing);
        assert_eq!(stored(&json!("[]")), StoredField::Encoded("[]".to_string()));
        assert_eq!(stored(&json!(["a"])), StoredField::Raw(json!(["a"])));
    }

    #[test]
    fn test_sequence_from_every_representation() {
        let expected = vec!["Gym A".to_string(), "Gym B".to_string()];

        let raw = stored(&json!(["Gym A", "Gym B"]));
        assert_eq!(normalize_sequence(&raw, "gymLocations"), expected);

        let encoded = stored(&json!(r#"["Gym A","Gym B"]"#));
        assert_eq!(normalize_sequence(&encoded, "gymLocations"), expected);

        let double = stored(&json!(r#""[\"Gym A\",\"Gym B\"]""#));
        assert_eq!(normalize_sequence(&double, "gymLocations"), expected);

        let malformed = stored(&json!("[\"Gym A\""));
        assert!(normalize_sequence(&malformed, "gymLocations").is_empty());

        assert!(normalize_sequence(&StoredField::Missing, "gymLocations").is_empty());
    }

    #[test]
    fn test_sequence_drops_non_strings_and_wrong_shapes() {
        let mixed = stored(&json!(["https://a", 3, null, "", "https://b"]));
        assert_eq!(
            normalize_sequence(&mixed, "workImages"),
            vec!["https://a".to_string(), "https://b".to_string()]
        );

        let object = stored(&json!(r#"{"not":"a list"}"#));
        assert!(normalize_sequence(&object, "workImages").is_empty());
    }

    #[test]
    fn test_mapping_from_every_representation() {
        let raw = stored(&json!({"phone": "555-1234", "website": "", "fax": "1"}));
        let details = normalize_contact_details(&raw);
        assert_eq!(details.phone.as_deref(), Some("555-1234"));
        assert_eq!(details.website, None);
        assert_eq!(details.address, None);

        let encoded = stored(&json!(r#"{"address":"1 Main St"}"#));
        assert_eq!(
            normalize_contact_details(&encoded).address.as_deref(),
            Some("1 Main St")
        );

        let double = stored(&json!(r#""{\"instagram\":\"https://instagram.com/jo\"}""#));
        assert_eq!(
            normalize_social_links(&double).instagram.as_deref(),
            Some("https://instagram.com/jo")
        );

        assert!(normalize_contact_details(&stored(&json!("{oops"))).is_empty());
        assert!(normalize_social_links(&stored(&json!(["x"]))).is_empty());
        assert!(normalize_social_links(&StoredField::Missing).is_empty());
    }

    #[test]
    fn test_contact_details_round_trip() {
        let details = ContactDetails {
            phone: Some("555-1234".to_string()),
            ..ContactDetails::default()
        };
        let encoded = encode_contact_details(&details);
        assert_eq!(encoded, r#"{"phone":"555-1234"}"#);

        let decoded = normalize_contact_details(&StoredField::Encoded(encoded.clone()));
        assert_eq!(decoded, details);
        assert_eq!(encode_contact_details(&decoded), encoded);
    }

    #[test]
    fn test_gym_locations_round_trip() {
        let locations = vec!["Gym A".to_string(), "Gym B".to_string()];
        let encoded = encode_sequence(&locations);
        let decoded = normalize_sequence(&StoredField::Encoded(encoded.clone()), "gymLocations");
        assert_eq!(decoded, locations);
        assert_eq!(encode_sequence(&decoded), encoded);
    }

    #[test]
    fn test_image_url_unwrapping() {
        let url = "https://cloud.example/v1/storage/buckets/b/files/f/view?project=p";

        assert_eq!(normalize_image_url(url).as_deref(), Some(url));
        assert_eq!(normalize_image_url(&format!("\"{url}\"")).as_deref(), Some(url));
        assert_eq!(
            normalize_image_url(&format!("\\\"{url}\\\"")).as_deref(),
            Some(url)
        );
        assert_eq!(normalize_image_url(&format!("\"{url}")).as_deref(), Some(url));
    }

    #[test]
    fn test_image_url_rejects_unusable_values() {
        assert_eq!(normalize_image_url(""), None);
        assert_eq!(normalize_image_url("\"\""), None);
        assert_eq!(normalize_image_url("/relative/path.png"), None);
        assert_eq!(normalize_image_url("javascript:alert(1)"), None);
    }
}
