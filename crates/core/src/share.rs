//! Share links for profile pages.

use url::Url;

use crate::types::ProfileId;

const SITE_NAME: &str = "Gym Business Network";

/// Links offered by the share menu on a profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    pub profile_url: String,
    pub email: String,
    pub linkedin: String,
    pub twitter: String,
}

impl ShareLinks {
    /// Build share links for the profile `id` of a member named `name`.
    ///
    /// `base_url` is the public origin of the site.
    #[must_use]
    pub fn new(base_url: &Url, id: &ProfileId, name: &str) -> Self {
        let profile_url = profile_url(base_url, id);

        let subject = format!("Check out {name}'s profile");
        let body = format!("I found this profile on {SITE_NAME}: {profile_url}");
        let email = format!(
            "mailto:?subject={}&body={}",
            urlencoding::encode(&subject),
            urlencoding::encode(&body)
        );

        let linkedin = format!(
            "https://www.linkedin.com/sharing/share-offsite/?url={}",
            urlencoding::encode(&profile_url)
        );

        let text = format!("Check out {name}'s profile on {SITE_NAME}");
        let twitter = format!(
            "https://twitter.com/intent/tweet?text={}&url={}",
            urlencoding::encode(&text),
            urlencoding::encode(&profile_url)
        );

        Self {
            profile_url,
            email,
            linkedin,
            twitter,
        }
    }
}

/// Absolute URL of a profile page.
#[must_use]
pub fn profile_url(base_url: &Url, id: &ProfileId) -> String {
    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("profile").push(id.as_str());
    }
    url.to_string()
}
