use crate::site::SiteProfile;
use url::Url;

/// Finds the profile a resource URL belongs to
///
/// Profiles are checked in configuration order and the first match wins.
///
/// # Returns
///
/// * `Some(&SiteProfile)` - The first profile whose pattern matches
/// * `None` - No configured profile covers this URL
pub fn resolve_site<'a>(profiles: &'a [SiteProfile], url: &Url) -> Option<&'a SiteProfile> {
    profiles.iter().find(|profile| profile.matches(url))
}
