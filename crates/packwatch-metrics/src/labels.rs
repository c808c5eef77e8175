//! Label dimensions shared across packwatch series.
//!
//! The dimension names are a stable contract with dashboards and
//! alerting rules; changing one is a breaking change to consumers of
//! the scrape output.

use packwatch_api::ComponentRelease;

pub const NAME_LABEL: &str = "name";
pub const INSTALLED_LABEL: &str = "installed";
pub const NAMESPACE_LABEL: &str = "namespace";
pub const CHANNEL_LABEL: &str = "channel";
pub const VERSION_LABEL: &str = "version";
pub const PHASE_LABEL: &str = "phase";
pub const REASON_LABEL: &str = "reason";
pub const PACKAGE_LABEL: &str = "package";

/// (namespace, name, version) — the identity tuple of a release.
pub fn release_key(rel: &ComponentRelease) -> [&str; 3] {
    [&rel.namespace, &rel.name, &rel.version]
}

/// (namespace, name, version, phase, reason) — the abnormal-state
/// tuple of a release. Phase and reason are part of the key, so a
/// phase change always addresses a different series.
pub fn release_state_key(rel: &ComponentRelease) -> [&str; 5] {
    [
        &rel.namespace,
        &rel.name,
        &rel.version,
        rel.phase.as_str(),
        rel.reason_str(),
    ]
}
