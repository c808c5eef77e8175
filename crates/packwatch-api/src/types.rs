//! Domain records for the packwatch metric sync core.
//!
//! These mirror the JSON objects served by the cluster API. Only the
//! fields the metric sync core reads are modeled; everything else the
//! API carries is irrelevant here and left out deliberately.

use serde::{Deserialize, Serialize};

use crate::error::ListResult;

// ── Component release ─────────────────────────────────────────────

/// Install phase of a component release.
///
/// Serializes as the PascalCase phase string the cluster API emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleasePhase {
    Pending,
    InstallReady,
    Installing,
    Succeeded,
    Failed,
    Replacing,
    Deleting,
    Unknown,
}

impl ReleasePhase {
    /// Stable string form, used as the `phase` label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleasePhase::Pending => "Pending",
            ReleasePhase::InstallReady => "InstallReady",
            ReleasePhase::Installing => "Installing",
            ReleasePhase::Succeeded => "Succeeded",
            ReleasePhase::Failed => "Failed",
            ReleasePhase::Replacing => "Replacing",
            ReleasePhase::Deleting => "Deleting",
            ReleasePhase::Unknown => "Unknown",
        }
    }
}

/// Why a release is in its current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseReason {
    RequirementsUnknown,
    RequirementsNotMet,
    RequirementsMet,
    InstallSuccessful,
    InstallCheckFailed,
    ComponentFailed,
    NeedsReinstall,
    Replaced,
    BeingReplaced,
    /// Derived copy of a release owned by another namespace. Copies
    /// never get independent metric series.
    Copied,
}

impl ReleaseReason {
    /// Stable string form, used as the `reason` label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseReason::RequirementsUnknown => "RequirementsUnknown",
            ReleaseReason::RequirementsNotMet => "RequirementsNotMet",
            ReleaseReason::RequirementsMet => "RequirementsMet",
            ReleaseReason::InstallSuccessful => "InstallSuccessful",
            ReleaseReason::InstallCheckFailed => "InstallCheckFailed",
            ReleaseReason::ComponentFailed => "ComponentFailed",
            ReleaseReason::NeedsReinstall => "NeedsReinstall",
            ReleaseReason::Replaced => "Replaced",
            ReleaseReason::BeingReplaced => "BeingReplaced",
            ReleaseReason::Copied => "Copied",
        }
    }
}

/// A versioned install of a component in one namespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentRelease {
    pub namespace: String,
    pub name: String,
    /// Semantic version of this release, as declared in its spec.
    pub version: String,
    pub phase: ReleasePhase,
    /// Absent while the installer has not yet assigned one.
    #[serde(default)]
    pub reason: Option<ReleaseReason>,
}

impl ComponentRelease {
    /// The `reason` label value; empty until a reason is assigned.
    pub fn reason_str(&self) -> &'static str {
        self.reason.map(|r| r.as_str()).unwrap_or("")
    }

    /// Whether this release is a derived copy of another object.
    pub fn is_copy(&self) -> bool {
        self.reason == Some(ReleaseReason::Copied)
    }
}

// ── Subscription ──────────────────────────────────────────────────

/// Desired-state half of a subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSpec {
    pub package: String,
    pub channel: String,
    /// Catalog source to resolve the package from.
    pub source: String,
    pub source_namespace: String,
}

/// Observed-state half of a subscription.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionStatus {
    /// Name of the release currently installed for this subscription,
    /// empty while nothing has been installed yet.
    #[serde(default)]
    pub installed: String,
}

/// A standing request to keep a package installed from a channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub namespace: String,
    pub name: String,
    /// Absent on objects that have been created but not yet admitted;
    /// such subscriptions are not yet in a trackable state.
    #[serde(default)]
    pub spec: Option<SubscriptionSpec>,
    #[serde(default)]
    pub status: SubscriptionStatus,
}

// ── Counted-only kinds ────────────────────────────────────────────

/// An install plan; only its existence matters to the metric core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstallPlan {
    pub namespace: String,
    pub name: String,
}

/// A catalog source; only its existence matters to the metric core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSource {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub source_type: String,
}

// ── Listing contract ──────────────────────────────────────────────

/// Cluster-wide listing of one object kind.
///
/// Implemented by the reconcile process against its cluster client.
/// No ordering is guaranteed or required; the metric core only ever
/// needs a stable count.
pub trait Lister<T>: Send + Sync {
    fn list_all(&self) -> ListResult<Vec<T>>;
}
