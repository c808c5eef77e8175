//! Versioned-object lifecycle manager for component releases.
//!
//! Two series track each release: `release_succeeded` (a boolean gauge
//! keyed by namespace/name/version) and `release_abnormal` (keyed
//! additionally by phase and reason, so it exists only while the
//! release is in a non-success state). Every observed transition
//! deletes the series published for the old object before publishing
//! the new one; without that, each phase/reason the release ever
//! passed through would persist as its own series forever.
//!
//! Watch events can be redelivered or reordered, so deleting a series
//! that was never published (or was already deleted) must be a no-op —
//! the prometheus vec API already behaves that way and the results are
//! deliberately ignored.

use prometheus::{IntCounter, IntGaugeVec, Opts, Registry};
use tracing::debug;

use packwatch_api::{ComponentRelease, ReleasePhase};

use crate::labels::{
    NAME_LABEL, NAMESPACE_LABEL, PHASE_LABEL, REASON_LABEL, VERSION_LABEL, release_key,
    release_state_key,
};

/// Success/abnormal series plus the monotonic upgrade counter.
pub struct ReleaseLifecycle {
    succeeded: IntGaugeVec,
    abnormal: IntGaugeVec,
    upgrades: IntCounter,
}

impl ReleaseLifecycle {
    pub fn new() -> Self {
        Self {
            succeeded: IntGaugeVec::new(
                Opts::new("release_succeeded", "Successful component release install"),
                &[NAMESPACE_LABEL, NAME_LABEL, VERSION_LABEL],
            )
            .expect("failed to create release_succeeded metric"),
            abnormal: IntGaugeVec::new(
                Opts::new("release_abnormal", "Component release is not installed"),
                &[NAMESPACE_LABEL, NAME_LABEL, VERSION_LABEL, PHASE_LABEL, REASON_LABEL],
            )
            .expect("failed to create release_abnormal metric"),
            upgrades: IntCounter::new(
                "release_upgrade_count",
                "Monotonic count of component release upgrades",
            )
            .expect("failed to create release_upgrade_count metric"),
        }
    }

    /// Register all release lifecycle series.
    ///
    /// A duplicate series name is a startup-time failure.
    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.succeeded.clone()))?;
        registry.register(Box::new(self.abnormal.clone()))?;
        registry.register(Box::new(self.upgrades.clone()))?;
        Ok(())
    }

    /// Replace the series published for `old` with series for `new`.
    ///
    /// No-op when either side is absent, and for derived copies —
    /// a copy would double-count the release it mirrors.
    pub fn on_transition(&self, old: Option<&ComponentRelease>, new: Option<&ComponentRelease>) {
        let (Some(old), Some(new)) = (old, new) else {
            return;
        };
        if new.is_copy() {
            return;
        }

        // The old abnormal tuple is stale regardless of where the
        // release moved; a no-op when it was never published.
        let _ = self.abnormal.remove_label_values(&release_state_key(old));

        let succeeded = self.succeeded.with_label_values(&release_key(new));
        if new.phase == ReleasePhase::Succeeded {
            succeeded.set(1);
        } else {
            succeeded.set(0);
            self.abnormal
                .with_label_values(&release_state_key(new))
                .set(1);
        }
        debug!(
            namespace = %new.namespace,
            name = %new.name,
            phase = new.phase.as_str(),
            "release series replaced"
        );
    }

    /// Drop both series for a deleted release. Idempotent.
    pub fn on_delete(&self, old: &ComponentRelease) {
        let _ = self.abnormal.remove_label_values(&release_state_key(old));
        let _ = self.succeeded.remove_label_values(&release_key(old));
        debug!(namespace = %old.namespace, name = %old.name, "release series dropped");
    }

    /// Count one release upgrade.
    pub fn inc_upgrades(&self) {
        self.upgrades.inc();
    }
}

impl Default for ReleaseLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packwatch_api::ReleaseReason;

    fn release(phase: ReleasePhase, reason: Option<ReleaseReason>) -> ComponentRelease {
        ComponentRelease {
            namespace: "operators".into(),
            name: "etcd-operator.v0.9.4".into(),
            version: "0.9.4".into(),
            phase,
            reason,
        }
    }

    /// Value of the series matching `labels`, or None when absent.
    fn series_value(
        registry: &Registry,
        family: &str,
        labels: &[(&str, &str)],
    ) -> Option<f64> {
        registry
            .gather()
            .iter()
            .find(|mf| mf.get_name() == family)?
            .get_metric()
            .iter()
            .find(|m| {
                labels.iter().all(|(k, v)| {
                    m.get_label()
                        .iter()
                        .any(|l| l.get_name() == *k && l.get_value() == *v)
                })
            })
            .map(|m| m.get_gauge().get_value())
    }

    fn series_count(registry: &Registry, family: &str) -> usize {
        registry
            .gather()
            .iter()
            .find(|mf| mf.get_name() == family)
            .map(|mf| mf.get_metric().len())
            .unwrap_or(0)
    }

    fn setup() -> (ReleaseLifecycle, Registry) {
        let lifecycle = ReleaseLifecycle::new();
        let registry = Registry::new();
        lifecycle.register(&registry).unwrap();
        (lifecycle, registry)
    }

    #[test]
    fn succeeded_transition_sets_gauge_and_clears_abnormal() {
        let (lifecycle, registry) = setup();
        let old = release(ReleasePhase::Installing, None);
        let new = release(ReleasePhase::Succeeded, Some(ReleaseReason::InstallSuccessful));

        lifecycle.on_transition(Some(&old), Some(&new));

        assert_eq!(
            series_value(&registry, "release_succeeded", &[("name", "etcd-operator.v0.9.4")]),
            Some(1.0)
        );
        assert_eq!(series_count(&registry, "release_abnormal"), 0);
    }

    #[test]
    fn failed_transition_publishes_one_abnormal_series() {
        let (lifecycle, registry) = setup();
        let old = release(ReleasePhase::Installing, None);
        let new = release(ReleasePhase::Failed, Some(ReleaseReason::ComponentFailed));

        lifecycle.on_transition(Some(&old), Some(&new));

        assert_eq!(
            series_value(&registry, "release_succeeded", &[("name", "etcd-operator.v0.9.4")]),
            Some(0.0)
        );
        assert_eq!(series_count(&registry, "release_abnormal"), 1);
        assert_eq!(
            series_value(
                &registry,
                "release_abnormal",
                &[("phase", "Failed"), ("reason", "ComponentFailed")]
            ),
            Some(1.0)
        );
    }

    #[test]
    fn phase_walk_leaves_single_abnormal_series() {
        // Pending → Installing → Failed must not leave one series per
        // phase behind.
        let (lifecycle, registry) = setup();
        let pending = release(ReleasePhase::Pending, Some(ReleaseReason::RequirementsUnknown));
        let installing = release(ReleasePhase::Installing, Some(ReleaseReason::RequirementsMet));
        let failed = release(ReleasePhase::Failed, Some(ReleaseReason::InstallCheckFailed));

        lifecycle.on_transition(Some(&pending), Some(&installing));
        lifecycle.on_transition(Some(&installing), Some(&failed));

        assert_eq!(series_count(&registry, "release_abnormal"), 1);
        assert_eq!(
            series_value(&registry, "release_abnormal", &[("phase", "Failed")]),
            Some(1.0)
        );
    }

    #[test]
    fn recovery_after_failure_clears_abnormal() {
        let (lifecycle, registry) = setup();
        let failed = release(ReleasePhase::Failed, Some(ReleaseReason::NeedsReinstall));
        lifecycle.on_transition(Some(&failed), Some(&failed));
        assert_eq!(series_count(&registry, "release_abnormal"), 1);

        let succeeded = release(ReleasePhase::Succeeded, Some(ReleaseReason::InstallSuccessful));
        lifecycle.on_transition(Some(&failed), Some(&succeeded));

        assert_eq!(series_count(&registry, "release_abnormal"), 0);
        assert_eq!(
            series_value(&registry, "release_succeeded", &[("version", "0.9.4")]),
            Some(1.0)
        );
    }

    #[test]
    fn copies_never_touch_series() {
        let (lifecycle, registry) = setup();
        let old = release(ReleasePhase::Pending, None);
        let copy = release(ReleasePhase::Succeeded, Some(ReleaseReason::Copied));

        lifecycle.on_transition(Some(&old), Some(&copy));

        assert_eq!(series_count(&registry, "release_succeeded"), 0);
        assert_eq!(series_count(&registry, "release_abnormal"), 0);
    }

    #[test]
    fn absent_side_is_a_noop() {
        let (lifecycle, registry) = setup();
        let rel = release(ReleasePhase::Failed, Some(ReleaseReason::ComponentFailed));

        lifecycle.on_transition(None, Some(&rel));
        lifecycle.on_transition(Some(&rel), None);

        assert_eq!(series_count(&registry, "release_succeeded"), 0);
        assert_eq!(series_count(&registry, "release_abnormal"), 0);
    }

    #[test]
    fn delete_is_idempotent() {
        let (lifecycle, registry) = setup();
        let failed = release(ReleasePhase::Failed, Some(ReleaseReason::ComponentFailed));
        lifecycle.on_transition(Some(&failed), Some(&failed));

        lifecycle.on_delete(&failed);
        lifecycle.on_delete(&failed);

        assert_eq!(series_count(&registry, "release_succeeded"), 0);
        assert_eq!(series_count(&registry, "release_abnormal"), 0);
    }

    #[test]
    fn delete_of_never_published_release_is_a_noop() {
        let (lifecycle, registry) = setup();
        lifecycle.on_delete(&release(ReleasePhase::Unknown, None));
        assert_eq!(series_count(&registry, "release_succeeded"), 0);
    }

    #[test]
    fn upgrade_counter_is_monotonic() {
        let (lifecycle, registry) = setup();
        lifecycle.inc_upgrades();
        lifecycle.inc_upgrades();
        lifecycle.inc_upgrades();

        let families = registry.gather();
        let family = families
            .iter()
            .find(|mf| mf.get_name() == "release_upgrade_count")
            .unwrap();
        assert_eq!(family.get_metric()[0].get_counter().get_value(), 3.0);
    }
}
