//! Subscription sync lifecycle manager.
//!
//! One counter series tracks each subscription, keyed by
//! (name, installed, channel, package). Any of the last three can
//! change over the subscription's life — the channel is edited, a new
//! release lands — and when one does, the counter under the old tuple
//! becomes a ghost series unless it is deleted.
//!
//! The manager therefore keeps a directory mapping subscription name to
//! the last tuple it published. [`SubscriptionSync::on_reconcile`]
//! compares the live spec against the stored tuple and deletes the
//! stale series on drift; counting under the new tuple is left to the
//! next [`SubscriptionSync::on_sync`]. The compare-delete-write runs
//! under the directory lock, so two reconciles of the same name cannot
//! interleave and strand a series.
//!
//! Invariant: at most one live counter series per subscription.
//!
//! Subscriptions without a spec section are skipped entirely — not yet
//! in a trackable state, no series touched, no error raised.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use tracing::debug;

use packwatch_api::Subscription;

use crate::labels::{CHANNEL_LABEL, INSTALLED_LABEL, NAME_LABEL, PACKAGE_LABEL};

/// The last-published label tuple for one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SyncLabels {
    installed: String,
    package: String,
    channel: String,
}

impl SyncLabels {
    /// The live tuple for a subscription, or None without a spec.
    fn from_live(sub: &Subscription) -> Option<Self> {
        let spec = sub.spec.as_ref()?;
        Some(Self {
            installed: sub.status.installed.clone(),
            package: spec.package.clone(),
            channel: spec.channel.clone(),
        })
    }
}

/// Sync counter plus the name → tuple directory.
///
/// Constructed once at startup and passed by reference to every
/// reconcile worker; there is deliberately no global instance.
pub struct SubscriptionSync {
    total: IntCounterVec,
    directory: Mutex<HashMap<String, SyncLabels>>,
}

impl SubscriptionSync {
    pub fn new() -> Self {
        Self {
            total: IntCounterVec::new(
                Opts::new("subscription_sync_total", "Monotonic count of subscription syncs"),
                &[NAME_LABEL, INSTALLED_LABEL, CHANNEL_LABEL, PACKAGE_LABEL],
            )
            .expect("failed to create subscription_sync_total metric"),
            directory: Mutex::new(HashMap::new()),
        }
    }

    /// Register the sync counter.
    ///
    /// A duplicate series name is a startup-time failure.
    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.total.clone()))
    }

    fn dir(&self) -> MutexGuard<'_, HashMap<String, SyncLabels>> {
        self.directory.lock().expect("subscription directory lock poisoned")
    }

    /// The live counter for one tuple.
    ///
    /// Exposed for sync loops that batch increments themselves.
    pub fn counter_for(
        &self,
        name: &str,
        installed: &str,
        channel: &str,
        package: &str,
    ) -> IntCounter {
        self.total
            .with_label_values(&[name, installed, channel, package])
    }

    /// Count one sync under the subscription's current tuple.
    ///
    /// First sight of a name also records its tuple in the directory;
    /// later syncs leave the directory alone — drift is
    /// [`Self::on_reconcile`]'s job.
    pub fn on_sync(&self, sub: &Subscription) {
        let Some(live) = SyncLabels::from_live(sub) else {
            return;
        };
        self.total
            .with_label_values(&[&sub.name, &live.installed, &live.channel, &live.package])
            .inc();
        self.dir().entry(sub.name.clone()).or_insert(live);
    }

    /// Detect label drift and delete the stale counter series.
    ///
    /// When the live tuple differs from the stored one, the series
    /// keyed by the stored tuple is deleted and the directory entry
    /// overwritten. The counter under the new tuple is expected from a
    /// subsequent [`Self::on_sync`]; drift detection and counting are
    /// deliberately decoupled.
    pub fn on_reconcile(&self, sub: &Subscription) {
        let Some(live) = SyncLabels::from_live(sub) else {
            return;
        };
        let mut dir = self.dir();
        if dir.get(&sub.name).is_none_or(|stored| *stored != live) {
            // Delete under the directory lock: a concurrent reconcile
            // of the same name must not observe the window between
            // series removal and directory update.
            if let Some(stored) = dir.remove(&sub.name) {
                let _ = self.total.remove_label_values(&[
                    &sub.name,
                    &stored.installed,
                    &stored.channel,
                    &stored.package,
                ]);
                debug!(
                    name = %sub.name,
                    old_channel = %stored.channel,
                    new_channel = %live.channel,
                    "subscription labels drifted, stale series dropped"
                );
            }
            dir.insert(sub.name.clone(), live);
        }
    }

    /// Drop the counter series for a deleted subscription and purge
    /// its directory entry.
    ///
    /// Consults the stored tuple first: after an unreconciled drift the
    /// live spec no longer matches the published series, and deleting
    /// by the live tuple would leak the stale one. The live tuple is
    /// used only for names that were never tracked. Idempotent.
    pub fn on_delete(&self, sub: &Subscription) {
        let Some(live) = SyncLabels::from_live(sub) else {
            return;
        };
        let mut dir = self.dir();
        let key = dir.remove(&sub.name).unwrap_or(live);
        let _ = self.total.remove_label_values(&[
            &sub.name,
            &key.installed,
            &key.channel,
            &key.package,
        ]);
        debug!(name = %sub.name, "subscription series dropped");
    }

    /// Drop a directory entry without touching any series.
    pub fn purge(&self, name: &str) {
        self.dir().remove(name);
    }

    /// Number of tracked subscription names, for growth monitoring.
    pub fn tracked(&self) -> usize {
        self.dir().len()
    }
}

impl Default for SubscriptionSync {
    fn default() -> Self {
        Self::new()
    }
}
