//! Snapshot gauges — stateless re-counts of object totals per kind.
//!
//! A snapshot gauge carries no label dimensions and therefore no
//! deletion logic: every refresh overwrites the single value, which is
//! always correct. History is the scrape backend's problem.
//!
//! "Any countable kind" is modeled as one capability,
//! [`SnapshotProvider::refresh`]; the reconcile process builds one
//! provider per kind it serves and a [`NoopProvider`] for categories
//! it has disabled.

use std::marker::PhantomData;

use prometheus::{IntGauge, Registry};
use tracing::debug;

use packwatch_api::{
    CatalogSource, ComponentRelease, InstallPlan, ListResult, Lister, Subscription,
};

/// One refresh capability per countable kind.
pub trait SnapshotProvider: Send + Sync {
    /// Re-count the kind, publish the total, and return it.
    ///
    /// Listing errors propagate unchanged; the caller owns retry and
    /// backoff policy.
    fn refresh(&self) -> ListResult<u64>;
}

/// Refresh every provider once, stopping at the first listing error.
pub fn refresh_all(providers: &[Box<dyn SnapshotProvider>]) -> ListResult<()> {
    for provider in providers {
        provider.refresh()?;
    }
    Ok(())
}

/// The per-kind object total gauges.
pub struct SnapshotGauges {
    releases: IntGauge,
    install_plans: IntGauge,
    subscriptions: IntGauge,
    catalog_sources: IntGauge,
}

impl SnapshotGauges {
    pub fn new() -> Self {
        Self {
            releases: IntGauge::new(
                "release_count",
                "Number of component releases registered in the cluster",
            )
            .expect("failed to create release_count metric"),
            install_plans: IntGauge::new("install_plan_count", "Number of install plans")
                .expect("failed to create install_plan_count metric"),
            subscriptions: IntGauge::new("subscription_count", "Number of subscriptions")
                .expect("failed to create subscription_count metric"),
            catalog_sources: IntGauge::new("catalog_source_count", "Number of catalog sources")
                .expect("failed to create catalog_source_count metric"),
        }
    }

    /// Register all count gauges.
    ///
    /// A duplicate series name is a startup-time failure; the process
    /// must not come up after one.
    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.releases.clone()))?;
        registry.register(Box::new(self.install_plans.clone()))?;
        registry.register(Box::new(self.subscriptions.clone()))?;
        registry.register(Box::new(self.catalog_sources.clone()))?;
        Ok(())
    }

    /// Provider counting component releases.
    pub fn releases<L: Lister<ComponentRelease>>(&self, lister: L) -> KindCount<ComponentRelease, L> {
        KindCount::new("release", self.releases.clone(), lister)
    }

    /// Provider counting install plans.
    pub fn install_plans<L: Lister<InstallPlan>>(&self, lister: L) -> KindCount<InstallPlan, L> {
        KindCount::new("install_plan", self.install_plans.clone(), lister)
    }

    /// Provider counting subscriptions.
    pub fn subscriptions<L: Lister<Subscription>>(&self, lister: L) -> KindCount<Subscription, L> {
        KindCount::new("subscription", self.subscriptions.clone(), lister)
    }

    /// Provider counting catalog sources.
    pub fn catalog_sources<L: Lister<CatalogSource>>(&self, lister: L) -> KindCount<CatalogSource, L> {
        KindCount::new("catalog_source", self.catalog_sources.clone(), lister)
    }
}

impl Default for SnapshotGauges {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts one kind via its lister and publishes to one gauge.
pub struct KindCount<T, L> {
    kind: &'static str,
    gauge: IntGauge,
    lister: L,
    _kind: PhantomData<fn() -> T>,
}

impl<T, L> KindCount<T, L> {
    fn new(kind: &'static str, gauge: IntGauge, lister: L) -> Self {
        Self {
            kind,
            gauge,
            lister,
            _kind: PhantomData,
        }
    }
}

impl<T, L> SnapshotProvider for KindCount<T, L>
where
    L: Lister<T>,
{
    fn refresh(&self) -> ListResult<u64> {
        let items = self.lister.list_all()?;
        let count = items.len() as u64;
        self.gauge.set(count as i64);
        debug!(kind = self.kind, count, "snapshot gauge refreshed");
        Ok(count)
    }
}

/// Provider for a disabled category: touches nothing, never fails.
pub struct NoopProvider;

impl SnapshotProvider for NoopProvider {
    fn refresh(&self) -> ListResult<u64> {
        Ok(0)
    }
}
