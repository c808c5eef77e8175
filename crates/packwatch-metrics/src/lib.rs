//! packwatch-metrics — metric-state synchronization for package
//! lifecycle objects.
//!
//! Keeps a Prometheus registry consistent with the lifecycle of the
//! cluster objects packwatch tracks: every label-tagged series is
//! created, replaced, and deleted in lockstep with object transitions,
//! so stale series never accumulate in the backend.
//!
//! # Architecture
//!
//! ```text
//! SnapshotGauges                    ← periodic cadence
//!   ├── refresh_all(providers)      → re-count each kind
//!   └── NoopProvider                → disabled categories
//!
//! ReleaseLifecycle                  ← per observed release change
//!   ├── on_transition(old, new)     → replace succeeded/abnormal series
//!   ├── on_delete(old)              → drop both series
//!   └── inc_upgrades()              → monotonic upgrade counter
//!
//! SubscriptionSync                  ← per observed subscription change
//!   ├── on_sync(sub)                → count a sync, record its tuple
//!   ├── on_reconcile(sub)           → detect label drift, drop stale series
//!   └── on_delete(sub) / purge(name)
//! ```
//!
//! Each component is constructed once at startup, registered into a
//! [`prometheus::Registry`], and passed by reference to the reconcile
//! workers. A duplicate registration is a startup-time failure; the
//! process must not come up with a half-registered surface.
//!
//! All operations are synchronous, idempotent, and free of blocking
//! I/O — safe on the hot path of a reconcile loop. Deleting a series
//! that no longer exists is always a no-op, which makes redelivered or
//! reordered watch events harmless.

pub mod labels;
pub mod release;
pub mod snapshot;
pub mod subscription;

pub use release::ReleaseLifecycle;
pub use snapshot::{NoopProvider, SnapshotGauges, SnapshotProvider, refresh_all};
pub use subscription::SubscriptionSync;
