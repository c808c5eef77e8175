//! packwatch-api — domain records for the packwatch metric sync core.
//!
//! Defines the cluster-scoped objects whose lifecycle drives metric
//! state: component releases (a versioned install of a component, with
//! its phase and failure reason), subscriptions (a standing request to
//! keep a package installed from a channel), and the two kinds that are
//! only ever counted (install plans, catalog sources).
//!
//! The cluster API itself is out of scope; it appears here only as the
//! [`Lister`] trait, which the reconcile process implements against its
//! client of choice. All records deserialize from the JSON shape the
//! cluster API emits.

pub mod error;
pub mod types;

pub use error::{ListError, ListResult};
pub use types::*;
