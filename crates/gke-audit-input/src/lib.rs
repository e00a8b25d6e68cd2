//! gke-audit Input
//!
//! This crate defines the [`Input`] trait: a pluggable source of per-cluster
//! data. The collector only ever talks to inputs through this trait, so GKE
//! dumps, REST endpoints and metrics backends all look the same to it.
//!
//! It also provides [`ClusterId`], the parsed form of a fully qualified GKE
//! cluster identifier, which several inputs need to build their requests.

mod cluster_id;
mod error;
mod input;

pub use cluster_id::ClusterId;
pub use error::InputError;
pub use input::{Input, SharedInput};
