//! gke-audit Inputs
//!
//! Concrete [`Input`](gke_audit_input::Input) implementations:
//!
//! - [`GkeLocalInput`] reads cluster objects from a local JSON dump
//! - [`RestInput`] fetches JSON from an HTTP endpoint templated with the cluster id
//! - [`MetricsInput`] runs Prometheus queries templated with cluster attributes
//!
//! Inputs that need Google credentials (GKE API, Kubernetes API, Cloud
//! Monitoring) live outside this crate.

mod gke_local;
mod metrics;
mod rest;

pub use gke_local::{GKE_LOCAL_INPUT_ID, GkeLocalInput};
pub use metrics::{METRICS_INPUT_ID, Metric, MetricQuery, MetricsInput, MetricsInputBuilder};
pub use rest::{CLUSTER_ID_WILDCARD, REST_INPUT_ID, RestInput};

/// User agent sent by HTTP based inputs.
pub const USER_AGENT: &str = concat!("gke-audit/", env!("CARGO_PKG_VERSION"));
