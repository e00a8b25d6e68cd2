//! gke-audit Config
//!
//! Serializable configuration for a gke-audit run. A configuration names the
//! clusters to audit (explicitly or through a local dump file), the inputs to
//! collect from and the collector settings.
//!
//! ```json
//! {
//!   "clusters": [{"name": "prod", "project": "demo", "location": "europe-west2"}],
//!   "inputs": {
//!     "rest": {"enabled": true, "endpoint": "https://audit.internal/CLUSTER_ID"}
//!   },
//!   "collector": {"maxWorkers": 20}
//! }
//! ```
//!
//! Typical use is `load`, then `apply_defaults`, then `validate`.

mod cluster;
mod config;
mod error;
mod inputs;

pub use cluster::ClusterDef;
pub use config::{CollectorSettings, Config};
pub use error::ConfigError;
pub use inputs::{GkeLocalInputDef, InputsDef, MetricDef, MetricsInputDef, RestInputDef};
