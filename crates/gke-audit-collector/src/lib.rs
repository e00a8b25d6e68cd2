//! gke-audit Collector
//!
//! Fetches data from every registered [`Input`] for every target cluster and
//! folds the results into one [`ClusterData`] bag per cluster.
//!
//! # Architecture
//!
//! ```text
//!   inputs × cluster_ids
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │     task queue      │  one task per (input, cluster), sealed before draining
//! └─────────────────────┘
//!            │
//!    ┌───────┼───────┐
//!    ▼       ▼       ▼
//! worker  worker  worker    max_workers concurrent get_data calls
//!    │       │       │
//!    └───┬───┴───┬───┘
//!        ▼       ▼
//!   successes  failures     unbounded channels
//!        │       │
//!        ▼       ▼
//!   ClusterData  AttributedError
//! ```
//!
//! Failures never abort the collection. Every task ends up either in a
//! cluster's data bag or in the error list, exactly once.
//!
//! # Usage
//!
//! ```ignore
//! use gke_audit_collector::{CollectorConfig, DataCollector};
//!
//! let collector = DataCollector::new(CollectorConfig { max_workers: 10 });
//! let result = collector.collect(&inputs, &cluster_ids).await;
//!
//! for error in &result.errors {
//!   eprintln!("{}", error);
//! }
//! ```
//!
//! [`Input`]: gke_audit_input::Input

mod aggregate;
mod collector;
mod config;
mod error;
mod result;
mod task;
#[cfg(test)]
mod testing;
mod worker;

pub use collector::{DataCollector, get_all_inputs_data};
pub use config::{CollectorConfig, DEFAULT_MAX_WORKERS};
pub use error::AttributedError;
pub use result::{ClusterData, CollectionResult};
