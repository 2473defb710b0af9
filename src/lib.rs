//! podcost library
//!
//! Monthly cost estimation for container workloads under two billing models:
//! per-task (billed per vCPU-hour and GiB-hour) and cluster (billed per
//! virtual-machine node, sized from an instance catalog).

pub mod breakdown;
pub mod catalog;
pub mod cluster;
pub mod config;
pub mod error;
pub mod estimate;
pub mod exit_codes;
pub mod input;
pub mod logging;
pub mod per_task;
pub mod price_list;
pub mod profile;
pub mod report;
pub mod sizing;

// Re-export commonly used types
pub use breakdown::CostBreakdown;
pub use catalog::{InstanceCatalog, InstanceRecord};
pub use cluster::{ClusterCostCalculator, ClusterPricing};
pub use error::{CostError, Result};
pub use estimate::{Estimate, Estimator};
pub use input::{EstimateRequest, RawRequest};
pub use per_task::{PerTaskCalculator, PerTaskRates};
pub use profile::{PodFootprint, Tier, TierUsage, UsageProfile};
pub use sizing::{NodeSizer, NodeSizingResult};
