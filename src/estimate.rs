//! Side-by-side estimate of both billing models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::breakdown::CostBreakdown;
use crate::catalog::InstanceCatalog;
use crate::cluster::{ClusterCostCalculator, ClusterPricing};
use crate::error::Result;
use crate::input::EstimateRequest;
use crate::per_task::{PerTaskCalculator, PerTaskRates};

/// Request inputs echoed back with the results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateParameters {
    pub pod_cpu: Decimal,
    pub pod_mem: Decimal,
    pub peak_pods: u32,
    pub peak_hours: u32,
    pub normal_pods: u32,
    pub normal_hours: u32,
    pub off_hours_pods: u32,
    pub off_hours: u32,
}

impl From<&EstimateRequest> for EstimateParameters {
    fn from(req: &EstimateRequest) -> Self {
        let p = &req.profile;
        Self {
            pod_cpu: req.footprint.cpu,
            pod_mem: req.footprint.mem_gib,
            peak_pods: p.peak.pod_count,
            peak_hours: p.peak.hours_per_day,
            normal_pods: p.normal.pod_count,
            normal_hours: p.normal.hours_per_day,
            off_hours_pods: p.off_hours.pod_count,
            off_hours: p.off_hours.hours_per_day,
        }
    }
}

/// Both monthly breakdowns for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    pub parameters: EstimateParameters,
    pub cluster: CostBreakdown,
    pub per_task: CostBreakdown,
    pub generated_at: DateTime<Utc>,
}

impl Estimate {
    /// Cluster total minus per-task total; positive means per-task is cheaper
    pub fn cluster_premium(&self) -> Decimal {
        self.cluster.total - self.per_task.total
    }
}

/// Runs both billing models against one catalog
#[derive(Debug, Clone)]
pub struct Estimator<'a> {
    cluster: ClusterCostCalculator<'a>,
    per_task: PerTaskCalculator,
}

impl<'a> Estimator<'a> {
    pub fn new(catalog: &'a InstanceCatalog, pricing: ClusterPricing, rates: PerTaskRates) -> Self {
        Self {
            cluster: ClusterCostCalculator::new(catalog, pricing),
            per_task: PerTaskCalculator::new(rates),
        }
    }

    pub fn estimate(&self, request: &EstimateRequest) -> Result<Estimate> {
        let cluster = self
            .cluster
            .calculate_cluster_costs(&request.footprint, &request.profile)?;
        let per_task = self
            .per_task
            .calculate_per_task_costs(&request.footprint, &request.profile)?;

        Ok(Estimate {
            parameters: EstimateParameters::from(request),
            cluster,
            per_task,
            generated_at: Utc::now(),
        })
    }
}
