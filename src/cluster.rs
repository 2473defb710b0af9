//! Cluster-model cost aggregation
//!
//! Sizes each tier with [`NodeSizer`], scales the daily figure to a month and
//! adds the two fixed overheads of a managed cluster: the control-plane fee
//! and the always-on core node pool.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::breakdown::{checked_product, CostBreakdown};
use crate::catalog::InstanceCatalog;
use crate::error::Result;
use crate::profile::{PodFootprint, Tier, UsageProfile, DAYS_PER_MONTH};
use crate::sizing::NodeSizer;

pub const DEFAULT_CONTROL_PLANE_HOURLY: Decimal = dec!(0.10);
pub const DEFAULT_CORE_NODE_COUNT: u32 = 4;
pub const DEFAULT_REFERENCE_INSTANCE_TYPE: &str = "m5a.2xlarge";

/// Fixed overhead parameters of the cluster model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterPricing {
    /// Control-plane fee per hour of usage
    pub control_plane_hourly: Decimal,
    /// Size of the always-on core node pool
    pub core_node_count: u32,
    /// Instance type the core pool runs on
    pub reference_instance_type: String,
}

impl Default for ClusterPricing {
    fn default() -> Self {
        Self {
            control_plane_hourly: DEFAULT_CONTROL_PLANE_HOURLY,
            core_node_count: DEFAULT_CORE_NODE_COUNT,
            reference_instance_type: DEFAULT_REFERENCE_INSTANCE_TYPE.to_string(),
        }
    }
}

/// Monthly cluster-model calculator bound to one catalog
#[derive(Debug, Clone)]
pub struct ClusterCostCalculator<'a> {
    sizer: NodeSizer<'a>,
    pricing: ClusterPricing,
}

impl<'a> ClusterCostCalculator<'a> {
    pub fn new(catalog: &'a InstanceCatalog, pricing: ClusterPricing) -> Self {
        Self {
            sizer: NodeSizer::new(catalog),
            pricing,
        }
    }

    pub fn pricing(&self) -> &ClusterPricing {
        &self.pricing
    }

    /// Monthly cluster-model breakdown
    ///
    /// Fails as a whole if any tier has no qualifying instance or any charge
    /// overflows.
    pub fn calculate_cluster_costs(
        &self,
        footprint: &PodFootprint,
        profile: &UsageProfile,
    ) -> Result<CostBreakdown> {
        info!(
            "Cluster model: pod ({} vCPU, {} GiB), pods peak/normal/off = {}/{}/{}",
            footprint.cpu,
            footprint.mem_gib,
            profile.peak.pod_count,
            profile.normal.pod_count,
            profile.off_hours.pod_count
        );

        let days = Decimal::from(DAYS_PER_MONTH);
        let peak = self.sizer.size_tier(Tier::Peak, footprint, profile.peak)?;
        let normal = self.sizer.size_tier(Tier::Normal, footprint, profile.normal)?;
        let off_hours = self.sizer.size_tier(Tier::OffHours, footprint, profile.off_hours)?;

        let monthly_hours =
            checked_product("monthly hours", &[Decimal::from(profile.total_hours()), days])?;
        let control_plane = checked_product(
            "control plane",
            &[self.pricing.control_plane_hourly, monthly_hours],
        )?;
        let core_nodes = self.core_nodes_cost(monthly_hours)?;

        let breakdown = CostBreakdown::cluster(
            checked_product("peak tier", &[peak.tier_cost, days])?,
            checked_product("normal tier", &[normal.tier_cost, days])?,
            checked_product("off-hours tier", &[off_hours.tier_cost, days])?,
            control_plane,
            core_nodes,
            [peak, normal, off_hours],
        )?;
        info!("Cluster model total: {}", breakdown.total);
        Ok(breakdown)
    }

    fn core_nodes_cost(&self, monthly_hours: Decimal) -> Result<Decimal> {
        let reference = &self.pricing.reference_instance_type;
        match self.sizer.catalog().rate_of(reference) {
            Some(rate) => checked_product(
                "core nodes",
                &[rate, Decimal::from(self.pricing.core_node_count), monthly_hours],
            ),
            None => {
                warn!(
                    "Core node instance type {} not in catalog, core node cost is zero",
                    reference
                );
                Ok(Decimal::ZERO)
            }
        }
    }
}
