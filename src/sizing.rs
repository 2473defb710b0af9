//! Node-sizing engine
//!
//! For one usage tier, finds the cheapest catalog instance type able to host
//! the whole pod fleet, and how many nodes of it are needed.
//!
//! ## Packing model
//!
//! A node of type T packs `floor(capacity / request)` pods along each
//! resource dimension. The fleet then needs
//! `max(ceil(pods / cpu_per_node), ceil(pods / mem_per_node), 1)` nodes. A
//! zero request along a dimension places no constraint on that dimension.
//!
//! ## Selection
//!
//! Candidates are scanned in catalog order and compared on
//! `rate * nodes * hours` with a strict `<`, so the earliest entry wins ties.
//! The scan must stay in catalog order for that tie-break to hold.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::catalog::{InstanceCatalog, InstanceRecord};
use crate::error::{CostError, Result};
use crate::profile::{PodFootprint, Tier, TierUsage};

/// Cheapest placement found for one tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSizingResult {
    pub tier: Tier,
    pub instance_type: String,
    pub hourly_rate: Decimal,
    pub nodes_required: u64,
    /// `hourly_rate * nodes_required * hours_per_day` (one day)
    pub tier_cost: Decimal,
}

/// Best-fit search over an instance catalog
#[derive(Debug, Clone, Copy)]
pub struct NodeSizer<'a> {
    catalog: &'a InstanceCatalog,
}

impl<'a> NodeSizer<'a> {
    pub fn new(catalog: &'a InstanceCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a InstanceCatalog {
        self.catalog
    }

    /// Size one tier
    ///
    /// Returns `CostError::NoQualifyingInstance` when the catalog is empty or
    /// no entry can hold a single pod of this shape. Candidates whose cost
    /// overflows are skipped; if every fitting candidate overflows the result
    /// is `CostError::Overflow`.
    pub fn size_tier(
        &self,
        tier: Tier,
        footprint: &PodFootprint,
        usage: TierUsage,
    ) -> Result<NodeSizingResult> {
        let hours = Decimal::from(usage.hours_per_day);
        let mut best: Option<NodeSizingResult> = None;
        let mut overflowed = false;

        for record in self.catalog {
            let Some(nodes) = nodes_required(record, footprint, usage.pod_count) else {
                trace!(
                    "Skipping {}: pod ({} vCPU, {} GiB) exceeds {}x{}",
                    record.type_name,
                    footprint.cpu,
                    footprint.mem_gib,
                    record.vcpu_capacity,
                    record.memory_capacity
                );
                continue;
            };

            let Some(cost) = record
                .hourly_rate
                .checked_mul(Decimal::from(nodes))
                .and_then(|c| c.checked_mul(hours))
            else {
                warn!(
                    "Skipping {} for {} tier: cost of {} nodes at {}/h overflows",
                    record.type_name, tier, nodes, record.hourly_rate
                );
                overflowed = true;
                continue;
            };

            debug!(
                "{} tier: {} ({}x{}) rate={} nodes={} cost={}",
                tier,
                record.type_name,
                record.vcpu_capacity,
                record.memory_capacity,
                record.hourly_rate,
                nodes,
                cost
            );

            if best.as_ref().map_or(true, |b| cost < b.tier_cost) {
                best = Some(NodeSizingResult {
                    tier,
                    instance_type: record.type_name.clone(),
                    hourly_rate: record.hourly_rate,
                    nodes_required: nodes,
                    tier_cost: cost,
                });
            }
        }

        match best {
            Some(result) => {
                info!(
                    "{} tier: cheapest is {} x{} at {}/day",
                    tier, result.instance_type, result.nodes_required, result.tier_cost
                );
                Ok(result)
            }
            None if overflowed => Err(CostError::overflow(format!("{} tier", tier))),
            None => Err(CostError::NoQualifyingInstance {
                tier,
                pod_cpu: footprint.cpu,
                pod_mem: footprint.mem_gib,
                catalog_size: self.catalog.len(),
            }),
        }
    }
}

/// Nodes of `record` needed to host `pod_count` pods
///
/// `None` when one pod does not fit on the instance at all.
pub fn nodes_required(record: &InstanceRecord, footprint: &PodFootprint, pod_count: u32) -> Option<u64> {
    if !record.fits(footprint.cpu, footprint.mem_gib) {
        return None;
    }

    let cpu_nodes = dimension_nodes(record.vcpu_capacity, footprint.cpu, pod_count);
    let mem_nodes = dimension_nodes(record.memory_capacity, footprint.mem_gib, pod_count);
    Some(cpu_nodes.max(mem_nodes).max(1))
}

/// Nodes needed along one resource dimension
///
/// Caller guarantees `request <= capacity`, so at least one pod fits per node.
fn dimension_nodes(capacity: Decimal, request: Decimal, pod_count: u32) -> u64 {
    if request.is_zero() {
        return 0;
    }

    // An overflowing quotient means a practically unbounded pods-per-node
    let pods_per_node = capacity
        .checked_div(request)
        .and_then(|q| q.floor().to_u64())
        .unwrap_or(u64::MAX)
        .max(1);

    u64::from(pod_count).div_ceil(pods_per_node)
}
