//! Per-task billing model
//!
//! Each pod is billed directly for what it requests, per vCPU-hour and per
//! GiB-hour. No catalog and no instance selection are involved.

use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::breakdown::{checked_product, CostBreakdown};
use crate::error::{CostError, Result};
use crate::price_list;
use crate::profile::{PodFootprint, Tier, UsageProfile, DAYS_PER_MONTH};

pub const DEFAULT_VCPU_HOURLY: Decimal = dec!(0.03238);
pub const DEFAULT_MEMORY_GIB_HOURLY: Decimal = dec!(0.00356);

/// Unit rates of the per-task model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerTaskRates {
    /// Price per vCPU per hour
    pub vcpu_hourly: Decimal,
    /// Price per GiB of memory per hour
    pub memory_gib_hourly: Decimal,
}

impl Default for PerTaskRates {
    fn default() -> Self {
        Self {
            vcpu_hourly: DEFAULT_VCPU_HOURLY,
            memory_gib_hourly: DEFAULT_MEMORY_GIB_HOURLY,
        }
    }
}

impl PerTaskRates {
    /// Read both unit rates from price-list product documents
    pub fn from_price_lists(vcpu_document: &Path, memory_document: &Path) -> Result<Self> {
        let rates = Self {
            vcpu_hourly: price_list::read_unit_price(vcpu_document)?,
            memory_gib_hourly: price_list::read_unit_price(memory_document)?,
        };
        info!(
            "Per-task rates from price lists: vCPU {} / GiB {}",
            rates.vcpu_hourly, rates.memory_gib_hourly
        );
        Ok(rates)
    }

    /// Hourly price of one pod
    pub fn pod_hourly(&self, footprint: &PodFootprint) -> Result<Decimal> {
        let cpu = checked_product("per-task vCPU rate", &[self.vcpu_hourly, footprint.cpu])?;
        let mem = checked_product(
            "per-task memory rate",
            &[self.memory_gib_hourly, footprint.mem_gib],
        )?;
        cpu.checked_add(mem)
            .ok_or_else(|| CostError::overflow("per-task pod rate"))
    }
}

/// Monthly per-task calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct PerTaskCalculator {
    rates: PerTaskRates,
}

impl PerTaskCalculator {
    pub fn new(rates: PerTaskRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &PerTaskRates {
        &self.rates
    }

    /// Monthly per-task breakdown; fails only when a charge overflows
    pub fn calculate_per_task_costs(
        &self,
        footprint: &PodFootprint,
        profile: &UsageProfile,
    ) -> Result<CostBreakdown> {
        let pod_hourly = self.rates.pod_hourly(footprint)?;
        let tier_charge = |tier: Tier| {
            let usage = profile.tier(tier);
            checked_product(
                &format!("per-task {} tier", tier),
                &[
                    pod_hourly,
                    Decimal::from(usage.pod_count),
                    Decimal::from(usage.hours_per_day),
                    Decimal::from(DAYS_PER_MONTH),
                ],
            )
        };

        let breakdown = CostBreakdown::per_task(
            tier_charge(Tier::Peak)?,
            tier_charge(Tier::Normal)?,
            tier_charge(Tier::OffHours)?,
        )?;
        info!("Per-task model total: {}", breakdown.total);
        Ok(breakdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::TierUsage;

    #[test]
    fn test_monthly_scaling_is_applied() {
        let calc = PerTaskCalculator::new(PerTaskRates::default());
        let footprint = PodFootprint {
            cpu: dec!(0.5),
            mem_gib: dec!(2),
        };
        let profile = UsageProfile::new(
            TierUsage::new(10, 5),
            TierUsage::default(),
            TierUsage::default(),
        );

        let b = calc.calculate_per_task_costs(&footprint, &profile).unwrap();
        // (0.03238 * 0.5 + 0.00356 * 2) * 10 * 5 * 30 = 0.02331 * 1500
        assert_eq!(b.peak_hours, dec!(34.965));
        assert_eq!(b.normal_hours, Decimal::ZERO);
        assert_eq!(b.total, dec!(34.965));
        assert!(b.control_plane.is_none());
        assert!(b.core_nodes.is_none());
    }

    #[test]
    fn test_all_tiers_summed() {
        let rates = PerTaskRates {
            vcpu_hourly: dec!(0.02),
            memory_gib_hourly: dec!(0.01),
        };
        let calc = PerTaskCalculator::new(rates);
        let footprint = PodFootprint {
            cpu: dec!(1),
            mem_gib: dec!(2),
        };
        let profile = UsageProfile::new(
            TierUsage::new(10, 5),
            TierUsage::new(5, 10),
            TierUsage::new(2, 8),
        );
        let b = calc.calculate_per_task_costs(&footprint, &profile).unwrap();
        // pod hourly 0.04
        assert_eq!(b.peak_hours, dec!(60));
        assert_eq!(b.normal_hours, dec!(60));
        assert_eq!(b.off_hours, dec!(19.2));
        assert_eq!(b.total, dec!(139.2));
    }

    #[test]
    fn test_zero_footprint_costs_nothing() {
        let calc = PerTaskCalculator::default();
        let profile = UsageProfile::new(
            TierUsage::new(100, 24),
            TierUsage::new(100, 24),
            TierUsage::new(100, 24),
        );
        let b = calc
            .calculate_per_task_costs(&PodFootprint::default(), &profile)
            .unwrap();
        assert_eq!(b.total, Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_charge_is_an_error() {
        let rates = PerTaskRates {
            vcpu_hourly: Decimal::from_scientific("1e20").unwrap(),
            memory_gib_hourly: Decimal::ZERO,
        };
        let calc = PerTaskCalculator::new(rates);
        let profile = UsageProfile::new(
            TierUsage::default(),
            TierUsage::new(1_000_000_000, 24),
            TierUsage::default(),
        );
        let err = calc
            .calculate_per_task_costs(&PodFootprint::new(dec!(1), dec!(1)).unwrap(), &profile)
            .unwrap_err();
        assert!(matches!(err, CostError::Overflow { .. }));
        assert!(err.to_string().contains("normal tier"));
    }
}
