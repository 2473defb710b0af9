//! Monthly cost breakdown shared by both billing models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CostError, Result};
use crate::sizing::NodeSizingResult;

/// Multiply `factors` together, failing with `CostError::Overflow` naming
/// `component` instead of panicking
pub fn checked_product(component: &str, factors: &[Decimal]) -> Result<Decimal> {
    factors
        .iter()
        .try_fold(Decimal::ONE, |acc, f| acc.checked_mul(*f))
        .ok_or_else(|| CostError::overflow(component))
}

fn checked_sum(component: &str, parts: &[Decimal]) -> Result<Decimal> {
    parts
        .iter()
        .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p))
        .ok_or_else(|| CostError::overflow(component))
}

/// Monthly charges of one billing model
///
/// `control_plane`, `core_nodes` and `tiers` are only present for the
/// cluster model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub peak_hours: Decimal,
    pub normal_hours: Decimal,
    pub off_hours: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_nodes: Option<Decimal>,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers: Option<[NodeSizingResult; 3]>,
}

impl CostBreakdown {
    /// Per-task breakdown: three tier charges, no overhead
    pub fn per_task(peak_hours: Decimal, normal_hours: Decimal, off_hours: Decimal) -> Result<Self> {
        Ok(Self {
            peak_hours,
            normal_hours,
            off_hours,
            control_plane: None,
            core_nodes: None,
            total: checked_sum("per-task total", &[peak_hours, normal_hours, off_hours])?,
            tiers: None,
        })
    }

    /// Cluster breakdown: tier charges plus both overhead terms
    pub fn cluster(
        peak_hours: Decimal,
        normal_hours: Decimal,
        off_hours: Decimal,
        control_plane: Decimal,
        core_nodes: Decimal,
        tiers: [NodeSizingResult; 3],
    ) -> Result<Self> {
        let total = checked_sum(
            "cluster total",
            &[peak_hours, normal_hours, off_hours, control_plane, core_nodes],
        )?;
        Ok(Self {
            peak_hours,
            normal_hours,
            off_hours,
            control_plane: Some(control_plane),
            core_nodes: Some(core_nodes),
            total,
            tiers: Some(tiers),
        })
    }

    /// Present components as (label, amount), excluding the total
    pub fn components(&self) -> Vec<(&'static str, Decimal)> {
        let mut parts = vec![
            ("peak_hours", self.peak_hours),
            ("normal_hours", self.normal_hours),
            ("off_hours", self.off_hours),
        ];
        if let Some(v) = self.control_plane {
            parts.push(("control_plane", v));
        }
        if let Some(v) = self.core_nodes {
            parts.push(("core_nodes", v));
        }
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_per_task_total_and_components() {
        let b = CostBreakdown::per_task(dec!(1.5), dec!(2), dec!(0.25)).unwrap();
        assert_eq!(b.total, dec!(3.75));
        assert_eq!(b.components().len(), 3);
        assert!(b.control_plane.is_none());

        let json = serde_json::to_value(&b).unwrap();
        assert!(json.get("control_plane").is_none());
        assert!(json.get("tiers").is_none());
        assert_eq!(json["total"], "3.75");
    }

    #[test]
    fn test_components_sum_to_total() {
        let b = CostBreakdown::per_task(dec!(10), dec!(20), dec!(30)).unwrap();
        let sum: Decimal = b.components().iter().map(|(_, v)| *v).sum();
        assert_eq!(sum, b.total);
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let err = CostBreakdown::per_task(Decimal::MAX, Decimal::ONE, Decimal::ZERO).unwrap_err();
        assert!(matches!(err, CostError::Overflow { .. }));
        assert!(err.to_string().contains("per-task total"));
    }

    #[test]
    fn test_checked_product() {
        assert_eq!(
            checked_product("x", &[dec!(0.5), dec!(4), dec!(30)]).unwrap(),
            dec!(60)
        );
        assert_eq!(checked_product("x", &[]).unwrap(), Decimal::ONE);
        let err = checked_product("core nodes", &[Decimal::MAX, dec!(2)]).unwrap_err();
        assert!(err.to_string().contains("core nodes"));
    }
}
