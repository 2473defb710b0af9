//! Request input adaptation
//!
//! Raw request fields arrive as text (CLI arguments, form fields). A missing,
//! blank or unparseable field is coerced to zero and the request proceeds;
//! only domain constraints (non-negativity) reject a request. The calculators
//! never see text.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CostError, Result};
use crate::profile::{PodFootprint, TierUsage, UsageProfile};

/// Request fields as received, before coercion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRequest {
    pub pod_cpu: Option<String>,
    pub pod_mem: Option<String>,
    pub peak_pods: Option<String>,
    pub peak_hours: Option<String>,
    pub normal_pods: Option<String>,
    pub normal_hours: Option<String>,
    pub off_hours_pods: Option<String>,
    pub off_hours: Option<String>,
}

/// Numeric request ready for the calculators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub footprint: PodFootprint,
    pub profile: UsageProfile,
}

impl EstimateRequest {
    pub fn new(footprint: PodFootprint, profile: UsageProfile) -> Self {
        Self { footprint, profile }
    }
}

impl RawRequest {
    /// Coerce every field, defaulting unparseable values to zero
    pub fn coerce(&self) -> Result<EstimateRequest> {
        let footprint = PodFootprint::new(
            decimal_or_zero("pod_cpu", self.pod_cpu.as_deref()),
            decimal_or_zero("pod_mem", self.pod_mem.as_deref()),
        )?;

        let profile = UsageProfile::new(
            TierUsage::new(
                count_or_zero("peak_pods", self.peak_pods.as_deref())?,
                count_or_zero("peak_hours", self.peak_hours.as_deref())?,
            ),
            TierUsage::new(
                count_or_zero("normal_pods", self.normal_pods.as_deref())?,
                count_or_zero("normal_hours", self.normal_hours.as_deref())?,
            ),
            TierUsage::new(
                count_or_zero("off_hours_pods", self.off_hours_pods.as_deref())?,
                count_or_zero("off_hours", self.off_hours.as_deref())?,
            ),
        );

        Ok(EstimateRequest { footprint, profile })
    }
}

fn decimal_or_zero(field: &str, value: Option<&str>) -> Decimal {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Decimal::ZERO;
    };
    match Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)) {
        Ok(v) => v,
        Err(_) => {
            warn!("{} is not a number ({:?}), using 0", field, raw);
            Decimal::ZERO
        }
    }
}

/// Counts accept integers only; a negative integer is a domain error
fn count_or_zero(field: &str, value: Option<&str>) -> Result<u32> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(0);
    };
    match raw.parse::<i64>() {
        Ok(v) if v < 0 => Err(CostError::validation(
            field,
            format!("must be non-negative, got: {}", v),
        )),
        Ok(v) => u32::try_from(v).map_err(|_| {
            CostError::validation(field, format!("must be at most {}, got: {}", u32::MAX, v))
        }),
        Err(_) => {
            warn!("{} is not an integer ({:?}), using 0", field, raw);
            Ok(0)
        }
    }
}
