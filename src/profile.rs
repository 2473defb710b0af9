//! Usage profile types
//!
//! A request is a pod footprint (what one pod asks for) plus a usage profile
//! describing how many pods run, and for how long, in each of the three
//! daily tiers.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CostError, Result};

/// Billing days per month applied to every daily figure
pub const DAYS_PER_MONTH: u32 = 30;

/// Daily usage period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Peak,
    Normal,
    OffHours,
}

impl Tier {
    /// All tiers in reporting order
    pub const ALL: [Tier; 3] = [Tier::Peak, Tier::Normal, Tier::OffHours];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Peak => "peak",
            Tier::Normal => "normal",
            Tier::OffHours => "off-hours",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "peak" => Ok(Tier::Peak),
            "normal" => Ok(Tier::Normal),
            "off-hours" => Ok(Tier::OffHours),
            other => Err(CostError::validation(
                "tier",
                format!("Unknown tier: {}. Use 'peak', 'normal' or 'off-hours'", other),
            )),
        }
    }
}

/// Pod count and daily hours for one tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierUsage {
    pub pod_count: u32,
    /// Hours per day spent in this tier. Expected 0-24, not enforced.
    pub hours_per_day: u32,
}

impl TierUsage {
    pub fn new(pod_count: u32, hours_per_day: u32) -> Self {
        Self {
            pod_count,
            hours_per_day,
        }
    }
}

/// Resources requested by a single pod
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodFootprint {
    /// vCPUs per pod
    pub cpu: Decimal,
    /// Memory per pod in GiB
    pub mem_gib: Decimal,
}

impl PodFootprint {
    /// Build a footprint, rejecting negative requests
    pub fn new(cpu: Decimal, mem_gib: Decimal) -> Result<Self> {
        let footprint = Self { cpu, mem_gib };
        footprint.validate()?;
        Ok(footprint)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cpu < Decimal::ZERO {
            return Err(CostError::validation(
                "pod_cpu",
                format!("must be non-negative, got: {}", self.cpu),
            ));
        }
        if self.mem_gib < Decimal::ZERO {
            return Err(CostError::validation(
                "pod_mem",
                format!("must be non-negative, got: {}", self.mem_gib),
            ));
        }
        Ok(())
    }
}

/// Three-tier daily usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageProfile {
    pub peak: TierUsage,
    pub normal: TierUsage,
    pub off_hours: TierUsage,
}

impl UsageProfile {
    pub fn new(peak: TierUsage, normal: TierUsage, off_hours: TierUsage) -> Self {
        Self {
            peak,
            normal,
            off_hours,
        }
    }

    pub fn tier(&self, tier: Tier) -> TierUsage {
        match tier {
            Tier::Peak => self.peak,
            Tier::Normal => self.normal,
            Tier::OffHours => self.off_hours,
        }
    }

    /// Tiers paired with their usage, in reporting order
    pub fn tiers(&self) -> impl Iterator<Item = (Tier, TierUsage)> + '_ {
        Tier::ALL.into_iter().map(move |t| (t, self.tier(t)))
    }

    /// Sum of daily hours across all tiers
    pub fn total_hours(&self) -> u64 {
        self.tiers().map(|(_, u)| u64::from(u.hours_per_day)).sum()
    }
}
