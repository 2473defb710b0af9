//! Instance catalog
//!
//! The catalog is the price/capacity table the cluster model searches. It is
//! loaded once from a CSV source with the header
//! `Instance_Type,Rate,vCPU,Memory` and is read-only afterwards; callers pass
//! it by reference to the sizing engine.
//!
//! Loading is deliberately forgiving about content and strict about presence:
//! a missing file is an error, a malformed header yields an empty catalog, and
//! a bad row is skipped with a warning.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{CatalogError, Result};

/// Hourly rate used when a row has no `Rate` value
pub const DEFAULT_HOURLY_RATE: Decimal = dec!(4);

pub const COLUMN_TYPE: &str = "Instance_Type";
pub const COLUMN_RATE: &str = "Rate";
pub const COLUMN_VCPU: &str = "vCPU";
pub const COLUMN_MEMORY: &str = "Memory";

/// One purchasable instance type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub type_name: String,
    pub hourly_rate: Decimal,
    pub vcpu_capacity: Decimal,
    /// Memory in GiB
    pub memory_capacity: Decimal,
}

impl InstanceRecord {
    pub fn new(
        type_name: impl Into<String>,
        hourly_rate: Decimal,
        vcpu_capacity: Decimal,
        memory_capacity: Decimal,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            hourly_rate,
            vcpu_capacity,
            memory_capacity,
        }
    }

    /// Whether a single pod of this shape fits on one node
    pub fn fits(&self, pod_cpu: Decimal, pod_mem: Decimal) -> bool {
        pod_cpu <= self.vcpu_capacity && pod_mem <= self.memory_capacity
    }
}

/// Ordered, immutable collection of instance records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceCatalog {
    records: Vec<InstanceRecord>,
}

/// Header positions of the columns we read
struct Columns {
    type_name: Option<usize>,
    rate: Option<usize>,
    vcpu: Option<usize>,
    memory: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Self {
            type_name: find(COLUMN_TYPE),
            rate: find(COLUMN_RATE),
            vcpu: find(COLUMN_VCPU),
            memory: find(COLUMN_MEMORY),
        }
    }
}

impl InstanceCatalog {
    /// Build a catalog from records already in memory
    pub fn from_records(records: Vec<InstanceRecord>) -> Self {
        Self { records }
    }

    /// Load a catalog from a CSV file
    ///
    /// Fails only when the file is missing or cannot be opened. Content
    /// problems degrade to an empty or partial catalog.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            error!("Catalog file {} not found", path.display());
            return Err(CatalogError::NotFound(path.to_path_buf()).into());
        }

        let file = File::open(path).map_err(|source| CatalogError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::from_reader(file);
        info!(
            "Loaded {} instance types from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a catalog from any CSV byte stream
    pub fn from_reader<R: Read>(reader: R) -> Self {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(b',')
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = match csv_reader.headers() {
            Ok(h) => h.clone(),
            Err(e) => {
                error!("Failed to read catalog headers: {}", e);
                return Self::default();
            }
        };

        if headers.is_empty() {
            warn!("Catalog source is empty");
            return Self::default();
        }
        if headers.len() == 1 {
            error!(
                "Malformed catalog headers: {:?}. Check the delimiter.",
                headers.iter().collect::<Vec<_>>()
            );
            return Self::default();
        }
        debug!("Catalog headers: {:?}", headers.iter().collect::<Vec<_>>());

        let columns = Columns::from_headers(&headers);
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for (index, row) in csv_reader.records().enumerate() {
            // Line 1 is the header
            let line = index + 2;
            let row = match row {
                Ok(r) => r,
                Err(e) => {
                    warn!("Skipping catalog line {}: {}", line, e);
                    continue;
                }
            };

            match parse_row(&columns, &row) {
                Ok(record) => {
                    if !seen.insert(record.type_name.clone()) {
                        warn!(
                            "Skipping catalog line {}: duplicate instance type {}",
                            line, record.type_name
                        );
                        continue;
                    }
                    records.push(record);
                }
                Err(reason) => {
                    warn!("Skipping catalog line {}: {}. Row: {:?}", line, reason, row);
                }
            }
        }

        Self { records }
    }

    pub fn records(&self) -> &[InstanceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InstanceRecord> {
        self.records.iter()
    }

    pub fn get(&self, type_name: &str) -> Option<&InstanceRecord> {
        self.records.iter().find(|r| r.type_name == type_name)
    }

    /// Hourly rate of a named instance type, if present
    pub fn rate_of(&self, type_name: &str) -> Option<Decimal> {
        self.get(type_name).map(|r| r.hourly_rate)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a InstanceCatalog {
    type Item = &'a InstanceRecord;
    type IntoIter = std::slice::Iter<'a, InstanceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn field<'r>(row: &'r StringRecord, index: Option<usize>, name: &str) -> std::result::Result<&'r str, String> {
    index
        .and_then(|i| row.get(i))
        .ok_or_else(|| format!("missing column {}", name))
}

fn parse_decimal(value: &str, name: &str) -> std::result::Result<Decimal, String> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|_| format!("{} is not a number: {:?}", name, value))
}

fn parse_row(columns: &Columns, row: &StringRecord) -> std::result::Result<InstanceRecord, String> {
    let type_name = field(row, columns.type_name, COLUMN_TYPE)?;
    if type_name.is_empty() {
        return Err(format!("empty {}", COLUMN_TYPE));
    }

    let hourly_rate = match columns.rate.and_then(|i| row.get(i)) {
        Some(v) if !v.is_empty() => parse_decimal(v, COLUMN_RATE)?,
        _ => DEFAULT_HOURLY_RATE,
    };
    if hourly_rate < Decimal::ZERO {
        return Err(format!("negative {}: {}", COLUMN_RATE, hourly_rate));
    }

    let vcpu_capacity = parse_decimal(field(row, columns.vcpu, COLUMN_VCPU)?, COLUMN_VCPU)?;
    let memory_capacity = parse_decimal(field(row, columns.memory, COLUMN_MEMORY)?, COLUMN_MEMORY)?;
    if vcpu_capacity <= Decimal::ZERO {
        return Err(format!("{} must be positive, got {}", COLUMN_VCPU, vcpu_capacity));
    }
    if memory_capacity <= Decimal::ZERO {
        return Err(format!("{} must be positive, got {}", COLUMN_MEMORY, memory_capacity));
    }

    Ok(InstanceRecord {
        type_name: type_name.to_string(),
        hourly_rate,
        vcpu_capacity,
        memory_capacity,
    })
}
