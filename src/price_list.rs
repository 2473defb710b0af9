//! Price-list documents as a source of per-task unit rates
//!
//! Reads a product document in the shape the cloud provider's price-list
//! catalog returns, either a single product or a `{"PriceList": [...]}`
//! envelope whose entries are products or JSON-encoded product strings. The
//! unit price lives at
//! `terms.OnDemand.<offer>.priceDimensions.<dimension>.pricePerUnit.USD`.
//!
//! Nothing here talks to the network; documents are fetched by other means
//! and saved to disk.

use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::error::{CostError, Result};

/// Read a price-list document from disk and extract its USD unit price
pub fn read_unit_price(path: &Path) -> Result<Decimal> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CostError::PriceList(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let price = parse_unit_price(&content)?;
    debug!("Unit price {} from {}", price, path.display());
    Ok(price)
}

/// Extract the USD unit price from a price-list document
pub fn parse_unit_price(document: &str) -> Result<Decimal> {
    let value: Value = serde_json::from_str(document)?;
    let product = first_product(value)?;

    let usd = product
        .get("terms")
        .and_then(|t| t.get("OnDemand"))
        .and_then(first_entry)
        .and_then(|offer| offer.get("priceDimensions"))
        .and_then(first_entry)
        .and_then(|dim| dim.get("pricePerUnit"))
        .and_then(|p| p.get("USD"))
        .ok_or_else(|| {
            CostError::PriceList(
                "No terms.OnDemand.*.priceDimensions.*.pricePerUnit.USD in product".to_string(),
            )
        })?;

    let price = match usd {
        Value::String(s) => Decimal::from_str(s.trim())
            .map_err(|_| CostError::PriceList(format!("USD price is not a number: {:?}", s)))?,
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .map_err(|_| CostError::PriceList(format!("USD price is not a number: {}", n)))?,
        other => {
            return Err(CostError::PriceList(format!(
                "USD price has unexpected type: {}",
                other
            )))
        }
    };

    if price < Decimal::ZERO {
        return Err(CostError::PriceList(format!("Negative USD price: {}", price)));
    }
    Ok(price)
}

fn first_product(value: Value) -> Result<Value> {
    let Some(list) = value.get("PriceList") else {
        return Ok(value);
    };

    let first = list
        .as_array()
        .and_then(|entries| entries.first())
        .ok_or_else(|| {
            CostError::PriceList(
                "Price list is empty. Verify the filters used to fetch it.".to_string(),
            )
        })?;

    match first {
        Value::String(encoded) => Ok(serde_json::from_str(encoded)?),
        other => Ok(other.clone()),
    }
}

fn first_entry(value: &Value) -> Option<&Value> {
    value.as_object().and_then(|m| m.values().next())
}
