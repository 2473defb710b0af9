//! Tests for error propagation across the CLI boundary
//!
//! These tests verify that:
//! 1. Library errors keep their type when wrapped in anyhow context
//! 2. Each error family maps to its documented exit code
//! 3. Error messages name the offending field or tier

use std::io::Write;

use anyhow::Context;
use podcost::config::Config;
use podcost::error::{CatalogError, ConfigError};
use podcost::exit_codes::{codes, exit_code_for_anyhow, exit_code_for_error};
use podcost::{CostError, InstanceCatalog, NodeSizer, PodFootprint, RawRequest, Tier, TierUsage};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_missing_catalog_exits_103() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ec2_costs.csv");

    let err = InstanceCatalog::load(&path)
        .with_context(|| format!("Failed to load pricing catalog: {}", path.display()))
        .unwrap_err();

    assert_eq!(exit_code_for_anyhow(&err), codes::CATALOG_MISSING);
    assert_eq!(codes::CATALOG_MISSING, 103);
    assert!(format!("{:#}", err).contains("ec2_costs.csv"));
}

#[test]
fn test_no_qualifying_instance_message() {
    let catalog = InstanceCatalog::default();
    let footprint = PodFootprint::new(dec!(2), dec!(4)).unwrap();

    let err = NodeSizer::new(&catalog)
        .size_tier(Tier::OffHours, &footprint, TierUsage::new(1, 1))
        .unwrap_err();

    assert_eq!(exit_code_for_error(&err), codes::USER_ERROR);
    let message = err.to_string();
    assert!(message.contains("off-hours"), "message: {}", message);
}

#[test]
fn test_negative_input_is_validation_error() {
    let raw = RawRequest {
        pod_cpu: Some("1".to_string()),
        pod_mem: Some("2".to_string()),
        peak_pods: Some("-3".to_string()),
        peak_hours: Some("4".to_string()),
        ..RawRequest::default()
    };

    let err = raw.coerce().unwrap_err();
    match &err {
        CostError::Validation { field, .. } => assert_eq!(field, "peak_pods"),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(exit_code_for_error(&err), codes::USER_ERROR);

    let err = PodFootprint::new(dec!(-0.5), Decimal::ONE).unwrap_err();
    assert!(err.to_string().contains("pod_cpu"));
}

#[test]
fn test_unparseable_input_defaults_to_zero() {
    let raw = RawRequest {
        pod_cpu: Some("abc".to_string()),
        pod_mem: Some("2".to_string()),
        peak_pods: Some("three".to_string()),
        peak_hours: Some("".to_string()),
        ..RawRequest::default()
    };

    let request = raw.coerce().unwrap();
    assert_eq!(request.footprint.cpu, Decimal::ZERO);
    assert_eq!(request.footprint.mem_gib, dec!(2));
    assert_eq!(request.profile.peak, TierUsage::new(0, 0));
}

#[test]
fn test_invalid_config_exits_with_config_code() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[per_task]\nvcpu_hourly = -1\n").unwrap();
    file.flush().unwrap();

    let err = Config::load(Some(file.path())).unwrap_err();
    assert_eq!(exit_code_for_anyhow(&err), codes::CONFIG_ERROR);
    assert!(format!("{:#}", err).contains("per_task.vcpu_hourly"));

    let mut broken = NamedTempFile::new().unwrap();
    broken.write_all(b"[cluster\n").unwrap();
    broken.flush().unwrap();

    let err = Config::load(Some(broken.path())).unwrap_err();
    assert_eq!(exit_code_for_anyhow(&err), codes::CONFIG_ERROR);
}

#[test]
fn test_error_conversions() {
    let err: CostError = CatalogError::NotFound("x.csv".into()).into();
    assert!(matches!(err, CostError::Catalog(_)));
    assert!(err.to_string().contains("x.csv"));

    let err: CostError = ConfigError::ParseError("bad".to_string()).into();
    assert!(matches!(err, CostError::Config(_)));

    let err: CostError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
    assert_eq!(exit_code_for_error(&err), codes::SYSTEM_ERROR);
}

#[test]
fn test_huge_rate_from_catalog_reports_overflow() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"Instance_Type,Rate,vCPU,Memory\nhuge,1e20,1,1\n").unwrap();
    file.flush().unwrap();
    let catalog = InstanceCatalog::load(file.path()).unwrap();
    let footprint = PodFootprint::new(dec!(1), dec!(1)).unwrap();

    let err = NodeSizer::new(&catalog)
        .size_tier(Tier::Peak, &footprint, TierUsage::new(1_000_000_000, 24))
        .unwrap_err();

    assert!(matches!(err, CostError::Overflow { .. }));
    assert!(!err.is_no_qualifying_instance());
    assert_eq!(exit_code_for_error(&err), codes::USER_ERROR);
}
