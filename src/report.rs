//! Rendering of estimates and catalogs for the terminal
//!
//! Text output uses comfy-table; JSON keeps full decimal precision (amounts
//! are serialized as strings); CSV has one row per model component.

use std::str::FromStr;

use comfy_table::{Cell, CellAlignment, Table};
use console::style;
use rust_decimal::Decimal;

use crate::breakdown::CostBreakdown;
use crate::catalog::{InstanceCatalog, COLUMN_MEMORY, COLUMN_RATE, COLUMN_TYPE, COLUMN_VCPU};
use crate::error::{CostError, Result};
use crate::estimate::Estimate;
use crate::sizing::NodeSizingResult;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(CostError::validation(
                "output",
                format!("Unsupported output format: {}. Use 'text', 'json' or 'csv'", other),
            )),
        }
    }
}

fn money(v: Decimal) -> String {
    format!("${}", v.round_dp(2))
}

fn label(component: &str) -> &'static str {
    match component {
        "peak_hours" => "Peak hours",
        "normal_hours" => "Normal hours",
        "off_hours" => "Off hours",
        "control_plane" => "Control plane",
        "core_nodes" => "Core nodes",
        _ => "Other",
    }
}

pub fn render(estimate: &Estimate, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(estimate)),
        OutputFormat::Json => render_json(estimate),
        OutputFormat::Csv => render_csv(estimate),
    }
}

pub fn render_text(estimate: &Estimate) -> String {
    let p = &estimate.parameters;
    let mut out = String::new();

    out.push_str(&format!("{}\n", style("Monthly cost estimate").bold()));
    out.push_str(&format!(
        "Pod: {} vCPU, {} GiB\n",
        p.pod_cpu, p.pod_mem
    ));
    out.push_str(&format!(
        "Pods/hours: peak {}x{}h, normal {}x{}h, off-hours {}x{}h\n\n",
        p.peak_pods, p.peak_hours, p.normal_pods, p.normal_hours, p.off_hours_pods, p.off_hours
    ));

    let mut table = Table::new();
    table.set_header(vec!["Component", "Cluster", "Per task"]);
    let cluster = estimate.cluster.components();
    for (name, amount) in &cluster {
        let per_task = estimate
            .per_task
            .components()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| money(v))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(label(name)),
            Cell::new(money(*amount)).set_alignment(CellAlignment::Right),
            Cell::new(per_task).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(money(estimate.cluster.total)).set_alignment(CellAlignment::Right),
        Cell::new(money(estimate.per_task.total)).set_alignment(CellAlignment::Right),
    ]);
    out.push_str(&format!("{}\n", table));

    if let Some(tiers) = &estimate.cluster.tiers {
        let mut nodes = Table::new();
        nodes.set_header(vec!["Tier", "Instance type", "Rate/h", "Nodes", "Cost/day"]);
        for t in tiers {
            nodes.add_row(vec![
                Cell::new(t.tier),
                Cell::new(&t.instance_type),
                Cell::new(t.hourly_rate).set_alignment(CellAlignment::Right),
                Cell::new(t.nodes_required).set_alignment(CellAlignment::Right),
                Cell::new(money(t.tier_cost)).set_alignment(CellAlignment::Right),
            ]);
        }
        out.push_str(&format!("\n{}\n", nodes));
    }

    let premium = estimate.cluster_premium();
    let verdict = if premium > Decimal::ZERO {
        style(format!("Per-task billing is cheaper by {}", money(premium))).green()
    } else if premium < Decimal::ZERO {
        style(format!("Cluster billing is cheaper by {}", money(-premium))).green()
    } else {
        style("Both models cost the same".to_string()).yellow()
    };
    out.push_str(&format!("\n{}\n", verdict));
    out
}

pub fn render_json(estimate: &Estimate) -> Result<String> {
    Ok(serde_json::to_string_pretty(estimate)?)
}

pub fn render_csv(estimate: &Estimate) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["model", "component", "amount"])?;

    let models: [(&str, &CostBreakdown); 2] = [
        ("cluster", &estimate.cluster),
        ("per_task", &estimate.per_task),
    ];
    for (model, breakdown) in models {
        for (component, amount) in breakdown.components() {
            writer.write_record([model, component, amount.to_string().as_str()])?;
        }
        writer.write_record([model, "total", breakdown.total.to_string().as_str()])?;
    }

    finish_csv(writer)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| CostError::Io(std::io::Error::other(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| CostError::Io(std::io::Error::other(e.to_string())))
}

/// Render a single-tier sizing result
pub fn render_sizing(result: &NodeSizingResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format!(
            "{} tier: {} x{} at {}/h = {}/day",
            result.tier,
            result.instance_type,
            result.nodes_required,
            result.hourly_rate,
            money(result.tier_cost)
        )),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record([
                "tier",
                "instance_type",
                "hourly_rate",
                "nodes_required",
                "tier_cost",
            ])?;
            writer.write_record([
                result.tier.to_string(),
                result.instance_type.clone(),
                result.hourly_rate.to_string(),
                result.nodes_required.to_string(),
                result.tier_cost.to_string(),
            ])?;
            finish_csv(writer)
        }
    }
}

pub fn render_catalog(catalog: &InstanceCatalog) -> String {
    if catalog.is_empty() {
        return "No instance types loaded".to_string();
    }

    let mut table = Table::new();
    table.set_header(vec!["Instance type", "vCPU", "Memory (GiB)", "Rate/h"]);
    for r in catalog {
        table.add_row(vec![
            Cell::new(&r.type_name),
            Cell::new(r.vcpu_capacity).set_alignment(CellAlignment::Right),
            Cell::new(r.memory_capacity).set_alignment(CellAlignment::Right),
            Cell::new(r.hourly_rate).set_alignment(CellAlignment::Right),
        ]);
    }
    format!("{}\n{} instance types", table, catalog.len())
}

pub fn render_catalog_as(catalog: &InstanceCatalog, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_catalog(catalog)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(catalog.records())?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record([COLUMN_TYPE, COLUMN_RATE, COLUMN_VCPU, COLUMN_MEMORY])?;
            for r in catalog {
                writer.write_record([
                    r.type_name.clone(),
                    r.hourly_rate.to_string(),
                    r.vcpu_capacity.to_string(),
                    r.memory_capacity.to_string(),
                ])?;
            }
            finish_csv(writer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InstanceRecord;
    use crate::cluster::ClusterPricing;
    use crate::estimate::Estimator;
    use crate::input::EstimateRequest;
    use crate::per_task::PerTaskRates;
    use crate::profile::{PodFootprint, Tier, TierUsage, UsageProfile};
    use rust_decimal_macros::dec;

    fn sample() -> (InstanceCatalog, EstimateRequest) {
        let catalog = InstanceCatalog::from_records(vec![
            InstanceRecord::new("t3.large", dec!(0.0832), dec!(2), dec!(8)),
            InstanceRecord::new("m5a.2xlarge", dec!(0.344), dec!(8), dec!(32)),
        ]);
        let request = EstimateRequest::new(
            PodFootprint {
                cpu: dec!(0.5),
                mem_gib: dec!(1),
            },
            UsageProfile::new(
                TierUsage::new(10, 5),
                TierUsage::new(5, 10),
                TierUsage::new(2, 8),
            ),
        );
        (catalog, request)
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_text_mentions_both_models() {
        let (catalog, request) = sample();
        let estimate = Estimator::new(&catalog, ClusterPricing::default(), PerTaskRates::default())
            .estimate(&request)
            .unwrap();
        let text = render_text(&estimate);
        assert!(text.contains("Control plane"));
        assert!(text.contains("Per task"));
        assert!(text.contains("t3.large") || text.contains("m5a.2xlarge"));
    }

    #[test]
    fn test_render_json_roundtrips_totals() {
        let (catalog, request) = sample();
        let estimate = Estimator::new(&catalog, ClusterPricing::default(), PerTaskRates::default())
            .estimate(&request)
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&render_json(&estimate).unwrap()).unwrap();
        assert_eq!(json["cluster"]["total"], estimate.cluster.total.to_string());
        assert_eq!(json["parameters"]["peak_pods"], 10);
        assert!(json["per_task"].get("core_nodes").is_none());
    }

    #[test]
    fn test_render_csv_rows() {
        let (catalog, request) = sample();
        let estimate = Estimator::new(&catalog, ClusterPricing::default(), PerTaskRates::default())
            .estimate(&request)
            .unwrap();
        let csv = render_csv(&estimate).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "model,component,amount");
        // cluster: 5 components + total, per_task: 3 components + total
        assert_eq!(lines.len(), 1 + 6 + 4);
        assert!(lines.iter().any(|l| l.starts_with("per_task,total,")));
    }

    #[test]
    fn test_render_catalog() {
        let (catalog, _) = sample();
        let text = render_catalog(&catalog);
        assert!(text.contains("m5a.2xlarge"));
        assert!(text.contains("2 instance types"));
        assert_eq!(render_catalog(&InstanceCatalog::default()), "No instance types loaded");
    }

    #[test]
    fn test_catalog_csv_reloads() {
        let (catalog, _) = sample();
        let csv = render_catalog_as(&catalog, OutputFormat::Csv).unwrap();
        assert!(csv.starts_with("Instance_Type,Rate,vCPU,Memory"));
        assert_eq!(InstanceCatalog::from_reader(csv.as_bytes()), catalog);
    }

    #[test]
    fn test_render_sizing_formats() {
        let (catalog, request) = sample();
        let result = crate::sizing::NodeSizer::new(&catalog)
            .size_tier(Tier::OffHours, &request.footprint, request.profile.off_hours)
            .unwrap();

        let text = render_sizing(&result, OutputFormat::Text).unwrap();
        assert!(text.starts_with("off-hours tier:"));

        let csv = render_sizing(&result, OutputFormat::Csv).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "tier,instance_type,hourly_rate,nodes_required,tier_cost");
        assert!(lines[1].starts_with("off-hours,"));
        assert_eq!(lines.len(), 2);

        let json: serde_json::Value =
            serde_json::from_str(&render_sizing(&result, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["tier"], "off_hours");
    }
}
