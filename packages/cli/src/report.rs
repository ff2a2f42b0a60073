//! Tabular and JSON outputs for a completed run.
//!
//! The assignment table is the single source of truth for downstream
//! reporting; the summary table feeds tabular/comparison views and the
//! coverage report feeds the data-quality panel. Jurisdiction labels
//! are attached here and only here — everything upstream works on raw
//! codes.

use std::fs;
use std::path::Path;

use serde::Serialize;
use zone_map_config::JurisdictionLabels;
use zone_map_models::{CoverageReport, JurisdictionZoningSummary, ParcelZoningAssignment};

use crate::error::PipelineError;

#[derive(Debug, Serialize)]
struct AssignmentRow<'a> {
    parcel_id: &'a str,
    zoning_code: &'a str,
    zoning_desc: Option<&'a str>,
    jurisdiction: &'a str,
    overlap_area_m2: f64,
    parcel_area_m2: f64,
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    jurisdiction: String,
    jurisdiction_label: String,
    zoning_code: &'a str,
    parcel_count: u64,
    total_area_m2: f64,
    median_parcel_area_m2: Option<f64>,
    pct_of_jurisdiction_parcels: f64,
    pct_of_jurisdiction_area: f64,
}

/// Writes the one-row-per-parcel assignment table as CSV.
///
/// # Errors
///
/// Returns [`PipelineError`] on any write failure.
pub fn write_assignments(
    path: &Path,
    assignments: &[ParcelZoningAssignment],
) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path)?;
    for assignment in assignments {
        let jurisdiction = assignment.jurisdiction.to_string();
        writer.serialize(AssignmentRow {
            parcel_id: &assignment.parcel_id,
            zoning_code: &assignment.zoning_code,
            zoning_desc: assignment.zoning_desc.as_deref(),
            jurisdiction: &jurisdiction,
            overlap_area_m2: assignment.overlap_area_m2,
            parcel_area_m2: assignment.parcel_area_m2,
        })?;
    }
    writer.flush()?;

    log::info!("Wrote {} assignments to {}", assignments.len(), path.display());
    Ok(())
}

/// Writes the per-(jurisdiction, zoning code) summary table as CSV,
/// with display labels attached.
///
/// # Errors
///
/// Returns [`PipelineError`] on any write failure.
pub fn write_summary(
    path: &Path,
    rows: &[JurisdictionZoningSummary],
    labels: &JurisdictionLabels,
) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(SummaryRow {
            jurisdiction: row.jurisdiction.to_string(),
            jurisdiction_label: labels.label(row.jurisdiction),
            zoning_code: &row.zoning_code,
            parcel_count: row.parcel_count,
            total_area_m2: row.total_area_m2,
            median_parcel_area_m2: row.median_parcel_area_m2,
            pct_of_jurisdiction_parcels: row.pct_of_jurisdiction_parcels,
            pct_of_jurisdiction_area: row.pct_of_jurisdiction_area,
        })?;
    }
    writer.flush()?;

    log::info!("Wrote {} summary rows to {}", rows.len(), path.display());
    Ok(())
}

/// Writes the coverage report as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`PipelineError`] on any write failure.
pub fn write_coverage(path: &Path, report: &CoverageReport) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;

    log::info!("Wrote coverage report to {}", path.display());
    Ok(())
}
