#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coverage auditing: how many parcels got a zoning assignment, and
//! what stopped the rest.
//!
//! A pure accounting pass over normalizer flags and assignment
//! presence — no geometry math happens here, deliberately, so a
//! reporting bug can never alter the assignment logic it reports on.

use std::collections::{BTreeMap, HashMap, HashSet};

use zone_map_models::{
    CoverageReport, GeomStatus, Jurisdiction, JurisdictionCoverage, ParcelRecord,
    ParcelZoningAssignment,
};

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    total: u64,
    assigned: u64,
    invalid: u64,
    empty: u64,
}

impl Tally {
    #[allow(clippy::cast_precision_loss)]
    fn pct_assigned(self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.assigned as f64 / self.total as f64 * 100.0
    }
}

/// Builds the coverage report for a completed run.
///
/// A parcel counts as assigned when it appears in the assignment
/// table. Parcels with no jurisdiction of their own are attributed to
/// their assignment's jurisdiction when one exists, and to the unknown
/// bucket otherwise — unassigned parcels are surfaced, never silently
/// merged into some jurisdiction's totals.
#[must_use]
pub fn audit(parcels: &[ParcelRecord], assignments: &[ParcelZoningAssignment]) -> CoverageReport {
    let assigned_jurisdictions: HashMap<&str, Jurisdiction> = assignments
        .iter()
        .map(|a| (a.parcel_id.as_str(), a.jurisdiction))
        .collect();
    let assigned_ids: HashSet<&str> = assigned_jurisdictions.keys().copied().collect();

    let mut global = Tally::default();
    let mut per_jurisdiction: BTreeMap<Jurisdiction, Tally> = BTreeMap::new();

    for parcel in parcels {
        let assigned = assigned_ids.contains(parcel.parcel_id.as_str());
        let jurisdiction = match parcel.jurisdiction {
            coded @ Jurisdiction::Coded(_) => coded,
            Jurisdiction::Unknown => assigned_jurisdictions
                .get(parcel.parcel_id.as_str())
                .copied()
                .unwrap_or(Jurisdiction::Unknown),
        };

        let tally = per_jurisdiction.entry(jurisdiction).or_default();
        for t in [&mut global, tally] {
            t.total += 1;
            if assigned {
                t.assigned += 1;
            }
            match parcel.geom_status {
                GeomStatus::Invalid => t.invalid += 1,
                GeomStatus::Empty => t.empty += 1,
                GeomStatus::Valid | GeomStatus::Repaired => {}
            }
        }
    }

    let report = CoverageReport {
        parcels_total: global.total,
        parcels_assigned: global.assigned,
        pct_assigned: global.pct_assigned(),
        geometry_invalid: global.invalid,
        geometry_empty: global.empty,
        by_jurisdiction: per_jurisdiction
            .into_iter()
            .map(|(jurisdiction, tally)| JurisdictionCoverage {
                jurisdiction,
                parcels_total: tally.total,
                parcels_assigned: tally.assigned,
                pct_assigned: tally.pct_assigned(),
                geometry_invalid: tally.invalid,
                geometry_empty: tally.empty,
            })
            .collect(),
    };

    log::info!(
        "Coverage: {}/{} parcels assigned ({:.2}%), {} invalid, {} empty",
        report.parcels_assigned,
        report.parcels_total,
        report.pct_assigned,
        report.geometry_invalid,
        report.geometry_empty
    );
    report
}
