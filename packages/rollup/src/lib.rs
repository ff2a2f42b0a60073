#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Jurisdiction-aware zoning rollups.
//!
//! Aggregates resolved parcel assignments into per-(jurisdiction,
//! zoning code) summary rows, with an optional jurisdiction filter.
//! The filter runs in two steps, districts first: restrict zoning
//! districts to the selected jurisdictions, collect the zoning codes
//! that survive, then restrict assignments to those codes. Filtering
//! in this order is the contract that keeps map geometry and tabular
//! counts mutually consistent under a jurisdiction selection.
//!
//! Summaries are recomputed from scratch on every run, never updated
//! incrementally.

use std::collections::{BTreeMap, BTreeSet};

use zone_map_models::{
    Jurisdiction, JurisdictionZoningSummary, ParcelZoningAssignment, ZoningDistrict,
};

/// Zoning code used for the synthetic remainder row of the top-N
/// reduction.
pub const OTHER_CODE: &str = "Other";

/// Jurisdiction selection for a rollup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JurisdictionFilter {
    /// No filtering; every jurisdiction participates.
    All,
    /// Only the listed jurisdictions participate.
    Only(BTreeSet<Jurisdiction>),
}

impl JurisdictionFilter {
    /// Builds a filter from a list of jurisdiction codes; an empty
    /// list means no filtering.
    #[must_use]
    pub fn from_codes(codes: &[u32]) -> Self {
        if codes.is_empty() {
            Self::All
        } else {
            Self::Only(codes.iter().copied().map(Jurisdiction::Coded).collect())
        }
    }

    fn matches(&self, jurisdiction: Jurisdiction) -> bool {
        match self {
            Self::All => true,
            Self::Only(set) => set.contains(&jurisdiction),
        }
    }
}

/// The metric a top-N reduction or ranking operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    ParcelCount,
    LandArea,
}

impl Metric {
    fn value(self, row: &JurisdictionZoningSummary) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::ParcelCount => row.parcel_count as f64,
            Self::LandArea => row.total_area_m2,
        }
    }
}

/// One zoning code's cells across the jurisdictions of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub zoning_code: String,
    /// One cell per compared jurisdiction, in the caller's order. A
    /// code absent from a jurisdiction contributes a zero cell, not a
    /// missing one.
    pub cells: Vec<ComparisonCell>,
}

/// A single jurisdiction's contribution to a comparison row.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonCell {
    pub jurisdiction: Jurisdiction,
    pub parcel_count: u64,
    pub total_area_m2: f64,
}

/// Rolls up assignments into one summary row per (jurisdiction,
/// zoning code) pair present in the filtered input.
///
/// Land area sums full parcel footprints — a parcel's whole area
/// counts toward its governing district, not just the overlap slice.
/// Percent-of-jurisdiction shares use the filtered jurisdiction's own
/// totals as denominators, never the global dataset, so shares stay
/// comparable across jurisdictions. An empty filter result is an
/// empty vec, not an error.
#[must_use]
pub fn summarize(
    assignments: &[ParcelZoningAssignment],
    districts: &[ZoningDistrict],
    filter: &JurisdictionFilter,
) -> Vec<JurisdictionZoningSummary> {
    // Step 1: restrict districts to the jurisdiction selection.
    let allowed_codes: BTreeSet<&str> = districts
        .iter()
        .filter(|district| filter.matches(district.jurisdiction))
        .map(|district| district.zoning_code.as_str())
        .collect();

    // Step 2: restrict assignments to the surviving zoning codes.
    let filtered: Vec<&ParcelZoningAssignment> = assignments
        .iter()
        .filter(|assignment| allowed_codes.contains(assignment.zoning_code.as_str()))
        .collect();

    // Step 3: aggregate the twice-filtered set.
    let mut groups: BTreeMap<(Jurisdiction, String), Vec<f64>> = BTreeMap::new();
    for assignment in &filtered {
        groups
            .entry((assignment.jurisdiction, assignment.zoning_code.clone()))
            .or_default()
            .push(assignment.parcel_area_m2);
    }

    let mut jurisdiction_parcels: BTreeMap<Jurisdiction, u64> = BTreeMap::new();
    let mut jurisdiction_area: BTreeMap<Jurisdiction, f64> = BTreeMap::new();
    for assignment in &filtered {
        *jurisdiction_parcels.entry(assignment.jurisdiction).or_default() += 1;
        *jurisdiction_area.entry(assignment.jurisdiction).or_default() +=
            assignment.parcel_area_m2;
    }

    let rows: Vec<JurisdictionZoningSummary> = groups
        .into_iter()
        .map(|((jurisdiction, zoning_code), areas)| {
            let parcel_count = areas.len() as u64;
            let total_area_m2: f64 = areas.iter().sum();
            let denom_parcels = jurisdiction_parcels[&jurisdiction];
            let denom_area = jurisdiction_area[&jurisdiction];

            JurisdictionZoningSummary {
                jurisdiction,
                zoning_code,
                parcel_count,
                total_area_m2,
                median_parcel_area_m2: median(areas),
                pct_of_jurisdiction_parcels: percent_of_counts(parcel_count, denom_parcels),
                pct_of_jurisdiction_area: percent_of(total_area_m2, denom_area),
            }
        })
        .collect();

    log::info!(
        "Rollup: {} rows from {} assignments ({} zoning codes in scope)",
        rows.len(),
        filtered.len(),
        allowed_codes.len()
    );
    rows
}

/// Summarizes several jurisdictions side by side.
///
/// Each jurisdiction is rolled up independently (its own two-step
/// filter, its own denominators); results are then paired by zoning
/// code in the caller's jurisdiction order, zero-filling codes a
/// jurisdiction doesn't have.
#[must_use]
pub fn compare(
    assignments: &[ParcelZoningAssignment],
    districts: &[ZoningDistrict],
    jurisdictions: &[Jurisdiction],
) -> Vec<ComparisonRow> {
    let per_jurisdiction: Vec<Vec<JurisdictionZoningSummary>> = jurisdictions
        .iter()
        .map(|&jurisdiction| {
            let filter = JurisdictionFilter::Only(BTreeSet::from([jurisdiction]));
            summarize(assignments, districts, &filter)
        })
        .collect();

    let codes: BTreeSet<String> = per_jurisdiction
        .iter()
        .flatten()
        .map(|row| row.zoning_code.clone())
        .collect();

    codes
        .into_iter()
        .map(|zoning_code| {
            let cells = jurisdictions
                .iter()
                .zip(&per_jurisdiction)
                .map(|(&jurisdiction, rows)| {
                    rows.iter()
                        .find(|row| {
                            row.zoning_code == zoning_code && row.jurisdiction == jurisdiction
                        })
                        .map_or(
                            ComparisonCell {
                                jurisdiction,
                                parcel_count: 0,
                                total_area_m2: 0.0,
                            },
                            |row| ComparisonCell {
                                jurisdiction,
                                parcel_count: row.parcel_count,
                                total_area_m2: row.total_area_m2,
                            },
                        )
                })
                .collect();
            ComparisonRow { zoning_code, cells }
        })
        .collect()
}

/// Keeps the `n` largest rows per jurisdiction by the active metric
/// and collapses the rest into a synthetic [`OTHER_CODE`] row.
///
/// The remainder row's count and area are the sums of the collapsed
/// rows, so the active metric's grand total is preserved exactly. Its
/// median is `None` — a median of a mixed bag is meaningless.
#[must_use]
pub fn top_n_with_other(
    rows: Vec<JurisdictionZoningSummary>,
    n: usize,
    metric: Metric,
) -> Vec<JurisdictionZoningSummary> {
    let mut by_jurisdiction: BTreeMap<Jurisdiction, Vec<JurisdictionZoningSummary>> =
        BTreeMap::new();
    for row in rows {
        by_jurisdiction.entry(row.jurisdiction).or_default().push(row);
    }

    let mut out = Vec::new();
    for (jurisdiction, mut group) in by_jurisdiction {
        group.sort_by(|a, b| {
            metric
                .value(b)
                .total_cmp(&metric.value(a))
                .then_with(|| a.zoning_code.cmp(&b.zoning_code))
        });

        let rest = if group.len() > n {
            group.split_off(n)
        } else {
            Vec::new()
        };
        out.append(&mut group);

        if !rest.is_empty() {
            out.push(JurisdictionZoningSummary {
                jurisdiction,
                zoning_code: OTHER_CODE.to_string(),
                parcel_count: rest.iter().map(|row| row.parcel_count).sum(),
                total_area_m2: rest.iter().map(|row| row.total_area_m2).sum(),
                median_parcel_area_m2: None,
                pct_of_jurisdiction_parcels: rest
                    .iter()
                    .map(|row| row.pct_of_jurisdiction_parcels)
                    .sum(),
                pct_of_jurisdiction_area: rest
                    .iter()
                    .map(|row| row.pct_of_jurisdiction_area)
                    .sum(),
            });
        }
    }
    out
}

fn median(mut areas: Vec<f64>) -> Option<f64> {
    if areas.is_empty() {
        return None;
    }
    areas.sort_by(f64::total_cmp);
    let mid = areas.len() / 2;
    if areas.len() % 2 == 0 {
        Some(f64::midpoint(areas[mid - 1], areas[mid]))
    } else {
        Some(areas[mid])
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent_of_counts(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 { 0.0 } else { part / whole * 100.0 }
}

#[cfg(test)]
mod tests {
    use geo::MultiPolygon;
    use zone_map_models::GeomStatus;

    use super::*;

    fn assignment(
        parcel: &str,
        code: &str,
        jurisdiction: u32,
        area: f64,
    ) -> ParcelZoningAssignment {
        ParcelZoningAssignment {
            parcel_id: parcel.to_string(),
            zoning_code: code.to_string(),
            zoning_desc: None,
            jurisdiction: Jurisdiction::Coded(jurisdiction),
            overlap_area_m2: area,
            parcel_area_m2: area,
        }
    }

    fn district(id: &str, code: &str, jurisdiction: u32) -> ZoningDistrict {
        ZoningDistrict {
            zoning_id: id.to_string(),
            zoning_code: code.to_string(),
            zoning_desc: None,
            jurisdiction: Jurisdiction::Coded(jurisdiction),
            geometry: MultiPolygon::new(Vec::new()),
            geom_status: GeomStatus::Valid,
        }
    }

    fn fixture() -> (Vec<ParcelZoningAssignment>, Vec<ZoningDistrict>) {
        let assignments = vec![
            assignment("p1", "R-1", 10, 1_000.0),
            assignment("p2", "R-1", 10, 3_000.0),
            assignment("p3", "C-1", 10, 2_000.0),
            assignment("p4", "AG", 20, 40_000.0),
            assignment("p5", "AG", 20, 60_000.0),
        ];
        let districts = vec![
            district("1", "R-1", 10),
            district("2", "C-1", 10),
            district("3", "AG", 20),
        ];
        (assignments, districts)
    }

    #[test]
    fn area_is_conserved_across_summary_rows() {
        let (assignments, districts) = fixture();
        let rows = summarize(&assignments, &districts, &JurisdictionFilter::All);

        let summed: f64 = rows
            .iter()
            .filter(|row| row.jurisdiction == Jurisdiction::Coded(10))
            .map(|row| row.total_area_m2)
            .sum();
        let direct: f64 = assignments
            .iter()
            .filter(|a| a.jurisdiction == Jurisdiction::Coded(10))
            .map(|a| a.parcel_area_m2)
            .sum();
        assert!((summed - direct).abs() < 1e-9);
    }

    #[test]
    fn percent_shares_close_to_one_hundred() {
        let (assignments, districts) = fixture();
        let rows = summarize(&assignments, &districts, &JurisdictionFilter::All);

        for jurisdiction in [Jurisdiction::Coded(10), Jurisdiction::Coded(20)] {
            let parcel_pct: f64 = rows
                .iter()
                .filter(|row| row.jurisdiction == jurisdiction)
                .map(|row| row.pct_of_jurisdiction_parcels)
                .sum();
            let area_pct: f64 = rows
                .iter()
                .filter(|row| row.jurisdiction == jurisdiction)
                .map(|row| row.pct_of_jurisdiction_area)
                .sum();
            assert!((parcel_pct - 100.0).abs() < 1e-9, "{jurisdiction}: {parcel_pct}");
            assert!((area_pct - 100.0).abs() < 1e-9, "{jurisdiction}: {area_pct}");
        }
    }

    #[test]
    fn median_is_computed_per_row() {
        let (assignments, districts) = fixture();
        let rows = summarize(&assignments, &districts, &JurisdictionFilter::All);

        let r1 = rows
            .iter()
            .find(|row| row.zoning_code == "R-1")
            .expect("R-1 row");
        assert_eq!(r1.parcel_count, 2);
        assert_eq!(r1.median_parcel_area_m2, Some(2_000.0));
    }

    #[test]
    fn two_step_filter_matches_direct_jurisdiction_restriction() {
        let (assignments, districts) = fixture();
        let filter = JurisdictionFilter::from_codes(&[20]);
        let rows = summarize(&assignments, &districts, &filter);

        let filtered_total: u64 = rows.iter().map(|row| row.parcel_count).sum();
        let direct_total = assignments
            .iter()
            .filter(|a| a.jurisdiction == Jurisdiction::Coded(20))
            .count() as u64;
        assert_eq!(filtered_total, direct_total);
        assert!(rows.iter().all(|row| row.jurisdiction == Jurisdiction::Coded(20)));
    }

    #[test]
    fn empty_filter_result_is_an_empty_vec() {
        let (assignments, districts) = fixture();
        let filter = JurisdictionFilter::from_codes(&[99]);
        assert!(summarize(&assignments, &districts, &filter).is_empty());
    }

    #[test]
    fn denominators_are_per_jurisdiction_not_global() {
        let (assignments, districts) = fixture();
        let rows = summarize(&assignments, &districts, &JurisdictionFilter::All);

        // AG is 2 of jurisdiction 20's 2 parcels: 100%, even though it
        // is only 2 of 5 parcels globally.
        let ag = rows
            .iter()
            .find(|row| row.zoning_code == "AG")
            .expect("AG row");
        assert!((ag.pct_of_jurisdiction_parcels - 100.0).abs() < 1e-9);
    }

    #[test]
    fn comparison_zero_fills_missing_codes() {
        let (assignments, districts) = fixture();
        let rows = compare(
            &assignments,
            &districts,
            &[Jurisdiction::Coded(10), Jurisdiction::Coded(20)],
        );

        let ag = rows
            .iter()
            .find(|row| row.zoning_code == "AG")
            .expect("AG row");
        assert_eq!(ag.cells.len(), 2);
        assert_eq!(ag.cells[0].parcel_count, 0);
        assert!((ag.cells[0].total_area_m2 - 0.0).abs() < f64::EPSILON);
        assert_eq!(ag.cells[1].parcel_count, 2);
    }

    #[test]
    fn top_n_reduction_preserves_grand_totals() {
        let (assignments, districts) = fixture();
        let rows = summarize(&assignments, &districts, &JurisdictionFilter::All);

        let count_before: u64 = rows.iter().map(|row| row.parcel_count).sum();
        let area_before: f64 = rows.iter().map(|row| row.total_area_m2).sum();

        let reduced = top_n_with_other(rows, 1, Metric::ParcelCount);

        let count_after: u64 = reduced.iter().map(|row| row.parcel_count).sum();
        let area_after: f64 = reduced.iter().map(|row| row.total_area_m2).sum();
        assert_eq!(count_before, count_after);
        assert!((area_before - area_after).abs() < 1e-9);
    }

    #[test]
    fn top_n_keeps_largest_rows_and_collapses_the_rest() {
        let (assignments, districts) = fixture();
        let rows = summarize(&assignments, &districts, &JurisdictionFilter::All);
        let reduced = top_n_with_other(rows, 1, Metric::ParcelCount);

        let j10: Vec<&JurisdictionZoningSummary> = reduced
            .iter()
            .filter(|row| row.jurisdiction == Jurisdiction::Coded(10))
            .collect();
        assert_eq!(j10.len(), 2);
        assert_eq!(j10[0].zoning_code, "R-1");
        assert_eq!(j10[1].zoning_code, OTHER_CODE);
        assert_eq!(j10[1].median_parcel_area_m2, None);
    }

    #[test]
    fn top_n_larger_than_group_adds_no_other_row() {
        let (assignments, districts) = fixture();
        let rows = summarize(&assignments, &districts, &JurisdictionFilter::All);
        let reduced = top_n_with_other(rows.clone(), 10, Metric::LandArea);

        assert_eq!(reduced.len(), rows.len());
        assert!(reduced.iter().all(|row| row.zoning_code != OTHER_CODE));
    }
}
