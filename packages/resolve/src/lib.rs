#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dominant-area resolution: many overlaps in, at most one assignment
//! per parcel out.
//!
//! The overlap with the strictly largest intersection area wins. Equal
//! maxima are broken by ascending zoning district id — a total, stable
//! order, so identical inputs always produce identical assignments no
//! matter how the overlap set was ordered. Every parcel therefore maps
//! to at most one zoning code, which is what makes all downstream
//! aggregation free of double-counting.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use zone_map_models::{Overlap, ParcelZoningAssignment};

/// Reduces the overlap set to one assignment per parcel.
///
/// Parcels absent from the overlap set simply produce no assignment;
/// "unassigned" is a legitimate outcome reported by coverage, not an
/// error. Output is sorted by parcel id.
#[must_use]
pub fn resolve(overlaps: Vec<Overlap>) -> Vec<ParcelZoningAssignment> {
    let mut by_parcel: BTreeMap<String, Vec<Overlap>> = BTreeMap::new();
    for overlap in overlaps {
        by_parcel
            .entry(overlap.parcel_id.clone())
            .or_default()
            .push(overlap);
    }

    let assignments: Vec<ParcelZoningAssignment> = by_parcel
        .into_values()
        .filter_map(|group| dominant(group).map(into_assignment))
        .collect();

    log::info!("Resolved {} parcel zoning assignments", assignments.len());
    assignments
}

/// Picks the winning overlap for one parcel's candidate group.
fn dominant(group: Vec<Overlap>) -> Option<Overlap> {
    group.into_iter().filter(|o| o.overlap_area_m2 > 0.0).fold(
        None,
        |best, candidate| match best {
            None => Some(candidate),
            Some(best) => Some(match candidate
                .overlap_area_m2
                .total_cmp(&best.overlap_area_m2)
            {
                Ordering::Greater => candidate,
                Ordering::Equal if candidate.zoning_id < best.zoning_id => candidate,
                _ => best,
            }),
        },
    )
}

fn into_assignment(overlap: Overlap) -> ParcelZoningAssignment {
    ParcelZoningAssignment {
        parcel_id: overlap.parcel_id,
        zoning_code: overlap.zoning_code,
        zoning_desc: overlap.zoning_desc,
        jurisdiction: overlap.jurisdiction,
        overlap_area_m2: overlap.overlap_area_m2,
        parcel_area_m2: overlap.parcel_area_m2,
    }
}
