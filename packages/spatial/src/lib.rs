#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial join between parcels and zoning districts.
//!
//! Builds an R-tree over district envelopes, then for every usable
//! parcel computes the exact intersection geometry with each candidate
//! district. The quantity that matters downstream is the **area of the
//! intersection** — how much of this parcel falls in this district —
//! not the area of either input polygon. A parcel may legitimately
//! overlap several districts (boundary imprecision, genuine split
//! zoning); the resolver decides dominance afterwards, once the full
//! overlap set per parcel exists.

use geo::{Area, BooleanOps, BoundingRect, Intersects, MultiPolygon};
use rstar::{AABB, RTree, RTreeObject};
use zone_map_models::{Overlap, ParcelRecord, ZoningDistrict};

/// A zoning district's envelope in the R-tree, pointing back into the
/// district slice by index.
struct DistrictEntry {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for DistrictEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Computes the full overlap set between parcels and districts.
///
/// Parcels and districts with invalid or empty geometry never enter
/// the join; such parcels end up unassigned by construction and are
/// counted by the coverage auditor. Degenerate contacts (shared
/// boundaries, point touches) intersect with zero area and are
/// excluded here so they never reach the resolver as candidates.
#[must_use]
pub fn join(parcels: &[ParcelRecord], districts: &[ZoningDistrict]) -> Vec<Overlap> {
    let entries: Vec<DistrictEntry> = districts
        .iter()
        .enumerate()
        .filter(|(_, district)| district.geom_status.is_usable())
        .filter_map(|(index, district)| {
            Some(DistrictEntry {
                index,
                envelope: envelope_of(&district.geometry)?,
            })
        })
        .collect();
    let tree = RTree::bulk_load(entries);

    let mut overlaps = Vec::new();
    let mut joined_parcels = 0u64;

    for parcel in parcels {
        if !parcel.geom_status.is_usable() {
            continue;
        }
        let Some(parcel_envelope) = envelope_of(&parcel.geometry) else {
            continue;
        };

        let found_before = overlaps.len();
        for entry in tree.locate_in_envelope_intersecting(&parcel_envelope) {
            let district = &districts[entry.index];
            if !parcel.geometry.intersects(&district.geometry) {
                continue;
            }

            let overlap_area_m2 = parcel
                .geometry
                .intersection(&district.geometry)
                .unsigned_area();
            if overlap_area_m2 <= 0.0 {
                continue;
            }

            overlaps.push(Overlap {
                parcel_id: parcel.parcel_id.clone(),
                zoning_id: district.zoning_id.clone(),
                zoning_code: district.zoning_code.clone(),
                zoning_desc: district.zoning_desc.clone(),
                jurisdiction: district.jurisdiction,
                overlap_area_m2,
                parcel_area_m2: parcel.area_m2,
            });
        }
        if overlaps.len() > found_before {
            joined_parcels += 1;
        }
    }

    log::info!(
        "Spatial join: {} overlaps across {joined_parcels} parcels ({} districts indexed)",
        overlaps.len(),
        tree.size()
    );
    overlaps
}

fn envelope_of(geometry: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    let rect = geometry.bounding_rect()?;
    Some(AABB::from_corners(
        [rect.min().x, rect.min().y],
        [rect.max().x, rect.max().y],
    ))
}

#[cfg(test)]
mod tests {
    use geo::polygon;
    use zone_map_models::{GeomStatus, Jurisdiction};

    use super::*;

    fn parcel(id: &str, geometry: MultiPolygon<f64>, status: GeomStatus) -> ParcelRecord {
        let area = geometry.unsigned_area();
        ParcelRecord {
            parcel_id: id.to_string(),
            jurisdiction: Jurisdiction::Coded(10),
            geometry,
            geom_status: status,
            area_m2: if status.is_usable() { area } else { 0.0 },
        }
    }

    fn district(id: &str, code: &str, geometry: MultiPolygon<f64>) -> ZoningDistrict {
        ZoningDistrict {
            zoning_id: id.to_string(),
            zoning_code: code.to_string(),
            zoning_desc: None,
            jurisdiction: Jurisdiction::Coded(10),
            geometry,
            geom_status: GeomStatus::Valid,
        }
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
            (x: x0, y: y0),
        ]])
    }

    #[test]
    fn split_parcel_produces_one_overlap_per_district() {
        // 100x100 parcel straddling two districts 90/10.
        let parcels = vec![parcel("p1", square(0.0, 0.0, 100.0, 100.0), GeomStatus::Valid)];
        let districts = vec![
            district("1", "Z-A", square(0.0, 0.0, 90.0, 100.0)),
            district("2", "Z-B", square(90.0, 0.0, 200.0, 100.0)),
        ];

        let mut overlaps = join(&parcels, &districts);
        overlaps.sort_by(|a, b| a.zoning_code.cmp(&b.zoning_code));

        assert_eq!(overlaps.len(), 2);
        assert!((overlaps[0].overlap_area_m2 - 9_000.0).abs() < 1e-6);
        assert!((overlaps[1].overlap_area_m2 - 1_000.0).abs() < 1e-6);
        assert!((overlaps[0].parcel_area_m2 - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn touching_boundary_is_not_an_overlap() {
        // District shares an edge with the parcel; intersection is a
        // line, so no overlap record may be produced.
        let parcels = vec![parcel("p1", square(0.0, 0.0, 10.0, 10.0), GeomStatus::Valid)];
        let districts = vec![district("1", "Z-A", square(10.0, 0.0, 20.0, 10.0))];

        assert!(join(&parcels, &districts).is_empty());
    }

    #[test]
    fn disjoint_parcel_yields_no_overlaps() {
        let parcels = vec![parcel("p1", square(0.0, 0.0, 10.0, 10.0), GeomStatus::Valid)];
        let districts = vec![district("1", "Z-A", square(50.0, 50.0, 60.0, 60.0))];

        assert!(join(&parcels, &districts).is_empty());
    }

    #[test]
    fn invalid_and_empty_parcels_are_excluded_from_the_join() {
        let parcels = vec![
            parcel("bad", square(0.0, 0.0, 10.0, 10.0), GeomStatus::Invalid),
            parcel("none", MultiPolygon::new(Vec::new()), GeomStatus::Empty),
        ];
        let districts = vec![district("1", "Z-A", square(0.0, 0.0, 10.0, 10.0))];

        assert!(join(&parcels, &districts).is_empty());
    }

    #[test]
    fn unusable_districts_are_not_indexed() {
        let parcels = vec![parcel("p1", square(0.0, 0.0, 10.0, 10.0), GeomStatus::Valid)];
        let mut bad = district("1", "Z-A", square(0.0, 0.0, 10.0, 10.0));
        bad.geom_status = GeomStatus::Invalid;

        assert!(join(&parcels, &[bad]).is_empty());
    }
}
