#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometry normalization for parcels and zoning districts.
//!
//! Takes raw WGS84 polygon records, runs the repair strategy chain on
//! anything that fails strict validity, reprojects everything to a
//! fixed planar CRS (UTM meters), and computes footprint areas.
//! Reprojection always happens before any area computation; area in
//! geographic degrees is meaningless and never taken.
//!
//! Unrepairable and empty geometries are flagged, never dropped — the
//! coverage auditor counts them, and the spatial join skips them.

pub mod project;
pub mod repair;

use geo::{Area, MultiPolygon};
use zone_map_models::{GeomStatus, ParcelRecord, RawDistrict, RawParcel, ZoningDistrict};

/// Options for a normalization pass.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// UTM zone for the working planar CRS. Zone 14 covers the county
    /// this pipeline was built for; callers elsewhere pick their own.
    pub utm_zone: u8,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self { utm_zone: 14 }
    }
}

/// Normalizes raw parcels: repair, reproject, flag, compute area.
#[must_use]
pub fn normalize_parcels(raw: Vec<RawParcel>, options: NormalizeOptions) -> Vec<ParcelRecord> {
    let mut repaired_count = 0u64;
    let mut unusable_count = 0u64;

    let records: Vec<ParcelRecord> = raw
        .into_iter()
        .map(|parcel| {
            let (geometry, status, area_m2) = normalize_geometry(parcel.geometry, options);
            match status {
                GeomStatus::Repaired => repaired_count += 1,
                GeomStatus::Invalid | GeomStatus::Empty => {
                    log::debug!("Parcel {} geometry unusable: {status:?}", parcel.parcel_id);
                    unusable_count += 1;
                }
                GeomStatus::Valid => {}
            }
            ParcelRecord {
                parcel_id: parcel.parcel_id,
                jurisdiction: parcel.jurisdiction,
                geometry,
                geom_status: status,
                area_m2,
            }
        })
        .collect();

    log::info!(
        "Normalized {} parcels ({repaired_count} repaired, {unusable_count} unusable)",
        records.len()
    );
    records
}

/// Normalizes raw zoning districts: repair, reproject, flag.
#[must_use]
pub fn normalize_districts(raw: Vec<RawDistrict>, options: NormalizeOptions) -> Vec<ZoningDistrict> {
    let mut unusable_count = 0u64;

    let records: Vec<ZoningDistrict> = raw
        .into_iter()
        .map(|district| {
            let (geometry, status, _area) = normalize_geometry(district.geometry, options);
            if !status.is_usable() {
                log::debug!(
                    "Zoning district {} geometry unusable: {status:?}",
                    district.zoning_id
                );
                unusable_count += 1;
            }
            ZoningDistrict {
                zoning_id: district.zoning_id,
                zoning_code: district.zoning_code,
                zoning_desc: district.zoning_desc,
                jurisdiction: district.jurisdiction,
                geometry,
                geom_status: status,
            }
        })
        .collect();

    log::info!(
        "Normalized {} zoning districts ({unusable_count} unusable)",
        records.len()
    );
    records
}

/// Repairs and reprojects one geometry, returning the working-CRS
/// geometry, its status flag, and its area in square meters.
fn normalize_geometry(
    geometry: Option<MultiPolygon<f64>>,
    options: NormalizeOptions,
) -> (MultiPolygon<f64>, GeomStatus, f64) {
    let Some(geometry) = geometry else {
        return (MultiPolygon::new(Vec::new()), GeomStatus::Empty, 0.0);
    };
    if geometry.0.is_empty() {
        return (MultiPolygon::new(Vec::new()), GeomStatus::Empty, 0.0);
    }

    let (repaired, status) = repair::repair(&geometry);
    if !status.is_usable() {
        return (repaired, status, 0.0);
    }

    let projected = project::to_utm(&repaired, options.utm_zone);
    let area_m2 = projected.unsigned_area();
    (projected, status, area_m2)
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon};
    use zone_map_models::{GeomStatus, Jurisdiction, RawParcel};

    use super::*;

    fn square_near_omaha() -> MultiPolygon<f64> {
        // Roughly 0.01 degree square; ~1.1 km in latitude.
        MultiPolygon::new(vec![polygon![
            (x: -96.05, y: 41.10),
            (x: -96.04, y: 41.10),
            (x: -96.04, y: 41.11),
            (x: -96.05, y: 41.11),
            (x: -96.05, y: 41.10),
        ]])
    }

    #[test]
    fn valid_parcel_gets_meter_scale_area() {
        let parcels = normalize_parcels(
            vec![RawParcel {
                parcel_id: "p1".into(),
                jurisdiction: Jurisdiction::Coded(10),
                geometry: Some(square_near_omaha()),
            }],
            NormalizeOptions::default(),
        );

        assert_eq!(parcels[0].geom_status, GeomStatus::Valid);
        // A 0.01° square at 41°N is on the order of 1 km²; degree-area
        // would be 1e-4. Assert the magnitude is planar meters.
        assert!(parcels[0].area_m2 > 500_000.0, "area = {}", parcels[0].area_m2);
        assert!(parcels[0].area_m2 < 2_000_000.0, "area = {}", parcels[0].area_m2);
    }

    #[test]
    fn missing_geometry_is_flagged_empty_not_dropped() {
        let parcels = normalize_parcels(
            vec![RawParcel {
                parcel_id: "p1".into(),
                jurisdiction: Jurisdiction::Unknown,
                geometry: None,
            }],
            NormalizeOptions::default(),
        );

        assert_eq!(parcels.len(), 1);
        assert_eq!(parcels[0].geom_status, GeomStatus::Empty);
        assert!((parcels[0].area_m2 - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_multipolygon_is_flagged_empty() {
        let parcels = normalize_parcels(
            vec![RawParcel {
                parcel_id: "p1".into(),
                jurisdiction: Jurisdiction::Coded(10),
                geometry: Some(MultiPolygon::new(Vec::new())),
            }],
            NormalizeOptions::default(),
        );

        assert_eq!(parcels[0].geom_status, GeomStatus::Empty);
    }
}
