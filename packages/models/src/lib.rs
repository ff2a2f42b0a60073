#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record types shared across the parcel-to-zoning pipeline.
//!
//! Every pipeline stage consumes the complete output of its predecessor
//! and produces a fresh dataset of these value types; no stage mutates
//! another stage's records. Geometry lives on the ingest-side records
//! ([`ParcelRecord`], [`ZoningDistrict`]); everything downstream of the
//! resolver is plain tabular data.

use std::fmt;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// An administrative subdivision (municipality or unincorporated area).
///
/// Source layers carry jurisdiction as a numeric code that may be null
/// or blank, so "no jurisdiction" is an explicit variant rather than a
/// sentinel value — every consumer has to decide what it means for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Jurisdiction {
    /// A known jurisdiction code (e.g. `10`).
    Coded(u32),
    /// The source record carried no usable jurisdiction code.
    Unknown,
}

impl From<Option<u32>> for Jurisdiction {
    fn from(code: Option<u32>) -> Self {
        code.map_or(Self::Unknown, Self::Coded)
    }
}

impl From<Jurisdiction> for Option<u32> {
    fn from(jurisdiction: Jurisdiction) -> Self {
        match jurisdiction {
            Jurisdiction::Coded(code) => Some(code),
            Jurisdiction::Unknown => None,
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coded(code) => write!(f, "{code}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Outcome of the normalizer's validity/repair pass for one geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeomStatus {
    /// Valid as ingested; no repair needed.
    Valid,
    /// Invalid as ingested, made valid by a repair strategy.
    Repaired,
    /// Still invalid after every repair strategy.
    Invalid,
    /// Missing or empty geometry.
    Empty,
}

impl GeomStatus {
    /// Whether the geometry may participate in area computations and
    /// the spatial join. Invalid and empty geometries are retained for
    /// coverage accounting but excluded from all geometry math.
    #[must_use]
    pub const fn is_usable(self) -> bool {
        matches!(self, Self::Valid | Self::Repaired)
    }
}

/// A parcel as handed to the normalizer, before repair or reprojection.
#[derive(Debug, Clone)]
pub struct RawParcel {
    /// Stable parcel identifier from the source layer.
    pub parcel_id: String,
    /// Jurisdiction code from the source layer, if any.
    pub jurisdiction: Jurisdiction,
    /// Source geometry; `None` when the feature had no geometry.
    pub geometry: Option<MultiPolygon<f64>>,
}

/// A zoning district as handed to the normalizer.
#[derive(Debug, Clone)]
pub struct RawDistrict {
    /// Stable district identifier from the source layer.
    pub zoning_id: String,
    /// Zoning code (e.g. `"R-1"`). Shared across disjoint polygons.
    pub zoning_code: String,
    /// Human-readable description, when the layer provides one.
    pub zoning_desc: Option<String>,
    /// Jurisdiction the district belongs to.
    pub jurisdiction: Jurisdiction,
    /// Source geometry; `None` when the feature had no geometry.
    pub geometry: Option<MultiPolygon<f64>>,
}

/// A normalized parcel: repaired, reprojected to planar meters, flagged.
///
/// Identity (`parcel_id`) never changes after ingestion; repair may
/// rewrite coordinates but nothing else.
#[derive(Debug, Clone)]
pub struct ParcelRecord {
    pub parcel_id: String,
    pub jurisdiction: Jurisdiction,
    /// Geometry in the working planar CRS (meters). Empty when the
    /// source had none or repair emptied it.
    pub geometry: MultiPolygon<f64>,
    pub geom_status: GeomStatus,
    /// Full parcel footprint in square meters; `0.0` when unusable.
    pub area_m2: f64,
}

/// A normalized zoning district in the working planar CRS.
#[derive(Debug, Clone)]
pub struct ZoningDistrict {
    pub zoning_id: String,
    pub zoning_code: String,
    pub zoning_desc: Option<String>,
    pub jurisdiction: Jurisdiction,
    pub geometry: MultiPolygon<f64>,
    pub geom_status: GeomStatus,
}

/// One parcel/district intersection found by the spatial join.
///
/// Ephemeral: many overlaps may exist per parcel, and at most one is
/// promoted to a [`ParcelZoningAssignment`] by the resolver. Never
/// serialized or persisted.
#[derive(Debug, Clone)]
pub struct Overlap {
    pub parcel_id: String,
    pub zoning_id: String,
    pub zoning_code: String,
    pub zoning_desc: Option<String>,
    pub jurisdiction: Jurisdiction,
    /// Area of the intersection geometry, in square meters. Always
    /// strictly positive; zero-area contacts never become overlaps.
    pub overlap_area_m2: f64,
    /// Full footprint of the parcel, carried along so the resolver's
    /// output is self-contained.
    pub parcel_area_m2: f64,
}

/// The canonical one-row-per-parcel result of dominant-area resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelZoningAssignment {
    pub parcel_id: String,
    /// The single governing zoning code for this parcel.
    pub zoning_code: String,
    pub zoning_desc: Option<String>,
    /// Jurisdiction of the governing district.
    pub jurisdiction: Jurisdiction,
    /// Intersection area with the governing district, square meters.
    pub overlap_area_m2: f64,
    /// Full parcel footprint, square meters. Aggregation credits the
    /// whole footprint to the governing district, not just the overlap.
    pub parcel_area_m2: f64,
}

/// One aggregate row per (jurisdiction, zoning code) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionZoningSummary {
    pub jurisdiction: Jurisdiction,
    pub zoning_code: String,
    pub parcel_count: u64,
    /// Sum of full parcel footprints, square meters.
    pub total_area_m2: f64,
    /// Median parcel footprint; `None` for the synthetic "Other" row
    /// produced by the top-N reduction, where a median is meaningless.
    pub median_parcel_area_m2: Option<f64>,
    /// Share of the jurisdiction's parcel count, 0–100.
    pub pct_of_jurisdiction_parcels: f64,
    /// Share of the jurisdiction's land area, 0–100.
    pub pct_of_jurisdiction_area: f64,
}

/// Coverage metrics for one jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionCoverage {
    pub jurisdiction: Jurisdiction,
    pub parcels_total: u64,
    pub parcels_assigned: u64,
    /// `parcels_assigned / parcels_total`, as a percentage 0–100.
    pub pct_assigned: f64,
    pub geometry_invalid: u64,
    pub geometry_empty: u64,
}

/// Data-quality accounting over the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub parcels_total: u64,
    pub parcels_assigned: u64,
    pub pct_assigned: f64,
    pub geometry_invalid: u64,
    pub geometry_empty: u64,
    pub by_jurisdiction: Vec<JurisdictionCoverage>,
}
