//! GeoJSON layer readers for the two input datasets.
//!
//! Source layers come from an ArcGIS feature service export, so
//! property names arrive in whatever casing and prefixing the service
//! used (`PARCELS.PARCEL_ID`, `ZoneClass`, ...). Names are normalized
//! (last dotted segment, lowercased, separators to underscores) before
//! any lookup, and parcel ids are pulled from a candidate list with
//! `objectid` and finally the feature position as fallbacks — a record
//! is never dropped for lacking a well-named id.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use geo::MultiPolygon;
use geojson::{Feature, GeoJson};
use serde_json::Value;
use zone_map_models::{Jurisdiction, RawDistrict, RawParcel};

use crate::error::PipelineError;

/// Property names tried, in order, for the parcel identifier.
const PARCEL_ID_CANDIDATES: &[&str] =
    &["parcel_id", "parid", "par_id", "pin", "parcelno", "parcel_no"];

/// Property names tried, in order, for the zoning code.
const ZONING_CODE_CANDIDATES: &[&str] = &["zoneclass", "zoning_code"];

/// Property names tried, in order, for the zoning description.
const ZONING_DESC_CANDIDATES: &[&str] = &["zonedesc", "zoning_desc"];

/// Reads a parcel layer from a GeoJSON `FeatureCollection` file.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file is missing, unreadable, or
/// not a `FeatureCollection`.
pub fn read_parcels(path: &Path) -> Result<Vec<RawParcel>, PipelineError> {
    let features = read_feature_collection(path)?;

    let parcels = features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let props = normalized_properties(&feature);
            let parcel_id = find_string(&props, PARCEL_ID_CANDIDATES)
                .or_else(|| find_string(&props, &["objectid"]))
                .unwrap_or_else(|| index.to_string());

            RawParcel {
                parcel_id,
                jurisdiction: find_jurisdiction(&props),
                geometry: to_multipolygon(feature.geometry),
            }
        })
        .collect::<Vec<_>>();

    log::info!("Read {} parcels from {}", parcels.len(), path.display());
    Ok(parcels)
}

/// Reads a zoning district layer from a GeoJSON `FeatureCollection`
/// file. Features without a zoning code are skipped with a warning;
/// a district that cannot be attributed to a code cannot participate
/// in any rollup.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file is missing, unreadable, or
/// not a `FeatureCollection`.
pub fn read_districts(path: &Path) -> Result<Vec<RawDistrict>, PipelineError> {
    let features = read_feature_collection(path)?;
    let total = features.len();

    let districts = features
        .into_iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let props = normalized_properties(&feature);
            let Some(zoning_code) = find_string(&props, ZONING_CODE_CANDIDATES) else {
                log::warn!("Skipping zoning feature {index}: no zoning code property");
                return None;
            };
            let zoning_id =
                find_string(&props, &["objectid"]).unwrap_or_else(|| index.to_string());

            Some(RawDistrict {
                zoning_id,
                zoning_code,
                zoning_desc: find_string(&props, ZONING_DESC_CANDIDATES),
                jurisdiction: find_jurisdiction(&props),
                geometry: to_multipolygon(feature.geometry),
            })
        })
        .collect::<Vec<_>>();

    log::info!(
        "Read {} zoning districts from {} ({} features skipped)",
        districts.len(),
        path.display(),
        total - districts.len()
    );
    Ok(districts)
}

fn read_feature_collection(path: &Path) -> Result<Vec<Feature>, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let raw = fs::read_to_string(path)?;
    match raw.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection.features),
        _ => Err(PipelineError::Input {
            message: format!("{} is not a GeoJSON FeatureCollection", path.display()),
        }),
    }
}

/// Normalizes an ArcGIS-style property name: keep the last dotted
/// segment, lowercase it, and collapse separators to underscores.
fn normalize_field(name: &str) -> String {
    let last = name.rsplit('.').next().unwrap_or(name);
    last.trim()
        .replace([' ', '-', '/'], "_")
        .to_lowercase()
}

/// Properties keyed by normalized name. On collisions the first
/// occurrence wins.
fn normalized_properties(feature: &Feature) -> BTreeMap<String, Value> {
    let mut props = BTreeMap::new();
    if let Some(map) = &feature.properties {
        for (key, value) in map {
            props.entry(normalize_field(key)).or_insert_with(|| value.clone());
        }
    }
    props
}

fn find_string(props: &BTreeMap<String, Value>, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find_map(|key| props.get(*key))
        .and_then(value_to_string)
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn find_jurisdiction(props: &BTreeMap<String, Value>) -> Jurisdiction {
    let code = match props.get("jurisdiction") {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    Jurisdiction::from(code)
}

/// Converts a GeoJSON geometry to a `MultiPolygon`, accepting both
/// `Polygon` and `MultiPolygon` features. Anything else (or a missing
/// geometry) becomes `None` and is flagged empty by the normalizer.
fn to_multipolygon(geometry: Option<geojson::Geometry>) -> Option<MultiPolygon<f64>> {
    let geometry = geometry?;
    let geo_geometry: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geometry {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        _ => None,
    }
}
