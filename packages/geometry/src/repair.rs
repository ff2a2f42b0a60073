//! Ordered repair strategy chain for invalid polygons.
//!
//! Strategies are tried in a fixed priority order until one yields a
//! valid, non-empty geometry or the chain is exhausted. Exhaustion is
//! not an error: the caller flags the geometry invalid and keeps it
//! for coverage accounting.

use geo::orient::{Direction, Orient};
use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon, Validation};
use zone_map_models::GeomStatus;

/// One repair strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStrategy {
    /// Drop degenerate rings (too few points, zero area), close any
    /// unclosed rings, and re-orient exteriors/interiors.
    CleanRings,
    /// Boolean self-union. Re-resolves the polygon's own contours
    /// under the union fill rule, which dissolves self-intersections;
    /// the planar analogue of a zero-distance buffer.
    SelfUnion,
}

/// The default repair chain, applied in order.
pub const REPAIR_CHAIN: &[RepairStrategy] = &[RepairStrategy::CleanRings, RepairStrategy::SelfUnion];

impl RepairStrategy {
    fn apply(self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        match self {
            Self::CleanRings => clean_rings(geometry),
            Self::SelfUnion => geometry.union(&MultiPolygon::new(Vec::new())),
        }
    }
}

/// Repairs a non-empty geometry, returning the (possibly rewritten)
/// geometry and its status flag.
///
/// Already-valid input comes back untouched as [`GeomStatus::Valid`].
/// Each strategy in [`REPAIR_CHAIN`] runs against the original input;
/// the first valid, non-empty result wins as [`GeomStatus::Repaired`].
/// If the chain is exhausted the original geometry is returned flagged
/// [`GeomStatus::Invalid`].
#[must_use]
pub fn repair(geometry: &MultiPolygon<f64>) -> (MultiPolygon<f64>, GeomStatus) {
    if geometry.is_valid() {
        return (geometry.clone(), GeomStatus::Valid);
    }

    for strategy in REPAIR_CHAIN {
        let candidate = strategy.apply(geometry);
        if !candidate.0.is_empty() && candidate.is_valid() {
            log::debug!("Repaired geometry via {strategy:?}");
            return (candidate, GeomStatus::Repaired);
        }
    }

    log::warn!("Geometry unrepairable after {} strategies", REPAIR_CHAIN.len());
    (geometry.clone(), GeomStatus::Invalid)
}

fn clean_rings(geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    let polygons: Vec<Polygon<f64>> = geometry
        .0
        .iter()
        .filter_map(|polygon| {
            let exterior = clean_ring(polygon.exterior())?;
            let interiors: Vec<LineString<f64>> =
                polygon.interiors().iter().filter_map(clean_ring).collect();
            Some(Polygon::new(exterior, interiors))
        })
        .collect();

    MultiPolygon::new(polygons).orient(Direction::Default)
}

/// Closes an unclosed ring, drops consecutive duplicate vertices, and
/// rejects rings that are degenerate (under four coordinates or zero
/// enclosed area).
fn clean_ring(ring: &LineString<f64>) -> Option<LineString<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len() + 1);
    for coord in &ring.0 {
        if coords.last() != Some(coord) {
            coords.push(*coord);
        }
    }
    if coords.first() != coords.last() {
        if let Some(first) = coords.first().copied() {
            coords.push(first);
        }
    }
    if coords.len() < 4 {
        return None;
    }

    let ring = LineString::new(coords);
    if Polygon::new(ring.clone(), Vec::new()).unsigned_area() == 0.0 {
        return None;
    }
    Some(ring)
}
