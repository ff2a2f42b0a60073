//! WGS84 → UTM reprojection.
//!
//! The working CRS is a UTM zone (meters), which keeps area and length
//! math honest at county scale. Zone 14N corresponds to the EPSG:26914
//! grid the source data was published against.

use geo::{MapCoords, MultiPolygon};

/// Reprojects every vertex from WGS84 degrees to UTM meters in the
/// given zone.
#[must_use]
pub fn to_utm(geometry: &MultiPolygon<f64>, zone: u8) -> MultiPolygon<f64> {
    geometry.map_coords(|coord| {
        let (northing, easting, _convergence) = utm::to_utm_wgs84(coord.y, coord.x, zone);
        geo::Coord {
            x: easting,
            y: northing,
        }
    })
}
