pub mod parallel;
pub mod validity;

use crate::error::{PolygonizerError, Result};
use geo::bounding_rect::BoundingRect;
use geo_types::{Coord, LineString};
use rstar::AABB;

pub use validity::is_simple_ring;

/// Returns the coordinates with consecutive duplicates collapsed.
pub fn remove_repeated_points(coords: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut out = Vec::with_capacity(coords.len());
    extend_distinct(&mut out, coords.iter());
    out
}

/// Appends `coords` to `out`, skipping any coordinate equal to the one
/// currently at the end of `out`.
pub fn extend_distinct<'a, I>(out: &mut Vec<Coord<f64>>, coords: I)
where
    I: IntoIterator<Item = &'a Coord<f64>>,
{
    for &c in coords {
        if out.last() != Some(&c) {
            out.push(c);
        }
    }
}

/// Finds the first coordinate of `test` that does not occur in `list`.
pub fn point_not_in_list(test: &[Coord<f64>], list: &[Coord<f64>]) -> Option<Coord<f64>> {
    test.iter().copied().find(|c| !list.contains(c))
}

/// Polar angle of the direction from `p0` to `p1`, in `(-PI, PI]`.
#[inline]
pub fn segment_angle(p0: Coord<f64>, p1: Coord<f64>) -> f64 {
    (p1.y - p0.y).atan2(p1.x - p0.x)
}

/// Builds a linear ring from a coordinate sequence.
///
/// A non-empty ring must be closed, have at least 4 coordinates and only
/// finite ordinates.
pub fn linear_ring(coords: &[Coord<f64>]) -> Result<LineString<f64>> {
    if coords.is_empty() {
        return Ok(LineString::new(Vec::new()));
    }
    if coords.len() < 4 {
        return Err(PolygonizerError::InvalidGeometry(format!(
            "linear ring needs at least 4 points, found {}",
            coords.len()
        )));
    }
    if coords.first() != coords.last() {
        return Err(PolygonizerError::InvalidGeometry(
            "linear ring is not closed".to_string(),
        ));
    }
    if let Some(bad) = coords.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(PolygonizerError::InvalidGeometry(format!(
            "linear ring has non-finite coordinate ({} {})",
            bad.x, bad.y
        )));
    }
    Ok(LineString::new(coords.to_vec()))
}

/// Envelope of a line as an rstar box, or `None` when the line is empty.
pub fn envelope(line: &LineString<f64>) -> Option<AABB<[f64; 2]>> {
    let bbox = line.bounding_rect()?;
    Some(AABB::from_corners(
        [bbox.min().x, bbox.min().y],
        [bbox.max().x, bbox.max().y],
    ))
}
