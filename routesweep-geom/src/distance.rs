use geo::{Distance, Geodesic, Haversine};

use crate::point::Point;

/// Great-circle distance on the WGS84 sphere, in meters.
///
/// Adequate for the continuity checks in spec §3/§8, which only ever compare
/// distances on the order of a few meters to a few tens of meters.
#[must_use]
pub fn haversine(a: Point, b: Point) -> f64 {
    Haversine.distance(a.to_geo(), b.to_geo())
}

/// Ellipsoidal geodesic distance (Karney's algorithm), in meters.
///
/// Used wherever accuracy matters more than speed, notably edge-length
/// computation during graph construction (spec §4.C).
#[must_use]
pub fn geodesic(a: Point, b: Point) -> f64 {
    Geodesic.distance(a.to_geo(), b.to_geo())
}

/// Geodesic length of a polyline, summing the distance between consecutive points.
#[must_use]
pub fn geodesic_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|pair| geodesic(pair[0], pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_zero_for_identical_points() {
        let p = Point::new(-122.4, 37.7);
        assert_eq!(haversine(p, p), 0.0);
    }

    #[test]
    fn haversine_roughly_matches_known_distance() {
        // San Francisco to Oakland, roughly 13 km.
        let sf = Point::new(-122.4194, 37.7749);
        let oakland = Point::new(-122.2712, 37.8044);
        let d = haversine(sf, oakland);
        assert!((12_000.0..14_000.0).contains(&d), "got {d}");
    }

    #[test]
    fn geodesic_agrees_with_haversine_at_short_range() {
        let a = Point::new(-122.4194, 37.7749);
        let b = Point::new(-122.4184, 37.7759);
        let h = haversine(a, b);
        let g = geodesic(a, b);
        assert!((h - g).abs() < 1.0, "haversine={h} geodesic={g}");
    }
}
