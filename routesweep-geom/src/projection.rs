use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};

use crate::point::Point;

/// Meters per degree of latitude; constant across longitude (spec §4.A).
const METERS_PER_DEGREE_LAT: f64 = 111_132.954;

/// A local tangent-plane projection centered on an area, used to do planar
/// geometry (segment intersection, spatial-index bounding boxes) without the
/// latitude-dependent distortion of working directly in degrees.
///
/// This generalizes this codebase's `DistanceApproximator` (a forward-only
/// projection for distance estimates) into a full forward/inverse projector,
/// since intersection detection needs to unproject crossing points back to
/// WGS84.
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    center: Point,
    meters_per_lon_degree: f64,
    meters_per_lat_degree: f64,
}

impl LocalProjection {
    /// Builds a projection centered on the given point (typically an area's
    /// polygon centroid).
    #[must_use]
    pub fn centered_on(center: Point) -> Self {
        let lon_scale = center.lat.to_radians().cos();
        Self {
            center,
            meters_per_lon_degree: lon_scale * METERS_PER_DEGREE_LAT,
            meters_per_lat_degree: METERS_PER_DEGREE_LAT,
        }
    }

    /// Projects a WGS84 point to local planar meters, relative to the center.
    #[must_use]
    pub fn project(&self, p: Point) -> (f64, f64) {
        let x = (p.lon - self.center.lon) * self.meters_per_lon_degree;
        let y = (p.lat - self.center.lat) * self.meters_per_lat_degree;
        (x, y)
    }

    /// Inverse of [`LocalProjection::project`].
    #[must_use]
    pub fn unproject(&self, xy: (f64, f64)) -> Point {
        Point::new(
            self.center.lon + xy.0 / self.meters_per_lon_degree,
            self.center.lat + xy.1 / self.meters_per_lat_degree,
        )
    }
}

/// True geometric crossing test between two segments (spec §4.A).
///
/// Collinear overlaps and parallel/non-crossing segments return `None`
/// rather than erroring: these are numerical degeneracies, not failures.
#[must_use]
pub fn segment_intersect(proj: &LocalProjection, s1: (Point, Point), s2: (Point, Point)) -> Option<Point> {
    let (a1x, a1y) = proj.project(s1.0);
    let (a2x, a2y) = proj.project(s1.1);
    let (b1x, b1y) = proj.project(s2.0);
    let (b2x, b2y) = proj.project(s2.1);

    let la = Line::new(Coord { x: a1x, y: a1y }, Coord { x: a2x, y: a2y });
    let lb = Line::new(Coord { x: b1x, y: b1y }, Coord { x: b2x, y: b2y });

    match line_intersection(la, lb)? {
        LineIntersection::SinglePoint { intersection, .. } => {
            Some(proj.unproject((intersection.x, intersection.y)))
        }
        // Collinear overlaps aren't a "crossing" in the sense §4.C needs
        // (there's no single new vertex to split at).
        LineIntersection::Collinear { .. } => None,
    }
}
