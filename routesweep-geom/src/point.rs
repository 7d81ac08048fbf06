use serde::{Deserialize, Serialize};

/// A WGS84 `(longitude, latitude)` coordinate pair, in degrees.
///
/// Equality on `Point` is intentionally *not* derived: floating-point
/// coordinates should never be compared directly. Use [`quantize`] to get a
/// [`NodeId`], whose equality defines node identity for the rest of the crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    #[must_use]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    #[must_use]
    pub fn to_geo(self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }

    #[must_use]
    pub fn centroid_of(points: &[Point]) -> Option<Point> {
        if points.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = points.len() as f64;
        let (lon_sum, lat_sum) = points
            .iter()
            .fold((0.0, 0.0), |(lon, lat), p| (lon + p.lon, lat + p.lat));
        Some(Point::new(lon_sum / n, lat_sum / n))
    }
}

impl From<geo::Coord<f64>> for Point {
    fn from(c: geo::Coord<f64>) -> Self {
        Point::new(c.x, c.y)
    }
}

impl From<Point> for geo::Coord<f64> {
    fn from(p: Point) -> Self {
        geo::Coord { x: p.lon, y: p.lat }
    }
}

/// Number of decimal digits node identity is quantized to (~0.1 m at the equator).
pub const QUANTIZATION_NDIGITS: u32 = 6;

/// A quantized WGS84 point: the scaling factor for [`QUANTIZATION_NDIGITS`]
/// decimal digits, packed into integers rather than floats.
///
/// This is the whole point of quantization: two [`Point`]s that differ only
/// in float noise below the quantization threshold produce the *same*
/// `NodeId`, so node identity is exact integer equality, never float
/// comparison. This is what makes graph construction and gap-repair
/// terminate instead of looping on coordinates that "should" be equal but
/// aren't bit-for-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId {
    lon_micros: i32,
    lat_micros: i32,
}

const MICROS_PER_DEGREE: f64 = 1_000_000.0;

impl NodeId {
    #[must_use]
    pub fn lon(self) -> f64 {
        f64::from(self.lon_micros) / MICROS_PER_DEGREE
    }

    #[must_use]
    pub fn lat(self) -> f64 {
        f64::from(self.lat_micros) / MICROS_PER_DEGREE
    }

    #[must_use]
    pub fn to_point(self) -> Point {
        Point::new(self.lon(), self.lat())
    }
}

/// Defines node identity (spec §3, §9): rounds both coordinates to
/// [`QUANTIZATION_NDIGITS`] decimal places and packs them as integer
/// microdegrees.
#[must_use]
pub fn quantize(p: Point) -> NodeId {
    // lon/lat are bounded to [-180, 180] / [-90, 90], so microdegrees fit
    // comfortably within i32 (max magnitude ~1.8e8).
    #[allow(clippy::cast_possible_truncation)]
    let lon_micros = (p.lon * MICROS_PER_DEGREE).round() as i32;
    #[allow(clippy::cast_possible_truncation)]
    let lat_micros = (p.lat * MICROS_PER_DEGREE).round() as i32;
    NodeId {
        lon_micros,
        lat_micros,
    }
}

/// Rounds a point's coordinates to `ndigits` decimal places without packing
/// it into a [`NodeId`]. Used where quantized *coordinates* are needed but
/// node identity is not (e.g. re-aligning edge geometry endpoints).
#[must_use]
pub fn quantize_coords(p: Point, ndigits: u32) -> Point {
    let scale = 10f64.powi(i32::try_from(ndigits).unwrap_or(i32::MAX));
    Point::new((p.lon * scale).round() / scale, (p.lat * scale).round() / scale)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn quantize_snaps_subthreshold_noise() {
        let a = quantize(Point::new(-122.418_123_4, 37.774_929_1));
        let b = quantize(Point::new(-122.418_123_40000001, 37.774_929_099_999_99));
        assert_eq!(a, b);
    }

    #[test]
    fn quantize_distinguishes_real_differences() {
        let a = quantize(Point::new(-122.418_123, 37.774_929));
        let b = quantize(Point::new(-122.418_124, 37.774_929));
        assert_ne!(a, b);
    }

    #[test]
    fn node_id_ordering_is_total_and_matches_lon_lat_tuple() {
        let a = quantize(Point::new(-122.0, 37.0));
        let b = quantize(Point::new(-121.0, 37.0));
        assert!(a < b);
    }

    proptest! {
        /// Snap idempotence (spec §8): quantizing an already-quantized point's
        /// coordinates must reproduce the same `NodeId`, no matter how many
        /// times it round-trips through `to_point`.
        #[test]
        fn quantize_is_idempotent(lon in -180.0f64..180.0, lat in -90.0f64..90.0) {
            let once = quantize(Point::new(lon, lat));
            let twice = quantize(once.to_point());
            prop_assert_eq!(once, twice);
        }

        /// Node identity ordering (spec §8) must agree with lexicographic
        /// ordering on the underlying (lon, lat) microdegree pair, so that
        /// tiebreaking by `NodeId` is deterministic and reproducible.
        #[test]
        fn node_id_ordering_matches_micro_tuple(
            lon_a in -180.0f64..180.0, lat_a in -90.0f64..90.0,
            lon_b in -180.0f64..180.0, lat_b in -90.0f64..90.0,
        ) {
            let a = quantize(Point::new(lon_a, lat_a));
            let b = quantize(Point::new(lon_b, lat_b));
            let tuple_a = (a.lon(), a.lat());
            let tuple_b = (b.lon(), b.lat());
            prop_assert_eq!(a.cmp(&b), tuple_a.partial_cmp(&tuple_b).unwrap());
        }
    }
}
