//! Geometry primitives: geodesic distance, coordinate quantization, and
//! local-plane segment intersection.
//!
//! These are pure functions with no failure modes beyond numerical
//! degeneracies (collinear segments), which resolve to "no intersection"
//! rather than an error.

mod distance;
mod point;
mod projection;

pub use distance::{geodesic, geodesic_length, haversine};
pub use point::{quantize, quantize_coords, NodeId, Point, QUANTIZATION_NDIGITS};
pub use projection::{segment_intersect, LocalProjection};

/// Default maximum allowed gap between consecutive route points, in meters (spec §3).
pub const DEFAULT_MAX_GAP_M: f64 = 30.0;

/// Default vertex-snapping tolerance during graph construction, in meters (spec §4.C).
pub const DEFAULT_SNAP_TOLERANCE_M: f64 = 1.0;

/// Gap below which drift is silently absorbed rather than treated as a join (spec §4.E).
pub const DEFAULT_SNAP_EPS_M: f64 = 1.0;

/// Gap above which the routing oracle is consulted rather than directly joined (spec §4.E).
pub const DEFAULT_SMALL_JOIN_M: f64 = 15.0;
