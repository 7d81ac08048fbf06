use serde::{Deserialize, Serialize};

use routesweep_geom::Point;
use routesweep_graph::StreetFeature;
use routesweep_oracle::Profile;

use crate::error::PipelineError;

/// A polygon or multipolygon service area (spec §6 input contract). Rings
/// are carried as-is; the pipeline only ever needs their combined centroid
/// (for the local projection) and flattened point set (for spatial indexing
/// bounds), never polygon containment tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaPolygon {
    Polygon(Vec<Point>),
    MultiPolygon(Vec<Vec<Point>>),
}

impl AreaPolygon {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            AreaPolygon::Polygon(ring) => ring.is_empty(),
            AreaPolygon::MultiPolygon(rings) => rings.iter().all(Vec::is_empty),
        }
    }

    /// All ring points flattened, used to derive the local projection's
    /// centroid (spec §4.A).
    #[must_use]
    pub fn flattened_points(&self) -> Vec<Point> {
        match self {
            AreaPolygon::Polygon(ring) => ring.clone(),
            AreaPolygon::MultiPolygon(rings) => rings.iter().flatten().copied().collect(),
        }
    }
}

/// The sole configuration surface for a sweeping run (spec §4.I, §6).
/// Validated eagerly by [`GenerateRequest::validate`] before any pipeline
/// stage runs; defaults live as associated constants next to the fields
/// they govern rather than as scattered magic numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub polygon: AreaPolygon,
    pub street_features: Vec<StreetFeature>,
    #[serde(default)]
    pub profile: Profile,
    pub start_point: Option<Point>,
    #[serde(default = "GenerateRequest::default_chunk_duration_s")]
    pub chunk_duration_s: u32,
    #[serde(default = "GenerateRequest::default_max_gap_m")]
    pub max_gap_m: f64,
    #[serde(default = "GenerateRequest::default_snap_tolerance_m")]
    pub snap_tolerance_m: f64,
    #[serde(default = "GenerateRequest::default_small_join_m")]
    pub small_join_m: f64,
    #[serde(default = "GenerateRequest::default_oracle_concurrency")]
    pub oracle_concurrency: usize,
    #[serde(default)]
    pub oracle_call_budget: Option<u32>,
}

impl GenerateRequest {
    pub const CHUNK_DURATION_S_RANGE: std::ops::RangeInclusive<u32> = 600..=7200;

    #[must_use]
    pub fn default_chunk_duration_s() -> u32 {
        3600
    }
    #[must_use]
    pub fn default_max_gap_m() -> f64 {
        routesweep_geom::DEFAULT_MAX_GAP_M
    }
    #[must_use]
    pub fn default_snap_tolerance_m() -> f64 {
        routesweep_geom::DEFAULT_SNAP_TOLERANCE_M
    }
    #[must_use]
    pub fn default_small_join_m() -> f64 {
        routesweep_geom::DEFAULT_SMALL_JOIN_M
    }
    #[must_use]
    pub fn default_oracle_concurrency() -> usize {
        4
    }

    /// Eager range/emptiness validation (spec §4.I, §7 `InvalidInput`).
    ///
    /// # Errors
    /// Returns [`PipelineError::InvalidInput`] with a reason describing the
    /// first violation found.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.polygon.is_empty() {
            return Err(PipelineError::InvalidInput("polygon has no points".into()));
        }
        if self.street_features.is_empty() {
            return Err(PipelineError::InvalidInput("street_features is empty".into()));
        }
        if !Self::CHUNK_DURATION_S_RANGE.contains(&self.chunk_duration_s) {
            return Err(PipelineError::InvalidInput(format!(
                "chunk_duration_s {} outside allowed range {:?}",
                self.chunk_duration_s,
                Self::CHUNK_DURATION_S_RANGE
            )));
        }
        if self.max_gap_m <= 0.0 {
            return Err(PipelineError::InvalidInput("max_gap_m must be positive".into()));
        }
        if self.snap_tolerance_m <= 0.0 {
            return Err(PipelineError::InvalidInput("snap_tolerance_m must be positive".into()));
        }
        if self.small_join_m <= 0.0 {
            return Err(PipelineError::InvalidInput("small_join_m must be positive".into()));
        }
        if self.small_join_m >= self.max_gap_m {
            return Err(PipelineError::InvalidInput(
                "small_join_m must be smaller than max_gap_m".into(),
            ));
        }
        if self.oracle_concurrency == 0 {
            return Err(PipelineError::InvalidInput("oracle_concurrency must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use routesweep_graph::{RoadClass, Tags};

    fn minimal_request() -> GenerateRequest {
        GenerateRequest {
            polygon: AreaPolygon::Polygon(vec![
                Point::new(0.0, 0.0),
                Point::new(0.001, 0.0),
                Point::new(0.001, 0.001),
                Point::new(0.0, 0.001),
            ]),
            street_features: vec![StreetFeature {
                points: vec![Point::new(0.0, 0.0), Point::new(0.001, 0.0)],
                oneway: false,
                tags: Tags {
                    highway: RoadClass::Residential,
                    name: None,
                    maxspeed_kmh: None,
                    access: None,
                },
            }],
            profile: Profile::Car,
            start_point: None,
            chunk_duration_s: GenerateRequest::default_chunk_duration_s(),
            max_gap_m: GenerateRequest::default_max_gap_m(),
            snap_tolerance_m: GenerateRequest::default_snap_tolerance_m(),
            small_join_m: GenerateRequest::default_small_join_m(),
            oracle_concurrency: GenerateRequest::default_oracle_concurrency(),
            oracle_call_budget: None,
        }
    }

    #[test]
    fn minimal_request_validates() {
        assert!(minimal_request().validate().is_ok());
    }

    #[test]
    fn empty_polygon_is_invalid_input() {
        let mut req = minimal_request();
        req.polygon = AreaPolygon::Polygon(vec![]);
        assert!(matches!(req.validate(), Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn empty_street_features_is_invalid_input() {
        let mut req = minimal_request();
        req.street_features = vec![];
        assert!(matches!(req.validate(), Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn chunk_duration_out_of_range_is_invalid_input() {
        let mut req = minimal_request();
        req.chunk_duration_s = 100;
        assert!(matches!(req.validate(), Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn small_join_must_be_below_max_gap() {
        let mut req = minimal_request();
        req.small_join_m = req.max_gap_m;
        assert!(matches!(req.validate(), Err(PipelineError::InvalidInput(_))));
    }
}
