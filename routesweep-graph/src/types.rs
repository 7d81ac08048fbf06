use serde::{Deserialize, Serialize};

use routesweep_geom::Point;

/// Road class, used both to classify the input and to estimate drive speed
/// for chunking (spec §4.E) when no explicit `maxspeed` tag is present.
///
/// Ordered broadly by importance/typical speed, matching the classification
/// this codebase already uses for speed inference and avoidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Unclassified,
    Residential,
    ServiceOther,
}

impl RoadClass {
    /// Default speed in km/h when no `maxspeed` tag is given (spec §4.E).
    #[must_use]
    pub fn default_speed_kmh(self) -> f64 {
        match self {
            RoadClass::Motorway => 100.0,
            RoadClass::Trunk => 80.0,
            RoadClass::Primary => 65.0,
            RoadClass::Secondary => 55.0,
            RoadClass::Tertiary => 45.0,
            RoadClass::Unclassified => 35.0,
            RoadClass::Residential => 30.0,
            RoadClass::ServiceOther => 20.0,
        }
    }

    #[must_use]
    pub fn from_highway_tag(tag: &str) -> RoadClass {
        match tag {
            "motorway" | "motorway_link" => RoadClass::Motorway,
            "trunk" | "trunk_link" => RoadClass::Trunk,
            "primary" | "primary_link" => RoadClass::Primary,
            "secondary" | "secondary_link" => RoadClass::Secondary,
            "tertiary" | "tertiary_link" => RoadClass::Tertiary,
            "unclassified" => RoadClass::Unclassified,
            "residential" | "living_street" => RoadClass::Residential,
            _ => RoadClass::ServiceOther,
        }
    }
}

/// Tag bag carried by a street feature and, after graph construction, by
/// each edge derived from it (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tags {
    pub highway: RoadClass,
    pub name: Option<String>,
    pub maxspeed_kmh: Option<f64>,
    pub access: Option<String>,
}

impl Tags {
    /// The spec treats every input feature as traversable (§9 open
    /// questions): `access` is carried through for diagnostics/export but
    /// never used to filter.
    #[must_use]
    pub fn speed_kmh(&self) -> f64 {
        self.maxspeed_kmh.unwrap_or_else(|| self.highway.default_speed_kmh())
    }
}

/// Raw input feature: an ordered polyline plus directionality and tags
/// (spec §3). Invariant: at least two points; features violating this are
/// skipped during graph construction, not rejected outright (spec §7,
/// `InvalidGeometry`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreetFeature {
    pub points: Vec<Point>,
    pub oneway: bool,
    pub tags: Tags,
}

/// Provenance of an edge (spec §3): whether it came directly from input data,
/// was added to balance the graph, or was spliced in by the routing oracle
/// during assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    Street,
    Duplicate,
    Connector,
}

/// A directed arc between two graph nodes (spec §3).
///
/// Invariant (enforced at construction, never by callers): `geometry[0]`
/// equals the source node's coordinates and `geometry[last]` equals the
/// target's, exactly, post-alignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub length_m: f64,
    pub geometry: Vec<Point>,
    pub kind: EdgeKind,
    pub tags: Option<Tags>,
}
