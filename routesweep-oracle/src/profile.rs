use serde::{Deserialize, Serialize};

/// Routing profile sent to the oracle (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Car,
    Hgv,
    Bike,
    Foot,
}

impl Default for Profile {
    fn default() -> Self {
        Profile::Car
    }
}

impl Profile {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Car => "car",
            Profile::Hgv => "hgv",
            Profile::Bike => "bike",
            Profile::Foot => "foot",
        }
    }
}
