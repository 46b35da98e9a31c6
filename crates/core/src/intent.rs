//! Intent labels and classification results

use serde::{Deserialize, Serialize};

/// What a customer message is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    PlaceOrder,
    GetMenu,
    TrackOrder,
    BranchInfo,
    NearbyRestaurants,
    Help,
    Greeting,
}

impl Intent {
    pub const ALL: [Intent; 7] = [
        Intent::PlaceOrder,
        Intent::GetMenu,
        Intent::TrackOrder,
        Intent::BranchInfo,
        Intent::NearbyRestaurants,
        Intent::Help,
        Intent::Greeting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::PlaceOrder => "place_order",
            Intent::GetMenu => "get_menu",
            Intent::TrackOrder => "track_order",
            Intent::BranchInfo => "branch_info",
            Intent::NearbyRestaurants => "nearby_restaurants",
            Intent::Help => "help",
            Intent::Greeting => "greeting",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.as_str() == s)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which classifier produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierSource {
    ZeroShot,
    Rules,
}

/// A classified intent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub confidence: f32,
    pub source: ClassifierSource,
}

impl Classification {
    pub fn new(intent: Intent, confidence: f32, source: ClassifierSource) -> Self {
        Self {
            intent,
            confidence,
            source,
        }
    }
}
