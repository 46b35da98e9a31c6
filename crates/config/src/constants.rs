//! Centralized constants for the order engine
//!
//! Defaults referenced by settings, the location resolver and the engine.
//! Settings override most of these at runtime.

/// External service endpoints
pub mod endpoints {
    /// OpenStreetMap Nominatim search
    pub const NOMINATIM_SEARCH: &str = "https://nominatim.openstreetmap.org/search";

    /// User-Agent sent to Nominatim (its usage policy requires one)
    pub const GEOCODER_USER_AGENT: &str = "FoodExpressBot/1.0";
}

/// Geocoding behavior
pub mod geocoding {
    /// Per-attempt timeout
    pub const TIMEOUT_SECS: u64 = 5;

    /// Query variants tried before falling back to the city table
    pub const MAX_ATTEMPTS: usize = 2;

    /// Appended when the query names no country
    pub const COUNTRY_SUFFIX: &str = ", Pakistan";

    /// Any of these in the query means the country is already present
    pub const COUNTRY_MARKERS: &[&str] = &["pakistan", "pak", "pk"];

    /// Label used when no city matches
    pub const DEFAULT_LABEL: &str = "Karachi, Pakistan (Default)";
}

/// Nearby outlet ranking
pub mod nearby {
    pub const DEFAULT_RADIUS_KM: f64 = 10.0;
    pub const DEFAULT_LIMIT: usize = 8;

    /// Radius of the `nearby:` command when none is given
    pub const COMMAND_RADIUS_KM: f64 = 5.0;

    /// Options shown to the customer in one list
    pub const MAX_LISTED: usize = 6;

    /// Farthest branch accepted when no option is listed
    pub const NEAREST_BRANCH_MAX_KM: f64 = 50.0;
}

/// Intent classification
pub mod classifier {
    /// Zero-shot labels are accepted only above this confidence
    pub const ZERO_SHOT_THRESHOLD: f32 = 0.5;

    pub const ZERO_SHOT_TIMEOUT_MS: u64 = 2000;
}

/// Catalog matching
pub mod matching {
    /// Minimum similarity for a fuzzy match
    pub const FUZZY_THRESHOLD: f64 = 0.6;

    /// Added per popularity tier during fuzzy matching
    pub const PRIORITY_BOOST: f64 = 0.05;
}

/// Session housekeeping
pub mod session {
    /// Lifetime of the saved location options
    pub const LOCATION_TTL_SECS: u64 = 1800;

    /// Interval of the background scratch purge
    pub const CLEANUP_INTERVAL_SECS: u64 = 300;
}

/// Order flow
pub mod orders {
    /// Quoted on confirmation
    pub const PREPARATION_WINDOW: &str = "20-25 minutes";

    /// Currency prefix for prices
    pub const CURRENCY: &str = "Rs.";

    /// Orders returned by a history lookup without an explicit limit
    pub const ORDER_HISTORY_LIMIT: usize = 20;
}
