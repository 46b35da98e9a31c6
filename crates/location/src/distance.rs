//! Great-circle distance

use order_engine_core::GeoPoint;

/// Mean Earth radius
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance in kilometres
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Two decimal places, as shown to customers
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
