use super::point::GeoPoint;

/// Mean Earth radius used by the spherical approximation
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (haversine)
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Sum of consecutive segment distances; 0 for fewer than two points
pub fn cumulative_distance(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}
