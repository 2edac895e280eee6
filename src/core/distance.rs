/// Approximate kilometres per degree of latitude
pub const KM_PER_DEGREE: f64 = 111.32;

/// Planar distance in kilometres between two coordinates.
///
/// Treats degrees of latitude and longitude as equal length, which only holds
/// for short hops away from the poles. Good enough for local vehicle tracks.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;
    (d_lat * d_lat + d_lon * d_lon).sqrt() * KM_PER_DEGREE
}
