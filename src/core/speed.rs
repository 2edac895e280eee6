use crate::core::distance::distance_km;
use crate::core::RouteSequence;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Speed in km/h between the point at `index` and the one before it.
///
/// Returns 0 for the first point, for routes with fewer than two points, for
/// an out of range index and when the elapsed time is not positive.
pub fn speed_kmh(index: usize, route: &RouteSequence) -> f64 {
    if index == 0 || route.len() <= 1 {
        return 0.0;
    }

    let (prev, curr) = match (route.get(index - 1), route.get(index)) {
        (Some(prev), Some(curr)) => (prev, curr),
        _ => return 0.0,
    };

    let distance = distance_km(prev.lat, prev.lng, curr.lat, curr.lng);

    let elapsed_ms = (curr.timestamp - prev.timestamp).num_milliseconds();
    let elapsed_hours = elapsed_ms as f64 / MS_PER_HOUR;
    if elapsed_hours <= 0.0 {
        return 0.0;
    }

    distance / elapsed_hours
}
