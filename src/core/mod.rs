pub mod point;
pub mod selection;
pub mod distance;
pub mod speed;

pub use point::{LatLng, RoutePoint, RouteSequence};
pub use selection::{Day, PointType, RouteSelection, SelectionError};
pub use speed::speed_kmh;
