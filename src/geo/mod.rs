//! Geographic primitives
//!
//! - `GeoPoint`: one validated fix, optionally timestamped
//! - `haversine_distance` / `cumulative_distance`: spherical-Earth distances in meters

mod distance;
mod point;

pub use distance::{cumulative_distance, haversine_distance, EARTH_RADIUS_METERS};
pub use point::GeoPoint;
