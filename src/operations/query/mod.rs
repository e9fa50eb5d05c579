mod bounding_box;
mod is_valid;
mod length;
mod point_on_road;

pub use bounding_box::{Aabb, BoundingBox};
pub use is_valid::IsValid;
pub use length::Length;
pub use point_on_road::PointOnRoad;
