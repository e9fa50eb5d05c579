pub mod control_point;
pub mod cubic;
pub mod primitive;

pub use control_point::{ControlPoint, SplineKind};
pub use cubic::{CubicPoly, ParamRange};
pub use primitive::{
    pose_on_geometries, total_length, GeometryPrimitive, Pose, PrimitiveKind, PrimitiveShape,
};
