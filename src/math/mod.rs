mod color;
mod points;

pub use color::Color;
pub use points::{
    aastep, dot_mask, nearest_distance, smoothstep, sphere_rim, unique_points, FAR_DISTANCE,
};
