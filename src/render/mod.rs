mod common;
mod native;
mod shared;

pub use common::{CameraParams, ENVIRONMENT_WEIGHT};
pub use native::Renderer;
