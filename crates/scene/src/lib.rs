//! Camera projection and hotspot picking.

pub mod camera;
pub mod picker;
pub mod picking;

pub use camera::*;
pub use catalog::CameraPose;
pub use picker::*;
pub use picking::*;
