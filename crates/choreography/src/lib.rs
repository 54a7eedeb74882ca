//! Camera choreography: interactive spring transitions and scripted
//! keyframe tracks.

pub mod script;
pub mod spring;
pub mod track;
pub mod transition;

pub use script::*;
pub use spring::*;
pub use track::*;
pub use transition::*;
