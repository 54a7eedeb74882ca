//! Selection state machine and per-frame orchestration of the ship story.
//!
//! [`SelectionController`] owns what is selected; [`SyncedOverlayAdapter`]
//! mirrors that onto the map, chart and scene; [`StorySession`] wires both
//! to input, the camera and the host collaborators.

pub mod collaborators;
pub mod config;
pub mod controller;
pub mod events;
pub mod input;
pub mod overlay_sync;
pub mod session;

pub use collaborators::*;
pub use config::*;
pub use controller::*;
pub use events::*;
pub use input::*;
pub use overlay_sync::*;
pub use session::*;
