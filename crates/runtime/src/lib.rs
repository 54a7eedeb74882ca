pub mod event_bus;
pub mod frame;
pub mod idle;
pub mod metrics;

pub use event_bus::*;
pub use frame::*;
pub use idle::*;
pub use metrics::*;
