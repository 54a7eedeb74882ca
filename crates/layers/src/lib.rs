pub mod chart;
pub mod labels;
pub mod overlay;

pub use chart::*;
pub use labels::*;
pub use overlay::*;
