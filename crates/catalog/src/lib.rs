//! Read-only story data: ship variants and the annotations placed on them.
//!
//! Everything in here is immutable after construction. Selection, picking
//! and camera code only ever borrow a [`StoryCatalog`].

pub mod annotation;
pub mod error;
pub mod ship;
pub mod story;

pub use annotation::*;
pub use error::*;
pub use ship::*;
pub use story::*;
