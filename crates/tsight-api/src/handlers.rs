//! Request handlers.

pub mod analyze;
pub mod health;

pub use analyze::*;
pub use health::*;
