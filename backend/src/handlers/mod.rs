//! HTTP handlers for the Stock Control Platform

pub mod capacity;
pub mod field;
pub mod health;
pub mod intake;
pub mod movement;
pub mod reporting;
pub mod shed;
pub mod zone;

pub use capacity::*;
pub use field::*;
pub use health::*;
pub use intake::*;
pub use movement::*;
pub use reporting::*;
pub use shed::*;
pub use zone::*;
