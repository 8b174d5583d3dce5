//! Domain models for the Stock Control Platform

mod field;
mod intake;
mod movement;
mod shed;
mod zone;

pub use field::*;
pub use intake::*;
pub use movement::*;
pub use shed::*;
pub use zone::*;
