//! Business logic services for the Stock Control Platform

pub mod field;
pub mod intake;
pub mod movement;
pub mod reporting;
pub mod shed;
pub mod zone;

pub use field::FieldService;
pub use intake::IntakeService;
pub use movement::MovementService;
pub use reporting::ReportingService;
pub use shed::ShedService;
pub use zone::ZoneService;
