// Infrastructure services
pub mod narrative_service;
pub mod report_service;

pub use narrative_service::*;
pub use report_service::*;
