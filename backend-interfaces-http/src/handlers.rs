pub mod detect_handlers;
pub mod ops_handlers;
pub mod report_handlers;

pub use detect_handlers::*;
pub use ops_handlers::*;
pub use report_handlers::*;
