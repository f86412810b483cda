// Domain services
pub mod detector;

pub use detector::*;
