// Domain value objects
pub mod anomaly_rule;

pub use anomaly_rule::*;
