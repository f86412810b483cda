// Domain entities
pub mod anomaly;
pub mod model;
pub mod run;
pub mod transaction;

pub use anomaly::*;
pub use model::*;
pub use run::*;
pub use transaction::*;
