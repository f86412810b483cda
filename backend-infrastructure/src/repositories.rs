pub mod config_files;
pub mod transaction_files;

pub use config_files::*;
pub use transaction_files::*;
