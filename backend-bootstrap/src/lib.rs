// Backend Bootstrap Layer
// Wires configuration, services, and the HTTP server together

pub mod context;
pub mod lifecycle;

pub use context::AppContext;
pub use lifecycle::run_standalone;
