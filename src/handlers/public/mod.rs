// handlers/public/mod.rs - Public handlers (no authentication required)

pub mod health; // GET /health - diagnostics
pub mod root;   // GET / - service descriptor

pub use health::health;
pub use root::root;
