// handlers/protected/mod.rs - Protected handlers (resolved identity required)
//
// Every route here sits behind `require_identity`, which puts the caller's
// `Identity` into request extensions, and a per-route `throttle`.
pub mod auth;  // Caller introspection
pub mod media; // DMAPI media operations
