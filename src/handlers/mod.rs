// handlers/mod.rs - Handlers grouped by security tier
//
// Public (no auth) → Protected (resolved identity + per-caller throttle)
pub mod public;    // Tier 1: No authentication required (/, /health)
pub mod protected; // Tier 2: Identity required (/api/*)
