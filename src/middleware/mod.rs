pub mod auth;
pub mod rate_limit;
pub mod response;

pub use auth::require_identity;
pub use rate_limit::{throttle, Throttle};
pub use response::{ApiResponse, ApiResult};
