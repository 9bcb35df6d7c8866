pub mod response;
pub mod session;

pub use response::{ApiResponse, ApiResult};
pub use session::{require_admin, require_approved, require_login, session_middleware};
