// handlers/admin - back office, mounted under /admin behind the admin gate

pub mod dashboard;
pub mod export;
pub mod requests;
pub mod sections;
pub mod users;

/// Number of employers listed on the dashboard
pub const TOP_EMPLOYERS: i64 = 10;
