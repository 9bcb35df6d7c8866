pub mod employers;
pub mod employment;
pub mod error;
pub mod models;
pub mod pool;
pub mod query_builder;
pub mod registrations;
pub mod sections;
pub mod stats;
pub mod users;

pub use error::DatabaseError;
pub use pool::Database;
