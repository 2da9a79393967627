pub mod handler;
pub mod manager;

pub use handler::handle_connection;
pub use manager::{ConnectionGuard, ConnectionInfo, ConnectionManager};
