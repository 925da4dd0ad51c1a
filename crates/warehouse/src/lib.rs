pub mod connection;
pub mod introspect;
pub mod query;

pub use connection::{connect, connect_with_settings, WarehousePool};
pub use query::{run_query, QueryOutput};
