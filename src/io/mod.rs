pub mod config_io;
pub mod lock;
pub mod log_io;
pub mod memory_store;
pub mod sqlite_store;
pub mod state;
pub mod store;
