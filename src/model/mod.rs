pub mod config;
pub mod log_dir;
pub mod session;

pub use config::*;
pub use log_dir::*;
pub use session::*;
