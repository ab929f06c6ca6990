pub mod cursor;
pub mod listing;
pub mod ordinal;
pub mod sequencer;
pub mod session_ops;
pub mod status_ops;
