//! Process-level helpers shared by the server and widget binaries

pub mod signals;

pub use signals::shutdown_signal;
