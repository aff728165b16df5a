//! Concurrency primitives shared by the request handlers.
//!
//! - Bounded fan-out over upstream calls
//! - Shutdown trigger for the server

pub mod fanout;
pub mod shutdown;

pub use fanout::bounded_map;
pub use shutdown::shutdown_signal;
