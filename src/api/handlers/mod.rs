pub mod games;
pub mod players;
pub mod standings;
pub mod stats;
pub mod system;
pub mod teams;

pub use games::*;
pub use players::*;
pub use standings::*;
pub use stats::*;
pub use system::*;
pub use teams::*;
