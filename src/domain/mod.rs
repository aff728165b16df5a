pub mod game;
pub mod league;
pub mod slug;
pub mod team;

pub use game::*;
pub use league::*;
pub use slug::*;
pub use team::*;
