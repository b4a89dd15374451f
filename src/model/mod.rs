pub mod config;
pub mod item;
pub mod map;
pub mod task;

pub use config::*;
pub use item::*;
pub use map::*;
pub use task::*;
