pub mod config;
pub mod directory;
pub mod link;
pub mod menu;

pub use config::*;
pub use directory::*;
pub use link::*;
pub use menu::*;
