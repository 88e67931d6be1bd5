pub mod app;
pub mod collab;
pub mod deep_link;
pub mod menu;
pub mod timer;

pub use app::{Collaborators, NavController};
