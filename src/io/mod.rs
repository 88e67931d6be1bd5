pub mod active_button;
pub mod config_io;
pub mod pending_invite;
pub mod store;
