pub mod directory;
pub mod search;
