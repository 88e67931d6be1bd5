pub mod cli;
pub mod io;
pub mod model;
pub mod nav;
pub mod ops;
pub mod parse;
