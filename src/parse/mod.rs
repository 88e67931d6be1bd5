pub mod link;

pub use link::{LinkMatch, app_link, event_route, match_link, parse_link};
