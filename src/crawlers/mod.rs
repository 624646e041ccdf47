pub mod crawler;
pub mod fetch;
pub mod http;
pub mod search;
pub mod web;

pub use crawler::{Discover, Fetch, Renderer, Transport};
