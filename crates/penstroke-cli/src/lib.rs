//! penstroke-cli: terminal composer and client for a penstroke blog.
#![deny(clippy::all, clippy::pedantic)]

pub mod args;
pub mod client;
pub mod composer;
pub mod handlers;
pub mod io;
pub mod notify;
pub mod print;
pub mod submit;
