//! Application services: the use cases the HTTP layer drives.

pub mod error;
pub mod gate;
pub mod listing;
pub mod posts;
pub mod reading;
pub mod render;
pub mod repos;
