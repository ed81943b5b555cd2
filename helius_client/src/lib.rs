pub mod client;
pub mod error;
pub mod types;

pub use client::{FetchWindow, HeliusClient};
pub use error::HeliusError;
pub use types::*;
