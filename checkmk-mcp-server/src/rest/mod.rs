pub mod client;
pub mod errors;
pub mod models;

pub use client::CheckmkClient;
pub use errors::CheckmkClientError;
pub use errors::Result;
