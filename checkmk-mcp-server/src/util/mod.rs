pub mod batch;
pub mod cache;
pub mod metrics;
pub mod recovery;
pub mod streaming;
