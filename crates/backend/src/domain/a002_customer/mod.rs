pub mod metrics;
pub mod repository;
