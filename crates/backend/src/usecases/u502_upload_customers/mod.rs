pub mod executor;

pub use executor::upload_customers;
