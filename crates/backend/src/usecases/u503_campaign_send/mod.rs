pub mod executor;

pub use executor::send_campaign;
