pub mod calculations;
pub mod repository;
pub mod service;
