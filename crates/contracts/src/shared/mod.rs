pub mod communication;
pub mod indicators;
pub mod logger;
pub mod messaging;
pub mod settings;
