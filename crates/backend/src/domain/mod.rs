pub mod a001_transaction;
pub mod a002_customer;
pub mod a003_campaign;
pub mod a004_blacklist;
pub mod a005_contact_tracking;
pub mod a006_communication_log;
