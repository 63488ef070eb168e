pub mod blacklist;
pub mod campaigns;
pub mod communications;
pub mod customers;
pub mod d400_business_intelligence;
pub mod indicators;
pub mod logs;
pub mod messaging_webhook;
pub mod uploads;
