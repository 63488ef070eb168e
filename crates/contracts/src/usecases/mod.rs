pub mod u501_upload_sales;
pub mod u502_upload_customers;
pub mod u503_campaign_send;
