pub mod config;
pub mod csv_rows;
pub mod data;
pub mod indicators;
pub mod logger;
pub mod messaging;
pub mod parsing;
pub mod supabase;
