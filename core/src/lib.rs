pub mod db;
pub mod error;
pub mod format;
pub mod generate;
pub mod models;
