pub mod alert_repository;
pub mod database;

pub use alert_repository::SqliteAlertRepository;
pub use database::Database;
