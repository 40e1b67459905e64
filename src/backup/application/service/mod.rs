pub mod backup_api;
pub mod backup_service;
