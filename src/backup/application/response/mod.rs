pub mod backup_response;
