pub mod api_request;
pub mod backup_artifact;
pub mod backup_entry;
pub mod client_config;
pub mod cpanel_connection;
pub mod endpoint_config;
pub mod envelope;
