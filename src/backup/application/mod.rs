pub mod blob_store;
pub mod response;
pub mod service;
