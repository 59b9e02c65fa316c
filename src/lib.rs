pub mod archive;
pub mod domain;
pub mod forms;
pub mod media;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

/// Role granting access to every store and to the approval queues.
pub const ADMIN_ROLE: &str = "admin";
pub const STORE_OWNER_ROLE: &str = "store_owner";
pub const CUSTOMER_ROLE: &str = "customer";
