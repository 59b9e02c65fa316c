pub mod api;
pub mod categories;
pub mod inventory;
pub mod main;
pub mod products;
pub mod stores;
pub mod subcategories;
