pub mod category;
pub mod inventory;
pub mod product;
pub mod store;
pub mod subcategory;
