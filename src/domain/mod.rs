pub mod bulk_upload;
pub mod category;
pub mod inventory;
pub mod merge;
pub mod product;
pub mod slug;
pub mod store;
pub mod storefront;
pub mod subcategory;
