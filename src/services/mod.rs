pub mod address_service;
pub mod auth_service;
pub mod category_service;
pub mod order_service;
pub mod product_service;
pub mod region_service;
pub mod snapshot;
pub mod stock;
pub mod store_service;
pub mod user_service;
