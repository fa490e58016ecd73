pub mod addresses;
pub mod audit_logs;
pub mod categories;
pub mod order_items;
pub mod orders;
pub mod product_photos;
pub mod product_snapshots;
pub mod products;
pub mod stores;
pub mod users;

pub use addresses::Entity as Addresses;
pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_photos::Entity as ProductPhotos;
pub use product_snapshots::Entity as ProductSnapshots;
pub use products::Entity as Products;
pub use stores::Entity as Stores;
pub use users::Entity as Users;
