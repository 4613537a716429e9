pub mod catalog_store;
pub mod notification_service;

pub use catalog_store::CatalogStore;
pub use notification_service::NotificationService;
