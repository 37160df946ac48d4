pub mod apache_object_store_adapter;

pub use apache_object_store_adapter::ApacheObjectStoreAdapter;
