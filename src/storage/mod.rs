pub mod btree;
pub mod header;
pub mod page_store;
pub mod schema;
pub mod storage_manager;
