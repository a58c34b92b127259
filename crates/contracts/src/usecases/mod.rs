pub mod common;
pub mod u508_sync_catalog;
