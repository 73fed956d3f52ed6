pub mod config;
pub mod data;
pub mod desk;
pub mod sales;
pub mod storage;
