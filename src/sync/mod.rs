pub mod audit;
pub mod config;
pub mod extract;
pub mod index;
pub mod lock;
pub mod paths;
pub mod payload;
pub mod reconcile;
pub mod slot;
pub mod storage;
pub mod system_data;
pub mod util;
