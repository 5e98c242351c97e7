pub mod executor;
pub mod planner;
pub mod shell;
pub mod storage;
pub mod types;
pub mod utils;
