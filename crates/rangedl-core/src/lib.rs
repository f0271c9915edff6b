pub mod config;
pub mod logging;

pub mod fetcher;
pub mod gate;
pub mod pipeline;
pub mod planner;
pub mod probe;
pub mod scheduler;
pub mod storage;
pub mod url_model;
