pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
mod fs;
pub mod model;
pub mod store;
mod utils;


pub use backup::Backup;
pub use config::Config;
pub use error::Error;
pub use error::Result;
