pub mod config;
pub mod derive;
pub mod fix;
pub mod report;
pub mod validate;
