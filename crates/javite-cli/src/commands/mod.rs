pub mod config;
pub mod dev;
pub mod inputs;
pub mod properties;
pub mod version;
