pub mod config;
pub mod settings;
pub mod vfs;

pub type Result<T> = anyhow::Result<T>;
