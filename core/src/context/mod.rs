mod action_cache;
mod config;

pub use action_cache::{ActionContext, ActionContextCache};
pub use config::{ConfigError, default_config_path, load_config, load_config_or_default};
