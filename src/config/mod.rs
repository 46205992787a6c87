mod paths;
mod tailfile;

pub use paths::{expand_config_path, global_config_path};
pub use tailfile::Tailfile;
