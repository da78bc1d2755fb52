mod args;
mod paths;

pub use args::{Cli, Commands, ResolveArgs};
pub use paths::{read_config_file, read_json_file};
