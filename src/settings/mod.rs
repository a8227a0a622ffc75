//! Project settings: a TOML file picked by build profile or `--settings`,
//! with environment overrides on top.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
