//! Commands - one module per subcommand

pub mod case;
pub mod config;
pub mod results;
pub mod start;
pub mod status;
pub mod utils;
pub mod watch;
