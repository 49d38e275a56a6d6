//! CLI command implementations.
//!
//! - `show`: print the merged configuration for a name
//! - `paths`: print where a configuration would be loaded from
//! - `watch`: print a configuration again after every reload

pub mod paths;
pub mod show;
pub mod watch;

pub use paths::PathsCommand;
pub use show::ShowCommand;
pub use watch::WatchCommand;
