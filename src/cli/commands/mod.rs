//! One module per subcommand, each exposing `execute`.

pub mod get;
pub mod list;
pub mod remove;
pub mod set;
