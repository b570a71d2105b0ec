//! streetroute CLI library.
//!
//! Output types and rendering shared by the `streetroute-cli` subcommands.

pub mod output;
