//! Interactive console core.
//!
//! Raw terminal bytes are edited into a [`LineBuffer`], completed on tab by
//! [`complete`], and dispatched on enter to commands looked up in a
//! [`Registry`]. Commands implement the [`Command`] trait and reach platform
//! services through the [`Context`] they are given.

mod commands;
mod complete;
mod context;
mod dispatch;
mod file_commands;
mod line;
pub mod network_commands;
pub mod optparse;
mod registry;
mod shell;
pub mod system_commands;

#[cfg(test)]
mod testutil;

/// Register all built-in commands into a registry.
pub use commands::register_builtins;
pub use complete::{complete, suggest};
pub use context::{Captured, Context, Output};
pub use dispatch::{Status, dispatch, eval, tokenize};
/// Register filesystem commands (cd, pwd, ls, cat) into a registry.
pub use file_commands::register_file_commands;
pub use line::LineBuffer;
/// Register network commands (ifconfig, arp, route, dhclient) into a registry.
pub use network_commands::register_network_commands;
pub use registry::{Command, DEFAULT_TAB_DELIM, Registry};
pub use shell::{Shell, Tty};
/// Register system commands (run, md5sum, sha256sum, perf, test) into a registry.
pub use system_commands::register_system_commands;
