//! Interactive command shell for elfscope
//!
//! Tokenizes user input, matches it against a registered command tree and
//! invokes the matched handler with the parsed ELF object. Engine failures
//! become user-visible messages, never a process abort.

pub mod commands;
pub mod shell;
pub mod tree;

pub use shell::run;
pub use tree::{CmdResult, CommandNode};
