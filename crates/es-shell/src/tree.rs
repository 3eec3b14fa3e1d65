//! Command tree for the interactive shell.
//!
//! Commands are registered as a tree of named nodes. Input tokens are
//! matched against child names by exact equality, first match wins; the
//! deepest matched node's handler runs with the remaining tokens as its
//! arguments.

/// Result type returned by command handlers.
pub type CmdResult = Result<(), es_elf::ElfError>;

/// A node in the command tree.
pub struct CommandNode<C> {
    pub name: &'static str,
    pub help: &'static str,
    pub handler: Option<fn(&mut C, &[&str]) -> CmdResult>,
    pub children: Vec<CommandNode<C>>,
}

impl<C> CommandNode<C> {
    /// Group node with no handler of its own.
    pub fn new(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            handler: None,
            children: Vec::new(),
        }
    }

    /// Leaf (or group) node with a handler.
    pub fn with_handler(
        name: &'static str,
        help: &'static str,
        handler: fn(&mut C, &[&str]) -> CmdResult,
    ) -> Self {
        Self {
            name,
            help,
            handler: Some(handler),
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: CommandNode<C>) {
        self.children.push(child);
    }

    /// Walk the tree along `tokens`, returning the deepest node whose name
    /// chain matches, together with the unconsumed tokens.
    pub fn find<'t>(&self, tokens: &'t [&'t str]) -> Option<(&CommandNode<C>, &'t [&'t str])> {
        let Some((first, rest)) = tokens.split_first() else {
            return Some((self, tokens));
        };
        match self.children.iter().find(|child| child.name == *first) {
            Some(child) => child.find(rest),
            None => Some((self, tokens)),
        }
    }
}
