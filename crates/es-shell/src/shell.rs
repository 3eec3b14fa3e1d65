//! Interactive line-oriented shell over a parsed ELF object.

use std::io::{self, BufRead, Read, Seek, Write};

use es_elf::ElfObject;
use tracing::debug;

use crate::commands::build_tree;

/// Run the read-eval loop until `quit` or end of input.
///
/// Query failures are surfaced as one-line messages; the loop keeps
/// accepting commands.
pub fn run<R: Read + Seek>(object: &mut ElfObject<R>) -> io::Result<()> {
    let tree = build_tree::<R>();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("ELF> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break, // EOF
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&first) = tokens.first() else {
            continue;
        };

        match first {
            "quit" | "exit" => break,
            "help" => {
                print_help(&tree.children);
                continue;
            }
            _ => {}
        }

        match tree.find(&tokens).and_then(|(node, args)| {
            node.handler.map(|handler| (node.name, handler, args))
        }) {
            Some((name, handler, args)) => {
                debug!("dispatching '{}'", name);
                if let Err(err) = handler(object, args) {
                    println!("error: {}", err);
                }
            }
            None => println!("unknown command: {} (try 'help')", first),
        }
    }

    Ok(())
}

fn print_help<C>(commands: &[crate::tree::CommandNode<C>]) {
    println!("Available commands:");
    for node in commands {
        println!("  {:10} {}", node.name, node.help);
    }
    println!("  {:10} {}", "help", "show this message");
    println!("  {:10} {}", "quit", "leave the shell");
}
