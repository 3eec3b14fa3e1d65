//! elfscope - Interactive ELF64 introspection shell
//!
//! Main entry point: opens the target binary, parses it once, then hands
//! the parsed object to the command shell.

use std::fs::File;
use std::io::BufReader;

use anyhow::Context;
use es_elf::ElfObject;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "./sample".to_string());
    tracing::info!("Opening {}", path);

    let file = File::open(&path).with_context(|| format!("failed to open {}", path))?;
    let mut object = ElfObject::parse(BufReader::new(file))
        .with_context(|| format!("failed to parse {} as ELF64", path))?;

    es_shell::run(&mut object)?;
    Ok(())
}
