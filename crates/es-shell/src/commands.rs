//! Shell command handlers.
//!
//! All human-readable formatting lives here; the engine only hands back
//! parsed records and owned byte buffers.

use std::io::{Read, Seek};

use es_elf::ElfObject;

use crate::tree::{CmdResult, CommandNode};

/// Build the command tree over a parsed ELF object.
pub fn build_tree<R: Read + Seek>() -> CommandNode<ElfObject<R>> {
    let mut root = CommandNode::new("root", "");
    root.add_child(CommandNode::with_handler(
        "header",
        "print the executable header",
        cmd_header::<R>,
    ));
    root.add_child(CommandNode::with_handler(
        "program",
        "list program headers",
        cmd_program::<R>,
    ));
    root.add_child(CommandNode::with_handler(
        "sections",
        "list section headers with resolved names",
        cmd_sections::<R>,
    ));
    root.add_child(CommandNode::with_handler(
        "symbols",
        "list symbols with resolved names",
        cmd_symbols::<R>,
    ));
    root.add_child(CommandNode::with_handler(
        "object",
        "object <name>: dump the raw bytes of a named data object",
        cmd_object::<R>,
    ));
    root
}

fn cmd_header<R: Read + Seek>(object: &mut ElfObject<R>, _args: &[&str]) -> CmdResult {
    let header = object.header();
    println!("ELF header:");
    println!("  type:      {:?}", header.kind());
    println!("  machine:   {}", header.e_machine);
    println!("  version:   {}", header.e_version);
    println!("  entry:     0x{:x}", header.e_entry);
    println!("  phoff:     0x{:x} ({} entries)", header.e_phoff, header.e_phnum);
    println!("  shoff:     0x{:x} ({} entries)", header.e_shoff, header.e_shnum);
    println!("  flags:     0x{:x}", header.e_flags);
    println!("  shstrndx:  {}", header.e_shstrndx);
    Ok(())
}

fn cmd_program<R: Read + Seek>(object: &mut ElfObject<R>, _args: &[&str]) -> CmdResult {
    for (i, phdr) in object.program_headers().iter().enumerate() {
        println!("Program header {}:", i);
        println!("  type:   {:?}", phdr.kind());
        println!("  flags:  0x{:x}", phdr.p_flags);
        println!("  offset: 0x{:x}", phdr.p_offset);
        println!("  vaddr:  0x{:x}", phdr.p_vaddr);
        println!("  paddr:  0x{:x}", phdr.p_paddr);
        println!("  filesz: {}", phdr.p_filesz);
        println!("  memsz:  {}", phdr.p_memsz);
        println!("  align:  {}", phdr.p_align);
    }
    Ok(())
}

fn cmd_sections<R: Read + Seek>(object: &mut ElfObject<R>, _args: &[&str]) -> CmdResult {
    for i in 0..object.section_headers().len() {
        let name = object
            .section_name(i)
            .unwrap_or_else(|_| String::from("<unresolved>"));
        let shdr = object.section_headers()[i];
        println!("Section {}: {}", i, name);
        println!("  type:    {:?}", shdr.kind());
        println!("  flags:   0x{:x}", shdr.sh_flags);
        println!("  addr:    0x{:x}", shdr.sh_addr);
        println!("  offset:  0x{:x}", shdr.sh_offset);
        println!("  size:    {}", shdr.sh_size);
        println!("  link:    {}", shdr.sh_link);
        println!("  info:    {}", shdr.sh_info);
        println!("  align:   {}", shdr.sh_addralign);
        println!("  entsize: {}", shdr.sh_entsize);
    }
    Ok(())
}

fn cmd_symbols<R: Read + Seek>(object: &mut ElfObject<R>, _args: &[&str]) -> CmdResult {
    if object.symbols().is_empty() {
        println!("no symbol table");
        return Ok(());
    }
    for i in 0..object.symbols().len() {
        let name = object
            .symbol_name(i)
            .unwrap_or_else(|_| String::from("<unresolved>"));
        let sym = object.symbols()[i];
        println!("Symbol {}: {}", i, name);
        println!("  type:    {:?}", sym.kind());
        println!("  binding: {}", sym.binding());
        println!("  shndx:   {}", sym.st_shndx);
        println!("  value:   0x{:x}", sym.st_value);
        println!("  size:    {}", sym.st_size);
    }
    Ok(())
}

fn cmd_object<R: Read + Seek>(object: &mut ElfObject<R>, args: &[&str]) -> CmdResult {
    let Some(name) = args.first() else {
        println!("usage: object <name>");
        return Ok(());
    };
    let (data, index) = object.read_object_data(name)?;
    println!("{}: {} bytes (symbol {})", name, data.len(), index);
    hex_dump(&data);
    Ok(())
}

fn hex_dump(data: &[u8]) {
    for (i, chunk) in data.chunks(16).enumerate() {
        let bytes: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        println!("  {:08x}  {}", i * 16, bytes.join(" "));
    }
}
