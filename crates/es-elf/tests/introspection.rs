//! End-to-end introspection tests against a synthetic ELF64 image.
//!
//! The fixture is a minimal but well-formed little-endian ELF64 executable
//! assembled in memory: one PT_LOAD segment, a `.data` section whose first
//! four bytes are DE AD BE EF, a symbol table and both string tables. Tests
//! read it through `io::Cursor`, the engine being generic over `Read + Seek`.

use std::io::Cursor;

use es_elf::symtab::{STB_GLOBAL, STT_FUNC, STT_OBJECT};
use es_elf::{ElfError, ElfObject, ObjectKind, SectionKind, SegmentKind};

const DATA_ADDR: u64 = 0x404000;
const DATA_BYTES: [u8; 16] = [
    0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03, 0x04, 0, 0, 0, 0, 0, 0, 0, 0,
];

// offsets of each name inside the symbol string table
const NAME_GLOBAL: u32 = 1; // "global_data"
const NAME_FUNC: u32 = 13; // "my_function"
const NAME_DUP1: u32 = 25; // "dup"
const NAME_DUP2: u32 = 29; // "dup" (second copy)
const NAME_UNDEF: u32 = 33; // "undef_obj"
const NAME_BELOW: u32 = 43; // "below"
const NAME_BIG: u32 = 49; // "bigobj"

fn sym(name: u32, info: u8, shndx: u16, value: u64, size: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(24);
    buf.extend_from_slice(&name.to_le_bytes());
    buf.push(info);
    buf.push(0); // st_other
    buf.extend_from_slice(&shndx.to_le_bytes());
    buf.extend_from_slice(&value.to_le_bytes());
    buf.extend_from_slice(&size.to_le_bytes());
    buf
}

#[allow(clippy::too_many_arguments)]
fn shdr(
    name: u32,
    sh_type: u32,
    flags: u64,
    addr: u64,
    offset: u64,
    size: u64,
    link: u32,
    info: u32,
    addralign: u64,
    entsize: u64,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(&name.to_le_bytes());
    buf.extend_from_slice(&sh_type.to_le_bytes());
    buf.extend_from_slice(&flags.to_le_bytes());
    buf.extend_from_slice(&addr.to_le_bytes());
    buf.extend_from_slice(&offset.to_le_bytes());
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend_from_slice(&link.to_le_bytes());
    buf.extend_from_slice(&info.to_le_bytes());
    buf.extend_from_slice(&addralign.to_le_bytes());
    buf.extend_from_slice(&entsize.to_le_bytes());
    buf
}

/// Assemble the fixture image. Layout: ehdr, one phdr, `.data`, `.strtab`,
/// `.shstrtab`, `.symtab`, section header table.
fn build_fixture() -> Vec<u8> {
    let strtab = b"\0global_data\0my_function\0dup\0dup\0undef_obj\0below\0bigobj\0".to_vec();
    let shstrtab = b"\0.data\0.symtab\0.strtab\0.shstrtab\0".to_vec();

    let obj = (STB_GLOBAL << 4) | STT_OBJECT;
    let func = (STB_GLOBAL << 4) | STT_FUNC;
    let symbols: Vec<u8> = [
        sym(0, 0, 0, 0, 0),
        // name offset far past the string table; scans must skip it
        sym(9999, obj, 1, DATA_ADDR, 1),
        sym(NAME_GLOBAL, obj, 1, DATA_ADDR, 4),
        sym(NAME_FUNC, func, 1, DATA_ADDR + 8, 8),
        sym(NAME_DUP1, obj, 1, DATA_ADDR + 4, 2),
        sym(NAME_DUP2, obj, 1, DATA_ADDR + 6, 2),
        sym(NAME_UNDEF, obj, 0, 0, 4),
        sym(NAME_BELOW, obj, 1, DATA_ADDR - 0x1000, 4),
        sym(NAME_BIG, obj, 1, DATA_ADDR + 8, 100),
    ]
    .concat();

    let phoff: u64 = 64;
    let data_off = phoff + 56;
    let strtab_off = data_off + DATA_BYTES.len() as u64;
    let shstrtab_off = strtab_off + strtab.len() as u64;
    let symtab_off = shstrtab_off + shstrtab.len() as u64;
    let shoff = symtab_off + symbols.len() as u64;

    let mut image = Vec::new();

    // executable header
    image.extend_from_slice(&[0x7F, b'E', b'L', b'F', 2, 1, 1, 0]);
    image.extend_from_slice(&[0u8; 8]); // rest of e_ident
    image.extend_from_slice(&2u16.to_le_bytes()); // e_type: ET_EXEC
    image.extend_from_slice(&0x3Eu16.to_le_bytes()); // e_machine: x86-64
    image.extend_from_slice(&1u32.to_le_bytes()); // e_version
    image.extend_from_slice(&0x401000u64.to_le_bytes()); // e_entry
    image.extend_from_slice(&phoff.to_le_bytes());
    image.extend_from_slice(&shoff.to_le_bytes());
    image.extend_from_slice(&0u32.to_le_bytes()); // e_flags
    image.extend_from_slice(&64u16.to_le_bytes()); // e_ehsize
    image.extend_from_slice(&56u16.to_le_bytes()); // e_phentsize
    image.extend_from_slice(&1u16.to_le_bytes()); // e_phnum
    image.extend_from_slice(&64u16.to_le_bytes()); // e_shentsize
    image.extend_from_slice(&5u16.to_le_bytes()); // e_shnum
    image.extend_from_slice(&4u16.to_le_bytes()); // e_shstrndx
    assert_eq!(image.len(), 64);

    // program header: PT_LOAD covering .data
    image.extend_from_slice(&1u32.to_le_bytes()); // p_type
    image.extend_from_slice(&6u32.to_le_bytes()); // p_flags: RW
    image.extend_from_slice(&data_off.to_le_bytes());
    image.extend_from_slice(&DATA_ADDR.to_le_bytes()); // p_vaddr
    image.extend_from_slice(&DATA_ADDR.to_le_bytes()); // p_paddr
    image.extend_from_slice(&(DATA_BYTES.len() as u64).to_le_bytes());
    image.extend_from_slice(&(DATA_BYTES.len() as u64).to_le_bytes());
    image.extend_from_slice(&0x1000u64.to_le_bytes()); // p_align

    image.extend_from_slice(&DATA_BYTES);
    image.extend_from_slice(&strtab);
    image.extend_from_slice(&shstrtab);
    image.extend_from_slice(&symbols);

    assert_eq!(image.len() as u64, shoff);
    image.extend_from_slice(&shdr(0, 0, 0, 0, 0, 0, 0, 0, 0, 0));
    image.extend_from_slice(&shdr(
        1, // ".data"
        1, // SHT_PROGBITS
        0x3,
        DATA_ADDR,
        data_off,
        DATA_BYTES.len() as u64,
        0,
        0,
        8,
        0,
    ));
    image.extend_from_slice(&shdr(
        7, // ".symtab"
        2, // SHT_SYMTAB
        0,
        0,
        symtab_off,
        symbols.len() as u64,
        3, // sh_link -> .strtab
        1,
        8,
        24,
    ));
    image.extend_from_slice(&shdr(
        15, // ".strtab"
        3,  // SHT_STRTAB
        0,
        0,
        strtab_off,
        strtab.len() as u64,
        0,
        0,
        1,
        0,
    ));
    image.extend_from_slice(&shdr(
        23, // ".shstrtab"
        3,
        0,
        0,
        shstrtab_off,
        shstrtab.len() as u64,
        0,
        0,
        1,
        0,
    ));

    image
}

fn parse_fixture() -> ElfObject<Cursor<Vec<u8>>> {
    ElfObject::parse(Cursor::new(build_fixture())).unwrap()
}

#[test]
fn parse_loads_every_table_with_declared_counts() {
    let object = parse_fixture();
    let header = object.header();

    assert_eq!(header.kind(), ObjectKind::Executable);
    assert_eq!(object.program_headers().len(), header.e_phnum as usize);
    assert_eq!(object.section_headers().len(), header.e_shnum as usize);
    assert_eq!(object.symbols().len(), 9);
    assert_eq!(object.symtab_section_index(), Some(2));

    assert_eq!(object.program_headers()[0].kind(), SegmentKind::Load);
    assert_eq!(object.section_headers()[1].kind(), SectionKind::Progbits);
    assert_eq!(object.section_headers()[2].kind(), SectionKind::Symtab);
}

#[test]
fn zero_count_program_header_table_is_empty_not_an_error() {
    let mut image = build_fixture();
    image[56..58].copy_from_slice(&0u16.to_le_bytes()); // e_phnum = 0
    let object = ElfObject::parse(Cursor::new(image)).unwrap();
    assert!(object.program_headers().is_empty());
}

#[test]
fn truncated_header_is_malformed() {
    let image = build_fixture();
    let result = ElfObject::parse(Cursor::new(image[..40].to_vec()));
    assert!(matches!(result, Err(ElfError::MalformedHeader(_))));
}

#[test]
fn section_table_past_eof_is_malformed() {
    let mut image = build_fixture();
    let bad_shoff = image.len() as u64 - 10;
    image[40..48].copy_from_slice(&bad_shoff.to_le_bytes());
    let result = ElfObject::parse(Cursor::new(image));
    assert!(matches!(result, Err(ElfError::MalformedTable { .. })));
}

#[test]
fn section_names_resolve_through_shstrtab() {
    let mut object = parse_fixture();
    assert_eq!(object.section_name(0).unwrap(), "");
    assert_eq!(object.section_name(1).unwrap(), ".data");
    assert_eq!(object.section_name(2).unwrap(), ".symtab");
    assert_eq!(object.section_name(4).unwrap(), ".shstrtab");
}

#[test]
fn find_symbol_skips_unresolvable_names() {
    // index 1 has a name offset past the string table; the scan must step
    // over it and still find the real symbol behind it
    let mut object = parse_fixture();
    let (sym, index) = object.find_symbol("global_data").unwrap();
    assert_eq!(index, 2);
    assert_eq!(sym.st_value, DATA_ADDR);
    assert_eq!(sym.st_size, 4);
}

#[test]
fn find_symbol_missing_name() {
    let mut object = parse_fixture();
    assert!(matches!(
        object.find_symbol("no_such_symbol"),
        Err(ElfError::SymbolNotFound(_))
    ));
}

#[test]
fn duplicate_names_resolve_to_first_in_table_order() {
    let mut object = parse_fixture();
    let (sym, index) = object.find_symbol("dup").unwrap();
    assert_eq!(index, 4);
    assert_eq!(sym.st_value, DATA_ADDR + 4);
}

#[test]
fn symbol_name_with_bad_offset_is_out_of_bounds() {
    let mut object = parse_fixture();
    assert!(matches!(
        object.symbol_name(1),
        Err(ElfError::OutOfBounds { .. })
    ));
    assert_eq!(object.symbol_name(2).unwrap(), "global_data");
}

#[test]
fn read_object_data_returns_exact_bytes() {
    let image = build_fixture();
    let mut object = ElfObject::parse(Cursor::new(image.clone())).unwrap();

    let (data, index) = object.read_object_data("global_data").unwrap();
    assert_eq!(index, 2);
    assert_eq!(data, [0xDE, 0xAD, 0xBE, 0xEF]);

    // cross-check against an independent read at
    // sh_offset + (st_value - sh_addr)
    let section = object.section_headers()[1];
    let file_offset = (section.sh_offset + (DATA_ADDR - section.sh_addr)) as usize;
    assert_eq!(data, image[file_offset..file_offset + 4]);
}

#[test]
fn read_object_data_rejects_functions() {
    let mut object = parse_fixture();
    assert!(matches!(
        object.read_object_data("my_function"),
        Err(ElfError::NotAnObject(_))
    ));
}

#[test]
fn read_object_data_rejects_undefined_section() {
    let mut object = parse_fixture();
    assert!(matches!(
        object.read_object_data("undef_obj"),
        Err(ElfError::UndefinedSection(0))
    ));
}

#[test]
fn read_object_data_rejects_address_below_section() {
    let mut object = parse_fixture();
    assert!(matches!(
        object.read_object_data("below"),
        Err(ElfError::AddressOutOfRange { .. })
    ));
}

#[test]
fn read_object_data_rejects_extent_past_section_end() {
    let mut object = parse_fixture();
    assert!(matches!(
        object.read_object_data("bigobj"),
        Err(ElfError::AddressOutOfRange { .. })
    ));
}

#[test]
fn read_section_raw_bytes() {
    let mut object = parse_fixture();
    assert_eq!(object.read_section(1).unwrap(), DATA_BYTES);
    // the null section occupies no file space
    assert!(object.read_section(0).unwrap().is_empty());
    assert!(matches!(
        object.read_section(99),
        Err(ElfError::UndefinedSection(99))
    ));
}

#[test]
fn queries_without_symbol_table_fail_cleanly() {
    let mut image = build_fixture();
    // retype .symtab as SHT_PROGBITS so no symbol table is found
    let shoff = u64::from_le_bytes(image[40..48].try_into().unwrap()) as usize;
    let symtab_type = shoff + 2 * 64 + 4;
    image[symtab_type..symtab_type + 4].copy_from_slice(&1u32.to_le_bytes());

    let mut object = ElfObject::parse(Cursor::new(image)).unwrap();
    assert!(object.symbols().is_empty());
    assert_eq!(object.symtab_section_index(), None);
    assert!(matches!(
        object.find_symbol("global_data"),
        Err(ElfError::NoSymbolTable)
    ));
    assert!(matches!(
        object.read_object_data("global_data"),
        Err(ElfError::NoSymbolTable)
    ));
    // the object stays usable for other queries
    assert_eq!(object.section_name(1).unwrap(), ".data");
}

/// Byte range of a u64 section-header field inside the fixture image.
fn shdr_field(image: &[u8], section: usize, field_offset: usize) -> std::ops::Range<usize> {
    let shoff = u64::from_le_bytes(image[40..48].try_into().unwrap()) as usize;
    let base = shoff + section * 64 + field_offset;
    base..base + 8
}

#[test]
fn lying_string_table_size_fails_instead_of_allocating() {
    // .shstrtab declares an absurd sh_size; name queries must return an
    // error, not size an allocation from the declared value
    let mut image = build_fixture();
    let range = shdr_field(&image, 4, 32); // sh_size
    image[range].copy_from_slice(&(u64::MAX / 2).to_le_bytes());

    let mut object = ElfObject::parse(Cursor::new(image)).unwrap();
    assert!(matches!(
        object.section_name(1),
        Err(ElfError::MalformedTable { .. })
    ));
    // the symbol string table is untouched, so the object stays usable
    assert!(object.find_symbol("global_data").is_ok());
}

#[test]
fn string_table_offset_overflow_is_malformed() {
    // sh_offset near u64::MAX must not wrap into a low file offset and
    // resolve a bogus name as if it succeeded
    let mut image = build_fixture();
    let range = shdr_field(&image, 3, 24); // .strtab sh_offset
    image[range].copy_from_slice(&u64::MAX.to_le_bytes());

    let mut object = ElfObject::parse(Cursor::new(image)).unwrap();
    assert!(matches!(
        object.symbol_name(2),
        Err(ElfError::MalformedTable { .. })
    ));
    assert!(matches!(
        object.find_symbol("global_data"),
        Err(ElfError::MalformedTable { .. })
    ));
}

#[test]
fn lying_section_size_fails_raw_reads() {
    let mut image = build_fixture();
    let range = shdr_field(&image, 1, 32); // .data sh_size
    image[range].copy_from_slice(&(u64::MAX / 2).to_le_bytes());

    let mut object = ElfObject::parse(Cursor::new(image)).unwrap();
    assert!(matches!(
        object.read_section(1),
        Err(ElfError::MalformedTable { .. })
    ));
    assert!(matches!(
        object.read_object_data("global_data"),
        Err(ElfError::MalformedTable { .. })
    ));
}

#[test]
fn section_offset_overflow_fails_object_read() {
    let mut image = build_fixture();
    let range = shdr_field(&image, 1, 24); // .data sh_offset
    image[range].copy_from_slice(&u64::MAX.to_le_bytes());

    let mut object = ElfObject::parse(Cursor::new(image)).unwrap();
    assert!(matches!(
        object.read_object_data("global_data"),
        Err(ElfError::MalformedTable { .. })
    ));
}

#[test]
fn query_failure_leaves_object_usable() {
    let mut object = parse_fixture();
    assert!(object.read_object_data("my_function").is_err());
    let (data, _) = object.read_object_data("global_data").unwrap();
    assert_eq!(data, [0xDE, 0xAD, 0xBE, 0xEF]);
}
