//! Tests for loading symbol graphs from JSON files

use std::io::Write;

use symdecl_core::decl::{self, DeclarationOptions};
use symdecl_core::describe::{describe, metadata};
use symdecl_core::symbol::{ChildFilter, Node, SymbolArena, SymbolId, SymbolKind, SymbolSource};
use symdecl_core::DeclError;
use tempfile::NamedTempFile;

const GRAPH: &str = r#"{
    "root": 1,
    "symbols": [
        { "id": 1, "kind": "Exe", "attributes": { "name": "game" }, "children": [2, 5] },
        { "id": 2, "kind": "UDT", "attributes": { "name": "Point", "udtKind": 0, "length": 8 }, "children": [3, 4] },
        { "id": 3, "kind": "Data", "attributes": {
            "name": "Point::x", "dataKind": 7, "locationType": 4, "access": 3, "offset": 0, "type": { "symbol": 6 } } },
        { "id": 4, "kind": "Data", "attributes": {
            "name": "Point::y", "dataKind": 7, "locationType": 4, "access": 3, "offset": 4, "type": { "symbol": 6 } } },
        { "id": 5, "kind": "Data", "attributes": {
            "name": "g_origin", "dataKind": 6, "locationType": 1, "virtualAddress": 4198400, "type": { "symbol": 2 } } },
        { "id": 6, "kind": "BaseType", "attributes": { "baseType": 8, "length": 4 } }
    ]
}"#;

fn write_graph() -> NamedTempFile
{
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(GRAPH.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_and_define()
{
    let file = write_graph();
    let arena = SymbolArena::load(file.path()).unwrap();
    assert_eq!(arena.len(), 6);

    let found = arena
        .children(arena.root(), &ChildFilter::of_kind(SymbolKind::Udt).named("Point"))
        .unwrap();
    assert_eq!(found.len(), 1);
    let point = Node::new(&arena, found[0]);
    assert_eq!(
        decl::udt::define_lines(point, &DeclarationOptions::new()).unwrap(),
        vec![
            "struct Point",
            "{",
            "\t/* this+0 */ public: float x;",
            "\t/* this+4 */ public: float y;",
            "",
            "};",
        ]
    );

    let origin = Node::fetch(&arena, SymbolId(5)).unwrap();
    assert_eq!(
        decl::data::define_lines(origin, &DeclarationOptions::new()).unwrap(),
        vec![
            "extern struct Point g_origin;",
            "struct Point g_origin; // <va=0x401000> <rva=0x0> <section=0x0> <offset=0x0> <normal-or-extern-or-member-static>",
        ]
    );
}

#[test]
fn test_save_round_trip()
{
    let file = write_graph();
    let arena = SymbolArena::load(file.path()).unwrap();

    let copy = NamedTempFile::new().unwrap();
    arena.save(copy.path()).unwrap();
    let reloaded = SymbolArena::load(copy.path()).unwrap();

    assert_eq!(
        describe(&reloaded, SymbolId(3)).unwrap(),
        describe(&arena, SymbolId(3)).unwrap()
    );
    assert_eq!(
        metadata(&reloaded, SymbolId(2)).unwrap(),
        vec!["<length=8>", "<name=Point>", "<symTag=UDT>"]
    );
}

#[test]
fn test_self_referencing_pointer_rejected()
{
    let json = r#"{
        "root": 1,
        "symbols": [
            { "id": 1, "kind": "Exe" },
            { "id": 2, "kind": "PointerType", "attributes": { "length": 4, "type": { "symbol": 2 } } }
        ]
    }"#;
    let err = SymbolArena::from_json(json).unwrap_err();
    assert!(matches!(
        err,
        DeclError::SchemaViolation {
            symbol: SymbolId(2),
            field: "type",
            ..
        }
    ));
}

#[test]
fn test_self_nested_udt_rejected()
{
    let json = r#"{
        "root": 1,
        "symbols": [
            { "id": 1, "kind": "Exe", "children": [2] },
            { "id": 2, "kind": "UDT", "attributes": { "name": "Loop" }, "children": [2] }
        ]
    }"#;
    let err = SymbolArena::from_json(json).unwrap_err();
    assert!(matches!(err, DeclError::SchemaViolation { field: "children", .. }));
}

#[test]
fn test_linked_list_loads_and_defines()
{
    let json = r#"{
        "root": 1,
        "symbols": [
            { "id": 1, "kind": "Exe", "children": [2] },
            { "id": 2, "kind": "UDT", "attributes": { "name": "Node", "length": 8 }, "children": [3, 4] },
            { "id": 3, "kind": "Data", "attributes": {
                "name": "Node::value", "dataKind": 7, "locationType": 4, "access": 3, "offset": 0, "type": { "symbol": 5 } } },
            { "id": 4, "kind": "Data", "attributes": {
                "name": "Node::next", "dataKind": 7, "locationType": 4, "access": 3, "offset": 4, "type": { "symbol": 6 } } },
            { "id": 5, "kind": "BaseType", "attributes": { "baseType": 6, "length": 4 } },
            { "id": 6, "kind": "PointerType", "attributes": { "length": 4, "type": { "symbol": 2 } } }
        ]
    }"#;
    let arena = SymbolArena::from_json(json).unwrap();
    let node = Node::fetch(&arena, SymbolId(2)).unwrap();
    assert_eq!(
        decl::udt::define_lines(node, &DeclarationOptions::new()).unwrap(),
        vec![
            "struct Node",
            "{",
            "\t/* this+0 */ public: int value;",
            "\t/* this+4 */ public: struct Node *next;",
            "",
            "};",
        ]
    );
}

#[test]
fn test_missing_file()
{
    let dir = tempfile::tempdir().unwrap();
    let result = SymbolArena::load(dir.path().join("absent.json"));
    assert!(matches!(result, Err(DeclError::Io(_))));
}
