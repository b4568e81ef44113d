//! End-to-end declaration synthesis over a small class hierarchy
//!
//! `CObject <- CCharacter <- CNpc`, each level introducing virtual functions.

use symdecl_core::decl::{self, DataShape, DeclarationOptions, EnumRadix, VTableSlot};
use symdecl_core::spelling::{basic_type_spelling, BasicType, DataKind, LocationType};
use symdecl_core::symbol::{Attribute, ChildFilter, Node, Relation, SymbolArena, SymbolId, SymbolKind, SymbolSource};
use symdecl_core::DeclError;

struct Hierarchy
{
    arena: SymbolArena,
    int: SymbolId,
    object: SymbolId,
    character: SymbolId,
    npc: SymbolId,
    update: SymbolId,
    attack: SymbolId,
    npc_draw: SymbolId,
    think: SymbolId,
}

fn base_type(arena: &mut SymbolArena, base: u32, length: u64) -> SymbolId
{
    arena
        .add(SymbolKind::BaseType)
        .unwrap()
        .with(Attribute::BaseType, base)
        .with(Attribute::Length, length)
        .id()
}

fn class(arena: &mut SymbolArena, name: &str) -> SymbolId
{
    let root = arena.root();
    arena
        .add_child(root, SymbolKind::Udt)
        .unwrap()
        .named(name)
        .with(Attribute::UdtKind, 1u32)
        .id()
}

/// `void (this)` or `void (this, arg)` member function type of `class`.
fn method_type(arena: &mut SymbolArena, class: SymbolId, void: SymbolId, arg: Option<SymbolId>) -> SymbolId
{
    let this_ptr = arena
        .add(SymbolKind::PointerType)
        .unwrap()
        .with(Attribute::Length, 4u64)
        .related(Relation::Type, class)
        .id();
    let function_type = arena
        .add(SymbolKind::FunctionType)
        .unwrap()
        .with(Attribute::CallingConvention, 0x0bu32)
        .related(Relation::Type, void)
        .related(Relation::ObjectPointerType, this_ptr)
        .related(Relation::ClassParent, class)
        .id();
    if let Some(arg) = arg {
        let param = arena.add_child(function_type, SymbolKind::FunctionArgType).unwrap().id();
        arena.link(param, Relation::Type, arg).unwrap();
    }
    function_type
}

fn method(arena: &mut SymbolArena, class: SymbolId, function_type: SymbolId, name: &str) -> SymbolId
{
    arena
        .add_child(class, SymbolKind::Function)
        .unwrap()
        .named(name)
        .with(Attribute::Access, 3u32)
        .related(Relation::Type, function_type)
        .related(Relation::ClassParent, class)
        .id()
}

fn virtual_method(
    arena: &mut SymbolArena,
    class: SymbolId,
    function_type: SymbolId,
    name: &str,
    offset: u64,
    intro: bool,
) -> SymbolId
{
    let id = method(arena, class, function_type, name);
    arena.set(id, Attribute::Virtual, true).unwrap();
    arena.set(id, Attribute::Intro, intro).unwrap();
    arena.set(id, Attribute::VirtualBaseOffset, offset).unwrap();
    id
}

fn inherit(arena: &mut SymbolArena, derived: SymbolId, base: SymbolId)
{
    let _ = arena
        .add_child(derived, SymbolKind::BaseClass)
        .unwrap()
        .with(Attribute::Access, 3u32)
        .related(Relation::Type, base);
}

fn hierarchy() -> Hierarchy
{
    let mut arena = SymbolArena::new();
    let void = base_type(&mut arena, 1, 0);
    let int = base_type(&mut arena, 6, 4);

    let object = class(&mut arena, "CObject");
    let shape = arena.add(SymbolKind::VTableShape).unwrap().with(Attribute::Count, 2u32).id();
    let vtable_ptr = arena
        .add(SymbolKind::PointerType)
        .unwrap()
        .with(Attribute::Length, 4u64)
        .related(Relation::Type, shape)
        .id();
    let _ = arena
        .add_child(object, SymbolKind::VTable)
        .unwrap()
        .related(Relation::Type, vtable_ptr);
    let _ = arena
        .add_child(object, SymbolKind::Data)
        .unwrap()
        .named("CObject::m_id")
        .with(Attribute::DataKind, 7u32)
        .with(Attribute::LocationType, 4u32)
        .with(Attribute::Access, 3u32)
        .with(Attribute::Offset, 4i32)
        .related(Relation::Type, int);
    let object_fn = method_type(&mut arena, object, void, None);
    let update = virtual_method(&mut arena, object, object_fn, "CObject::Update", 0, true);
    let _ = virtual_method(&mut arena, object, object_fn, "CObject::Draw", 4, true);

    let character = class(&mut arena, "CCharacter");
    inherit(&mut arena, character, object);
    let character_fn = method_type(&mut arena, character, void, None);
    let _ = virtual_method(&mut arena, character, character_fn, "CCharacter::Update", 0, false);
    let attack = virtual_method(&mut arena, character, character_fn, "CCharacter::Attack", 8, true);

    let npc = class(&mut arena, "CNpc");
    inherit(&mut arena, npc, character);
    let state = arena.add_child(npc, SymbolKind::Enum).unwrap().named("State").id();
    for (name, value) in [("Idle", 0i64), ("Busy", 1)] {
        let _ = arena
            .add_child(state, SymbolKind::Data)
            .unwrap()
            .named(name)
            .with(Attribute::DataKind, 9u32)
            .with(Attribute::LocationType, 10u32)
            .with(Attribute::Value, value)
            .related(Relation::Type, int)
            .related(Relation::ClassParent, state);
    }
    let _ = arena
        .add_child(npc, SymbolKind::Data)
        .unwrap()
        .named("CNpc::m_state")
        .with(Attribute::DataKind, 7u32)
        .with(Attribute::LocationType, 4u32)
        .with(Attribute::Access, 1u32)
        .with(Attribute::Offset, 8i32)
        .related(Relation::Type, state);
    let npc_fn = method_type(&mut arena, npc, void, None);
    let npc_say = method_type(&mut arena, npc, void, Some(int));
    let ctor = method(&mut arena, npc, npc_fn, "CNpc::CNpc");
    arena.set(ctor, Attribute::Constructor, true).unwrap();
    let think = virtual_method(&mut arena, npc, npc_fn, "CNpc::Think", 12, true);
    let npc_draw = virtual_method(&mut arena, npc, npc_fn, "CNpc::Draw", 4, true);
    let _ = method(&mut arena, npc, npc_say, "CNpc::Say");
    let _ = method(&mut arena, npc, npc_say, "CNpc::Say");

    Hierarchy {
        arena,
        int,
        object,
        character,
        npc,
        update,
        attack,
        npc_draw,
        think,
    }
}

#[test]
fn test_basic_type_spellings()
{
    assert_eq!(basic_type_spelling(BasicType::NoType, 0).unwrap(), "...");
    assert_eq!(basic_type_spelling(BasicType::Int, 1).unwrap(), "signed char");
    assert_eq!(basic_type_spelling(BasicType::Int, 8).unwrap(), "__int64");
    assert_eq!(basic_type_spelling(BasicType::UInt, 2).unwrap(), "unsigned short");
    assert_eq!(basic_type_spelling(BasicType::ULong, 4).unwrap(), "unsigned long");
    assert_eq!(basic_type_spelling(BasicType::Float, 8).unwrap(), "double");
    assert!(matches!(
        basic_type_spelling(BasicType::Float, 2),
        Err(DeclError::UnsupportedBasicType {
            base: BasicType::Float,
            length: 2
        })
    ));
}

#[test]
fn test_vtable_three_levels()
{
    let h = hierarchy();
    let npc = Node::fetch(&h.arena, h.npc).unwrap();
    let slots = decl::vtable::resolve_slots(npc).unwrap();
    assert_eq!(
        slots,
        vec![
            VTableSlot {
                offset: 0,
                function: h.update
            },
            VTableSlot {
                offset: 4,
                function: h.npc_draw
            },
            VTableSlot {
                offset: 8,
                function: h.attack
            },
            VTableSlot {
                offset: 12,
                function: h.think
            },
        ]
    );
    assert_eq!(decl::vtable::resolve_slots(npc).unwrap(), slots);

    let character = Node::fetch(&h.arena, h.character).unwrap();
    let offsets: Vec<u64> = decl::vtable::resolve_slots(character)
        .unwrap()
        .iter()
        .map(|slot| slot.offset)
        .collect();
    assert_eq!(offsets, vec![0, 4, 8]);
}

#[test]
fn test_class_with_vtable_and_no_base()
{
    let h = hierarchy();
    let object = Node::fetch(&h.arena, h.object).unwrap();
    let lines = decl::udt::define_lines(object, &DeclarationOptions::new()).unwrap();
    assert_eq!(
        lines,
        vec![
            "class CObject",
            "{",
            "public:",
            "\tstruct vtable_t // const CObject::`vftable'",
            "\t{",
            "\t\t/* vtable+0/0x0 */ CObject::Update",
            "\t\t/* vtable+4/0x4 */ CObject::Draw",
            "\t};",
            "",
            "\t/* this+0 */ //const CObject::`vftable'",
            "\t/* this+4 */ public: int m_id;",
            "",
            "\tpublic: virtual void Update(void);",
            "\tpublic: virtual void Draw(void);",
            "};",
        ]
    );
}

#[test]
fn test_derived_class_with_hooks()
{
    let h = hierarchy();
    let npc = Node::fetch(&h.arena, h.npc).unwrap();
    let options = DeclarationOptions::new().with_show_hooks(true);
    let lines = decl::udt::define_lines(npc, &options).unwrap();
    assert_eq!(
        lines,
        vec![
            "class CNpc : public CCharacter",
            "{",
            "public:",
            "\tenum State",
            "\t{",
            "\t\tIdle = 0x0,",
            "\t\tBusy = 0x1",
            "\t};",
            "",
            "\t/* this+0 */ //public: CCharacter baseclass_0;",
            "\t/* this+8 */ private: enum State m_state;",
            "",
            "\tpublic: CNpc(void);",
            "\tpublic: virtual void Think(void);",
            "\tpublic: virtual void Draw(void);",
            "\tpublic: void Say(int);",
            "\tpublic: void Say(int);",
            "",
            "private:",
            "\tstatic hook_method<void (__thiscall CNpc::*)(void)> _Think;",
            "\tstatic hook_method<void (__thiscall CNpc::*)(void)> _Draw;",
            "\tstatic hook_method<void (__thiscall CNpc::*)(int)> _Say_overload1;",
            "\tstatic hook_method<void (__thiscall CNpc::*)(int)> _Say_overload2;",
            "};",
        ]
    );
}

#[test]
fn test_enum_radix()
{
    let h = hierarchy();
    let npc = Node::fetch(&h.arena, h.npc).unwrap();
    let state = npc
        .children(&ChildFilter::of_kind(SymbolKind::Enum))
        .unwrap()[0];
    let decimal = DeclarationOptions::new().with_enum_radix(EnumRadix::Decimal);
    assert_eq!(
        decl::enums::define_lines(state, &decimal).unwrap(),
        vec!["enum State", "{", "\tIdle = 0,", "\tBusy = 1", "};"]
    );
}

#[test]
fn test_const_pointer_spelling()
{
    let mut h = hierarchy();
    let const_ptr = h
        .arena
        .add(SymbolKind::PointerType)
        .unwrap()
        .with(Attribute::Length, 4u64)
        .with(Attribute::ConstType, true)
        .related(Relation::Type, h.int)
        .id();
    let node = Node::fetch(&h.arena, const_ptr).unwrap();
    assert_eq!(decl::types::declare(node, &DeclarationOptions::new()).unwrap(), "int *const");
}

#[test]
fn test_param_names_rejected_on_code_reuse()
{
    let mut h = hierarchy();
    let npc_say = h
        .arena
        .children(h.npc, &ChildFilter::of_kind(SymbolKind::Function).named("CNpc::Say"))
        .unwrap()[0]
        .id;
    let _ = h
        .arena
        .add_child(npc_say, SymbolKind::Data)
        .unwrap()
        .named("text")
        .with(Attribute::DataKind, 3u32);
    h.arena
        .set(npc_say, Attribute::UndecoratedName, "public: void __thiscall CMonster::Roar(int)")
        .unwrap();

    let function = Node::fetch(&h.arena, npc_say).unwrap();
    assert!(decl::function::param_names(function).unwrap().is_empty());
    assert_eq!(
        decl::function::declare_member(function, Some("CNpc"), &DeclarationOptions::new()).unwrap(),
        "public: void Say(int);"
    );

    h.arena
        .set(npc_say, Attribute::UndecoratedName, "public: void __thiscall CNpc::Say(int)")
        .unwrap();
    let function = Node::fetch(&h.arena, npc_say).unwrap();
    assert_eq!(
        decl::function::declare_member(function, Some("CNpc"), &DeclarationOptions::new()).unwrap(),
        "public: void Say(int text);"
    );
}

#[test]
fn test_unmodeled_data_shape()
{
    let mut h = hierarchy();
    let root = h.arena.root();
    let tls = h
        .arena
        .add_child(root, SymbolKind::Data)
        .unwrap()
        .named("t_frame")
        .with(Attribute::DataKind, 6u32)
        .with(Attribute::LocationType, 2u32)
        .related(Relation::Type, h.int)
        .id();
    let node = Node::fetch(&h.arena, tls).unwrap();
    let err = DataShape::classify(node).unwrap_err();
    match err {
        DeclError::UnmodeledDataShape {
            symbol,
            data_kind,
            location,
        } => {
            assert_eq!(symbol, tls);
            assert_eq!(data_kind, DataKind::Global);
            assert_eq!(location, LocationType::Tls);
        }
        other => panic!("Expected UnmodeledDataShape, got {other}"),
    }
}
