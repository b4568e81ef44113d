//! Function declarator
//!
//! Member function lines for class bodies and class-qualified function
//! pointer declarators for hook tables.
//!
//! Parameter names come from the function's `DataIsParam` children. They are
//! only trusted when the undecorated name shows that the debug entry really
//! belongs to this function: identical-code folding can make several
//! functions share one entry, and then the names belong to someone else.

use tracing::debug;

use super::options::DeclarationOptions;
use super::types;
use crate::describe::metadata;
use crate::error::{DeclError, Result};
use crate::spelling::{Access, DataKind, LocationType};
use crate::symbol::{Attribute, ChildFilter, Node, Relation, SymbolKind};

fn validate(function: Node<'_>) -> Result<()>
{
    function.expect_kind(&[SymbolKind::Function])?;
    function.expect_lexical_parent(&[SymbolKind::Compiland, SymbolKind::Exe])
}

/// Last `::` component of a symbol name.
pub fn simple_name(symbol: Node<'_>) -> Result<String>
{
    symbol.simple_name()
}

/// Recover parameter names, one slot per parameter (`None` = anonymous).
///
/// Returns an empty list when the names cannot be trusted, which makes the
/// type declarator render every parameter anonymous. A vararg function gets a
/// trailing anonymous slot for its `...` parameter.
pub fn param_names(function: Node<'_>) -> Result<Vec<Option<String>>>
{
    validate(function)?;
    let mut names = Vec::new();
    for child in function.children(&ChildFilter::of_kind(SymbolKind::Data))? {
        if child.data_kind()? == DataKind::Param {
            names.push(child.text(Attribute::Name)?);
        }
    }

    let Some(undecorated) = function.undecorated_name()? else {
        return Ok(names);
    };
    let name = function.name()?;
    if !undecorated.contains(&format!(" {name}(")) {
        debug!(
            "Ignoring {} parameter names of {} ({name}): code was reused by {undecorated}",
            names.len(),
            function.id()
        );
        return Ok(Vec::new());
    }
    if undecorated.contains("...)") && (!names.is_empty() || undecorated.contains("(...)")) {
        names.push(None);
    }
    Ok(names)
}

fn metadata_comment(function: Node<'_>, ty: Node<'_>) -> Result<String>
{
    let own = metadata(function.source(), function.id())?;
    let of_type = metadata(ty.source(), ty.id())?;
    Ok(format!(" // {} // {}", own.join(" "), of_type.join(" ")))
}

/// Access keyword with its colon, or nothing for symbols without access.
pub(crate) fn access_label(symbol: Node<'_>) -> Result<Option<String>>
{
    Ok(match symbol.access()? {
        Access::Other(0) => None,
        access => Some(format!("{}:", access.spelling())),
    })
}

/// One member function line for a class body.
///
/// `[// GENERATED //] access: [static] [virtual] signature( = 0);`
///
/// The return type is left out for constructors and destructors.
///
/// ## Errors
///
/// [`DeclError::SchemaViolation`] when the function has a storage location
/// other than static or none.
pub fn declare_member(function: Node<'_>, class_name: Option<&str>, options: &DeclarationOptions) -> Result<String>
{
    validate(function)?;
    let location = function.location_type()?;
    if !matches!(location, LocationType::Static | LocationType::Null) {
        return Err(DeclError::violation(
            function.id(),
            function.kind(),
            "locationType",
            format!("must be LocIsStatic or LocIsNull, found {location}"),
        ));
    }

    let mut parts = Vec::new();
    if function.flag(Attribute::CompilerGenerated)? {
        parts.push("// GENERATED //".to_string());
    }
    if let Some(access) = access_label(function)? {
        parts.push(access);
    }
    if function.flag(Attribute::IsStatic)? {
        parts.push("static".to_string());
    }
    let is_virtual = function.flag(Attribute::Virtual)?;
    if is_virtual {
        parts.push("virtual".to_string());
    }

    let name = function.simple_name()?;
    let is_constructor = function.flag(Attribute::Constructor)? || class_name == Some(name.as_str());
    let is_destructor = name.starts_with('~');
    let is_pure = is_virtual && function.flag(Attribute::Pure)? && function.flag(Attribute::Intro)?;

    let ty = function.require(Relation::Type)?;
    let signature_options = options
        .for_nested(None)
        .with_name(name)
        .with_param_names(param_names(function)?)
        .with_show_return(!is_constructor && !is_destructor);
    let mut signature = types::declare_signature(ty, &signature_options)?;
    signature.push_str(if is_pure { " = 0;" } else { ";" });
    parts.push(signature);

    let mut line = parts.join(" ");
    if options.metadata_comments() {
        line.push_str(&metadata_comment(function, ty)?);
    }
    Ok(line)
}

/// Class-qualified pointer to the function: `ret (cc Class::*)(params)`.
///
/// The calling convention is always spelled, since a hook must match it.
pub fn declare_member_function_pointer(function: Node<'_>) -> Result<String>
{
    validate(function)?;
    let class_name = function.require(Relation::ClassParent)?.name()?;
    let options = DeclarationOptions::new()
        .with_class_name(class_name)
        .with_param_names(param_names(function)?)
        .with_force_calling_convention(true);
    types::declare_function_pointer(function.require(Relation::Type)?, &options)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::symbol::{SymbolArena, SymbolId, SymbolSource};

    struct Fixture
    {
        arena: SymbolArena,
        class: SymbolId,
        function_type: SymbolId,
    }

    fn fixture() -> Fixture
    {
        let mut arena = SymbolArena::new();
        let void = arena
            .add(SymbolKind::BaseType)
            .unwrap()
            .with(Attribute::BaseType, 1u32)
            .id();
        let int = arena
            .add(SymbolKind::BaseType)
            .unwrap()
            .with(Attribute::BaseType, 6u32)
            .with(Attribute::Length, 4u64)
            .id();
        let root = arena.root();
        let class = arena
            .add_child(root, SymbolKind::Udt)
            .unwrap()
            .named("CNpc")
            .with(Attribute::UdtKind, 1u32)
            .id();
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
        for _ in 0..2 {
            let arg = arena.add_child(function_type, SymbolKind::FunctionArgType).unwrap().id();
            arena.link(arg, Relation::Type, int).unwrap();
        }
        Fixture {
            arena,
            class,
            function_type,
        }
    }

    fn add_function(fixture: &mut Fixture, name: &str, undecorated: &str) -> SymbolId
    {
        let (class, function_type) = (fixture.class, fixture.function_type);
        let function = fixture
            .arena
            .add_child(class, SymbolKind::Function)
            .unwrap()
            .named(name)
            .with(Attribute::UndecoratedName, undecorated)
            .with(Attribute::Access, 3u32)
            .with(Attribute::LocationType, 1u32)
            .related(Relation::Type, function_type)
            .related(Relation::ClassParent, class)
            .id();
        for param in ["x", "y"] {
            let _ = fixture
                .arena
                .add_child(function, SymbolKind::Data)
                .unwrap()
                .named(param)
                .with(Attribute::DataKind, 3u32);
        }
        function
    }

    #[test]
    fn test_param_names_trusted()
    {
        let mut fixture = fixture();
        let function = add_function(
            &mut fixture,
            "CNpc::Move",
            "public: void __thiscall CNpc::Move(int,int)",
        );
        let node = Node::fetch(&fixture.arena, function).unwrap();
        assert_eq!(
            param_names(node).unwrap(),
            vec![Some("x".to_string()), Some("y".to_string())]
        );
        assert_eq!(
            declare_member(node, Some("CNpc"), &DeclarationOptions::new()).unwrap(),
            "public: void Move(int x, int y);"
        );
    }

    #[test]
    fn test_param_names_rejected_on_code_reuse()
    {
        let mut fixture = fixture();
        let function = add_function(
            &mut fixture,
            "CNpc::Move",
            "public: void __thiscall CMonster::Walk(int,int)",
        );
        let node = Node::fetch(&fixture.arena, function).unwrap();
        assert!(param_names(node).unwrap().is_empty());
        assert_eq!(
            declare_member(node, Some("CNpc"), &DeclarationOptions::new()).unwrap(),
            "public: void Move(int, int);"
        );
    }

    #[test]
    fn test_vararg_slot()
    {
        let mut fixture = fixture();
        let function = add_function(
            &mut fixture,
            "CNpc::Say",
            "public: void __cdecl CNpc::Say(char const *,...)",
        );
        let node = Node::fetch(&fixture.arena, function).unwrap();
        assert_eq!(
            param_names(node).unwrap(),
            vec![Some("x".to_string()), Some("y".to_string()), None]
        );
    }

    #[test]
    fn test_vararg_member_declaration()
    {
        let mut fixture = fixture();
        let (class, fixed_type) = (fixture.class, fixture.function_type);
        let arena = &mut fixture.arena;
        let int = arena
            .add(SymbolKind::BaseType)
            .unwrap()
            .with(Attribute::BaseType, 6u32)
            .with(Attribute::Length, 4u64)
            .id();
        let no_type = arena
            .add(SymbolKind::BaseType)
            .unwrap()
            .with(Attribute::BaseType, 0u32)
            .with(Attribute::Length, 0u64)
            .id();
        let object_pointer = arena.relation(fixed_type, Relation::ObjectPointerType).unwrap().unwrap().id;
        let return_type = arena.relation(fixed_type, Relation::Type).unwrap().unwrap().id;
        let vararg_type = arena
            .add(SymbolKind::FunctionType)
            .unwrap()
            .with(Attribute::CallingConvention, 0u32)
            .related(Relation::Type, return_type)
            .related(Relation::ObjectPointerType, object_pointer)
            .related(Relation::ClassParent, class)
            .id();
        for arg_type in [int, int, no_type] {
            let arg = arena.add_child(vararg_type, SymbolKind::FunctionArgType).unwrap().id();
            arena.link(arg, Relation::Type, arg_type).unwrap();
        }

        let function = add_function(&mut fixture, "CNpc::Say", "public: void __cdecl CNpc::Say(int,int,...)");
        fixture.arena.link(function, Relation::Type, vararg_type).unwrap();
        let node = Node::fetch(&fixture.arena, function).unwrap();
        assert_eq!(
            declare_member(node, Some("CNpc"), &DeclarationOptions::new()).unwrap(),
            "public: void __cdecl Say(int x, int y, ...);"
        );

        // Three name slots against the two parameters of the fixed type
        fixture.arena.link(function, Relation::Type, fixed_type).unwrap();
        let node = Node::fetch(&fixture.arena, function).unwrap();
        assert_eq!(
            declare_member(node, Some("CNpc"), &DeclarationOptions::new()).unwrap(),
            "public: void Say(int, int);"
        );
    }

    #[test]
    fn test_virtual_pure_and_constructor()
    {
        let mut fixture = fixture();
        let pure = add_function(&mut fixture, "CNpc::Think", "public: virtual void __thiscall CNpc::Think(int,int)");
        fixture.arena.set(pure, Attribute::Virtual, true).unwrap();
        fixture.arena.set(pure, Attribute::Pure, true).unwrap();
        fixture.arena.set(pure, Attribute::Intro, true).unwrap();
        let ctor = add_function(&mut fixture, "CNpc::CNpc", "public: __thiscall CNpc::CNpc(int,int)");
        let generated = add_function(&mut fixture, "CNpc::~CNpc", "public: __thiscall CNpc::~CNpc(int,int)");
        fixture.arena.set(generated, Attribute::CompilerGenerated, true).unwrap();

        let options = DeclarationOptions::new();
        let line = |id| declare_member(Node::fetch(&fixture.arena, id).unwrap(), Some("CNpc"), &options).unwrap();
        assert_eq!(line(pure), "public: virtual void Think(int x, int y) = 0;");
        assert_eq!(line(ctor), "public: CNpc(int x, int y);");
        assert_eq!(line(generated), "// GENERATED // public: ~CNpc(int x, int y);");
    }

    #[test]
    fn test_bad_location_rejected()
    {
        let mut fixture = fixture();
        let function = add_function(&mut fixture, "CNpc::Move", "public: void __thiscall CNpc::Move(int,int)");
        fixture.arena.set(function, Attribute::LocationType, 4u32).unwrap();
        let err = declare_member(Node::fetch(&fixture.arena, function).unwrap(), None, &DeclarationOptions::new())
            .unwrap_err();
        assert!(matches!(err, DeclError::SchemaViolation { field: "locationType", .. }));
    }

    #[test]
    fn test_member_function_pointer()
    {
        let mut fixture = fixture();
        let function = add_function(&mut fixture, "CNpc::Move", "public: void __thiscall CNpc::Move(int,int)");
        let node = Node::fetch(&fixture.arena, function).unwrap();
        assert_eq!(
            declare_member_function_pointer(node).unwrap(),
            "void (__thiscall CNpc::*)(int x, int y)"
        );
        assert_eq!(simple_name(node).unwrap(), "Move");
    }
}
