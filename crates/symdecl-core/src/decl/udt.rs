//! UDT definer
//!
//! Renders struct, class and union bodies. Children are sorted into five
//! buckets (base classes, vtables, nested types, data, functions) and emitted
//! in a fixed order. A child whose shape has no rule becomes a
//! `// unmodeled ...` line in place, and a child that violates its schema
//! becomes a `// schema violation ...` line; its siblings still render.
//! Violations on the UDT itself and source failures abort the definition.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use super::options::DeclarationOptions;
use super::{data, enums, function, types, vtable};
use crate::describe::metadata;
use crate::error::{DeclError, Result};
use crate::spelling::UdtKind;
use crate::symbol::{Attribute, ChildFilter, Node, Relation, SymbolKind};

fn validate(symbol: Node<'_>) -> Result<()>
{
    symbol.expect_kind(&[SymbolKind::Udt, SymbolKind::BaseClass])?;
    symbol.expect_global_scope()
}

/// `[const ]struct|class|union Name`
pub fn declare(symbol: Node<'_>) -> Result<String>
{
    validate(symbol)?;
    let mut out = String::new();
    if symbol.flag(Attribute::ConstType)? {
        out.push_str("const ");
    }
    out.push_str(&symbol.udt_kind()?.spelling());
    out.push(' ');
    out.push_str(&symbol.name()?);
    Ok(out)
}

/// `[const ]struct|class|union Name;`
pub fn declare_line(symbol: Node<'_>) -> Result<String>
{
    Ok(format!("{};", declare(symbol)?))
}

/// Name of a base class, taken from the base UDT when the entry has none.
fn base_name(base: Node<'_>) -> Result<String>
{
    match base.text(Attribute::Name)? {
        Some(name) => Ok(name),
        None => base.require(Relation::Type)?.name(),
    }
}

/// `[virtual ]access Base` for each base class.
pub fn inheritance(bases: &[Node<'_>]) -> Result<Vec<String>>
{
    bases
        .iter()
        .map(|base| {
            let mut parts = Vec::with_capacity(3);
            if base.flag(Attribute::VirtualBaseClass)? {
                parts.push("virtual".to_string());
            }
            parts.push(base.access()?.spelling());
            parts.push(base_name(*base)?);
            Ok(parts.join(" "))
        })
        .collect()
}

#[derive(Default)]
struct Buckets<'a>
{
    bases: Vec<Node<'a>>,
    vtables: Vec<Node<'a>>,
    nested: Vec<Node<'a>>,
    data: Vec<Node<'a>>,
    functions: Vec<Node<'a>>,
    unmodeled: Vec<Node<'a>>,
}

impl<'a> Buckets<'a>
{
    fn sort(children: Vec<Node<'a>>) -> Self
    {
        let mut buckets = Self::default();
        for child in children {
            match child.kind() {
                SymbolKind::BaseClass => buckets.bases.push(child),
                SymbolKind::VTable => buckets.vtables.push(child),
                SymbolKind::Enum | SymbolKind::Udt | SymbolKind::Typedef => buckets.nested.push(child),
                SymbolKind::Data => buckets.data.push(child),
                SymbolKind::Function => buckets.functions.push(child),
                _ => buckets.unmodeled.push(child),
            }
        }
        buckets
    }
}

fn indented(lines: Vec<String>) -> impl Iterator<Item = String>
{
    lines.into_iter().map(|line| format!("\t{line}"))
}

fn placeholder(child: Node<'_>, detail: &str) -> String
{
    format!("// unmodeled {} {}: {detail}", child.kind(), child.id())
}

/// Keep rendering past a child that is unmodeled or violates its schema.
fn recover(child: Node<'_>, result: Result<Vec<String>>) -> Result<Vec<String>>
{
    match result {
        Ok(lines) => Ok(lines),
        Err(err) if err.is_unmodeled() => {
            debug!("Placeholder for {} {}: {err}", child.kind(), child.id());
            Ok(vec![placeholder(child, &err.to_string())])
        }
        Err(DeclError::SchemaViolation {
            symbol,
            kind,
            field,
            detail,
        }) => {
            warn!("Skipping {} {}: {kind} {symbol} violates {field}: {detail}", child.kind(), child.id());
            Ok(vec![format!(
                "// schema violation {} {}: {kind} {symbol} {field} {detail}",
                child.kind(),
                child.id()
            )])
        }
        Err(err) => Err(err),
    }
}

fn typedef_line(typedef: Node<'_>, options: &DeclarationOptions) -> Result<String>
{
    let ty = typedef.require(Relation::Type)?;
    let name = typedef.simple_name()?;
    let mut line = format!("typedef {};", types::declare(ty, &options.for_nested(Some(&name)))?);
    if options.metadata_comments() {
        let own = metadata(typedef.source(), typedef.id())?;
        let of_type = metadata(ty.source(), ty.id())?;
        line.push_str(&format!(" // {} // {}", own.join(" "), of_type.join(" ")));
    }
    Ok(line)
}

fn nested_lines(child: Node<'_>, options: &DeclarationOptions) -> Result<Vec<String>>
{
    match child.kind() {
        SymbolKind::Enum => enums::define_lines(child, options),
        SymbolKind::Udt => define_lines(child, &options.for_nested_definition()),
        _ => Ok(vec![typedef_line(child, options)?]),
    }
}

fn base_line(base: Node<'_>) -> Result<String>
{
    let offset = base.int(Attribute::Offset)?;
    Ok(format!(
        "/* this+{offset} */ //{}: {} baseclass_{offset};",
        base.access()?.spelling(),
        base_name(base)?
    ))
}

/// `static hook_method<ptr> _name;` lines for the hookable functions.
///
/// Constructors, destructors and compiler-generated functions are skipped.
/// Overloaded names get an `_overloadN` suffix, numbered in source order.
fn hook_lines(functions: &[Node<'_>], class_name: &str) -> Result<Vec<String>>
{
    let mut hooks = Vec::new();
    for function in functions {
        let name = function.simple_name()?;
        if function.flag(Attribute::CompilerGenerated)?
            || function.flag(Attribute::Constructor)?
            || name == class_name
            || name.starts_with('~')
        {
            continue;
        }
        hooks.push((*function, name));
    }

    let mut totals: HashMap<&str, usize> = HashMap::new();
    for (_, name) in &hooks {
        *totals.entry(name.as_str()).or_default() += 1;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut lines = Vec::with_capacity(hooks.len());
    for (function, name) in &hooks {
        let index = seen.entry(name.as_str()).or_default();
        *index += 1;
        let hook_name = if totals.get(name.as_str()).copied().unwrap_or(0) > 1 {
            format!("_{name}_overload{index}")
        } else {
            format!("_{name}")
        };
        let hook = function::declare_member_function_pointer(*function)
            .map(|pointer| vec![format!("static hook_method<{pointer}> {hook_name};")]);
        lines.extend(indented(recover(*function, hook)?));
    }
    Ok(lines)
}

/// Full definition of a struct, class or union.
///
/// Order: header with inheritance, `{`, `public:` for classes, vtable struct
/// and nested types (each followed by a blank line), the vftable pointer
/// comment when the class has a vtable but no base, base-class and data
/// members, a blank line, member functions, unmodeled children, the optional
/// hook section, `};`.
///
/// ## Errors
///
/// Schema violations of the UDT itself, nesting deeper than
/// [`super::MAX_NESTING_DEPTH`], and graph or source errors from any child.
pub fn define_lines(udt: Node<'_>, options: &DeclarationOptions) -> Result<Vec<String>>
{
    udt.expect_kind(&[SymbolKind::Udt])?;
    types::expect_depth(udt, "children", options.depth())?;
    trace!("define udt {} {}", udt.id(), udt.name()?);
    let class_name = udt.simple_name()?;
    let buckets = Buckets::sort(udt.children(&ChildFilter::all())?);

    let mut header = declare(udt)?;
    if !buckets.bases.is_empty() {
        header.push_str(" : ");
        header.push_str(&inheritance(&buckets.bases)?.join(", "));
    }
    if options.metadata_comments() {
        header.push_str(" // ");
        header.push_str(&metadata(udt.source(), udt.id())?.join(" "));
    }

    let mut lines = vec![header, "{".to_string()];
    if udt.udt_kind()? == UdtKind::Class {
        lines.push("public:".to_string());
    }

    for vtable in &buckets.vtables {
        let rendered = recover(*vtable, vtable::define_vtable_symbol_lines(*vtable, udt, options))?;
        lines.extend(indented(rendered));
        lines.push(String::new());
    }
    for nested in &buckets.nested {
        let rendered = recover(*nested, nested_lines(*nested, options))?;
        lines.extend(indented(rendered));
        lines.push(String::new());
    }

    if buckets.bases.is_empty() && !buckets.vtables.is_empty() {
        lines.push(format!("\t/* this+0 */ //const {}::`vftable'", udt.name()?));
    }
    for base in &buckets.bases {
        lines.extend(indented(recover(*base, base_line(*base).map(|line| vec![line]))?));
    }
    for member in &buckets.data {
        let rendered = recover(*member, data::declare_member(*member, options).map(|line| vec![line]))?;
        lines.extend(indented(rendered));
    }
    if !buckets.bases.is_empty() || !buckets.data.is_empty() {
        lines.push(String::new());
    }

    for member in &buckets.functions {
        let rendered = recover(
            *member,
            function::declare_member(*member, Some(&class_name), options).map(|line| vec![line]),
        )?;
        lines.extend(indented(rendered));
    }
    for child in &buckets.unmodeled {
        let tokens = metadata(child.source(), child.id())?;
        lines.push(format!("\t{}", placeholder(*child, &tokens.join(" "))));
    }

    if options.show_hooks() {
        lines.push(String::new());
        lines.push("private:".to_string());
        lines.extend(hook_lines(&buckets.functions, &class_name)?);
    }
    lines.push("};".to_string());
    Ok(lines)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::symbol::{SymbolArena, SymbolId};

    fn int(arena: &mut SymbolArena) -> SymbolId
    {
        arena
            .add(SymbolKind::BaseType)
            .unwrap()
            .with(Attribute::BaseType, 6u32)
            .with(Attribute::Length, 4u64)
            .id()
    }

    #[test]
    fn test_declare_kinds()
    {
        let mut arena = SymbolArena::new();
        let point = arena.add(SymbolKind::Udt).unwrap().named("Point").id();
        let value = arena
            .add(SymbolKind::Udt)
            .unwrap()
            .named("Value")
            .with(Attribute::UdtKind, 2u32)
            .with(Attribute::ConstType, true)
            .id();
        assert_eq!(declare(Node::fetch(&arena, point).unwrap()).unwrap(), "struct Point");
        assert_eq!(declare_line(Node::fetch(&arena, value).unwrap()).unwrap(), "const union Value;");
    }

    #[test]
    fn test_struct_with_members_and_placeholder()
    {
        let mut arena = SymbolArena::new();
        let int = int(&mut arena);
        let root = arena.root();
        let point = arena.add_child(root, SymbolKind::Udt).unwrap().named("Point").id();
        for (name, offset) in [("x", 0i32), ("y", 4)] {
            let _ = arena
                .add_child(point, SymbolKind::Data)
                .unwrap()
                .named(name)
                .with(Attribute::DataKind, 7u32)
                .with(Attribute::LocationType, 4u32)
                .with(Attribute::Access, 3u32)
                .with(Attribute::Offset, offset)
                .related(Relation::Type, int);
        }
        let local = arena
            .add_child(point, SymbolKind::Data)
            .unwrap()
            .named("tmp")
            .with(Attribute::DataKind, 1u32)
            .with(Attribute::LocationType, 3u32)
            .related(Relation::Type, int)
            .id();

        let lines = define_lines(Node::fetch(&arena, point).unwrap(), &DeclarationOptions::new()).unwrap();
        assert_eq!(
            lines,
            vec![
                "struct Point".to_string(),
                "{".to_string(),
                "\t/* this+0 */ public: int x;".to_string(),
                "\t/* this+4 */ public: int y;".to_string(),
                format!(
                    "\t// unmodeled Data {local}: Unmodeled data shape on symbol {local}: (DataIsLocal, LocIsRegRel)"
                ),
                String::new(),
                "};".to_string(),
            ]
        );
    }

    #[test]
    fn test_inheritance_header_and_base_line()
    {
        let mut arena = SymbolArena::new();
        let root = arena.root();
        let base = arena
            .add_child(root, SymbolKind::Udt)
            .unwrap()
            .named("CObject")
            .with(Attribute::UdtKind, 1u32)
            .id();
        let derived = arena
            .add_child(root, SymbolKind::Udt)
            .unwrap()
            .named("CNpc")
            .with(Attribute::UdtKind, 1u32)
            .id();
        let _ = arena
            .add_child(derived, SymbolKind::BaseClass)
            .unwrap()
            .with(Attribute::Access, 3u32)
            .related(Relation::Type, base);

        let lines = define_lines(Node::fetch(&arena, derived).unwrap(), &DeclarationOptions::new()).unwrap();
        assert_eq!(
            lines,
            vec![
                "class CNpc : public CObject",
                "{",
                "public:",
                "\t/* this+0 */ //public: CObject baseclass_0;",
                "",
                "};",
            ]
        );
    }

    #[test]
    fn test_schema_violation_stays_with_member()
    {
        let mut arena = SymbolArena::new();
        let int = int(&mut arena);
        let root = arena.root();
        let point = arena.add_child(root, SymbolKind::Udt).unwrap().named("Point").id();
        let compiland = arena.add(SymbolKind::Compiland).unwrap().id();
        let x = arena
            .add_child(point, SymbolKind::Data)
            .unwrap()
            .named("x")
            .with(Attribute::DataKind, 7u32)
            .with(Attribute::LocationType, 4u32)
            .related(Relation::Type, int)
            .related(Relation::LexicalParent, compiland)
            .id();
        let _ = arena
            .add_child(point, SymbolKind::Data)
            .unwrap()
            .named("y")
            .with(Attribute::DataKind, 7u32)
            .with(Attribute::LocationType, 4u32)
            .with(Attribute::Access, 3u32)
            .with(Attribute::Offset, 4i32)
            .related(Relation::Type, int);

        let lines = define_lines(Node::fetch(&arena, point).unwrap(), &DeclarationOptions::new()).unwrap();
        assert_eq!(
            lines,
            vec![
                "struct Point".to_string(),
                "{".to_string(),
                format!("\t// schema violation Data {x}: Data {x} lexicalParent unexpected Compiland scope"),
                "\t/* this+4 */ public: int y;".to_string(),
                String::new(),
                "};".to_string(),
            ]
        );
    }

    #[test]
    fn test_violation_on_udt_itself_aborts()
    {
        let mut arena = SymbolArena::new();
        let root = arena.root();
        let compiland = arena.add(SymbolKind::Compiland).unwrap().id();
        let point = arena
            .add_child(root, SymbolKind::Udt)
            .unwrap()
            .named("Point")
            .related(Relation::LexicalParent, compiland)
            .id();
        let err = define_lines(Node::fetch(&arena, point).unwrap(), &DeclarationOptions::new()).unwrap_err();
        assert!(matches!(err, DeclError::SchemaViolation { field: "lexicalParent", .. }));
    }

    #[test]
    fn test_self_nested_udt_stops_at_depth_limit()
    {
        let mut arena = SymbolArena::new();
        let root = arena.root();
        let node = arena.add_child(root, SymbolKind::Udt).unwrap().named("Node").id();
        arena.attach(node, node).unwrap();

        let lines = define_lines(Node::fetch(&arena, node).unwrap(), &DeclarationOptions::new()).unwrap();
        let violations: Vec<_> = lines.iter().filter(|line| line.contains("// schema violation")).collect();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("children nested deeper than 64 levels"));
    }
}
