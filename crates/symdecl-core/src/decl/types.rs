//! Type declarator
//!
//! Turns a type symbol into declarator text: `const int`, `int *const name`,
//! `CNpc *`, `char name[16][4]`, `void (__stdcall *callback)(int)`.
//!
//! Spelling rules:
//! - pointer sigils follow the pointee after one space, and stack without
//!   spaces (`int **`)
//! - a const pointer puts `const` right after its sigil (`int *const`)
//! - a declarator name goes directly after a sigil, otherwise after a space
//! - nested arrays collapse into successive dimensions
//!
//! Function types are never declared through [`declare`]: a function type
//! alone does not say whether it names a function or a function pointer.
//! Use [`declare_signature`] or [`declare_function_pointer`].

use std::fmt::Write as _;

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use super::options::{DeclarationOptions, MAX_NESTING_DEPTH};
use super::{enums, udt};
use crate::describe::metadata;
use crate::error::{DeclError, Result};
use crate::spelling::{basic_type_spelling, CallingConvention};
use crate::symbol::{Attribute, ChildFilter, Node, Relation, SymbolKind};

/// Append a declarator name: directly after a sigil, otherwise after a space.
pub(crate) fn attach_name(out: &mut String, name: Option<&str>)
{
    let Some(name) = name else {
        return;
    };
    if !out.is_empty() && !out.ends_with(['*', '&']) {
        out.push(' ');
    }
    out.push_str(name);
}

/// Type symbols must live in the global scope.
fn validate(ty: Node<'_>) -> Result<()>
{
    ty.expect_global_scope()
}

/// Fails once a chain of `type` links runs deeper than [`MAX_NESTING_DEPTH`].
pub(crate) fn expect_depth(symbol: Node<'_>, field: &'static str, depth: usize) -> Result<()>
{
    if depth > MAX_NESTING_DEPTH {
        return Err(DeclError::violation(
            symbol.id(),
            symbol.kind(),
            field,
            format!("nested deeper than {MAX_NESTING_DEPTH} levels, the graph is cyclic"),
        ));
    }
    Ok(())
}

/// Declare a type, optionally with the declarator name from `options`.
///
/// ## Errors
///
/// - [`DeclError::AmbiguousFunctionType`] for function types
/// - [`DeclError::UnsupportedBasicType`] for basic types outside the table
/// - [`DeclError::SchemaViolation`] for volatile/unaligned pointers, bad array
///   index types, non-global types and `type` chains that loop
pub fn declare(ty: Node<'_>, options: &DeclarationOptions) -> Result<String>
{
    trace!("declare {} {}", ty.kind(), ty.id());
    expect_depth(ty, "type", options.depth())?;
    validate(ty)?;
    match ty.kind() {
        SymbolKind::BaseType => declare_base_type(ty, options),
        SymbolKind::PointerType => declare_pointer(ty, options),
        SymbolKind::ArrayType => declare_array(ty, options),
        SymbolKind::Enum => {
            let mut out = enums::declare(ty)?;
            attach_name(&mut out, options.name());
            Ok(out)
        }
        SymbolKind::Udt => {
            let mut out = udt::declare(ty)?;
            attach_name(&mut out, options.name());
            Ok(out)
        }
        SymbolKind::FunctionType => Err(DeclError::AmbiguousFunctionType(ty.id())),
        SymbolKind::Null
        | SymbolKind::Exe
        | SymbolKind::Compiland
        | SymbolKind::CompilandDetails
        | SymbolKind::CompilandEnv
        | SymbolKind::Function
        | SymbolKind::Block
        | SymbolKind::Data
        | SymbolKind::Annotation
        | SymbolKind::Label
        | SymbolKind::PublicSymbol
        | SymbolKind::Typedef
        | SymbolKind::BaseClass
        | SymbolKind::Friend
        | SymbolKind::FunctionArgType
        | SymbolKind::FuncDebugStart
        | SymbolKind::FuncDebugEnd
        | SymbolKind::UsingNamespace
        | SymbolKind::VTableShape
        | SymbolKind::VTable
        | SymbolKind::Custom
        | SymbolKind::Thunk
        | SymbolKind::CustomType
        | SymbolKind::ManagedType
        | SymbolKind::Dimension
        | SymbolKind::CallSite => declare_placeholder(ty, options),
    }
}

fn declare_base_type(ty: Node<'_>, options: &DeclarationOptions) -> Result<String>
{
    let mut tokens: SmallVec<[&str; 4]> = SmallVec::new();
    if ty.flag(Attribute::ConstType)? {
        tokens.push("const");
    }
    if ty.flag(Attribute::UnalignedType)? {
        tokens.push("__unaligned");
    }
    if ty.flag(Attribute::VolatileType)? {
        tokens.push("volatile");
    }
    tokens.push(basic_type_spelling(ty.basic_type()?, ty.length()?)?);

    let mut out = tokens.join(" ");
    attach_name(&mut out, options.name());
    Ok(out)
}

fn declare_pointer(ty: Node<'_>, options: &DeclarationOptions) -> Result<String>
{
    ty.expect_all_unset(&[Attribute::VolatileType, Attribute::UnalignedType])?;
    let pointee = ty.require(Relation::Type)?;

    let mut sigil = String::from(if ty.flag(Attribute::Reference)? { "&" } else { "*" });
    if ty.flag(Attribute::ConstType)? {
        sigil.push_str("const");
    }

    if pointee.kind() == SymbolKind::FunctionType {
        let class_name = match pointee.related(Relation::ClassParent)? {
            Some(class) => Some(class.name()?),
            None => None,
        };
        return function_pointer(pointee, class_name.as_deref(), &sigil, options);
    }

    let mut out = declare(pointee, &options.for_nested(None))?;
    if !out.ends_with(['*', '&']) {
        out.push(' ');
    }
    out.push_str(&sigil);
    attach_name(&mut out, options.name());
    Ok(out)
}

fn validate_array(ty: Node<'_>) -> Result<()>
{
    validate(ty)?;
    ty.expect_all_unset(&[
        Attribute::ConstType,
        Attribute::Rank,
        Attribute::UnalignedType,
        Attribute::VolatileType,
    ])?;
    let index = ty.require(Relation::ArrayIndexType)?;
    if index.kind() != SymbolKind::BaseType || !index.basic_type()?.is_integral() {
        return Err(DeclError::violation(
            ty.id(),
            ty.kind(),
            "arrayIndexType",
            format!("must be an integral BaseType, found {} {}", index.kind(), index.id()),
        ));
    }
    Ok(())
}

fn declare_array(ty: Node<'_>, options: &DeclarationOptions) -> Result<String>
{
    let mut dimensions: SmallVec<[u64; 4]> = SmallVec::new();
    let mut element = ty;
    while element.kind() == SymbolKind::ArrayType {
        expect_depth(element, "type", options.depth() + dimensions.len())?;
        validate_array(element)?;
        dimensions.push(element.uint(Attribute::Count)?);
        element = element.require(Relation::Type)?;
    }

    let mut out = declare(element, &options.for_nested(None))?;
    attach_name(&mut out, options.name());
    for count in dimensions {
        let _ = write!(out, "[{count}]");
    }
    Ok(out)
}

fn declare_placeholder(ty: Node<'_>, options: &DeclarationOptions) -> Result<String>
{
    warn!("No type declarator for {} symbol {}, emitting placeholder", ty.kind(), ty.id());
    let mut out = format!("<unmodeled {}>", ty.kind());
    for token in metadata(ty.source(), ty.id())? {
        out.push(' ');
        out.push_str(&token);
    }
    attach_name(&mut out, options.name());
    Ok(out)
}

/// Byte size of a type.
///
/// ## Errors
///
/// [`DeclError::Unmodeled`] for kinds that carry no size.
pub fn size_of(ty: Node<'_>) -> Result<u64>
{
    let mut current = ty;
    let mut depth = 0;
    loop {
        expect_depth(current, "type", depth)?;
        match current.kind() {
            SymbolKind::BaseType
            | SymbolKind::PointerType
            | SymbolKind::ArrayType
            | SymbolKind::Enum
            | SymbolKind::Udt => return current.length(),
            SymbolKind::Typedef => {
                current = current.require(Relation::Type)?;
                depth += 1;
            }
            other => return Err(DeclError::unmodeled(current.id(), other, "no size for this kind")),
        }
    }
}

/// Argument types of a function type, in order.
///
/// ## Errors
///
/// [`DeclError::SchemaViolation`] if a child is not a `FunctionArgType`.
pub fn params(function_type: Node<'_>) -> Result<Vec<Node<'_>>>
{
    function_type.expect_kind(&[SymbolKind::FunctionType])?;
    let children = function_type.children(&ChildFilter::all())?;
    for child in &children {
        if child.kind() != SymbolKind::FunctionArgType {
            return Err(DeclError::violation(
                function_type.id(),
                function_type.kind(),
                "children",
                format!("expected FunctionArgType, found {} {}", child.kind(), child.id()),
            ));
        }
    }
    Ok(children)
}

/// Whether the function type belongs to a `const` member function.
pub fn is_const_member(function_type: Node<'_>) -> Result<bool>
{
    let Some(object_pointer) = function_type.related(Relation::ObjectPointerType)? else {
        return Ok(false);
    };
    match object_pointer.related(Relation::Type)? {
        Some(object) => object.flag(Attribute::ConstType),
        None => Ok(false),
    }
}

/// Calling-convention keyword, or `None` when it is the default one and
/// rendering is not forced.
///
/// The default is `__thiscall` for member functions (those with an object
/// pointer type) and `__cdecl` otherwise.
fn calling_convention(function_type: Node<'_>, options: &DeclarationOptions) -> Result<Option<String>>
{
    let convention = function_type.calling_convention()?;
    let default = if function_type.related(Relation::ObjectPointerType)?.is_some() {
        CallingConvention::ThisCall
    } else {
        CallingConvention::NearC
    };
    if convention == default && !options.force_calling_convention() {
        return Ok(None);
    }
    Ok(Some(convention.spelling()))
}

/// Comma-separated parameter declarations, `void` when there are none.
///
/// Names from `options` are applied only when there is exactly one per
/// parameter; otherwise every parameter is anonymous.
fn param_list(function_type: Node<'_>, options: &DeclarationOptions) -> Result<String>
{
    let params = params(function_type)?;
    let names = options.param_names();
    let use_names = names.len() == params.len();
    if !use_names && !names.is_empty() {
        debug!(
            "Dropping {} parameter names for {} parameters of {}",
            names.len(),
            params.len(),
            function_type.id()
        );
    }

    let mut declarations = Vec::with_capacity(params.len());
    for (index, param) in params.iter().enumerate() {
        let name = if use_names {
            names.get(index).and_then(Option::as_deref)
        } else {
            None
        };
        declarations.push(declare(param.require(Relation::Type)?, &options.for_nested(name))?);
    }
    if declarations.is_empty() {
        return Ok("void".to_string());
    }
    Ok(declarations.join(", "))
}

fn validate_function_type(function_type: Node<'_>) -> Result<()>
{
    function_type.expect_kind(&[SymbolKind::FunctionType])?;
    validate(function_type)?;
    if let Some(class) = function_type.related(Relation::ClassParent)? {
        class.expect_kind(&[SymbolKind::Udt])?;
    }
    Ok(())
}

/// Declare a function type as a named free or member function signature:
/// `[ret] [cc] name(params)[ const]`.
///
/// ## Errors
///
/// [`DeclError::MissingAttribute`] when `options` carries no name.
pub fn declare_signature(function_type: Node<'_>, options: &DeclarationOptions) -> Result<String>
{
    validate_function_type(function_type)?;
    let name = options.name().ok_or(DeclError::MissingAttribute {
        symbol: function_type.id(),
        attribute: Attribute::Name,
    })?;

    let mut out = String::new();
    if options.show_return() {
        out = declare(function_type.require(Relation::Type)?, &options.for_nested(None))?;
    }
    if let Some(convention) = calling_convention(function_type, options)? {
        if !out.is_empty() && !out.ends_with(['*', '&']) {
            out.push(' ');
        }
        out.push_str(&convention);
    }
    let call = format!("{name}({})", param_list(function_type, options)?);
    attach_name(&mut out, Some(&call));
    if is_const_member(function_type)? {
        out.push_str(" const");
    }
    Ok(out)
}

/// Declare a function type as a member-function pointer:
/// `ret (cc Class::*name)(params)[ const]`.
///
/// The class comes from `options.class_name()`; without one the result is a
/// plain function pointer.
pub fn declare_function_pointer(function_type: Node<'_>, options: &DeclarationOptions) -> Result<String>
{
    function_pointer(function_type, options.class_name(), "*", options)
}

fn function_pointer(
    function_type: Node<'_>,
    class_name: Option<&str>,
    sigil: &str,
    options: &DeclarationOptions,
) -> Result<String>
{
    validate_function_type(function_type)?;

    let mut inner = String::new();
    if let Some(convention) = calling_convention(function_type, options)? {
        inner.push_str(&convention);
        inner.push(' ');
    }
    if let Some(class_name) = class_name {
        inner.push_str(class_name);
        inner.push_str("::");
    }
    inner.push_str(sigil);
    attach_name(&mut inner, options.name());

    let mut out = String::new();
    if options.show_return() {
        out = declare(function_type.require(Relation::Type)?, &options.for_nested(None))?;
        if !out.ends_with(['*', '&']) {
            out.push(' ');
        }
    }
    let _ = write!(out, "({inner})({})", param_list(function_type, options)?);
    if is_const_member(function_type)? {
        out.push_str(" const");
    }
    Ok(out)
}
