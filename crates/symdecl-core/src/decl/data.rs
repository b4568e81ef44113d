//! Data declarator
//!
//! A data symbol's `(dataKind, locationType)` pair decides how it is spelled.
//! Only the five shapes in [`DataShape`] have rules; any other pair is
//! reported as [`DeclError::UnmodeledDataShape`] so the caller can print a
//! placeholder.

use tracing::trace;

use super::function::access_label;
use super::options::DeclarationOptions;
use super::types;
use crate::describe::metadata;
use crate::error::{DeclError, Result};
use crate::spelling::{hex_value, DataKind, LocationType};
use crate::symbol::{Attribute, Node, Relation, SymbolKind};

/// The modeled `(dataKind, locationType)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataShape
{
    /// `(DataIsMember, LocIsThisRel)`: instance field
    Member,
    /// `(DataIsStaticMember, LocIsStatic)`: class static, declared in the class
    StaticMember,
    /// `(DataIsFileStatic, LocIsStatic)`: `static` at file scope
    FileStatic,
    /// `(DataIsConstant, LocIsConstant)`: folded constant
    Constant,
    /// `(DataIsGlobal, LocIsStatic)`: global with external linkage
    Global,
}

impl DataShape
{
    /// Classify a data symbol.
    ///
    /// ## Errors
    ///
    /// [`DeclError::UnmodeledDataShape`] naming the exact pair when it has no rule.
    pub fn classify(data: Node<'_>) -> Result<Self>
    {
        let data_kind = data.data_kind()?;
        let location = data.location_type()?;
        match (data_kind, location) {
            (DataKind::Member, LocationType::ThisRel) => Ok(Self::Member),
            (DataKind::StaticMember, LocationType::Static) => Ok(Self::StaticMember),
            (DataKind::FileStatic, LocationType::Static) => Ok(Self::FileStatic),
            (DataKind::Constant, LocationType::Constant) => Ok(Self::Constant),
            (DataKind::Global, LocationType::Static) => Ok(Self::Global),
            _ => Err(DeclError::UnmodeledDataShape {
                symbol: data.id(),
                data_kind,
                location,
            }),
        }
    }

    /// Members are spelled with their unqualified name.
    fn uses_simple_name(self) -> bool
    {
        matches!(self, Self::Member | Self::StaticMember)
    }
}

fn validate(data: Node<'_>) -> Result<()>
{
    data.expect_kind(&[SymbolKind::Data])?;
    data.expect_global_scope()
}

/// `T name` for the data symbol, named per its shape.
fn typed_name(data: Node<'_>, shape: DataShape, options: &DeclarationOptions) -> Result<String>
{
    let name = if shape.uses_simple_name() {
        data.simple_name()?
    } else {
        data.name()?
    };
    types::declare(data.require(Relation::Type)?, &options.for_nested(Some(&name)))
}

fn metadata_comment(data: Node<'_>) -> Result<String>
{
    let own = metadata(data.source(), data.id())?;
    let ty = data.require(Relation::Type)?;
    let of_type = metadata(ty.source(), ty.id())?;
    Ok(format!(" // {} // {}", own.join(" "), of_type.join(" ")))
}

fn address_tokens(data: Node<'_>) -> Result<Vec<String>>
{
    Ok(vec![
        format!("<va={}>", hex_value(data.int(Attribute::VirtualAddress)?, 8)),
        format!("<rva={}>", hex_value(data.int(Attribute::RelativeVirtualAddress)?, 8)),
        format!("<section={}>", hex_value(data.int(Attribute::AddressSection)?, 4)),
        format!("<offset={}>", hex_value(data.int(Attribute::AddressOffset)?, 8)),
    ])
}

fn constant_line(data: Node<'_>, options: &DeclarationOptions) -> Result<String>
{
    let value = data.int(Attribute::Value)?;
    let ty = data.require(Relation::Type)?;
    let hex = hex_value(value, types::size_of(ty)?);
    Ok(format!(
        "{} = {value}; // {hex} <constant> <maybe-static>",
        typed_name(data, DataShape::Constant, options)?
    ))
}

/// One declaration line for the data symbol, as it appears in a class body or
/// a header.
///
/// | shape | line |
/// |---|---|
/// | Member | `/* this+N */ access: T name;` |
/// | StaticMember | `access: static T name;` |
/// | FileStatic | `static T name;` |
/// | Constant | `T name = v;` |
/// | Global | `extern T name;` |
pub fn declare_member(data: Node<'_>, options: &DeclarationOptions) -> Result<String>
{
    validate(data)?;
    let shape = DataShape::classify(data)?;
    trace!("declare {shape:?} data {}", data.id());

    let mut parts = Vec::new();
    if shape == DataShape::Member {
        parts.push(format!("/* this+{} */", data.int(Attribute::Offset)?));
    }
    if shape.uses_simple_name() {
        if let Some(access) = access_label(data)? {
            parts.push(access);
        }
    }
    match shape {
        DataShape::StaticMember | DataShape::FileStatic => parts.push("static".to_string()),
        DataShape::Global => parts.push("extern".to_string()),
        DataShape::Member | DataShape::Constant => {}
    }
    let mut declaration = typed_name(data, shape, options)?;
    if shape == DataShape::Constant {
        declaration.push_str(&format!(" = {}", data.int(Attribute::Value)?));
    }
    declaration.push(';');
    parts.push(declaration);

    let mut line = parts.join(" ");
    if options.metadata_comments() {
        line.push_str(&metadata_comment(data)?);
    }
    Ok(line)
}

/// Definition lines for the data symbol, as they appear in a source file.
///
/// Members define as their declaration line. Statics and globals carry their
/// address as a comment; a global also gets its `extern` header line first.
///
/// ## Errors
///
/// [`DeclError::UnmodeledDataShape`] for pairs outside [`DataShape`], and
/// [`DeclError::Unmodeled`] when a constant's type has no size.
pub fn define_lines(data: Node<'_>, options: &DeclarationOptions) -> Result<Vec<String>>
{
    validate(data)?;
    let shape = DataShape::classify(data)?;
    let lines = match shape {
        DataShape::Member | DataShape::StaticMember => vec![declare_member(data, options)?],
        DataShape::Constant => vec![constant_line(data, options)?],
        DataShape::FileStatic => vec![format!(
            "static {}; // {}",
            typed_name(data, shape, options)?,
            address_tokens(data)?.join(" ")
        )],
        DataShape::Global => {
            let mut comments = address_tokens(data)?;
            comments.push("<normal-or-extern-or-member-static>".to_string());
            vec![
                declare_member(data, options)?,
                format!("{}; // {}", typed_name(data, shape, options)?, comments.join(" ")),
            ]
        }
    };
    Ok(lines)
}
