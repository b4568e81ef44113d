//! Enum definer
//!
//! Enumerants are constant `Data` children of the enum. They have no storage,
//! so every address-like attribute must be zero.

use tracing::trace;

use super::options::{DeclarationOptions, EnumRadix};
use crate::describe::metadata;
use crate::error::{DeclError, Result};
use crate::spelling::{hex_value, DataKind, LocationType};
use crate::symbol::{Attribute, ChildFilter, Node, Relation, SymbolKind};

/// Attributes that must be zero/absent on an enumerant.
const ENUMERANT_UNSET: &[Attribute] = &[
    Attribute::Access,
    Attribute::AddressOffset,
    Attribute::AddressSection,
    Attribute::AddressTaken,
    Attribute::BitPosition,
    Attribute::CompilerGenerated,
    Attribute::ConstType,
    Attribute::IsAggregated,
    Attribute::IsSplitted,
    Attribute::Length,
    Attribute::Offset,
    Attribute::RegisterId,
    Attribute::RelativeVirtualAddress,
    Attribute::Slot,
    Attribute::Token,
    Attribute::UnalignedType,
    Attribute::VirtualAddress,
    Attribute::VolatileType,
];

fn validate(symbol: Node<'_>) -> Result<()>
{
    symbol.expect_kind(&[SymbolKind::Enum])?;
    symbol.expect_global_scope()
}

/// `[const ]enum Name`
pub fn declare(symbol: Node<'_>) -> Result<String>
{
    validate(symbol)?;
    let mut out = String::new();
    if symbol.flag(Attribute::ConstType)? {
        out.push_str("const ");
    }
    out.push_str("enum ");
    out.push_str(&symbol.name()?);
    Ok(out)
}

/// `[const ]enum Name;`
pub fn declare_line(symbol: Node<'_>) -> Result<String>
{
    Ok(format!("{};", declare(symbol)?))
}

/// Render one enumerant value in the requested radix.
fn enumerant_value(enumerant: Node<'_>, options: &DeclarationOptions) -> Result<String>
{
    enumerant.expect_kind(&[SymbolKind::Data])?;
    enumerant.expect_all_unset(ENUMERANT_UNSET)?;
    if enumerant.data_kind()? != DataKind::Constant {
        return Err(DeclError::violation(
            enumerant.id(),
            enumerant.kind(),
            "dataKind",
            format!("must be DataIsConstant, found {}", enumerant.data_kind()?),
        ));
    }
    if enumerant.location_type()? != LocationType::Constant {
        return Err(DeclError::violation(
            enumerant.id(),
            enumerant.kind(),
            "locationType",
            format!("must be LocIsConstant, found {}", enumerant.location_type()?),
        ));
    }
    if let Some(parent) = enumerant.related(Relation::ClassParent)? {
        if parent.kind() != SymbolKind::Enum {
            return Err(DeclError::violation(
                enumerant.id(),
                enumerant.kind(),
                "classParent",
                format!("must be an Enum, found {}", parent.kind()),
            ));
        }
    }
    enumerant.expect_global_scope()?;

    let ty = enumerant.require(Relation::Type)?;
    if ty.kind() != SymbolKind::BaseType || !ty.basic_type()?.is_integral() {
        return Err(DeclError::violation(
            enumerant.id(),
            enumerant.kind(),
            "type",
            format!("must be an integral BaseType, found {} {}", ty.kind(), ty.id()),
        ));
    }

    let value = enumerant.int(Attribute::Value)?;
    Ok(match options.enum_radix() {
        EnumRadix::Hex => hex_value(value, ty.length()?),
        EnumRadix::Decimal => value.to_string(),
    })
}

/// Full definition: header, `{`, one `\tName = value` line per enumerant in
/// source order (comma-separated, none after the last), `};`.
///
/// ## Errors
///
/// [`DeclError::SchemaViolation`] when any child is not a well-formed
/// enumerant.
pub fn define_lines(symbol: Node<'_>, options: &DeclarationOptions) -> Result<Vec<String>>
{
    trace!("define enum {}", symbol.id());
    let mut header = declare(symbol)?;
    if options.metadata_comments() {
        header.push_str(" // ");
        header.push_str(&metadata(symbol.source(), symbol.id())?.join(" "));
    }

    let enumerants = symbol.children(&ChildFilter::all())?;
    let mut lines = Vec::with_capacity(enumerants.len() + 3);
    lines.push(header);
    lines.push("{".to_string());
    for (index, enumerant) in enumerants.iter().enumerate() {
        let value = enumerant_value(*enumerant, options)?;
        let separator = if index + 1 < enumerants.len() { "," } else { "" };
        lines.push(format!("\t{} = {value}{separator}", enumerant.name()?));
    }
    lines.push("};".to_string());
    Ok(lines)
}
