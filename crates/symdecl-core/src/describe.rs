//! Attribute dumps for diagnostics.
//!
//! [`describe`] lists every schema attribute of a symbol, applicable or not,
//! and is what the CLI prints for `describe <id>`. [`metadata`] is the compact
//! form embedded in generated comments and placeholder lines.

use crate::error::Result;
use crate::schema::attributes_for;
use crate::spelling::{Access, BasicType, CallingConvention, DataKind, LocationType, UdtKind};
use crate::symbol::{Attribute, Node, Relation, SymbolId, SymbolKind, SymbolSource, Value};

/// Human-readable name for attributes that hold a code.
fn decoded(attribute: Attribute, value: &Value) -> Option<String>
{
    let raw = value.as_u64()?;
    let name = match attribute {
        Attribute::Access => Access::from_raw(raw).spelling(),
        Attribute::BaseType => BasicType::from_raw(raw).to_string(),
        Attribute::CallingConvention => CallingConvention::from_raw(raw).spelling(),
        Attribute::DataKind => DataKind::from_raw(raw).to_string(),
        Attribute::LocationType => LocationType::from_raw(raw).to_string(),
        Attribute::UdtKind => UdtKind::from_raw(raw).spelling(),
        Attribute::SymTag => SymbolKind::from_raw(raw)?.name().to_string(),
        _ => return None,
    };
    Some(name)
}

/// One `attribute = value` line per schema attribute of the symbol.
///
/// The first line names the symbol. Attributes the source reports as
/// NotApplicable read `<not applicable>`.
///
/// ## Errors
///
/// [`crate::DeclError::UnsupportedKind`] when the kind has no schema, and any
/// error from the source.
pub fn describe(source: &dyn SymbolSource, id: SymbolId) -> Result<Vec<String>>
{
    let node = Node::fetch(source, id)?;
    let attributes = attributes_for(node.kind())?;

    let mut lines = Vec::with_capacity(attributes.len() + 1);
    lines.push(format!("{} {}", node.kind(), node.id()));
    for attribute in attributes {
        let line = match node.attr(*attribute)? {
            None => format!("{attribute} = <not applicable>"),
            Some(value) => match decoded(*attribute, &value) {
                Some(name) => format!("{attribute} = {value} ({name})"),
                None => format!("{attribute} = {value}"),
            },
        };
        lines.push(line);
    }
    Ok(lines)
}

/// Compact `<attr=value>` / `<flag>` tokens for every truthy attribute.
///
/// Identity, relations and their `...Id` companions are left out; the tokens
/// describe the symbol itself, not its links.
pub fn metadata(source: &dyn SymbolSource, id: SymbolId) -> Result<Vec<String>>
{
    let node = Node::fetch(source, id)?;
    let attributes = attributes_for(node.kind()).unwrap_or(Attribute::ALL);

    let mut tokens = Vec::new();
    for attribute in attributes {
        if *attribute == Attribute::SymIndexId || Relation::from_attribute(*attribute).is_some() {
            continue;
        }
        let Some(value) = node.attr(*attribute)? else {
            continue;
        };
        if !value.is_set() || matches!(value, Value::Symbol(_)) {
            continue;
        }
        let token = match (&value, decoded(*attribute, &value)) {
            (_, Some(name)) => format!("<{attribute}={name}>"),
            (Value::Bool(_), None) => format!("<{attribute}>"),
            (_, None) => format!("<{attribute}={value}>"),
        };
        tokens.push(token);
    }
    Ok(tokens)
}
