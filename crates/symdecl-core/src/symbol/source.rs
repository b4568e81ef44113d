//! The symbol source seam and a typed view over it.
//!
//! A [`SymbolSource`] is whatever owns the debug-information session: a PDB
//! reader, a COM bridge, or the in-memory [`crate::symbol::SymbolArena`]. The
//! engine only ever asks it questions by id and never mutates it.
//!
//! [`Node`] pairs a source with one symbol handle and offers the typed reads
//! the declarators need (flags, numbers, decoded enums, relations). Attribute
//! reads that come back NotApplicable degrade to zero/false/empty, which is
//! what the SDK reports for attributes that do not apply.

use std::fmt;

use super::attribute::{Attribute, Relation, Value};
use super::kind::{Symbol, SymbolId, SymbolKind};
use crate::error::{DeclError, Result};
use crate::spelling::{Access, BasicType, CallingConvention, DataKind, LocationType, UdtKind};

/// How a child name filter compares names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMatch
{
    /// Byte-for-byte comparison
    #[default]
    Exact,
    /// ASCII case-insensitive comparison
    CaseInsensitive,
}

/// Filter for [`SymbolSource::children`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildFilter
{
    /// Only children of this kind (`None` = any kind)
    pub kind: Option<SymbolKind>,
    /// Only children with this name (`None` = any name)
    pub name: Option<String>,
    /// How `name` is compared
    pub name_match: NameMatch,
}

impl ChildFilter
{
    /// Every child.
    #[must_use]
    pub fn all() -> Self
    {
        Self::default()
    }

    /// Children of one kind.
    #[must_use]
    pub fn of_kind(kind: SymbolKind) -> Self
    {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Restrict to children with the given name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self
    {
        self.name = Some(name.into());
        self
    }

    /// Compare names ignoring ASCII case.
    #[must_use]
    pub fn case_insensitive(mut self) -> Self
    {
        self.name_match = NameMatch::CaseInsensitive;
        self
    }

    /// Whether a child with this kind and name passes the filter.
    #[must_use]
    pub fn accepts(&self, kind: SymbolKind, name: Option<&str>) -> bool
    {
        if self.kind.is_some_and(|wanted| wanted != kind) {
            return false;
        }
        match (&self.name, name) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(wanted), Some(actual)) => match self.name_match {
                NameMatch::Exact => wanted == actual,
                NameMatch::CaseInsensitive => wanted.eq_ignore_ascii_case(actual),
            },
        }
    }
}

/// Read-only access to a debug-information symbol graph.
///
/// Implementations answer by id; they may be slow (a COM call, a PDB stream
/// read), and the engine never caches answers between calls.
pub trait SymbolSource
{
    /// Fetch the handle of a symbol by id.
    ///
    /// ## Errors
    ///
    /// [`DeclError::UnknownSymbol`] if the id does not exist.
    fn symbol(&self, id: SymbolId) -> Result<Symbol>;

    /// Read one attribute. `Ok(None)` is the NotApplicable outcome.
    ///
    /// ## Errors
    ///
    /// Errors only when the source itself fails or the id is unknown.
    fn attribute(&self, id: SymbolId, attribute: Attribute) -> Result<Option<Value>>;

    /// Ordered children of a symbol that pass `filter`.
    ///
    /// ## Errors
    ///
    /// Errors only when the source itself fails or the id is unknown.
    fn children(&self, id: SymbolId, filter: &ChildFilter) -> Result<Vec<Symbol>>;

    /// Follow a named relation.
    ///
    /// The default implementation reads the relation's attribute and expects a
    /// [`Value::Symbol`]; anything else is treated as "no relation".
    ///
    /// ## Errors
    ///
    /// Errors when the attribute read fails or the target id is unknown.
    fn relation(&self, id: SymbolId, relation: Relation) -> Result<Option<Symbol>>
    {
        match self.attribute(id, relation.attribute())? {
            Some(Value::Symbol(target)) => self.symbol(target).map(Some),
            _ => Ok(None),
        }
    }
}

/// A symbol handle bound to the source it came from.
#[derive(Clone, Copy)]
pub struct Node<'a>
{
    source: &'a dyn SymbolSource,
    symbol: Symbol,
}

impl fmt::Debug for Node<'_>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Node").field("symbol", &self.symbol).finish()
    }
}

impl<'a> Node<'a>
{
    #[must_use]
    pub fn new(source: &'a dyn SymbolSource, symbol: Symbol) -> Self
    {
        Self { source, symbol }
    }

    /// Fetch `id` from `source` and bind it.
    ///
    /// ## Errors
    ///
    /// [`DeclError::UnknownSymbol`] if the id does not exist.
    pub fn fetch(source: &'a dyn SymbolSource, id: SymbolId) -> Result<Self>
    {
        Ok(Self::new(source, source.symbol(id)?))
    }

    #[must_use]
    pub fn id(&self) -> SymbolId
    {
        self.symbol.id
    }

    #[must_use]
    pub fn kind(&self) -> SymbolKind
    {
        self.symbol.kind
    }

    #[must_use]
    pub fn symbol(&self) -> Symbol
    {
        self.symbol
    }

    #[must_use]
    pub fn source(&self) -> &'a dyn SymbolSource
    {
        self.source
    }

    /// Raw attribute read (`None` = NotApplicable).
    pub fn attr(&self, attribute: Attribute) -> Result<Option<Value>>
    {
        self.source.attribute(self.symbol.id, attribute)
    }

    /// Boolean attribute; NotApplicable reads as `false`.
    pub fn flag(&self, attribute: Attribute) -> Result<bool>
    {
        Ok(self.attr(attribute)?.is_some_and(|value| value.is_set()))
    }

    /// Unsigned attribute; NotApplicable reads as `0`.
    pub fn uint(&self, attribute: Attribute) -> Result<u64>
    {
        Ok(self.attr(attribute)?.and_then(|value| value.as_u64()).unwrap_or(0))
    }

    /// Signed attribute; NotApplicable reads as `0`.
    pub fn int(&self, attribute: Attribute) -> Result<i64>
    {
        Ok(self.attr(attribute)?.and_then(|value| value.as_i64()).unwrap_or(0))
    }

    /// String attribute, if present and non-empty.
    pub fn text(&self, attribute: Attribute) -> Result<Option<String>>
    {
        Ok(self
            .attr(attribute)?
            .and_then(|value| value.as_str().map(str::to_string))
            .filter(|text| !text.is_empty()))
    }

    /// Full (possibly qualified) name; empty when absent.
    pub fn name(&self) -> Result<String>
    {
        Ok(self.text(Attribute::Name)?.unwrap_or_default())
    }

    /// Last `::` component of the name.
    pub fn simple_name(&self) -> Result<String>
    {
        let name = self.name()?;
        Ok(name.rsplit("::").next().unwrap_or_default().to_string())
    }

    pub fn undecorated_name(&self) -> Result<Option<String>>
    {
        self.text(Attribute::UndecoratedName)
    }

    pub fn length(&self) -> Result<u64>
    {
        self.uint(Attribute::Length)
    }

    pub fn basic_type(&self) -> Result<BasicType>
    {
        Ok(BasicType::from_raw(self.uint(Attribute::BaseType)?))
    }

    pub fn data_kind(&self) -> Result<DataKind>
    {
        Ok(DataKind::from_raw(self.uint(Attribute::DataKind)?))
    }

    pub fn location_type(&self) -> Result<LocationType>
    {
        Ok(LocationType::from_raw(self.uint(Attribute::LocationType)?))
    }

    pub fn access(&self) -> Result<Access>
    {
        Ok(Access::from_raw(self.uint(Attribute::Access)?))
    }

    pub fn udt_kind(&self) -> Result<UdtKind>
    {
        Ok(UdtKind::from_raw(self.uint(Attribute::UdtKind)?))
    }

    pub fn calling_convention(&self) -> Result<CallingConvention>
    {
        Ok(CallingConvention::from_raw(self.uint(Attribute::CallingConvention)?))
    }

    /// Follow a relation, if present.
    pub fn related(&self, relation: Relation) -> Result<Option<Node<'a>>>
    {
        Ok(self
            .source
            .relation(self.symbol.id, relation)?
            .map(|symbol| Node::new(self.source, symbol)))
    }

    /// Follow a relation that must be present.
    ///
    /// ## Errors
    ///
    /// [`DeclError::MissingRelation`] when it is absent.
    pub fn require(&self, relation: Relation) -> Result<Node<'a>>
    {
        self.related(relation)?.ok_or(DeclError::MissingRelation {
            symbol: self.symbol.id,
            relation,
        })
    }

    /// Ordered children passing `filter`.
    pub fn children(&self, filter: &ChildFilter) -> Result<Vec<Node<'a>>>
    {
        Ok(self
            .source
            .children(self.symbol.id, filter)?
            .into_iter()
            .map(|symbol| Node::new(self.source, symbol))
            .collect())
    }

    /// Fail with a schema violation unless `attribute` is zero/false/absent.
    pub fn expect_unset(&self, attribute: Attribute) -> Result<()>
    {
        match self.attr(attribute)? {
            Some(value) if value.is_set() => Err(DeclError::violation(
                self.id(),
                self.kind(),
                attribute.name(),
                format!("must be zero, found {value}"),
            )),
            _ => Ok(()),
        }
    }

    /// [`Node::expect_unset`] over several attributes, stopping at the first failure.
    pub fn expect_all_unset(&self, attributes: &[Attribute]) -> Result<()>
    {
        attributes.iter().try_for_each(|attribute| self.expect_unset(*attribute))
    }

    /// Fail with a schema violation unless this symbol is one of `kinds`.
    pub fn expect_kind(&self, kinds: &[SymbolKind]) -> Result<()>
    {
        if kinds.contains(&self.kind()) {
            return Ok(());
        }
        let expected = kinds.iter().map(|kind| kind.name()).collect::<Vec<_>>().join("|");
        Err(DeclError::violation(
            self.id(),
            self.kind(),
            "symTag",
            format!("expected {expected}"),
        ))
    }

    /// Fail unless the lexical parent, when present, is the global scope.
    ///
    /// Only global-scope (Exe-parented) symbols are modeled.
    pub fn expect_global_scope(&self) -> Result<()>
    {
        self.expect_lexical_parent(&[SymbolKind::Exe])
    }

    /// Fail unless the lexical parent, when present, is one of `kinds`.
    pub fn expect_lexical_parent(&self, kinds: &[SymbolKind]) -> Result<()>
    {
        match self.related(Relation::LexicalParent)? {
            Some(parent) if !kinds.contains(&parent.kind()) => Err(DeclError::violation(
                self.id(),
                self.kind(),
                "lexicalParent",
                format!("unexpected {} scope", parent.kind()),
            )),
            _ => Ok(()),
        }
    }
}
