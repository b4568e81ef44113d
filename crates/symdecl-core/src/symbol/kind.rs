//! Symbol identifiers and kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable identifier of a symbol inside one symbol source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

impl From<u32> for SymbolId
{
    fn from(value: u32) -> Self
    {
        Self(value)
    }
}

impl fmt::Display for SymbolId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "#{}", self.0)
    }
}

/// Symbol tag: the role a debug-information symbol plays.
///
/// This is a closed set. Operations match on it exhaustively, so a kind
/// without a rule shows up as an explicit arm rather than a runtime miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind
{
    Null,
    Exe,
    Compiland,
    CompilandDetails,
    CompilandEnv,
    Function,
    Block,
    Data,
    Annotation,
    Label,
    PublicSymbol,
    Udt,
    Enum,
    FunctionType,
    PointerType,
    ArrayType,
    BaseType,
    Typedef,
    BaseClass,
    Friend,
    FunctionArgType,
    FuncDebugStart,
    FuncDebugEnd,
    UsingNamespace,
    VTableShape,
    VTable,
    Custom,
    Thunk,
    CustomType,
    ManagedType,
    Dimension,
    CallSite,
}

impl SymbolKind
{
    /// Every kind, in tag order.
    pub const ALL: [SymbolKind; 32] = [
        Self::Null,
        Self::Exe,
        Self::Compiland,
        Self::CompilandDetails,
        Self::CompilandEnv,
        Self::Function,
        Self::Block,
        Self::Data,
        Self::Annotation,
        Self::Label,
        Self::PublicSymbol,
        Self::Udt,
        Self::Enum,
        Self::FunctionType,
        Self::PointerType,
        Self::ArrayType,
        Self::BaseType,
        Self::Typedef,
        Self::BaseClass,
        Self::Friend,
        Self::FunctionArgType,
        Self::FuncDebugStart,
        Self::FuncDebugEnd,
        Self::UsingNamespace,
        Self::VTableShape,
        Self::VTable,
        Self::Custom,
        Self::Thunk,
        Self::CustomType,
        Self::ManagedType,
        Self::Dimension,
        Self::CallSite,
    ];

    /// Decode a raw `symTag` value.
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self>
    {
        usize::try_from(raw).ok().and_then(|index| Self::ALL.get(index).copied())
    }

    /// Raw `symTag` value.
    #[must_use]
    pub fn raw(self) -> u32
    {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .and_then(|index| u32::try_from(index).ok())
            .unwrap_or(u32::MAX)
    }

    /// Short name, as used in symbol-graph files (`UDT`, `PointerType`, ...).
    #[must_use]
    pub fn name(self) -> &'static str
    {
        match self {
            Self::Null => "Null",
            Self::Exe => "Exe",
            Self::Compiland => "Compiland",
            Self::CompilandDetails => "CompilandDetails",
            Self::CompilandEnv => "CompilandEnv",
            Self::Function => "Function",
            Self::Block => "Block",
            Self::Data => "Data",
            Self::Annotation => "Annotation",
            Self::Label => "Label",
            Self::PublicSymbol => "PublicSymbol",
            Self::Udt => "UDT",
            Self::Enum => "Enum",
            Self::FunctionType => "FunctionType",
            Self::PointerType => "PointerType",
            Self::ArrayType => "ArrayType",
            Self::BaseType => "BaseType",
            Self::Typedef => "Typedef",
            Self::BaseClass => "BaseClass",
            Self::Friend => "Friend",
            Self::FunctionArgType => "FunctionArgType",
            Self::FuncDebugStart => "FuncDebugStart",
            Self::FuncDebugEnd => "FuncDebugEnd",
            Self::UsingNamespace => "UsingNamespace",
            Self::VTableShape => "VTableShape",
            Self::VTable => "VTable",
            Self::Custom => "Custom",
            Self::Thunk => "Thunk",
            Self::CustomType => "CustomType",
            Self::ManagedType => "ManagedType",
            Self::Dimension => "Dimension",
            Self::CallSite => "CallSite",
        }
    }

    /// Kinds the type declarator accepts.
    #[must_use]
    pub fn is_type(self) -> bool
    {
        matches!(
            self,
            Self::BaseType | Self::PointerType | Self::FunctionType | Self::Enum | Self::Udt | Self::ArrayType
        )
    }
}

impl fmt::Display for SymbolKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SymbolKind
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let bare = s.strip_prefix("SymTag").unwrap_or(s);
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(bare))
            .ok_or_else(|| format!("Unknown symbol kind: {s}"))
    }
}

/// A symbol handle: identity plus kind.
///
/// Handles carry no attributes. Everything else is fetched from the source on
/// demand, so holding a handle never keeps part of the graph alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol
{
    pub id: SymbolId,
    pub kind: SymbolKind,
}

impl Symbol
{
    #[must_use]
    pub fn new(id: SymbolId, kind: SymbolKind) -> Self
    {
        Self { id, kind }
    }
}
