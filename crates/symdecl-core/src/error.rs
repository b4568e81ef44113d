//! # Error Types
//!
//! General error handling for declaration synthesis.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::spelling::{BasicType, DataKind, LocationType};
use crate::symbol::{Attribute, Relation, SymbolId, SymbolKind};

/// Main error type for symbol inspection and declaration synthesis
///
/// ## Error Categories
///
/// 1. **Schema errors**: SchemaViolation, UnsupportedKind, UnsupportedBasicType
/// 2. **Unmodeled shapes**: Unmodeled, UnmodeledDataShape, AmbiguousFunctionType
/// 3. **Graph errors**: UnknownSymbol, MissingRelation, MissingAttribute
/// 4. **Source errors**: Source, Io, Json
///
/// Unmodeled shapes are recoverable: a definer that hits one while rendering a
/// child emits a placeholder line and keeps going. See [`DeclError::is_unmodeled`].
/// A schema violation is fatal to the symbol it was found under; the UDT
/// definer prints it in place of that child and renders the siblings.
/// Graph and source errors abort the current render.
#[derive(Error, Debug)]
pub enum DeclError
{
    /// A symbol's attributes contradict what is assumed for its kind
    ///
    /// Examples:
    /// - A base class with a nonzero virtual displacement
    /// - A volatile pointer type
    /// - An enumerant that carries an address
    #[error("Schema violation on {kind} symbol {symbol}: {field} {detail}")]
    SchemaViolation
    {
        /// Offending symbol
        symbol: SymbolId,
        /// Kind of the offending symbol
        kind: SymbolKind,
        /// Attribute (or relation) that failed validation
        field: &'static str,
        /// What was expected
        detail: String,
    },

    /// No attribute schema is modeled for this symbol kind
    #[error("Unsupported symbol kind: {0}")]
    UnsupportedKind(SymbolKind),

    /// The (basic type, length) pair has no canonical spelling
    #[error("Unsupported basic type: ({base}, {length})")]
    UnsupportedBasicType
    {
        /// Basic type code
        base: BasicType,
        /// Byte width
        length: u64,
    },

    /// A kind/shape combination has no synthesis rule
    #[error("Unmodeled {kind} symbol {symbol}: {detail}")]
    Unmodeled
    {
        /// Offending symbol
        symbol: SymbolId,
        /// Kind of the offending symbol
        kind: SymbolKind,
        /// Which shape was not modeled
        detail: String,
    },

    /// A data symbol with a (data kind, location) pair outside the dispatch table
    #[error("Unmodeled data shape on symbol {symbol}: ({data_kind}, {location})")]
    UnmodeledDataShape
    {
        /// Offending symbol
        symbol: SymbolId,
        /// Data kind of the symbol
        data_kind: DataKind,
        /// Location type of the symbol
        location: LocationType,
    },

    /// A function type was passed to the generic type declarator
    ///
    /// A function type alone does not say whether it names a function or a
    /// function-pointer value. Use `declare_signature` or
    /// `declare_function_pointer` instead.
    #[error("Function type {0} must be declared as a signature or a function pointer")]
    AmbiguousFunctionType(SymbolId),

    /// No symbol with the given id exists in the source
    #[error("Unknown symbol id {0}")]
    UnknownSymbol(SymbolId),

    /// A required relation (type, classParent, ...) is absent
    #[error("Symbol {symbol} has no {relation} relation")]
    MissingRelation
    {
        /// Symbol being inspected
        symbol: SymbolId,
        /// Relation that was required
        relation: Relation,
    },

    /// A required attribute is not applicable to the symbol
    #[error("Symbol {symbol} has no {attribute} attribute")]
    MissingAttribute
    {
        /// Symbol being inspected
        symbol: SymbolId,
        /// Attribute that was required
        attribute: Attribute,
    },

    /// The symbol source failed to answer a query
    #[error("Symbol source error: {0}")]
    Source(String),

    /// I/O error while reading a symbol graph
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON symbol graph
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeclError
{
    /// Shorthand for a [`DeclError::SchemaViolation`].
    pub fn violation(symbol: SymbolId, kind: SymbolKind, field: &'static str, detail: impl Into<String>) -> Self
    {
        Self::SchemaViolation {
            symbol,
            kind,
            field,
            detail: detail.into(),
        }
    }

    /// Shorthand for a [`DeclError::Unmodeled`].
    pub fn unmodeled(symbol: SymbolId, kind: SymbolKind, detail: impl Into<String>) -> Self
    {
        Self::Unmodeled {
            symbol,
            kind,
            detail: detail.into(),
        }
    }

    /// Whether the error only means "no rule for this shape".
    ///
    /// Definers render these inline as placeholders so sibling symbols still
    /// produce output.
    #[must_use]
    pub fn is_unmodeled(&self) -> bool
    {
        matches!(
            self,
            Self::Unmodeled { .. }
                | Self::UnmodeledDataShape { .. }
                | Self::UnsupportedKind(_)
                | Self::UnsupportedBasicType { .. }
                | Self::AmbiguousFunctionType(_)
        )
    }
}

/// Convenience type alias for `Result<T, DeclError>`
///
/// ```rust
/// use symdecl_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, DeclError>;
