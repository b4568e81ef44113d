//! # symdecl-core
//!
//! Symbol model and declaration synthesis for compiler debug information.
//!
//! This crate rebuilds C/C++ declarations from a DIA/PDB-style symbol graph:
//! - Type declarators (`const int`, `int *const`, `char name[16]`)
//! - Struct, class and union definitions with members and hook stubs
//! - Enum definitions in hex or decimal
//! - Virtual tables resolved across single-inheritance chains
//! - Function and data declarations
//!
//! ## Symbol sources
//!
//! The engine never owns symbols. It reads them through the
//! [`symbol::SymbolSource`] trait by id; [`symbol::SymbolArena`] is the
//! in-memory source, buildable in code or loaded from a JSON dump.
//!
//! ## Unmodeled shapes
//!
//! Debug information is messier than any fixed rule set. Shapes without a
//! rule surface as recoverable errors (see [`DeclError::is_unmodeled`]) and
//! definers print them inline as `// unmodeled ...` lines instead of failing
//! the whole definition.

pub mod decl;
pub mod describe;
pub mod error;
pub mod schema;
pub mod spelling;
pub mod symbol;

pub use decl::{DeclarationOptions, EnumRadix};
// Re-export commonly used types
pub use error::{DeclError, Result};
pub use symbol::{Node, SymbolArena, SymbolId, SymbolKind, SymbolSource};
