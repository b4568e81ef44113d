//! Symbol model
//!
//! A debug-information symbol graph is a set of symbols, each with a kind, a
//! bag of attributes, ordered children and named relations to other symbols.
//! Everything is read through the [`SymbolSource`] trait; [`SymbolArena`] is
//! the in-memory implementation.

pub mod arena;
pub mod attribute;
pub mod kind;
pub mod source;

pub use arena::{SymbolArena, SymbolBuilder};
pub use attribute::{Attribute, Relation, Value};
pub use kind::{Symbol, SymbolId, SymbolKind};
pub use source::{ChildFilter, NameMatch, Node, SymbolSource};
