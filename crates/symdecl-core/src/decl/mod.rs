//! Declaration synthesis
//!
//! One module per symbol family. Every entry point takes a [`Node`] (a symbol
//! bound to its source) plus [`DeclarationOptions`] and returns text: a single
//! declaration, or the lines of a definition without trailing newlines.
//!
//! ## Usage
//!
//! ```rust
//! use symdecl_core::decl::{self, DeclarationOptions};
//! use symdecl_core::symbol::{Attribute, Node, SymbolArena, SymbolKind};
//!
//! let mut arena = SymbolArena::new();
//! let int = arena
//!     .add(SymbolKind::BaseType)
//!     .unwrap()
//!     .with(Attribute::BaseType, 6u32)
//!     .with(Attribute::Length, 4u64)
//!     .id();
//! let node = Node::fetch(&arena, int).unwrap();
//! let options = DeclarationOptions::new().with_name("count");
//! assert_eq!(decl::types::declare(node, &options).unwrap(), "int count");
//! ```
//!
//! [`Node`]: crate::symbol::Node

pub mod data;
pub mod enums;
pub mod function;
pub mod options;
pub mod types;
pub mod udt;
pub mod vtable;

pub use data::DataShape;
pub use options::{DeclarationOptions, EnumRadix, MAX_NESTING_DEPTH};
pub use vtable::VTableSlot;
