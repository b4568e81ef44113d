//! Virtual table resolver
//!
//! Walks a class and its base classes breadth-first and collects every
//! introducing virtual function by its `virtualBaseOffset`. The most derived
//! class is visited first, so when two classes introduce a function at the
//! same offset the derived one wins.
//!
//! Only single, non-virtual inheritance chains are modeled.

use std::collections::{BTreeMap, HashSet, VecDeque};

use tracing::{debug, trace, warn};

use super::options::DeclarationOptions;
use crate::describe::metadata;
use crate::error::{DeclError, Result};
use crate::spelling::UdtKind;
use crate::symbol::{Attribute, ChildFilter, Node, Relation, SymbolId, SymbolKind};

/// One resolved vtable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VTableSlot
{
    /// Byte offset inside the vtable
    pub offset: u64,
    /// Function occupying the slot
    pub function: SymbolId,
}

const VIRTUAL_BASE_FIELDS: &[Attribute] = &[
    Attribute::VirtualBaseClass,
    Attribute::VirtualBaseDispIndex,
    Attribute::VirtualBasePointerOffset,
];

/// Resolve the vtable of `udt`, ascending by offset.
///
/// Resolving twice yields the same slots.
///
/// ## Errors
///
/// - [`DeclError::SchemaViolation`] when a visited class or base class is a
///   virtual base
/// - [`DeclError::Unmodeled`] when a visited class has more than one base
pub fn resolve_slots(udt: Node<'_>) -> Result<Vec<VTableSlot>>
{
    udt.expect_kind(&[SymbolKind::Udt])?;

    let mut slots = BTreeMap::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([udt]);
    while let Some(class) = queue.pop_front() {
        if !visited.insert(class.id()) {
            continue;
        }
        trace!("vtable walk visits {} {}", class.kind(), class.id());
        class.expect_all_unset(VIRTUAL_BASE_FIELDS)?;

        let bases = class.children(&ChildFilter::of_kind(SymbolKind::BaseClass))?;
        if bases.len() > 1 {
            return Err(DeclError::unmodeled(
                class.id(),
                class.kind(),
                format!("multiple inheritance ({} base classes)", bases.len()),
            ));
        }
        for base in bases {
            base.expect_all_unset(VIRTUAL_BASE_FIELDS)?;
            queue.push_back(base.require(Relation::Type)?);
        }

        for function in class.children(&ChildFilter::of_kind(SymbolKind::Function))? {
            if !function.flag(Attribute::Virtual)? || !function.flag(Attribute::Intro)? {
                continue;
            }
            let offset = function.uint(Attribute::VirtualBaseOffset)?;
            if let Some(existing) = slots.get(&offset) {
                debug!("vtable+{offset} already taken by {existing}, skipping {}", function.id());
                continue;
            }
            slots.insert(offset, function.id());
        }
    }

    Ok(slots
        .into_iter()
        .map(|(offset, function)| VTableSlot { offset, function })
        .collect())
}

fn validate_owner(udt: Node<'_>) -> Result<()>
{
    udt.expect_kind(&[SymbolKind::Udt])?;
    let kind = udt.udt_kind()?;
    if !matches!(kind, UdtKind::Struct | UdtKind::Class) {
        return Err(DeclError::violation(
            udt.id(),
            udt.kind(),
            "udtKind",
            format!("a vtable needs a struct or class, found {}", kind.spelling()),
        ));
    }
    udt.expect_all_unset(&[Attribute::ConstType, Attribute::UnalignedType, Attribute::VolatileType])?;
    udt.expect_global_scope()
}

/// `struct vtable_t` definition listing each slot of `udt`'s vtable.
///
/// ```text
/// struct vtable_t // const CNpc::`vftable'
/// {
///     /* vtable+0/0x0 */ CNpc::Think // public: virtual void __thiscall CNpc::Think(void)
/// };
/// ```
pub fn define_lines(udt: Node<'_>, options: &DeclarationOptions) -> Result<Vec<String>>
{
    validate_owner(udt)?;
    let slots = resolve_slots(udt)?;

    let mut header = format!("struct vtable_t // const {}::`vftable'", udt.name()?);
    if options.metadata_comments() {
        header.push_str(" // ");
        header.push_str(&metadata(udt.source(), udt.id())?.join(" "));
    }

    let mut lines = Vec::with_capacity(slots.len() + 3);
    lines.push(header);
    lines.push("{".to_string());
    for slot in slots {
        let function = Node::fetch(udt.source(), slot.function)?;
        let class_name = function.require(Relation::ClassParent)?.name()?;
        let mut line = format!(
            "\t/* vtable+{offset}/0x{offset:X} */ {class_name}::{}",
            function.simple_name()?,
            offset = slot.offset
        );
        if let Some(undecorated) = function.undecorated_name()? {
            line.push_str(" // ");
            line.push_str(&undecorated);
        }
        lines.push(line);
    }
    lines.push("};".to_string());
    Ok(lines)
}

/// Define the vtable a `VTable` child symbol stands for.
///
/// The symbol must point (through a pointer type) at a `VTableShape`. A shape
/// whose slot count disagrees with the resolved vtable is only logged.
pub fn define_vtable_symbol_lines(
    vtable: Node<'_>,
    owner: Node<'_>,
    options: &DeclarationOptions,
) -> Result<Vec<String>>
{
    vtable.expect_kind(&[SymbolKind::VTable])?;
    vtable.expect_all_unset(&[Attribute::ConstType, Attribute::UnalignedType, Attribute::VolatileType])?;
    vtable.expect_global_scope()?;

    let pointer = vtable.require(Relation::Type)?;
    pointer.expect_kind(&[SymbolKind::PointerType])?;
    let shape = pointer.require(Relation::Type)?;
    shape.expect_kind(&[SymbolKind::VTableShape])?;

    let slots = resolve_slots(owner)?;
    let expected = shape.uint(Attribute::Count)?;
    if usize::try_from(expected).ok() != Some(slots.len()) {
        warn!(
            "VTable shape {} declares {expected} slots, resolved {} for {}",
            shape.id(),
            slots.len(),
            owner.id()
        );
    }
    define_lines(owner, options)
}
