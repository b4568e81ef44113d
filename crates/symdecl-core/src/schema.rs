//! Symbol schema registry
//!
//! For each modeled symbol kind, the fixed ordered list of attributes that are
//! meaningful for it. Diagnostics (`describe`) walk these lists; the
//! declarators only read attributes that appear in the list of the kind they
//! are rendering.

use crate::error::{DeclError, Result};
use crate::symbol::{Attribute, SymbolKind};

use crate::symbol::Attribute as A;

const FUNCTION: &[Attribute] = &[
    A::Access,
    A::AddressOffset,
    A::AddressSection,
    A::ClassParent,
    A::ClassParentId,
    A::ConstType,
    A::CustomCallingConvention,
    A::FarReturn,
    A::HasAlloca,
    A::HasEH,
    A::HasEHa,
    A::HasInlAsm,
    A::HasLongJump,
    A::HasSecurityChecks,
    A::HasSEH,
    A::HasSetJump,
    A::InterruptReturn,
    A::Intro,
    A::InlSpec,
    A::IsNaked,
    A::IsStatic,
    A::Length,
    A::LexicalParent,
    A::LexicalParentId,
    A::LocationType,
    A::Name,
    A::NoInline,
    A::NotReached,
    A::NoReturn,
    A::NoStackOrdering,
    A::OptimizedCodeDebugInfo,
    A::Pure,
    A::RelativeVirtualAddress,
    A::SymIndexId,
    A::SymTag,
    A::Token,
    A::Type,
    A::TypeId,
    A::UnalignedType,
    A::UndecoratedName,
    A::Virtual,
    A::VirtualAddress,
    A::VirtualBaseOffset,
    A::VolatileType,
];

const FUNCTION_TYPE: &[Attribute] = &[
    A::CallingConvention,
    A::ClassParent,
    A::ClassParentId,
    A::ConstType,
    A::Count,
    A::LexicalParent,
    A::LexicalParentId,
    A::ObjectPointerType,
    A::SymIndexId,
    A::SymTag,
    A::ThisAdjust,
    A::Type,
    A::TypeId,
    A::UnalignedType,
    A::VolatileType,
];

const FUNC_DEBUG_START: &[Attribute] = &[
    A::AddressOffset,
    A::AddressSection,
    A::CustomCallingConvention,
    A::FarReturn,
    A::IsStatic,
    A::LexicalParent,
    A::LexicalParentId,
    A::LocationType,
    A::NoInline,
    A::NoReturn,
    A::NotReached,
    A::Offset,
    A::OptimizedCodeDebugInfo,
    A::RelativeVirtualAddress,
    A::SymIndexId,
    A::SymTag,
    A::VirtualAddress,
];

const FUNC_DEBUG_END: &[Attribute] = &[
    A::AddressOffset,
    A::AddressSection,
    A::CustomCallingConvention,
    A::FarReturn,
    A::InterruptReturn,
    A::IsStatic,
    A::LexicalParent,
    A::LexicalParentId,
    A::LocationType,
    A::NoInline,
    A::NoReturn,
    A::NotReached,
    A::Offset,
    A::OptimizedCodeDebugInfo,
    A::SymIndexId,
    A::RelativeVirtualAddress,
    A::SymTag,
    A::VirtualAddress,
];

const DATA: &[Attribute] = &[
    A::Access,
    A::AddressOffset,
    A::AddressSection,
    A::AddressTaken,
    A::BitPosition,
    A::ClassParent,
    A::ClassParentId,
    A::CompilerGenerated,
    A::ConstType,
    A::DataKind,
    A::IsAggregated,
    A::IsSplitted,
    A::Length,
    A::LexicalParent,
    A::LexicalParentId,
    A::LocationType,
    A::Name,
    A::Offset,
    A::RegisterId,
    A::RelativeVirtualAddress,
    A::Slot,
    A::SymIndexId,
    A::SymTag,
    A::Token,
    A::Type,
    A::TypeId,
    A::UnalignedType,
    A::Value,
    A::VirtualAddress,
    A::VolatileType,
];

const BASE_TYPE: &[Attribute] = &[
    A::BaseType,
    A::ConstType,
    A::Length,
    A::LexicalParent,
    A::LexicalParentId,
    A::SymIndexId,
    A::SymTag,
    A::UnalignedType,
    A::VolatileType,
];

const FUNCTION_ARG_TYPE: &[Attribute] = &[
    A::ClassParent,
    A::ClassParentId,
    A::LexicalParent,
    A::LexicalParentId,
    A::SymIndexId,
    A::SymTag,
    A::Type,
    A::TypeId,
];

const UDT: &[Attribute] = &[
    A::ClassParent,
    A::ClassParentId,
    A::Constructor,
    A::ConstType,
    A::HasAssignmentOperator,
    A::HasCastOperator,
    A::HasNestedTypes,
    A::Length,
    A::LexicalParent,
    A::LexicalParentId,
    A::Name,
    A::Nested,
    A::OverloadedOperator,
    A::Packed,
    A::Scoped,
    A::SymIndexId,
    A::SymTag,
    A::UdtKind,
    A::UnalignedType,
    A::VirtualTableShape,
    A::VirtualTableShapeId,
    A::VolatileType,
];

const VTABLE: &[Attribute] = &[
    A::ClassParent,
    A::ClassParentId,
    A::ConstType,
    A::LexicalParent,
    A::LexicalParentId,
    A::SymIndexId,
    A::SymTag,
    A::Type,
    A::TypeId,
    A::UnalignedType,
    A::VolatileType,
];

const POINTER_TYPE: &[Attribute] = &[
    A::ConstType,
    A::Length,
    A::LexicalParent,
    A::LexicalParentId,
    A::Reference,
    A::SymIndexId,
    A::SymTag,
    A::Type,
    A::TypeId,
    A::UnalignedType,
    A::VolatileType,
];

const VTABLE_SHAPE: &[Attribute] = &[
    A::ConstType,
    A::Count,
    A::LexicalParent,
    A::LexicalParentId,
    A::SymIndexId,
    A::SymTag,
    A::UnalignedType,
    A::VolatileType,
];

const TYPEDEF: &[Attribute] = &[
    A::BaseType,
    A::ClassParent,
    A::ClassParentId,
    A::Constructor,
    A::ConstType,
    A::HasAssignmentOperator,
    A::HasCastOperator,
    A::HasNestedTypes,
    A::Length,
    A::LexicalParent,
    A::LexicalParentId,
    A::Name,
    A::Nested,
    A::OverloadedOperator,
    A::Packed,
    A::Reference,
    A::Scoped,
    A::SymIndexId,
    A::SymTag,
    A::Type,
    A::TypeId,
    A::UdtKind,
    A::UnalignedType,
    A::VirtualTableShape,
    A::VirtualTableShapeId,
    A::VolatileType,
];

const BASE_CLASS: &[Attribute] = &[
    A::Access,
    A::ClassParent,
    A::ClassParentId,
    A::Constructor,
    A::ConstType,
    A::HasAssignmentOperator,
    A::HasCastOperator,
    A::HasNestedTypes,
    A::IndirectVirtualBaseClass,
    A::Length,
    A::LexicalParent,
    A::LexicalParentId,
    A::Name,
    A::Nested,
    A::Offset,
    A::OverloadedOperator,
    A::Packed,
    A::Scoped,
    A::SymIndexId,
    A::SymTag,
    A::Type,
    A::TypeId,
    A::UdtKind,
    A::UnalignedType,
    A::VirtualBaseClass,
    A::VirtualBaseDispIndex,
    A::VirtualBasePointerOffset,
    A::VirtualBaseTableType,
    A::VirtualTableShape,
    A::VirtualTableShapeId,
    A::VolatileType,
];

const ARRAY_TYPE: &[Attribute] = &[
    A::ArrayIndexType,
    A::ArrayIndexTypeId,
    A::ConstType,
    A::Count,
    A::Length,
    A::LexicalParent,
    A::LexicalParentId,
    A::Rank,
    A::SymIndexId,
    A::SymTag,
    A::Type,
    A::TypeId,
    A::UnalignedType,
    A::VolatileType,
];

const ENUM: &[Attribute] = &[
    A::BaseType,
    A::ClassParent,
    A::ClassParentId,
    A::Constructor,
    A::ConstType,
    A::HasAssignmentOperator,
    A::HasCastOperator,
    A::HasNestedTypes,
    A::Length,
    A::LexicalParent,
    A::LexicalParentId,
    A::Name,
    A::Nested,
    A::OverloadedOperator,
    A::Packed,
    A::Scoped,
    A::SymIndexId,
    A::SymTag,
    A::Type,
    A::TypeId,
    A::UnalignedType,
    A::VolatileType,
];

const COMPILAND: &[Attribute] = &[
    A::BackEndBuild,
    A::BackEndMajor,
    A::BackEndMinor,
    A::CompilerName,
    A::EditAndContinueEnabled,
    A::FrontEndBuild,
    A::FrontEndMajor,
    A::FrontEndMinor,
    A::HasDebugInfo,
    A::HasManagedCode,
    A::HasSecurityChecks,
    A::IsCVTCIL,
    A::IsDataAligned,
    A::IsHotpatchable,
    A::IsLTCG,
    A::IsMSILNetmodule,
    A::Language,
    A::LexicalParent,
    A::LexicalParentId,
    A::Platform,
    A::SymIndexId,
    A::SymTag,
];

const EXE: &[Attribute] = &[
    A::Age,
    A::Guid,
    A::IsCTypes,
    A::IsStripped,
    A::MachineType,
    A::Name,
    A::Signature,
    A::SymbolsFileName,
    A::SymIndexId,
    A::SymTag,
];

/// Ordered attribute list of a symbol kind.
///
/// `Null` (and `CallSite`, for which no narrower list is known) yield every
/// attribute.
///
/// ## Errors
///
/// [`DeclError::UnsupportedKind`] for kinds without a modeled schema.
pub fn attributes_for(kind: SymbolKind) -> Result<&'static [Attribute]>
{
    let attributes = match kind {
        SymbolKind::Null | SymbolKind::CallSite => Attribute::ALL,
        SymbolKind::Exe => EXE,
        SymbolKind::Compiland => COMPILAND,
        SymbolKind::Function => FUNCTION,
        SymbolKind::FunctionType => FUNCTION_TYPE,
        SymbolKind::FuncDebugStart => FUNC_DEBUG_START,
        SymbolKind::FuncDebugEnd => FUNC_DEBUG_END,
        SymbolKind::Data => DATA,
        SymbolKind::BaseType => BASE_TYPE,
        SymbolKind::FunctionArgType => FUNCTION_ARG_TYPE,
        SymbolKind::Udt => UDT,
        SymbolKind::VTable => VTABLE,
        SymbolKind::PointerType => POINTER_TYPE,
        SymbolKind::VTableShape => VTABLE_SHAPE,
        SymbolKind::Typedef => TYPEDEF,
        SymbolKind::BaseClass => BASE_CLASS,
        SymbolKind::ArrayType => ARRAY_TYPE,
        SymbolKind::Enum => ENUM,
        SymbolKind::CompilandDetails
        | SymbolKind::CompilandEnv
        | SymbolKind::Block
        | SymbolKind::Annotation
        | SymbolKind::Label
        | SymbolKind::PublicSymbol
        | SymbolKind::Friend
        | SymbolKind::UsingNamespace
        | SymbolKind::Custom
        | SymbolKind::Thunk
        | SymbolKind::CustomType
        | SymbolKind::ManagedType
        | SymbolKind::Dimension => return Err(DeclError::UnsupportedKind(kind)),
    };
    Ok(attributes)
}

/// Whether `attribute` is part of `kind`'s schema. Unmodeled kinds answer `false`.
#[must_use]
pub fn is_applicable(kind: SymbolKind, attribute: Attribute) -> bool
{
    attributes_for(kind).is_ok_and(|attributes| attributes.contains(&attribute))
}

#[cfg(test)]
mod tests
{
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_schema_lists_have_no_duplicates()
    {
        for kind in SymbolKind::ALL {
            if let Ok(attributes) = attributes_for(kind) {
                let unique: HashSet<_> = attributes.iter().collect();
                assert_eq!(unique.len(), attributes.len(), "{kind}");
            }
        }
    }

    #[test]
    fn test_every_schema_carries_identity()
    {
        for kind in SymbolKind::ALL {
            if attributes_for(kind).is_ok() {
                assert!(is_applicable(kind, Attribute::SymIndexId), "{kind}");
                assert!(is_applicable(kind, Attribute::SymTag), "{kind}");
            }
        }
    }

    #[test]
    fn test_call_site_uses_full_list()
    {
        assert_eq!(attributes_for(SymbolKind::CallSite).unwrap().len(), Attribute::ALL.len());
        assert_eq!(attributes_for(SymbolKind::BaseType).unwrap().len(), 9);
    }

    #[test]
    fn test_unmodeled_kind()
    {
        assert!(matches!(
            attributes_for(SymbolKind::Thunk),
            Err(DeclError::UnsupportedKind(SymbolKind::Thunk))
        ));
        assert!(!is_applicable(SymbolKind::Thunk, Attribute::Name));
        assert!(is_applicable(SymbolKind::Data, Attribute::Value));
        assert!(!is_applicable(SymbolKind::BaseType, Attribute::Name));
    }
}
