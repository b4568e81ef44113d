//! Attribute names, attribute values and named relations.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;

use super::kind::SymbolId;

macro_rules! attributes {
    ($($variant:ident => $name:literal,)+) => {
        /// Every attribute a debug-information symbol can carry.
        ///
        /// Which of them are meaningful depends on the symbol kind; see
        /// [`crate::schema::attributes_for`].
        #[allow(clippy::upper_case_acronyms)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Attribute
        {
            $($variant,)+
        }

        impl Attribute
        {
            /// Every attribute, in the order the SDK lists them.
            pub const ALL: &'static [Attribute] = &[$(Self::$variant,)+];

            /// The camelCase name used by the debug-information SDK.
            #[must_use]
            pub fn name(self) -> &'static str
            {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

attributes! {
    Access => "access",
    AddressOffset => "addressOffset",
    AddressSection => "addressSection",
    AddressTaken => "addressTaken",
    Age => "age",
    ArrayIndexType => "arrayIndexType",
    ArrayIndexTypeId => "arrayIndexTypeId",
    BackEndBuild => "backEndBuild",
    BackEndMajor => "backEndMajor",
    BackEndMinor => "backEndMinor",
    BackEndQFE => "backEndQFE",
    BaseType => "baseType",
    BitPosition => "bitPosition",
    CallingConvention => "callingConvention",
    ClassParent => "classParent",
    ClassParentId => "classParentId",
    Code => "code",
    CompilerGenerated => "compilerGenerated",
    CompilerName => "compilerName",
    ConstType => "constType",
    Constructor => "constructor",
    Container => "container",
    Count => "count",
    CountLiveRanges => "countLiveRanges",
    CustomCallingConvention => "customCallingConvention",
    DataKind => "dataKind",
    EditAndContinueEnabled => "editAndContinueEnabled",
    FarReturn => "farReturn",
    FramePointerPresent => "framePointerPresent",
    FrontEndBuild => "frontEndBuild",
    FrontEndMajor => "frontEndMajor",
    FrontEndMinor => "frontEndMinor",
    FrontEndQFE => "frontEndQFE",
    Function => "function",
    Guid => "guid",
    HasAlloca => "hasAlloca",
    HasAssignmentOperator => "hasAssignmentOperator",
    HasCastOperator => "hasCastOperator",
    HasDebugInfo => "hasDebugInfo",
    HasEH => "hasEH",
    HasEHa => "hasEHa",
    HasInlAsm => "hasInlAsm",
    HasLongJump => "hasLongJump",
    HasManagedCode => "hasManagedCode",
    HasNestedTypes => "hasNestedTypes",
    HasSEH => "hasSEH",
    HasSecurityChecks => "hasSecurityChecks",
    HasSetJump => "hasSetJump",
    HfaDouble => "hfaDouble",
    HfaFloat => "hfaFloat",
    IndirectVirtualBaseClass => "indirectVirtualBaseClass",
    InlSpec => "inlSpec",
    InterruptReturn => "interruptReturn",
    Intrinsic => "intrinsic",
    Intro => "intro",
    IsAggregated => "isAggregated",
    IsCTypes => "isCTypes",
    IsCVTCIL => "isCVTCIL",
    IsConstructorVirtualBase => "isConstructorVirtualBase",
    IsCxxReturnUdt => "isCxxReturnUdt",
    IsDataAligned => "isDataAligned",
    IsHotpatchable => "isHotpatchable",
    IsLTCG => "isLTCG",
    IsMSILNetmodule => "isMSILNetmodule",
    IsNaked => "isNaked",
    IsSafeBuffers => "isSafeBuffers",
    IsSplitted => "isSplitted",
    IsStatic => "isStatic",
    IsStripped => "isStripped",
    Language => "language",
    Length => "length",
    LexicalParent => "lexicalParent",
    LexicalParentId => "lexicalParentId",
    LibraryName => "libraryName",
    LiveRangeLength => "liveRangeLength",
    LiveRangeStartAddressOffset => "liveRangeStartAddressOffset",
    LiveRangeStartAddressSection => "liveRangeStartAddressSection",
    LiveRangeStartRelativeVirtualAddress => "liveRangeStartRelativeVirtualAddress",
    LocalBasePointerRegisterId => "localBasePointerRegisterId",
    LocationType => "locationType",
    LowerBound => "lowerBound",
    LowerBoundId => "lowerBoundId",
    MachineType => "machineType",
    Managed => "managed",
    Msil => "msil",
    Name => "name",
    Nested => "nested",
    NoInline => "noInline",
    NoReturn => "noReturn",
    NoStackOrdering => "noStackOrdering",
    NotReached => "notReached",
    ObjectPointerType => "objectPointerType",
    OemId => "oemId",
    OemSymbolId => "oemSymbolId",
    Offset => "offset",
    OffsetInUdt => "offsetInUdt",
    OptimizedCodeDebugInfo => "optimizedCodeDebugInfo",
    OverloadedOperator => "overloadedOperator",
    Packed => "packed",
    ParamBasePointerRegisterId => "paramBasePointerRegisterId",
    Platform => "platform",
    Pure => "pure",
    Rank => "rank",
    Reference => "reference",
    RegisterId => "registerId",
    RelativeVirtualAddress => "relativeVirtualAddress",
    Scoped => "scoped",
    Sealed => "sealed",
    Signature => "signature",
    Slot => "slot",
    SourceFileName => "sourceFileName",
    StrictGSCheck => "strictGSCheck",
    SymIndexId => "symIndexId",
    SymTag => "symTag",
    SymbolsFileName => "symbolsFileName",
    TargetOffset => "targetOffset",
    TargetRelativeVirtualAddress => "targetRelativeVirtualAddress",
    TargetSection => "targetSection",
    TargetVirtualAddress => "targetVirtualAddress",
    ThisAdjust => "thisAdjust",
    ThunkOrdinal => "thunkOrdinal",
    TimeStamp => "timeStamp",
    Token => "token",
    Type => "type",
    TypeId => "typeId",
    UdtKind => "udtKind",
    UnalignedType => "unalignedType",
    UndecoratedName => "undecoratedName",
    UndecoratedNameEx => "undecoratedNameEx",
    UnmodifiedType => "unmodifiedType",
    Unused => "unused",
    UpperBound => "upperBound",
    UpperBoundId => "upperBoundId",
    Value => "value",
    Virtual => "virtual",
    VirtualAddress => "virtualAddress",
    VirtualBaseClass => "virtualBaseClass",
    VirtualBaseDispIndex => "virtualBaseDispIndex",
    VirtualBaseOffset => "virtualBaseOffset",
    VirtualBasePointerOffset => "virtualBasePointerOffset",
    VirtualBaseTableType => "virtualBaseTableType",
    VirtualTableShape => "virtualTableShape",
    VirtualTableShapeId => "virtualTableShapeId",
    VolatileType => "volatileType",
    WasInlined => "wasInlined",
}

static BY_NAME: Lazy<HashMap<&'static str, Attribute>> =
    Lazy::new(|| Attribute::ALL.iter().map(|attribute| (attribute.name(), *attribute)).collect());

impl fmt::Display for Attribute
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Attribute
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        BY_NAME.get(s).copied().ok_or_else(|| format!("Unknown attribute: {s}"))
    }
}

/// Raw attribute value as reported by a symbol source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value
{
    Bool(bool),
    Int(i64),
    UInt(u64),
    Str(String),
    Symbol(SymbolId),
}

impl Value
{
    /// Truthiness: nonzero numbers, `true`, non-empty strings and any reference.
    #[must_use]
    pub fn is_set(&self) -> bool
    {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::UInt(n) => *n != 0,
            Self::Str(s) => !s.is_empty(),
            Self::Symbol(_) => true,
        }
    }

    /// Unsigned view; negative numbers are reinterpreted bitwise.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64>
    {
        match self {
            Self::Bool(b) => Some(u64::from(*b)),
            #[allow(clippy::cast_sign_loss)]
            Self::Int(n) => Some(*n as u64),
            Self::UInt(n) => Some(*n),
            Self::Symbol(id) => Some(u64::from(id.0)),
            Self::Str(_) => None,
        }
    }

    /// Signed view; large unsigned numbers are reinterpreted bitwise.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64>
    {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(n) => Some(*n),
            #[allow(clippy::cast_possible_wrap)]
            Self::UInt(n) => Some(*n as i64),
            Self::Symbol(id) => Some(i64::from(id.0)),
            Self::Str(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str>
    {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_symbol(&self) -> Option<SymbolId>
    {
        match self {
            Self::Symbol(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Value
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::UInt(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Symbol(id) => write!(f, "{id}"),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident($conv:expr),)+) => {
        $(
            impl From<$ty> for Value
            {
                fn from(value: $ty) -> Self
                {
                    Self::$variant($conv(value))
                }
            }
        )+
    };
}

value_from! {
    bool => Bool(std::convert::identity),
    i32 => Int(i64::from),
    i64 => Int(std::convert::identity),
    u32 => UInt(u64::from),
    u64 => UInt(std::convert::identity),
    &str => Str(str::to_string),
    String => Str(std::convert::identity),
    SymbolId => Symbol(std::convert::identity),
}

/// Named links from one symbol to another.
///
/// Each relation is carried by the attribute of the same name holding a
/// [`Value::Symbol`]. Relations are lookups, not ownership: following one
/// never implies the target belongs to the source symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation
{
    Type,
    ClassParent,
    LexicalParent,
    ObjectPointerType,
    ArrayIndexType,
    VirtualTableShape,
    VirtualBaseTableType,
}

impl Relation
{
    /// Attribute that stores this relation.
    #[must_use]
    pub fn attribute(self) -> Attribute
    {
        match self {
            Self::Type => Attribute::Type,
            Self::ClassParent => Attribute::ClassParent,
            Self::LexicalParent => Attribute::LexicalParent,
            Self::ObjectPointerType => Attribute::ObjectPointerType,
            Self::ArrayIndexType => Attribute::ArrayIndexType,
            Self::VirtualTableShape => Attribute::VirtualTableShape,
            Self::VirtualBaseTableType => Attribute::VirtualBaseTableType,
        }
    }

    /// Companion `...Id` attribute, when the SDK exposes one.
    #[must_use]
    pub fn id_attribute(self) -> Option<Attribute>
    {
        match self {
            Self::Type => Some(Attribute::TypeId),
            Self::ClassParent => Some(Attribute::ClassParentId),
            Self::LexicalParent => Some(Attribute::LexicalParentId),
            Self::ArrayIndexType => Some(Attribute::ArrayIndexTypeId),
            Self::VirtualTableShape => Some(Attribute::VirtualTableShapeId),
            Self::ObjectPointerType | Self::VirtualBaseTableType => None,
        }
    }

    /// Relation backed by `attribute` (directly or through its `...Id` form).
    #[must_use]
    pub fn from_attribute(attribute: Attribute) -> Option<Self>
    {
        [
            Self::Type,
            Self::ClassParent,
            Self::LexicalParent,
            Self::ObjectPointerType,
            Self::ArrayIndexType,
            Self::VirtualTableShape,
            Self::VirtualBaseTableType,
        ]
        .into_iter()
        .find(|relation| relation.attribute() == attribute || relation.id_attribute() == Some(attribute))
    }
}

impl fmt::Display for Relation
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.attribute().name())
    }
}
