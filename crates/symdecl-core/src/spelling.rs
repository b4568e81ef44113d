//! Primitive spelling tables.
//!
//! Fixed lookup tables that turn raw debug-information codes (basic types,
//! calling conventions, access levels, UDT kinds) into source-level text, and
//! into diagnostic names for the codes that never reach the output directly
//! (location types and data kinds).
//!
//! The tables are total over the codes they know about. Codes outside a table
//! are preserved in an `Other` variant so diagnostics can still show them.

use std::fmt;

use crate::error::{DeclError, Result};

/// Basic (built-in) type code, `btXxx` in the debug-information SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType
{
    NoType,
    Void,
    Char,
    WChar,
    Int,
    UInt,
    Float,
    Bcd,
    Bool,
    Long,
    ULong,
    Currency,
    Date,
    Variant,
    Complex,
    Bit,
    Bstr,
    Hresult,
    Char16,
    Char32,
    Other(u32),
}

impl BasicType
{
    /// Decode a raw `baseType` attribute value.
    #[must_use]
    pub fn from_raw(raw: u64) -> Self
    {
        match raw {
            0 => Self::NoType,
            1 => Self::Void,
            2 => Self::Char,
            3 => Self::WChar,
            6 => Self::Int,
            7 => Self::UInt,
            8 => Self::Float,
            9 => Self::Bcd,
            10 => Self::Bool,
            13 => Self::Long,
            14 => Self::ULong,
            25 => Self::Currency,
            26 => Self::Date,
            27 => Self::Variant,
            28 => Self::Complex,
            29 => Self::Bit,
            30 => Self::Bstr,
            31 => Self::Hresult,
            32 => Self::Char16,
            33 => Self::Char32,
            other => Self::Other(u32::try_from(other).unwrap_or(u32::MAX)),
        }
    }

    /// Raw code of this basic type.
    #[must_use]
    pub fn raw(self) -> u32
    {
        match self {
            Self::NoType => 0,
            Self::Void => 1,
            Self::Char => 2,
            Self::WChar => 3,
            Self::Int => 6,
            Self::UInt => 7,
            Self::Float => 8,
            Self::Bcd => 9,
            Self::Bool => 10,
            Self::Long => 13,
            Self::ULong => 14,
            Self::Currency => 25,
            Self::Date => 26,
            Self::Variant => 27,
            Self::Complex => 28,
            Self::Bit => 29,
            Self::Bstr => 30,
            Self::Hresult => 31,
            Self::Char16 => 32,
            Self::Char32 => 33,
            Self::Other(raw) => raw,
        }
    }

    /// Integral types usable as array indices and enumerant storage.
    #[must_use]
    pub fn is_integral(self) -> bool
    {
        matches!(self, Self::Char | Self::Int | Self::UInt | Self::Long | Self::ULong)
    }
}

impl fmt::Display for BasicType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            Self::NoType => "btNoType",
            Self::Void => "btVoid",
            Self::Char => "btChar",
            Self::WChar => "btWChar",
            Self::Int => "btInt",
            Self::UInt => "btUInt",
            Self::Float => "btFloat",
            Self::Bcd => "btBCD",
            Self::Bool => "btBool",
            Self::Long => "btLong",
            Self::ULong => "btULong",
            Self::Currency => "btCurrency",
            Self::Date => "btDate",
            Self::Variant => "btVariant",
            Self::Complex => "btComplex",
            Self::Bit => "btBit",
            Self::Bstr => "btBSTR",
            Self::Hresult => "btHresult",
            Self::Char16 => "btChar16",
            Self::Char32 => "btChar32",
            Self::Other(raw) => return write!(f, "btUnknown({raw})"),
        };
        write!(f, "{label}")
    }
}

/// Every `(basic type, byte width)` pair with a canonical spelling.
pub const BASIC_TYPE_SPELLINGS: &[(BasicType, u64, &str)] = &[
    (BasicType::NoType, 0, "..."),
    (BasicType::Void, 0, "void"),
    (BasicType::Char, 1, "char"),
    (BasicType::WChar, 2, "wchar_t"),
    (BasicType::Int, 1, "signed char"),
    (BasicType::Int, 2, "short"),
    (BasicType::Int, 4, "int"),
    (BasicType::Int, 8, "__int64"),
    (BasicType::UInt, 1, "unsigned char"),
    (BasicType::UInt, 2, "unsigned short"),
    (BasicType::UInt, 4, "unsigned int"),
    (BasicType::UInt, 8, "unsigned __int64"),
    (BasicType::Float, 4, "float"),
    (BasicType::Float, 8, "double"),
    (BasicType::Bool, 1, "bool"),
    (BasicType::Long, 4, "long"),
    (BasicType::ULong, 4, "unsigned long"),
];

/// Canonical spelling of a basic type of the given byte width.
///
/// `(NoType, 0)` is the vararg marker and spells `...`.
///
/// ## Errors
///
/// Returns [`DeclError::UnsupportedBasicType`] for any pair outside
/// [`BASIC_TYPE_SPELLINGS`].
pub fn basic_type_spelling(base: BasicType, length: u64) -> Result<&'static str>
{
    BASIC_TYPE_SPELLINGS
        .iter()
        .find(|(b, l, _)| *b == base && *l == length)
        .map(|(_, _, spelling)| *spelling)
        .ok_or(DeclError::UnsupportedBasicType { base, length })
}

/// Calling convention code (`CV_CALL_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallingConvention
{
    NearC,
    FarC,
    NearPascal,
    FarPascal,
    NearFast,
    FarFast,
    Skipped,
    NearStd,
    FarStd,
    NearSys,
    FarSys,
    ThisCall,
    MipsCall,
    Generic,
    AlphaCall,
    PpcCall,
    ShCall,
    ArmCall,
    Am33Call,
    TriCall,
    Sh5Call,
    M32rCall,
    ClrCall,
    Inline,
    NearVector,
    Other(u32),
}

impl CallingConvention
{
    /// Decode a raw `callingConvention` attribute value.
    #[must_use]
    pub fn from_raw(raw: u64) -> Self
    {
        match raw {
            0x00 => Self::NearC,
            0x01 => Self::FarC,
            0x02 => Self::NearPascal,
            0x03 => Self::FarPascal,
            0x04 => Self::NearFast,
            0x05 => Self::FarFast,
            0x06 => Self::Skipped,
            0x07 => Self::NearStd,
            0x08 => Self::FarStd,
            0x09 => Self::NearSys,
            0x0a => Self::FarSys,
            0x0b => Self::ThisCall,
            0x0c => Self::MipsCall,
            0x0d => Self::Generic,
            0x0e => Self::AlphaCall,
            0x0f => Self::PpcCall,
            0x10 => Self::ShCall,
            0x11 => Self::ArmCall,
            0x12 => Self::Am33Call,
            0x13 => Self::TriCall,
            0x14 => Self::Sh5Call,
            0x15 => Self::M32rCall,
            0x16 => Self::ClrCall,
            0x17 => Self::Inline,
            0x18 => Self::NearVector,
            other => Self::Other(u32::try_from(other).unwrap_or(u32::MAX)),
        }
    }

    /// Raw `CV_CALL_*` code.
    #[must_use]
    pub fn raw(self) -> u32
    {
        match self {
            Self::NearC => 0x00,
            Self::FarC => 0x01,
            Self::NearPascal => 0x02,
            Self::FarPascal => 0x03,
            Self::NearFast => 0x04,
            Self::FarFast => 0x05,
            Self::Skipped => 0x06,
            Self::NearStd => 0x07,
            Self::FarStd => 0x08,
            Self::NearSys => 0x09,
            Self::FarSys => 0x0a,
            Self::ThisCall => 0x0b,
            Self::MipsCall => 0x0c,
            Self::Generic => 0x0d,
            Self::AlphaCall => 0x0e,
            Self::PpcCall => 0x0f,
            Self::ShCall => 0x10,
            Self::ArmCall => 0x11,
            Self::Am33Call => 0x12,
            Self::TriCall => 0x13,
            Self::Sh5Call => 0x14,
            Self::M32rCall => 0x15,
            Self::ClrCall => 0x16,
            Self::Inline => 0x17,
            Self::NearVector => 0x18,
            Self::Other(raw) => raw,
        }
    }

    /// Source-level keyword for this convention.
    ///
    /// Conventions without a keyword spell as `__callconv(0xNN)` so the
    /// output still shows which code was seen.
    #[must_use]
    pub fn spelling(self) -> String
    {
        let keyword = match self {
            Self::NearC => "__cdecl",
            Self::NearPascal => "__pascal",
            Self::NearFast => "__fastcall",
            Self::NearStd => "__stdcall",
            Self::ThisCall => "__thiscall",
            Self::ClrCall => "__clrcall",
            Self::NearVector => "__vectorcall",
            other => return format!("__callconv(0x{:02x})", other.raw()),
        };
        keyword.to_string()
    }
}

impl fmt::Display for CallingConvention
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "CV_CALL({:#04x})", self.raw())
    }
}

/// Member access level (`CV_private`, `CV_protected`, `CV_public`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access
{
    Private,
    Protected,
    Public,
    Other(u32),
}

impl Access
{
    /// Decode a raw `access` attribute value.
    #[must_use]
    pub fn from_raw(raw: u64) -> Self
    {
        match raw {
            1 => Self::Private,
            2 => Self::Protected,
            3 => Self::Public,
            other => Self::Other(u32::try_from(other).unwrap_or(u32::MAX)),
        }
    }

    /// Source-level keyword.
    #[must_use]
    pub fn spelling(self) -> String
    {
        match self {
            Self::Private => "private".to_string(),
            Self::Protected => "protected".to_string(),
            Self::Public => "public".to_string(),
            Self::Other(raw) => format!("access({raw})"),
        }
    }
}

/// Struct, class or union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UdtKind
{
    Struct,
    Class,
    Union,
    Other(u32),
}

impl UdtKind
{
    /// Decode a raw `udtKind` attribute value.
    #[must_use]
    pub fn from_raw(raw: u64) -> Self
    {
        match raw {
            0 => Self::Struct,
            1 => Self::Class,
            2 => Self::Union,
            other => Self::Other(u32::try_from(other).unwrap_or(u32::MAX)),
        }
    }

    /// Source-level keyword.
    #[must_use]
    pub fn spelling(self) -> String
    {
        match self {
            Self::Struct => "struct".to_string(),
            Self::Class => "class".to_string(),
            Self::Union => "union".to_string(),
            Self::Other(raw) => format!("udtkind({raw})"),
        }
    }
}

/// Where a data symbol lives (`LocIsXxx`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationType
{
    Null,
    Static,
    Tls,
    RegRel,
    ThisRel,
    Enregistered,
    BitField,
    Slot,
    IlRel,
    MetaData,
    Constant,
    Other(u32),
}

impl LocationType
{
    /// Decode a raw `locationType` attribute value.
    #[must_use]
    pub fn from_raw(raw: u64) -> Self
    {
        match raw {
            0 => Self::Null,
            1 => Self::Static,
            2 => Self::Tls,
            3 => Self::RegRel,
            4 => Self::ThisRel,
            5 => Self::Enregistered,
            6 => Self::BitField,
            7 => Self::Slot,
            8 => Self::IlRel,
            9 => Self::MetaData,
            10 => Self::Constant,
            other => Self::Other(u32::try_from(other).unwrap_or(u32::MAX)),
        }
    }
}

impl fmt::Display for LocationType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            Self::Null => "LocIsNull",
            Self::Static => "LocIsStatic",
            Self::Tls => "LocIsTLS",
            Self::RegRel => "LocIsRegRel",
            Self::ThisRel => "LocIsThisRel",
            Self::Enregistered => "LocIsEnregistered",
            Self::BitField => "LocIsBitField",
            Self::Slot => "LocIsSlot",
            Self::IlRel => "LocIsIlRel",
            Self::MetaData => "LocInMetaData",
            Self::Constant => "LocIsConstant",
            Self::Other(raw) => return write!(f, "LocationType({raw})"),
        };
        write!(f, "{label}")
    }
}

/// What role a data symbol plays (`DataIsXxx`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind
{
    Unknown,
    Local,
    StaticLocal,
    Param,
    ObjectPtr,
    FileStatic,
    Global,
    Member,
    StaticMember,
    Constant,
    Other(u32),
}

impl DataKind
{
    /// Decode a raw `dataKind` attribute value.
    #[must_use]
    pub fn from_raw(raw: u64) -> Self
    {
        match raw {
            0 => Self::Unknown,
            1 => Self::Local,
            2 => Self::StaticLocal,
            3 => Self::Param,
            4 => Self::ObjectPtr,
            5 => Self::FileStatic,
            6 => Self::Global,
            7 => Self::Member,
            8 => Self::StaticMember,
            9 => Self::Constant,
            other => Self::Other(u32::try_from(other).unwrap_or(u32::MAX)),
        }
    }
}

impl fmt::Display for DataKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            Self::Unknown => "DataIsUnknown",
            Self::Local => "DataIsLocal",
            Self::StaticLocal => "DataIsStaticLocal",
            Self::Param => "DataIsParam",
            Self::ObjectPtr => "DataIsObjectPtr",
            Self::FileStatic => "DataIsFileStatic",
            Self::Global => "DataIsGlobal",
            Self::Member => "DataIsMember",
            Self::StaticMember => "DataIsStaticMember",
            Self::Constant => "DataIsConstant",
            Self::Other(raw) => return write!(f, "DataKind({raw})"),
        };
        write!(f, "{label}")
    }
}

/// Format `value` as uppercase hex, masked to `length` bytes.
///
/// A zero length is treated as a 4-byte value, since enumerants and constants
/// without a sized type are `int` in practice.
#[must_use]
pub fn hex_value(value: i64, length: u64) -> String
{
    let length = if length == 0 { 4 } else { length.min(8) };
    let bits = length * 8;
    #[allow(clippy::cast_sign_loss)]
    let raw = value as u64;
    let masked = if bits >= 64 { raw } else { raw & ((1u64 << bits) - 1) };
    format!("0x{masked:X}")
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_every_table_entry_spells()
    {
        for (base, length, spelling) in BASIC_TYPE_SPELLINGS {
            assert_eq!(basic_type_spelling(*base, *length).unwrap(), *spelling);
        }
    }

    #[test]
    fn test_unknown_pairs_do_not_spell()
    {
        assert!(basic_type_spelling(BasicType::Int, 3).is_err());
        assert!(basic_type_spelling(BasicType::Long, 8).is_err());
        assert!(basic_type_spelling(BasicType::Hresult, 4).is_err());
        assert!(basic_type_spelling(BasicType::Other(99), 4).is_err());
    }

    #[test]
    fn test_basic_type_raw_round_trip()
    {
        for raw in 0..40u64 {
            let base = BasicType::from_raw(raw);
            if let BasicType::Other(code) = base {
                assert_eq!(u64::from(code), raw);
            } else {
                assert_eq!(u64::from(base.raw()), raw);
            }
        }
    }

    #[test]
    fn test_calling_convention_spelling()
    {
        assert_eq!(CallingConvention::from_raw(0x0b).spelling(), "__thiscall");
        assert_eq!(CallingConvention::from_raw(0x07).spelling(), "__stdcall");
        assert_eq!(CallingConvention::from_raw(0x00).spelling(), "__cdecl");
        assert_eq!(CallingConvention::from_raw(0x0d).spelling(), "__callconv(0x0d)");
    }

    #[test]
    fn test_access_and_udt_kind_spelling()
    {
        assert_eq!(Access::from_raw(1).spelling(), "private");
        assert_eq!(Access::from_raw(3).spelling(), "public");
        assert_eq!(Access::from_raw(0).spelling(), "access(0)");
        assert_eq!(UdtKind::from_raw(1).spelling(), "class");
        assert_eq!(UdtKind::from_raw(2).spelling(), "union");
    }

    #[test]
    fn test_hex_value_masks_to_width()
    {
        assert_eq!(hex_value(16, 4), "0x10");
        assert_eq!(hex_value(-1, 4), "0xFFFFFFFF");
        assert_eq!(hex_value(-1, 1), "0xFF");
        assert_eq!(hex_value(-1, 8), "0xFFFFFFFFFFFFFFFF");
        assert_eq!(hex_value(0, 0), "0x0");
    }

    #[test]
    fn test_kind_names()
    {
        assert_eq!(DataKind::from_raw(7).to_string(), "DataIsMember");
        assert_eq!(LocationType::from_raw(4).to_string(), "LocIsThisRel");
        assert_eq!(DataKind::from_raw(42).to_string(), "DataKind(42)");
    }
}
