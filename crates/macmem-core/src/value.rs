//! # Typed Value Codec
//!
//! Conversion between human-entered literals and the raw byte patterns that
//! live in target memory, plus the comparison predicates the scan engine
//! evaluates over those patterns.
//!
//! Every supported type maps to a fixed-width native-endian byte pattern
//! (strings are variable-width, their pattern is the literal's bytes). The
//! rest of the crate never reinterprets raw bytes itself: all decoding goes
//! through [`ValueType::render`] and all predicates through
//! [`ValueType::compare`].
//!
//! ## Alignment
//!
//! The codec defines a scan stride of one byte for all types: first-scan
//! inspects every offset, so matches may be unaligned. Real hits are not
//! always naturally aligned, and the cost is paid once at scan time.

use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use crate::error::{MacmemError, Result};

/// Value types supported by the scanner
///
/// Numeric variants carry their signedness: `Byte` is unsigned, the wider
/// integers are signed two's-complement, and the float variants are IEEE-754
/// binary32/binary64. Byte order always follows the target process's native
/// order.
///
/// The declaration order here is load-bearing: [`ValueType::ordinal`] values
/// in saved result files index into this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType
{
    /// Unsigned 8-bit integer
    Byte,
    /// Signed 16-bit integer
    Short,
    /// Signed 32-bit integer
    Int,
    /// Signed 64-bit integer
    Long,
    /// IEEE-754 binary32
    Float,
    /// IEEE-754 binary64
    Double,
    /// Raw byte string, no trailing NUL
    String,
}

/// Comparison operators over two byte patterns of one type
///
/// `Eq`, `Changed`, and `Unchanged` are bytewise and defined for every type.
/// `Gt` and `Lt` decode both sides and are numeric-only; for floats they use
/// IEEE ordering, so any comparison involving NaN is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp
{
    /// Bytewise equality with the search pattern
    Eq,
    /// Decoded value is greater than the search pattern
    Gt,
    /// Decoded value is less than the search pattern
    Lt,
    /// Bytes differ from the candidate's previously observed bytes
    Changed,
    /// Bytes equal the candidate's previously observed bytes
    Unchanged,
}

impl ValueType
{
    /// All variants in declaration order.
    pub const ALL: [ValueType; 7] = [
        ValueType::Byte,
        ValueType::Short,
        ValueType::Int,
        ValueType::Long,
        ValueType::Float,
        ValueType::Double,
        ValueType::String,
    ];

    /// Fixed byte width of the type, or `None` for strings
    ///
    /// A string pattern's width is the length of the literal it was parsed
    /// from; it has no width of its own.
    pub const fn width(self) -> Option<usize>
    {
        match self {
            ValueType::Byte => Some(1),
            ValueType::Short => Some(2),
            ValueType::Int => Some(4),
            ValueType::Long => Some(8),
            ValueType::Float => Some(4),
            ValueType::Double => Some(8),
            ValueType::String => None,
        }
    }

    /// Position in the declaration order, used as the type column of saved
    /// result files.
    pub const fn ordinal(self) -> u8
    {
        match self {
            ValueType::Byte => 0,
            ValueType::Short => 1,
            ValueType::Int => 2,
            ValueType::Long => 3,
            ValueType::Float => 4,
            ValueType::Double => 5,
            ValueType::String => 6,
        }
    }

    /// Inverse of [`ValueType::ordinal`].
    pub const fn from_ordinal(ordinal: u8) -> Option<ValueType>
    {
        match ordinal {
            0 => Some(ValueType::Byte),
            1 => Some(ValueType::Short),
            2 => Some(ValueType::Int),
            3 => Some(ValueType::Long),
            4 => Some(ValueType::Float),
            5 => Some(ValueType::Double),
            6 => Some(ValueType::String),
            _ => None,
        }
    }

    /// Parse a human-entered literal into this type's byte pattern
    ///
    /// Integers accept decimal (optionally signed) and `0x` hex. Decimal
    /// literals are range-checked against the type; a value that does not fit
    /// is an [`MacmemError::OutOfRange`] error, never a silent truncation.
    /// Hex literals are raw bit patterns of the type's width and are
    /// reinterpreted as two's-complement, so `0xffff` is a legal `short`
    /// (it reads back as -1).
    ///
    /// Floats accept standard decimal notation. Strings are taken verbatim
    /// without a trailing NUL; the literal's byte length becomes the pattern
    /// width, and an empty string is rejected.
    pub fn parse(self, text: &str) -> Result<Vec<u8>>
    {
        match self {
            ValueType::Byte => Ok((integer_in_range(self, text, 8, false)? as u8).to_ne_bytes().to_vec()),
            ValueType::Short => Ok((integer_in_range(self, text, 16, true)? as i16).to_ne_bytes().to_vec()),
            ValueType::Int => Ok((integer_in_range(self, text, 32, true)? as i32).to_ne_bytes().to_vec()),
            ValueType::Long => Ok((integer_in_range(self, text, 64, true)? as i64).to_ne_bytes().to_vec()),
            ValueType::Float => {
                let value: f32 = text
                    .trim()
                    .parse()
                    .map_err(|_| MacmemError::MalformedLiteral(format!("'{text}' is not a valid float")))?;
                Ok(value.to_ne_bytes().to_vec())
            }
            ValueType::Double => {
                let value: f64 = text
                    .trim()
                    .parse()
                    .map_err(|_| MacmemError::MalformedLiteral(format!("'{text}' is not a valid double")))?;
                Ok(value.to_ne_bytes().to_vec())
            }
            ValueType::String => {
                if text.is_empty() {
                    return Err(MacmemError::MalformedLiteral("empty string pattern".to_string()));
                }
                Ok(text.as_bytes().to_vec())
            }
        }
    }

    /// Render a byte pattern of this type back into displayable form
    ///
    /// Rendering never fails. A pattern whose length does not match the
    /// type's width (which no codec or engine path produces) falls back to a
    /// plain hex dump rather than panicking.
    pub fn render(self, bytes: &[u8]) -> String
    {
        match self {
            ValueType::Byte => render_with(bytes, u8::from_ne_bytes),
            ValueType::Short => render_with(bytes, i16::from_ne_bytes),
            ValueType::Int => render_with(bytes, i32::from_ne_bytes),
            ValueType::Long => render_with(bytes, i64::from_ne_bytes),
            ValueType::Float => render_with(bytes, f32::from_ne_bytes),
            ValueType::Double => render_with(bytes, f64::from_ne_bytes),
            ValueType::String => std::string::String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// Evaluate a comparison between two byte patterns of this type
    ///
    /// `lhs` is the freshly observed pattern, `rhs` the reference: the search
    /// pattern for `Eq`/`Gt`/`Lt`, the candidate's previously observed bytes
    /// for `Changed`/`Unchanged`.
    pub fn compare(self, lhs: &[u8], rhs: &[u8], op: CompareOp) -> Result<bool>
    {
        match op {
            CompareOp::Eq | CompareOp::Unchanged => Ok(lhs == rhs),
            CompareOp::Changed => Ok(lhs != rhs),
            CompareOp::Gt | CompareOp::Lt => self.compare_ordered(lhs, rhs, op),
        }
    }

    fn compare_ordered(self, lhs: &[u8], rhs: &[u8], op: CompareOp) -> Result<bool>
    {
        match self {
            ValueType::Byte => ordered(lhs, rhs, op, u8::from_ne_bytes),
            ValueType::Short => ordered(lhs, rhs, op, i16::from_ne_bytes),
            ValueType::Int => ordered(lhs, rhs, op, i32::from_ne_bytes),
            ValueType::Long => ordered(lhs, rhs, op, i64::from_ne_bytes),
            ValueType::Float => ordered(lhs, rhs, op, f32::from_ne_bytes),
            ValueType::Double => ordered(lhs, rhs, op, f64::from_ne_bytes),
            ValueType::String => Err(MacmemError::UnsupportedOp { op, ty: self }),
        }
    }
}

impl fmt::Display for ValueType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let token = match self {
            ValueType::Byte => "byte",
            ValueType::Short => "short",
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::String => "string",
        };
        write!(f, "{token}")
    }
}

impl FromStr for ValueType
{
    type Err = MacmemError;

    fn from_str(s: &str) -> Result<Self>
    {
        match s.to_lowercase().as_str() {
            "byte" => Ok(ValueType::Byte),
            "short" => Ok(ValueType::Short),
            "int" => Ok(ValueType::Int),
            "long" => Ok(ValueType::Long),
            "float" => Ok(ValueType::Float),
            "double" => Ok(ValueType::Double),
            "string" => Ok(ValueType::String),
            _ => Err(MacmemError::UnknownType(s.to_string())),
        }
    }
}

impl CompareOp
{
    /// Whether this operator filters against previously observed bytes
    ///
    /// `changed` and `unchanged` are only meaningful for refinements: a first
    /// scan has no baseline to compare against.
    pub const fn requires_baseline(self) -> bool
    {
        matches!(self, CompareOp::Changed | CompareOp::Unchanged)
    }
}

impl fmt::Display for CompareOp
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let token = match self {
            CompareOp::Eq => "exact",
            CompareOp::Gt => "greater",
            CompareOp::Lt => "less",
            CompareOp::Changed => "changed",
            CompareOp::Unchanged => "unchanged",
        };
        write!(f, "{token}")
    }
}

impl FromStr for CompareOp
{
    type Err = MacmemError;

    fn from_str(s: &str) -> Result<Self>
    {
        match s.to_lowercase().as_str() {
            "exact" => Ok(CompareOp::Eq),
            "greater" => Ok(CompareOp::Gt),
            "less" => Ok(CompareOp::Lt),
            "changed" => Ok(CompareOp::Changed),
            "unchanged" => Ok(CompareOp::Unchanged),
            _ => Err(MacmemError::UnknownOp(s.to_string())),
        }
    }
}

/// Integer literal shapes: decimal literals carry a sign and get range
/// checks, hex literals are raw width-sized bit patterns.
enum IntLiteral
{
    Decimal(i128),
    Raw(u128),
}

fn parse_int_literal(ty: ValueType, text: &str) -> Result<IntLiteral>
{
    let trimmed = text.trim();
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        u128::from_str_radix(hex, 16)
            .map(IntLiteral::Raw)
            .map_err(|e| classify_int_error(ty, text, e.kind()))
    } else {
        trimmed
            .parse::<i128>()
            .map(IntLiteral::Decimal)
            .map_err(|e| classify_int_error(ty, text, e.kind()))
    }
}

fn classify_int_error(ty: ValueType, text: &str, kind: &IntErrorKind) -> MacmemError
{
    match kind {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            MacmemError::OutOfRange(format!("'{text}' does not fit in a {ty}"))
        }
        _ => MacmemError::MalformedLiteral(format!("'{text}' is not a valid {ty}")),
    }
}

/// Parse an integer literal and check it against a `bits`-wide type.
///
/// Returns the value sign-extended to i128 so callers can cast down to the
/// concrete width without a second check.
fn integer_in_range(ty: ValueType, text: &str, bits: u32, signed: bool) -> Result<i128>
{
    match parse_int_literal(ty, text)? {
        IntLiteral::Decimal(value) => {
            let (min, max) = if signed {
                (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
            } else {
                (0, (1i128 << bits) - 1)
            };
            if value < min || value > max {
                return Err(MacmemError::OutOfRange(format!("'{text}' does not fit in a {ty}")));
            }
            Ok(value)
        }
        IntLiteral::Raw(raw) => {
            let unsigned_max = (1u128 << bits) - 1;
            if raw > unsigned_max {
                return Err(MacmemError::OutOfRange(format!("'{text}' does not fit in a {ty}")));
            }
            let mut value = raw as i128;
            if signed && raw > unsigned_max >> 1 {
                value -= 1i128 << bits;
            }
            Ok(value)
        }
    }
}

fn render_with<const N: usize, T: fmt::Display>(bytes: &[u8], decode: fn([u8; N]) -> T) -> String
{
    match <[u8; N]>::try_from(bytes) {
        Ok(array) => decode(array).to_string(),
        Err(_) => bytes.iter().map(|b| format!("{b:02x}")).collect(),
    }
}

fn ordered<const N: usize, T: PartialOrd>(lhs: &[u8], rhs: &[u8], op: CompareOp, decode: fn([u8; N]) -> T) -> Result<bool>
{
    let left = decode(sized(lhs)?);
    let right = decode(sized(rhs)?);
    Ok(match op {
        CompareOp::Gt => left > right,
        _ => left < right,
    })
}

fn sized<const N: usize>(bytes: &[u8]) -> Result<[u8; N]>
{
    <[u8; N]>::try_from(bytes).map_err(|_| MacmemError::SizeMismatch {
        expected: N,
        actual: bytes.len(),
    })
}
