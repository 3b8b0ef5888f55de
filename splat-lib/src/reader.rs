use zerocopy::byteorder::{ByteOrder, F32, F64, I16, I32, U16, U32};
use zerocopy::FromBytes;

use crate::error::PlyError;

/// Scalar property type as declared by a `property <type> <name>` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScalarType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
    /// A type token no reader knows; read as a 4 byte float.
    Unknown(String),
}

impl ScalarType {
    pub fn parse(token: &str) -> Self {
        match token {
            "char" | "int8" => Self::Char,
            "uchar" | "uint8" => Self::UChar,
            "short" | "int16" => Self::Short,
            "ushort" | "uint16" => Self::UShort,
            "int" | "int32" => Self::Int,
            "uint" | "uint32" => Self::UInt,
            "float" | "float32" => Self::Float,
            "double" | "float64" => Self::Double,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Char | Self::UChar => 1,
            Self::Short | Self::UShort => 2,
            Self::Int | Self::UInt | Self::Float | Self::Unknown(_) => 4,
            Self::Double => 8,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Char => "char",
            Self::UChar => "uchar",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::Double => "double",
            Self::Unknown(token) => token,
        }
    }
}

/// Reads one scalar of type `ty` at `offset`, in byte order `O`, widened to f64.
#[inline]
pub fn read_scalar<O: ByteOrder>(
    bytes: &[u8],
    offset: usize,
    ty: &ScalarType,
) -> Result<f64, PlyError> {
    let need = ty.size_bytes();
    let b = offset
        .checked_add(need)
        .and_then(|end| bytes.get(offset..end))
        .ok_or(PlyError::TruncatedData {
            needed: offset.saturating_add(need),
            available: bytes.len(),
        })?;

    let v = match ty {
        ScalarType::Char => b[0] as i8 as f64,
        ScalarType::UChar => b[0] as f64,
        ScalarType::Short => read::<I16<O>>(b)?.get() as f64,
        ScalarType::UShort => read::<U16<O>>(b)?.get() as f64,
        ScalarType::Int => read::<I32<O>>(b)?.get() as f64,
        ScalarType::UInt => read::<U32<O>>(b)?.get() as f64,
        ScalarType::Float | ScalarType::Unknown(_) => read::<F32<O>>(b)?.get() as f64,
        ScalarType::Double => read::<F64<O>>(b)?.get(),
    };
    Ok(v)
}

#[inline(always)]
fn read<T: FromBytes>(b: &[u8]) -> Result<T, PlyError> {
    T::read_from_bytes(b).map_err(|_| PlyError::TruncatedData {
        needed: size_of::<T>(),
        available: b.len(),
    })
}
