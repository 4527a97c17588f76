//! Element types carried by a [`Shape`](crate::Shape).

use std::fmt;

/// Element type of an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Pred,
    S4,
    S8,
    S16,
    S32,
    S64,
    U4,
    U8,
    U16,
    U32,
    U64,
    F16,
    BF16,
    F32,
    F64,
    /// Complex with `f32` real and imaginary parts.
    C64,
    /// Complex with `f64` real and imaginary parts.
    C128,
}

impl PrimitiveType {
    /// Storage width of one element in bits.
    ///
    /// `Pred` is stored as one byte.
    pub fn bit_width(self) -> u32 {
        match self {
            PrimitiveType::S4 | PrimitiveType::U4 => 4,
            PrimitiveType::Pred | PrimitiveType::S8 | PrimitiveType::U8 => 8,
            PrimitiveType::S16
            | PrimitiveType::U16
            | PrimitiveType::F16
            | PrimitiveType::BF16 => 16,
            PrimitiveType::S32 | PrimitiveType::U32 | PrimitiveType::F32 => 32,
            PrimitiveType::S64 | PrimitiveType::U64 | PrimitiveType::F64 | PrimitiveType::C64 => 64,
            PrimitiveType::C128 => 128,
        }
    }

    pub fn is_floating_point(self) -> bool {
        matches!(
            self,
            PrimitiveType::F16 | PrimitiveType::BF16 | PrimitiveType::F32 | PrimitiveType::F64
        )
    }

    pub fn is_complex(self) -> bool {
        matches!(self, PrimitiveType::C64 | PrimitiveType::C128)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveType::Pred => "pred",
            PrimitiveType::S4 => "s4",
            PrimitiveType::S8 => "s8",
            PrimitiveType::S16 => "s16",
            PrimitiveType::S32 => "s32",
            PrimitiveType::S64 => "s64",
            PrimitiveType::U4 => "u4",
            PrimitiveType::U8 => "u8",
            PrimitiveType::U16 => "u16",
            PrimitiveType::U32 => "u32",
            PrimitiveType::U64 => "u64",
            PrimitiveType::F16 => "f16",
            PrimitiveType::BF16 => "bf16",
            PrimitiveType::F32 => "f32",
            PrimitiveType::F64 => "f64",
            PrimitiveType::C64 => "c64",
            PrimitiveType::C128 => "c128",
        };
        f.write_str(name)
    }
}
