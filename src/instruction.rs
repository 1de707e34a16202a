//! Instruction encoding, the opcode space, and instruction flags.
//!
//! An instruction is a packed 32-bit little-endian word: `opcode: u8`,
//! `flags: u8`, `immediate: u16` (§3, §6). The opcode space is organised
//! into semantic bands (§4.3.3); gaps between assigned opcodes are invalid
//! and rejected at dispatch time rather than represented as enum variants.

use bitflags::bitflags;

use crate::config::MAX_OPCODE;
use crate::error::VmError;

bitflags! {
    /// Per-instruction modifier bits carried in the `flags` byte (§3).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct InstructionFlags: u8 {
        /// Select the signed-arithmetic variant of a comparison opcode.
        const SIGNED = 0b0000_0001;
        /// Hint: skip the stack integrity check for this step.
        const SKIP_STACK_CHECK = 0b0000_0010;
        /// Hint: this instruction originated from a debug build of the
        /// front-end compiler (informational only; the engine does not act
        /// on it directly).
        const DEBUG_HINT = 0b0000_0100;
    }
}

/// The full canonical opcode space (§4.3.3). Numeric values are part of the
/// bytecode interchange format and must not be renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum OpCode {
    // Core (0x00-0x0F)
    Halt = 0x00,
    Push = 0x01,
    Pop = 0x02,
    Add = 0x03,
    Sub = 0x04,
    Mul = 0x05,
    Div = 0x06,
    Mod = 0x07,
    Call = 0x08,
    Ret = 0x09,

    // Hardware I/O (0x10-0x1F)
    DigitalWrite = 0x10,
    DigitalRead = 0x11,
    AnalogWrite = 0x12,
    AnalogRead = 0x13,
    Delay = 0x14,
    ButtonPressed = 0x15,
    ButtonReleased = 0x16,
    PinMode = 0x17,
    Printf = 0x18,
    Millis = 0x19,
    Micros = 0x1A,

    // Comparisons (0x20-0x2F), unsigned then signed
    Eq = 0x20,
    Ne = 0x21,
    Lt = 0x22,
    Gt = 0x23,
    Le = 0x24,
    Ge = 0x25,
    EqS = 0x26,
    NeS = 0x27,
    LtS = 0x28,
    GtS = 0x29,
    LeS = 0x2A,
    GeS = 0x2B,

    // Control flow (0x30-0x3F)
    Jmp = 0x30,
    JmpTrue = 0x31,
    JmpFalse = 0x32,

    // Logical (0x40-0x4F)
    LogicalAnd = 0x40,
    LogicalOr = 0x41,
    LogicalNot = 0x42,

    // Memory (0x50-0x5F)
    LoadGlobal = 0x50,
    StoreGlobal = 0x51,
    LoadLocal = 0x52,
    StoreLocal = 0x53,
    LoadArray = 0x54,
    StoreArray = 0x55,
    CreateArray = 0x56,

    // Bitwise (0x60-0x6F)
    BitAnd = 0x60,
    BitOr = 0x61,
    BitXor = 0x62,
    BitNot = 0x63,
    Shl = 0x64,
    Shr = 0x65,
}

impl OpCode {
    /// Returns the raw opcode byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for OpCode {
    type Error = VmError;

    /// Decodes a raw opcode byte. Unassigned slots (including the gaps
    /// within each band) and anything above [`MAX_OPCODE`] are rejected
    /// with [`VmError::InvalidOpcode`], per §4.3.1 step 3-4.
    fn try_from(opcode: u8) -> Result<Self, Self::Error> {
        use OpCode::*;
        let decoded = match opcode {
            0x00 => Halt,
            0x01 => Push,
            0x02 => Pop,
            0x03 => Add,
            0x04 => Sub,
            0x05 => Mul,
            0x06 => Div,
            0x07 => Mod,
            0x08 => Call,
            0x09 => Ret,

            0x10 => DigitalWrite,
            0x11 => DigitalRead,
            0x12 => AnalogWrite,
            0x13 => AnalogRead,
            0x14 => Delay,
            0x15 => ButtonPressed,
            0x16 => ButtonReleased,
            0x17 => PinMode,
            0x18 => Printf,
            0x19 => Millis,
            0x1A => Micros,

            0x20 => Eq,
            0x21 => Ne,
            0x22 => Lt,
            0x23 => Gt,
            0x24 => Le,
            0x25 => Ge,
            0x26 => EqS,
            0x27 => NeS,
            0x28 => LtS,
            0x29 => GtS,
            0x2A => LeS,
            0x2B => GeS,

            0x30 => Jmp,
            0x31 => JmpTrue,
            0x32 => JmpFalse,

            0x40 => LogicalAnd,
            0x41 => LogicalOr,
            0x42 => LogicalNot,

            0x50 => LoadGlobal,
            0x51 => StoreGlobal,
            0x52 => LoadLocal,
            0x53 => StoreLocal,
            0x54 => LoadArray,
            0x55 => StoreArray,
            0x56 => CreateArray,

            0x60 => BitAnd,
            0x61 => BitOr,
            0x62 => BitXor,
            0x63 => BitNot,
            0x64 => Shl,
            0x65 => Shr,

            _ => return Err(VmError::InvalidOpcode { opcode }),
        };
        debug_assert!(decoded.as_u8() <= MAX_OPCODE);
        Ok(decoded)
    }
}

/// A single packed instruction: `opcode: u8`, `flags: u8`, `immediate: u16`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    pub opcode: u8,
    pub flags: InstructionFlags,
    pub immediate: u16,
}

impl Instruction {
    /// Builds an instruction from its three fields directly (used by tests
    /// and by any in-process bytecode assembler).
    pub fn new(opcode: u8, flags: InstructionFlags, immediate: u16) -> Self {
        Self {
            opcode,
            flags,
            immediate,
        }
    }

    /// Decodes a little-endian 32-bit word: byte 0 = opcode, byte 1 = flags,
    /// bytes 2-3 = 16-bit immediate (§6).
    pub fn decode(word: u32) -> Self {
        let bytes = word.to_le_bytes();
        Self {
            opcode: bytes[0],
            flags: InstructionFlags::from_bits_truncate(bytes[1]),
            immediate: u16::from_le_bytes([bytes[2], bytes[3]]),
        }
    }

    /// Encodes back to the wire-level 32-bit little-endian word.
    pub fn encode(&self) -> u32 {
        let bytes = [self.opcode, self.flags.bits(), 0, 0];
        let mut word = u32::from_le_bytes(bytes);
        word |= (self.immediate as u32) << 16;
        word
    }

    /// The decoded opcode, or `InvalidOpcode` if the byte is out of range or
    /// unassigned.
    pub fn op(&self) -> Result<OpCode, VmError> {
        OpCode::try_from(self.opcode)
    }

    /// Whether `InstructionFlags::SIGNED` is set.
    pub fn is_signed(&self) -> bool {
        self.flags.contains(InstructionFlags::SIGNED)
    }
}
