//! Opcode encoding.
//!
//! One byte selects a primary opcode. The reserved escape byte `0xFF`
//! is followed by a big-endian u16 naming an extended opcode, leaving
//! room for 65536 rarely-used instructions without widening the hot path.

/// Escape byte introducing a two-byte extended opcode.
pub const EXTENDED_ESCAPE: u8 = 0xFF;

macro_rules! opcodes {
    ($($name:ident = $value:expr),+ $(,)?) => {
        /// Primary (single-byte) opcodes.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Opcode {
            $($name = $value),+
        }

        impl Opcode {
            /// Decode a raw byte. `None` for unassigned encodings
            /// (including the extended escape).
            pub fn from_u8(byte: u8) -> Option<Self> {
                match byte {
                    $($value => Some(Opcode::$name),)+
                    _ => None,
                }
            }
        }
    };
}

opcodes! {
    // control
    Nop = 0x00,
    Hlt = 0x01,
    Trap = 0x02,
    TrapIfZero = 0x03,
    TrapIfNotZero = 0x04,
    Brk = 0x05,

    // integer arithmetic, implicit accumulator form
    Add = 0x10,
    Sub = 0x11,
    Mul = 0x12,
    Div = 0x13,
    Mod = 0x14,
    And = 0x15,
    Or = 0x16,
    Xor = 0x17,
    Shl = 0x18,
    Shr = 0x19,
    Neg = 0x1A,
    Not = 0x1B,
    // pop-two form
    Add2 = 0x1C,
    Sub2 = 0x1D,
    Mul2 = 0x1E,
    Div2 = 0x1F,
    Mod2 = 0x20,
    And2 = 0x21,
    Or2 = 0x22,
    Xor2 = 0x23,
    Shl2 = 0x24,
    Shr2 = 0x25,
    // push-result form
    AddSt = 0x26,
    SubSt = 0x27,
    MulSt = 0x28,
    DivSt = 0x29,
    ModSt = 0x2A,
    AndSt = 0x2B,
    OrSt = 0x2C,
    XorSt = 0x2D,
    ShlSt = 0x2E,
    ShrSt = 0x2F,
    NegSt = 0x30,
    NotSt = 0x31,
    // 4-byte immediate into accumulator
    AddImm = 0x32,
    SubImm = 0x33,
    MulImm = 0x34,
    DivImm = 0x35,
    ModImm = 0x36,
    AndImm = 0x37,
    OrImm = 0x38,
    XorImm = 0x39,
    ShlImm = 0x3A,
    ShrImm = 0x3B,
    // 4-byte immediate against top of stack, in place
    AddImmSt = 0x3C,
    SubImmSt = 0x3D,
    MulImmSt = 0x3E,
    DivImmSt = 0x3F,
    ModImmSt = 0x40,
    AndImmSt = 0x41,
    OrImmSt = 0x42,
    XorImmSt = 0x43,
    ShlImmSt = 0x44,
    ShrImmSt = 0x45,

    // float arithmetic
    FAdd = 0x50,
    FSub = 0x51,
    FMul = 0x52,
    FDiv = 0x53,
    FAdd2 = 0x54,
    FSub2 = 0x55,
    FMul2 = 0x56,
    FDiv2 = 0x57,
    FAddSt = 0x58,
    FSubSt = 0x59,
    FMulSt = 0x5A,
    FDivSt = 0x5B,
    FNeg = 0x5C,
    FAddImm = 0x5D,
    FSubImm = 0x5E,
    FMulImm = 0x5F,
    FDivImm = 0x60,
    FAddImmSt = 0x61,
    FSubImmSt = 0x62,
    FMulImmSt = 0x63,
    FDivImmSt = 0x64,

    // comparisons: pop one, compare against accumulator
    CmpEq = 0x68,
    CmpNe = 0x69,
    CmpLt = 0x6A,
    CmpGt = 0x6B,
    CmpLte = 0x6C,
    CmpGte = 0x6D,
    FCmpEq = 0x6E,
    FCmpNe = 0x6F,
    FCmpLt = 0x70,
    FCmpGt = 0x71,
    FCmpLte = 0x72,
    FCmpGte = 0x73,
    // zero-suffixed: accumulator against literal zero, no pop
    CmpEq0 = 0x74,
    CmpNe0 = 0x75,
    CmpLt0 = 0x76,
    CmpGt0 = 0x77,
    CmpLte0 = 0x78,
    CmpGte0 = 0x79,
    FCmpEq0 = 0x7A,
    FCmpNe0 = 0x7B,
    FCmpLt0 = 0x7C,
    FCmpGt0 = 0x7D,
    FCmpLte0 = 0x7E,
    FCmpGte0 = 0x7F,

    // stack/register transfer, constants, locals
    PushAcc = 0x80,
    PushSp = 0x81,
    PopAcc = 0x82,
    PopSp = 0x83,
    PopDiscard = 0x84,
    Const = 0x85,
    Const32 = 0x86,
    Const64 = 0x87,
    ConstSt = 0x88,
    Const32St = 0x89,
    Const64St = 0x8A,
    Load = 0x8B,
    LoadSt = 0x8C,
    Store = 0x8D,
    StoreSt = 0x8E,

    // branches
    Jmp = 0x97,
    Jz = 0x98,
    Jnz = 0x99,

    // calls
    Call = 0xA0,
    CallEx = 0xA1,
    CallDyn = 0xA2,
    CallTiny = 0xA3,
    CallTinyEx = 0xA4,
    Ret = 0xA5,
}

/// Extended (escaped two-byte) opcodes. None are assigned yet; the
/// space exists so new instructions never disturb the one-byte set.
/// On the wire an extended opcode is a big-endian u16 after the escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtOpcode {}

/// A decoded-but-unmapped opcode as it came off the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawOpcode {
    Primary(u8),
    Extended(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_encodings_decode() {
        assert_eq!(Opcode::from_u8(0x00), Some(Opcode::Nop));
        assert_eq!(Opcode::from_u8(0x01), Some(Opcode::Hlt));
        assert_eq!(Opcode::from_u8(0x32), Some(Opcode::AddImm));
        assert_eq!(Opcode::from_u8(0x85), Some(Opcode::Const));
        assert_eq!(Opcode::from_u8(0x97), Some(Opcode::Jmp));
        assert_eq!(Opcode::from_u8(0xA5), Some(Opcode::Ret));
    }

    #[test]
    fn unassigned_encodings_fail() {
        assert_eq!(Opcode::from_u8(0x06), None);
        assert_eq!(Opcode::from_u8(0x8F), None);
        assert_eq!(Opcode::from_u8(EXTENDED_ESCAPE), None);
    }

    #[test]
    fn discriminants_match_wire_bytes() {
        assert_eq!(Opcode::Const as u8, 0x85);
        assert_eq!(Opcode::Call as u8, 0xA0);
        assert_eq!(Opcode::FCmpGte0 as u8, 0x7F);
    }
}
