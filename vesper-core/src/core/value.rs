//! Untagged 64-bit value.
//!
//! One slot holds a signed integer, an unsigned integer, or an IEEE-754
//! double in the same bits. There is no type tag: the executing opcode
//! decides which interpretation is valid, and each interpretation has its
//! own accessor pair so a mismatch is visible at the call site.

/// A raw 64-bit VM value. Booleans are the integer interpretation,
/// with zero = false and anything else = true.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Value(u64);

impl Value {
    /// The all-zero value, valid under every interpretation.
    pub const ZERO: Value = Value(0);

    /// Raw bit pattern.
    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn from_bits(bits: u64) -> Self {
        Value(bits)
    }

    // ==================== signed integer ====================

    pub fn int(self) -> i64 {
        self.0 as i64
    }

    pub fn set_int(&mut self, v: i64) {
        self.0 = v as u64;
    }

    // ==================== unsigned integer ====================

    pub fn uint(self) -> u64 {
        self.0
    }

    pub fn set_uint(&mut self, v: u64) {
        self.0 = v;
    }

    // ==================== double ====================

    pub fn float(self) -> f64 {
        f64::from_bits(self.0)
    }

    pub fn set_float(&mut self, v: f64) {
        self.0 = v.to_bits();
    }

    // ==================== boolean ====================

    /// Boolean interpretation of the integer bits.
    pub fn bool_val(self) -> bool {
        self.0 != 0
    }

    pub fn set_bool(&mut self, v: bool) {
        self.0 = v as u64;
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value(v as u64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value(v.to_bits())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value(v as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpretations_share_bits() {
        let mut v = Value::ZERO;
        v.set_int(-1);
        assert_eq!(v.uint(), u64::MAX);

        v.set_float(1.5);
        assert_eq!(v.bits(), 1.5f64.to_bits());
        assert_eq!(v.float(), 1.5);
    }

    #[test]
    fn boolean_is_integer_zero_test() {
        assert!(!Value::from(0i64).bool_val());
        assert!(Value::from(1i64).bool_val());
        assert!(Value::from(-7i64).bool_val());
    }

    #[test]
    fn from_impls_match_setters() {
        assert_eq!(Value::from(42i64).int(), 42);
        assert_eq!(Value::from(2.25f64).float(), 2.25);
        assert_eq!(Value::from(true).int(), 1);
    }
}
