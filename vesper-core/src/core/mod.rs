//! Core vocabulary: values, opcodes, error taxonomy.

pub mod error;
pub mod opcode;
pub mod value;
