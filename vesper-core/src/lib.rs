//! Vesper Core - stack/accumulator-hybrid bytecode virtual machine
//!
//! Loads compiled binary modules, resolves cross-module symbolic calls
//! lazily, and executes instruction streams against a fixed-capacity
//! value arena. Pure logic: no file IO, and the only terminal output is
//! the mandated trap-0 print, routed through an injectable writer.
//!
//! Configuration is passed explicitly via [`VmConfig`], not global state.

pub mod binary;
pub mod core;
pub mod runtime;

// Re-export common types
pub use crate::core::error::{RegistrationError, EXIT_DECODE_FAILURE, EXIT_HANDLER_FAILURE, EXIT_REGISTRATION_FAILURE};
pub use crate::core::opcode::{ExtOpcode, Opcode, RawOpcode, EXTENDED_ESCAPE};
pub use crate::core::value::Value;
pub use binary::cursor::BytecodeCursor;
pub use binary::data::{CallEntry, UNRESOLVED};
pub use binary::image::{ImageError, ModuleImage};
pub use runtime::call::{CallableTarget, Function};
pub use runtime::module::{Module, ModuleHandle};
pub use runtime::vm::Vm;

// Re-export config types from vesper-config
pub use vesper_config::VmConfig;
