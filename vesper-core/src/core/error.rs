//! Error taxonomy and fixed exit codes.
//!
//! Out-of-bounds access never surfaces as an error type: every fallible
//! primitive returns `Option`/`bool` and handlers compose those with
//! early exit. Only host-facing registration gets a structured error.

use thiserror::Error;

/// Exit code latched when opcode decoding or dispatch lookup fails
/// (truncated operand, unknown primary or extended opcode).
pub const EXIT_DECODE_FAILURE: i32 = -1;

/// Exit code latched when a handler body fails (stack underflow or
/// overflow, unresolved call target, division by zero).
pub const EXIT_HANDLER_FAILURE: i32 = -2;

/// Exit code latched when module/function registration fails.
pub const EXIT_REGISTRATION_FAILURE: i32 = 1;

/// Registration failure. Also latches the VM's exit state, after which
/// every further mutating call is a no-op.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// A function with this name is already registered.
    #[error("duplicate function name: {0}")]
    DuplicateFunction(String),

    /// The VM has already exited; registration is inert.
    #[error("vm has exited with code {0}")]
    Exited(i32),
}
