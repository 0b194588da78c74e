//! Execution engine: value arena, modules, dispatch, interpreter, VM.

pub mod call;
pub mod dispatch;
pub mod interpreter;
pub mod module;
pub mod stack;
pub mod vm;
