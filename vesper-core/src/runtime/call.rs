//! Callable identities and the call trampoline.

use crate::binary::cursor::BytecodeCursor;

use super::interpreter;
use super::module::ModuleHandle;
use super::vm::Vm;

/// A resolved call destination: a module handle plus an entry cursor
/// into that module's code section. Cheap to clone (the cursor shares
/// the module bytes).
#[derive(Debug, Clone)]
pub struct CallableTarget {
    pub module: ModuleHandle,
    pub entry: BytecodeCursor,
}

/// A named entry point in the VM's global symbol table.
#[derive(Debug, Clone)]
pub struct Function {
    pub module: ModuleHandle,
    pub name: String,
    pub address: u32,
}

/// Every call path (direct, dynamic, resolved through the data section)
/// funnels through this one indirection point. A future native-function
/// backend hooks in here without touching call-site code.
pub(crate) fn invoke(vm: &mut Vm, target: &CallableTarget) {
    interpreter::run_activation(vm, target.module, target.entry.clone());
}
