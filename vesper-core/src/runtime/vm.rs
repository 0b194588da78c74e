//! VM façade: registration, registers, traps, the exit latch.

use std::collections::HashMap;
use std::io::{self, Write};

use tracing::debug;
use vesper_config::VmConfig;

use crate::binary::data::{resolve_symbol, UNRESOLVED};
use crate::core::error::{RegistrationError, EXIT_REGISTRATION_FAILURE};
use crate::core::value::Value;

use super::call::{self, CallableTarget, Function};
use super::dispatch::DispatchTable;
use super::module::{Module, ModuleHandle};
use super::stack::Stack;

/// One virtual machine instance.
///
/// Single-threaded by construction: nothing here is shared, and
/// separate instances may run on separate threads without
/// synchronization. Once the exit state latches, every further mutating
/// operation is a no-op failure; the latch never clears for the
/// lifetime of the instance.
pub struct Vm {
    config: VmConfig,
    stack: Stack,
    dispatch: DispatchTable,
    modules: Vec<Module>,
    functions: HashMap<String, Function>,
    acc: Value,
    exit_state: Option<i32>,
    active_module: ModuleHandle,
    trap_writer: Box<dyn Write>,
}

impl Vm {
    /// Build a VM with an arena of `config.stack_slots` values. Trap
    /// output goes to stdout until a writer is injected.
    pub fn new(config: VmConfig) -> Self {
        Self {
            stack: Stack::new(config.stack_slots),
            config,
            dispatch: DispatchTable::new(),
            modules: Vec::new(),
            functions: HashMap::new(),
            acc: Value::ZERO,
            exit_state: None,
            active_module: 0,
            trap_writer: Box::new(io::stdout()),
        }
    }

    /// Redirect trap output (tests, embedding hosts).
    pub fn set_trap_writer(&mut self, writer: Box<dyn Write>) {
        self.trap_writer = writer;
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    // ==================== registration ====================

    /// Register a module; its handle is its index in registration order.
    pub fn add_module(&mut self, module: Module) -> Result<ModuleHandle, RegistrationError> {
        if let Some(code) = self.exit_state {
            return Err(RegistrationError::Exited(code));
        }
        let handle = self.modules.len() as ModuleHandle;
        self.modules.push(module);
        debug!(handle, "module registered");
        Ok(handle)
    }

    /// Register a named entry point. A duplicate name is fatal: it
    /// latches the registration-failure exit code.
    pub fn add_function(
        &mut self,
        name: &str,
        module: ModuleHandle,
        address: u32,
    ) -> Result<(), RegistrationError> {
        if let Some(code) = self.exit_state {
            return Err(RegistrationError::Exited(code));
        }
        if self.functions.contains_key(name) {
            self.exit(EXIT_REGISTRATION_FAILURE);
            return Err(RegistrationError::DuplicateFunction(name.to_owned()));
        }
        self.functions.insert(
            name.to_owned(),
            Function {
                module,
                name: name.to_owned(),
                address,
            },
        );
        debug!(name, module, address, "function registered");
        Ok(())
    }

    pub fn module(&self, handle: ModuleHandle) -> Option<&Module> {
        self.modules.get(handle as usize)
    }

    /// Resolve a registered function to a callable target. `None` when
    /// the name is unknown or its entry offset is out of range.
    pub fn function_target(&self, name: &str) -> Option<CallableTarget> {
        let function = self.functions.get(name)?;
        let module = self.modules.get(function.module as usize)?;
        let entry = module.code().cursor_at(function.address as usize)?;
        Some(CallableTarget {
            module: function.module,
            entry,
        })
    }

    // ==================== execution ====================

    /// Run an activation on `target`, with the target's module as the
    /// active module for any resolution it performs. No-op once exited.
    pub fn call(&mut self, target: &CallableTarget) {
        if self.exit_state.is_some() {
            return;
        }
        call::invoke(self, target);
    }

    /// Look up a function by name and run it. `false` when the VM has
    /// exited or the name is not registered.
    pub fn call_by_name(&mut self, name: &str) -> bool {
        if self.exit_state.is_some() {
            return false;
        }
        let Some(target) = self.function_target(name) else {
            return false;
        };
        call::invoke(self, &target);
        true
    }

    /// Resolve-once, cache-forever lookup of the call slot at `offset`
    /// in the active module's data section.
    pub(crate) fn get_callable(&mut self, offset: u32) -> Option<CallableTarget> {
        let active = self.active_module as usize;

        if let Some(target) = self.modules.get(active)?.cached_call(offset) {
            return Some(target.clone());
        }

        let module = self.modules.get(active)?;
        let entry = module.data().call_entry(offset)?;
        if entry.module != UNRESOLVED {
            // a linked entry must already be cached
            debug!(offset, entry_module = entry.module, "call slot linked but not cached");
            return None;
        }

        let target = if entry.address == UNRESOLVED {
            let name_bytes = entry.name?;
            let name = resolve_symbol(&name_bytes, &module.strtab())?;
            let function = self.functions.get(&name)?;
            let callee = self.modules.get(function.module as usize)?;
            let entry_cursor = callee.code().cursor_at(function.address as usize)?;
            debug!(offset, name = %name, callee = function.module, "call target resolved by name");
            CallableTarget {
                module: function.module,
                entry: entry_cursor,
            }
        } else {
            let entry_cursor = module.code().cursor_at(entry.address as usize)?;
            debug!(offset, address = entry.address, "call target resolved in active module");
            CallableTarget {
                module: self.active_module,
                entry: entry_cursor,
            }
        };

        self.modules
            .get_mut(active)?
            .cache_call(offset, target.clone());
        Some(target)
    }

    // ==================== registers and stack ====================

    pub fn acc(&self) -> Value {
        self.acc
    }

    pub fn set_acc(&mut self, value: Value) {
        self.acc = value;
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub(crate) fn stack_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }

    /// Push onto the live stack; fails once exited or at capacity.
    pub fn push(&mut self, value: Value) -> bool {
        if self.exit_state.is_some() {
            return false;
        }
        self.stack.push(value)
    }

    /// Pop from the live stack; fails once exited or at the frame floor.
    pub fn pop(&mut self) -> Option<Value> {
        if self.exit_state.is_some() {
            return None;
        }
        self.stack.pop()
    }

    // ==================== traps and exit ====================

    /// Invoke the trap hook. Code 0 writes the accumulator's signed
    /// integer value and a newline; other codes are host extension
    /// points and currently do nothing.
    pub fn trap(&mut self, code: u8) -> bool {
        if self.exit_state.is_some() {
            return false;
        }
        match code {
            0 => {
                let value = self.acc.int();
                writeln!(self.trap_writer, "{value}").is_ok()
            }
            other => {
                debug!(code = other, "unhandled trap code");
                true
            }
        }
    }

    /// Latch the exit state. The first call wins; later calls are no-ops.
    pub fn exit(&mut self, code: i32) {
        if self.exit_state.is_none() {
            debug!(code, "exit latched");
            self.exit_state = Some(code);
        }
    }

    pub fn has_exited(&self) -> bool {
        self.exit_state.is_some()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_state
    }

    // ==================== interpreter plumbing ====================

    pub(crate) fn dispatch(&self) -> &DispatchTable {
        &self.dispatch
    }

    pub fn active_module(&self) -> ModuleHandle {
        self.active_module
    }

    pub(crate) fn set_active_module(&mut self, handle: ModuleHandle) -> ModuleHandle {
        std::mem::replace(&mut self.active_module, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm() -> Vm {
        Vm::new(VmConfig::with_stack_slots(64))
    }

    #[test]
    fn duplicate_function_latches_registration_failure() {
        let mut vm = vm();
        let module = vm.add_module(Module::from_parts(&[], &[], &[0xA5])).unwrap();
        vm.add_function("main", module, 0).unwrap();

        let err = vm.add_function("main", module, 0).unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateFunction("main".into()));
        assert_eq!(vm.exit_code(), Some(EXIT_REGISTRATION_FAILURE));

        // further mutation is inert
        assert_eq!(
            vm.add_module(Module::from_parts(&[], &[], &[])),
            Err(RegistrationError::Exited(EXIT_REGISTRATION_FAILURE))
        );
        assert!(!vm.push(Value::from(1i64)));
        assert!(!vm.call_by_name("main"));
    }

    #[test]
    fn exit_is_first_call_wins() {
        let mut vm = vm();
        vm.exit(7);
        vm.exit(9);
        assert_eq!(vm.exit_code(), Some(7));
    }

    #[test]
    fn module_handles_are_registration_order() {
        let mut vm = vm();
        let a = vm.add_module(Module::from_parts(&[], &[], &[])).unwrap();
        let b = vm.add_module(Module::from_parts(&[], &[], &[])).unwrap();
        assert_eq!((a, b), (0, 1));
        assert!(vm.module(b).is_some());
        assert!(vm.module(2).is_none());
    }

    #[test]
    fn function_target_requires_in_range_entry() {
        let mut vm = vm();
        let module = vm.add_module(Module::from_parts(&[], &[], &[0xA5])).unwrap();
        vm.add_function("ok", module, 0).unwrap();
        vm.add_function("past_end", module, 9).unwrap();

        assert!(vm.function_target("ok").is_some());
        assert!(vm.function_target("past_end").is_none());
        assert!(vm.function_target("missing").is_none());
    }
}
