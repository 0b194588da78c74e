//! Fetch/decode/execute loop.
//!
//! One call to [`run_activation`] drives one activation: it runs until
//! RET, a fatal condition, or a latched exit. Nested calls recurse
//! through the trampoline while this activation's cursor stays
//! suspended on the host stack, so VM call depth is bounded by host
//! stack depth, not by the value arena's capacity.

use crate::binary::cursor::BytecodeCursor;
use crate::core::error::EXIT_DECODE_FAILURE;

use super::dispatch::Outcome;
use super::module::ModuleHandle;
use super::vm::Vm;

/// Run `cursor` to completion with `module` as the active module for
/// any call resolution performed along the way. The caller's active
/// module is restored on the way out.
pub(crate) fn run_activation(vm: &mut Vm, module: ModuleHandle, mut cursor: BytecodeCursor) {
    let caller_module = vm.set_active_module(module);

    while !vm.has_exited() {
        let Some(raw) = cursor.fetch_opcode() else {
            // truncated opcode, or the stream ran out without RET/HLT
            vm.exit(EXIT_DECODE_FAILURE);
            break;
        };
        let Some(handler) = vm.dispatch().lookup(raw) else {
            vm.exit(EXIT_DECODE_FAILURE);
            break;
        };

        #[cfg(feature = "trace_execution")]
        tracing::trace!(module, position = cursor.position(), opcode = ?raw, "dispatch");

        match handler(vm, &mut cursor) {
            Outcome::Continue => {}
            Outcome::Return => break,
            Outcome::Fatal => {
                // no-op when the handler already latched its own code
                vm.exit(EXIT_DECODE_FAILURE);
                break;
            }
        }
    }

    vm.set_active_module(caller_module);
}
