//! Test helpers: bytecode assembly, call-slot encoding, output capture.

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use vesper_core::{Module, Opcode, Vm, VmConfig, UNRESOLVED};

/// Shared buffer capturing everything trap 0 writes.
#[derive(Debug, Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writer(&self) -> Box<dyn Write> {
        Box::new(CaptureWriter(self.0.clone()))
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Chainable byte-stream assembler for code sections.
///
/// ```ignore
/// let code = Asm::new().op(Opcode::Const).i8(34).op(Opcode::Hlt).i8(0).build();
/// ```
#[derive(Debug, Default)]
pub struct Asm {
    bytes: Vec<u8>,
}

impl Asm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn op(mut self, opcode: Opcode) -> Self {
        self.bytes.push(opcode as u8);
        self
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.bytes.push(value);
        self
    }

    pub fn i8(self, value: i8) -> Self {
        self.u8(value as u8)
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.bytes.extend(value.to_be_bytes());
        self
    }

    pub fn i16(self, value: i16) -> Self {
        self.u16(value as u16)
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.bytes.extend(value.to_be_bytes());
        self
    }

    pub fn i32(self, value: i32) -> Self {
        self.u32(value as u32)
    }

    pub fn i64(mut self, value: i64) -> Self {
        self.bytes.extend(value.to_be_bytes());
        self
    }

    pub fn f32(self, value: f32) -> Self {
        self.u32(value.to_bits())
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// 16-byte unresolved call slot carrying an inline symbol name.
pub fn call_slot_named(name: &str) -> Vec<u8> {
    assert!(name.len() <= 8, "inline symbols are at most 8 bytes");
    let mut slot = Vec::with_capacity(16);
    slot.extend(UNRESOLVED.to_be_bytes());
    slot.extend(UNRESOLVED.to_be_bytes());
    let mut padded = [0u8; 8];
    padded[..name.len()].copy_from_slice(name.as_bytes());
    slot.extend(padded);
    slot
}

/// 16-byte unresolved call slot with an `@STR` string-table indirection.
pub fn call_slot_strtab(offset: u32) -> Vec<u8> {
    let mut slot = Vec::with_capacity(16);
    slot.extend(UNRESOLVED.to_be_bytes());
    slot.extend(UNRESOLVED.to_be_bytes());
    slot.extend(*b"@STR");
    slot.extend(offset.to_be_bytes());
    slot
}

/// 16-byte call slot with a known code address in the active module.
pub fn call_slot_local(address: u32) -> Vec<u8> {
    let mut slot = Vec::with_capacity(16);
    slot.extend(UNRESOLVED.to_be_bytes());
    slot.extend(address.to_be_bytes());
    slot.extend([0u8; 8]);
    slot
}

/// A string-table entry: big-endian u16 length prefix plus the bytes.
pub fn strtab_entry(s: &str) -> Vec<u8> {
    let mut out = (s.len() as u16).to_be_bytes().to_vec();
    out.extend_from_slice(s.as_bytes());
    out
}

/// A VM with a modest arena and captured trap output.
pub fn new_vm(capture: &Capture) -> Vm {
    let mut vm = Vm::new(VmConfig::with_stack_slots(256));
    vm.set_trap_writer(capture.writer());
    vm
}

/// Build a one-module VM, register `main` at code offset 0, run it.
/// Returns the latched exit code and everything trap 0 wrote.
pub fn run_module(data: &[u8], strtab: &[u8], code: &[u8]) -> (Option<i32>, String) {
    let capture = Capture::new();
    let mut vm = new_vm(&capture);
    let module = vm
        .add_module(Module::from_parts(data, strtab, code))
        .unwrap();
    vm.add_function("main", module, 0).unwrap();
    vm.call_by_name("main");
    (vm.exit_code(), capture.text())
}

/// Run a code-only program (empty data and string-table regions).
pub fn run_code(code: Vec<u8>) -> (Option<i32>, String) {
    run_module(&[], &[], &code)
}
