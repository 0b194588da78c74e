//! Opcode handlers and the dispatch table.
//!
//! Handlers receive the VM and the active cursor and report one of
//! three outcomes. Operand-fetch failures return [`Outcome::Fatal`]
//! directly (the interpreter latches the decode-failure exit code);
//! handler-body failures latch the handler-failure code themselves
//! before returning `Fatal`, so the first latch wins.

use std::collections::HashMap;

use crate::binary::cursor::BytecodeCursor;
use crate::core::error::EXIT_HANDLER_FAILURE;
use crate::core::opcode::{Opcode, RawOpcode};
use crate::core::value::Value;

use super::call::invoke;
use super::vm::Vm;

/// What a handler tells the interpreter loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep fetching.
    Continue,
    /// End this activation normally (RET only).
    Return,
    /// Latch a failure exit code and end this activation.
    Fatal,
}

/// Handler signature shared by every opcode.
pub type DispatchFn = fn(&mut Vm, &mut BytecodeCursor) -> Outcome;

/// Opcode → handler mapping, built once per VM instance: a flat array
/// for the 256 primary slots and a map for the escaped u16 space.
pub struct DispatchTable {
    primary: [Option<DispatchFn>; 256],
    extended: HashMap<u16, DispatchFn>,
}

macro_rules! register {
    ($table:expr, { $($opcode:ident => $handler:ident),+ $(,)? }) => {
        $( $table.set(Opcode::$opcode, $handler); )+
    };
}

impl DispatchTable {
    pub fn new() -> Self {
        let mut table = Self {
            primary: [None; 256],
            extended: HashMap::new(),
        };

        register!(table, {
            // control
            Nop => nop,
            Hlt => hlt,
            Trap => trap,
            TrapIfZero => trap_if_zero,
            TrapIfNotZero => trap_if_not_zero,
            Brk => brk,

            // integer arithmetic
            Add => add, Add2 => add2, AddSt => add_st,
            AddImm => add_imm, AddImmSt => add_imm_st,
            Sub => sub, Sub2 => sub2, SubSt => sub_st,
            SubImm => sub_imm, SubImmSt => sub_imm_st,
            Mul => mul, Mul2 => mul2, MulSt => mul_st,
            MulImm => mul_imm, MulImmSt => mul_imm_st,
            Div => div, Div2 => div2, DivSt => div_st,
            DivImm => div_imm, DivImmSt => div_imm_st,
            Mod => rem, Mod2 => rem2, ModSt => rem_st,
            ModImm => rem_imm, ModImmSt => rem_imm_st,
            And => and, And2 => and2, AndSt => and_st,
            AndImm => and_imm, AndImmSt => and_imm_st,
            Or => or, Or2 => or2, OrSt => or_st,
            OrImm => or_imm, OrImmSt => or_imm_st,
            Xor => xor, Xor2 => xor2, XorSt => xor_st,
            XorImm => xor_imm, XorImmSt => xor_imm_st,
            Shl => shl, Shl2 => shl2, ShlSt => shl_st,
            ShlImm => shl_imm, ShlImmSt => shl_imm_st,
            Shr => shr, Shr2 => shr2, ShrSt => shr_st,
            ShrImm => shr_imm, ShrImmSt => shr_imm_st,
            Neg => neg, NegSt => neg_st,
            Not => not, NotSt => not_st,

            // float arithmetic
            FAdd => fadd, FAdd2 => fadd2, FAddSt => fadd_st,
            FAddImm => fadd_imm, FAddImmSt => fadd_imm_st,
            FSub => fsub, FSub2 => fsub2, FSubSt => fsub_st,
            FSubImm => fsub_imm, FSubImmSt => fsub_imm_st,
            FMul => fmul, FMul2 => fmul2, FMulSt => fmul_st,
            FMulImm => fmul_imm, FMulImmSt => fmul_imm_st,
            FDiv => fdiv, FDiv2 => fdiv2, FDivSt => fdiv_st,
            FDivImm => fdiv_imm, FDivImmSt => fdiv_imm_st,
            FNeg => fneg,

            // comparisons
            CmpEq => cmp_eq, CmpNe => cmp_ne,
            CmpLt => cmp_lt, CmpGt => cmp_gt,
            CmpLte => cmp_lte, CmpGte => cmp_gte,
            FCmpEq => fcmp_eq, FCmpNe => fcmp_ne,
            FCmpLt => fcmp_lt, FCmpGt => fcmp_gt,
            FCmpLte => fcmp_lte, FCmpGte => fcmp_gte,
            CmpEq0 => cmp_eq0, CmpNe0 => cmp_ne0,
            CmpLt0 => cmp_lt0, CmpGt0 => cmp_gt0,
            CmpLte0 => cmp_lte0, CmpGte0 => cmp_gte0,
            FCmpEq0 => fcmp_eq0, FCmpNe0 => fcmp_ne0,
            FCmpLt0 => fcmp_lt0, FCmpGt0 => fcmp_gt0,
            FCmpLte0 => fcmp_lte0, FCmpGte0 => fcmp_gte0,

            // transfers, constants, locals
            PushAcc => push_acc,
            PushSp => push_sp,
            PopAcc => pop_acc,
            PopSp => pop_sp,
            PopDiscard => pop_discard,
            Const => const8, Const32 => const32, Const64 => const64,
            ConstSt => const8_st, Const32St => const32_st, Const64St => const64_st,
            Load => load, LoadSt => load_st,
            Store => store, StoreSt => store_st,

            // branches
            Jmp => jmp,
            Jz => jz,
            Jnz => jnz,

            // calls
            Call => call,
            CallEx => call_ex,
            CallDyn => call_dyn,
            CallTiny => call_tiny,
            CallTinyEx => call_tiny_ex,
            Ret => ret,
        });

        // no extended opcodes are assigned yet
        table
    }

    fn set(&mut self, opcode: Opcode, handler: DispatchFn) {
        self.primary[opcode as u8 as usize] = Some(handler);
    }

    pub fn lookup(&self, raw: RawOpcode) -> Option<DispatchFn> {
        match raw {
            RawOpcode::Primary(byte) => self.primary[byte as usize],
            RawOpcode::Extended(value) => self.extended.get(&value).copied(),
        }
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Latch the handler-failure exit code and abort the activation.
fn fail(vm: &mut Vm) -> Outcome {
    vm.exit(EXIT_HANDLER_FAILURE);
    Outcome::Fatal
}

// ==================== control ====================

fn nop(_vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
    Outcome::Continue
}

// placeholder for a debugger hook
fn brk(_vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
    Outcome::Continue
}

fn hlt(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(code) = cursor.fetch_i8() else {
        return Outcome::Fatal;
    };
    vm.exit(code as i32);
    Outcome::Continue
}

fn trap(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(code) = cursor.fetch_u8() else {
        return Outcome::Fatal;
    };
    if vm.trap(code) {
        Outcome::Continue
    } else {
        fail(vm)
    }
}

fn trap_if_zero(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(code) = cursor.fetch_u8() else {
        return Outcome::Fatal;
    };
    if vm.acc().int() == 0 && !vm.trap(code) {
        return fail(vm);
    }
    Outcome::Continue
}

fn trap_if_not_zero(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(code) = cursor.fetch_u8() else {
        return Outcome::Fatal;
    };
    if vm.acc().int() != 0 && !vm.trap(code) {
        return fail(vm);
    }
    Outcome::Continue
}

// ==================== integer arithmetic ====================

// Add/sub/mul/neg wrap in two's complement. Division and modulo fail on
// a zero divisor and on i64::MIN / -1. Shift counts use the low 6 bits.

fn int_add(a: i64, b: i64) -> Option<i64> {
    Some(a.wrapping_add(b))
}

fn int_sub(a: i64, b: i64) -> Option<i64> {
    Some(a.wrapping_sub(b))
}

fn int_mul(a: i64, b: i64) -> Option<i64> {
    Some(a.wrapping_mul(b))
}

fn int_div(a: i64, b: i64) -> Option<i64> {
    if b == 0 || (a == i64::MIN && b == -1) {
        return None;
    }
    Some(a / b)
}

// truncating-division remainder: a - (a / b) * b
fn int_rem(a: i64, b: i64) -> Option<i64> {
    int_div(a, b).map(|q| a.wrapping_sub(q.wrapping_mul(b)))
}

fn int_and(a: i64, b: i64) -> Option<i64> {
    Some(a & b)
}

fn int_or(a: i64, b: i64) -> Option<i64> {
    Some(a | b)
}

fn int_xor(a: i64, b: i64) -> Option<i64> {
    Some(a ^ b)
}

fn int_shl(a: i64, b: i64) -> Option<i64> {
    Some(a.wrapping_shl((b & 63) as u32))
}

fn int_shr(a: i64, b: i64) -> Option<i64> {
    Some(a >> (b & 63))
}

fn int_result(vm: &mut Vm, result: Option<i64>) -> Outcome {
    match result {
        Some(value) => {
            vm.set_acc(Value::from(value));
            Outcome::Continue
        }
        None => fail(vm),
    }
}

macro_rules! int_family {
    ($op:path => $implicit:ident, $two:ident, $st:ident, $imm:ident, $imm_st:ident) => {
        /// Pop one operand, combine with the accumulator.
        fn $implicit(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
            let Some(rhs) = vm.pop() else { return fail(vm) };
            let lhs = vm.acc().int();
            int_result(vm, $op(lhs, rhs.int()))
        }

        /// Pop two operands, result in the accumulator.
        fn $two(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
            let Some(rhs) = vm.pop() else { return fail(vm) };
            let Some(lhs) = vm.pop() else { return fail(vm) };
            int_result(vm, $op(lhs.int(), rhs.int()))
        }

        /// Pop two operands, push the result.
        fn $st(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
            let Some(rhs) = vm.pop() else { return fail(vm) };
            let Some(lhs) = vm.pop() else { return fail(vm) };
            match $op(lhs.int(), rhs.int()) {
                Some(value) if vm.push(Value::from(value)) => Outcome::Continue,
                _ => fail(vm),
            }
        }

        /// Combine the accumulator with a 4-byte immediate.
        fn $imm(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
            let Some(imm) = cursor.fetch_i32() else {
                return Outcome::Fatal;
            };
            let lhs = vm.acc().int();
            int_result(vm, $op(lhs, imm as i64))
        }

        /// Combine the top-of-stack slot with a 4-byte immediate, in place.
        fn $imm_st(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
            let Some(imm) = cursor.fetch_i32() else {
                return Outcome::Fatal;
            };
            let index = vm.stack().sp() - 1;
            let Some(slot) = vm.stack().get(index) else { return fail(vm) };
            match $op(slot.int(), imm as i64) {
                Some(value) if vm.stack_mut().set(index, Value::from(value)) => {
                    Outcome::Continue
                }
                _ => fail(vm),
            }
        }
    };
}

int_family!(int_add => add, add2, add_st, add_imm, add_imm_st);
int_family!(int_sub => sub, sub2, sub_st, sub_imm, sub_imm_st);
int_family!(int_mul => mul, mul2, mul_st, mul_imm, mul_imm_st);
int_family!(int_div => div, div2, div_st, div_imm, div_imm_st);
int_family!(int_rem => rem, rem2, rem_st, rem_imm, rem_imm_st);
int_family!(int_and => and, and2, and_st, and_imm, and_imm_st);
int_family!(int_or => or, or2, or_st, or_imm, or_imm_st);
int_family!(int_xor => xor, xor2, xor_st, xor_imm, xor_imm_st);
int_family!(int_shl => shl, shl2, shl_st, shl_imm, shl_imm_st);
int_family!(int_shr => shr, shr2, shr_st, shr_imm, shr_imm_st);

macro_rules! int_unary {
    ($op:expr => $implicit:ident, $st:ident) => {
        fn $implicit(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
            let value = ($op)(vm.acc().int());
            vm.set_acc(Value::from(value));
            Outcome::Continue
        }

        /// Apply to the top-of-stack slot in place.
        fn $st(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
            let index = vm.stack().sp() - 1;
            let Some(slot) = vm.stack().get(index) else { return fail(vm) };
            let value = ($op)(slot.int());
            if vm.stack_mut().set(index, Value::from(value)) {
                Outcome::Continue
            } else {
                fail(vm)
            }
        }
    };
}

int_unary!(|a: i64| a.wrapping_neg() => neg, neg_st);
int_unary!(|a: i64| !a => not, not_st);

// ==================== float arithmetic ====================

fn float_add(a: f64, b: f64) -> f64 {
    a + b
}

fn float_sub(a: f64, b: f64) -> f64 {
    a - b
}

fn float_mul(a: f64, b: f64) -> f64 {
    a * b
}

// IEEE-754: division by zero yields an infinity, not a fault
fn float_div(a: f64, b: f64) -> f64 {
    a / b
}

macro_rules! float_family {
    ($op:path => $implicit:ident, $two:ident, $st:ident, $imm:ident, $imm_st:ident) => {
        fn $implicit(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
            let Some(rhs) = vm.pop() else { return fail(vm) };
            let value = $op(vm.acc().float(), rhs.float());
            vm.set_acc(Value::from(value));
            Outcome::Continue
        }

        fn $two(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
            let Some(rhs) = vm.pop() else { return fail(vm) };
            let Some(lhs) = vm.pop() else { return fail(vm) };
            vm.set_acc(Value::from($op(lhs.float(), rhs.float())));
            Outcome::Continue
        }

        fn $st(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
            let Some(rhs) = vm.pop() else { return fail(vm) };
            let Some(lhs) = vm.pop() else { return fail(vm) };
            if vm.push(Value::from($op(lhs.float(), rhs.float()))) {
                Outcome::Continue
            } else {
                fail(vm)
            }
        }

        /// Combine the accumulator with a 4-byte IEEE float immediate.
        fn $imm(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
            let Some(imm) = cursor.fetch_f32() else {
                return Outcome::Fatal;
            };
            let value = $op(vm.acc().float(), imm as f64);
            vm.set_acc(Value::from(value));
            Outcome::Continue
        }

        fn $imm_st(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
            let Some(imm) = cursor.fetch_f32() else {
                return Outcome::Fatal;
            };
            let index = vm.stack().sp() - 1;
            let Some(slot) = vm.stack().get(index) else { return fail(vm) };
            let value = $op(slot.float(), imm as f64);
            if vm.stack_mut().set(index, Value::from(value)) {
                Outcome::Continue
            } else {
                fail(vm)
            }
        }
    };
}

float_family!(float_add => fadd, fadd2, fadd_st, fadd_imm, fadd_imm_st);
float_family!(float_sub => fsub, fsub2, fsub_st, fsub_imm, fsub_imm_st);
float_family!(float_mul => fmul, fmul2, fmul_st, fmul_imm, fmul_imm_st);
float_family!(float_div => fdiv, fdiv2, fdiv_st, fdiv_imm, fdiv_imm_st);

fn fneg(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
    let value = -vm.acc().float();
    vm.set_acc(Value::from(value));
    Outcome::Continue
}

// ==================== comparisons ====================

// Pop-forms compare accumulator against the popped value; 0-forms
// compare the accumulator against literal zero without popping. The
// boolean result always lands in the accumulator.

macro_rules! compare {
    ($get:ident, $zero:expr, $op:expr => $pop_form:ident, $zero_form:ident) => {
        fn $pop_form(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
            let Some(rhs) = vm.pop() else { return fail(vm) };
            let lhs = vm.acc().$get();
            vm.set_acc(Value::from(($op)(lhs, rhs.$get())));
            Outcome::Continue
        }

        fn $zero_form(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
            let lhs = vm.acc().$get();
            vm.set_acc(Value::from(($op)(lhs, $zero)));
            Outcome::Continue
        }
    };
}

compare!(int, 0i64, |a, b| a == b => cmp_eq, cmp_eq0);
compare!(int, 0i64, |a, b| a != b => cmp_ne, cmp_ne0);
compare!(int, 0i64, |a, b| a < b => cmp_lt, cmp_lt0);
compare!(int, 0i64, |a, b| a > b => cmp_gt, cmp_gt0);
compare!(int, 0i64, |a, b| a <= b => cmp_lte, cmp_lte0);
compare!(int, 0i64, |a, b| a >= b => cmp_gte, cmp_gte0);
compare!(float, 0.0f64, |a, b| a == b => fcmp_eq, fcmp_eq0);
compare!(float, 0.0f64, |a, b| a != b => fcmp_ne, fcmp_ne0);
compare!(float, 0.0f64, |a, b| a < b => fcmp_lt, fcmp_lt0);
compare!(float, 0.0f64, |a, b| a > b => fcmp_gt, fcmp_gt0);
compare!(float, 0.0f64, |a, b| a <= b => fcmp_lte, fcmp_lte0);
compare!(float, 0.0f64, |a, b| a >= b => fcmp_gte, fcmp_gte0);

// ==================== transfers, constants, locals ====================

fn push_acc(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
    let value = vm.acc();
    if vm.push(value) {
        Outcome::Continue
    } else {
        fail(vm)
    }
}

fn push_sp(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
    let sp = vm.stack().sp();
    if vm.push(Value::from(sp)) {
        Outcome::Continue
    } else {
        fail(vm)
    }
}

fn pop_acc(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
    let Some(value) = vm.pop() else { return fail(vm) };
    vm.set_acc(value);
    Outcome::Continue
}

fn pop_sp(vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
    let Some(value) = vm.pop() else { return fail(vm) };
    if vm.stack_mut().set_sp(value.int()) {
        Outcome::Continue
    } else {
        fail(vm)
    }
}

fn pop_discard(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(count) = cursor.fetch_u8() else {
        return Outcome::Fatal;
    };
    let target = vm.stack().sp() - count as i64;
    if vm.stack_mut().set_sp(target) {
        Outcome::Continue
    } else {
        fail(vm)
    }
}

macro_rules! const_family {
    ($fetch:ident => $acc_form:ident, $st_form:ident) => {
        fn $acc_form(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
            let Some(value) = cursor.$fetch() else {
                return Outcome::Fatal;
            };
            vm.set_acc(Value::from(value as i64));
            Outcome::Continue
        }

        fn $st_form(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
            let Some(value) = cursor.$fetch() else {
                return Outcome::Fatal;
            };
            if vm.push(Value::from(value as i64)) {
                Outcome::Continue
            } else {
                fail(vm)
            }
        }
    };
}

const_family!(fetch_i8 => const8, const8_st);
const_family!(fetch_i32 => const32, const32_st);
const_family!(fetch_i64 => const64, const64_st);

// frame-local slot 0 sits immediately above the saved-base link
fn local_index(vm: &Vm, offset: i16) -> i64 {
    vm.stack().sb() + 1 + offset as i64
}

fn load(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(offset) = cursor.fetch_i16() else {
        return Outcome::Fatal;
    };
    let Some(value) = vm.stack().get(local_index(vm, offset)) else {
        return fail(vm);
    };
    vm.set_acc(value);
    Outcome::Continue
}

fn load_st(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(offset) = cursor.fetch_i16() else {
        return Outcome::Fatal;
    };
    let Some(value) = vm.stack().get(local_index(vm, offset)) else {
        return fail(vm);
    };
    if vm.push(value) {
        Outcome::Continue
    } else {
        fail(vm)
    }
}

fn store(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(offset) = cursor.fetch_i16() else {
        return Outcome::Fatal;
    };
    let index = local_index(vm, offset);
    let value = vm.acc();
    if vm.stack_mut().set(index, value) {
        Outcome::Continue
    } else {
        fail(vm)
    }
}

fn store_st(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(offset) = cursor.fetch_i16() else {
        return Outcome::Fatal;
    };
    let index = local_index(vm, offset);
    let Some(value) = vm.pop() else { return fail(vm) };
    if vm.stack_mut().set(index, value) {
        Outcome::Continue
    } else {
        fail(vm)
    }
}

// ==================== branches ====================

// Displacements are relative to the position just past the operand. A
// target outside the code section is malformed bytecode, not a handler
// failure.

fn jmp(_vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(displacement) = cursor.fetch_i16() else {
        return Outcome::Fatal;
    };
    if cursor.skip(displacement as i64) {
        Outcome::Continue
    } else {
        Outcome::Fatal
    }
}

fn jz(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(displacement) = cursor.fetch_i16() else {
        return Outcome::Fatal;
    };
    if vm.acc().bool_val() || cursor.skip(displacement as i64) {
        Outcome::Continue
    } else {
        Outcome::Fatal
    }
}

fn jnz(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(displacement) = cursor.fetch_i16() else {
        return Outcome::Fatal;
    };
    if !vm.acc().bool_val() || cursor.skip(displacement as i64) {
        Outcome::Continue
    } else {
        Outcome::Fatal
    }
}

// ==================== calls ====================

/// Shared body of every CALL variant: pop `argc` arguments, resolve the
/// target through the active module, open a frame sized for the
/// arguments plus the saved-base link, replay the arguments in their
/// original push order, run the callee, close the frame.
fn call_with(vm: &mut Vm, target_offset: u32, argc: usize) -> Outcome {
    let mut args = Vec::with_capacity(argc);
    for _ in 0..argc {
        let Some(value) = vm.pop() else { return fail(vm) };
        args.push(value);
    }

    let Some(target) = vm.get_callable(target_offset) else {
        return fail(vm);
    };

    if !vm.stack_mut().push_frame(argc + 1) {
        return fail(vm);
    }
    for value in args.into_iter().rev() {
        if !vm.push(value) {
            return fail(vm);
        }
    }

    invoke(vm, &target);
    if vm.has_exited() {
        return Outcome::Continue;
    }
    if vm.stack_mut().pop_frame() {
        Outcome::Continue
    } else {
        fail(vm)
    }
}

fn call(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(offset) = cursor.fetch_u32() else {
        return Outcome::Fatal;
    };
    let Some(argc) = cursor.fetch_u8() else {
        return Outcome::Fatal;
    };
    call_with(vm, offset, argc as usize)
}

fn call_ex(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(offset) = cursor.fetch_u32() else {
        return Outcome::Fatal;
    };
    let Some(argc) = cursor.fetch_u16() else {
        return Outcome::Fatal;
    };
    call_with(vm, offset, argc as usize)
}

/// Target offset comes from the accumulator instead of an operand.
fn call_dyn(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(argc) = cursor.fetch_u16() else {
        return Outcome::Fatal;
    };
    let offset = vm.acc().int() as u32;
    call_with(vm, offset, argc as usize)
}

fn call_tiny(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(offset) = cursor.fetch_u16() else {
        return Outcome::Fatal;
    };
    let Some(argc) = cursor.fetch_u8() else {
        return Outcome::Fatal;
    };
    call_with(vm, offset as u32, argc as usize)
}

fn call_tiny_ex(vm: &mut Vm, cursor: &mut BytecodeCursor) -> Outcome {
    let Some(offset) = cursor.fetch_u16() else {
        return Outcome::Fatal;
    };
    let Some(argc) = cursor.fetch_u16() else {
        return Outcome::Fatal;
    };
    call_with(vm, offset as u32, argc as usize)
}

fn ret(_vm: &mut Vm, _cursor: &mut BytecodeCursor) -> Outcome {
    Outcome::Return
}
