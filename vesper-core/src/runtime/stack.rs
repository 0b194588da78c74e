//! Value arena and frame model.
//!
//! One flat preallocated array of values plus two registers: `base`
//! (index of the slot holding the previous frame's saved base, −1 at
//! the bottom) and `pointer` (next free slot). A frame is not a heap
//! object; it is the region `[base+1, pointer)` together with the
//! saved-base link at `base`. Frame open/close is O(1) and touches no
//! allocator.
//!
//! Invariant at every instruction boundary:
//! `NO_FRAME <= base < pointer <= capacity`.

use crate::core::value::Value;

/// Bottom sentinel for the `base` register.
pub const NO_FRAME: i64 = -1;

/// Fixed-capacity value stack.
#[derive(Debug)]
pub struct Stack {
    slots: Box<[Value]>,
    base: i64,
    pointer: i64,
}

impl Stack {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Value::ZERO; capacity].into_boxed_slice(),
            base: NO_FRAME,
            pointer: 0,
        }
    }

    pub fn capacity(&self) -> i64 {
        self.slots.len() as i64
    }

    /// The saved-base register.
    pub fn sb(&self) -> i64 {
        self.base
    }

    /// The stack-pointer register (next free slot).
    pub fn sp(&self) -> i64 {
        self.pointer
    }

    /// Overwrite the stack pointer. Rejected when the value would break
    /// the frame invariant (`base < sp <= capacity`).
    pub fn set_sp(&mut self, sp: i64) -> bool {
        if sp <= self.base || sp > self.capacity() {
            return false;
        }
        self.pointer = sp;
        true
    }

    /// Whether `index` is a legal slot of the current frame: strictly
    /// above the saved-base link and below capacity.
    pub fn in_bounds(&self, index: i64) -> bool {
        index > self.base && index < self.capacity()
    }

    pub fn get(&self, index: i64) -> Option<Value> {
        if !self.in_bounds(index) {
            return None;
        }
        Some(self.slots[index as usize])
    }

    pub fn set(&mut self, index: i64, value: Value) -> bool {
        if !self.in_bounds(index) {
            return false;
        }
        self.slots[index as usize] = value;
        true
    }

    /// Push onto the current frame; fails at capacity.
    pub fn push(&mut self, value: Value) -> bool {
        if !self.in_bounds(self.pointer) {
            return false;
        }
        self.slots[self.pointer as usize] = value;
        self.pointer += 1;
        true
    }

    /// Pop from the current frame; fails at the frame floor.
    pub fn pop(&mut self) -> Option<Value> {
        let index = self.pointer - 1;
        if !self.in_bounds(index) {
            return None;
        }
        self.pointer = index;
        Some(self.slots[index as usize])
    }

    /// Open a frame with room for at least `min_size` values. On
    /// failure nothing changes. The current `base` is saved into the
    /// slot the frame opens from.
    pub fn push_frame(&mut self, min_size: usize) -> bool {
        if self.pointer + min_size as i64 > self.capacity() {
            return false;
        }
        // the saved-base link needs a slot of its own
        if self.pointer >= self.capacity() {
            return false;
        }
        self.slots[self.pointer as usize] = Value::from(self.base);
        self.base = self.pointer;
        self.pointer += 1;
        true
    }

    /// Close the current frame, restoring the previous `base` from its
    /// saved link. Fails at the bottom frame.
    pub fn pop_frame(&mut self) -> bool {
        if self.base == NO_FRAME {
            return false;
        }
        self.pointer = self.base;
        self.base = self.slots[self.base as usize].int();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_open_close_restores_registers() {
        let mut stack = Stack::new(16);
        assert!(stack.push_frame(0));
        let (sb, sp) = (stack.sb(), stack.sp());

        assert!(stack.push_frame(3));
        assert!(stack.push(Value::from(1i64)));
        assert!(stack.pop_frame());

        assert_eq!(stack.sb(), sb);
        assert_eq!(stack.sp(), sp);
    }

    #[test]
    fn nested_frames_unwind_in_order() {
        let mut stack = Stack::new(16);
        for _ in 0..4 {
            assert!(stack.push_frame(0));
        }
        for _ in 0..4 {
            assert!(stack.pop_frame());
        }
        assert_eq!(stack.sb(), NO_FRAME);
        assert_eq!(stack.sp(), 0);
        assert!(!stack.pop_frame());
    }

    #[test]
    fn push_frame_past_capacity_fails_without_mutation() {
        let mut stack = Stack::new(4);
        assert!(stack.push_frame(0));
        let (sb, sp) = (stack.sb(), stack.sp());

        assert!(!stack.push_frame(8));
        assert_eq!(stack.sb(), sb);
        assert_eq!(stack.sp(), sp);
    }

    #[test]
    fn push_frame_needs_a_link_slot() {
        let mut stack = Stack::new(2);
        assert!(stack.push_frame(0));
        assert!(stack.push(Value::from(1i64)));
        // arena full: no room for another saved-base link
        assert!(!stack.push_frame(0));
    }

    #[test]
    fn push_pop_respect_frame_floor() {
        let mut stack = Stack::new(8);
        assert!(stack.push_frame(0));
        assert!(stack.pop().is_none());

        assert!(stack.push(Value::from(7i64)));
        assert_eq!(stack.pop().map(Value::int), Some(7));
        assert!(stack.pop().is_none());
    }

    #[test]
    fn slot_access_is_frame_bounded() {
        let mut stack = Stack::new(8);
        assert!(stack.push_frame(0));
        assert!(stack.push(Value::from(5i64)));

        let local0 = stack.sb() + 1;
        assert_eq!(stack.get(local0).map(Value::int), Some(5));
        assert!(!stack.set(stack.sb(), Value::ZERO));
        assert!(stack.get(stack.capacity()).is_none());
        assert!(stack.get(NO_FRAME).is_none());
    }

    #[test]
    fn set_sp_is_invariant_checked() {
        let mut stack = Stack::new(8);
        assert!(stack.push_frame(0));
        assert!(stack.set_sp(4));
        assert_eq!(stack.sp(), 4);
        assert!(!stack.set_sp(stack.sb()));
        assert!(!stack.set_sp(9));
        assert!(stack.set_sp(stack.capacity()));
    }

    #[test]
    fn stores_survive_inner_frames() {
        let mut stack = Stack::new(16);
        assert!(stack.push_frame(0));
        assert!(stack.push(Value::from(42i64)));
        let slot = stack.sb() + 1;

        assert!(stack.push_frame(0));
        assert!(stack.push(Value::from(9i64)));
        // inner frame cannot see the outer slot
        assert!(stack.get(slot).is_none());
        assert!(stack.pop_frame());

        assert_eq!(stack.get(slot).map(Value::int), Some(42));
    }
}
