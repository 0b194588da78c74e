//! Vesper Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! Configuration is passed explicitly to the VM at construction; nothing
//! here reads files or environment variables.

use serde::{Deserialize, Serialize};

/// Default value-stack capacity in slots.
///
/// 0x100000 slots at 8 bytes per slot is an 8 MiB arena.
pub const DEFAULT_STACK_SLOTS: usize = 0x100000;

/// Configuration for one VM instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmConfig {
    /// Value-stack capacity in slots (one slot = one 64-bit value).
    pub stack_slots: usize,
    /// Reserved host-interaction restriction flag. Carried but not yet
    /// exercised by any core behavior.
    pub sandbox: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            stack_slots: DEFAULT_STACK_SLOTS,
            sandbox: false,
        }
    }
}

impl VmConfig {
    /// Config with an explicit stack capacity.
    pub fn with_stack_slots(stack_slots: usize) -> Self {
        Self {
            stack_slots,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_8mib_arena() {
        let config = VmConfig::default();
        assert_eq!(config.stack_slots, 0x100000);
        assert!(!config.sandbox);
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = VmConfig::with_stack_slots(64);
        let json = serde_json::to_string(&config).unwrap();
        let back: VmConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.stack_slots, 64);
    }
}
