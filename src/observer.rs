//! The Observer Surface: non-owning hooks notified of engine lifecycle
//! events (§4.5). Observers run in insertion order and are not permitted to
//! re-enter the VM from within a callback (§9).

use std::collections::BTreeMap;

/// Hooks a host can register to observe VM execution without participating
/// in it. Default method bodies do nothing, so an observer only needs to
/// implement the events it cares about.
pub trait Observer {
    /// Called immediately after an instruction retires successfully.
    fn on_instruction_executed(&mut self, _pc: usize, _opcode: u8, _operand: u16) {}

    /// Called once execution stops, whether by `HALT` or by error.
    fn on_execution_complete(&mut self, _instructions_executed: u64, _elapsed_ms: u64) {}

    /// Called when the VM is reset.
    fn on_vm_reset(&mut self) {}
}

/// Collection of observer handles notified in registration order.
///
/// Observers are keyed by a monotonically increasing handle rather than
/// stored in a plain `Vec`, so removal is by identity (§9): removing one
/// handle never shifts or invalidates any other handle a caller still
/// holds. A `BTreeMap` keeps iteration in key order, which is insertion
/// order since handles only increase.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: BTreeMap<usize, Box<dyn Observer>>,
    next_handle: usize,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer`, returning a handle usable with
    /// [`Self::remove`]. Handles are never reused.
    pub fn add(&mut self, observer: Box<dyn Observer>) -> usize {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.observers.insert(handle, observer);
        handle
    }

    /// Removes the observer registered under `handle`, if still present.
    /// No-op if it was already removed or never existed.
    pub fn remove(&mut self, handle: usize) {
        self.observers.remove(&handle);
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub(crate) fn notify_instruction_executed(&mut self, pc: usize, opcode: u8, operand: u16) {
        for observer in self.observers.values_mut() {
            observer.on_instruction_executed(pc, opcode, operand);
        }
    }

    pub(crate) fn notify_execution_complete(&mut self, instructions_executed: u64, elapsed_ms: u64) {
        for observer in self.observers.values_mut() {
            observer.on_execution_complete(instructions_executed, elapsed_ms);
        }
    }

    pub(crate) fn notify_vm_reset(&mut self) {
        for observer in self.observers.values_mut() {
            observer.on_vm_reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingObserver {
        instructions_seen: usize,
        completions_seen: usize,
        resets_seen: usize,
    }

    impl Observer for RecordingObserver {
        fn on_instruction_executed(&mut self, _pc: usize, _opcode: u8, _operand: u16) {
            self.instructions_seen += 1;
        }

        fn on_execution_complete(&mut self, _instructions_executed: u64, _elapsed_ms: u64) {
            self.completions_seen += 1;
        }

        fn on_vm_reset(&mut self) {
            self.resets_seen += 1;
        }
    }

    #[test]
    fn notifications_reach_every_registered_observer() {
        let mut registry = ObserverRegistry::new();
        registry.add(Box::new(RecordingObserver::default()));
        registry.add(Box::new(RecordingObserver::default()));

        registry.notify_instruction_executed(0, 0x00, 0);
        registry.notify_execution_complete(1, 0);
        registry.notify_vm_reset();

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn removing_a_handle_stops_further_notifications() {
        let mut registry = ObserverRegistry::new();
        let handle = registry.add(Box::new(RecordingObserver::default()));
        registry.remove(handle);
        assert!(registry.is_empty());
    }

    /// Removing an earlier handle must not shift or misdirect a later one —
    /// removal is by identity, not by position.
    #[test]
    fn removing_an_earlier_handle_leaves_later_handles_addressable() {
        struct CountingObserver(usize);
        impl Observer for CountingObserver {
            fn on_vm_reset(&mut self) {
                self.0 += 1;
            }
        }

        let mut registry = ObserverRegistry::new();
        let first = registry.add(Box::new(CountingObserver(0)));
        let second = registry.add(Box::new(CountingObserver(0)));
        let third = registry.add(Box::new(CountingObserver(0)));

        registry.remove(first);
        assert_eq!(registry.len(), 2);

        // `second`'s handle must still refer to the observer registered
        // second, not to whatever now occupies that slot after a shift.
        registry.remove(second);
        assert_eq!(registry.len(), 1);

        registry.notify_vm_reset();
        registry.remove(third);
        assert!(registry.is_empty());
    }
}
