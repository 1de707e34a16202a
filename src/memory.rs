//! The per-VM Memory Context: globals and fixed-capacity integer arrays.
//!
//! All storage is a fixed-size array sized by `const` generic parameters
//! (§9 "static memory layout... prefer stack/arena allocation over heap").
//! Bounds are enforced on every access; an array row may be read or written
//! only after `create_array` has activated it (§3).

use crate::config::{VM_ARRAY_ELEMENTS, VM_MAX_ARRAYS, VM_MAX_GLOBALS};
use crate::error::{MemoryBoundsKind, VmError, VmResult};

/// Static, per-instance container for global scalars and array rows.
///
/// Type parameters default to the reference capacities from the
/// specification; a downstream build that needs the 128-global variant can
/// instantiate `MemoryContext::<128, 16, 64>::new()` instead of forking this
/// type.
#[derive(Clone)]
pub struct MemoryContext<
    const MAX_GLOBALS: usize = VM_MAX_GLOBALS,
    const MAX_ARRAYS: usize = VM_MAX_ARRAYS,
    const ARRAY_ELEMENTS: usize = VM_ARRAY_ELEMENTS,
> {
    globals: [i32; MAX_GLOBALS],
    arrays: [[i32; ARRAY_ELEMENTS]; MAX_ARRAYS],
    array_active: [bool; MAX_ARRAYS],
    array_sizes: [usize; MAX_ARRAYS],
    global_count: usize,
}

impl<const MAX_GLOBALS: usize, const MAX_ARRAYS: usize, const ARRAY_ELEMENTS: usize> Default
    for MemoryContext<MAX_GLOBALS, MAX_ARRAYS, ARRAY_ELEMENTS>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const MAX_GLOBALS: usize, const MAX_ARRAYS: usize, const ARRAY_ELEMENTS: usize>
    MemoryContext<MAX_GLOBALS, MAX_ARRAYS, ARRAY_ELEMENTS>
{
    /// Creates a zero-initialised memory context.
    pub fn new() -> Self {
        Self {
            globals: [0; MAX_GLOBALS],
            arrays: [[0; ARRAY_ELEMENTS]; MAX_ARRAYS],
            array_active: [false; MAX_ARRAYS],
            array_sizes: [0; MAX_ARRAYS],
            global_count: 0,
        }
    }

    /// Highest-written global id + 1. Purely informational (§3).
    pub fn global_count(&self) -> usize {
        self.global_count
    }

    /// Reads a global slot.
    pub fn load_global(&self, id: u8) -> VmResult<i32> {
        self.globals
            .get(id as usize)
            .copied()
            .ok_or(VmError::MemoryBounds {
                kind: MemoryBoundsKind::GlobalId,
                index: id as i64,
                limit: MAX_GLOBALS,
            })
    }

    /// Writes a global slot, updating `global_count` if this extends the
    /// highest-written id.
    pub fn store_global(&mut self, id: u8, value: i32) -> VmResult<()> {
        let slot = self.globals.get_mut(id as usize).ok_or(VmError::MemoryBounds {
            kind: MemoryBoundsKind::GlobalId,
            index: id as i64,
            limit: MAX_GLOBALS,
        })?;
        *slot = value;
        self.global_count = self.global_count.max(id as usize + 1);
        Ok(())
    }

    /// Activates array row `id` with the given logical `size`. Fails if the
    /// id is out of range, the size is zero or exceeds `ARRAY_ELEMENTS`, or
    /// the row is already active (§4.1).
    pub fn create_array(&mut self, id: u8, size: usize) -> VmResult<()> {
        if id as usize >= MAX_ARRAYS {
            return Err(VmError::MemoryBounds {
                kind: MemoryBoundsKind::ArrayId,
                index: id as i64,
                limit: MAX_ARRAYS,
            });
        }
        if size == 0 || size > ARRAY_ELEMENTS {
            return Err(VmError::MemoryBounds {
                kind: MemoryBoundsKind::ArraySize,
                index: size as i64,
                limit: ARRAY_ELEMENTS,
            });
        }
        if self.array_active[id as usize] {
            return Err(VmError::ArrayAlreadyExists { id });
        }
        self.array_active[id as usize] = true;
        self.array_sizes[id as usize] = size;
        self.arrays[id as usize] = [0; ARRAY_ELEMENTS];
        log::debug!("array {id} created with size {size}");
        Ok(())
    }

    /// Reads an array element. Fails if the row is inactive, the id is out
    /// of range, or `idx` is outside the row's declared size.
    pub fn load_array(&self, id: u8, idx: u16) -> VmResult<i32> {
        self.check_array_access(id, idx)?;
        Ok(self.arrays[id as usize][idx as usize])
    }

    /// Writes an array element. Same bounds rules as [`Self::load_array`].
    pub fn store_array(&mut self, id: u8, idx: u16, value: i32) -> VmResult<()> {
        self.check_array_access(id, idx)?;
        self.arrays[id as usize][idx as usize] = value;
        Ok(())
    }

    /// Bounds-checks `idx` against the row's own declared size from
    /// `create_array`, not the static `ARRAY_ELEMENTS` column count — a
    /// smaller declared array must reject indices the backing column would
    /// otherwise allow (§8 scenario 5).
    fn check_array_access(&self, id: u8, idx: u16) -> VmResult<()> {
        if id as usize >= MAX_ARRAYS {
            return Err(VmError::MemoryBounds {
                kind: MemoryBoundsKind::ArrayId,
                index: id as i64,
                limit: MAX_ARRAYS,
            });
        }
        if !self.array_active[id as usize] {
            return Err(VmError::MemoryBounds {
                kind: MemoryBoundsKind::ArrayInactive,
                index: id as i64,
                limit: MAX_ARRAYS,
            });
        }
        let declared_size = self.array_sizes[id as usize];
        if idx as usize >= declared_size {
            return Err(VmError::MemoryBounds {
                kind: MemoryBoundsKind::ArrayIndex,
                index: idx as i64,
                limit: declared_size,
            });
        }
        Ok(())
    }

    /// Whether array row `id` has been activated.
    pub fn is_array_active(&self, id: u8) -> bool {
        (id as usize) < MAX_ARRAYS && self.array_active[id as usize]
    }

    /// Zero-initialises all globals and arrays and clears every
    /// `array_active` flag. Called on VM reset and construction.
    pub fn reset(&mut self) {
        self.globals = [0; MAX_GLOBALS];
        self.arrays = [[0; ARRAY_ELEMENTS]; MAX_ARRAYS];
        self.array_active = [false; MAX_ARRAYS];
        self.array_sizes = [0; MAX_ARRAYS];
        self.global_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_read_your_writes() {
        let mut mem = MemoryContext::<64, 16, 64>::new();
        mem.store_global(5, 123).unwrap();
        assert_eq!(mem.load_global(5).unwrap(), 123);
        assert_eq!(mem.global_count(), 6);
    }

    #[test]
    fn global_out_of_range_is_memory_bounds() {
        let mem = MemoryContext::<64, 16, 64>::new();
        assert!(matches!(
            mem.load_global(64),
            Err(VmError::MemoryBounds { kind: MemoryBoundsKind::GlobalId, .. })
        ));
    }

    #[test]
    fn array_lifecycle() {
        let mut mem = MemoryContext::<64, 16, 64>::new();
        mem.create_array(2, 4).unwrap();
        assert!(mem.is_array_active(2));
        mem.store_array(2, 3, 99).unwrap();
        assert_eq!(mem.load_array(2, 3).unwrap(), 99);
    }

    #[test]
    fn array_double_create_fails() {
        let mut mem = MemoryContext::<64, 16, 64>::new();
        mem.create_array(2, 4).unwrap();
        assert!(matches!(
            mem.create_array(2, 4),
            Err(VmError::ArrayAlreadyExists { id: 2 })
        ));
    }

    #[test]
    fn array_out_of_bounds_index() {
        let mut mem = MemoryContext::<64, 16, 64>::new();
        mem.create_array(2, 4).unwrap();
        assert!(matches!(
            mem.load_array(2, 10),
            Err(VmError::MemoryBounds { kind: MemoryBoundsKind::ArrayIndex, .. })
        ));
    }

    /// A row's declared size, not the static column count, is the bound —
    /// idx=10 is well within `ARRAY_ELEMENTS` (64) but outside the size (4)
    /// passed to `create_array`.
    #[test]
    fn array_index_is_bounded_by_declared_size_not_column_count() {
        let mut mem = MemoryContext::<64, 16, 64>::new();
        mem.create_array(2, 4).unwrap();
        assert!(matches!(
            mem.store_array(2, 10, 1),
            Err(VmError::MemoryBounds { kind: MemoryBoundsKind::ArrayIndex, limit: 4, .. })
        ));
        assert!(mem.is_array_active(2));
    }

    #[test]
    fn array_access_before_create_fails() {
        let mem = MemoryContext::<64, 16, 64>::new();
        assert!(matches!(
            mem.load_array(2, 0),
            Err(VmError::MemoryBounds { kind: MemoryBoundsKind::ArrayInactive, .. })
        ));
    }

    #[test]
    fn reset_clears_everything() {
        let mut mem = MemoryContext::<64, 16, 64>::new();
        mem.store_global(0, 42).unwrap();
        mem.create_array(0, 4).unwrap();
        mem.store_array(0, 0, 7).unwrap();
        mem.reset();
        assert_eq!(mem.load_global(0).unwrap(), 0);
        assert!(!mem.is_array_active(0));
        assert_eq!(mem.global_count(), 0);
    }
}
