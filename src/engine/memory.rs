//! Access to the foreign engine's linear memory.
//!
//! The engine's socket callbacks describe buffers as an offset and a
//! length inside the engine's own address space. [`EngineMemory`] is the
//! seam the callback layer copies through; the host embedding the engine
//! implements it over the real linear memory, and tests implement it
//! over a plain byte slice.
//!
//! Every access is bounds-checked. An out-of-range region is reported as
//! a failed copy, never a panic, because the callback boundary turns it
//! into a numeric fault code.

// ============================================================================
// EngineMemory
// ============================================================================

/// Byte-addressable view of the engine's linear memory.
pub trait EngineMemory {
    /// Copies `len` bytes starting at `offset` out of the memory.
    ///
    /// Returns `None` if any part of the region is out of range.
    fn read_bytes(&self, offset: u32, len: u32) -> Option<Vec<u8>>;

    /// Copies `data` into the memory starting at `offset`.
    ///
    /// Returns `false` if any part of the region is out of range; the
    /// memory is unchanged in that case.
    fn write_bytes(&mut self, offset: u32, data: &[u8]) -> bool;
}

impl EngineMemory for [u8] {
    fn read_bytes(&self, offset: u32, len: u32) -> Option<Vec<u8>> {
        let start = offset as usize;
        let end = start.checked_add(len as usize)?;
        self.get(start..end).map(<[u8]>::to_vec)
    }

    fn write_bytes(&mut self, offset: u32, data: &[u8]) -> bool {
        let start = offset as usize;
        let Some(end) = start.checked_add(data.len()) else {
            return false;
        };
        match self.get_mut(start..end) {
            Some(region) => {
                region.copy_from_slice(data);
                true
            }
            None => false,
        }
    }
}

impl EngineMemory for Vec<u8> {
    fn read_bytes(&self, offset: u32, len: u32) -> Option<Vec<u8>> {
        self.as_slice().read_bytes(offset, len)
    }

    fn write_bytes(&mut self, offset: u32, data: &[u8]) -> bool {
        self.as_mut_slice().write_bytes(offset, data)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_within_bounds() {
        let memory = vec![10u8, 20, 30, 40, 50];
        assert_eq!(memory.read_bytes(1, 3), Some(vec![20, 30, 40]));
        assert_eq!(memory.read_bytes(0, 5), Some(vec![10, 20, 30, 40, 50]));
        assert_eq!(memory.read_bytes(5, 0), Some(Vec::new()));
    }

    #[test]
    fn test_read_out_of_bounds() {
        let memory = vec![0u8; 4];
        assert_eq!(memory.read_bytes(0, 5), None);
        assert_eq!(memory.read_bytes(4, 1), None);
        assert_eq!(memory.read_bytes(100, 1), None);
    }

    #[test]
    fn test_read_offset_overflow() {
        let memory = vec![0u8; 4];
        assert_eq!(memory.read_bytes(u32::MAX, u32::MAX), None);
    }

    #[test]
    fn test_write_within_bounds() {
        let mut memory = vec![0u8; 5];
        assert!(memory.write_bytes(1, &[7, 8, 9]));
        assert_eq!(memory, vec![0, 7, 8, 9, 0]);
    }

    #[test]
    fn test_write_out_of_bounds_leaves_memory_unchanged() {
        let mut memory = vec![1u8, 2, 3];
        assert!(!memory.write_bytes(2, &[9, 9]));
        assert_eq!(memory, vec![1, 2, 3]);
    }

    #[test]
    fn test_write_empty_always_succeeds_in_range() {
        let mut memory = vec![0u8; 2];
        assert!(memory.write_bytes(2, &[]));
        assert!(!memory.write_bytes(3, &[]));
    }
}
