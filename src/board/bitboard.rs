//! Bitboard implementation for per-side occupancy

/// Bitboard sized at construction for one board geometry.
/// Bit `i` corresponds to the column-major cell index `i`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bitboard {
    bits: Vec<u64>,
}

impl Bitboard {
    /// Create an empty bitboard able to hold `cells` bits
    pub fn new(cells: usize) -> Self {
        Self {
            bits: vec![0; cells.div_ceil(64)],
        }
    }

    /// Set a bit at index
    #[inline]
    pub fn set(&mut self, idx: usize) {
        self.bits[idx / 64] |= 1u64 << (idx % 64);
    }

    /// Check if bit is set at index
    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        (self.bits[idx / 64] >> (idx % 64)) & 1 == 1
    }

    /// Count total set bits (popcount)
    #[inline]
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|b| b.count_ones()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitboard_set_get() {
        let mut bb = Bitboard::new(80);
        assert_eq!(bb.count(), 0);

        bb.set(0);
        bb.set(63);
        bb.set(64);
        bb.set(79);
        assert!(bb.get(0));
        assert!(bb.get(63));
        assert!(bb.get(64));
        assert!(bb.get(79));
        assert!(!bb.get(1));
        assert_eq!(bb.count(), 4);
    }

    #[test]
    fn test_bitboard_zero_cells() {
        let bb = Bitboard::new(0);
        assert_eq!(bb.count(), 0);
    }
}
