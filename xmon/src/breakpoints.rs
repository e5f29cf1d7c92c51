/// How many breakpoints the monitor can hold (and display) at once
pub const MAX_BREAKPOINTS: usize = 10;

/// A fixed-capacity set of execution breakpoints. Breakpoints are plain
/// 16-bit addresses without a bank, so they fire no matter which bank is
/// currently mapped in.
///
/// Membership is a linear scan, enumeration follows insertion order.
#[derive(Clone)]
pub struct BreakpointStore<const N: usize = MAX_BREAKPOINTS> {
    addrs: [u16; N],
    len: usize,
}

impl<const N: usize> BreakpointStore<N> {
    pub fn new() -> Self {
        Self {
            addrs: [0; N],
            len: 0,
        }
    }

    /// Returns false only if the store is full and `addr` is not already in it.
    /// Adding an address twice is a no-op.
    pub fn add(&mut self, addr: u16) -> bool {
        if self.contains(addr) {
            return true;
        }

        if self.is_full() {
            return false;
        }

        self.addrs[self.len] = addr;
        self.len += 1;
        true
    }

    /// Returns false if `addr` wasn't a breakpoint. The last breakpoint takes
    /// the slot of the removed one.
    pub fn remove(&mut self, addr: u16) -> bool {
        match self.as_slice().iter().position(|bp| *bp == addr) {
            Some(idx) => {
                self.len -= 1;
                self.addrs[idx] = self.addrs[self.len];
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, addr: u16) -> bool {
        self.as_slice().contains(&addr)
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn count(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = u16> + '_ {
        self.as_slice().iter().copied()
    }

    fn as_slice(&self) -> &[u16] {
        &self.addrs[..self.len]
    }
}

impl<const N: usize> Default for BreakpointStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> std::fmt::Debug for BreakpointStore<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|bp| format!("{:#06X}", bp)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_remove() {
        let mut store = BreakpointStore::<8>::new();

        assert!(store.add(0x810D));
        assert!(store.contains(0x810D));
        assert_eq!(store.count(), 1);

        assert!(store.remove(0x810D));
        assert!(!store.contains(0x810D));
        assert!(store.is_empty());
    }

    #[test]
    fn add_is_idempotent() {
        let mut store = BreakpointStore::<8>::new();

        assert!(store.add(0x810D));
        assert!(store.add(0x810D));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn add_beyond_capacity_is_rejected() {
        let mut store = BreakpointStore::<8>::new();
        for addr in 0..8 {
            assert!(store.add(0x1000 + addr));
        }

        assert!(store.is_full());
        assert!(!store.add(0x2000));
        assert_eq!(store.count(), 8);
        assert!(!store.contains(0x2000));

        // Still fine for an address that is already present
        assert!(store.add(0x1003));
        assert_eq!(store.count(), 8);
    }

    #[test]
    fn remove_absent_fails() {
        let mut store = BreakpointStore::<8>::new();
        store.add(0x0400);

        assert!(!store.remove(0x0401));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn remove_keeps_the_rest() {
        let mut store = BreakpointStore::<4>::new();
        store.add(1);
        store.add(2);
        store.add(3);

        assert!(store.remove(1));

        let mut left: Vec<u16> = store.iter().collect();
        left.sort();
        assert_eq!(left, vec![2, 3]);
        assert!(store.add(4));
        assert!(store.add(5));
        assert!(store.is_full());
    }

    #[test]
    fn iterates_in_insertion_order() {
        let mut store = BreakpointStore::<4>::new();
        store.add(0xC000);
        store.add(0x0801);
        store.add(0xA000);

        assert_eq!(store.iter().collect::<Vec<_>>(), vec![0xC000, 0x0801, 0xA000]);
    }

    #[test]
    fn clear_empties() {
        let mut store: BreakpointStore = BreakpointStore::new();
        store.add(0x1234);
        store.add(0x4321);
        store.clear();

        assert_eq!(store.count(), 0);
        assert!(!store.contains(0x1234));
        assert_eq!(store.capacity(), MAX_BREAKPOINTS);
    }
}
