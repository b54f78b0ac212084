use crate::CoreAddr;

/// Match configuration recognised by the core and its driver.
///
/// Constructed with [`MarsProperties::default`] (the classic '94 hill
/// settings) or [`MarsProperties::with_core_size`], then adjusted with the
/// chainable setters:
///
/// ```
/// # use mars_core::MarsProperties;
/// let props = MarsProperties::with_core_size(200).max_cycles(1_000);
/// assert_eq!(props.core_size, 200);
/// assert_eq!(props.read_dist, 200);
/// assert_eq!(props.max_cycles, 1_000);
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub struct MarsProperties {
    /// Memory length and the modulus for all address and field arithmetic
    pub core_size: CoreAddr,

    /// Tick cap consulted by the match driver before declaring a stalemate
    pub max_cycles: u64,

    /// Cap on simultaneous threads per warrior.  `SPL` beyond the cap only
    /// queues the next instruction.
    pub max_processes: usize,

    /// Maximum number of instructions in one warrior
    pub max_length: usize,

    /// Minimum separation between warrior load bases
    pub min_distance: CoreAddr,

    /// Read window size.  Equal to `core_size` when reads are unlimited,
    /// which is the only behavior this evaluator implements.
    pub read_dist: CoreAddr,

    /// Write window size, carried with the same caveat as `read_dist`
    pub write_dist: CoreAddr,
}

impl MarsProperties {
    /// Properties for a core of `core_size` cells with unlimited read/write
    /// windows and every other option at its default
    #[must_use]
    pub const fn with_core_size(core_size: CoreAddr) -> Self {
        Self {
            core_size,
            max_cycles: 80_000,
            max_processes: 8_000,
            max_length: 100,
            min_distance: 100,
            read_dist: core_size,
            write_dist: core_size,
        }
    }

    /// Replace the tick cap
    #[must_use]
    pub const fn max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Replace the per-warrior thread cap
    #[must_use]
    pub const fn max_processes(mut self, max_processes: usize) -> Self {
        self.max_processes = max_processes;
        self
    }

    /// Replace the per-warrior instruction cap
    #[must_use]
    pub const fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Replace the minimum load separation
    #[must_use]
    pub const fn min_distance(mut self, min_distance: CoreAddr) -> Self {
        self.min_distance = min_distance;
        self
    }
}

impl Default for MarsProperties {
    /// The classic '94 hill configuration: an 8000 cell core, 80000 cycles,
    /// 8000 processes, and 100 instruction warriors at least 100 cells apart.
    fn default() -> Self {
        Self::with_core_size(8_000)
    }
}
