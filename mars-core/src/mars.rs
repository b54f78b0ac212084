use crate::{
    error::{MarsError, MarsResult},
    memory::Memory,
    warrior::Warrior,
    CoreAddr, MarsProperties,
};

/// How a match ended.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Outcome {
    /// Exactly one warrior had live threads when the match ended; the value
    /// is its load order index
    Victory(usize),
    /// The cycle cap elapsed with more than one survivor, or every warrior
    /// died in the same round
    Stalemate,
}

/// A match driver: one shared core, a fixed roster of warriors, and a
/// round-robin loop.
///
/// The driver owns warrior placement policy (`max_length`, `min_distance`,
/// overlap rejection) and the tick/cycle bookkeeping.  Each round gives
/// every living warrior exactly one instruction, in load order, so a match
/// replayed from the same initial state is bit-for-bit reproducible.
pub struct Mars {
    /// Active configuration for this match
    properties: MarsProperties,
    /// The shared circular core
    memory: Memory,
    /// Loaded warriors in load order
    warriors: Vec<Warrior>,
    /// Base address and body length for each loaded warrior
    placements: Vec<(CoreAddr, usize)>,
    /// Rounds executed so far
    cycles: u64,
}

impl Mars {
    /// An empty match with a fresh core sized by `properties`
    #[must_use]
    pub fn new(properties: MarsProperties) -> Self {
        Self {
            properties,
            memory: Memory::new(properties.core_size),
            warriors: Vec::new(),
            placements: Vec::new(),
            cycles: 0,
        }
    }

    /// The configuration this match runs under
    #[must_use]
    pub const fn properties(&self) -> &MarsProperties {
        &self.properties
    }

    /// The shared core
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable access to the shared core, e.g. to register change callbacks
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Warriors in load order
    #[must_use]
    pub fn warriors(&self) -> &[Warrior] {
        &self.warriors
    }

    /// Rounds executed so far
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Place a warrior into the core at `base` and enroll it in the match,
    /// returning its load order index.
    ///
    /// # Errors
    ///
    /// Returns [`MarsError::ProgramTooLong`] when the body exceeds
    /// `max_length`, and [`MarsError::LoadConflict`] when the placement
    /// overlaps another warrior or sits closer than `min_distance` to one.
    pub fn load(
        &mut self,
        base: CoreAddr,
        mut warrior: Warrior,
    ) -> MarsResult<usize> {
        let len = warrior.program().len();
        if len > self.properties.max_length {
            return Err(MarsError::ProgramTooLong {
                len,
                max: self.properties.max_length,
            });
        }
        let base = self.memory.canonical(base);
        self.check_separation(base, len)?;

        warrior.limit_processes(self.properties.max_processes);
        self.memory.load(base, &mut warrior);
        self.placements.push((base, len));
        self.warriors.push(warrior);
        Ok(self.warriors.len() - 1)
    }

    /// Reject placements that overlap or crowd an existing warrior.
    ///
    /// On the circular core the gap from each base to the next, measured
    /// forward, must cover both the span of the earlier warrior and the
    /// configured minimum distance.
    fn check_separation(
        &self,
        base: CoreAddr,
        len: usize,
    ) -> MarsResult<()> {
        let size = self.memory.size();
        let len = CoreAddr::try_from(len).unwrap_or_default();
        for &(other_base, other_len) in &self.placements {
            let other_len = CoreAddr::try_from(other_len).unwrap_or_default();
            let forward = redcode::normalize(other_base - base, size);
            let backward = redcode::normalize(base - other_base, size);
            if forward < len.max(self.properties.min_distance)
                || backward < other_len.max(self.properties.min_distance)
            {
                return Err(MarsError::LoadConflict { base });
            }
        }
        Ok(())
    }

    /// One round: every living warrior executes one instruction, in load
    /// order
    pub fn tick(&mut self) {
        for warrior in &mut self.warriors {
            if warrior.is_alive() {
                // run cannot fail on a live warrior
                let _ = warrior.run(&mut self.memory);
            }
        }
        self.cycles = self.cycles.saturating_add(1);
    }

    /// Number of warriors that still have live threads
    #[must_use]
    pub fn living(&self) -> usize {
        self.warriors.iter().filter(|w| w.is_alive()).count()
    }

    /// Drive the match until at most one warrior survives or `max_cycles`
    /// rounds have elapsed
    pub fn run(&mut self) -> Outcome {
        while self.cycles < self.properties.max_cycles && self.living() > 1 {
            self.tick();
        }
        let mut survivors =
            self.warriors.iter().enumerate().filter(|(_, w)| w.is_alive());
        match (survivors.next(), survivors.next()) {
            (Some((index, _)), None) => Outcome::Victory(index),
            _ => Outcome::Stalemate,
        }
    }
}
