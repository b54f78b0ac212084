use alloc::collections::vec_deque::VecDeque;

use itertools::Itertools;
use redcode::{Instruction, Program};

use crate::{
    error::{MarsError, MarsResult},
    memory::Memory,
    operands, ops, CoreAddr, MarsProperties,
};

/// FIFO queue of program counters with a configurable capacity.
///
/// Pushing onto a full queue silently drops the value, which is how `SPL`
/// saturates at the process cap.
#[derive(Clone, Debug)]
pub struct Threads {
    /// Queued program counters, front is next to execute
    queue: VecDeque<CoreAddr>,
    /// Number of threads beyond which pushes have no effect
    limit: usize,
}

impl Threads {
    /// An empty queue capped at `limit` entries
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            limit,
        }
    }

    /// Queue a program counter at the tail, unless the queue is full
    pub(crate) fn push(&mut self, pc: CoreAddr) {
        if self.queue.len() < self.limit {
            self.queue.push_back(pc);
        }
    }

    /// Dequeue the next program counter to execute
    pub(crate) fn pop(&mut self) -> Option<CoreAddr> {
        self.queue.pop_front()
    }

    /// Discard all entries and seed a single program counter
    pub(crate) fn replace_with(&mut self, pc: CoreAddr) {
        self.queue.clear();
        self.push(pc);
    }

    /// Copy of the queue in execution order
    pub(crate) fn to_vec(&self) -> Vec<CoreAddr> {
        self.queue.iter().copied().collect_vec()
    }

    /// True when no threads remain
    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// A named redcode program competing in a match, together with its FIFO
/// queue of live program counters.
///
/// A warrior becomes runnable once it is seeded, either by
/// [`Memory::load`] or by [`Warrior::initial_program`] with a base address.
/// It is dead once its queue empties; a dead warrior executes nothing
/// further.
#[derive(Clone, Debug)]
pub struct Warrior {
    /// Optional display name used in match reporting
    pub name: Option<String>,
    /// The compiled program body and origin
    program: Program,
    /// Live program counters, front is next to execute
    threads: Threads,
    /// Whether this warrior has ever been given a starting thread
    seeded: bool,
}

impl Warrior {
    /// Assemble a warrior from redcode source text.
    ///
    /// ```
    /// # use mars_core::Warrior;
    /// let warrior = Warrior::from_source("ADD #4, 3\nJMP -1").unwrap();
    /// assert_eq!(warrior.program().len(), 2);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`MarsError::Parse`] for text the redcode grammar rejects.
    pub fn from_source(source: &str) -> MarsResult<Self> {
        Ok(Self::from_program(redcode_parser::parse_program(source)?))
    }

    /// Build a warrior from already-compiled instructions and an origin
    #[must_use]
    pub fn new(code: Vec<Instruction>, origin: CoreAddr) -> Self {
        Self::from_program(Program::new(code, origin))
    }

    /// Build a warrior from a compiled [`Program`]
    #[must_use]
    pub fn from_program(program: Program) -> Self {
        Self {
            name: None,
            program,
            threads: Threads::new(MarsProperties::default().max_processes),
            seeded: false,
        }
    }

    /// Attach a display name
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    /// Replace the per-warrior thread cap.  Existing queued threads are
    /// kept even if they exceed the new cap; the cap applies to pushes.
    pub fn limit_processes(&mut self, max_processes: usize) {
        self.threads.limit = max_processes;
    }

    /// The compiled program body
    #[must_use]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    /// Offset into the program where execution begins
    #[must_use]
    pub const fn origin(&self) -> CoreAddr {
        self.program.origin
    }

    /// The compiled instruction list.
    ///
    /// When `base` is supplied the warrior's thread queue is also reset to
    /// the single starting counter `base + origin`, exactly as
    /// [`Memory::load`] would seed it (the counter is canonicalised by the
    /// memory when the thread runs).
    ///
    /// # Errors
    ///
    /// Returns [`MarsError::Unseeded`] when called without a base on a
    /// warrior that has never been seeded.
    pub fn initial_program(
        &mut self,
        base: Option<CoreAddr>,
    ) -> MarsResult<&[Instruction]> {
        if let Some(base) = base {
            self.seed(base.wrapping_add(self.program.origin));
        }
        if self.seeded {
            Ok(&self.program.code)
        } else {
            Err(MarsError::Unseeded)
        }
    }

    /// Reset the thread queue to a single starting counter
    pub(crate) fn seed(&mut self, pc: CoreAddr) {
        self.threads.replace_with(pc);
        self.seeded = true;
    }

    /// Execute exactly one instruction: dequeue the front thread, evaluate
    /// its operands against `memory`, apply the opcode, and queue the
    /// surviving successor counters at the tail.  Returns the canonical
    /// address of the executed instruction.
    ///
    /// # Errors
    ///
    /// Returns [`MarsError::DeadWarrior`] when the thread queue is empty.
    pub fn run(&mut self, memory: &mut Memory) -> MarsResult<CoreAddr> {
        let Some(pc) = self.threads.pop() else {
            return Err(MarsError::DeadWarrior);
        };
        let pc = memory.canonical(pc);
        let regs = operands::evaluate(pc, memory);
        ops::execute(&regs, memory, &mut self.threads);
        Ok(pc)
    }

    /// The current thread queue in execution order
    #[must_use]
    pub fn threads(&self) -> Vec<CoreAddr> {
        self.threads.to_vec()
    }

    /// True while the warrior still has at least one live thread
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.threads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;
    use redcode_parser::parse_instruction;

    use super::*;

    const IMP: &str = "MOV 0, 1";

    #[test]
    fn source_and_compiled_forms_agree() {
        let from_source = Warrior::from_source(IMP).unwrap();
        let compiled =
            Warrior::new(vec![parse_instruction(IMP).unwrap()], 0);
        assert_eq!(from_source.program(), compiled.program());
    }

    #[test]
    fn bad_source_is_a_parse_error() {
        let result = Warrior::from_source("MOV 0, 1\nFLY 2, 3");
        assert!(matches!(result, Err(MarsError::Parse(_))));
    }

    #[test]
    fn initial_program_requires_a_seed() {
        let mut warrior = Warrior::from_source(IMP).unwrap();
        assert_eq!(
            warrior.initial_program(None).unwrap_err(),
            MarsError::Unseeded
        );

        let program = warrior.initial_program(Some(10)).unwrap().to_vec();
        assert_eq!(program, vec![parse_instruction(IMP).unwrap()]);
        assert_eq!(warrior.threads(), vec![10]);

        // Once seeded, no base is needed
        assert!(warrior.initial_program(None).is_ok());
    }

    #[test]
    fn run_on_a_dead_warrior_fails() {
        let mut memory = Memory::new(200);
        let mut warrior = Warrior::from_source(IMP).unwrap();
        assert!(!warrior.is_alive());
        assert_eq!(
            warrior.run(&mut memory).unwrap_err(),
            MarsError::DeadWarrior
        );
    }

    #[test]
    fn imp_crawls_forward() {
        let mut memory = Memory::new(200);
        let mut warrior = Warrior::from_source(IMP).unwrap();
        memory.load(10, &mut warrior);
        assert_eq!(warrior.threads(), vec![10]);

        assert_eq!(warrior.run(&mut memory), Ok(10));
        assert_eq!(warrior.threads(), vec![11]);
        assert_eq!(warrior.run(&mut memory), Ok(11));
        assert_eq!(warrior.threads(), vec![12]);
        assert_eq!(
            memory.read(12).to_string(),
            "MOV.I $0, $1",
            "the imp copies itself forward"
        );
    }

    #[test]
    fn load_copies_the_program_and_seeds_one_thread() {
        let mut memory = Memory::new(200);
        let mut warrior = Warrior::from_source(
            "ADD.AB #4, 3
             MOV.I  2, @2
             JMP    -2
             DAT    #0, #0",
        )
        .unwrap();
        memory.load(100, &mut warrior);

        assert_eq!(warrior.threads(), vec![100]);
        for (offset, instruction) in
            warrior.program().code.iter().enumerate()
        {
            let offset = CoreAddr::try_from(offset).unwrap();
            assert_eq!(
                memory.read(100 + offset),
                instruction.normalized(memory.size())
            );
        }
    }

    #[test]
    fn origin_offsets_the_starting_thread() {
        let mut memory = Memory::new(200);
        let mut warrior = Warrior::from_source(
            "ORG 2
             DAT 0, 0
             DAT 1, 1",
        )
        .unwrap();
        memory.load(10, &mut warrior);
        assert_eq!(warrior.threads(), vec![12]);
    }

    #[test]
    fn dat_kills_exactly_one_thread() {
        let mut memory = Memory::new(200);
        let mut warrior =
            Warrior::from_source("SPL 0\nDAT #0, #0").unwrap();
        memory.load(10, &mut warrior);

        // SPL 0 queues pc+1 and pc: two threads
        warrior.run(&mut memory).unwrap();
        assert_eq!(warrior.threads(), vec![11, 10]);

        // The DAT at 11 kills its thread, the other survives
        warrior.run(&mut memory).unwrap();
        assert_eq!(warrior.threads(), vec![10]);
        assert!(warrior.is_alive());
    }

    #[test]
    fn spl_interleaves_new_threads_at_the_tail() {
        let mut memory = Memory::new(200);
        let mut warrior = Warrior::from_source("SPL 5\nSPL -1").unwrap();
        memory.load(10, &mut warrior);

        warrior.run(&mut memory).unwrap();
        assert_eq!(warrior.threads(), vec![11, 15]);
        warrior.run(&mut memory).unwrap();
        assert_eq!(warrior.threads(), vec![15, 12, 10]);
    }

    #[test]
    fn process_cap_limits_spl() {
        let mut memory = Memory::new(200);
        let mut warrior = Warrior::from_source("SPL 5\nJMP -1").unwrap();
        warrior.limit_processes(2);
        memory.load(10, &mut warrior);

        // First SPL fills the queue to the cap of two
        warrior.run(&mut memory).unwrap();
        assert_eq!(warrior.threads(), vec![11, 15]);
        // The JMP thread re-queues its target; the queue sits at the cap
        warrior.run(&mut memory).unwrap();
        assert_eq!(warrior.threads(), vec![15, 10]);
    }
}
