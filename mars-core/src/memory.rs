use redcode::Instruction;

use crate::{warrior::Warrior, CoreAddr};

/// A change observer.  Receives `(canonical_index, old_cell, new_cell)`
/// synchronously, before the new cell is stored.
pub type ChangeCallback = Box<dyn FnMut(CoreAddr, &Instruction, &Instruction)>;

/// Token identifying a registered change callback, returned by
/// [`Memory::add_callback`] and accepted by [`Memory::remove_callback`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CallbackId(u64);

/// The circular core shared by all warriors in a match.
///
/// Cells hold [`Instruction`]s and are addressable by any signed integer;
/// every address is reduced modulo the core size before use, so no
/// out-of-range index ever surfaces.  Writes canonicalise the stored
/// instruction's fields to `[0, core_size)`, which is how arithmetic
/// wrapping becomes visible to later reads.
///
/// The registered change callbacks run in registration order on every
/// write, including the operand side-effect writes made by `{`, `}`, `<`,
/// and `>` during evaluation.  Callbacks are owned by the memory and run
/// under its mutable borrow, so a callback has no way to reenter the core.
pub struct Memory {
    /// Backing store, `core_size` cells long
    cells: Vec<Instruction>,
    /// Length of the core and the modulus for all address arithmetic
    core_size: CoreAddr,
    /// Change observers in registration order
    callbacks: Vec<(CallbackId, ChangeCallback)>,
    /// Source of unique callback tokens
    next_callback: u64,
}

impl Memory {
    /// Construct a core of `core_size` cells, each holding `DAT.F $0, $0`.
    ///
    /// # Panics
    ///
    /// Will panic if `core_size` is not positive.
    #[must_use]
    pub fn new(core_size: CoreAddr) -> Self {
        assert!(core_size > 0, "core size must be positive");
        let len = usize::try_from(core_size).unwrap_or_default();
        Self {
            cells: vec![Instruction::default(); len],
            core_size,
            callbacks: Vec::new(),
            next_callback: 0,
        }
    }

    /// Number of cells in the core
    #[must_use]
    pub const fn size(&self) -> CoreAddr {
        self.core_size
    }

    /// Reduce any signed address to its canonical index in
    /// `[0, core_size)`
    #[must_use]
    pub fn canonical(&self, addr: CoreAddr) -> CoreAddr {
        redcode::normalize(addr, self.core_size)
    }

    /// Position in the backing store for an arbitrary signed address
    fn cell_index(&self, addr: CoreAddr) -> usize {
        usize::try_from(self.canonical(addr)).unwrap_or_default()
    }

    /// The instruction at `addr mod core_size`
    #[must_use]
    pub fn read(&self, addr: CoreAddr) -> Instruction {
        let idx = self.cell_index(addr);
        self.cells.get(idx).copied().unwrap_or_default()
    }

    /// Replace the cell at `addr mod core_size`.
    ///
    /// The stored instruction has its operand fields reduced modulo the
    /// core size.  Every registered callback observes
    /// `(canonical_address, previous_cell, new_cell)` before the store.
    pub fn write(&mut self, addr: CoreAddr, instruction: Instruction) {
        let canonical = self.canonical(addr);
        let idx = usize::try_from(canonical).unwrap_or_default();
        let new = instruction.normalized(self.core_size);
        let old = self.cells.get(idx).copied().unwrap_or_default();
        for (_, callback) in &mut self.callbacks {
            callback(canonical, &old, &new);
        }
        if let Some(cell) = self.cells.get_mut(idx) {
            *cell = new;
        }
    }

    /// Copy a warrior's program into the core at `base` and seed its thread
    /// queue with the single program counter `(base + origin) mod core_size`.
    ///
    /// Each instruction is stored through [`Memory::write`], so change
    /// callbacks observe the load.
    pub fn load(&mut self, base: CoreAddr, warrior: &mut Warrior) {
        for (offset, instruction) in
            warrior.program().code.iter().enumerate()
        {
            let offset = CoreAddr::try_from(offset).unwrap_or_default();
            self.write(base.wrapping_add(offset), *instruction);
        }
        let start = self.canonical(base.wrapping_add(warrior.origin()));
        warrior.seed(start);
    }

    /// Register a change observer.  Observers run in registration order.
    pub fn add_callback(
        &mut self,
        callback: impl FnMut(CoreAddr, &Instruction, &Instruction) + 'static,
    ) -> CallbackId {
        let id = CallbackId(self.next_callback);
        self.next_callback = self.next_callback.wrapping_add(1);
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Deregister a change observer.  Returns false for a token that was
    /// never registered or was already removed.
    pub fn remove_callback(&mut self, id: CallbackId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;
    use std::rc::Rc;

    use coverage_helper::test;
    use redcode::{Opcode, Operand};
    use redcode_parser::parse_instruction;

    use super::*;

    #[test]
    fn fresh_core_is_all_dat() {
        let memory = Memory::new(200);
        assert_eq!(memory.size(), 200);
        for addr in 0..10 {
            assert_eq!(memory.read(addr), Instruction::default());
        }
    }

    #[test]
    fn addresses_wrap_in_both_directions() {
        let mut memory = Memory::new(200);
        let inst = parse_instruction("MOV 5, 2").unwrap();
        memory.write(5, inst);
        assert_eq!(memory.read(5), inst);
        assert_eq!(memory.read(205), inst);
        assert_eq!(memory.read(5 - 200), inst);
        assert_eq!(memory.read(5 + 3 * 200), inst);
        // A distinct canonical index is unaffected
        assert_eq!(memory.read(6), Instruction::default());

        memory.write(-1, inst);
        assert_eq!(memory.read(199), inst);
    }

    #[test]
    fn fields_are_canonicalised_at_write_time() {
        let mut memory = Memory::new(200);
        let inst = parse_instruction("SUB $-5, $658").unwrap();
        memory.write(0, inst);
        let stored = memory.read(0);
        assert_eq!(stored.a, Operand::direct(195));
        assert_eq!(stored.b, Operand::direct(58));
        assert_eq!(stored.opcode, Opcode::Sub);
    }

    #[test]
    fn callback_observes_writes() {
        let observed = Rc::new(RefCell::new(vec![]));
        let log = Rc::clone(&observed);

        let mut memory = Memory::new(200);
        memory.add_callback(move |addr, old, new| {
            log.borrow_mut().push((addr, *old, *new));
        });

        let inst = parse_instruction("MOV 5, 2").unwrap();
        memory.write(5, inst);

        let seen = observed.borrow();
        assert_eq!(seen.len(), 1, "exactly one write, exactly one event");
        assert_eq!(seen[0], (5, Instruction::default(), inst));
    }

    #[test]
    fn callbacks_run_in_registration_order() {
        let observed = Rc::new(RefCell::new(vec![]));
        let first = Rc::clone(&observed);
        let second = Rc::clone(&observed);

        let mut memory = Memory::new(200);
        memory.add_callback(move |_, _, _| first.borrow_mut().push("first"));
        memory.add_callback(move |_, _, _| second.borrow_mut().push("second"));
        memory.write(0, Instruction::default());

        assert_eq!(*observed.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn removed_callback_no_longer_fires() {
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);

        let mut memory = Memory::new(200);
        let id = memory
            .add_callback(move |_, _, _| *counter.borrow_mut() += 1);
        memory.write(0, Instruction::default());
        assert!(memory.remove_callback(id));
        assert!(!memory.remove_callback(id));
        memory.write(0, Instruction::default());

        assert_eq!(*count.borrow(), 1);
    }
}
