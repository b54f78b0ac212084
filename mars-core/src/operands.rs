use redcode::{AddrMode, Instruction, Operand};

use crate::{memory::Memory, CoreAddr};

/// A resolved operand: the effective core address and the cell found there.
#[derive(Copy, Clone, Debug)]
pub struct Register {
    /// Canonical effective address
    pub addr: CoreAddr,
    /// Cell read at `addr` once both operands had applied their side
    /// effects, immediately before the opcode executes
    pub cell: Instruction,
}

/// Register state for one tick: the executing instruction and both resolved
/// operands.
#[derive(Copy, Clone, Debug)]
pub struct Registers {
    /// Canonical program counter for the executing thread
    pub pc: CoreAddr,
    /// The instruction being executed, captured before any side effects
    pub current: Instruction,
    /// The A operand's target and value
    pub a: Register,
    /// The B operand's target and value
    pub b: Register,
}

/// Evaluate both operands of the cell at `pc`.
///
/// A is resolved before B, and each side effect lands before the next
/// resolution step: a pre-decrement writes its pointer cell before the
/// operand's offset is read, and a post-increment writes once the operand's
/// effective address has been fixed.  The A and B values are then read back
/// after both operands have settled, so a source cell mutated by `{`, `}`,
/// `<`, or `>` is seen in its mutated state.  Every mutation goes through
/// [`Memory::write`], so change callbacks observe the side effects.
pub fn evaluate(pc: CoreAddr, memory: &mut Memory) -> Registers {
    let current = memory.read(pc);
    let a_addr = resolve(pc, current.a, memory);
    let b_addr = resolve(pc, current.b, memory);
    Registers {
        pc: memory.canonical(pc),
        current,
        a: Register {
            addr: a_addr,
            cell: memory.read(a_addr),
        },
        b: Register {
            addr: b_addr,
            cell: memory.read(b_addr),
        },
    }
}

/// Resolve one operand to its effective address, applying any pre-decrement
/// or post-increment side effect along the way.
fn resolve(pc: CoreAddr, operand: Operand, memory: &mut Memory) -> CoreAddr {
    match operand.mode {
        // An immediate operand is a literal: the effective address is the
        // executing instruction itself, so modifier-driven writes land on it
        AddrMode::Immediate => memory.canonical(pc),
        AddrMode::Direct => memory.canonical(pc.wrapping_add(operand.field)),
        AddrMode::IndirectA
        | AddrMode::IndirectB
        | AddrMode::PredecA
        | AddrMode::PredecB
        | AddrMode::PostincA
        | AddrMode::PostincB => resolve_indirect(pc, operand, memory),
    }
}

/// True when an indirect mode follows (and possibly mutates) the A-number
/// of the pointed-to cell rather than the B-number
const fn uses_a_number(mode: AddrMode) -> bool {
    matches!(
        mode,
        AddrMode::IndirectA | AddrMode::PredecA | AddrMode::PostincA
    )
}

/// Resolve the indirect family: follow the pointer at `pc + field` and read
/// the secondary offset out of the cell it designates.
///
/// The plain indirect modes (`*`, `@`) apply the secondary offset relative
/// to the pointer cell.  The mutating modes (`{`, `}`, `<`, `>`) apply it
/// relative to the program counter, with the pre-decremented (or
/// not-yet-incremented) secondary value.
fn resolve_indirect(
    pc: CoreAddr,
    operand: Operand,
    memory: &mut Memory,
) -> CoreAddr {
    let pointer = memory.canonical(pc.wrapping_add(operand.field));

    // Pre-decrement fires before the secondary offset is read, so a
    // self-referential operand observes its own decrement
    match operand.mode {
        AddrMode::PredecA => {
            let mut via = memory.read(pointer);
            via.a.field -= 1;
            memory.write(pointer, via);
        }
        AddrMode::PredecB => {
            let mut via = memory.read(pointer);
            via.b.field -= 1;
            memory.write(pointer, via);
        }
        _ => {}
    }

    let via = memory.read(pointer);
    let secondary = if uses_a_number(operand.mode) {
        via.a.field
    } else {
        via.b.field
    };
    let addr = match operand.mode {
        AddrMode::IndirectA | AddrMode::IndirectB => {
            memory.canonical(pointer.wrapping_add(secondary))
        }
        _ => memory.canonical(pc.wrapping_add(secondary)),
    };

    // Post-increment fires only after the effective address is fixed
    match operand.mode {
        AddrMode::PostincA => {
            let mut via = memory.read(pointer);
            via.a.field += 1;
            memory.write(pointer, via);
        }
        AddrMode::PostincB => {
            let mut via = memory.read(pointer);
            via.b.field += 1;
            memory.write(pointer, via);
        }
        _ => {}
    }

    addr
}
