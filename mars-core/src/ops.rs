use redcode::{Modifier, Opcode};

use crate::{
    memory::Memory, operands::Registers, warrior::Threads, CoreAddr,
};

/// Execute the already-evaluated instruction described by `regs`.
///
/// Results are written through `memory` (firing change callbacks) before any
/// successor program counter is queued onto `threads`, preserving the rule
/// that a write and its notification precede thread-queue updates.  An
/// instruction that kills the executing thread queues nothing.
pub fn execute(regs: &Registers, memory: &mut Memory, threads: &mut Threads) {
    match regs.current.opcode {
        Opcode::Dat => dat(),
        Opcode::Mov => mov(regs, memory, threads),
        Opcode::Add
        | Opcode::Sub
        | Opcode::Mul
        | Opcode::Div
        | Opcode::Mod => arithmetic(regs, memory, threads),
        Opcode::Jmp => jmp(regs, threads),
        Opcode::Jmz => jmz(regs, memory, threads),
        Opcode::Jmn => jmn(regs, memory, threads),
        Opcode::Djn => djn(regs, memory, threads),
        Opcode::Spl => spl(regs, memory, threads),
        Opcode::Slt => slt(regs, memory, threads),
        Opcode::Cmp => cmp(regs, memory, threads),
        Opcode::Nop => nop(regs, memory, threads),
    }
}

/// The canonical successor of the executing instruction
fn next_pc(regs: &Registers, memory: &Memory) -> CoreAddr {
    memory.canonical(regs.pc.wrapping_add(1))
}

/// `DAT` does nothing past operand evaluation.  The executing thread dies
/// because no successor is queued.
const fn dat() {}

/// Copy the selected fields (or the entire cell under `.I`) from the
/// A-value to the B-target
fn mov(regs: &Registers, memory: &mut Memory, threads: &mut Threads) {
    let src = regs.a.cell;
    let mut dst = memory.read(regs.b.addr);
    match regs.current.modifier {
        Modifier::A => dst.a.field = src.a.field,
        Modifier::B => dst.b.field = src.b.field,
        Modifier::AB => dst.b.field = src.a.field,
        Modifier::BA => dst.a.field = src.b.field,
        Modifier::F => {
            dst.a.field = src.a.field;
            dst.b.field = src.b.field;
        }
        Modifier::X => {
            dst.a.field = src.b.field;
            dst.b.field = src.a.field;
        }
        Modifier::I => dst = src,
    }
    memory.write(regs.b.addr, dst);
    threads.push(next_pc(regs, memory));
}

/// Apply the binary operation for `opcode` to one destination/source field
/// pair.  `None` marks a zero divisor; the caller suppresses the write and
/// kills the thread.
fn binary(opcode: Opcode, dst: i64, src: i64) -> Option<i64> {
    match opcode {
        Opcode::Add => Some(dst.wrapping_add(src)),
        Opcode::Sub => Some(dst.wrapping_sub(src)),
        Opcode::Mul => Some(dst.wrapping_mul(src)),
        Opcode::Div => (src != 0).then(|| dst.wrapping_div(src)),
        Opcode::Mod => (src != 0).then(|| dst.wrapping_rem(src)),
        // execute() routes only the five arithmetic opcodes here
        _ => None,
    }
}

/// `ADD`, `SUB`, `MUL`, `DIV`, and `MOD`.
///
/// The destination is the B-target; sources come from the captured A-value.
/// A zero divisor in any selected field suppresses that field's write and
/// kills the executing thread, while the other selected field (if any) is
/// still written.
fn arithmetic(regs: &Registers, memory: &mut Memory, threads: &mut Threads) {
    let op = regs.current.opcode;
    let a = regs.a.cell;
    let b = regs.b.cell;
    let mut dst = memory.read(regs.b.addr);
    let mut killed = false;
    let mut wrote = false;

    // (destination value, source value) for each field of the B-target the
    // modifier selects.  Arithmetic under .I performs as .F.
    let modifier = regs.current.modifier;
    let a_field_pair: Option<(i64, i64)> = match modifier {
        Modifier::A | Modifier::F | Modifier::I => {
            Some((b.a.field, a.a.field))
        }
        Modifier::BA | Modifier::X => Some((b.a.field, a.b.field)),
        Modifier::B | Modifier::AB => None,
    };
    let b_field_pair: Option<(i64, i64)> = match modifier {
        Modifier::B | Modifier::F | Modifier::I => {
            Some((b.b.field, a.b.field))
        }
        Modifier::AB | Modifier::X => Some((b.b.field, a.a.field)),
        Modifier::A | Modifier::BA => None,
    };

    if let Some((dst_value, src_value)) = a_field_pair {
        match binary(op, dst_value, src_value) {
            Some(result) => {
                dst.a.field = result;
                wrote = true;
            }
            None => killed = true,
        }
    }
    if let Some((dst_value, src_value)) = b_field_pair {
        match binary(op, dst_value, src_value) {
            Some(result) => {
                dst.b.field = result;
                wrote = true;
            }
            None => killed = true,
        }
    }

    if wrote {
        memory.write(regs.b.addr, dst);
    }
    if !killed {
        threads.push(next_pc(regs, memory));
    }
}

/// `JMP` queues the A-pointer unconditionally
fn jmp(regs: &Registers, threads: &mut Threads) {
    threads.push(regs.a.addr);
}

/// The fields of the B-value selected by the executing modifier
fn selected_b_fields(regs: &Registers) -> (i64, Option<i64>) {
    let b = regs.b.cell;
    match regs.current.modifier {
        Modifier::A | Modifier::BA => (b.a.field, None),
        Modifier::B | Modifier::AB => (b.b.field, None),
        Modifier::F | Modifier::X | Modifier::I => {
            (b.a.field, Some(b.b.field))
        }
    }
}

/// `JMZ` queues the A-pointer if every selected field of the B-value is
/// zero, and otherwise queues the next instruction
fn jmz(regs: &Registers, memory: &Memory, threads: &mut Threads) {
    let (first, second) = selected_b_fields(regs);
    let is_zero = first == 0 && second.unwrap_or(0) == 0;
    if is_zero {
        threads.push(regs.a.addr);
    } else {
        threads.push(next_pc(regs, memory));
    }
}

/// `JMN` queues the A-pointer if any selected field of the B-value is not
/// zero, and otherwise queues the next instruction
fn jmn(regs: &Registers, memory: &Memory, threads: &mut Threads) {
    let (first, second) = selected_b_fields(regs);
    let is_non_zero = first != 0 || second.unwrap_or(0) != 0;
    if is_non_zero {
        threads.push(regs.a.addr);
    } else {
        threads.push(next_pc(regs, memory));
    }
}

/// `DJN` decrements the selected fields of the B-target, then queues the
/// A-pointer if any selected field of the decremented B-value is not zero
fn djn(regs: &Registers, memory: &mut Memory, threads: &mut Threads) {
    let size = memory.size();
    let decremented = |field: i64| redcode::normalize(field - 1, size);

    let mut target = memory.read(regs.b.addr);
    match regs.current.modifier {
        Modifier::A | Modifier::BA => {
            target.a.field = decremented(target.a.field);
        }
        Modifier::B | Modifier::AB => {
            target.b.field = decremented(target.b.field);
        }
        Modifier::F | Modifier::X | Modifier::I => {
            target.a.field = decremented(target.a.field);
            target.b.field = decremented(target.b.field);
        }
    }
    memory.write(regs.b.addr, target);

    let (first, second) = selected_b_fields(regs);
    let jump = decremented(first) != 0
        || second.map_or(false, |field| decremented(field) != 0);
    if jump {
        threads.push(regs.a.addr);
    } else {
        threads.push(next_pc(regs, memory));
    }
}

/// `SPL` queues the next instruction, then queues the A-pointer at the tail
/// of the queue so round-robin interleaves the new thread after existing
/// ones.  A full queue drops the second value.
fn spl(regs: &Registers, memory: &Memory, threads: &mut Threads) {
    threads.push(next_pc(regs, memory));
    threads.push(regs.a.addr);
}

/// `SLT` skips the next instruction when every selected field of the
/// A-value is strictly less than the corresponding field of the B-value
fn slt(regs: &Registers, memory: &Memory, threads: &mut Threads) {
    let a = regs.a.cell;
    let b = regs.b.cell;
    let is_less_than = match regs.current.modifier {
        Modifier::A => a.a.field < b.a.field,
        Modifier::B => a.b.field < b.b.field,
        Modifier::AB => a.a.field < b.b.field,
        Modifier::BA => a.b.field < b.a.field,
        Modifier::F | Modifier::I => {
            a.a.field < b.a.field && a.b.field < b.b.field
        }
        Modifier::X => a.a.field < b.b.field && a.b.field < b.a.field,
    };
    let amount = if is_less_than { 2 } else { 1 };
    threads.push(memory.canonical(regs.pc.wrapping_add(amount)));
}

/// `CMP` (also written `SEQ`) skips the next instruction when the selected
/// fields of the A-value and B-value are equal.  Under `.I` the entire
/// cells are compared, addressing modes included.
fn cmp(regs: &Registers, memory: &Memory, threads: &mut Threads) {
    let a = regs.a.cell;
    let b = regs.b.cell;
    let is_equal = match regs.current.modifier {
        Modifier::A => a.a.field == b.a.field,
        Modifier::B => a.b.field == b.b.field,
        Modifier::AB => a.a.field == b.b.field,
        Modifier::BA => a.b.field == b.a.field,
        Modifier::F => a.a.field == b.a.field && a.b.field == b.b.field,
        Modifier::X => a.a.field == b.b.field && a.b.field == b.a.field,
        Modifier::I => a == b,
    };
    let amount = if is_equal { 2 } else { 1 };
    threads.push(memory.canonical(regs.pc.wrapping_add(amount)));
}

/// `NOP` queues the next instruction and does nothing else
fn nop(regs: &Registers, memory: &Memory, threads: &mut Threads) {
    threads.push(next_pc(regs, memory));
}
