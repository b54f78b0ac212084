use core::fmt;

use serde::{Deserialize, Serialize};

/// Operand fields and core addresses.
///
/// Fields are signed on entry (source text allows negative offsets) and are
/// stored modulo `core_size` once an instruction is written into a core.
pub type FieldValue = i64;

/// The opcode portion of a redcode instruction.
///
/// Covers the '94 ICWS instruction set interpreted by the MARS core.  `SEQ`
/// is accepted by the parser as a synonym for [`Opcode::Cmp`].
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    FromPrimitive,
    ToPrimitive,
    Serialize,
    Deserialize,
)]
pub enum Opcode {
    /// Remove the current thread from the warrior's queue
    Dat,

    /// Replace the B-target with the A-value and queue the next instruction
    Mov,

    /// Replace the B-target with the sum of the A/B values, and queue the next
    /// instruction
    Add,

    /// Replace the B-target with the B-value minus the A-value, and queue the
    /// next instruction
    Sub,

    /// Replace the B-target with the A-value times the B-value, and queue the
    /// next instruction
    Mul,

    /// Replace the B-target with the B-value divided by the A-value.  If part
    /// of the A-value is zero, the corresponding part of the B-target is
    /// unmodified.  The next instruction is queued only if no division by zero
    /// was attempted.
    Div,

    /// Replace the B-target with the remainder from the B-value divided by the
    /// A-value.  Zero divisors are handled as they are for [`Opcode::Div`].
    Mod,

    /// Queues the A-pointer unconditionally
    Jmp,

    /// Queues the A-pointer if every part of the B-value is zero, and
    /// otherwise queues the next instruction
    Jmz,

    /// Queues the A-pointer if any part of the B-value is not zero, and
    /// otherwise queues the next instruction
    Jmn,

    /// Decrements the B-value and B-target, and then queues the A-pointer if
    /// any part of the decremented B-value is not zero, and otherwise queues
    /// the next instruction
    Djn,

    /// Queues the next instruction, and then queues the A-pointer.  If the
    /// queue is full, only the next instruction is queued.
    Spl,

    /// Compares the A-value to the B-value.  If every part of the A-value is
    /// less than the corresponding part of the B-value, the instruction after
    /// next is queued, and otherwise the next instruction is queued.
    Slt,

    /// Compares the A-value to the B-value.  If every part is equal, the
    /// instruction after next is queued, and otherwise the next instruction
    /// is queued.
    Cmp,

    /// Queues the next instruction and does nothing else
    Nop,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = match *self {
            Self::Dat => "DAT",
            Self::Mov => "MOV",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Mod => "MOD",
            Self::Jmp => "JMP",
            Self::Jmz => "JMZ",
            Self::Jmn => "JMN",
            Self::Djn => "DJN",
            Self::Spl => "SPL",
            Self::Slt => "SLT",
            Self::Cmp => "CMP",
            Self::Nop => "NOP",
        };
        write!(f, "{mnemonic}")
    }
}

/// The opcode modifier portion of a redcode instruction.
///
/// The modifier selects which fields of the A and B instructions participate
/// in the operation, and which fields of the B-target are replaced.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    FromPrimitive,
    ToPrimitive,
    Serialize,
    Deserialize,
)]
pub enum Modifier {
    /// A-number of the A-instruction to the A-number of the B-target
    A,

    /// B-number of the A-instruction to the B-number of the B-target
    B,

    /// A-number of the A-instruction to the B-number of the B-target
    AB,

    /// B-number of the A-instruction to the A-number of the B-target
    BA,

    /// Both numbers of the A-instruction pairwise to the B-target
    F,

    /// Both numbers of the A-instruction crosswise to the B-target
    /// (A-number to B-number and B-number to A-number)
    X,

    /// The entire A-instruction to the B-target.  Only data movement and
    /// comparison honour `I` literally; arithmetic performs it as `F`.
    I,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = match *self {
            Self::A => "A",
            Self::B => "B",
            Self::AB => "AB",
            Self::BA => "BA",
            Self::F => "F",
            Self::X => "X",
            Self::I => "I",
        };
        write!(f, "{mnemonic}")
    }
}

/// The addressing mode applied to one operand of an instruction.
///
/// Indirect modes follow a pointer stored in another cell; the predecrement
/// and postincrement variants additionally mutate that cell as part of
/// operand evaluation.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    FromPrimitive,
    ToPrimitive,
    Serialize,
    Deserialize,
)]
pub enum AddrMode {
    /// Represented by `#`.  The operand is storage for data: the pointer is
    /// the executing instruction itself, and the field is used as a literal.
    Immediate,

    /// Represented by `$`.  The field is an offset from the program counter.
    Direct,

    /// Represented by `*`.  The field points (relative to the program
    /// counter) at a cell whose A-number supplies the secondary offset,
    /// relative to that cell.
    IndirectA,

    /// Represented by `@`.  As `*`, but the B-number of the pointed-to cell
    /// supplies the secondary offset.
    IndirectB,

    /// Represented by `{`.  As `*`, but the A-number of the pointed-to cell
    /// is decremented before it is used.
    PredecA,

    /// Represented by `<`.  As `@`, but the B-number of the pointed-to cell
    /// is decremented before it is used.
    PredecB,

    /// Represented by `}`.  As `*`, but the A-number of the pointed-to cell
    /// is incremented after the operand's target has been captured.
    PostincA,

    /// Represented by `>`.  As `@`, but the B-number of the pointed-to cell
    /// is incremented after the operand's target has been captured.
    PostincB,
}

impl fmt::Display for AddrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Immediate => write!(f, "#"),
            Self::Direct => write!(f, "$"),
            Self::IndirectA => write!(f, "*"),
            Self::IndirectB => write!(f, "@"),
            // "{{" is escaped form of "{"
            Self::PredecA => write!(f, "{{"),
            Self::PredecB => write!(f, "<"),
            // "}}" is escaped form of "}"
            Self::PostincA => write!(f, "}}"),
            Self::PostincB => write!(f, ">"),
        }
    }
}

/// One operand of an instruction: an addressing mode and a signed field.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize,
)]
pub struct Operand {
    /// The addressing mode sigil applied to the field
    pub mode: AddrMode,
    /// The field value, reduced modulo `core_size` once stored in a core
    pub field: FieldValue,
}

impl Operand {
    /// Operand with an explicit addressing mode
    #[must_use]
    pub const fn new(mode: AddrMode, field: FieldValue) -> Self {
        Self { mode, field }
    }

    /// A `$`-mode operand, the default for a bare number
    #[must_use]
    pub const fn direct(field: FieldValue) -> Self {
        Self::new(AddrMode::Direct, field)
    }

    /// A `#`-mode operand
    #[must_use]
    pub const fn immediate(field: FieldValue) -> Self {
        Self::new(AddrMode::Immediate, field)
    }

    /// Copy of this operand with the field reduced to `[0, core_size)`
    #[must_use]
    pub fn normalized(self, core_size: FieldValue) -> Self {
        Self::new(self.mode, crate::normalize(self.field, core_size))
    }
}

impl Default for Operand {
    fn default() -> Self {
        Self::direct(0)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.mode, self.field)
    }
}

/// A complete redcode instruction: opcode, resolved modifier, and operands.
///
/// Instructions are value types.  Two instructions with equal opcode,
/// modifier, and operands compare equal regardless of where they came from.
/// They are never mutated in place inside a core; a mutation is always a
/// whole-cell replacement.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    /// The opcode portion of a redcode instruction e.g. `DAT` or `JMP`
    pub opcode: Opcode,
    /// The modifier portion e.g. `.BA` or `.X`.  Always concrete:
    /// construction resolves an omitted modifier with [`default_modifiers`].
    pub modifier: Modifier,
    /// The A operand
    pub a: Operand,
    /// The B operand
    pub b: Operand,
}

impl Instruction {
    /// Build an instruction, resolving an omitted modifier to its ICWS '94
    /// default for the opcode and addressing modes.
    ///
    /// ```
    /// # use redcode::*;
    /// let imp = Instruction::new(
    ///     Opcode::Mov,
    ///     None,
    ///     Operand::direct(0),
    ///     Operand::direct(1),
    /// );
    /// assert_eq!(imp.modifier, Modifier::I);
    /// assert_eq!(imp.to_string(), "MOV.I $0, $1");
    /// ```
    #[must_use]
    pub fn new(
        opcode: Opcode,
        modifier: Option<Modifier>,
        a: Operand,
        b: Operand,
    ) -> Self {
        let modifier = modifier
            .unwrap_or_else(|| default_modifiers(opcode, a.mode, b.mode));
        Self {
            opcode,
            modifier,
            a,
            b,
        }
    }

    /// Copy of this instruction with both fields reduced to `[0, core_size)`
    #[must_use]
    pub fn normalized(self, core_size: FieldValue) -> Self {
        Self {
            a: self.a.normalized(core_size),
            b: self.b.normalized(core_size),
            ..self
        }
    }
}

impl Default for Instruction {
    /// The default cell content defined by ICWS '94 is `DAT.F $0, $0`.
    fn default() -> Self {
        Self {
            opcode: Opcode::Dat,
            modifier: Modifier::F,
            a: Operand::direct(0),
            b: Operand::direct(0),
        }
    }
}

impl fmt::Display for Instruction {
    /// Formats an instruction in the canonical '94 loadfile syntax.
    ///
    /// ```
    /// # use redcode::*;
    /// let a = Instruction::new(
    ///     Opcode::Add,
    ///     Some(Modifier::AB),
    ///     Operand::immediate(16),
    ///     Operand::direct(32),
    /// );
    /// assert_eq!(a.to_string(), "ADD.AB #16, $32");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} {}, {}",
            self.opcode, self.modifier, self.a, self.b
        )
    }
}

impl fmt::Debug for Instruction {
    /// Debug form tags the type and quotes the canonical text:
    /// `Instruction("MOV.X $52, @621")`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instruction({:?})", self.to_string())
    }
}

/// Determine the default modifier for an opcode and pair of addressing
/// modes, as specified by ICWS '94 for translating modifier-less redcode.
#[must_use]
pub const fn default_modifiers(
    op: Opcode,
    a_mode: AddrMode,
    b_mode: AddrMode,
) -> Modifier {
    #[allow(
        clippy::match_same_arms,
        reason = "Structure match by opcode-group for legibility"
    )]
    match (op, a_mode, b_mode) {
        // Dat and Nop always default to .F
        (Opcode::Nop | Opcode::Dat, ..) => Modifier::F,
        // Mov and Cmp
        // 1) .AB if A-mode is immediate
        // 2) .B if B-mode is immediate and A-mode isn't
        // 3) .I if neither A or B mode are immediate
        (Opcode::Mov | Opcode::Cmp, AddrMode::Immediate, _) => Modifier::AB,
        (Opcode::Mov | Opcode::Cmp, _, AddrMode::Immediate) => Modifier::B,
        (Opcode::Mov | Opcode::Cmp, ..) => Modifier::I,
        // Add, Sub, Mul, Div, and Mod
        // 1) .AB if A-mode is immediate
        // 2) .B if B-mode is immediate and A-mode isn't
        // 3) .F if neither A or B mode are immediate
        (
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod,
            AddrMode::Immediate,
            _,
        ) => Modifier::AB,
        (
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod,
            _,
            AddrMode::Immediate,
        ) => Modifier::B,
        (
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod,
            ..,
        ) => Modifier::F,
        // Slt
        // 1) .AB if A-mode is immediate
        // 2) .B in all other cases
        (Opcode::Slt, AddrMode::Immediate, _) => Modifier::AB,
        (Opcode::Slt, ..) => Modifier::B,
        // Jmp, Jmz, Jmn, Djn, Spl are always .B
        (
            Opcode::Jmp | Opcode::Jmz | Opcode::Jmn | Opcode::Djn | Opcode::Spl,
            ..,
        ) => Modifier::B,
    }
}

/// Utilities for enumerating and iterating over all valid redcode instructions
pub mod test_utils {
    use super::{AddrMode, Instruction, Modifier, Opcode, Operand};

    /// All valid opcodes interpreted by the MARS core
    pub const OPCODES: [Opcode; 15] = [
        Opcode::Dat,
        Opcode::Mov,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Mod,
        Opcode::Jmp,
        Opcode::Jmz,
        Opcode::Jmn,
        Opcode::Djn,
        Opcode::Spl,
        Opcode::Slt,
        Opcode::Cmp,
        Opcode::Nop,
    ];

    /// All valid '94 ICWS modifiers
    pub const MODIFIERS: [Modifier; 7] = [
        Modifier::A,
        Modifier::B,
        Modifier::AB,
        Modifier::BA,
        Modifier::F,
        Modifier::X,
        Modifier::I,
    ];

    /// All valid '94 ICWS addressing modes
    pub const ADDR_MODES: [AddrMode; 8] = [
        AddrMode::Immediate,
        AddrMode::Direct,
        AddrMode::IndirectA,
        AddrMode::IndirectB,
        AddrMode::PredecA,
        AddrMode::PredecB,
        AddrMode::PostincA,
        AddrMode::PostincB,
    ];

    /// Iterate over every valid instruction shape with the supplied fields
    pub fn all_instructions(
        a_field: i64,
        b_field: i64,
    ) -> impl Iterator<Item = Instruction> {
        itertools::iproduct!(
            OPCODES.iter(),
            MODIFIERS.iter(),
            ADDR_MODES.iter(),
            ADDR_MODES.iter()
        )
        .map(move |(o, m, a, b)| Instruction {
            opcode: *o,
            modifier: *m,
            a: Operand::new(*a, a_field),
            b: Operand::new(*b, b_field),
        })
    }
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_instr_default_equ() {
        let default: Instruction = Default::default();
        let manual = Instruction::new(
            Opcode::Dat,
            None,
            Operand::direct(0),
            Operand::direct(0),
        );
        assert_eq!(default, manual);
        assert_eq!(default.to_string(), "DAT.F $0, $0");
    }

    #[test]
    fn canonical_and_debug_forms() {
        let inst = Instruction::new(
            Opcode::Mov,
            Some(Modifier::X),
            Operand::direct(52),
            Operand::new(AddrMode::IndirectB, 621),
        );
        assert_eq!(inst.to_string(), "MOV.X $52, @621");
        assert_eq!(format!("{inst:?}"), "Instruction(\"MOV.X $52, @621\")");
    }

    #[test]
    fn default_modifier_resolution() {
        // An imp copies its whole cell forward
        let imp = Instruction::new(
            Opcode::Mov,
            None,
            Operand::direct(0),
            Operand::direct(1),
        );
        assert_eq!(imp.modifier, Modifier::I);

        // Immediate A source selects .AB for arithmetic
        let add = Instruction::new(
            Opcode::Add,
            None,
            Operand::immediate(5),
            Operand::direct(2),
        );
        assert_eq!(add.modifier, Modifier::AB);

        // Jumps are .B regardless of modes
        let jmp = Instruction::new(
            Opcode::Jmp,
            None,
            Operand::direct(-2),
            Operand::immediate(7),
        );
        assert_eq!(jmp.modifier, Modifier::B);

        // Arithmetic with no immediates works on both fields
        let sub = Instruction::new(
            Opcode::Sub,
            None,
            Operand::direct(1),
            Operand::direct(2),
        );
        assert_eq!(sub.modifier, Modifier::F);
    }

    #[test]
    fn enumerate_instructions_are_unique() {
        let instructions: Vec<Instruction> =
            test_utils::all_instructions(0, 0).collect();
        let unique_instructions: Vec<Instruction> =
            test_utils::all_instructions(0, 0).unique().collect();

        assert_eq!(instructions.len(), unique_instructions.len());
    }

    #[test]
    fn enumerate_instructions_right_number() {
        let expected_number = test_utils::OPCODES.len()
            * test_utils::MODIFIERS.len()
            * test_utils::ADDR_MODES.len()
            * test_utils::ADDR_MODES.len();
        assert_eq!(
            test_utils::all_instructions(0, 0).count(),
            expected_number
        );
    }

    #[test]
    fn all_instructions_have_unique_display() {
        let instructions_displayed: Vec<String> =
            test_utils::all_instructions(123, 456)
                .map(|x| x.to_string())
                .collect();

        let unique_display_reprs =
            instructions_displayed.iter().unique().count();
        assert_eq!(unique_display_reprs, instructions_displayed.len());
    }

    #[test]
    fn all_values_support_to_u8() {
        use num_traits::cast::ToPrimitive;
        // num_traits specifies that if the number of variants is within the
        // range of the specified type, then ToPrimitive should always return
        // Some.  Test that this remains true, or that more variants haven't
        // been added which break the assumption that all types fit in a u8

        for op in test_utils::OPCODES {
            assert!(op.to_u8().is_some());
        }
        for modifier in test_utils::MODIFIERS {
            assert!(modifier.to_u8().is_some());
        }
        for mode in test_utils::ADDR_MODES {
            assert!(mode.to_u8().is_some());
        }
    }

    #[test]
    fn normalization_wraps_fields() {
        let inst = Instruction::new(
            Opcode::Dat,
            None,
            Operand::direct(-10),
            Operand::direct(20),
        );
        let normalized = inst.normalized(15);
        assert_eq!(normalized.a.field, 5);
        assert_eq!(normalized.b.field, 5);
        // Modes and opcode survive unchanged
        assert_eq!(normalized.opcode, inst.opcode);
        assert_eq!(normalized.modifier, inst.modifier);
        assert_eq!(normalized.a.mode, inst.a.mode);
    }
}
