use serde::{Deserialize, Serialize};

use crate::{FieldValue, Instruction};

/// An assembled redcode program: the warrior body plus its origin.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Program {
    /// Instructions in load order
    pub code: Vec<Instruction>,
    /// Offset *into the program* where execution begins, declared by an
    /// `ORG` or `END` pseudo-op (0 when undeclared)
    pub origin: FieldValue,
}

impl Program {
    /// Bundle a list of instructions with a starting offset
    #[must_use]
    pub const fn new(code: Vec<Instruction>, origin: FieldValue) -> Self {
        Self { code, origin }
    }

    /// Number of instructions in the program body
    #[must_use]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// True for a program with no instructions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Copy of this program with every field reduced to `[0, core_size)`.
    /// The origin is an offset into the program, not a core address, and is
    /// left untouched.
    #[must_use]
    pub fn normalized(&self, core_size: FieldValue) -> Self {
        let code = self
            .code
            .iter()
            .map(|insn| insn.normalized(core_size))
            .collect();
        Self {
            code,
            origin: self.origin,
        }
    }
}

impl Default for Program {
    fn default() -> Self {
        Self {
            code: vec![Instruction::default()],
            origin: 0,
        }
    }
}

/// Evaluate a value as a core offset, wrapping around at `core_size`.
///
/// Uses mathematical modulus so negative offsets wrap to the top of the
/// core: `normalize(-1, 8000) == 7999`.
///
/// # Panics
///
/// Will panic if `core_size` is not positive.
#[must_use]
pub fn normalize(value: FieldValue, core_size: FieldValue) -> FieldValue {
    assert!(core_size > 0, "core size must be positive");
    value.rem_euclid(core_size)
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;

    use super::*;
    use crate::{Opcode, Operand};

    #[test]
    fn verify_positive_and_negative_conversions() {
        assert_eq!(normalize(-10, 15), 5);
        assert_eq!(normalize(20, 15), 5);
        assert_eq!(normalize(-1, 8000), 7999);
        assert_eq!(normalize(8000, 8000), 0);
        assert_eq!(normalize(0, 8000), 0);
    }

    #[test]
    #[should_panic(expected = "core size must be positive")]
    fn normalize_with_zero_coresize() {
        let _value = normalize(10, 0);
    }

    #[test]
    fn default_program() {
        let default: Program = Default::default();
        let manual = Program::new(vec![Instruction::default()], 0);
        assert_eq!(default, manual);
        assert_eq!(default.len(), 1);
        assert!(!default.is_empty());
    }

    #[test]
    fn normalize_program_fields() {
        let program = Program::new(
            vec![Instruction::new(
                Opcode::Jmp,
                None,
                Operand::direct(-2),
                Operand::direct(0),
            )],
            1,
        );
        let normalized = program.normalized(200);
        assert_eq!(normalized.code[0].a.field, 198);
        assert_eq!(normalized.origin, 1);
    }
}
