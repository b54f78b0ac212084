use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case},
    character::complete::space0,
    combinator::{map, opt},
    error::VerboseError,
    sequence::{pair, preceded},
    IResult,
};
use redcode::{AddrMode, Instruction, Operand};

use crate::primitives::{addr_mode, modifier, number, opcode};

/// Parses one operand: an optional mode sigil followed by a field.  Bare
/// numbers are direct-mode.
fn operand(input: &str) -> IResult<&str, Operand, VerboseError<&str>> {
    let (input, _) = space0(input)?;
    let (input, mode) = opt(addr_mode)(input)?;
    let (input, field) = number(input)?;
    Ok((input, Operand::new(mode.unwrap_or(AddrMode::Direct), field)))
}

/// Parses the content of a line containing an instruction without consuming
/// the line ending.
///
/// The modifier and either operand may be omitted: a missing modifier
/// resolves to the ICWS '94 default and missing operands default to `$0`.
pub fn instruction_line(
    input: &str,
) -> IResult<&str, Instruction, VerboseError<&str>> {
    let (input, _) = space0(input)?;
    let (input, opcode) = opcode(input)?;
    let (input, modifier) = opt(preceded(tag("."), modifier))(input)?;
    let (input, operands) =
        opt(pair(operand, opt(preceded(tag(","), operand))))(input)?;
    let (a, b) = match operands {
        None => (Operand::direct(0), Operand::direct(0)),
        Some((a, None)) => (a, Operand::direct(0)),
        Some((a, Some(b))) => (a, b),
    };
    Ok((input, Instruction::new(opcode, modifier, a, b)))
}

/// Parses the content of a comment line without consuming the line ending
pub fn comment_line(input: &str) -> IResult<&str, &str, VerboseError<&str>> {
    preceded(preceded(space0, tag(";")), alt((is_not("\r\n"), space0)))(input)
}

/// Parses the content of an ORG line without consuming the line ending
pub fn org_line(input: &str) -> IResult<&str, i64, VerboseError<&str>> {
    let prefix = preceded(space0, tag_no_case("ORG"));
    preceded(prefix, number)(input)
}

/// Parses the content of an END line without consuming the line ending
/// (or eof)
pub fn end_line(input: &str) -> IResult<&str, Option<i64>, VerboseError<&str>> {
    let prefix = preceded(space0, tag_no_case("END"));
    let maybe_num = alt((map(number, Some), map(space0, |_| None)));
    preceded(prefix, maybe_num)(input)
}

/// Matches the content of an empty line without consuming an eol or eof.
/// This is explicitly allowed to not consume any input and return success.
pub fn empty_line(input: &str) -> IResult<&str, (), VerboseError<&str>> {
    map(space0, |_| ())(input)
}
