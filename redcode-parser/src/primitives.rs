use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{i64, line_ending, space0},
    combinator::map,
    error::{VerboseError, VerboseErrorKind},
    sequence::delimited,
    IResult,
};
use redcode::{
    AddrMode, AddrMode::*, Modifier, Modifier::*, Opcode, Opcode::*,
};

/// Consumes exactly one line ending
pub fn eol(input: &str) -> IResult<&str, &str, VerboseError<&str>> {
    line_ending(input)
}

/// Consumes an optionally signed integer and any surrounding spaces
pub fn number(input: &str) -> IResult<&str, i64, VerboseError<&str>> {
    delimited(space0, only_number, space0)(input)
}

/// Consumes an optionally signed integer.  A leading `+` is accepted only
/// when followed directly by digits.
fn only_number(input: &str) -> IResult<&str, i64, VerboseError<&str>> {
    match input.strip_prefix('+') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => {
            i64(rest)
        }
        Some(_) => Err(nom::Err::Error(VerboseError {
            errors: vec![(
                input,
                VerboseErrorKind::Context("expected digits after sign"),
            )],
        })),
        None => i64(input),
    }
}

/// Consumes exactly one opcode and returns the enum.
///
/// `SEQ` is the pMARS-era synonym for `CMP` and parses to [`Opcode::Cmp`].
pub fn opcode(input: &str) -> IResult<&str, Opcode, VerboseError<&str>> {
    alt((
        map(tag_no_case("DAT"), |_| Dat),
        map(tag_no_case("MOV"), |_| Mov),
        map(tag_no_case("ADD"), |_| Add),
        map(tag_no_case("SUB"), |_| Sub),
        map(tag_no_case("MUL"), |_| Mul),
        map(tag_no_case("DIV"), |_| Div),
        map(tag_no_case("MOD"), |_| Mod),
        map(tag_no_case("JMP"), |_| Jmp),
        map(tag_no_case("JMZ"), |_| Jmz),
        map(tag_no_case("JMN"), |_| Jmn),
        map(tag_no_case("DJN"), |_| Djn),
        map(tag_no_case("SPL"), |_| Spl),
        map(tag_no_case("SLT"), |_| Slt),
        map(tag_no_case("CMP"), |_| Cmp),
        map(tag_no_case("SEQ"), |_| Cmp),
        map(tag_no_case("NOP"), |_| Nop),
    ))(input)
}

/// Consumes exactly one addressing mode sigil
pub fn addr_mode(input: &str) -> IResult<&str, AddrMode, VerboseError<&str>> {
    alt((
        map(tag("#"), |_| Immediate),
        map(tag("$"), |_| Direct),
        map(tag("*"), |_| IndirectA),
        map(tag("@"), |_| IndirectB),
        map(tag("{"), |_| PredecA),
        map(tag("<"), |_| PredecB),
        map(tag("}"), |_| PostincA),
        map(tag(">"), |_| PostincB),
    ))(input)
}

/// Consumes exactly one modifier.  Two letter modifiers are checked first so
/// that `AB` is not read as `A` followed by stray input.
pub fn modifier(input: &str) -> IResult<&str, Modifier, VerboseError<&str>> {
    alt((
        map(tag_no_case("AB"), |_| AB),
        map(tag_no_case("BA"), |_| BA),
        map(tag_no_case("A"), |_| A),
        map(tag_no_case("B"), |_| B),
        map(tag_no_case("X"), |_| X),
        map(tag_no_case("F"), |_| F),
        map(tag_no_case("I"), |_| I),
    ))(input)
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;

    use super::*;

    #[test]
    fn check_opcode_parsing() {
        assert_eq!(opcode("DAT"), Ok(("", Dat)));
        assert_eq!(opcode("dAtfollowingcrap"), Ok(("followingcrap", Dat)));
        assert_eq!(opcode("seq"), Ok(("", Cmp)));
        assert!(opcode(" dat").is_err());
        assert!(opcode("ORG").is_err());
    }

    #[test]
    fn check_mode_parsing() {
        assert_eq!(addr_mode("**"), Ok(("*", IndirectA)));
        assert_eq!(
            addr_mode("#followingcrap"),
            Ok(("followingcrap", Immediate))
        );
        assert_eq!(addr_mode("<5"), Ok(("5", PredecB)));
        assert_eq!(addr_mode(">5"), Ok(("5", PostincB)));
        assert!(addr_mode(" {").is_err());
    }

    #[test]
    fn check_modifier_parsing() {
        assert_eq!(modifier("BA"), Ok(("", BA)));
        assert_eq!(modifier("B A"), Ok((" A", B)));
        assert_eq!(modifier("ab"), Ok(("", AB)));
        assert!(modifier(" a b").is_err());
    }

    #[test]
    fn check_number_parsing() {
        assert_eq!(number("42"), Ok(("", 42)));
        assert_eq!(number(" -7 ,"), Ok((",", -7)));
        assert_eq!(number("+13"), Ok(("", 13)));
        assert!(number("+-13").is_err());
        assert!(number("abc").is_err());
    }
}
