use nom::{
    branch::alt,
    combinator::{eof, map, opt},
    error::VerboseError,
    sequence::{pair, terminated},
    IResult,
};
use redcode::{Instruction, Program};

use crate::{
    error::ParseError,
    line_parser::{
        comment_line, empty_line, end_line, instruction_line, org_line,
    },
    primitives::eol,
};

/// A container for the parsed contents of a bit of the input, either
/// terminated by an EOL, an EOF, or an END line (which itself may be
/// terminated by EOF or EOL)
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum LineContent {
    /// A line holding nothing but a comment
    Comment,
    /// A parsed instruction from the input
    Instruction(Instruction),
    /// A line that was parsed but contained only whitespace
    Empty,
    /// An ORG pseudo-op.  If multiple ORG statements exist, the last
    /// statement takes effect.
    Org(i64),
    /// The end of warrior parsing, optionally with the END argument
    /// declaring the start position.  An END argument overrides any prior
    /// ORG statement.
    End(Option<i64>),
}

/// Parses the content of a line.  If the result is [`LineContent::End`], no
/// further calls to `parse_line` should be made.
fn parse_line(
    input: &str,
) -> IResult<&str, LineContent, VerboseError<&str>> {
    // Parse the content from an eol or eof terminated segment of input.
    // Instructions and pseudo-ops may carry a trailing comment.
    let body_content_parser = alt((
        map(instruction_line, LineContent::Instruction),
        map(org_line, LineContent::Org),
        map(comment_line, |_| LineContent::Comment),
        map(empty_line, |_| LineContent::Empty),
    ));
    let body_content_parser = terminated(
        body_content_parser,
        pair(opt(comment_line), alt((eof, eol))),
    );

    // Parse the various situations that terminate warrior parsing
    let end_content_parser = alt((
        // an "END" tag, regardless of how it is terminated
        map(end_line, LineContent::End),
        // an eof, optionally preceded by some whitespace
        map(pair(empty_line, eof), |_| LineContent::End(None)),
    ));

    // end_content_parser *MUST* be checked before body_content_parser or
    // else an empty line terminated by eof would be parsed as body content
    // forever
    alt((end_content_parser, body_content_parser))(input)
}

/// Parse a warrior from redcode source text.
///
/// Parsing stops at an `END` line or the end of the input; anything after
/// `END` is ignored.  An empty source yields an empty program.
///
/// # Errors
///
/// Returns a [`ParseError`] locating the first line that does not match the
/// redcode grammar.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let mut input = source;
    let mut code = vec![];
    let mut origin = None;

    loop {
        match parse_line(input) {
            Ok((leftover, content)) => {
                input = leftover;
                match content {
                    LineContent::Empty | LineContent::Comment => {}
                    LineContent::Instruction(instr) => code.push(instr),
                    LineContent::Org(start) => origin = Some(start),
                    LineContent::End(Some(start)) => {
                        origin = Some(start);
                        break;
                    }
                    LineContent::End(None) => break,
                }
            }
            Err(_) => return Err(ParseError::locate(source, input)),
        }
    }
    Ok(Program::new(code, origin.unwrap_or(0)))
}

/// Parse a single instruction from the input.
///
/// The instruction does not need to be on the first line of the input, but
/// the first line containing any content must be a valid instruction.
/// Content on later lines is ignored.
///
/// # Errors
///
/// Returns a [`ParseError`] if no instruction is found before the end of the
/// input, or if the first non-blank line is not an instruction.
pub fn parse_instruction(input: &str) -> Result<Instruction, ParseError> {
    let mut remaining = input;
    loop {
        match parse_line(remaining) {
            Ok((leftover, LineContent::Empty)) => {
                remaining = leftover;
            }
            Ok((_, LineContent::Instruction(instr))) => return Ok(instr),
            Ok(_) | Err(_) => {
                return Err(ParseError::locate(input, remaining))
            }
        }
    }
}
