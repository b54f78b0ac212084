//! Parsing functions for CoreWar's redcode syntax.
//!
//! Accepts the '94 loadfile instruction grammar with the relaxations used by
//! common MARS implementations: modifiers may be omitted (the ICWS '94
//! default for the opcode and addressing modes is resolved), operands may be
//! omitted (defaulting to `$0`), and bare numbers are direct-mode.
//!
//! ```
//! use redcode::{Modifier, Opcode};
//! use redcode_parser::parse_instruction;
//!
//! let imp = parse_instruction("MOV 0, 1").unwrap();
//! assert_eq!(imp.opcode, Opcode::Mov);
//! assert_eq!(imp.modifier, Modifier::I);
//! assert_eq!(imp.to_string(), "MOV.I $0, $1");
//! ```

// Make clippy as annoying as possible
#![deny(
    // All typically enabled warnings are converted into errors
    // includes correctness, suspicious, style, complexity, and perf
    clippy::all,
    // Error on cargo lints
    clippy::cargo,
)]
#![warn(
    // Warn on pedantic and in-development nursery lints
    clippy::pedantic,
    clippy::nursery,
    // Lints from "restriction" group - enforce a consistent if arbitrary style
    clippy::alloc_instead_of_core,
    clippy::unnecessary_cast,
    clippy::as_underscore,
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::empty_structs_with_brackets,
    clippy::exit,
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::if_then_some_else_none,
    clippy::let_underscore_must_use,
    clippy::map_err_ignore,
    clippy::mem_forget,
    clippy::missing_docs_in_private_items,
    clippy::mod_module_files,
    clippy::multiple_inherent_impl,
    clippy::panic_in_result_fn,
    clippy::print_stderr,
    clippy::print_stdout,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::same_name_method,
    clippy::unseparated_literal_suffix,
    clippy::shadow_unrelated,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::str_to_string,
    clippy::string_slice,
    clippy::string_to_string,
    clippy::todo,
    clippy::try_err,
    clippy::unimplemented,
    clippy::unnecessary_self_imports,
    clippy::unneeded_field_pattern,
    clippy::unreachable,
    clippy::unwrap_in_result,
    clippy::unwrap_used,
    clippy::use_debug,
    clippy::verbose_file_reads,
)]

/// Owned error type identifying the unparsable token
mod error;
pub use error::ParseError;

/// Public parsing entry points for single instructions and whole warriors
mod source_parser;
pub use source_parser::{parse_instruction, parse_program};

/// Internal functions which evaluate the content of a single line, without
/// consuming any newline characters
mod line_parser;

/// Internal functions which parse well defined primitives from the redcode
/// grammar
mod primitives;
