//! # Mars-Core
//!
//! Mars-Core is the execution core of a MARS (Memory Array Redcode
//! Simulator), the virtual machine at the heart of the CoreWar programming
//! game.  Warriors written in redcode share a circular [`Memory`] and
//! compete by overwriting each other's instructions with cells that kill
//! the threads executing them.
//!
//! The core is single-threaded and cooperative: a "thread" is a program
//! counter in a warrior's FIFO queue, and every [`Warrior::run`] call
//! executes exactly one instruction.  A tournament driver ([`Mars`], or an
//! external one) alternates `run` across warriors in a fixed order, which
//! makes any match bit-for-bit reproducible from its initial state.
//!
//! ## Usage
//!
//! ```
//! use mars_core::{Memory, Warrior};
//!
//! let mut memory = Memory::new(8000);
//! let mut imp = Warrior::from_source("MOV 0, 1").unwrap();
//! memory.load(0, &mut imp);
//! assert_eq!(imp.threads(), vec![0]);
//!
//! imp.run(&mut memory).unwrap();
//! assert_eq!(imp.threads(), vec![1]);
//! assert_eq!(memory.read(1).to_string(), "MOV.I $0, $1");
//! ```
//!
//! UIs and debuggers observe a match through the memory's change-callback
//! channel ([`Memory::add_callback`]), which reports every cell replacement
//! before it lands, including the side-effect writes of the `{`, `}`, `<`,
//! and `>` addressing modes.
//!
//! Redcode-level faults are not host errors: executing a `DAT` or dividing
//! by zero silently removes the executing thread from its warrior's queue.
//! Host-level misuse (running a dead warrior, conflicting loads, oversized
//! programs, unparsable source) surfaces as a [`MarsError`].

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

// Use no-std collections
extern crate alloc;

/// An offset into the core.  Any signed value is accepted at API
/// boundaries; [`Memory`] reduces it modulo the core size before use.
pub type CoreAddr = redcode::FieldValue;

/// Error kinds surfaced by the core
mod error;
pub use error::{MarsError, MarsResult};

/// Match configuration options
mod properties;
pub use properties::MarsProperties;

/// The circular, change-notifying core
mod memory;
pub use memory::{CallbackId, ChangeCallback, Memory};

/// Operand evaluation, including the side-effecting addressing modes
mod operands;

/// Per-opcode execution against evaluated operands
mod ops;

/// Warriors and their FIFO thread queues
mod warrior;
pub use warrior::Warrior;

/// The round-robin match driver
mod mars;
pub use mars::{Mars, Outcome};
