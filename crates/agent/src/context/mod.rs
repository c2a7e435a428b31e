//! Instruction context: the layered system instruction and language modes.

pub mod assembler;
pub mod language;

pub use assembler::{InstructionAssembler, build_prompt};
pub use language::Language;
