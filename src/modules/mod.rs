//! Domain-facing API: sequences, FASTA text, primers and assembly design

pub mod seq;
pub mod io;
pub mod primer;
pub mod assembly;
