//! The `fix bond/react` map file.

mod writer;

pub use writer::write as write_map;
