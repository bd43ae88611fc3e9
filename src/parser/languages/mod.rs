//! Tree-sitter grammar factories.
//!
//! Each module wraps one grammar crate in a `TreeSitterParser`. Language
//! profiles pick the factory that matches a file extension.

pub mod go;
pub mod javascript;
pub mod python;
pub mod rust_lang;
pub mod typescript;
