#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![forbid(unsafe_code)]

//! Host type model: primitive, class and array types, class symbols, and
//! the class path that answers resolution and applicability queries.

mod builtins;
mod classpath;
mod symbol;
mod types;

pub use classpath::{ClassPath, ClassPathError};
pub use symbol::{top_level_of, ClassKind, ClassSymbol, FieldSig, MethodSig, Symbol};
pub use types::{PrimKind, Type};
