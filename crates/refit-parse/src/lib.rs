#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

//! Front end for the Java subset the rewriter operates on: lexing,
//! parsing, and attribution of names and types.

mod attr;
mod lexer;
mod parser;
mod token;

pub use attr::attribute;
pub use parser::{parse_expr_str, parse_str};

use refit_ast::ast::CompilationUnit;
use refit_types::ClassPath;

/// Parses `src` and attributes it against `classpath`, registering the
/// unit's own classes there.
pub fn parse_and_attribute(
    file: &str,
    src: &str,
    classpath: &mut ClassPath,
) -> anyhow::Result<CompilationUnit> {
    let mut unit = parse_str(file, src)?;
    attribute(&mut unit, classpath)?;
    Ok(unit)
}
