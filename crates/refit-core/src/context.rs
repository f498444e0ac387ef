//! The host compilation as seen by the rewriter: the attributed unit, its
//! source text, and the class path it was attributed against.

use refit_ast::ast::CompilationUnit;
use refit_ast::path::{path_for, NodeRef, TreePath};
use refit_ast::scope::ImportScope;
use refit_types::{ClassPath, ClassPathError, ClassSymbol, Type};

/// Read-only for the whole transformation run; shared by every match attempt.
#[derive(Debug)]
pub struct HostContext<'a> {
    source: &'a str,
    unit: &'a CompilationUnit,
    classpath: &'a ClassPath,
    scope: ImportScope,
}

impl<'a> HostContext<'a> {
    pub fn new(source: &'a str, unit: &'a CompilationUnit, classpath: &'a ClassPath) -> Self {
        Self {
            source,
            unit,
            classpath,
            scope: ImportScope::of(unit),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn unit(&self) -> &'a CompilationUnit {
        self.unit
    }

    pub fn classpath(&self) -> &'a ClassPath {
        self.classpath
    }

    pub fn scope(&self) -> &ImportScope {
        &self.scope
    }

    pub fn resolve(&self, qualified_name: &str) -> Result<&'a ClassSymbol, ClassPathError> {
        self.classpath.resolve(qualified_name)
    }

    pub fn is_applicable(&self, expected: &[Type], actual: &[Type]) -> bool {
        self.classpath.is_applicable(expected, actual)
    }

    /// The class a simple name currently denotes in the unit, if any.
    pub fn visible_class(&self, simple: &str) -> Option<String> {
        self.scope.resolve_simple(self.classpath, simple)
    }

    pub fn path_for(&self, node: NodeRef<'_>) -> Option<TreePath<'a>> {
        path_for(self.unit, node)
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn indentation_at(&self, offset: u32) -> &'a str {
        let offset = (offset as usize).min(self.source.len());
        let line_start = self.source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line = &self.source[line_start..];
        let width = line
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(line.len());
        &line[..width]
    }
}
