//! Class names visible in a compilation unit without qualification.

use refit_types::ClassPath;

use crate::ast::CompilationUnit;

/// Simple class names resolve through, in order: classes of the unit,
/// single-type imports, the unit's own package, on-demand imports, and
/// `java.lang`.
#[derive(Debug, Clone, Default)]
pub struct ImportScope {
    package: String,
    unit_classes: Vec<String>,
    single: Vec<String>,
    on_demand: Vec<String>,
}

impl ImportScope {
    pub fn of(unit: &CompilationUnit) -> Self {
        let mut scope = ImportScope {
            package: unit.package_name(),
            ..Default::default()
        };
        scope.unit_classes = unit
            .classes
            .iter()
            .map(|c| scope.qualify(&c.name.text))
            .collect();
        for import in &unit.imports {
            if import.on_demand {
                scope.on_demand.push(import.name.text());
            } else {
                scope.single.push(import.name.text());
            }
        }
        scope
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Qualified name of a top-level class `simple` in this unit's package.
    pub fn qualify(&self, simple: &str) -> String {
        if self.package.is_empty() {
            simple.to_string()
        } else {
            format!("{}.{}", self.package, simple)
        }
    }

    /// Whether `import <qualified>;` is already written in the unit.
    pub fn has_single_import(&self, qualified: &str) -> bool {
        self.single.iter().any(|s| s == qualified)
    }

    pub fn resolve_simple(&self, cp: &ClassPath, simple: &str) -> Option<String> {
        let last_is = |qn: &&String| qn.rsplit('.').next() == Some(simple);
        if let Some(qn) = self.unit_classes.iter().find(last_is) {
            return Some(qn.clone());
        }
        if let Some(qn) = self.single.iter().find(last_is) {
            return cp.contains(qn).then(|| qn.clone());
        }
        if let Some(class) = cp.lookup_in_package(&self.package, simple) {
            return Some(class.qualified_name.clone());
        }
        if let Some(qn) = self
            .on_demand
            .iter()
            .map(|pkg| format!("{pkg}.{simple}"))
            .find(|qn| cp.contains(qn))
        {
            return Some(qn);
        }
        cp.lookup_in_package("java.lang", simple)
            .map(|c| c.qualified_name.clone())
    }

    /// Resolves a dotted type name: first segment as a simple name with
    /// the rest as nested classes, else the whole path as a qualified name.
    pub fn resolve_path(&self, cp: &ClassPath, path: &[String]) -> Option<String> {
        let (first, rest) = path.split_first()?;
        if let Some(outer) = self.resolve_simple(cp, first) {
            let mut qn = outer;
            for seg in rest {
                qn = format!("{qn}.{seg}");
            }
            if rest.is_empty() || cp.contains(&qn) {
                return Some(qn);
            }
        }
        let qn = path.join(".");
        cp.contains(&qn).then_some(qn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassDecl, Ident, Import, QualName};
    use crate::span::Span;

    fn qual(text: &str) -> QualName {
        QualName {
            segments: text
                .split('.')
                .map(|s| Ident {
                    text: s.into(),
                    span: Span::DUMMY,
                })
                .collect(),
            span: Span::DUMMY,
        }
    }

    fn unit(package: Option<&str>, imports: &[(&str, bool)], classes: &[&str]) -> CompilationUnit {
        CompilationUnit {
            package: package.map(qual),
            imports: imports
                .iter()
                .map(|(name, on_demand)| Import {
                    name: qual(name),
                    on_demand: *on_demand,
                    span: Span::DUMMY,
                })
                .collect(),
            classes: classes
                .iter()
                .map(|name| ClassDecl {
                    name: Ident {
                        text: (*name).into(),
                        span: Span::DUMMY,
                    },
                    superclass: None,
                    members: vec![],
                    span: Span::DUMMY,
                })
                .collect(),
            span: Span::DUMMY,
        }
    }

    #[test]
    fn unit_classes_shadow_java_lang() {
        let cp = ClassPath::with_builtins();
        let scope = ImportScope::of(&unit(Some("p"), &[], &["String"]));
        assert_eq!(scope.resolve_simple(&cp, "String").as_deref(), Some("p.String"));
        assert_eq!(
            scope.resolve_simple(&cp, "Integer").as_deref(),
            Some("java.lang.Integer")
        );
    }

    #[test]
    fn single_imports_before_on_demand() {
        let cp = ClassPath::with_builtins();
        let scope = ImportScope::of(&unit(
            None,
            &[("java.util", true), ("java.util.Map", false)],
            &[],
        ));
        assert_eq!(scope.resolve_simple(&cp, "List").as_deref(), Some("java.util.List"));
        assert_eq!(
            scope.resolve_path(&cp, &["Map".into(), "Entry".into()]).as_deref(),
            Some("java.util.Map.Entry")
        );
        assert!(scope.has_single_import("java.util.Map"));
        assert!(scope.resolve_simple(&cp, "Missing").is_none());
    }
}
