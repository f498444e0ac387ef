use std::collections::BTreeSet;

use refit_ast::span::Span;
use serde::Serialize;

/// Replace the text at `span` with `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub span: Span,
    pub text: String,
}

/// A located text edit: replacements ordered by start offset, plus the
/// imports the new text relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuggestedFix {
    replacements: Vec<Replacement>,
    imports_to_add: BTreeSet<String>,
}

impl SuggestedFix {
    pub fn builder() -> SuggestedFixBuilder {
        SuggestedFixBuilder::default()
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    pub fn imports_to_add(&self) -> &BTreeSet<String> {
        &self.imports_to_add
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty() && self.imports_to_add.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SuggestedFixBuilder {
    fix: SuggestedFix,
}

impl SuggestedFixBuilder {
    pub fn replace(mut self, span: Span, text: impl Into<String>) -> Self {
        self.fix.replacements.push(Replacement {
            span,
            text: text.into(),
        });
        self
    }

    pub fn add_import(mut self, qualified_name: impl Into<String>) -> Self {
        self.fix.imports_to_add.insert(qualified_name.into());
        self
    }

    pub fn add_imports<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fix
            .imports_to_add
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn build(mut self) -> SuggestedFix {
        self.fix
            .replacements
            .sort_by_key(|r| (r.span.start, r.span.end));
        self.fix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_orders_replacements() {
        let fix = SuggestedFix::builder()
            .replace(Span::new(10, 12), "b")
            .replace(Span::new(2, 4), "a")
            .add_import("java.util.Objects")
            .add_import("java.util.Objects")
            .build();
        let starts: Vec<u32> = fix.replacements().iter().map(|r| r.span.start).collect();
        assert_eq!(starts, vec![2, 10]);
        assert_eq!(fix.imports_to_add().len(), 1);
        assert!(!fix.is_empty());
        assert!(SuggestedFix::builder().build().is_empty());
    }
}
