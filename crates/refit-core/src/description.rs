use refit_ast::span::Span;
use serde::{Deserialize, Serialize};

use crate::fix::SuggestedFix;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    #[default]
    Warning,
    Suggestion,
    NotAProblem,
}

/// One reported match: where, what to say, and how to fix it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    pub checker: String,
    pub span: Span,
    pub message: String,
    pub fix: SuggestedFix,
    pub severity: Severity,
}

/// Receives descriptions as a transformer produces them.
pub trait DescriptionListener {
    fn on_described(&mut self, description: Description);
}

impl<F: FnMut(Description)> DescriptionListener for F {
    fn on_described(&mut self, description: Description) {
        self(description)
    }
}

impl DescriptionListener for Vec<Description> {
    fn on_described(&mut self, description: Description) {
        self.push(description);
    }
}
