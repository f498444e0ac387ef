#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

//! Template matching and rewriting over an attributed compilation unit.
//!
//! A template's pattern tree is unified against nodes of the unit; a
//! successful [`Unifier`] is type-checked, wrapped in a match, and later
//! inlined into another template to produce a [`SuggestedFix`].

pub mod annotations;
pub mod context;
pub mod description;
pub mod diff;
pub mod fix;
pub mod import_policy;
pub mod inliner;
pub mod precedence;
pub mod rule;
pub mod template;
pub mod transformer;
pub mod typecheck;
pub mod unifier;
pub mod utree;

pub use annotations::{Annotation, AnnotationKind, Annotations};
pub use context::HostContext;
pub use description::{Description, DescriptionListener, Severity};
pub use diff::{DescriptionBasedDiff, DiffError};
pub use fix::{Replacement, SuggestedFix};
pub use import_policy::ImportPolicy;
pub use inliner::{CouldNotResolveImport, Inlineable, Inliner};
pub use rule::{RuleDef, RuleError, RuleSet};
pub use template::{
    BlockTemplate, BlockTemplateMatch, ExpressionTemplate, ExpressionTemplateMatch, Template,
    TemplateError, TemplateMatch,
};
pub use transformer::{CodeTransformer, CompositeCodeTransformer, RefasterRule};
pub use unifier::{Mismatch, Unifiable, Unifier};
