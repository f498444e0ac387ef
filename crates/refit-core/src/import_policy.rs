use serde::{Deserialize, Serialize};

use crate::inliner::Inliner;

/// How an inlined class reference is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
    /// Import the top-level class; nested classes are reached through it.
    #[default]
    ImportTopLevel,
    /// Import the class itself, nested or not.
    ImportClassDirectly,
    /// Never import; always write the qualified name.
    FullyQualified,
}

impl ImportPolicy {
    /// Path segments to print for class `qualified`, whose top-level class
    /// is `top_level`. Records an import on `inliner` when the short form
    /// needs one.
    pub fn class_reference(
        self,
        inliner: &mut Inliner<'_>,
        top_level: &str,
        qualified: &str,
    ) -> Vec<String> {
        let imported = match self {
            ImportPolicy::FullyQualified => return split(qualified),
            ImportPolicy::ImportTopLevel => top_level,
            ImportPolicy::ImportClassDirectly => qualified,
        };
        let simple = imported.rsplit('.').next().unwrap_or(imported);

        let visible = inliner.ctx().visible_class(simple);
        let needs_import = match visible.as_deref() {
            Some(found) if found == imported => false,
            // The simple name already means another class here.
            Some(_) => return split(qualified),
            None => true,
        };
        if needs_import {
            if inliner.import_clashes(simple, imported) {
                return split(qualified);
            }
            inliner.add_import(imported);
        }

        let mut path = vec![simple.to_string()];
        if let Some(rest) = qualified
            .strip_prefix(imported)
            .and_then(|r| r.strip_prefix('.'))
        {
            path.extend(split(rest));
        }
        path
    }
}

fn split(name: &str) -> Vec<String> {
    name.split('.').map(str::to_string).collect()
}
