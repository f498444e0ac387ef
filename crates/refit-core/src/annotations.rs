use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::import_policy::ImportPolicy;

/// Transformer-level metadata attached to templates and rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    /// Also rewrite the logical negation of the before template.
    AlsoNegation,
    UseImportPolicy { policy: ImportPolicy },
    /// Message reported for each match.
    Message { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnnotationKind {
    AlsoNegation,
    UseImportPolicy,
    Message,
}

impl Annotation {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::AlsoNegation => AnnotationKind::AlsoNegation,
            Annotation::UseImportPolicy { .. } => AnnotationKind::UseImportPolicy,
            Annotation::Message { .. } => AnnotationKind::Message,
        }
    }
}

/// At most one annotation per kind; a later one replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Annotation>", into = "Vec<Annotation>")]
pub struct Annotations {
    by_kind: BTreeMap<AnnotationKind, Annotation>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, annotation: Annotation) -> Self {
        self.insert(annotation);
        self
    }

    pub fn insert(&mut self, annotation: Annotation) {
        self.by_kind.insert(annotation.kind(), annotation);
    }

    pub fn get(&self, kind: AnnotationKind) -> Option<&Annotation> {
        self.by_kind.get(&kind)
    }

    pub fn contains(&self, kind: AnnotationKind) -> bool {
        self.by_kind.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.by_kind.values()
    }

    pub fn also_negation(&self) -> bool {
        self.contains(AnnotationKind::AlsoNegation)
    }

    pub fn import_policy(&self) -> ImportPolicy {
        match self.get(AnnotationKind::UseImportPolicy) {
            Some(Annotation::UseImportPolicy { policy }) => *policy,
            _ => ImportPolicy::default(),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self.get(AnnotationKind::Message) {
            Some(Annotation::Message { text }) => Some(text),
            _ => None,
        }
    }

    /// `self` with every annotation of `other` laid over it.
    pub fn merge(&self, other: &Annotations) -> Annotations {
        let mut merged = self.clone();
        for annotation in other.iter() {
            merged.insert(annotation.clone());
        }
        merged
    }
}

impl From<Vec<Annotation>> for Annotations {
    fn from(list: Vec<Annotation>) -> Self {
        list.into_iter().collect()
    }
}

impl From<Annotations> for Vec<Annotation> {
    fn from(annotations: Annotations) -> Self {
        annotations.by_kind.into_values().collect()
    }
}

impl FromIterator<Annotation> for Annotations {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        let mut annotations = Annotations::new();
        for annotation in iter {
            annotations.insert(annotation);
        }
        annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_annotation_of_same_kind_wins() {
        let annotations = Annotations::new()
            .with(Annotation::Message { text: "a".into() })
            .with(Annotation::Message { text: "b".into() });
        assert_eq!(annotations.message(), Some("b"));
        assert_eq!(annotations.iter().count(), 1);
    }

    #[test]
    fn defaults_without_annotations() {
        let annotations = Annotations::new();
        assert!(!annotations.also_negation());
        assert_eq!(annotations.import_policy(), ImportPolicy::ImportTopLevel);
        assert_eq!(annotations.message(), None);
    }

    #[test]
    fn deserializes_from_list() {
        let annotations: Annotations = serde_json::from_str(
            r#"[{"kind":"also_negation"},{"kind":"use_import_policy","policy":"fully_qualified"}]"#,
        )
        .unwrap();
        assert!(annotations.also_negation());
        assert_eq!(annotations.import_policy(), ImportPolicy::FullyQualified);
    }
}
