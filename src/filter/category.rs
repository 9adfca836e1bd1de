//! Category visibility toggles for categorical legends.

use super::FilterPredicate;
use crate::ramp::CategoryPalette;
use ahash::AHashSet;
use serde::Serialize;
use std::collections::BTreeSet;

/// One legend toggle: a palette category, or the bucket of every category
/// past the palette limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToggleKey {
    Value(String),
    Other,
}

impl ToggleKey {
    pub fn value(v: impl Into<String>) -> Self {
        ToggleKey::Value(v.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryToggle {
    column: String,
    categories: Vec<String>,
    overflow: Vec<String>,
    category_set: AHashSet<String>,
    overflow_set: AHashSet<String>,
    hidden: BTreeSet<String>,
    other_hidden: bool,
}

impl CategoryToggle {
    /// Toggle state over the palette's categories, all visible.
    pub fn new(column: impl Into<String>, palette: &CategoryPalette) -> Self {
        let categories: Vec<String> = palette.entries().iter().map(|(v, _)| v.clone()).collect();
        let overflow = palette.overflow().to_vec();
        Self {
            column: column.into(),
            category_set: categories.iter().cloned().collect(),
            overflow_set: overflow.iter().cloned().collect(),
            categories,
            overflow,
            hidden: BTreeSet::new(),
            other_hidden: false,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    fn has_other(&self) -> bool {
        !self.overflow.is_empty()
    }

    /// Toggle keys in legend order; [`ToggleKey::Other`] last when overflow exists.
    pub fn keys(&self) -> impl Iterator<Item = ToggleKey> + '_ {
        self.categories
            .iter()
            .map(|c| ToggleKey::Value(c.clone()))
            .chain(self.has_other().then_some(ToggleKey::Other))
    }

    pub fn is_visible(&self, key: &ToggleKey) -> bool {
        match key {
            ToggleKey::Value(v) => !self.hidden.contains(v),
            ToggleKey::Other => !self.other_hidden,
        }
    }

    /// True when at least one toggle is off.
    pub fn any_hidden(&self) -> bool {
        !self.hidden.is_empty() || self.other_hidden
    }

    /// Flip one key's visibility. Unknown keys are ignored.
    pub fn toggle(&mut self, key: &ToggleKey) -> FilterPredicate {
        match key {
            ToggleKey::Value(v) if self.category_set.contains(v) => {
                if !self.hidden.remove(v) {
                    self.hidden.insert(v.clone());
                }
            }
            ToggleKey::Other if self.has_other() => self.other_hidden = !self.other_hidden,
            _ => {}
        }
        self.predicate()
    }

    pub fn reset(&mut self) -> FilterPredicate {
        self.hidden.clear();
        self.other_hidden = false;
        self.predicate()
    }

    /// No filter when everything is visible, always-false when nothing is,
    /// otherwise the visible values (overflow values included while "Other" is visible).
    pub fn predicate(&self) -> FilterPredicate {
        if !self.any_hidden() {
            return FilterPredicate::ShowAll;
        }
        let mut values: Vec<String> = self
            .categories
            .iter()
            .filter(|c| !self.hidden.contains(*c))
            .cloned()
            .collect();
        if self.has_other() && !self.other_hidden {
            values.extend(self.overflow.iter().cloned());
        }
        if values.is_empty() {
            FilterPredicate::AlwaysFalse
        } else {
            FilterPredicate::Include {
                column: self.column.clone(),
                values,
            }
        }
    }

    /// Whether a row's category value passes the current toggles.
    pub fn admits(&self, value: &str) -> bool {
        if self.category_set.contains(value) {
            !self.hidden.contains(value)
        } else {
            !self.other_hidden && self.overflow_set.contains(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle(values: &[&str], limit: usize) -> CategoryToggle {
        CategoryToggle::new("kind", &CategoryPalette::assign(values.iter().copied(), limit))
    }

    #[test]
    fn toggle_pair_restores_show_all() {
        let mut t = toggle(&["a", "b", "c"], 20);
        let p = t.toggle(&ToggleKey::value("b"));
        assert_eq!(
            p,
            FilterPredicate::Include {
                column: "kind".into(),
                values: vec!["a".into(), "c".into()],
            }
        );
        assert_eq!(t.toggle(&ToggleKey::value("b")), FilterPredicate::ShowAll);
    }

    #[test]
    fn hiding_everything_is_always_false() {
        let mut t = toggle(&["a", "b"], 20);
        t.toggle(&ToggleKey::value("a"));
        assert_eq!(t.toggle(&ToggleKey::value("b")), FilterPredicate::AlwaysFalse);
        assert_eq!(t.reset(), FilterPredicate::ShowAll);
    }

    #[test]
    fn other_bucket_controls_overflow() {
        let mut t = toggle(&["a", "b", "c", "d"], 2);
        assert_eq!(
            t.keys().collect::<Vec<_>>(),
            vec![ToggleKey::value("a"), ToggleKey::value("b"), ToggleKey::Other]
        );
        match t.toggle(&ToggleKey::value("a")) {
            FilterPredicate::Include { values, .. } => {
                assert_eq!(values, vec!["b", "c", "d"]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(t.admits("c"));
        t.toggle(&ToggleKey::Other);
        assert!(!t.admits("c"));
        assert!(t.admits("b"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut t = toggle(&["a"], 20);
        assert_eq!(t.toggle(&ToggleKey::value("zzz")), FilterPredicate::ShowAll);
        assert_eq!(t.toggle(&ToggleKey::Other), FilterPredicate::ShowAll);
        assert!(!t.any_hidden());
    }

    #[test]
    fn value_named_like_a_bucket_is_an_ordinary_category() {
        let mut t = toggle(&["other", "__other__", "c", "d"], 2);
        let keys: Vec<_> = t.keys().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[1], ToggleKey::value("__other__"));

        t.toggle(&ToggleKey::value("__other__"));
        assert!(!t.admits("__other__"));
        assert!(t.is_visible(&ToggleKey::Other));
        assert!(t.admits("c"));
        assert!(t.admits("other"));
    }

    #[test]
    fn high_cardinality_overflow_admits_by_lookup() {
        let values: Vec<String> = (0..10_000).map(|i| format!("id-{i}")).collect();
        let palette = CategoryPalette::assign(values.iter().map(String::as_str), 20);
        let mut t = CategoryToggle::new("id", &palette);
        assert!(t.admits("id-9999"));
        assert!(!t.admits("id-10000"));

        t.toggle(&ToggleKey::Other);
        let admitted = values.iter().filter(|v| t.admits(v)).count();
        assert_eq!(admitted, 20);
        match t.predicate() {
            FilterPredicate::Include { values, .. } => assert_eq!(values.len(), 20),
            other => panic!("unexpected {other:?}"),
        }
    }
}
