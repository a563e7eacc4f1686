use std::collections::{HashMap, HashSet};

/// Field projection selector parsed from a request parameter.
///
/// The selector is a comma-separated list of `typeName:fieldName` entries.
/// `typeName:*` keeps every field of that type, and a type with no entries
/// at all keeps everything.
///
/// ```
/// use hypercast::v1::Fields;
///
/// let fields = Fields::parse("BlogPosting:headline, Person:*");
/// let blog = fields.predicate(&["BlogPosting".to_string()]);
/// assert!(blog.includes("headline"));
/// assert!(!blog.includes("articleBody"));
///
/// let person = fields.predicate(&["Person".to_string()]);
/// assert!(person.includes("email"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    by_type: HashMap<String, Selection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    All,
    Only(HashSet<String>),
}

impl Fields {
    /// Selector that keeps every field of every type.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn parse(selector: &str) -> Self {
        let mut by_type: HashMap<String, Selection> = HashMap::new();
        for entry in selector.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let Some((type_name, field)) = entry.split_once(':') else {
                tracing::debug!(entry, "ignoring field selector entry without a type prefix");
                continue;
            };
            let (type_name, field) = (type_name.trim(), field.trim());
            if type_name.is_empty() || field.is_empty() {
                tracing::debug!(entry, "ignoring incomplete field selector entry");
                continue;
            }
            if field == "*" {
                by_type.insert(type_name.to_string(), Selection::All);
                continue;
            }
            match by_type
                .entry(type_name.to_string())
                .or_insert_with(|| Selection::Only(HashSet::new()))
            {
                Selection::All => {}
                Selection::Only(set) => {
                    set.insert(field.to_string());
                }
            }
        }
        Self { by_type }
    }

    /// Parse an optional selector; `None` keeps everything.
    pub fn from_param(selector: Option<&str>) -> Self {
        selector.map(Self::parse).unwrap_or_default()
    }

    /// Build the inclusion predicate for a model declaring `type_names`.
    ///
    /// Entries for every listed type are merged. When none of the types is
    /// mentioned in the selector, all fields are kept.
    pub fn predicate(&self, type_names: &[String]) -> FieldPredicate {
        let mut selected: Option<HashSet<String>> = None;
        for type_name in type_names {
            match self.by_type.get(type_name) {
                Some(Selection::All) => return FieldPredicate::All,
                Some(Selection::Only(fields)) => {
                    selected
                        .get_or_insert_with(HashSet::new)
                        .extend(fields.iter().cloned());
                }
                None => {}
            }
        }
        match selected {
            Some(fields) => FieldPredicate::Only(fields),
            None => FieldPredicate::All,
        }
    }
}

/// Decides whether a field, link or relation key is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPredicate {
    All,
    Only(HashSet<String>),
}

impl FieldPredicate {
    pub fn includes(&self, name: &str) -> bool {
        match self {
            FieldPredicate::All => true,
            FieldPredicate::Only(fields) => fields.contains(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unmentioned_type_keeps_everything() {
        let fields = Fields::parse("Person:name");
        let p = fields.predicate(&types(&["BlogPosting"]));
        assert!(p.includes("headline"));
        assert_eq!(p, FieldPredicate::All);
    }

    #[test]
    fn test_selected_fields_only() {
        let fields = Fields::parse("BlogPosting:headline,BlogPosting:author");
        let p = fields.predicate(&types(&["BlogPosting"]));
        assert!(p.includes("headline"));
        assert!(p.includes("author"));
        assert!(!p.includes("alternativeHeadline"));
    }

    #[test]
    fn test_wildcard_beats_explicit_entries() {
        let fields = Fields::parse("Person:name, Person:*");
        assert_eq!(fields.predicate(&types(&["Person"])), FieldPredicate::All);

        let fields = Fields::parse("Person:*, Person:name");
        assert_eq!(fields.predicate(&types(&["Person"])), FieldPredicate::All);
    }

    #[test]
    fn test_entries_merge_across_type_names() {
        let fields = Fields::parse("Thing:name, CreativeWork:headline");
        let p = fields.predicate(&types(&["Thing", "CreativeWork"]));
        assert!(p.includes("name"));
        assert!(p.includes("headline"));
        assert!(!p.includes("text"));
    }

    #[test]
    fn test_malformed_entries_are_ignored() {
        let fields = Fields::parse("headline, :name, Person:, ,Person:email");
        let p = fields.predicate(&types(&["Person"]));
        assert!(p.includes("email"));
        assert!(!p.includes("name"));
        assert_eq!(fields.predicate(&types(&["BlogPosting"])), FieldPredicate::All);
    }

    #[test]
    fn test_from_param_none_keeps_everything() {
        let fields = Fields::from_param(None);
        assert_eq!(fields, Fields::all());
        assert!(fields.predicate(&types(&["Anything"])).includes("x"));
    }

    #[test]
    fn test_predicate_is_stable_across_calls() {
        let fields = Fields::parse("BlogPosting:headline");
        let a = fields.predicate(&types(&["BlogPosting"]));
        let b = fields.predicate(&types(&["BlogPosting"]));
        assert_eq!(a, b);
    }
}
