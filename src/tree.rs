//! The configuration tree the resolver reads specifications from and writes
//! resolved values into.
//!
//! A [`ConfigTree`] is a namespaced key-value store. Each [`Key`] has a
//! `/`-separated path below its [`Namespace`], a string value, and a map of
//! string-valued metadata. The resolver only needs a handful of operations:
//! stable iteration, lookup by full name, insertion, and the array-key
//! convention described below.
//!
//! # Array keys
//!
//! A key whose final path segment is `#` is an *array key*. Its concrete
//! elements live at sibling paths ending in `#0`, `#1`, ... and the array
//! parent (the path with the trailing `#` removed) carries the last index
//! label (e.g. `"#4"`) as its value:
//!
//! ```text
//! proc/items      = "#1"     array parent, value = last index
//! proc/items/#0   = "a"
//! proc/items/#1   = "b"
//! ```
//!
//! The same convention is used inside metadata names: a key bound to two
//! options carries `opt = "#1"`, `opt/#0 = ...`, `opt/#1 = ...`.

use std::collections::BTreeMap;

/// Upper bound for indices accepted by [`parse_array_index`]. Keeps a
/// corrupt last-index label from expanding into millions of slots.
const MAX_ARRAY_INDEX: usize = u16::MAX as usize;

/// The namespace a key lives in.
///
/// `Spec` holds declarations, `Proc` receives resolved process-scope
/// values, and `Cascading` keys are root-less (their full name starts with
/// `/`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    Cascading,
    Proc,
    Spec,
}

impl Namespace {
    /// Prepend this namespace to a path, producing a full key name.
    ///
    /// `Spec.qualify("items/#")` is `"spec/items/#"`; a cascading path gets
    /// a bare leading slash.
    pub fn qualify(self, path: &str) -> String {
        let prefix = match self {
            Namespace::Cascading => "",
            Namespace::Proc => "proc",
            Namespace::Spec => "spec",
        };
        if path.is_empty() {
            prefix.to_string()
        } else {
            format!("{prefix}/{path}")
        }
    }
}

/// One entry in a [`ConfigTree`]: a namespaced path with a string value and
/// string-valued metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    namespace: Namespace,
    path: String,
    value: String,
    meta: BTreeMap<String, String>,
}

impl Key {
    pub fn new(namespace: Namespace, path: impl Into<String>) -> Self {
        Key {
            namespace,
            path: path.into(),
            value: String::new(),
            meta: BTreeMap::new(),
        }
    }

    /// Builder-style value setter, for constructing keys inline.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Builder-style metadata setter, for constructing keys inline.
    pub fn with_meta(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(name.into(), value.into());
        self
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// The path below the namespace, e.g. `"items/#"`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last path segment.
    pub fn base_name(&self) -> &str {
        match self.path.rsplit_once('/') {
            Some((_, base)) => base,
            None => &self.path,
        }
    }

    /// The namespace-qualified name, e.g. `"spec/items/#"`.
    pub fn full_name(&self) -> String {
        self.namespace.qualify(&self.path)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Read a metadata value, treating an empty value as absent.
    ///
    /// Most metadata is declarative ("is this annotation present, and what
    /// does it say"); an empty string carries no information there, so this
    /// is the accessor the resolver uses throughout. Use
    /// [`meta_raw`](Self::meta_raw) when presence itself matters.
    pub fn meta_str(&self, name: &str) -> Option<&str> {
        self.meta_raw(name).filter(|v| !v.is_empty())
    }

    /// Read a metadata value exactly as stored, empty or not.
    pub fn meta_raw(&self, name: &str) -> Option<&str> {
        self.meta.get(name).map(String::as_str)
    }

    pub fn set_meta(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.meta.insert(name.into(), value.into());
    }

    /// Whether this key is an array key (last path segment is `#`).
    pub fn is_array(&self) -> bool {
        is_array_path(&self.path)
    }
}

/// A set of keys with stable, name-sorted iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigTree {
    keys: BTreeMap<String, Key>,
}

impl ConfigTree {
    pub fn new() -> Self {
        ConfigTree::default()
    }

    /// Insert a key, replacing any existing key with the same full name.
    pub fn insert(&mut self, key: Key) {
        self.keys.insert(key.full_name(), key);
    }

    /// Look up a key by its full name (e.g. `"proc/items/#0"`).
    pub fn get(&self, full_name: &str) -> Option<&Key> {
        self.keys.get(full_name)
    }

    /// Iterate all keys in name order. The order is stable across calls,
    /// which makes the compiled plan deterministic.
    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.keys.values()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Whether a path names an array key (final segment `#`).
pub fn is_array_path(path: &str) -> bool {
    path == "#" || path.ends_with("/#")
}

/// The array parent path: the path with the trailing `#` segment removed.
///
/// `"items/#"` becomes `"items"`; a bare `"#"` becomes the empty path.
pub fn array_parent(path: &str) -> &str {
    path.strip_suffix("/#")
        .or_else(|| path.strip_suffix('#'))
        .unwrap_or(path)
}

/// The path of the element at `index` under an array parent path.
pub fn array_element(parent: &str, index: usize) -> String {
    if parent.is_empty() {
        format!("#{index}")
    } else {
        format!("{parent}/#{index}")
    }
}

/// The index label stored as an array parent's value, e.g. `"#4"`.
pub fn array_index_label(index: usize) -> String {
    format!("#{index}")
}

/// Parse an index label (`"#4"` -> `4`). Labels above [`MAX_ARRAY_INDEX`]
/// and anything not of the form `#<decimal>` read as `None`.
pub(crate) fn parse_array_index(label: &str) -> Option<usize> {
    let index: usize = label.strip_prefix('#')?.parse().ok()?;
    (index <= MAX_ARRAY_INDEX).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualify_spec_and_proc() {
        assert_eq!(Namespace::Spec.qualify("verbose"), "spec/verbose");
        assert_eq!(Namespace::Proc.qualify("items/#"), "proc/items/#");
        assert_eq!(Namespace::Cascading.qualify("x"), "/x");
    }

    #[test]
    fn qualify_empty_path() {
        assert_eq!(Namespace::Spec.qualify(""), "spec");
        assert_eq!(Namespace::Cascading.qualify(""), "");
    }

    #[test]
    fn base_name_of_nested_path() {
        let key = Key::new(Namespace::Spec, "a/b/c");
        assert_eq!(key.base_name(), "c");
    }

    #[test]
    fn base_name_of_flat_path() {
        let key = Key::new(Namespace::Spec, "verbose");
        assert_eq!(key.base_name(), "verbose");
    }

    #[test]
    fn array_detection() {
        assert!(Key::new(Namespace::Spec, "items/#").is_array());
        assert!(Key::new(Namespace::Spec, "#").is_array());
        assert!(!Key::new(Namespace::Spec, "items").is_array());
        assert!(!Key::new(Namespace::Spec, "items/#0").is_array());
    }

    #[test]
    fn array_parent_strips_marker() {
        assert_eq!(array_parent("items/#"), "items");
        assert_eq!(array_parent("a/b/#"), "a/b");
        assert_eq!(array_parent("#"), "");
    }

    #[test]
    fn array_element_paths() {
        assert_eq!(array_element("items", 0), "items/#0");
        assert_eq!(array_element("items", 12), "items/#12");
        assert_eq!(array_element("", 3), "#3");
    }

    #[test]
    fn index_label_round_trip() {
        assert_eq!(parse_array_index(&array_index_label(7)), Some(7));
    }

    #[test]
    fn parse_index_rejects_garbage() {
        assert_eq!(parse_array_index("#"), None);
        assert_eq!(parse_array_index("7"), None);
        assert_eq!(parse_array_index("#x"), None);
        assert_eq!(parse_array_index("#-1"), None);
        assert_eq!(parse_array_index("#99999999999"), None);
    }

    #[test]
    fn meta_str_treats_empty_as_absent() {
        let key = Key::new(Namespace::Spec, "x")
            .with_meta("present", "1")
            .with_meta("empty", "");
        assert_eq!(key.meta_str("present"), Some("1"));
        assert_eq!(key.meta_str("empty"), None);
        assert_eq!(key.meta_raw("empty"), Some(""));
        assert_eq!(key.meta_str("absent"), None);
    }

    #[test]
    fn insert_replaces_same_name() {
        let mut tree = ConfigTree::new();
        tree.insert(Key::new(Namespace::Proc, "x").with_value("first"));
        tree.insert(Key::new(Namespace::Proc, "x").with_value("second"));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get("proc/x").unwrap().value(), "second");
    }

    #[test]
    fn iteration_is_name_sorted() {
        let mut tree = ConfigTree::new();
        tree.insert(Key::new(Namespace::Spec, "zeta"));
        tree.insert(Key::new(Namespace::Spec, "alpha"));
        tree.insert(Key::new(Namespace::Proc, "beta"));
        let names: Vec<String> = tree.iter().map(Key::full_name).collect();
        assert_eq!(names, vec!["proc/beta", "spec/alpha", "spec/zeta"]);
    }

    #[test]
    fn lookup_by_full_name() {
        let mut tree = ConfigTree::new();
        tree.insert(Key::new(Namespace::Spec, "items/#").with_meta("opt", "i"));
        assert!(tree.get("spec/items/#").is_some());
        assert!(tree.get("spec/items").is_none());
    }
}
