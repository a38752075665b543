#[cfg(test)]
pub mod test {
    use crate::tree::{ConfigTree, Key, Namespace};

    /// A spec-namespace key with the given metadata entries.
    pub fn spec_key(path: &str, meta: &[(&str, &str)]) -> Key {
        let mut key = Key::new(Namespace::Spec, path);
        for (name, value) in meta {
            key.set_meta(*name, *value);
        }
        key
    }

    /// A tree holding the given spec keys.
    pub fn spec_tree(keys: Vec<Key>) -> ConfigTree {
        let mut tree = ConfigTree::new();
        for key in keys {
            tree.insert(key);
        }
        tree
    }

    /// A fresh error key with no metadata set.
    pub fn error_key() -> Key {
        Key::new(Namespace::Cascading, "")
    }

    /// Owned strings for argv/envp slices.
    pub fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn spec_key_sets_metadata() {
        let key = spec_key("items/#", &[("opt", "i"), ("opt/long", "item")]);
        assert_eq!(key.full_name(), "spec/items/#");
        assert_eq!(key.meta_str("opt"), Some("i"));
        assert_eq!(key.meta_str("opt/long"), Some("item"));
    }
}
