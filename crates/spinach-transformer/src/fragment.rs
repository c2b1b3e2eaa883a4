//! Fragments are the only way plugins produce output.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::TransformError;

/// Ordering band for generated statements. Earlier bands are printed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    /// Hoisted snippets that could not be merged into imports or declarations.
    Hoisted,
    /// Props, emits and injections.
    Interface,
    /// Reactive state and the body of `setup()`.
    #[default]
    State,
    /// Computed values and methods.
    Derived,
    /// Watchers, lifecycle hooks and other side effects.
    Effect,
}

/// Tags which plugin defined a property, so the same plugin can later resolve
/// `this.<name>` for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Provenance(SmolStr);

impl Provenance {
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self(tag.into())
    }

    /// The tag given to an access that a plugin replaced without the property
    /// being registered by anyone.
    pub fn claimed(plugin: &str) -> Self {
        Self(SmolStr::from(format!("claimed:{plugin}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A piece of plugin output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A statement for the plugin's section of the generated setup code.
    Code { content: String, priority: Priority },
    /// An import or declaration merged with its siblings and placed at the top.
    Hoist { content: String, priority: Priority },
    /// Registers a name on `this` and who defined it.
    Property {
        name: SmolStr,
        source: Provenance,
        /// Whether a `setup()` function returns it.
        exposed: bool,
    },
    /// Replaces the `this.<name>` access currently being visited.
    Replacement { content: String },
}

impl Fragment {
    pub fn code(content: impl Into<String>, priority: Priority) -> Self {
        Fragment::Code {
            content: content.into(),
            priority,
        }
    }

    pub fn hoist(content: impl Into<String>) -> Self {
        Fragment::Hoist {
            content: content.into(),
            priority: Priority::Hoisted,
        }
    }

    /// `import { specifier } from 'source'`, hoisted. Import aliases apply to `source`.
    pub fn import(source: &str, specifier: &str) -> Self {
        Fragment::hoist(format!("import {{ {specifier} }} from '{source}'"))
    }

    pub fn property(name: impl Into<SmolStr>, source: Provenance) -> Self {
        Fragment::Property {
            name: name.into(),
            source,
            exposed: true,
        }
    }

    /// A property that is reachable on `this` but not returned from `setup()`.
    pub fn hidden_property(name: impl Into<SmolStr>, source: Provenance) -> Self {
        Fragment::Property {
            name: name.into(),
            source,
            exposed: false,
        }
    }

    pub fn replace(content: impl Into<String>) -> Self {
        Fragment::Replacement {
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRecord {
    pub source: Provenance,
    pub exposed: bool,
}

/// The names plugins registered on `this`, in registration order.
#[derive(Debug, Clone, Default)]
pub struct PropertyRegistry {
    entries: IndexMap<SmolStr, PropertyRecord>,
}

impl PropertyRegistry {
    pub fn register(
        &mut self,
        name: SmolStr,
        source: Provenance,
        exposed: bool,
    ) -> Result<(), TransformError> {
        if self.entries.contains_key(&name) {
            return Err(TransformError::DuplicateProperty { name });
        }
        self.entries.insert(name, PropertyRecord { source, exposed });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PropertyRecord> {
        self.entries.get(name)
    }

    pub fn source(&self, name: &str) -> Option<&Provenance> {
        self.get(name).map(|record| &record.source)
    }

    /// Names returned from a generated `setup()`.
    pub fn exposed(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, record)| record.exposed)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_priority_order() {
        let mut bands = vec![
            Priority::Effect,
            Priority::State,
            Priority::Hoisted,
            Priority::Derived,
            Priority::Interface,
        ];
        bands.sort();
        assert_eq!(
            bands,
            vec![
                Priority::Hoisted,
                Priority::Interface,
                Priority::State,
                Priority::Derived,
                Priority::Effect,
            ]
        );
    }

    #[test]
    fn test_import_fragment() {
        assert_eq!(
            Fragment::import("vue", "ref"),
            Fragment::Hoist {
                content: "import { ref } from 'vue'".to_string(),
                priority: Priority::Hoisted,
            }
        );
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = PropertyRegistry::default();
        registry
            .register("count".into(), Provenance::new("data"), true)
            .unwrap();
        registry
            .register("msg".into(), Provenance::new("props"), false)
            .unwrap();
        let error = registry
            .register("count".into(), Provenance::new("computed"), true)
            .unwrap_err();
        assert_eq!(error, TransformError::DuplicateProperty { name: "count".into() });
        assert_eq!(registry.source("count"), Some(&Provenance::new("data")));
        assert_eq!(registry.exposed().collect::<Vec<_>>(), vec!["count"]);
    }
}
