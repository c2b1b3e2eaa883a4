//! Transformation options.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::plugin::Plugin;

/// Settings for one transformation.
#[derive(Clone)]
pub struct TransformOptions {
    /// Emit `<script setup>` instead of a `setup()` function.
    pub script_setup: bool,
    /// Use `$ref`/`$computed` and drop `.value` on reactive bindings.
    pub reactivity_transform: bool,
    /// Destructure `defineProps()` and read props by bare name. Only applies
    /// in script-setup mode.
    pub props_destructure: bool,
    /// Emit TypeScript. Set from the `lang` of the component's scripts.
    pub typescript: bool,
    /// Rewrites the module of generated imports, e.g. `vue` to `@vue/composition-api`.
    pub aliases: IndexMap<String, String>,
    /// Extra plugins, run before or after the built-in set.
    pub plugins: Vec<UserPlugin>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            script_setup: true,
            reactivity_transform: false,
            props_destructure: true,
            typescript: false,
            aliases: IndexMap::new(),
            plugins: Vec::new(),
        }
    }
}

impl TransformOptions {
    /// The module to import from after applying aliases.
    pub fn alias<'a>(&'a self, source: &'a str) -> &'a str {
        self.aliases.get(source).map_or(source, String::as_str)
    }

    pub fn destructures_props(&self) -> bool {
        self.script_setup && self.props_destructure
    }
}

impl fmt::Debug for TransformOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformOptions")
            .field("script_setup", &self.script_setup)
            .field("reactivity_transform", &self.reactivity_transform)
            .field("props_destructure", &self.props_destructure)
            .field("typescript", &self.typescript)
            .field("aliases", &self.aliases)
            .field(
                "plugins",
                &self
                    .plugins
                    .iter()
                    .map(|p| p.plugin.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Where a user plugin runs relative to the built-in plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PluginOrder {
    Pre,
    #[default]
    Post,
}

#[derive(Clone)]
pub struct UserPlugin {
    pub plugin: Arc<dyn Plugin>,
    pub order: PluginOrder,
}

impl UserPlugin {
    pub fn new(plugin: impl Plugin + 'static, order: PluginOrder) -> Self {
        Self {
            plugin: Arc::new(plugin),
            order,
        }
    }
}
