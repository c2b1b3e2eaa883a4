//! The plugin contract and the ordered plugin set.
//!
//! A plugin takes part in two passes. In the first, [`Plugin::transform`] is
//! called for every top-level component option the plugin claims with
//! [`Plugin::transform_include`], and answers with [`Fragment`]s. In the
//! second, [`Plugin::visit_property`] is called for every `this.<name>`
//! access in the generated code, and may answer with a replacement.

use std::sync::Arc;

use swc_ecma_ast::MemberExpr;

use crate::ast::OptionValue;
use crate::error::TransformError;
use crate::fragment::{Fragment, Provenance};
use crate::options::{PluginOrder, TransformOptions};
use crate::plugins;
use crate::script::Script;

/// What happens to a component option after the plugins that claimed it ran.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Drop the option. The default once any plugin claims it.
    #[default]
    Remove,
    /// Keep the option as written in the preserved options.
    Preserve,
    /// Keep the option with a new value.
    Replace(String),
}

/// The output of [`Plugin::transform`].
#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    pub fragments: Vec<Fragment>,
    pub disposition: Option<Disposition>,
}

impl TransformOutput {
    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    /// Appends the fragments of a nested transformation and takes over its disposition.
    pub fn extend(&mut self, other: TransformOutput) {
        self.fragments.extend(other.fragments);
        if other.disposition.is_some() {
            self.disposition = other.disposition;
        }
    }

    pub fn preserve(mut self) -> Self {
        self.disposition = Some(Disposition::Preserve);
        self
    }
}

impl From<Vec<Fragment>> for TransformOutput {
    fn from(fragments: Vec<Fragment>) -> Self {
        Self {
            fragments,
            disposition: None,
        }
    }
}

/// One top-level component option being transformed.
#[derive(Clone, Copy)]
pub struct TransformContext<'a> {
    /// The option key, e.g. `data`.
    pub name: &'a str,
    pub node: OptionValue<'a>,
    pub options: &'a TransformOptions,
}

/// Helpers passed to [`Plugin::transform`].
#[derive(Clone, Copy)]
pub struct TransformHelpers<'a> {
    pub script: &'a Script,
    plugin: &'a dyn Plugin,
    context: TransformContext<'a>,
}

impl<'a> TransformHelpers<'a> {
    pub(crate) fn new(script: &'a Script, plugin: &'a dyn Plugin, context: TransformContext<'a>) -> Self {
        Self {
            script,
            plugin,
            context,
        }
    }

    /// Runs the current plugin again on `node`, with the same option name.
    pub fn transform(&self, node: OptionValue<'a>) -> Result<TransformOutput, TransformError> {
        let helpers = TransformHelpers {
            context: TransformContext {
                node,
                ..self.context
            },
            ..*self
        };
        self.plugin.transform(&helpers.context, &helpers)
    }

    pub fn stringify(&self, span: swc_common::Span, indentation: usize) -> String {
        self.script.stringify(span, indentation)
    }

    pub fn stringify_value(&self, value: &OptionValue<'_>, indentation: usize) -> String {
        self.script.stringify_value(value, indentation)
    }
}

/// How the visited member expression is used by its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessParent {
    /// `this.x = 1`
    AssignTarget,
    /// `this.x++`
    UpdateTarget,
    /// `this.x()`
    Callee,
    #[default]
    Other,
}

/// One `this.<name>` access being resolved.
pub struct VisitContext<'a> {
    /// The accessed name, or `None` for a computed key that is not a string
    /// literal. A replacement for such an access stands in for `this` only.
    pub name: Option<&'a str>,
    pub node: &'a MemberExpr,
    pub parent: AccessParent,
    /// The plugin that registered the name, or the plugin that already
    /// claimed this access.
    pub source: Option<Provenance>,
    pub options: &'a TransformOptions,
}

impl VisitContext<'_> {
    pub fn source_is(&self, tag: &str) -> bool {
        self.source.as_ref().is_some_and(|source| source.as_str() == tag)
    }

    /// Whether the access is written to.
    pub fn is_write(&self) -> bool {
        matches!(
            self.parent,
            AccessParent::AssignTarget | AccessParent::UpdateTarget
        )
    }
}

/// Helpers passed to [`Plugin::visit_property`].
pub struct VisitHelpers<'a> {
    pub script: &'a Script,
}

/// A transformation step for one kind of component option.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Whether [`Plugin::transform`] should run for this option.
    fn transform_include(&self, _ctx: &TransformContext<'_>) -> bool {
        false
    }

    fn transform<'a>(
        &self,
        _ctx: &TransformContext<'a>,
        _helpers: &TransformHelpers<'a>,
    ) -> Result<TransformOutput, TransformError> {
        Ok(TransformOutput::default())
    }

    fn visit_property(&self, _ctx: &VisitContext<'_>, _helpers: &VisitHelpers<'_>) -> Vec<Fragment> {
        Vec::new()
    }
}

/// Identifies a plugin by its position in the [`PluginSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PluginId(pub usize);

/// The plugins of one transformation, in run order.
///
/// User plugins ordered [`PluginOrder::Pre`] come first, then the built-in
/// plugins, then [`PluginOrder::Post`] user plugins. The instance fallback
/// always runs last so that it only sees accesses nobody else claimed.
pub struct PluginSet {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginSet {
    pub fn resolve(options: &TransformOptions) -> Self {
        let user = |order: PluginOrder| -> Vec<Arc<dyn Plugin>> {
            options
                .plugins
                .iter()
                .filter(|p| p.order == order)
                .map(|p| p.plugin.clone())
                .collect()
        };

        let mut set = user(PluginOrder::Pre);
        set.extend(plugins::builtin());
        set.extend(user(PluginOrder::Post));
        set.push(Arc::new(plugins::Instance));
        Self { plugins: set }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PluginId, &dyn Plugin)> {
        self.plugins
            .iter()
            .enumerate()
            .map(|(i, plugin)| (PluginId(i), plugin.as_ref()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|plugin| plugin.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::UserPlugin;
    use pretty_assertions::assert_eq;

    struct Named(&'static str);

    impl Plugin for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_builtin_order() {
        let set = PluginSet::resolve(&TransformOptions::default());
        assert_eq!(
            set.names(),
            vec![
                "props",
                "emits",
                "inject",
                "components",
                "directives",
                "setup",
                "data",
                "computed",
                "pinia",
                "methods",
                "watch",
                "lifecycles",
                "vue-router",
                "provide",
                "expose",
                "instance",
            ]
        );
    }

    #[test]
    fn test_user_plugins_surround_builtins() {
        let options = TransformOptions {
            plugins: vec![
                UserPlugin::new(Named("late"), PluginOrder::Post),
                UserPlugin::new(Named("early"), PluginOrder::Pre),
            ],
            ..Default::default()
        };
        let set = PluginSet::resolve(&options);
        let names = set.names();
        assert_eq!(names.first(), Some(&"early"));
        assert_eq!(&names[names.len() - 2..], &["late", "instance"]);
    }
}
