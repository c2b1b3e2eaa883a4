//! First pass: runs the plugins over the top-level component options.

use swc_common::Spanned;
use swc_ecma_ast::{ObjectLit, PropOrSpread};

use crate::aggregate::CodeManager;
use crate::ast::{get_properties, prop_name, OptionValue};
use crate::error::TransformError;
use crate::fragment::{Fragment, PropertyRegistry};
use crate::options::TransformOptions;
use crate::plugin::{Disposition, PluginSet, TransformContext, TransformHelpers};
use crate::script::Script;
use crate::text::property_key;

/// What the first pass produced.
#[derive(Debug, Default)]
pub struct OptionsPass {
    pub manager: CodeManager,
    pub registry: PropertyRegistry,
    /// Options kept on the component, in source order, as they should be printed.
    pub preserved: Vec<String>,
    /// How many options at least one plugin claimed.
    pub matched: usize,
}

pub fn transform_options(
    script: &Script,
    object: &ObjectLit,
    plugins: &PluginSet,
    options: &TransformOptions,
) -> Result<OptionsPass, TransformError> {
    let mut pass = OptionsPass::default();

    for prop in &object.props {
        let named = match prop {
            PropOrSpread::Prop(prop) => option_of(prop),
            PropOrSpread::Spread(_) => None,
        };
        let Some((name, node)) = named else {
            pass.preserved.push(script.text(prop).to_string());
            continue;
        };

        let ctx = TransformContext {
            name: &name,
            node,
            options,
        };
        let mut disposition = None;
        let mut claimed_by = Vec::new();
        for (id, plugin) in plugins.iter() {
            if !plugin.transform_include(&ctx) {
                continue;
            }
            claimed_by.push(plugin.name());
            let helpers = TransformHelpers::new(script, plugin, ctx);
            let output = plugin.transform(&ctx, &helpers)?;
            for fragment in output.fragments {
                match pass.manager.collect(id, fragment) {
                    Some(Fragment::Property {
                        name,
                        source,
                        exposed,
                    }) => pass.registry.register(name, source, exposed)?,
                    Some(other) => {
                        tracing::debug!(plugin = plugin.name(), ?other, "ignoring fragment outside of a visit");
                    }
                    None => {}
                }
            }
            if output.disposition.is_some() {
                disposition = output.disposition;
            }
        }

        if claimed_by.is_empty() {
            pass.preserved.push(script.text(prop).to_string());
            continue;
        }
        pass.matched += 1;
        tracing::debug!(option = %name, plugins = ?claimed_by, ?disposition, "transformed option");

        match disposition.unwrap_or_default() {
            Disposition::Remove => {}
            Disposition::Preserve => pass.preserved.push(script.text(prop).to_string()),
            Disposition::Replace(value) => {
                pass.preserved.push(format!("{}: {value}", property_key(&name)))
            }
        }
    }

    Ok(pass)
}

/// The static name and value of one option, or `None` for computed keys.
fn option_of(prop: &swc_ecma_ast::Prop) -> Option<(String, OptionValue<'_>)> {
    use swc_ecma_ast::Prop;

    match prop {
        Prop::KeyValue(kv) => Some((prop_name(&kv.key)?, OptionValue::Expr(&kv.value))),
        Prop::Method(method) => Some((prop_name(&method.key)?, OptionValue::Method(method))),
        Prop::Getter(getter) => Some((prop_name(&getter.key)?, OptionValue::Getter(getter))),
        Prop::Shorthand(ident) => Some((ident.sym.to_string(), OptionValue::Shorthand(ident))),
        Prop::Assign(_) | Prop::Setter(_) => None,
    }
}

/// The spans of the options object properties that are printed back
/// unchanged, so that `this` inside them is left alone.
pub fn preserved_option_spans(object: &ObjectLit) -> Vec<swc_common::Span> {
    let setup = get_properties(object)
        .get("setup")
        .map(|value| value.span());
    object
        .props
        .iter()
        .map(|prop| prop.span())
        .filter(|span| {
            setup.map_or(true, |setup| !(span.lo <= setup.lo && setup.hi <= span.hi))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::find_component_options;
    use crate::options::{PluginOrder, UserPlugin};
    use crate::plugin::{Plugin, TransformOutput};
    use crate::script::ScriptLang;
    use pretty_assertions::assert_eq;

    fn run(source: &str, options: &TransformOptions) -> OptionsPass {
        let script = Script::parse(source, ScriptLang::JavaScript).unwrap();
        let component = find_component_options(&script).unwrap().unwrap();
        let plugins = PluginSet::resolve(options);
        transform_options(&script, component.object, &plugins, options).unwrap()
    }

    #[test]
    fn test_unknown_options_are_preserved() {
        let pass = run(
            "export default {\n  name: 'Counter',\n  inheritAttrs: false,\n  ...mixin,\n  data() {\n    return { count: 0 }\n  },\n}\n",
            &TransformOptions::default(),
        );
        assert_eq!(pass.matched, 1);
        assert_eq!(
            pass.preserved,
            vec!["name: 'Counter'", "inheritAttrs: false", "...mixin"]
        );
        assert_eq!(pass.manager.generate_local_code(), "const count = ref(0)");
        assert_eq!(pass.registry.source("count").map(|s| s.as_str()), Some("data"));
    }

    #[test]
    fn test_props_are_preserved_without_script_setup() {
        let options = TransformOptions {
            script_setup: false,
            ..Default::default()
        };
        let pass = run("export default {\n  props: ['msg'],\n}\n", &options);
        assert_eq!(pass.matched, 1);
        assert_eq!(pass.preserved, vec!["props: ['msg']"]);
        assert_eq!(pass.registry.exposed().count(), 0);
    }

    struct Rename;

    impl Plugin for Rename {
        fn name(&self) -> &str {
            "rename"
        }

        fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
            ctx.name == "my-key"
        }

        fn transform<'a>(
            &self,
            _ctx: &TransformContext<'a>,
            _helpers: &TransformHelpers<'a>,
        ) -> Result<TransformOutput, TransformError> {
            Ok(TransformOutput {
                fragments: Vec::new(),
                disposition: Some(Disposition::Replace("true".to_string())),
            })
        }
    }

    #[test]
    fn test_replaced_option_key_is_quoted() {
        let options = TransformOptions {
            plugins: vec![UserPlugin::new(Rename, PluginOrder::Pre)],
            ..Default::default()
        };
        let pass = run("export default {\n  'my-key': 1,\n}\n", &options);
        assert_eq!(pass.matched, 1);
        assert_eq!(pass.preserved, vec!["'my-key': true"]);
    }

    #[test]
    fn test_duplicate_names_fail() {
        let script = Script::parse(
            "export default {\n  props: ['a'],\n  data() {\n    return { a: 1 }\n  },\n}\n",
            ScriptLang::JavaScript,
        )
        .unwrap();
        let component = find_component_options(&script).unwrap().unwrap();
        let options = TransformOptions::default();
        let plugins = PluginSet::resolve(&options);
        let error = transform_options(&script, component.object, &plugins, &options).unwrap_err();
        assert_eq!(error, TransformError::DuplicateProperty { name: "a".into() });
    }

    #[test]
    fn test_preserved_option_spans_skip_setup() {
        let script = Script::parse(
            "export default {\n  name: 'a',\n  setup() {\n    return {}\n  },\n}\n",
            ScriptLang::JavaScript,
        )
        .unwrap();
        let component = find_component_options(&script).unwrap().unwrap();
        let spans = preserved_option_spans(component.object);
        assert_eq!(spans.len(), 1);
        assert_eq!(script.text_of(spans[0]), "name: 'a'");
    }
}
