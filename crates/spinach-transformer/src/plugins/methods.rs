//! `methods` to plain functions.

use crate::ast::{get_properties, FunctionLike};
use crate::error::TransformError;
use crate::fragment::{Fragment, Priority, Provenance};
use crate::plugin::{
    Plugin, TransformContext, TransformHelpers, TransformOutput, VisitContext, VisitHelpers,
};

const METHODS: &str = "methods";

pub struct Methods;

impl Plugin for Methods {
    fn name(&self) -> &str {
        "methods"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.name == "methods"
    }

    fn transform<'a>(
        &self,
        ctx: &TransformContext<'a>,
        helpers: &TransformHelpers<'a>,
    ) -> Result<TransformOutput, TransformError> {
        let mut output = TransformOutput::default();
        let Some(object) = ctx.node.as_object() else {
            return Ok(output);
        };
        for (key, value) in get_properties(object) {
            output.push(Fragment::property(key.as_str(), Provenance::new(METHODS)));
            let code = match value.as_function() {
                Some(func @ FunctionLike::Function(_)) => {
                    helpers.script.stringify_fn(&func, Some(&key), 0)
                }
                _ => format!("const {key} = {}", helpers.stringify_value(&value, 0)),
            };
            output.push(Fragment::code(code, Priority::Derived));
        }
        Ok(output)
    }

    fn visit_property(
        &self,
        ctx: &VisitContext<'_>,
        _helpers: &VisitHelpers<'_>,
    ) -> Vec<Fragment> {
        match ctx.name {
            Some(name) if ctx.source_is(METHODS) => vec![Fragment::replace(name)],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TransformOptions;
    use crate::plugin::AccessParent;
    use crate::plugins::testing::{replacement, run, visit};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_methods() {
        let output = run(
            &Methods,
            "export default {\n  methods: {\n    increment(step = 1) {\n      this.count += step\n    },\n    async load() { await this.fetch() },\n    *ids() { yield 1 },\n    named: function (a, b) { return a + b },\n    debounced: debounce(() => {}, 100),\n    arrow: (x) => x * 2,\n  },\n}\n",
            "methods",
            &TransformOptions::default(),
        );
        insta::assert_snapshot!(output.code(), @r###"
        function increment(step = 1) {
          this.count += step
        }
        async function load() { await this.fetch() }
        function* ids() { yield 1 }
        function named(a, b) { return a + b }
        const debounced = debounce(() => {}, 100)
        const arrow = (x) => x * 2
        "###);
        assert_eq!(output.properties().len(), 6);
    }

    #[test]
    fn test_typescript_signature() {
        let options = TransformOptions {
            typescript: true,
            ..Default::default()
        };
        let output = run(
            &Methods,
            "export default { methods: { format(value: number, unit?: string): string { return `${value}${unit}` } } }",
            "methods",
            &options,
        );
        assert_eq!(
            output.code(),
            "function format(value: number, unit?: string): string { return `${value}${unit}` }"
        );
    }

    #[test]
    fn test_visit() {
        let fragments = visit(
            &Methods,
            "this.increment",
            AccessParent::Callee,
            Some(METHODS),
            &TransformOptions::default(),
        );
        assert_eq!(replacement(&fragments), Some("increment"));
    }
}
