//! `emits` to `defineEmits()`, and `this.$emit` to `emit`.

use indexmap::IndexMap;

use crate::ast::{get_properties, string_elements, OptionValue};
use crate::error::TransformError;
use crate::fragment::{Fragment, Priority, Provenance};
use crate::plugin::{
    Plugin, TransformContext, TransformHelpers, TransformOutput, VisitContext, VisitHelpers,
};
use crate::text::multiline_object;

const EMIT: &str = "emit";

pub struct Emits;

impl Plugin for Emits {
    fn name(&self) -> &str {
        "emits"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.name == "emits"
    }

    fn transform<'a>(
        &self,
        ctx: &TransformContext<'a>,
        helpers: &TransformHelpers<'a>,
    ) -> Result<TransformOutput, TransformError> {
        let mut declared: IndexMap<String, Option<OptionValue<'a>>> = IndexMap::new();
        if let Some(object) = ctx.node.as_object() {
            declared.extend(get_properties(object).into_iter().map(|(k, v)| (k, Some(v))));
        } else if let Some(array) = ctx.node.as_array() {
            declared.extend(string_elements(array).into_iter().map(|k| (k, None)));
        }

        let mut output = TransformOutput::default();
        output.push(Fragment::hidden_property("$emit", Provenance::new(EMIT)));
        if !ctx.options.script_setup {
            return Ok(output.preserve());
        }

        let code = if ctx.options.typescript {
            let signatures = declared.iter().map(|(event, validator)| {
                let params: String = validator
                    .and_then(|v| v.as_function())
                    .map(|func| {
                        func.params()
                            .iter()
                            .map(|param| {
                                let text = helpers.script.text_of(param.span);
                                if param.typed {
                                    format!("{text}, ")
                                } else {
                                    format!("{text}?: unknown, ")
                                }
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                format!("(event: '{event}', {params}...args: unknown[]): void")
            });
            format!("const emit = defineEmits<{}>()", multiline_object(signatures))
        } else {
            format!("const emit = defineEmits({})", helpers.stringify(ctx.node.span(), 0))
        };
        output.push(Fragment::code(code, Priority::Interface));
        Ok(output)
    }

    fn visit_property(
        &self,
        ctx: &VisitContext<'_>,
        _helpers: &VisitHelpers<'_>,
    ) -> Vec<Fragment> {
        if ctx.name != Some("$emit") {
            return Vec::new();
        }
        let mut fragments = Vec::new();
        if !ctx.source_is(EMIT) && ctx.options.script_setup {
            let define = if ctx.options.typescript {
                "defineEmits<(event: string, ...args: unknown[]) => void>()"
            } else {
                "defineEmits()"
            };
            fragments.push(Fragment::hoist(format!("const emit = {define}")));
        }
        fragments.push(Fragment::replace("emit"));
        fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TransformOptions;
    use crate::plugin::{AccessParent, Disposition};
    use crate::plugins::testing::{hoisted, replacement, run, visit};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_array_emits() {
        let output = run(
            &Emits,
            "export default { emits: ['change', 'update:modelValue'] }",
            "emits",
            &TransformOptions::default(),
        );
        assert_eq!(
            output.code(),
            "const emit = defineEmits(['change', 'update:modelValue'])"
        );
        assert_eq!(output.properties(), vec![("$emit", EMIT, false)]);
    }

    #[test]
    fn test_typescript_emits() {
        let options = TransformOptions {
            typescript: true,
            ..Default::default()
        };
        let output = run(
            &Emits,
            "export default { emits: { change: (value: number, extra) => true, close: null } }",
            "emits",
            &options,
        );
        assert_eq!(
            output.code(),
            "const emit = defineEmits<{\n  (event: 'change', value: number, extra?: unknown, ...args: unknown[]): void,\n  (event: 'close', ...args: unknown[]): void,\n}>()"
        );
    }

    #[test]
    fn test_preserved_without_script_setup() {
        let options = TransformOptions {
            script_setup: false,
            ..Default::default()
        };
        let output = run(&Emits, "export default { emits: ['a'] }", "emits", &options);
        assert_eq!(output.disposition, Some(Disposition::Preserve));
        assert_eq!(output.code(), "");
    }

    #[test]
    fn test_undeclared_emit_is_defined() {
        let options = TransformOptions::default();
        let fragments = visit(&Emits, "this.$emit", AccessParent::Callee, None, &options);
        assert_eq!(replacement(&fragments), Some("emit"));
        assert_eq!(hoisted(&fragments), vec!["const emit = defineEmits()"]);

        let fragments = visit(&Emits, "this.$emit", AccessParent::Callee, Some(EMIT), &options);
        assert_eq!(replacement(&fragments), Some("emit"));
        assert!(hoisted(&fragments).is_empty());
    }

    #[test]
    fn test_emit_from_setup_context() {
        let options = TransformOptions {
            script_setup: false,
            ..Default::default()
        };
        let fragments = visit(&Emits, "this.$emit", AccessParent::Callee, None, &options);
        assert_eq!(replacement(&fragments), Some("emit"));
        assert!(hoisted(&fragments).is_empty());
    }
}
