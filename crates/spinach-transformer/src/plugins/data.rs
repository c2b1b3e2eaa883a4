//! `data` to refs.

use swc_ecma_ast::Expr;

use crate::ast::{get_properties, split_function_body, stmts_span, unwrap_parens, FunctionBody, OptionValue};
use crate::error::TransformError;
use crate::fragment::{Fragment, Priority, Provenance};
use crate::plugin::{
    Plugin, TransformContext, TransformHelpers, TransformOutput, VisitContext, VisitHelpers,
};

const DATA: &str = "data";
const DATA_REACTIVITY: &str = "data (reactivity transform)";

pub struct Data;

impl Plugin for Data {
    fn name(&self) -> &str {
        "data"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.name == "data"
    }

    fn transform<'a>(
        &self,
        ctx: &TransformContext<'a>,
        helpers: &TransformHelpers<'a>,
    ) -> Result<TransformOutput, TransformError> {
        let mut output = TransformOutput::default();

        if let Some(func) = ctx.node.as_function() {
            let error_span = helpers.script.span(ctx.node.span());
            let returned = match func.body() {
                Some(FunctionBody::Block(block)) => {
                    let split = split_function_body(block).ok_or(TransformError::MissingReturn {
                        option: "data".into(),
                        span: error_span,
                    })?;
                    if let Some(span) = stmts_span(split.before) {
                        output.push(Fragment::code(helpers.stringify(span, 0), Priority::State));
                        output.push(Fragment::code("", Priority::State));
                    }
                    split.returned
                }
                Some(FunctionBody::Expr(expr)) => Some(unwrap_parens(expr)),
                None => None,
            };
            return match returned {
                Some(object @ Expr::Object(_)) => {
                    output.extend(helpers.transform(OptionValue::Expr(object))?);
                    Ok(output)
                }
                _ => Err(TransformError::ReturnNotObject {
                    option: "data".into(),
                    span: error_span,
                }),
            };
        }

        let Some(object) = ctx.node.as_object() else {
            return Ok(output);
        };
        let reactivity = ctx.options.reactivity_transform;
        let tag = Provenance::new(if reactivity { DATA_REACTIVITY } else { DATA });
        let mut any = false;
        for (key, value) in get_properties(object) {
            any = true;
            let init = helpers.stringify_value(&value, 0);
            output.push(Fragment::property(key.as_str(), tag.clone()));
            let code = if reactivity {
                format!("let {key} = $ref({init})")
            } else {
                format!("const {key} = ref({init})")
            };
            output.push(Fragment::code(code, Priority::State));
        }
        if any && !reactivity {
            output.push(Fragment::import("vue", "ref"));
        }
        Ok(output)
    }

    fn visit_property(
        &self,
        ctx: &VisitContext<'_>,
        _helpers: &VisitHelpers<'_>,
    ) -> Vec<Fragment> {
        match ctx.name {
            Some(name) if ctx.source_is(DATA) => vec![Fragment::replace(format!("{name}.value"))],
            Some(name) if ctx.source_is(DATA_REACTIVITY) => vec![Fragment::replace(name)],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TransformOptions;
    use crate::plugin::AccessParent;
    use crate::plugins::testing::{replacement, run, try_run, visit};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_data_function() {
        let output = run(
            &Data,
            "export default {\n  data() {\n    const initial = 1\n    return {\n      count: initial,\n      list: [],\n    }\n  },\n}\n",
            "data",
            &TransformOptions::default(),
        );
        assert_eq!(
            output.code(),
            "const initial = 1\n\nconst count = ref(initial)\nconst list = ref([])"
        );
        assert_eq!(output.hoisted(), vec!["import { ref } from 'vue'"]);
        assert_eq!(
            output.properties(),
            vec![("count", DATA, true), ("list", DATA, true)]
        );
    }

    #[test]
    fn test_data_arrow_and_object() {
        let options = TransformOptions::default();
        let output = run(&Data, "export default { data: () => ({ a: 1 }) }", "data", &options);
        assert_eq!(output.code(), "const a = ref(1)");
        let output = run(&Data, "export default { data: { a: 1 } }", "data", &options);
        assert_eq!(output.code(), "const a = ref(1)");
    }

    #[test]
    fn test_reactivity_transform() {
        let options = TransformOptions {
            reactivity_transform: true,
            ..Default::default()
        };
        let output = run(&Data, "export default { data() { return { a: 1 } } }", "data", &options);
        assert_eq!(output.code(), "let a = $ref(1)");
        assert!(output.hoisted().is_empty());
        assert_eq!(output.properties(), vec![("a", DATA_REACTIVITY, true)]);
    }

    #[test]
    fn test_return_must_be_object() {
        let options = TransformOptions::default();
        let error = try_run(&Data, "export default { data() { return state } }", "data", &options)
            .err()
            .unwrap();
        assert!(matches!(error, TransformError::ReturnNotObject { .. }));
        let error = try_run(&Data, "export default { data() { init() } }", "data", &options)
            .err()
            .unwrap();
        assert!(matches!(error, TransformError::MissingReturn { .. }));
    }

    #[test]
    fn test_visit() {
        let options = TransformOptions::default();
        let fragments = visit(&Data, "this.count", AccessParent::UpdateTarget, Some(DATA), &options);
        assert_eq!(replacement(&fragments), Some("count.value"));
        let fragments = visit(
            &Data,
            "this.count",
            AccessParent::Other,
            Some(DATA_REACTIVITY),
            &options,
        );
        assert_eq!(replacement(&fragments), Some("count"));
    }
}
