//! An existing `setup()` option, inlined.

use swc_ecma_ast::Expr;

use crate::ast::{get_properties, split_function_body, stmts_span, unwrap_parens, FunctionBody};
use crate::error::TransformError;
use crate::fragment::{Fragment, Priority, Provenance};
use crate::plugin::{
    Plugin, TransformContext, TransformHelpers, TransformOutput, VisitContext, VisitHelpers,
};

const SETUP: &str = "setup";

pub struct Setup;

impl Plugin for Setup {
    fn name(&self) -> &str {
        "setup"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.name == "setup"
    }

    fn transform<'a>(
        &self,
        ctx: &TransformContext<'a>,
        helpers: &TransformHelpers<'a>,
    ) -> Result<TransformOutput, TransformError> {
        let mut output = TransformOutput::default();
        let Some(func) = ctx.node.as_function() else {
            return Ok(output.preserve());
        };

        if let Some(name) = func.first_param_name() {
            if name != "props" {
                output.push(Fragment::code(format!("const {name} = props"), Priority::State));
            }
        }

        let error_span = helpers.script.span(ctx.node.span());
        let returned = match func.body() {
            Some(FunctionBody::Block(block)) => {
                let split = split_function_body(block).ok_or(TransformError::MissingReturn {
                    option: SETUP.into(),
                    span: error_span,
                })?;
                if let Some(span) = stmts_span(split.before) {
                    output.push(Fragment::code(helpers.stringify(span, 0), Priority::State));
                }
                split.returned
            }
            Some(FunctionBody::Expr(expr)) => Some(unwrap_parens(expr)),
            None => None,
        };

        let Some(Expr::Object(object)) = returned else {
            return Err(TransformError::ReturnNotObject {
                option: SETUP.into(),
                span: error_span,
            });
        };
        for (key, value) in get_properties(object) {
            output.push(Fragment::property(key.as_str(), Provenance::new(SETUP)));
            if value.as_ident() != Some(key.as_str()) {
                output.push(Fragment::code(
                    format!("const {key} = {}", helpers.stringify_value(&value, 0)),
                    Priority::State,
                ));
            }
        }
        Ok(output)
    }

    fn visit_property(
        &self,
        ctx: &VisitContext<'_>,
        _helpers: &VisitHelpers<'_>,
    ) -> Vec<Fragment> {
        let Some(name) = ctx.name else {
            return Vec::new();
        };
        if !ctx.source_is(SETUP) {
            return Vec::new();
        }
        if ctx.is_write() {
            vec![Fragment::replace(format!("{name}.value"))]
        } else {
            vec![
                Fragment::import("vue", "unref"),
                Fragment::replace(format!("unref({name})")),
            ]
        }
    }
}
