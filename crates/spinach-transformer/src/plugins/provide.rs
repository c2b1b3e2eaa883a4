//! `provide` to `provide()` calls.

use swc_common::Spanned;
use swc_ecma_ast::{Expr, Prop, PropName, PropOrSpread};

use crate::ast::{split_function_body, stmts_span, str_value, unwrap_parens, FunctionBody, OptionValue};
use crate::error::TransformError;
use crate::fragment::{Fragment, Priority};
use crate::plugin::{Plugin, TransformContext, TransformHelpers, TransformOutput};
use crate::text::quote;

pub struct Provide;

impl Plugin for Provide {
    fn name(&self) -> &str {
        "provide"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.name == "provide"
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
                        option: "provide".into(),
                        span: error_span,
                    })?;
                    if let Some(span) = stmts_span(split.before) {
                        output.push(Fragment::code(
                            format!("{}\n", helpers.stringify(span, 0)),
                            Priority::Effect,
                        ));
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
                    option: "provide".into(),
                    span: error_span,
                }),
            };
        }

        let Some(object) = ctx.node.as_object() else {
            return Ok(output);
        };
        let mut any = false;
        for prop in &object.props {
            let PropOrSpread::Prop(prop) = prop else {
                continue;
            };
            let (key, value) = match &**prop {
                Prop::KeyValue(kv) => (provide_key(&kv.key, helpers), OptionValue::Expr(&kv.value)),
                Prop::Method(method) => (provide_key(&method.key, helpers), OptionValue::Method(method)),
                Prop::Getter(getter) => (provide_key(&getter.key, helpers), OptionValue::Getter(getter)),
                Prop::Shorthand(ident) => (quote(ident.sym.as_str()), OptionValue::Shorthand(ident)),
                Prop::Assign(_) | Prop::Setter(_) => continue,
            };
            any = true;
            output.push(Fragment::code(
                format!("provide({key}, {})", helpers.stringify_value(&value, 0)),
                Priority::Effect,
            ));
        }
        if any {
            output.push(Fragment::import("vue", "provide"));
        }
        Ok(output)
    }
}

/// The injection key: a string for static names, the expression for
/// computed keys such as symbols.
fn provide_key(key: &PropName, helpers: &TransformHelpers<'_>) -> String {
    match key {
        PropName::Ident(ident) => quote(ident.sym.as_str()),
        PropName::Str(s) => match str_value(s) {
            Some(value) => quote(value),
            None => helpers.stringify(s.span, 0),
        },
        PropName::Computed(computed) => helpers.stringify(unwrap_parens(&computed.expr).span(), 0),
        PropName::Num(n) => helpers.stringify(n.span, 0),
        PropName::BigInt(n) => helpers.stringify(n.span, 0),
    }
}
