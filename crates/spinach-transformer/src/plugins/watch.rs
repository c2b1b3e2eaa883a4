//! `watch` to `watch()` calls.
//!
//! The generated getter reads `this.<key>`, which the member pass rewrites
//! like any other access.

use swc_common::Spanned;
use swc_ecma_ast::{Prop, PropOrSpread};

use crate::ast::{get_properties, prop_name, OptionValue};
use crate::error::TransformError;
use crate::fragment::{Fragment, Priority};
use crate::plugin::{Plugin, TransformContext, TransformHelpers, TransformOutput};
use crate::text::{is_identifier, member_access};

pub struct Watch;

impl Plugin for Watch {
    fn name(&self) -> &str {
        "watch"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.name == "watch"
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

        let mut any = false;
        for (key, value) in get_properties(object) {
            let source = watch_source(&key);
            let entries = match value.as_array() {
                Some(array) => array
                    .elems
                    .iter()
                    .flatten()
                    .filter(|elem| elem.spread.is_none())
                    .map(|elem| OptionValue::Expr(&elem.expr))
                    .collect(),
                None => vec![value],
            };
            for entry in entries {
                let Some((handler, options)) = watcher(&entry, helpers) else {
                    continue;
                };
                any = true;
                let options = if options.is_empty() {
                    String::new()
                } else {
                    let lines: String = options.iter().map(|o| format!("  {o},\n")).collect();
                    format!(", {{\n{lines}}}")
                };
                output.push(Fragment::code(
                    format!("watch(() => {source}, {handler}{options})"),
                    Priority::Effect,
                ));
            }
        }
        if any {
            output.push(Fragment::import("vue", "watch"));
        }
        Ok(output)
    }
}

/// `this.a.b` for the path `a.b`.
fn watch_source(key: &str) -> String {
    if key.split('.').all(is_identifier) {
        format!("this.{key}")
    } else {
        member_access("this", key)
    }
}

/// The handler of one watcher and its remaining options, printed.
fn watcher(value: &OptionValue<'_>, helpers: &TransformHelpers<'_>) -> Option<(String, Vec<String>)> {
    if let Some(func) = value.as_function() {
        return Some((helpers.script.stringify_fn(&func, None, 0), Vec::new()));
    }
    if let Some(method) = value.as_str() {
        return Some((member_access("this", method), Vec::new()));
    }
    if let Some(reference) = value.as_ident() {
        return Some((reference.to_string(), Vec::new()));
    }

    let object = value.as_object()?;
    let handler = get_properties(object).get("handler").and_then(|handler| {
        if let Some(func) = handler.as_function() {
            Some(helpers.script.stringify_fn(&func, None, 2))
        } else {
            handler.as_str().map(|method| member_access("this", method))
        }
    })?;
    let options = object
        .props
        .iter()
        .filter(|prop| match prop {
            PropOrSpread::Prop(prop) => handler_key(prop).as_deref() != Some("handler"),
            PropOrSpread::Spread(_) => true,
        })
        .map(|prop| helpers.stringify(prop.span(), 2))
        .collect();
    Some((handler, options))
}

fn handler_key(prop: &Prop) -> Option<String> {
    match prop {
        Prop::KeyValue(kv) => prop_name(&kv.key),
        Prop::Method(method) => prop_name(&method.key),
        Prop::Shorthand(ident) => Some(ident.sym.to_string()),
        Prop::Getter(getter) => prop_name(&getter.key),
        Prop::Setter(setter) => prop_name(&setter.key),
        Prop::Assign(assign) => Some(assign.key.sym.to_string()),
    }
}
