//! `inject` to `inject()` calls.

use crate::ast::{get_properties, string_elements};
use crate::error::TransformError;
use crate::fragment::{Fragment, Priority, Provenance};
use crate::plugin::{
    Plugin, TransformContext, TransformHelpers, TransformOutput, VisitContext, VisitHelpers,
};
use crate::text::quote;

const INJECT: &str = "inject";

pub struct Inject;

impl Plugin for Inject {
    fn name(&self) -> &str {
        "inject"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.name == "inject"
    }

    fn transform<'a>(
        &self,
        ctx: &TransformContext<'a>,
        helpers: &TransformHelpers<'a>,
    ) -> Result<TransformOutput, TransformError> {
        let mut injections = Vec::new();
        if let Some(object) = ctx.node.as_object() {
            for (key, value) in get_properties(object) {
                let mut from = None;
                let mut default = None;
                if let Some(options) = value.as_object() {
                    let options = get_properties(options);
                    from = options.get("from").map(|v| helpers.stringify_value(v, 0));
                    default = options.get("default").map(|v| helpers.stringify_value(v, 0));
                } else if let Some(source) = value.as_str() {
                    from = Some(quote(source));
                }
                injections.push((key, from, default));
            }
        } else if let Some(array) = ctx.node.as_array() {
            injections.extend(string_elements(array).into_iter().map(|key| (key, None, None)));
        }

        let mut output = TransformOutput::default();
        for (key, from, default) in &injections {
            let from = from.clone().unwrap_or_else(|| quote(key));
            let args = match default {
                Some(default) => format!("{from}, {default}"),
                None => from,
            };
            output.push(Fragment::property(key.as_str(), Provenance::new(INJECT)));
            output.push(Fragment::code(
                format!("const {key} = inject({args})"),
                Priority::Interface,
            ));
        }
        if !injections.is_empty() {
            output.push(Fragment::import("vue", "inject"));
        }
        Ok(output)
    }

    fn visit_property(
        &self,
        ctx: &VisitContext<'_>,
        _helpers: &VisitHelpers<'_>,
    ) -> Vec<Fragment> {
        match ctx.name {
            Some(name) if ctx.source_is(INJECT) => vec![Fragment::replace(name)],
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
    fn test_array_inject() {
        let output = run(
            &Inject,
            "export default { inject: ['theme', 'user'] }",
            "inject",
            &TransformOptions::default(),
        );
        assert_eq!(
            output.code(),
            "const theme = inject('theme')\nconst user = inject('user')"
        );
        assert_eq!(output.hoisted(), vec!["import { inject } from 'vue'"]);
        assert_eq!(
            output.properties(),
            vec![("theme", INJECT, true), ("user", INJECT, true)]
        );
    }

    #[test]
    fn test_object_inject() {
        let output = run(
            &Inject,
            "export default { inject: { a: { from: 'b', default: 1 }, c: 'd', e: {} } }",
            "inject",
            &TransformOptions::default(),
        );
        assert_eq!(
            output.code(),
            "const a = inject('b', 1)\nconst c = inject('d')\nconst e = inject('e')"
        );
    }

    #[test]
    fn test_empty_inject_has_no_import() {
        let output = run(
            &Inject,
            "export default { inject: [] }",
            "inject",
            &TransformOptions::default(),
        );
        assert!(output.hoisted().is_empty());
    }

    #[test]
    fn test_visit() {
        let fragments = visit(
            &Inject,
            "this.theme",
            AccessParent::Other,
            Some(INJECT),
            &TransformOptions::default(),
        );
        assert_eq!(replacement(&fragments), Some("theme"));
    }
}
