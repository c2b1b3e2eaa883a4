//! `computed` to `computed()` refs.

use crate::ast::get_properties;
use crate::error::TransformError;
use crate::fragment::{Fragment, Priority, Provenance};
use crate::plugin::{
    Plugin, TransformContext, TransformHelpers, TransformOutput, VisitContext, VisitHelpers,
};

const COMPUTED: &str = "computed";
const COMPUTED_REACTIVITY: &str = "computed (reactivity transform)";

pub struct Computed;

impl Plugin for Computed {
    fn name(&self) -> &str {
        "computed"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.name == "computed"
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

        let reactivity = ctx.options.reactivity_transform;
        let (tag, call) = if reactivity {
            (COMPUTED_REACTIVITY, "$computed")
        } else {
            (COMPUTED, "computed")
        };
        let properties = get_properties(object);
        for (key, value) in &properties {
            // getter/setter objects and references are already valid arguments
            let argument = match value.as_function() {
                Some(func) => helpers.script.stringify_fn(&func, None, 0),
                None => helpers.stringify_value(value, 0),
            };
            output.push(Fragment::property(key.as_str(), Provenance::new(tag)));
            let kind = if reactivity { "let" } else { "const" };
            output.push(Fragment::code(
                format!("{kind} {key} = {call}({argument})"),
                Priority::Derived,
            ));
        }
        if !properties.is_empty() && !reactivity {
            output.push(Fragment::import("vue", "computed"));
        }
        Ok(output)
    }

    fn visit_property(
        &self,
        ctx: &VisitContext<'_>,
        _helpers: &VisitHelpers<'_>,
    ) -> Vec<Fragment> {
        match ctx.name {
            Some(name) if ctx.source_is(COMPUTED) => {
                vec![Fragment::replace(format!("{name}.value"))]
            }
            Some(name) if ctx.source_is(COMPUTED_REACTIVITY) => vec![Fragment::replace(name)],
            _ => Vec::new(),
        }
    }
}
