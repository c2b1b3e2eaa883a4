//! `expose` to `defineExpose()` or `expose()`.

use crate::ast::string_elements;
use crate::error::TransformError;
use crate::fragment::{Fragment, Priority};
use crate::plugin::{Plugin, TransformContext, TransformHelpers, TransformOutput};
use crate::text::multiline_object;

pub struct Expose;

impl Plugin for Expose {
    fn name(&self) -> &str {
        "expose"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.name == "expose"
    }

    fn transform<'a>(
        &self,
        ctx: &TransformContext<'a>,
        _helpers: &TransformHelpers<'a>,
    ) -> Result<TransformOutput, TransformError> {
        let mut output = TransformOutput::default();
        let exposed = ctx.node.as_array().map(string_elements).unwrap_or_default();
        if !exposed.is_empty() {
            let call = if ctx.options.script_setup {
                "defineExpose"
            } else {
                "expose"
            };
            output.push(Fragment::code(
                format!("{call}({})", multiline_object(&exposed)),
                Priority::Effect,
            ));
        }
        Ok(output)
    }
}
