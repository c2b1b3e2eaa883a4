//! Local `components` and `directives` as `<script setup>` bindings.
//!
//! `<script setup>` resolves components and directives from bindings in
//! scope, so the registration objects turn into constants named the way the
//! template looks them up. Without `<script setup>` the options stay as they are.

use crate::ast::get_properties;
use crate::error::TransformError;
use crate::fragment::{Fragment, Priority};
use crate::plugin::{Plugin, TransformContext, TransformHelpers, TransformOutput};
use crate::text::{camel_case, pascal_case};

pub struct Components;

impl Plugin for Components {
    fn name(&self) -> &str {
        "components"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.options.script_setup && ctx.name == "components"
    }

    fn transform<'a>(
        &self,
        ctx: &TransformContext<'a>,
        helpers: &TransformHelpers<'a>,
    ) -> Result<TransformOutput, TransformError> {
        Ok(bind_registrations(ctx, helpers, pascal_case))
    }
}

pub struct Directives;

impl Plugin for Directives {
    fn name(&self) -> &str {
        "directives"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.options.script_setup && ctx.name == "directives"
    }

    fn transform<'a>(
        &self,
        ctx: &TransformContext<'a>,
        helpers: &TransformHelpers<'a>,
    ) -> Result<TransformOutput, TransformError> {
        Ok(bind_registrations(ctx, helpers, |key| {
            camel_case(&format!("v-{key}"))
        }))
    }
}

fn bind_registrations(
    ctx: &TransformContext<'_>,
    helpers: &TransformHelpers<'_>,
    binding: impl Fn(&str) -> String,
) -> TransformOutput {
    let mut output = TransformOutput::default();
    let Some(object) = ctx.node.as_object() else {
        return output;
    };
    for (key, value) in get_properties(object) {
        let name = binding(&key);
        if value.as_ident() != Some(name.as_str()) {
            output.push(Fragment::code(
                format!("const {name} = {}", helpers.stringify_value(&value, 0)),
                Priority::State,
            ));
        }
    }
    output
}
