//! Lifecycle hooks to `onX()` registrations.

use crate::error::TransformError;
use crate::fragment::{Fragment, Priority};
use crate::plugin::{Plugin, TransformContext, TransformHelpers, TransformOutput};
use crate::text::camel_case;

const HOOKS: &[&str] = &[
    "beforeCreate",
    "created",
    "serverPrefetch",
    "beforeMount",
    "mounted",
    "beforeUpdate",
    "updated",
    "activated",
    "deactivated",
    "beforeUnmount",
    "unmounted",
    "beforeDestroy",
    "destroyed",
    "renderTracked",
    "renderTriggered",
    "errorCaptured",
];

pub struct Lifecycles;

/// The composition API hook that replaces the option `name`.
///
/// There is no hook for the creation phase, so `beforeCreate` and `created`
/// run before mount instead.
fn hook_name(name: &str) -> String {
    match name {
        "beforeCreate" | "created" => "onBeforeMount".to_string(),
        "beforeDestroy" | "destroyed" => "onUnmounted".to_string(),
        other => camel_case(&format!("on-{other}")),
    }
}

impl Plugin for Lifecycles {
    fn name(&self) -> &str {
        "lifecycles"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        HOOKS.contains(&ctx.name)
    }

    fn transform<'a>(
        &self,
        ctx: &TransformContext<'a>,
        helpers: &TransformHelpers<'a>,
    ) -> Result<TransformOutput, TransformError> {
        let hook = hook_name(ctx.name);
        let callback = match ctx.node.as_function() {
            Some(func) => helpers.script.stringify_fn(&func, None, 0),
            None => helpers.stringify_value(&ctx.node, 0),
        };
        Ok(vec![
            Fragment::code(format!("{hook}({callback})"), Priority::Effect),
            Fragment::import("vue", &hook),
        ]
        .into())
    }
}
