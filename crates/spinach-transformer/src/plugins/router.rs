//! Vue Router guards and the `$router`/`$route` instance properties.

use crate::error::TransformError;
use crate::fragment::{Fragment, Priority};
use crate::plugin::{
    Plugin, TransformContext, TransformHelpers, TransformOutput, VisitContext, VisitHelpers,
};
use crate::text::camel_case;

pub struct Router;

impl Plugin for Router {
    fn name(&self) -> &str {
        "vue-router"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        matches!(ctx.name, "beforeRouteUpdate" | "beforeRouteLeave")
    }

    fn transform<'a>(
        &self,
        ctx: &TransformContext<'a>,
        helpers: &TransformHelpers<'a>,
    ) -> Result<TransformOutput, TransformError> {
        let guard = camel_case(&format!("on-{}", ctx.name));
        let callback = match ctx.node.as_function() {
            Some(func) => helpers.script.stringify_fn(&func, None, 0),
            None => helpers.stringify_value(&ctx.node, 0),
        };
        Ok(vec![
            Fragment::code(format!("{guard}({callback})"), Priority::Effect),
            Fragment::import("vue-router", &guard),
        ]
        .into())
    }

    fn visit_property(
        &self,
        ctx: &VisitContext<'_>,
        _helpers: &VisitHelpers<'_>,
    ) -> Vec<Fragment> {
        if ctx.source.is_some() {
            return Vec::new();
        }
        let (binding, composable) = match ctx.name {
            Some("$router") => ("router", "useRouter"),
            Some("$route") => ("route", "useRoute"),
            _ => return Vec::new(),
        };
        vec![
            Fragment::import("vue-router", composable),
            Fragment::hoist(format!("const {binding} = {composable}()")),
            Fragment::replace(binding),
        ]
    }
}
