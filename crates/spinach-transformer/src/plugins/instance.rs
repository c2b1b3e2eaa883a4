//! Fallback for members no other plugin knows about.

use crate::fragment::Fragment;
use crate::plugin::{Plugin, VisitContext, VisitHelpers};
use crate::text::member_access;

/// Routes unknown `this.<name>` accesses through the component proxy.
///
/// Always runs last, so anything it sees was neither registered nor claimed.
pub struct Instance;

impl Plugin for Instance {
    fn name(&self) -> &str {
        "instance"
    }

    fn visit_property(
        &self,
        ctx: &VisitContext<'_>,
        _helpers: &VisitHelpers<'_>,
    ) -> Vec<Fragment> {
        if ctx.source.is_some() {
            return Vec::new();
        }
        let replacement = match ctx.name {
            Some(name) => member_access("instance.proxy", name),
            None => "instance.proxy".to_string(),
        };
        vec![
            Fragment::import("vue", "getCurrentInstance"),
            Fragment::hoist("const instance = getCurrentInstance()"),
            Fragment::replace(replacement),
        ]
    }
}
