//! Second pass: rewrites `this.<name>` accesses in the generated code.

use rustc_hash::FxHashMap;
use source_map::EditBuffer;
use swc_common::Spanned;
use swc_ecma_ast::{
    AssignExpr, AssignTarget, CallExpr, Callee, Expr, Lit, MemberExpr, MemberProp, Pat,
    SimpleAssignTarget, UpdateExpr,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::aggregate::CodeManager;
use crate::ast::{str_value, unwrap_parens};
use crate::fragment::{Fragment, PropertyRegistry, Provenance};
use crate::options::TransformOptions;
use crate::plugin::{AccessParent, PluginSet, VisitContext, VisitHelpers};
use crate::script::Script;

/// Visits every `this.<name>` access of `script` outside of `excluded`, asks
/// the plugins for a replacement, and records it in `edits`. Returns the
/// snippets the plugins hoisted along the way.
pub fn resolve_members(
    script: &Script,
    edits: &mut EditBuffer<'_>,
    registry: &PropertyRegistry,
    plugins: &PluginSet,
    options: &TransformOptions,
    excluded: &[swc_common::Span],
) -> CodeManager {
    let mut resolver = MemberResolver {
        script,
        edits,
        registry,
        plugins,
        options,
        excluded,
        parents: FxHashMap::default(),
        manager: CodeManager::new(),
        replaced: 0,
    };
    script.module().visit_with(&mut resolver);
    tracing::debug!(replaced = resolver.replaced, "resolved member accesses");
    resolver.manager
}

struct MemberResolver<'s, 'e, 'b> {
    script: &'s Script,
    edits: &'e mut EditBuffer<'b>,
    registry: &'s PropertyRegistry,
    plugins: &'s PluginSet,
    options: &'s TransformOptions,
    excluded: &'s [swc_common::Span],
    /// Member expressions whose parent matters, keyed by `(lo, hi)`.
    parents: FxHashMap<(u32, u32), AccessParent>,
    manager: CodeManager,
    replaced: usize,
}

fn key(span: swc_common::Span) -> (u32, u32) {
    (span.lo.0, span.hi.0)
}

impl MemberResolver<'_, '_, '_> {
    fn is_excluded(&self, span: swc_common::Span) -> bool {
        self.excluded
            .iter()
            .any(|ex| ex.lo <= span.lo && span.hi <= ex.hi)
    }

    fn resolve(&mut self, member: &MemberExpr) {
        let name = match &member.prop {
            MemberProp::Ident(ident) => Some(ident.sym.as_str()),
            MemberProp::Computed(computed) => match unwrap_parens(&computed.expr) {
                Expr::Lit(Lit::Str(s)) => str_value(s),
                _ => None,
            },
            MemberProp::PrivateName(_) => return,
        };
        let parent = self
            .parents
            .get(&key(member.span))
            .copied()
            .unwrap_or_default();

        let helpers = VisitHelpers {
            script: self.script,
        };
        let mut source = name.and_then(|name| self.registry.source(name)).cloned();
        let mut replacement = None;
        for (id, plugin) in self.plugins.iter() {
            let ctx = VisitContext {
                name,
                node: member,
                parent,
                source: source.clone(),
                options: self.options,
            };
            let mut claimed = false;
            for fragment in plugin.visit_property(&ctx, &helpers) {
                match self.manager.collect(id, fragment) {
                    Some(Fragment::Replacement { content }) if replacement.is_none() => {
                        replacement = Some(content);
                        claimed = true;
                    }
                    Some(other) => {
                        tracing::trace!(plugin = plugin.name(), ?other, "ignoring fragment");
                    }
                    None => {}
                }
            }
            if claimed && source.is_none() {
                source = Some(Provenance::claimed(plugin.name()));
            }
        }

        if let Some(content) = replacement {
            let span = if name.is_some() {
                member.span
            } else {
                member.obj.span()
            };
            self.edits.overwrite(self.script.span(span), content);
            self.replaced += 1;
        }
    }
}

impl Visit for MemberResolver<'_, '_, '_> {
    fn visit_assign_expr(&mut self, node: &AssignExpr) {
        if let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &node.left {
            self.parents
                .insert(key(member.span), AccessParent::AssignTarget);
        }
        node.visit_children_with(self);
    }

    /// Members inside destructuring targets such as `[this.a] = pair`.
    fn visit_pat(&mut self, node: &Pat) {
        if let Pat::Expr(expr) = node {
            if let Expr::Member(member) = unwrap_parens(expr) {
                self.parents
                    .insert(key(member.span), AccessParent::AssignTarget);
            }
        }
        node.visit_children_with(self);
    }

    fn visit_update_expr(&mut self, node: &UpdateExpr) {
        if let Expr::Member(member) = unwrap_parens(&node.arg) {
            self.parents
                .insert(key(member.span), AccessParent::UpdateTarget);
        }
        node.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Callee::Expr(callee) = &node.callee {
            if let Expr::Member(member) = &**callee {
                self.parents.insert(key(member.span), AccessParent::Callee);
            }
        }
        node.visit_children_with(self);
    }

    fn visit_member_expr(&mut self, node: &MemberExpr) {
        if matches!(&*node.obj, Expr::This(_)) {
            if !self.is_excluded(node.span) {
                self.resolve(node);
            }
            if let MemberProp::Computed(computed) = &node.prop {
                computed.visit_with(self);
            }
            return;
        }
        node.visit_children_with(self);
    }
}
