//! Pinia store helpers (`mapState`, `mapWritableState`, `mapGetters` and
//! `mapActions`) spread into `computed` and `methods`.
//!
//! Each mapped store gets one store variable; state and getters come out of
//! `storeToRefs()` and actions are destructured from the store itself.

use swc_ecma_ast::{CallExpr, Callee, Expr, ObjectLit, PropOrSpread};

use crate::ast::{get_properties, string_elements, unwrap_parens};
use crate::error::TransformError;
use crate::fragment::{Fragment, Provenance};
use crate::plugin::{
    Plugin, TransformContext, TransformHelpers, TransformOutput, VisitContext, VisitHelpers,
};

const PINIA_STATE: &str = "pinia state";
const PINIA_STATE_REACTIVITY: &str = "pinia state (reactivity transform)";
const PINIA_ACTIONS: &str = "pinia actions";

pub struct Pinia;

/// A `mapX(useStore, keys)` call.
struct StoreMapping<'a> {
    helper: &'a str,
    store_fn: &'a str,
    /// `(store key, local name)` pairs.
    keys: Vec<(String, String)>,
}

impl Plugin for Pinia {
    fn name(&self) -> &str {
        "pinia"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.name == "computed" || ctx.name == "methods"
    }

    fn transform<'a>(
        &self,
        ctx: &TransformContext<'a>,
        _helpers: &TransformHelpers<'a>,
    ) -> Result<TransformOutput, TransformError> {
        let mut output = TransformOutput::default();
        let Some(object) = ctx.node.as_object() else {
            return Ok(output);
        };
        let reactivity = ctx.options.reactivity_transform;

        for mapping in store_mappings(object) {
            let state = match (ctx.name, mapping.helper) {
                ("computed", "mapState" | "mapWritableState" | "mapGetters") => true,
                ("methods", "mapActions") => false,
                _ => continue,
            };
            if mapping.keys.is_empty() {
                continue;
            }

            let store = store_variable(mapping.store_fn);
            output.push(Fragment::hoist(format!("const {store} = {}()", mapping.store_fn)));
            let pattern = mapping
                .keys
                .iter()
                .map(|(key, local)| {
                    if key == local {
                        key.clone()
                    } else {
                        format!("{key}: {local}")
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");

            let tag = if !state {
                PINIA_ACTIONS
            } else if reactivity {
                PINIA_STATE_REACTIVITY
            } else {
                PINIA_STATE
            };
            for (_, local) in &mapping.keys {
                output.push(Fragment::property(local.as_str(), Provenance::new(tag)));
            }

            if !state {
                output.push(Fragment::hoist(format!("const {{ {pattern} }} = {store}")));
            } else if reactivity {
                output.push(Fragment::import("pinia", "storeToRefs"));
                output.push(Fragment::hoist(format!(
                    "let {{ {pattern} }} = $(storeToRefs({store}))"
                )));
            } else {
                output.push(Fragment::import("pinia", "storeToRefs"));
                output.push(Fragment::hoist(format!(
                    "const {{ {pattern} }} = storeToRefs({store})"
                )));
            }
        }
        Ok(output)
    }

    fn visit_property(
        &self,
        ctx: &VisitContext<'_>,
        _helpers: &VisitHelpers<'_>,
    ) -> Vec<Fragment> {
        match ctx.name {
            Some(name) if ctx.source_is(PINIA_STATE) => {
                vec![Fragment::replace(format!("{name}.value"))]
            }
            Some(name) if ctx.source_is(PINIA_STATE_REACTIVITY) || ctx.source_is(PINIA_ACTIONS) => {
                vec![Fragment::replace(name)]
            }
            _ => Vec::new(),
        }
    }
}

fn store_mappings(object: &ObjectLit) -> Vec<StoreMapping<'_>> {
    object
        .props
        .iter()
        .filter_map(|prop| match prop {
            PropOrSpread::Spread(spread) => match unwrap_parens(&spread.expr) {
                Expr::Call(call) => store_mapping(call),
                _ => None,
            },
            PropOrSpread::Prop(_) => None,
        })
        .collect()
}

fn store_mapping(call: &CallExpr) -> Option<StoreMapping<'_>> {
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Ident(helper) = unwrap_parens(callee) else {
        return None;
    };
    let [store, keys, ..] = call.args.as_slice() else {
        return None;
    };
    if store.spread.is_some() || keys.spread.is_some() {
        return None;
    }
    let Expr::Ident(store_fn) = unwrap_parens(&store.expr) else {
        return None;
    };

    let keys = match unwrap_parens(&keys.expr) {
        Expr::Array(array) => string_elements(array)
            .into_iter()
            .map(|key| (key.clone(), key))
            .collect(),
        // `local: 'storeKey'`; function mappers have no static key
        Expr::Object(object) => get_properties(object)
            .into_iter()
            .filter_map(|(local, value)| value.as_str().map(|key| (key.to_string(), local)))
            .collect(),
        _ => Vec::new(),
    };
    Some(StoreMapping {
        helper: helper.sym.as_str(),
        store_fn: store_fn.sym.as_str(),
        keys,
    })
}

/// `useCartStore` is stored in `cartStore`, anything else in `<name>Store`.
fn store_variable(store_fn: &str) -> String {
    match store_fn.strip_prefix("use") {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_uppercase()) => {
            let mut chars = rest.chars();
            chars
                .next()
                .map(|first| first.to_ascii_lowercase().to_string() + chars.as_str())
                .unwrap_or_default()
        }
        _ => format!("{store_fn}Store"),
    }
}
