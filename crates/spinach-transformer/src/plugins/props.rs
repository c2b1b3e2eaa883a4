//! `props` to `defineProps()`.

use indexmap::IndexMap;
use swc_common::Spanned;
use swc_ecma_ast::{Expr, Lit};

use crate::ast::{
    get_properties, str_value, string_elements, unwrap_parens, FunctionBody, FunctionLike,
    OptionValue,
};
use crate::error::TransformError;
use crate::fragment::{Fragment, Priority, Provenance};
use crate::plugin::{
    Plugin, TransformContext, TransformHelpers, TransformOutput, VisitContext, VisitHelpers,
};
use crate::text::multiline_object;

const PROPS: &str = "props";
const PROPS_DESTRUCTURE: &str = "props (destructure)";

pub struct Props;

impl Plugin for Props {
    fn name(&self) -> &str {
        "props"
    }

    fn transform_include(&self, ctx: &TransformContext<'_>) -> bool {
        ctx.name == "props"
    }

    fn transform<'a>(
        &self,
        ctx: &TransformContext<'a>,
        helpers: &TransformHelpers<'a>,
    ) -> Result<TransformOutput, TransformError> {
        let destructure = ctx.options.destructures_props();
        let tag = Provenance::new(if destructure { PROPS_DESTRUCTURE } else { PROPS });

        let mut declared: IndexMap<String, Option<OptionValue<'a>>> = IndexMap::new();
        if let Some(object) = ctx.node.as_object() {
            declared.extend(get_properties(object).into_iter().map(|(k, v)| (k, Some(v))));
        } else if let Some(array) = ctx.node.as_array() {
            declared.extend(string_elements(array).into_iter().map(|k| (k, None)));
        }

        let mut output = TransformOutput::default();
        for name in declared.keys() {
            output.push(Fragment::hidden_property(name.as_str(), tag.clone()));
        }
        if !ctx.options.script_setup {
            return Ok(output.preserve());
        }

        let shapes: Vec<(&String, PropShape<'a>)> = declared
            .iter()
            .map(|(name, value)| (name, PropShape::read(*value)))
            .collect();

        let define = if ctx.options.typescript {
            let fields = shapes.iter().map(|(name, shape)| {
                let optional = if shape.required { "" } else { "?" };
                format!("{name}{optional}: {}", shape.ts_type())
            });
            format!("defineProps<{}>()", multiline_object(fields))
        } else {
            format!("defineProps({})", helpers.stringify(ctx.node.span(), 0))
        };

        let typed_defaults = ctx.options.typescript;
        let code = if destructure {
            let bindings = shapes.iter().map(|(name, shape)| match shape.default {
                Some(default) if typed_defaults => format!(
                    "{name} = {}",
                    destructured_default(helpers, default, shape.is_function_type())
                ),
                _ => name.to_string(),
            });
            format!("const {} = {define}", multiline_object(bindings))
        } else {
            let defaults: Vec<String> = if typed_defaults {
                shapes
                    .iter()
                    .filter_map(|(name, shape)| {
                        let default = shape.default?;
                        Some(format!("{name}: {}", helpers.stringify_value(&default, 0)))
                    })
                    .collect()
            } else {
                Vec::new()
            };
            if defaults.is_empty() {
                format!("const props = {define}")
            } else {
                format!("const props = withDefaults({define}, {})", multiline_object(defaults))
            }
        };
        output.push(Fragment::code(code, Priority::Interface));
        Ok(output)
    }

    fn visit_property(
        &self,
        ctx: &VisitContext<'_>,
        _helpers: &VisitHelpers<'_>,
    ) -> Vec<Fragment> {
        let Some(name) = ctx.name else {
            return Vec::new();
        };
        if ctx.source_is(PROPS_DESTRUCTURE) {
            vec![Fragment::replace(name)]
        } else if ctx.source_is(PROPS) {
            vec![Fragment::replace(format!("props.{name}"))]
        } else {
            Vec::new()
        }
    }
}

/// Prints a default for a destructured binding. Factory functions are called,
/// unless the prop itself is a function.
fn destructured_default(
    helpers: &TransformHelpers<'_>,
    default: OptionValue<'_>,
    function_type: bool,
) -> String {
    let Some(func) = default.as_function() else {
        return helpers.stringify(default.span(), 0);
    };
    if function_type {
        return helpers.stringify_value(&default, 0);
    }
    match (func, func.body()) {
        (FunctionLike::Arrow(_), Some(FunctionBody::Expr(body))) if !func.has_params() => {
            helpers.stringify(body.span(), 0)
        }
        _ => format!("({})()", helpers.stringify_value(&default, 0)),
    }
}

/// What a single prop declaration says about the prop.
struct PropShape<'a> {
    types: Vec<&'a Expr>,
    required: bool,
    default: Option<OptionValue<'a>>,
}

impl<'a> PropShape<'a> {
    fn read(value: Option<OptionValue<'a>>) -> Self {
        let mut shape = PropShape {
            types: Vec::new(),
            required: false,
            default: None,
        };
        let Some(value) = value else {
            return shape;
        };
        match value.as_object() {
            Some(object) => {
                let options = get_properties(object);
                if let Some(ty) = options.get("type").and_then(|v| v.expr()) {
                    shape.types = type_list(ty);
                }
                if let Some(required) = options.get("required") {
                    shape.required = match required.as_lit() {
                        Some(Lit::Bool(b)) => b.value,
                        Some(Lit::Null(_)) => false,
                        Some(Lit::Num(n)) => n.value != 0.0,
                        Some(Lit::Str(s)) => str_value(s).is_some_and(|v| !v.is_empty()),
                        _ => true,
                    };
                }
                shape.default = options.get("default").copied();
            }
            None => {
                if let Some(expr) = value.expr() {
                    shape.types = type_list(expr);
                }
            }
        }
        shape
    }

    fn is_function_type(&self) -> bool {
        self.types.len() == 1 && type_name(self.types[0]) == Some("Function")
    }

    fn ts_type(&self) -> String {
        if self.types.is_empty() {
            return "any".to_string();
        }
        let types: Vec<&str> = self.types.iter().map(|ty| ts_type_of(type_name(ty))).collect();
        if types.contains(&"any") {
            return "any".to_string();
        }
        if types.len() == 1 {
            return types[0].to_string();
        }
        types
            .iter()
            .map(|ty| if ty.contains("=>") { format!("({ty})") } else { ty.to_string() })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

fn type_list(expr: &Expr) -> Vec<&Expr> {
    match unwrap_parens(expr) {
        Expr::Array(array) => array
            .elems
            .iter()
            .flatten()
            .map(|elem| unwrap_parens(&elem.expr))
            .collect(),
        other => vec![other],
    }
}

fn type_name(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.as_str()),
        _ => None,
    }
}

fn ts_type_of(constructor: Option<&str>) -> &'static str {
    match constructor {
        Some("String") => "string",
        Some("Number") => "number",
        Some("Boolean") => "boolean",
        Some("Symbol") => "symbol",
        Some("BigInt") => "bigint",
        Some("Object") => "object",
        Some("Array") => "any[]",
        Some("Function") => "(...args: any[]) => any",
        _ => "any",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TransformOptions;
    use crate::plugin::{AccessParent, Disposition};
    use crate::plugins::testing::{replacement, run, visit};
    use pretty_assertions::assert_eq;

    const OBJECT: &str = "export default {\n  props: {\n    msg: { type: String, required: true },\n    count: { type: Number, default: 0 },\n    items: { type: Array, default: () => [] },\n    id: [String, Number],\n  },\n}\n";

    #[test]
    fn test_array_props_destructured() {
        let output = run(
            &Props,
            "export default { props: ['msg', 'count'] }",
            "props",
            &TransformOptions::default(),
        );
        assert_eq!(
            output.code(),
            "const {\n  msg,\n  count,\n} = defineProps(['msg', 'count'])"
        );
        assert_eq!(
            output.properties(),
            vec![
                ("msg", PROPS_DESTRUCTURE, false),
                ("count", PROPS_DESTRUCTURE, false),
            ]
        );
    }

    #[test]
    fn test_object_props_keep_runtime_declaration() {
        let output = run(&Props, OBJECT, "props", &TransformOptions::default());
        assert_eq!(
            output.code(),
            "const {\n  msg,\n  count,\n  items,\n  id,\n} = defineProps({\n  msg: { type: String, required: true },\n  count: { type: Number, default: 0 },\n  items: { type: Array, default: () => [] },\n  id: [String, Number],\n})"
        );
    }

    #[test]
    fn test_props_object_without_destructure() {
        let options = TransformOptions {
            props_destructure: false,
            ..Default::default()
        };
        let output = run(&Props, "export default { props: ['msg'] }", "props", &options);
        assert_eq!(output.code(), "const props = defineProps(['msg'])");
        assert_eq!(output.properties(), vec![("msg", PROPS, false)]);
    }

    #[test]
    fn test_typescript_props() {
        let options = TransformOptions {
            typescript: true,
            ..Default::default()
        };
        let output = run(&Props, OBJECT, "props", &options);
        assert_eq!(
            output.code(),
            "const {\n  msg,\n  count = 0,\n  items = [],\n  id,\n} = defineProps<{\n  msg: string,\n  count?: number,\n  items?: any[],\n  id?: string | number,\n}>()"
        );
    }

    #[test]
    fn test_typescript_props_with_defaults() {
        let options = TransformOptions {
            typescript: true,
            props_destructure: false,
            ..Default::default()
        };
        let output = run(&Props, OBJECT, "props", &options);
        assert_eq!(
            output.code(),
            "const props = withDefaults(defineProps<{\n  msg: string,\n  count?: number,\n  items?: any[],\n  id?: string | number,\n}>(), {\n  count: 0,\n  items: () => [],\n})"
        );
    }

    #[test]
    fn test_factory_defaults_are_called() {
        let output = run(
            &Props,
            "export default { props: { a: { type: Object, default() { return {} } }, f: { type: Function, default: () => 1 } } }",
            "props",
            &TransformOptions {
                typescript: true,
                ..Default::default()
            },
        );
        let code = output.code();
        assert!(code.contains("a = (() => { return {} })()"), "{code}");
        assert!(code.contains("f = () => 1"), "{code}");
        assert!(code.contains("f?: (...args: any[]) => any"), "{code}");
    }

    #[test]
    fn test_preserved_without_script_setup() {
        let options = TransformOptions {
            script_setup: false,
            ..Default::default()
        };
        let output = run(&Props, "export default { props: ['msg'] }", "props", &options);
        assert_eq!(output.code(), "");
        assert_eq!(output.disposition, Some(Disposition::Preserve));
    }

    #[test]
    fn test_visit() {
        let options = TransformOptions::default();
        let fragments = visit(&Props, "this.msg", AccessParent::Other, Some(PROPS_DESTRUCTURE), &options);
        assert_eq!(replacement(&fragments), Some("msg"));
        let fragments = visit(&Props, "this.msg", AccessParent::Other, Some(PROPS), &options);
        assert_eq!(replacement(&fragments), Some("props.msg"));
        let fragments = visit(&Props, "this.msg", AccessParent::Other, Some("data"), &options);
        assert!(fragments.is_empty());
    }
}
