//! A parsed script block and the text helpers that read from it.

use std::sync::Arc;

use source_map::Span;
use swc_common::{BytePos, FileName, SourceMap, Spanned};
use swc_ecma_ast::{EsVersion, Module, ModuleDecl, ModuleItem};
use swc_ecma_parser::{parse_file_as_module, EsSyntax, Syntax, TsSyntax};

use crate::ast::{FunctionBody, FunctionLike, OptionValue};
use crate::error::TransformError;
use crate::text::{dedent, indent};

/// The dialect a script is written in, from its `lang` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptLang {
    #[default]
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
}

impl ScriptLang {
    pub fn from_lang(lang: Option<&str>) -> Self {
        match lang {
            Some("ts") => ScriptLang::TypeScript,
            Some("tsx") => ScriptLang::Tsx,
            Some("jsx") => ScriptLang::Jsx,
            _ => ScriptLang::JavaScript,
        }
    }

    pub fn is_typescript(self) -> bool {
        matches!(self, ScriptLang::TypeScript | ScriptLang::Tsx)
    }

    fn syntax(self) -> Syntax {
        match self {
            ScriptLang::JavaScript | ScriptLang::Jsx => Syntax::Es(EsSyntax {
                jsx: self == ScriptLang::Jsx,
                ..Default::default()
            }),
            ScriptLang::TypeScript | ScriptLang::Tsx => Syntax::Typescript(TsSyntax {
                tsx: self == ScriptLang::Tsx,
                ..Default::default()
            }),
        }
    }
}

/// Script text together with its syntax tree.
///
/// Nodes carry swc positions; [`Script::span`] turns them into offsets into
/// [`Script::source`].
pub struct Script {
    source: String,
    lang: ScriptLang,
    module: Module,
    start: BytePos,
}

impl Script {
    pub fn parse(source: impl Into<String>, lang: ScriptLang) -> Result<Self, TransformError> {
        let source = source.into();
        let cm: Arc<SourceMap> = Default::default();
        let fm = cm.new_source_file(FileName::Custom("script".into()).into(), source.clone());
        let start = fm.start_pos;

        let module = parse_file_as_module(
            &fm,
            lang.syntax(),
            EsVersion::Es2022,
            None,
            &mut Vec::new(),
        )
        .map_err(|error| {
            let span = error.span();
            TransformError::ScriptParse {
                message: format!("{:?}", error.kind()),
                span: Span::new(
                    span.lo.0.saturating_sub(start.0),
                    span.hi.0.saturating_sub(start.0),
                ),
            }
        })?;

        Ok(Self {
            source,
            lang,
            module,
            start,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn lang(&self) -> ScriptLang {
        self.lang
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Converts an swc span into a byte range of the source.
    pub fn span(&self, span: swc_common::Span) -> Span {
        Span::new(
            span.lo.0.saturating_sub(self.start.0),
            span.hi.0.saturating_sub(self.start.0),
        )
    }

    pub fn offset(&self, pos: BytePos) -> u32 {
        pos.0.saturating_sub(self.start.0)
    }

    /// The source text under `span`.
    pub fn text_of(&self, span: swc_common::Span) -> &str {
        self.span(span).slice(&self.source).unwrap_or_default()
    }

    pub fn text(&self, node: &impl Spanned) -> &str {
        self.text_of(node.span())
    }

    /// Whether the module has a top-level import.
    pub fn has_imports(&self) -> bool {
        self.module
            .body
            .iter()
            .any(|item| matches!(item, ModuleItem::ModuleDecl(ModuleDecl::Import(_))))
    }

    /// Source text of `span`, dedented and then indented by `indentation`.
    pub fn stringify(&self, span: swc_common::Span, indentation: usize) -> String {
        indent(&dedent(self.text_of(span)), indentation)
    }

    pub fn stringify_node(&self, node: &impl Spanned, indentation: usize) -> String {
        self.stringify(node.span(), indentation)
    }

    /// Prints a function as `function name(params) body`, or as an arrow
    /// function when `name` is `None`. Arrow functions with an expression
    /// body cannot be named and are printed as they are.
    pub fn stringify_fn(
        &self,
        func: &FunctionLike<'_>,
        name: Option<&str>,
        indentation: usize,
    ) -> String {
        if let FunctionLike::Arrow(arrow) = func {
            if name.is_none() || matches!(func.body(), Some(FunctionBody::Expr(_))) {
                return self.stringify_node(*arrow, indentation);
            }
        }

        let params = func
            .params()
            .iter()
            .map(|param| self.text_of(param.span))
            .collect::<Vec<_>>()
            .join(", ");
        let return_type = func
            .return_type()
            .map(|span| format!(": {}", self.text_of(span)))
            .unwrap_or_default();
        let body = match func.body() {
            Some(FunctionBody::Block(block)) => self.stringify_node(block, indentation),
            Some(FunctionBody::Expr(expr)) => self.stringify_node(expr, indentation),
            None => "{}".to_string(),
        };
        let prefix = if func.is_async() { "async " } else { "" };

        match name {
            Some(name) => {
                let star = if func.is_generator() { "*" } else { "" };
                format!("{prefix}function{star} {name}({params}){return_type} {body}")
            }
            None if func.is_generator() => {
                format!("{prefix}function*({params}){return_type} {body}")
            }
            None => format!("{prefix}({params}){return_type} => {body}"),
        }
    }

    /// Prints a property value, turning methods and getters into functions.
    pub fn stringify_value(&self, value: &OptionValue<'_>, indentation: usize) -> String {
        match value {
            OptionValue::Method(_) | OptionValue::Getter(_) => match value.as_function() {
                Some(func) => self.stringify_fn(&func, None, indentation),
                None => self.stringify(value.span(), indentation),
            },
            _ => self.stringify(value.span(), indentation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{find_component_options, get_properties};
    use pretty_assertions::assert_eq;

    fn options_of(script: &Script) -> Vec<(String, String)> {
        let component = find_component_options(&script).unwrap().unwrap();
        get_properties(component.object)
            .into_iter()
            .map(|(name, value)| (name, script.stringify_value(&value, 0)))
            .collect()
    }

    #[test]
    fn test_span_is_relative_to_source() {
        let script = Script::parse("\nexport default {}\n", ScriptLang::JavaScript).unwrap();
        let item = &script.module().body[0];
        assert_eq!(script.span(item.span()), Span::new(1u32, 18u32));
        assert_eq!(script.text(item), "export default {}");
    }

    #[test]
    fn test_parse_error_has_relative_span() {
        let error = Script::parse("const = 1", ScriptLang::JavaScript)
            .err()
            .unwrap();
        match error {
            TransformError::ScriptParse { span, .. } => {
                assert!(u32::from(span.start) <= 9);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_methods_print_as_arrows() {
        let script = Script::parse(
            "export default {\n  a: 1,\n  b() {\n    return 2\n  },\n  async c(x, y) {\n    await x\n  },\n  d: (x) => x * 2,\n}\n",
            ScriptLang::JavaScript,
        )
        .unwrap();
        assert_eq!(
            options_of(&script),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "() => {\n  return 2\n}".to_string()),
                ("c".to_string(), "async (x, y) => {\n  await x\n}".to_string()),
                ("d".to_string(), "(x) => x * 2".to_string()),
            ]
        );
    }

    #[test]
    fn test_typed_params_keep_annotations() {
        let script = Script::parse(
            "export default {\n  m(a: number, b?: string): void {\n    a\n  },\n}\n",
            ScriptLang::TypeScript,
        )
        .unwrap();
        assert_eq!(
            options_of(&script),
            vec![(
                "m".to_string(),
                "(a: number, b?: string): void => {\n  a\n}".to_string()
            )]
        );
    }

    #[test]
    fn test_named_function() {
        let script = Script::parse(
            "export default {\n  methods: {\n    async load(id) {\n      return id\n    },\n  },\n}\n",
            ScriptLang::JavaScript,
        )
        .unwrap();
        let component = find_component_options(&script).unwrap().unwrap();
        let options = get_properties(component.object);
        let methods = options["methods"].as_object().unwrap();
        let load = get_properties(methods)["load"].as_function().unwrap();
        assert_eq!(
            script.stringify_fn(&load, Some("load"), 0),
            "async function load(id) {\n  return id\n}"
        );
    }
}
