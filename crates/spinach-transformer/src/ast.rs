//! Lookups over the swc syntax tree.

use indexmap::IndexMap;
use swc_common::Spanned;
use swc_ecma_ast::{
    ArrayLit, ArrowExpr, BlockStmt, BlockStmtOrExpr, Callee, ExportDefaultExpr, Expr,
    Function, GetterProp, Ident, Lit, MethodProp, Module, ModuleDecl, ModuleItem, ObjectLit, Pat,
    Prop, PropName, PropOrSpread, Stmt, Str,
};

use crate::error::TransformError;
use crate::script::Script;

/// The options object of `export default { ... }` or `export default defineComponent({ ... })`.
#[derive(Clone, Copy)]
pub struct ComponentOptions<'a> {
    pub export: &'a ExportDefaultExpr,
    pub object: &'a ObjectLit,
}

/// Finds the component options object.
///
/// Returns `Ok(None)` when the module has no default export, and an error
/// when the default export is something other than an object literal or a
/// call with a single object literal argument.
pub fn find_component_options(
    script: &Script,
) -> Result<Option<ComponentOptions<'_>>, TransformError> {
    for item in &script.module().body {
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                let object = match unwrap_parens(&export.expr) {
                    Expr::Object(object) => Some(object),
                    Expr::Call(call) if call.args.len() == 1 && call.args[0].spread.is_none() => {
                        match unwrap_parens(&call.args[0].expr) {
                            Expr::Object(object) => Some(object),
                            _ => None,
                        }
                    }
                    _ => None,
                };
                return match object {
                    Some(object) => Ok(Some(ComponentOptions { export, object })),
                    None => Err(TransformError::InvalidDefaultExport {
                        span: script.span(export.span),
                    }),
                };
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                return Err(TransformError::InvalidDefaultExport {
                    span: script.span(export.span),
                });
            }
            _ => {}
        }
    }
    Ok(None)
}

/// A top-level `defineOptions({ ... })` call.
#[derive(Clone, Copy)]
pub struct DefineOptions<'a> {
    pub object: &'a ObjectLit,
}

pub fn find_define_options(module: &Module) -> Option<DefineOptions<'_>> {
    module.body.iter().find_map(|item| {
        let ModuleItem::Stmt(Stmt::Expr(statement)) = item else {
            return None;
        };
        let Expr::Call(call) = &*statement.expr else {
            return None;
        };
        let Callee::Expr(callee) = &call.callee else {
            return None;
        };
        if !matches!(&**callee, Expr::Ident(ident) if &*ident.sym == "defineOptions") {
            return None;
        }
        match call.args.first().map(|arg| unwrap_parens(&arg.expr)) {
            Some(Expr::Object(object)) => Some(DefineOptions { object }),
            _ => None,
        }
    })
}

pub fn unwrap_parens(mut expr: &Expr) -> &Expr {
    while let Expr::Paren(paren) = expr {
        expr = &paren.expr;
    }
    expr
}

/// The value of an object property.
#[derive(Clone, Copy)]
pub enum OptionValue<'a> {
    Expr(&'a Expr),
    Method(&'a MethodProp),
    Getter(&'a GetterProp),
    /// `{ name }`
    Shorthand(&'a Ident),
}

impl<'a> OptionValue<'a> {
    /// The span of the value. Methods and getters cover their key as well.
    pub fn span(&self) -> swc_common::Span {
        match self {
            OptionValue::Expr(expr) => expr.span(),
            OptionValue::Method(method) => method.span(),
            OptionValue::Getter(getter) => getter.span,
            OptionValue::Shorthand(ident) => ident.span,
        }
    }

    pub fn expr(&self) -> Option<&'a Expr> {
        match self {
            OptionValue::Expr(expr) => Some(unwrap_parens(expr)),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&'a ObjectLit> {
        match self.expr()? {
            Expr::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&'a ArrayLit> {
        match self.expr()? {
            Expr::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<FunctionLike<'a>> {
        match self {
            OptionValue::Method(method) => Some(FunctionLike::Function(&method.function)),
            OptionValue::Getter(getter) => Some(FunctionLike::Getter(getter)),
            OptionValue::Expr(_) => match self.expr()? {
                Expr::Fn(func) => Some(FunctionLike::Function(&func.function)),
                Expr::Arrow(arrow) => Some(FunctionLike::Arrow(arrow)),
                _ => None,
            },
            OptionValue::Shorthand(_) => None,
        }
    }

    /// The identifier name, for `name` and `{ name }`.
    pub fn as_ident(&self) -> Option<&'a str> {
        match self {
            OptionValue::Shorthand(ident) => Some(ident.sym.as_str()),
            _ => match self.expr()? {
                Expr::Ident(ident) => Some(ident.sym.as_str()),
                _ => None,
            },
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self.expr()? {
            Expr::Lit(Lit::Str(s)) => str_value(s),
            _ => None,
        }
    }

    /// The literal value, if this is one.
    pub fn as_lit(&self) -> Option<&'a Lit> {
        match self.expr()? {
            Expr::Lit(lit) => Some(lit),
            _ => None,
        }
    }
}

pub fn str_value(s: &Str) -> Option<&str> {
    s.value.as_str()
}

/// The static name of a property key, if it has one.
pub fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => str_value(s).map(str::to_string),
        PropName::Num(n) => Some(n.value.to_string()),
        PropName::Computed(computed) => match unwrap_parens(&computed.expr) {
            Expr::Lit(Lit::Str(s)) => str_value(s).map(str::to_string),
            _ => None,
        },
        PropName::BigInt(_) => None,
    }
}

/// Properties of `object` keyed by their static name, in source order.
///
/// Spreads and computed keys are skipped; a repeated key keeps its last value.
pub fn get_properties(object: &ObjectLit) -> IndexMap<String, OptionValue<'_>> {
    object
        .props
        .iter()
        .filter_map(|prop| match prop {
            PropOrSpread::Prop(prop) => Some(&**prop),
            PropOrSpread::Spread(_) => None,
        })
        .filter_map(|prop| match prop {
            Prop::KeyValue(kv) => Some((prop_name(&kv.key)?, OptionValue::Expr(&kv.value))),
            Prop::Method(method) => Some((prop_name(&method.key)?, OptionValue::Method(method))),
            Prop::Getter(getter) => Some((prop_name(&getter.key)?, OptionValue::Getter(getter))),
            Prop::Shorthand(ident) => Some((ident.sym.to_string(), OptionValue::Shorthand(ident))),
            Prop::Assign(_) | Prop::Setter(_) => None,
        })
        .collect()
}

/// String elements of an array literal such as `['a', 'b']`.
pub fn string_elements(array: &ArrayLit) -> Vec<String> {
    array
        .elems
        .iter()
        .flatten()
        .filter(|elem| elem.spread.is_none())
        .filter_map(|elem| match unwrap_parens(&elem.expr) {
            Expr::Lit(Lit::Str(s)) => str_value(s).map(str::to_string),
            _ => None,
        })
        .collect()
}

/// Anything that can be called: methods, function expressions, arrows and getters.
#[derive(Clone, Copy)]
pub enum FunctionLike<'a> {
    Function(&'a Function),
    Arrow(&'a ArrowExpr),
    Getter(&'a GetterProp),
}

pub enum FunctionBody<'a> {
    Block(&'a BlockStmt),
    Expr(&'a Expr),
}

impl<'a> FunctionLike<'a> {
    pub fn params(&self) -> Vec<ParamSpan> {
        match self {
            FunctionLike::Function(func) => func
                .params
                .iter()
                .map(|param| {
                    let pat = pat_span(&param.pat);
                    ParamSpan {
                        span: param.span.with_hi(param.span.hi.max(pat.hi)),
                        typed: has_type_annotation(&param.pat),
                    }
                })
                .collect(),
            FunctionLike::Arrow(arrow) => arrow
                .params
                .iter()
                .map(|pat| ParamSpan {
                    span: pat_span(pat),
                    typed: has_type_annotation(pat),
                })
                .collect(),
            FunctionLike::Getter(_) => Vec::new(),
        }
    }

    /// The name of the first parameter when it is a plain identifier.
    pub fn first_param_name(&self) -> Option<&'a str> {
        let pat = match self {
            FunctionLike::Function(func) => &func.params.first()?.pat,
            FunctionLike::Arrow(arrow) => arrow.params.first()?,
            FunctionLike::Getter(_) => return None,
        };
        match pat {
            Pat::Ident(binding) => Some(binding.id.sym.as_str()),
            _ => None,
        }
    }

    pub fn has_params(&self) -> bool {
        match self {
            FunctionLike::Function(func) => !func.params.is_empty(),
            FunctionLike::Arrow(arrow) => !arrow.params.is_empty(),
            FunctionLike::Getter(_) => false,
        }
    }

    pub fn body(&self) -> Option<FunctionBody<'a>> {
        match self {
            FunctionLike::Function(func) => func.body.as_ref().map(FunctionBody::Block),
            FunctionLike::Arrow(arrow) => Some(match &*arrow.body {
                BlockStmtOrExpr::BlockStmt(block) => FunctionBody::Block(block),
                BlockStmtOrExpr::Expr(expr) => FunctionBody::Expr(expr),
            }),
            FunctionLike::Getter(getter) => getter.body.as_ref().map(FunctionBody::Block),
        }
    }

    /// The span of the return type annotation, without the colon.
    pub fn return_type(&self) -> Option<swc_common::Span> {
        let ann = match self {
            FunctionLike::Function(func) => func.return_type.as_ref(),
            FunctionLike::Arrow(arrow) => arrow.return_type.as_ref(),
            FunctionLike::Getter(getter) => getter.type_ann.as_ref(),
        }?;
        Some(ann.type_ann.span())
    }

    pub fn is_async(&self) -> bool {
        match self {
            FunctionLike::Function(func) => func.is_async,
            FunctionLike::Arrow(arrow) => arrow.is_async,
            FunctionLike::Getter(_) => false,
        }
    }

    pub fn is_generator(&self) -> bool {
        match self {
            FunctionLike::Function(func) => func.is_generator,
            FunctionLike::Arrow(arrow) => arrow.is_generator,
            FunctionLike::Getter(_) => false,
        }
    }
}

/// The location of one parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpan {
    pub span: swc_common::Span,
    /// Whether the parameter has its own type annotation.
    pub typed: bool,
}

fn type_annotation(pat: &Pat) -> Option<&swc_ecma_ast::TsTypeAnn> {
    match pat {
        Pat::Ident(binding) => binding.type_ann.as_deref(),
        Pat::Array(array) => array.type_ann.as_deref(),
        Pat::Object(object) => object.type_ann.as_deref(),
        Pat::Rest(rest) => rest.type_ann.as_deref(),
        Pat::Assign(assign) => type_annotation(&assign.left),
        _ => None,
    }
}

fn has_type_annotation(pat: &Pat) -> bool {
    type_annotation(pat).is_some()
}

/// The span of a pattern including its type annotation.
pub fn pat_span(pat: &Pat) -> swc_common::Span {
    let span = pat.span();
    match type_annotation(pat) {
        Some(ann) if ann.span.hi > span.hi => span.with_hi(ann.span.hi),
        _ => span,
    }
}

/// A block split at its first top-level `return`.
pub struct SplitBody<'a> {
    /// The statements before the return.
    pub before: &'a [Stmt],
    /// The returned expression, without parentheses.
    pub returned: Option<&'a Expr>,
}

/// Splits `block` at its first top-level return statement, or returns `None`
/// when there is none.
pub fn split_function_body(block: &BlockStmt) -> Option<SplitBody<'_>> {
    block.stmts.iter().enumerate().find_map(|(i, stmt)| match stmt {
        Stmt::Return(ret) => Some(SplitBody {
            before: &block.stmts[..i],
            returned: ret.arg.as_deref().map(unwrap_parens),
        }),
        _ => None,
    })
}

/// The span from the first to the last statement.
pub fn stmts_span(stmts: &[Stmt]) -> Option<swc_common::Span> {
    let first = stmts.first()?.span();
    let last = stmts.last()?.span();
    Some(first.with_hi(last.hi))
}
