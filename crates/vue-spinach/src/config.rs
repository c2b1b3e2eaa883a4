//! Configuration loading.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use spinach_transformer::TransformOptions;
use std::fs;
use std::sync::Arc;
use swc_common::SourceMap;
use swc_ecma_ast::{
    Callee, ExportDefaultExpr, Expr, KeyValueProp, Lit, ModuleDecl, ModuleItem, ObjectLit, Prop,
    PropName, PropOrSpread,
};
use swc_ecma_parser::{parse_file_as_module, EsSyntax, Syntax, TsSyntax};
use thiserror::Error;

use crate::cli::Args;

/// Config file names searched for in the working directory, in order.
const CONFIG_FILES: [&str; 4] = [
    "spinach.config.json",
    "spinach.config.js",
    "spinach.config.mjs",
    "spinach.config.ts",
];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    /// The config file could not be understood.
    #[error("invalid config {path}: {message}")]
    Invalid { path: Utf8PathBuf, message: String },
}

/// Project configuration. Unset values fall back to the transformer defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpinachConfig {
    pub script_setup: Option<bool>,
    pub reactivity_transform: Option<bool>,
    pub props_destructure: Option<bool>,
    /// Module aliases for generated imports (e.g. `vue` -> `@vue/composition-api`).
    pub aliases: IndexMap<String, String>,
}

impl SpinachConfig {
    /// Loads `path`, or the first config file found in `cwd` when no path is given.
    pub fn load(path: Option<&Utf8Path>, cwd: &Utf8Path) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::parse_config(path);
        }

        for config_file in CONFIG_FILES {
            let config_path = cwd.join(config_file);
            if config_path.exists() {
                tracing::debug!("loading config from {config_path}");
                return Self::parse_config(&config_path);
            }
        }

        Ok(Self::default())
    }

    fn parse_config(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let invalid = |message: String| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        };

        let value = if path.extension() == Some("json") {
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?
        } else {
            Self::parse_module(path, content).map_err(invalid)?
        };

        serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
    }

    /// Reads the default export of a JS/TS config module as JSON.
    ///
    /// Accepts `export default { ... }` and `export default defineConfig({ ... })`.
    /// Values other than literals, arrays and objects are dropped.
    fn parse_module(path: &Utf8Path, content: String) -> Result<Value, String> {
        let cm: Arc<SourceMap> = Default::default();
        let fm = cm.new_source_file(
            swc_common::FileName::Custom(path.to_string()).into(),
            content,
        );

        let syntax = if path.extension() == Some("ts") {
            Syntax::Typescript(TsSyntax::default())
        } else {
            Syntax::Es(EsSyntax::default())
        };

        let module = parse_file_as_module(
            &fm,
            syntax,
            swc_ecma_ast::EsVersion::Es2022,
            None,
            &mut Vec::new(),
        )
        .map_err(|e| format!("parse error: {:?}", e.kind()))?;

        for item in &module.body {
            if let ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(ExportDefaultExpr {
                expr,
                ..
            })) = item
            {
                return match config_object(expr) {
                    Some(object) => Ok(object_to_json(object)),
                    None => Err("the default export must be an object literal".to_string()),
                };
            }
        }

        Ok(Value::Object(Map::new()))
    }

    /// Builds transformer options from this config, with command-line flags taking precedence.
    pub fn transform_options(&self, args: &Args) -> TransformOptions {
        let defaults = TransformOptions::default();
        let mut aliases = self.aliases.clone();
        aliases.extend(args.aliases.iter().cloned());

        TransformOptions {
            script_setup: !args.no_script_setup
                && self.script_setup.unwrap_or(defaults.script_setup),
            reactivity_transform: args.reactivity_transform
                || self
                    .reactivity_transform
                    .unwrap_or(defaults.reactivity_transform),
            props_destructure: !args.no_props_destructure
                && self.props_destructure.unwrap_or(defaults.props_destructure),
            aliases,
            ..defaults
        }
    }
}

fn config_object(expr: &Expr) -> Option<&ObjectLit> {
    match expr {
        Expr::Object(object) => Some(object),
        Expr::Paren(paren) => config_object(&paren.expr),
        Expr::TsAs(ts_as) => config_object(&ts_as.expr),
        Expr::TsSatisfies(satisfies) => config_object(&satisfies.expr),
        Expr::Call(call) if matches!(call.callee, Callee::Expr(_)) && call.args.len() == 1 => {
            config_object(&call.args[0].expr)
        }
        _ => None,
    }
}

fn prop_name_str(key: &PropName) -> Option<&str> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.as_str()),
        PropName::Str(s) => s.value.as_str(),
        _ => None,
    }
}

fn object_to_json(object: &ObjectLit) -> Value {
    let mut map = Map::new();
    for prop in &object.props {
        if let PropOrSpread::Prop(prop) = prop {
            if let Prop::KeyValue(KeyValueProp { key, value }) = prop.as_ref() {
                let (Some(key), Some(value)) = (prop_name_str(key), expr_to_json(value)) else {
                    continue;
                };
                map.insert(key.to_string(), value);
            }
        }
    }
    Value::Object(map)
}

fn expr_to_json(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|s| Value::String(s.to_string())),
        Expr::Lit(Lit::Bool(b)) => Some(Value::Bool(b.value)),
        Expr::Lit(Lit::Num(n)) => Number::from_f64(n.value).map(Value::Number),
        Expr::Lit(Lit::Null(_)) => Some(Value::Null),
        Expr::Array(array) => Some(Value::Array(
            array
                .elems
                .iter()
                .flatten()
                .filter(|elem| elem.spread.is_none())
                .filter_map(|elem| expr_to_json(&elem.expr))
                .collect(),
        )),
        Expr::Object(object) => Some(object_to_json(object)),
        Expr::Paren(paren) => expr_to_json(&paren.expr),
        _ => None,
    }
}
