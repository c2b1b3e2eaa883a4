//! Built-in plugins, one per family of component options.

use std::sync::Arc;

use crate::plugin::Plugin;

mod components;
mod computed;
mod data;
mod emits;
mod expose;
mod inject;
mod instance;
mod lifecycles;
mod methods;
mod pinia;
mod props;
mod provide;
mod router;
mod setup;
mod watch;

pub use components::{Components, Directives};
pub use computed::Computed;
pub use data::Data;
pub use emits::Emits;
pub use expose::Expose;
pub use inject::Inject;
pub use instance::Instance;
pub use lifecycles::Lifecycles;
pub use methods::Methods;
pub use pinia::Pinia;
pub use props::Props;
pub use provide::Provide;
pub use router::Router;
pub use setup::Setup;
pub use watch::Watch;

/// The built-in plugins in run order, without [`Instance`], which
/// [`crate::PluginSet`] always appends last.
pub fn builtin() -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(Props),
        Arc::new(Emits),
        Arc::new(Inject),
        Arc::new(Components),
        Arc::new(Directives),
        Arc::new(Setup),
        Arc::new(Data),
        Arc::new(Computed),
        Arc::new(Pinia),
        Arc::new(Methods),
        Arc::new(Watch),
        Arc::new(Lifecycles),
        Arc::new(Router),
        Arc::new(Provide),
        Arc::new(Expose),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    //! Runs a single plugin over the options of a script.

    use swc_ecma_ast::{Expr, MemberProp, ModuleItem, Stmt};

    use crate::aggregate::CodeManager;
    use crate::ast::{find_component_options, get_properties};
    use crate::error::TransformError;
    use crate::fragment::{Fragment, Provenance};
    use crate::options::TransformOptions;
    use crate::plugin::{
        AccessParent, Disposition, Plugin, PluginId, TransformContext, TransformHelpers,
        VisitContext, VisitHelpers,
    };
    use crate::script::{Script, ScriptLang};

    pub struct Output {
        pub fragments: Vec<Fragment>,
        pub disposition: Option<Disposition>,
    }

    impl Output {
        /// Local code as the aggregator would print it.
        pub fn code(&self) -> String {
            let mut manager = CodeManager::new();
            for fragment in &self.fragments {
                if let Fragment::Code { .. } = fragment {
                    manager.collect(PluginId(0), fragment.clone());
                }
            }
            manager.generate_local_code()
        }

        pub fn hoisted(&self) -> Vec<&str> {
            self.fragments
                .iter()
                .filter_map(|f| match f {
                    Fragment::Hoist { content, .. } => Some(content.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn properties(&self) -> Vec<(&str, &str, bool)> {
            self.fragments
                .iter()
                .filter_map(|f| match f {
                    Fragment::Property {
                        name,
                        source,
                        exposed,
                    } => Some((name.as_str(), source.as_str(), *exposed)),
                    _ => None,
                })
                .collect()
        }
    }

    pub fn try_run(
        plugin: &dyn Plugin,
        source: &str,
        option: &str,
        options: &TransformOptions,
    ) -> Result<Output, TransformError> {
        let lang = if options.typescript {
            ScriptLang::TypeScript
        } else {
            ScriptLang::JavaScript
        };
        let script = Script::parse(source, lang)?;
        let component = find_component_options(&script)?.expect("component options");
        let properties = get_properties(component.object);
        let node = *properties.get(option).expect("option present");
        let ctx = TransformContext {
            name: option,
            node,
            options,
        };
        assert!(plugin.transform_include(&ctx), "{} should claim {option}", plugin.name());
        let helpers = TransformHelpers::new(&script, plugin, ctx);
        let output = plugin.transform(&ctx, &helpers)?;
        Ok(Output {
            fragments: output.fragments,
            disposition: output.disposition,
        })
    }

    pub fn run(plugin: &dyn Plugin, source: &str, option: &str, options: &TransformOptions) -> Output {
        try_run(plugin, source, option, options).unwrap()
    }

    /// Visits `this.<name>` given as the single expression statement of `code`.
    pub fn visit(
        plugin: &dyn Plugin,
        code: &str,
        parent: AccessParent,
        source: Option<&str>,
        options: &TransformOptions,
    ) -> Vec<Fragment> {
        let script = Script::parse(code, ScriptLang::JavaScript).unwrap();
        let ModuleItem::Stmt(Stmt::Expr(statement)) = &script.module().body[0] else {
            panic!("expected an expression statement");
        };
        let Expr::Member(member) = &*statement.expr else {
            panic!("expected a member expression");
        };
        let name = match &member.prop {
            MemberProp::Ident(ident) => Some(ident.sym.as_str()),
            _ => None,
        };
        let ctx = VisitContext {
            name,
            node: member,
            parent,
            source: source.map(Provenance::new),
            options,
        };
        plugin.visit_property(&ctx, &VisitHelpers { script: &script })
    }

    /// The replacement among `fragments`.
    pub fn replacement(fragments: &[Fragment]) -> Option<&str> {
        fragments.iter().find_map(|f| match f {
            Fragment::Replacement { content } => Some(content.as_str()),
            _ => None,
        })
    }

    pub fn hoisted(fragments: &[Fragment]) -> Vec<&str> {
        fragments
            .iter()
            .filter_map(|f| match f {
                Fragment::Hoist { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }
}
