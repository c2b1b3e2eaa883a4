//! Vue Options API to Composition API transformation.
//!
//! This crate rewrites the default export of a Vue component into
//! Composition API code. It handles:
//! - Turning each component option into `<script setup>` statements, or into
//!   the body of a `setup()` method
//! - Rewriting `this.<name>` accesses to the bindings that replace them
//! - Merging generated imports with the imports already in the script
//! - Extending the built-in rules with user [`Plugin`]s
//!
//! # Example
//!
//! ```
//! use spinach_transformer::{transform_sfc, TransformOptions};
//!
//! let source = r#"<script>
//! export default {
//!   data() {
//!     return { count: 0 }
//!   },
//! }
//! </script>
//! "#;
//!
//! let output = transform_sfc(source, &TransformOptions::default()).unwrap();
//! assert_eq!(
//!     output,
//!     "<script setup>\nimport { ref } from 'vue'\n\nconst count = ref(0)\n</script>\n"
//! );
//! ```

mod aggregate;
mod ast;
mod error;
mod fragment;
mod options;
mod orchestrator;
mod plugin;
pub mod plugins;
mod resolve;
mod script;
mod text;
mod transform;

pub use ast::OptionValue;
pub use error::TransformError;
pub use fragment::{Fragment, Priority, Provenance};
pub use options::{PluginOrder, TransformOptions, UserPlugin};
pub use plugin::{
    AccessParent, Disposition, Plugin, PluginSet, TransformContext, TransformHelpers,
    TransformOutput, VisitContext, VisitHelpers,
};
pub use script::{Script, ScriptLang};
pub use source_map::Span;
pub use transform::{transform_script, transform_sfc};
