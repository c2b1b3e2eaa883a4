//! Entry points: whole component files and bare scripts.
//!
//! A transformation runs in two passes over the script text:
//!
//! 1. The plugins turn the options of the default export into fragments.
//!    These are rendered into the target script, either as `<script setup>`
//!    code or as the body of a generated `setup()` method.
//! 2. The result is parsed again and every `this.<name>` access in it is
//!    resolved against the properties registered in the first pass.
//!
//! Both passes only record edits against the text they read, so everything
//! the plugins did not touch is copied through byte for byte.

use sfc_parser::{AttrValue, SfcBlock};
use smol_str::SmolStr;
use source_map::{EditBuffer, Materialized};
use swc_common::Spanned;

use crate::aggregate::{insert_hoisted_code, insert_local_code, CodeManager};
use crate::ast::{
    find_component_options, find_define_options, get_properties, ComponentOptions, FunctionBody,
};
use crate::error::TransformError;
use crate::fragment::PropertyRegistry;
use crate::options::TransformOptions;
use crate::orchestrator::{preserved_option_spans, transform_options, OptionsPass};
use crate::plugin::PluginSet;
use crate::resolve::resolve_members;
use crate::script::{Script, ScriptLang};
use crate::text::{dedent, indent, multiline_object};

/// Parameters of the generated `setup()` method.
const SETUP_SIGNATURE: &str = "setup(props, { attrs, slots, emit, expose })";

/// Transforms the Options API component in a `.vue` file.
///
/// Returns `source` unchanged when the file has no `<script>` block, the
/// script has no default export, or no option of the component is handled by
/// a plugin. Error spans point into `source`.
pub fn transform_sfc(source: &str, options: &TransformOptions) -> Result<String, TransformError> {
    let parsed = sfc_parser::parse(source);
    if let Some(error) = parsed.errors.into_iter().next() {
        return Err(error.into());
    }
    let mut descriptor = parsed.descriptor;
    let Some(script_block) = descriptor.script.take() else {
        return Ok(source.to_string());
    };

    let script_offset = u32::from(script_block.content_span.start);
    let script = Script::parse(
        script_block.content.as_str(),
        ScriptLang::from_lang(script_block.lang()),
    )
    .map_err(|error| error.offset_by(script_offset))?;
    let Some(component) =
        find_component_options(&script).map_err(|error| error.offset_by(script_offset))?
    else {
        tracing::debug!("script has no default export");
        return Ok(source.to_string());
    };

    if !options.script_setup {
        if let Some(setup_block) = &descriptor.script_setup {
            return Err(TransformError::ScriptSetupExists {
                span: setup_block.span,
            });
        }
    }

    let options = TransformOptions {
        typescript: script_block.is_typescript()
            || descriptor
                .script_setup
                .as_ref()
                .is_some_and(SfcBlock::is_typescript),
        ..options.clone()
    };

    let setup_script = match descriptor.script_setup.as_ref() {
        Some(block) if options.script_setup => {
            let offset = u32::from(block.content_span.start);
            let script = Script::parse(block.content.as_str(), ScriptLang::from_lang(block.lang()))
                .map_err(|error| error.offset_by(offset))?;
            Some((script, offset))
        }
        _ => None,
    };

    let target_offset = setup_script
        .as_ref()
        .map_or(script_offset, |(_, offset)| *offset);
    let rewritten = rewrite(
        &script,
        component,
        setup_script.as_ref().map(|(script, _)| script),
        &options,
    )
    .map_err(|error| match error {
        TransformError::Reparse { .. } => error.offset_by(target_offset),
        error => error.offset_by(script_offset),
    })?;
    let Some(rewritten) = rewritten else {
        return Ok(source.to_string());
    };

    if !options.script_setup {
        descriptor.script = Some(SfcBlock {
            content: block_content(&rewritten.code),
            ..script_block
        });
    } else if let Some(mut setup_block) = descriptor.script_setup.take() {
        setup_block.content = block_content(&rewritten.code);
        descriptor.script_setup = Some(setup_block);
        descriptor.script = rewritten.leftover.map(|leftover| SfcBlock {
            content: block_content(&leftover),
            ..script_block
        });
    } else {
        let mut setup_block = SfcBlock {
            content: block_content(&rewritten.code),
            ..script_block
        };
        setup_block
            .attrs
            .shift_insert(0, SmolStr::new_static("setup"), AttrValue::Flag);
        descriptor.script_setup = Some(setup_block);
    }

    Ok(sfc_parser::generate(&descriptor))
}

/// Transforms a script on its own, as if it were the only `<script>` of a
/// component. `<script setup>` output is the bare setup code.
///
/// Returns `source` unchanged when nothing was transformed. Error spans point
/// into `source`.
pub fn transform_script(
    source: &str,
    lang: ScriptLang,
    options: &TransformOptions,
) -> Result<String, TransformError> {
    let options = TransformOptions {
        typescript: lang.is_typescript(),
        ..options.clone()
    };
    let script = Script::parse(source, lang)?;
    let Some(component) = find_component_options(&script)? else {
        return Ok(source.to_string());
    };
    match rewrite(&script, component, None, &options)? {
        Some(rewritten) => Ok(format!("{}\n", rewritten.code.trim())),
        None => Ok(source.to_string()),
    }
}

fn block_content(code: &str) -> String {
    format!("\n{}\n", code.trim())
}

/// The rewritten scripts of a component.
struct Rewritten {
    /// The script that now holds the component code.
    code: String,
    /// What is left of the options `<script>` once the component moved into
    /// an existing `<script setup>`, or `None` if nothing is left.
    leftover: Option<String>,
}

/// Where the component code ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    ScriptSetup,
    SetupFunction,
}

fn rewrite(
    script: &Script,
    component: ComponentOptions<'_>,
    setup_script: Option<&Script>,
    options: &TransformOptions,
) -> Result<Option<Rewritten>, TransformError> {
    let plugins = PluginSet::resolve(options);
    tracing::debug!(plugins = ?plugins.names(), "resolved plugins");

    let pass = transform_options(script, component.object, &plugins, options)?;
    if pass.matched == 0 {
        tracing::debug!("no option was handled by a plugin");
        return Ok(None);
    }
    tracing::debug!(
        matched = pass.matched,
        preserved = pass.preserved.len(),
        properties = pass.registry.len(),
        "transformed options"
    );

    let OptionsPass {
        manager,
        registry,
        preserved,
        ..
    } = pass;
    let preserved: Vec<String> = preserved.iter().map(|option| dedent(option)).collect();

    let (target, materialized, leftover) = if options.script_setup {
        let target = setup_script.unwrap_or(script);
        let materialized = render_script_setup(script, component, setup_script, &manager, &preserved, options)?;
        let leftover = match setup_script {
            Some(_) => remove_default_export(script, component)?,
            None => None,
        };
        (target, materialized, leftover)
    } else {
        let materialized = render_setup_function(script, component, &manager, &registry, &preserved, options)?;
        (script, materialized, None)
    };

    let mode = if options.script_setup {
        Mode::ScriptSetup
    } else {
        Mode::SetupFunction
    };
    let code = resolve(materialized, target.lang(), &registry, &plugins, options, mode)?;
    Ok(Some(Rewritten { code, leftover }))
}

/// First pass output for `<script setup>`: hoisted code after the imports,
/// local code in place of the default export or after the imports of an
/// existing `<script setup>`.
fn render_script_setup(
    script: &Script,
    component: ComponentOptions<'_>,
    setup_script: Option<&Script>,
    manager: &CodeManager,
    preserved: &[String],
    options: &TransformOptions,
) -> Result<Materialized, TransformError> {
    let target = setup_script.unwrap_or(script);
    let mut edits = EditBuffer::new(target.source());
    let hoisted = manager.generate_hoisted_code(target, &mut edits, options);
    insert_hoisted_code(target, &mut edits, &hoisted.render(target.has_imports()));

    let mut local = manager.generate_local_code();
    if !preserved.is_empty() {
        match setup_script.and_then(|setup| find_define_options(setup.module())) {
            Some(define) => {
                let object = define.object;
                match object.props.last() {
                    Some(last) => {
                        let text: String = preserved
                            .iter()
                            .map(|option| format!(",\n  {}", indent(option, 2)))
                            .collect();
                        edits.insert(target.offset(last.span().hi), text);
                    }
                    None => {
                        let text: String = preserved
                            .iter()
                            .map(|option| format!("\n  {},", indent(option, 2)))
                            .collect();
                        edits.insert(target.offset(object.span.lo) + 1, format!("{text}\n"));
                    }
                }
            }
            None => {
                let define = format!("defineOptions({})", multiline_object(preserved));
                local = join_sections([define, local]);
            }
        }
    }

    match setup_script {
        Some(setup) => insert_local_code(setup, &mut edits, &local),
        None => edits.overwrite(script.span(component.export.span), local),
    }
    Ok(edits.apply()?)
}

/// First pass output for a `setup()` method: the options object is rebuilt
/// from the preserved options and a `setup()` holding the generated code.
fn render_setup_function(
    script: &Script,
    component: ComponentOptions<'_>,
    manager: &CodeManager,
    registry: &PropertyRegistry,
    preserved: &[String],
    options: &TransformOptions,
) -> Result<Materialized, TransformError> {
    let mut edits = EditBuffer::new(script.source());
    let hoisted = manager.generate_hoisted_code(script, &mut edits, options);
    insert_hoisted_code(script, &mut edits, &hoisted.imports.join("\n"));

    let returned = format!("return {}", multiline_object(registry.exposed()));
    let body = join_sections([
        hoisted.declarations.join("\n"),
        manager.generate_local_code(),
        returned,
    ]);
    let setup = format!("{SETUP_SIGNATURE} {{\n  {}\n}}", indent(&body, 2));
    let items = preserved.iter().map(String::as_str).chain([setup.as_str()]);
    edits.overwrite(script.span(component.object.span), multiline_object(items));
    Ok(edits.apply()?)
}

/// The options script without its default export, or `None` if only
/// whitespace would remain.
fn remove_default_export(
    script: &Script,
    component: ComponentOptions<'_>,
) -> Result<Option<String>, TransformError> {
    let mut edits = EditBuffer::new(script.source());
    edits.remove(script.span(component.export.span));
    let text = edits.apply()?.text;
    Ok((!text.trim().is_empty()).then_some(text))
}

/// Second pass: re-parses the first pass output and resolves member accesses.
fn resolve(
    materialized: Materialized,
    lang: ScriptLang,
    registry: &PropertyRegistry,
    plugins: &PluginSet,
    options: &TransformOptions,
    mode: Mode,
) -> Result<String, TransformError> {
    let Materialized { text, source_map } = materialized;
    let script = Script::parse(text, lang).map_err(|error| match error {
        TransformError::ScriptParse { message, span } => {
            tracing::debug!(%message, ?span, "generated code does not parse");
            TransformError::Reparse {
                message,
                span: source_map.original_span(span),
            }
        }
        error => error,
    })?;

    let setup_function = match mode {
        Mode::SetupFunction => find_component_options(&script)?,
        Mode::ScriptSetup => None,
    };
    let excluded = match (mode, setup_function) {
        (Mode::SetupFunction, Some(component)) => preserved_option_spans(component.object),
        (Mode::SetupFunction, None) => Vec::new(),
        (Mode::ScriptSetup, _) => find_define_options(script.module())
            .map(|define| vec![define.object.span])
            .unwrap_or_default(),
    };

    let mut edits = EditBuffer::new(script.source());
    let manager = resolve_members(&script, &mut edits, registry, plugins, options, &excluded);
    let hoisted = manager.generate_hoisted_code(&script, &mut edits, options);
    let local = manager.generate_local_code();

    match mode {
        Mode::ScriptSetup => {
            insert_hoisted_code(&script, &mut edits, &hoisted.render(script.has_imports()));
            insert_local_code(&script, &mut edits, &local);
        }
        Mode::SetupFunction => {
            insert_hoisted_code(&script, &mut edits, &hoisted.imports.join("\n"));
            let code = join_sections([hoisted.declarations.join("\n"), local]);
            let body_start = setup_function.and_then(|component| setup_body_start(&script, component));
            if let Some(offset) = body_start.filter(|_| !code.is_empty()) {
                edits.insert(offset, format!("\n    {}\n", indent(&code, 4)));
            }
        }
    }

    Ok(edits.apply()?.text)
}

/// The offset just after the `{` that opens the generated `setup()` body.
fn setup_body_start(script: &Script, component: ComponentOptions<'_>) -> Option<u32> {
    let setup = get_properties(component.object).get("setup")?.as_function()?;
    match setup.body()? {
        FunctionBody::Block(block) => Some(script.offset(block.span.lo) + 1),
        FunctionBody::Expr(_) => None,
    }
}

/// Joins the non-empty sections with a blank line.
fn join_sections<const N: usize>(sections: [String; N]) -> String {
    sections
        .into_iter()
        .filter(|section| !section.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn setup_function() -> TransformOptions {
        TransformOptions {
            script_setup: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_nothing_to_transform() {
        let source = "export default {\n  name: 'Plain',\n}\n";
        let output = transform_script(source, ScriptLang::JavaScript, &TransformOptions::default())
            .unwrap();
        assert_eq!(output, source);
    }

    #[test]
    fn test_script_setup() {
        let output = transform_script(
            "import { helper } from './helper'\n\nexport default {\n  name: 'Counter',\n  data() {\n    return { count: 0 }\n  },\n  methods: {\n    increment() {\n      this.count++\n      helper(this.count)\n    },\n  },\n}\n",
            ScriptLang::JavaScript,
            &TransformOptions::default(),
        )
        .unwrap();
        insta::assert_snapshot!(output, @r###"
        import { helper } from './helper'
        import { ref } from 'vue'

        defineOptions({
          name: 'Counter',
        })

        const count = ref(0)

        function increment() {
          count.value++
          helper(count.value)
        }
        "###);
    }

    #[test]
    fn test_setup_function() {
        let output = transform_script(
            "export default defineComponent({\n  props: ['label'],\n  data() {\n    return { count: 0 }\n  },\n  mounted() {\n    console.log(this.label, this.count)\n  },\n})\n",
            ScriptLang::JavaScript,
            &setup_function(),
        )
        .unwrap();
        insta::assert_snapshot!(output, @r###"
        import { ref, onMounted } from 'vue'

        export default defineComponent({
          props: ['label'],
          setup(props, { attrs, slots, emit, expose }) {
            const count = ref(0)

            onMounted(() => {
              console.log(props.label, count.value)
            })

            return {
              count,
            }
          },
        })
        "###);
    }

    #[test]
    fn test_setup_function_hoists_into_body() {
        let output = transform_script(
            "export default {\n  methods: {\n    go() {\n      this.$router.push('/')\n    },\n  },\n}\n",
            ScriptLang::JavaScript,
            &setup_function(),
        )
        .unwrap();
        insta::assert_snapshot!(output, @r###"
        import { useRouter } from 'vue-router'

        export default {
          setup(props, { attrs, slots, emit, expose }) {
            const router = useRouter()

            function go() {
              router.push('/')
            }

            return {
              go,
            }
          },
        }
        "###);
    }

    #[test]
    fn test_errors_point_into_the_script() {
        let error = transform_script(
            "const a = 1\nexport default {\n  data() {\n    return 1\n  },\n}\n",
            ScriptLang::JavaScript,
            &TransformOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(error, TransformError::ReturnNotObject { .. }));
        // inside the default export, past `const a = 1`
        assert!(error.span().is_some_and(|span| u32::from(span.start) >= 29));
    }

    #[test]
    fn test_join_sections() {
        assert_eq!(
            join_sections(["a".to_string(), String::new(), "b".to_string()]),
            "a\n\nb"
        );
        assert_eq!(join_sections([String::new()]), "");
    }
}
