//! Collects plugin code and hoisted snippets and merges them into the output.

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use source_map::EditBuffer;
use swc_common::Spanned;
use swc_ecma_ast::{
    Decl, ImportDecl, ImportSpecifier, ModuleDecl, ModuleExportName, ModuleItem, ObjectPatProp,
    Pat, Stmt, VarDecl, VarDeclKind,
};

use crate::ast::str_value;
use crate::fragment::{Fragment, Priority};
use crate::options::TransformOptions;
use crate::plugin::PluginId;
use crate::script::{Script, ScriptLang};
use crate::text::{multiline_object, quote};

/// Buckets plugin output until it is rendered.
#[derive(Debug, Default)]
pub struct CodeManager {
    local: BTreeMap<Priority, BTreeMap<PluginId, Vec<String>>>,
    imports: Vec<HoistedImport>,
    declarations: Vec<HoistedDeclaration>,
}

#[derive(Debug, Clone, Default)]
struct HoistedImport {
    source: String,
    /// `(imported, local)` pairs.
    named: Vec<(String, String)>,
    default: Option<String>,
    namespace: Option<String>,
}

#[derive(Debug, Clone)]
struct HoistedDeclaration {
    kind: VarDeclKind,
    init: String,
    binding: Binding,
}

#[derive(Debug, Clone)]
enum Binding {
    Ident(String),
    /// Destructured properties, as written.
    Properties(Vec<String>),
}

impl CodeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes code and hoist fragments, and hands every other fragment back.
    pub fn collect(&mut self, plugin: PluginId, fragment: Fragment) -> Option<Fragment> {
        match fragment {
            Fragment::Code { content, priority } => {
                self.add_local(plugin, content, priority);
                None
            }
            Fragment::Hoist { content, priority } => {
                self.add_hoisted(plugin, &content, priority);
                None
            }
            other => Some(other),
        }
    }

    pub fn add_local(&mut self, plugin: PluginId, content: String, priority: Priority) {
        self.local
            .entry(priority)
            .or_default()
            .entry(plugin)
            .or_default()
            .push(content);
    }

    /// Records a hoisted snippet. A single import or a single variable
    /// declaration is merged with its siblings; anything else is kept as
    /// code of the lowest band.
    pub fn add_hoisted(&mut self, plugin: PluginId, content: &str, priority: Priority) {
        let script = match Script::parse(content, ScriptLang::TypeScript) {
            Ok(script) => script,
            Err(error) => {
                tracing::warn!(%error, content, "hoisted snippet does not parse, keeping it as code");
                self.add_local(plugin, content.to_string(), priority);
                return;
            }
        };

        let merged = match script.module().body.as_slice() {
            [ModuleItem::ModuleDecl(ModuleDecl::Import(decl))] if !decl.type_only => {
                self.imports.push(read_import(decl));
                true
            }
            [ModuleItem::Stmt(Stmt::Decl(Decl::Var(decl)))] => match read_declaration(&script, decl) {
                Some(declarations) => {
                    self.declarations.extend(declarations);
                    true
                }
                None => false,
            },
            _ => false,
        };

        if !merged {
            self.add_local(plugin, content.to_string(), priority);
        }
    }

    /// Plugin code, one section per plugin, ordered by band and then by plugin.
    pub fn generate_local_code(&self) -> String {
        self.local
            .values()
            .flat_map(|plugins| plugins.values())
            .map(|lines| lines.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Merges hoisted imports and declarations against what `target` already has.
    ///
    /// Missing named imports from a module that `target` already imports from
    /// are added to that import through `edits`; everything else is returned.
    pub fn generate_hoisted_code(
        &self,
        target: &Script,
        edits: &mut EditBuffer<'_>,
        options: &TransformOptions,
    ) -> HoistedCode {
        let mut code = HoistedCode::default();
        self.generate_imports(target, edits, options, &mut code);
        self.generate_declarations(target, &mut code);
        code
    }

    fn generate_imports(
        &self,
        target: &Script,
        edits: &mut EditBuffer<'_>,
        options: &TransformOptions,
        code: &mut HoistedCode,
    ) {
        let mut groups: IndexMap<String, HoistedImport> = IndexMap::new();
        for import in &self.imports {
            let source = options.alias(&import.source).to_string();
            let group = groups.entry(source.clone()).or_insert_with(|| HoistedImport {
                source,
                ..Default::default()
            });
            for pair in &import.named {
                if !group.named.contains(pair) {
                    group.named.push(pair.clone());
                }
            }
            if group.default.is_none() {
                group.default = import.default.clone();
            }
            if group.namespace.is_none() {
                group.namespace = import.namespace.clone();
            }
        }

        let existing = ExistingImports::scan(target);
        for (source, group) in groups {
            let found = existing.by_source.get(&source);

            let mut default = None;
            if let Some(local) = group.default {
                match found.and_then(|e| e.default.as_deref()) {
                    Some(existing) if existing == local => {}
                    Some(existing) => code.declarations.push(format!("const {local} = {existing}")),
                    None => default = Some(local),
                }
            }
            let mut namespace = None;
            if let Some(local) = group.namespace {
                match found.and_then(|e| e.namespace.as_deref()) {
                    Some(existing) if existing == local => {}
                    Some(existing) => code.declarations.push(format!("const {local} = {existing}")),
                    None => namespace = Some(local),
                }
            }

            let missing: Vec<String> = group
                .named
                .iter()
                .filter(|pair| !found.is_some_and(|e| e.named.contains(*pair)))
                .map(|(imported, local)| specifier(imported, local))
                .collect();

            let mut named = Vec::new();
            if !missing.is_empty() {
                match found.and_then(|e| e.reusable_end) {
                    Some(end) => {
                        let text: String = missing.iter().map(|s| format!(", {s}")).collect();
                        edits.insert(end, text);
                    }
                    None => named = missing,
                }
            }

            let head = default.map(|d| format!("{d}, ")).unwrap_or_default();
            match namespace {
                Some(ns) => {
                    code.imports.push(format!("import {head}* as {ns} from '{source}'"));
                    if !named.is_empty() {
                        code.imports
                            .push(format!("import {{ {} }} from '{source}'", named.join(", ")));
                    }
                }
                None if !named.is_empty() => code
                    .imports
                    .push(format!("import {head}{{ {} }} from '{source}'", named.join(", "))),
                None if !head.is_empty() => code.imports.push(format!(
                    "import {} from '{source}'",
                    head.trim_end_matches(", ")
                )),
                None => {}
            }
        }
    }

    fn generate_declarations(&self, target: &Script, code: &mut HoistedCode) {
        #[derive(Default)]
        struct Group {
            kind: Option<VarDeclKind>,
            identifier: Option<String>,
            properties: IndexSet<String>,
        }

        let mut groups: IndexMap<&str, Group> = IndexMap::new();
        for decl in &self.declarations {
            let group = groups.entry(decl.init.as_str()).or_default();
            group.kind = match (group.kind, decl.kind) {
                (Some(VarDeclKind::Let), _) | (_, VarDeclKind::Let) => Some(VarDeclKind::Let),
                _ => Some(VarDeclKind::Const),
            };
            match &decl.binding {
                Binding::Ident(name) => {
                    if group.identifier.is_none() {
                        group.identifier = Some(name.clone());
                    }
                }
                Binding::Properties(properties) => {
                    group.properties.extend(properties.iter().cloned());
                }
            }
        }

        let existing = ExistingDeclarations::scan(target);
        for (init, group) in groups {
            let found = existing.by_init.get(init);
            let kind = match group.kind {
                Some(VarDeclKind::Let) => "let",
                _ => "const",
            };
            if let Some(identifier) = &group.identifier {
                if !found.is_some_and(|e| e.identifiers.contains(identifier)) {
                    code.declarations
                        .push(format!("{kind} {identifier} = {init}"));
                }
            }
            let properties: Vec<&String> = group
                .properties
                .iter()
                .filter(|p| !found.is_some_and(|e| e.properties.contains(*p)))
                .collect();
            if !properties.is_empty() {
                let from = group.identifier.as_deref().unwrap_or(init);
                code.declarations
                    .push(format!("{kind} {} = {from}", multiline_object(properties)));
            }
        }
    }
}

fn specifier(imported: &str, local: &str) -> String {
    if imported == local {
        local.to_string()
    } else {
        format!("{imported} as {local}")
    }
}

fn read_import(decl: &ImportDecl) -> HoistedImport {
    let mut import = HoistedImport {
        source: str_value(&decl.src).unwrap_or_default().to_string(),
        ..Default::default()
    };
    for spec in &decl.specifiers {
        match spec {
            ImportSpecifier::Named(named) => {
                let local = named.local.sym.to_string();
                let imported = match &named.imported {
                    Some(ModuleExportName::Ident(ident)) => ident.sym.to_string(),
                    Some(ModuleExportName::Str(s)) => quote(str_value(s).unwrap_or_default()),
                    None => local.clone(),
                };
                import.named.push((imported, local));
            }
            ImportSpecifier::Default(default) => {
                import.default = Some(default.local.sym.to_string());
            }
            ImportSpecifier::Namespace(namespace) => {
                import.namespace = Some(namespace.local.sym.to_string());
            }
        }
    }
    import
}

/// Reads `const a = init` and `const { a, b } = init` declarators. Returns
/// `None` when any declarator has another shape.
fn read_declaration(script: &Script, decl: &VarDecl) -> Option<Vec<HoistedDeclaration>> {
    decl.decls
        .iter()
        .map(|declarator| {
            let init = script.text(declarator.init.as_deref()?).to_string();
            let binding = match &declarator.name {
                Pat::Ident(binding) => Binding::Ident(binding.id.sym.to_string()),
                Pat::Object(object) => Binding::Properties(
                    object
                        .props
                        .iter()
                        .map(|prop| script.text(prop).to_string())
                        .collect(),
                ),
                _ => return None,
            };
            Some(HoistedDeclaration {
                kind: decl.kind,
                init,
                binding,
            })
        })
        .collect()
}

#[derive(Default)]
struct ExistingImport {
    named: Vec<(String, String)>,
    default: Option<String>,
    namespace: Option<String>,
    /// The end of the last specifier of the first import with named specifiers.
    reusable_end: Option<u32>,
}

struct ExistingImports {
    by_source: IndexMap<String, ExistingImport>,
}

impl ExistingImports {
    fn scan(target: &Script) -> Self {
        let mut by_source: IndexMap<String, ExistingImport> = IndexMap::new();
        for item in &target.module().body {
            let ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) = item else {
                continue;
            };
            if decl.type_only {
                continue;
            }
            let import = read_import(decl);
            let entry = by_source.entry(import.source).or_default();
            if entry.reusable_end.is_none() && !import.named.is_empty() {
                entry.reusable_end = decl
                    .specifiers
                    .last()
                    .map(|spec| target.offset(spec.span().hi));
            }
            entry.named.extend(import.named);
            if entry.default.is_none() {
                entry.default = import.default;
            }
            if entry.namespace.is_none() {
                entry.namespace = import.namespace;
            }
        }
        Self { by_source }
    }
}

#[derive(Default)]
struct ExistingDeclaration {
    identifiers: Vec<String>,
    properties: Vec<String>,
}

struct ExistingDeclarations<'a> {
    by_init: IndexMap<&'a str, ExistingDeclaration>,
}

impl<'a> ExistingDeclarations<'a> {
    fn scan(target: &'a Script) -> Self {
        let mut by_init: IndexMap<&'a str, ExistingDeclaration> = IndexMap::new();
        for item in &target.module().body {
            let ModuleItem::Stmt(Stmt::Decl(Decl::Var(decl))) = item else {
                continue;
            };
            for declarator in &decl.decls {
                let Some(init) = declarator.init.as_deref() else {
                    continue;
                };
                let entry = by_init.entry(target.text(init)).or_default();
                match &declarator.name {
                    Pat::Ident(binding) => entry.identifiers.push(binding.id.sym.to_string()),
                    Pat::Object(object) => entry.properties.extend(
                        object
                            .props
                            .iter()
                            .filter(|prop| !matches!(prop, ObjectPatProp::Rest(_)))
                            .map(|prop| target.text(prop).to_string()),
                    ),
                    _ => {}
                }
            }
        }
        Self { by_init }
    }
}

/// Merged imports and declarations, ready to insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoistedCode {
    pub imports: Vec<String>,
    pub declarations: Vec<String>,
}

impl HoistedCode {
    /// Imports, then declarations. When the target already has imports, or
    /// new ones are added, a blank line separates them from declarations.
    pub fn render(&self, target_has_imports: bool) -> String {
        let mut lines: Vec<&str> = self.imports.iter().map(String::as_str).collect();
        if (target_has_imports || !self.imports.is_empty()) && !self.declarations.is_empty() {
            lines.push("");
        }
        lines.extend(self.declarations.iter().map(String::as_str));
        lines.join("\n")
    }
}

/// The end offset of the last top-level import.
pub fn last_import_end(script: &Script) -> Option<u32> {
    script
        .module()
        .body
        .iter()
        .filter(|item| matches!(item, ModuleItem::ModuleDecl(ModuleDecl::Import(_))))
        .last()
        .map(|item| script.offset(item.span().hi))
}

/// Where code goes in a script without imports: before the first statement,
/// after any leading comments.
fn top_offset(script: &Script) -> u32 {
    script
        .module()
        .body
        .first()
        .map_or(0, |item| script.offset(item.span().lo))
}

/// Inserts imports and declarations after the last import, or at the top.
pub fn insert_hoisted_code(script: &Script, edits: &mut EditBuffer<'_>, code: &str) {
    if code.is_empty() {
        return;
    }
    match last_import_end(script) {
        Some(end) => edits.insert(end, format!("\n{code}")),
        None => edits.insert(top_offset(script), format!("{code}\n\n")),
    }
}

/// Inserts generated statements after the last import, or at the top.
pub fn insert_local_code(script: &Script, edits: &mut EditBuffer<'_>, code: &str) {
    if code.is_empty() {
        return;
    }
    match last_import_end(script) {
        Some(end) => edits.insert(end, format!("\n\n{code}")),
        None => edits.insert(top_offset(script), format!("{code}\n\n")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const A: PluginId = PluginId(0);
    const B: PluginId = PluginId(1);

    fn hoist(manager: &mut CodeManager, plugin: PluginId, content: &str) {
        manager.collect(plugin, Fragment::hoist(content));
    }

    fn generate(manager: &CodeManager, target: &str) -> (HoistedCode, String) {
        let script = Script::parse(target, ScriptLang::TypeScript).unwrap();
        let mut edits = EditBuffer::new(script.source());
        let code = manager.generate_hoisted_code(&script, &mut edits, &TransformOptions::default());
        let text = edits.apply().unwrap().text;
        (code, text)
    }

    #[test]
    fn test_local_code_orders_by_band_then_plugin() {
        let mut manager = CodeManager::new();
        manager.collect(B, Fragment::code("watch(a)", Priority::Effect));
        manager.collect(B, Fragment::code("const b = 1", Priority::State));
        manager.collect(A, Fragment::code("const c = computed(x)", Priority::Derived));
        manager.collect(A, Fragment::code("const a = 1", Priority::State));
        manager.collect(A, Fragment::code("const a2 = 2", Priority::State));
        assert_eq!(
            manager.generate_local_code(),
            "const a = 1\nconst a2 = 2\n\nconst b = 1\n\nconst c = computed(x)\n\nwatch(a)"
        );
    }

    #[test]
    fn test_other_fragments_are_returned() {
        let mut manager = CodeManager::new();
        let fragment = Fragment::replace("x");
        assert_eq!(manager.collect(A, fragment.clone()), Some(fragment));
        assert!(manager.local.is_empty() && manager.imports.is_empty());
    }

    #[test]
    fn test_imports_merge_per_source() {
        let mut manager = CodeManager::new();
        hoist(&mut manager, A, "import { ref } from 'vue'");
        hoist(&mut manager, B, "import { computed, ref } from 'vue'");
        hoist(&mut manager, B, "import { useRouter } from 'vue-router'");
        let (code, _) = generate(&manager, "const a = 1");
        assert_eq!(
            code.imports,
            vec![
                "import { ref, computed } from 'vue'".to_string(),
                "import { useRouter } from 'vue-router'".to_string(),
            ]
        );
    }

    #[test]
    fn test_existing_import_is_extended() {
        let mut manager = CodeManager::new();
        hoist(&mut manager, A, "import { ref } from 'vue'");
        hoist(&mut manager, A, "import { watch } from 'vue'");
        let (code, text) = generate(&manager, "import { ref } from 'vue'\nconst a = 1\n");
        assert_eq!(code, HoistedCode::default());
        assert_eq!(text, "import { ref, watch } from 'vue'\nconst a = 1\n");
    }

    #[test]
    fn test_type_only_import_is_not_reused() {
        let mut manager = CodeManager::new();
        hoist(&mut manager, A, "import { ref } from 'vue'");
        let (code, text) = generate(&manager, "import type { Ref } from 'vue'\n");
        assert_eq!(code.imports, vec!["import { ref } from 'vue'".to_string()]);
        assert_eq!(text, "import type { Ref } from 'vue'\n");
    }

    #[test]
    fn test_namespace_collision_becomes_alias() {
        let mut manager = CodeManager::new();
        hoist(&mut manager, A, "import * as Vue from 'vue'");
        let (code, _) = generate(&manager, "import * as V from 'vue'\n");
        assert!(code.imports.is_empty());
        assert_eq!(code.declarations, vec!["const Vue = V".to_string()]);
    }

    #[test]
    fn test_aliases_apply_to_hoisted_imports() {
        let mut manager = CodeManager::new();
        hoist(&mut manager, A, "import { ref } from 'vue'");
        let script = Script::parse("", ScriptLang::TypeScript).unwrap();
        let mut edits = EditBuffer::new(script.source());
        let mut options = TransformOptions::default();
        options
            .aliases
            .insert("vue".to_string(), "@vue/composition-api".to_string());
        let code = manager.generate_hoisted_code(&script, &mut edits, &options);
        assert_eq!(
            code.imports,
            vec!["import { ref } from '@vue/composition-api'".to_string()]
        );
    }

    #[test]
    fn test_declarations_merge_by_init() {
        let mut manager = CodeManager::new();
        hoist(&mut manager, A, "const counterStore = useCounterStore()");
        hoist(&mut manager, A, "const { count } = storeToRefs(counterStore)");
        hoist(&mut manager, A, "const counterStore = useCounterStore()");
        hoist(&mut manager, A, "const { double } = storeToRefs(counterStore)");
        hoist(&mut manager, A, "let { name } = storeToRefs(counterStore)");
        let (code, _) = generate(&manager, "");
        assert_eq!(
            code.declarations,
            vec![
                "const counterStore = useCounterStore()".to_string(),
                "let {\n  count,\n  double,\n  name,\n} = storeToRefs(counterStore)".to_string(),
            ]
        );
    }

    #[test]
    fn test_identifier_and_properties_share_init() {
        let mut manager = CodeManager::new();
        hoist(&mut manager, A, "const route = useRoute()");
        hoist(&mut manager, A, "const { params } = useRoute()");
        let (code, _) = generate(&manager, "");
        assert_eq!(
            code.declarations,
            vec![
                "const route = useRoute()".to_string(),
                "const {\n  params,\n} = route".to_string(),
            ]
        );
    }

    #[test]
    fn test_existing_declaration_is_not_repeated() {
        let mut manager = CodeManager::new();
        hoist(&mut manager, A, "const router = useRouter()");
        let (code, _) = generate(&manager, "const router = useRouter()\n");
        assert!(code.declarations.is_empty());
    }

    #[test]
    fn test_unmergeable_hoist_becomes_code() {
        let mut manager = CodeManager::new();
        hoist(&mut manager, A, "console.log('hi')");
        hoist(&mut manager, A, "const [a] = b");
        assert_eq!(manager.generate_local_code(), "console.log('hi')\nconst [a] = b");
    }

    #[test]
    fn test_render_separates_imports_and_declarations() {
        let code = HoistedCode {
            imports: vec!["import { a } from 'a'".to_string()],
            declarations: vec!["const b = a()".to_string()],
        };
        assert_eq!(code.render(false), "import { a } from 'a'\n\nconst b = a()");

        let code = HoistedCode {
            imports: Vec::new(),
            declarations: vec!["const b = a()".to_string()],
        };
        assert_eq!(code.render(true), "\nconst b = a()");
        assert_eq!(code.render(false), "const b = a()");
    }

    #[test]
    fn test_insert_positions() {
        let script = Script::parse("import a from 'a'\nfoo()\n", ScriptLang::JavaScript).unwrap();
        let mut edits = EditBuffer::new(script.source());
        insert_hoisted_code(&script, &mut edits, "import b from 'b'");
        insert_local_code(&script, &mut edits, "bar()");
        assert_eq!(
            edits.apply().unwrap().text,
            "import a from 'a'\nimport b from 'b'\n\nbar()\nfoo()\n"
        );

        let script = Script::parse("// @ts-check\nfoo()\n", ScriptLang::JavaScript).unwrap();
        let mut edits = EditBuffer::new(script.source());
        insert_hoisted_code(&script, &mut edits, "const a = 1");
        insert_local_code(&script, &mut edits, "bar()");
        assert_eq!(
            edits.apply().unwrap().text,
            "// @ts-check\nconst a = 1\n\nbar()\n\nfoo()\n"
        );
    }
}
