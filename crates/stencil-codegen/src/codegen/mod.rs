//! Render function generation.
//!
//! The generator walks the optimized tree and emits one JavaScript
//! expression per element built from the runtime helpers (`_c`, `_v`, `_l`,
//! `_m` and friends). Static roots are hoisted into separate functions whose
//! index is referenced from the main render code.

mod directives;
pub mod events;

use std::sync::Arc;

use rustc_hash::FxHashSet;
use stencil_parser::ast::{Attr, Comment, Element, IfCondition, Text};
use stencil_parser::process::EMPTY_SLOT_SCOPE_TOKEN;
use stencil_parser::util::{camelize, escape_line_terminators, stringify};
use stencil_parser::{Ast, BasePlatform, CompilerError, Diagnostics, ErrorKind, Module, Node, NodeId, Platform};

pub use directives::{
    base_directives, BindDirective, CloakDirective, DirectiveContext, DirectiveGen, DirectiveMap,
    OnDirective,
};

/// Options for [`generate`].
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Tag knowledge; decides which elements may be components.
    pub platform: Arc<dyn Platform>,
    /// Modules contributing data-object entries.
    pub modules: Vec<Arc<dyn Module>>,
    /// Compile-time directive handlers by name.
    pub directives: DirectiveMap,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            platform: Arc::new(BasePlatform),
            modules: Vec::new(),
            directives: base_directives(),
        }
    }
}

/// Generated code of one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodegenResult {
    /// `with(this){return ...}` for the whole tree.
    pub render: String,
    /// Bodies of the hoisted static subtrees, indexed by `_m(i)`.
    pub static_render_fns: Vec<String>,
    /// Problems found while generating.
    pub errors: Vec<CompilerError>,
    /// Advice found while generating.
    pub tips: Vec<CompilerError>,
}

/// Generates the render code of `ast`.
///
/// Directive handlers may rewrite elements, which is why the tree is taken
/// mutably.
pub fn generate(ast: &mut Ast, options: &CodegenOptions) -> CodegenResult {
    let root = ast.root;
    let mut generator = CodeGenerator::new(ast, options);
    let code = match root {
        Some(root) => generator.gen_root(root),
        None => "_c(\"div\")".to_string(),
    };
    log::debug!(
        "generated render code ({} bytes, {} static trees)",
        code.len(),
        generator.static_render_fns.len()
    );
    CodegenResult {
        render: format!("with(this){{return {code}}}"),
        static_render_fns: generator.static_render_fns,
        errors: generator.diagnostics.errors,
        tips: generator.diagnostics.tips,
    }
}

/// Generation steps that run once per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Stage {
    Static,
    Once,
    For,
    If,
}

/// How a block reached through `v-if` or `v-for` is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockGen {
    Element,
    ScopedSlot,
}

struct CodeGenerator<'a> {
    ast: &'a mut Ast,
    options: &'a CodegenOptions,
    diagnostics: Diagnostics,
    static_render_fns: Vec<String>,
    once_id: usize,
    pre: bool,
    processed: FxHashSet<(NodeId, Stage)>,
}

impl<'a> CodeGenerator<'a> {
    fn new(ast: &'a mut Ast, options: &'a CodegenOptions) -> Self {
        Self {
            ast,
            options,
            diagnostics: Diagnostics::new(),
            static_render_fns: Vec::new(),
            once_id: 0,
            pre: false,
            processed: FxHashSet::default(),
        }
    }

    fn maybe_component(&self, el: &Element) -> bool {
        el.component.is_some() || !self.options.platform.is_reserved_tag(&el.tag)
    }

    fn is_processed(&self, id: NodeId, stage: Stage) -> bool {
        self.processed.contains(&(id, stage))
    }

    fn mark_processed(&mut self, id: NodeId, stage: Stage) {
        self.processed.insert((id, stage));
    }

    fn gen_root(&mut self, id: NodeId) -> String {
        match self.ast.element(id) {
            Some(el) if el.tag == "script" => "null".to_string(),
            _ => self.gen_element(id),
        }
    }

    fn gen_node(&mut self, id: NodeId) -> String {
        match self.ast.get(id) {
            Some(Node::Element(_)) => self.gen_element(id),
            Some(Node::Text(text)) => gen_text(text),
            Some(Node::Comment(comment)) => gen_comment(comment),
            None => "_e()".to_string(),
        }
    }

    fn gen_element(&mut self, id: NodeId) -> String {
        let parent_pre = self
            .ast
            .parent(id)
            .and_then(|parent| self.ast.element(parent))
            .is_some_and(|parent| parent.pre);
        let Some(el) = self.ast.element_mut(id) else {
            return self.gen_node(id);
        };
        el.pre |= parent_pre;

        let Some(el) = self.ast.element(id) else {
            return "_e()".to_string();
        };
        if el.static_root && !self.is_processed(id, Stage::Static) {
            return self.gen_static(id);
        }
        if el.once && !self.is_processed(id, Stage::Once) {
            return self.gen_once(id);
        }
        if el.for_info.is_some() && !self.is_processed(id, Stage::For) {
            return self.gen_for(id, BlockGen::Element);
        }
        if el.if_exp.is_some() && !self.is_processed(id, Stage::If) {
            return self.gen_if(id, BlockGen::Element, None);
        }
        if el.tag == "template" && el.slot_target.is_none() && !self.pre {
            return self.gen_children(id, false).unwrap_or_else(|| "void 0".to_string());
        }
        if el.tag == "slot" {
            return self.gen_slot(id);
        }
        if let Some(component) = el.component.clone() {
            return self.gen_component(&component, id);
        }

        let tag = el.tag.clone();
        let needs_data = !el.plain || (el.pre && self.maybe_component(el));
        let inline_template = el.inline_template;
        let data = if needs_data { Some(self.gen_data(id)) } else { None };
        let children = if inline_template {
            None
        } else {
            self.gen_children(id, true)
        };

        let mut code = format!("_c('{tag}'");
        if let Some(data) = data {
            code.push(',');
            code.push_str(&data);
        }
        if let Some(children) = children {
            code.push(',');
            code.push_str(&children);
        }
        code.push(')');
        code
    }

    fn gen_static(&mut self, id: NodeId) -> String {
        self.mark_processed(id, Stage::Static);
        let (pre, in_for) = self
            .ast
            .element(id)
            .map_or((false, false), |el| (el.pre, el.static_in_for));

        let original_pre = self.pre;
        if pre {
            self.pre = true;
        }
        let code = self.gen_element(id);
        self.static_render_fns.push(format!("with(this){{return {code}}}"));
        self.pre = original_pre;

        let index = self.static_render_fns.len() - 1;
        if in_for {
            format!("_m({index},true)")
        } else {
            format!("_m({index})")
        }
    }

    fn gen_once(&mut self, id: NodeId) -> String {
        self.mark_processed(id, Stage::Once);
        let Some(el) = self.ast.element(id) else {
            return "_e()".to_string();
        };
        if el.if_exp.is_some() && !self.is_processed(id, Stage::If) {
            return self.gen_if(id, BlockGen::Element, None);
        }
        if !el.static_in_for {
            return self.gen_static(id);
        }

        let key = self
            .ast
            .ancestors_inclusive(id)
            .skip(1)
            .filter_map(|ancestor| self.ast.element(ancestor))
            .find(|ancestor| ancestor.for_info.is_some())
            .and_then(|ancestor| ancestor.key.clone());
        let Some(key) = key else {
            let span = el.attr_span("v-once");
            self.diagnostics.error(ErrorKind::UnkeyedOnce, span);
            return self.gen_element(id);
        };
        let code = self.gen_element(id);
        let once_id = self.once_id;
        self.once_id += 1;
        format!("_o({code},{once_id},{key})")
    }

    fn gen_if(&mut self, id: NodeId, block_gen: BlockGen, alt_empty: Option<&str>) -> String {
        self.mark_processed(id, Stage::If);
        let conditions = self
            .ast
            .element(id)
            .map(|el| el.if_conditions.clone())
            .unwrap_or_default();
        self.gen_if_conditions(&conditions, block_gen, alt_empty)
    }

    fn gen_if_conditions(
        &mut self,
        conditions: &[IfCondition],
        block_gen: BlockGen,
        alt_empty: Option<&str>,
    ) -> String {
        let Some((condition, rest)) = conditions.split_first() else {
            return alt_empty.unwrap_or("_e()").to_string();
        };
        let block = self.gen_ternary_block(condition.block, block_gen);
        match &condition.exp {
            Some(exp) => {
                let alternative = self.gen_if_conditions(rest, block_gen, alt_empty);
                format!("({exp})?{block}:{alternative}")
            }
            None => block,
        }
    }

    fn gen_ternary_block(&mut self, id: NodeId, block_gen: BlockGen) -> String {
        match block_gen {
            BlockGen::ScopedSlot => self.gen_scoped_slot(id),
            BlockGen::Element if self.ast.element(id).is_some_and(|el| el.once) => self.gen_once(id),
            BlockGen::Element => self.gen_element(id),
        }
    }

    fn gen_for(&mut self, id: NodeId, block_gen: BlockGen) -> String {
        let Some(el) = self.ast.element(id) else {
            return "_e()".to_string();
        };
        let Some(info) = el.for_info.clone() else {
            return self.gen_element(id);
        };
        if self.maybe_component(el)
            && el.tag != "slot"
            && el.tag != "template"
            && el.key.is_none()
        {
            let kind = ErrorKind::UnkeyedComponentList {
                tag: el.tag.to_string(),
                alias: info.alias.clone(),
                iterable: info.source.clone(),
            };
            let span = el.attr_span("v-for");
            self.diagnostics.tip(kind, span);
        }

        self.mark_processed(id, Stage::For);
        let iterators: String = [&info.iterator1, &info.iterator2]
            .into_iter()
            .flatten()
            .map(|iterator| format!(",{iterator}"))
            .collect();
        let body = match block_gen {
            BlockGen::Element => self.gen_element(id),
            BlockGen::ScopedSlot => self.gen_scoped_slot(id),
        };
        format!(
            "_l(({}),function({}{iterators}){{return {body}}})",
            info.source, info.alias
        )
    }

    fn gen_data(&mut self, id: NodeId) -> String {
        let directives = self.gen_directives(id);
        let Some(el) = self.ast.element(id) else {
            return "{}".to_string();
        };

        let mut data = String::from("{");
        if let Some(directives) = directives {
            data.push_str(&directives);
            data.push(',');
        }
        if let Some(key) = &el.key {
            data.push_str(&format!("key:{key},"));
        }
        if let Some(ref_) = &el.ref_ {
            data.push_str(&format!("ref:{ref_},"));
        }
        if el.ref_in_for {
            data.push_str("refInFor:true,");
        }
        if el.pre {
            data.push_str("pre:true,");
        }
        if el.component.is_some() {
            data.push_str(&format!("tag:\"{}\",", el.tag));
        }
        for module in &self.options.modules {
            data.push_str(&module.gen_data(el));
        }
        if !el.attrs.is_empty() {
            data.push_str(&format!("attrs:{},", gen_props(&el.attrs)));
        }
        if !el.props.is_empty() {
            data.push_str(&format!("domProps:{},", gen_props(&el.props)));
        }
        if !el.events.is_empty() {
            data.push_str(&events::gen_handlers(&el.events, false));
            data.push(',');
        }
        if !el.native_events.is_empty() {
            data.push_str(&events::gen_handlers(&el.native_events, true));
            data.push(',');
        }
        if let (Some(target), None) = (&el.slot_target, &el.slot_scope) {
            data.push_str(&format!("slot:{target},"));
        }

        if !el.scoped_slots.is_empty() {
            let scoped_slots = self.gen_scoped_slots(id);
            data.push_str(&scoped_slots);
            data.push(',');
        }
        let Some(el) = self.ast.element(id) else {
            return "{}".to_string();
        };
        if let Some(model) = &el.model {
            data.push_str(&format!(
                "model:{{value:{},callback:{},expression:{}}},",
                model.value, model.callback, model.expression
            ));
        }
        if el.inline_template {
            if let Some(inline_template) = self.gen_inline_template(id) {
                data.push_str(&inline_template);
                data.push(',');
            }
        }

        let Some(el) = self.ast.element(id) else {
            return "{}".to_string();
        };
        if data.ends_with(',') {
            data.pop();
        }
        data.push('}');

        if !el.dynamic_attrs.is_empty() {
            data = format!("_b({data},\"{}\",{})", el.tag, gen_props(&el.dynamic_attrs));
        }
        if let Some(bind) = &el.wrap_data {
            data = format!(
                "_b({data},'{}',{},{}{})",
                el.tag,
                bind.value,
                bind.prop,
                if bind.sync { ",true" } else { "" }
            );
        }
        if let Some(listeners) = &el.wrap_listeners {
            data = format!("_g({data},{listeners})");
        }
        data
    }

    fn gen_directives(&mut self, id: NodeId) -> Option<String> {
        let el = self.ast.element_mut(id)?;
        if el.directives.is_empty() {
            return None;
        }
        let directives = el.directives.clone();
        let mut cx = DirectiveContext {
            diagnostics: &mut self.diagnostics,
            platform: self.options.platform.as_ref(),
        };

        let mut runtime = Vec::new();
        for dir in &directives {
            let needs_runtime = match self.options.directives.get(dir.name.as_str()) {
                Some(handler) => handler.generate(el, dir, &mut cx),
                None => true,
            };
            if !needs_runtime {
                continue;
            }
            let mut entry = format!("{{name:\"{}\",rawName:\"{}\"", dir.name, dir.raw_name);
            if !dir.value.is_empty() {
                entry.push_str(&format!(",value:({}),expression:{}", dir.value, stringify(&dir.value)));
            }
            if let Some(arg) = &dir.arg {
                if dir.is_dynamic_arg {
                    entry.push_str(&format!(",arg:{arg}"));
                } else {
                    entry.push_str(&format!(",arg:\"{arg}\""));
                }
            }
            if let Some(modifiers) = &dir.modifiers {
                let flags: Vec<String> = modifiers
                    .iter()
                    .map(|modifier| format!("{}:true", stringify(modifier)))
                    .collect();
                entry.push_str(&format!(",modifiers:{{{}}}", flags.join(",")));
            }
            entry.push('}');
            runtime.push(entry);
        }

        (!runtime.is_empty()).then(|| format!("directives:[{}]", runtime.join(",")))
    }

    fn gen_scoped_slots(&mut self, id: NodeId) -> String {
        let Some(el) = self.ast.element(id) else {
            return String::new();
        };
        let slots: Vec<NodeId> = el.scoped_slots.values().copied().collect();

        // Slots that can change shape between renders must be re-rendered
        // along with the parent.
        let mut needs_force_update = el.for_info.is_some()
            || slots.iter().any(|&slot| {
                self.ast.element(slot).is_some_and(|slot_el| {
                    slot_el.slot_target_dynamic
                        || slot_el.if_exp.is_some()
                        || slot_el.for_info.is_some()
                        || contains_slot_child(self.ast, slot)
                })
            });
        let mut needs_key = el.if_exp.is_some();
        if !needs_force_update {
            for ancestor in self.ast.ancestors_inclusive(id).skip(1) {
                let Some(parent) = self.ast.element(ancestor) else {
                    break;
                };
                let scoped = parent
                    .slot_scope
                    .as_deref()
                    .is_some_and(|scope| scope != EMPTY_SLOT_SCOPE_TOKEN);
                if scoped || parent.for_info.is_some() {
                    needs_force_update = true;
                    break;
                }
                if parent.if_exp.is_some() {
                    needs_key = true;
                }
            }
        }

        let generated: Vec<String> = slots.into_iter().map(|slot| self.gen_scoped_slot(slot)).collect();
        let generated = generated.join(",");
        if needs_force_update {
            format!("scopedSlots:_u([{generated}],null,true)")
        } else if needs_key {
            format!("scopedSlots:_u([{generated}],null,false,{})", hash(&generated))
        } else {
            format!("scopedSlots:_u([{generated}])")
        }
    }

    fn gen_scoped_slot(&mut self, id: NodeId) -> String {
        let Some(el) = self.ast.element(id) else {
            return "null".to_string();
        };
        let legacy_syntax = el.attr("slot-scope").is_some_and(|scope| !scope.is_empty());
        if el.if_exp.is_some() && !self.is_processed(id, Stage::If) && !legacy_syntax {
            return self.gen_if(id, BlockGen::ScopedSlot, Some("null"));
        }
        if el.for_info.is_some() && !self.is_processed(id, Stage::For) {
            return self.gen_for(id, BlockGen::ScopedSlot);
        }

        let scope = match el.slot_scope.as_deref() {
            Some(EMPTY_SLOT_SCOPE_TOKEN) | None => String::new(),
            Some(scope) => scope.to_string(),
        };
        let key = el
            .slot_target
            .clone()
            .unwrap_or_else(|| "\"default\"".to_string());
        let body = if el.tag == "template" {
            let condition = el.if_exp.clone().filter(|_| legacy_syntax);
            let children = self
                .gen_children(id, false)
                .unwrap_or_else(|| "undefined".to_string());
            match condition {
                Some(condition) => format!("({condition})?{children}:undefined"),
                None => children,
            }
        } else {
            self.gen_element(id)
        };

        let proxy = if scope.is_empty() { ",proxy:true" } else { "" };
        format!("{{key:{key},fn:function({scope}){{return {body}}}{proxy}}}")
    }

    fn gen_children(&mut self, id: NodeId, check_skip: bool) -> Option<String> {
        let children = self.ast.element(id)?.children.clone();
        let first = *children.first()?;

        if children.len() == 1 {
            if let Some(child) = self.ast.element(first) {
                if child.for_info.is_some() && child.tag != "template" && child.tag != "slot" {
                    let normalization = match (check_skip, self.maybe_component(child)) {
                        (false, _) => "",
                        (true, true) => ",1",
                        (true, false) => ",0",
                    };
                    return Some(format!("{}{normalization}", self.gen_element(first)));
                }
            }
        }

        let normalization = if check_skip {
            self.normalization_type(&children)
        } else {
            0
        };
        let nodes: Vec<String> = children.iter().map(|&child| self.gen_node(child)).collect();
        let mut code = format!("[{}]", nodes.join(","));
        if normalization != 0 {
            code.push_str(&format!(",{normalization}"));
        }
        Some(code)
    }

    /// Picks how much work the runtime must do to flatten `children`:
    /// 0 for none, 1 when components may return arrays, 2 when nested arrays
    /// are possible.
    fn normalization_type(&self, children: &[NodeId]) -> u8 {
        let mut normalization = 0;
        for &child in children {
            let Some(el) = self.ast.element(child) else {
                continue;
            };
            let blocks: Vec<&Element> = el
                .if_conditions
                .iter()
                .filter_map(|condition| self.ast.element(condition.block))
                .collect();
            if needs_normalization(el) || blocks.iter().any(|block| needs_normalization(block)) {
                return 2;
            }
            if self.maybe_component(el) || blocks.iter().any(|block| self.maybe_component(block)) {
                normalization = 1;
            }
        }
        normalization
    }

    fn gen_slot(&mut self, id: NodeId) -> String {
        let children = self.gen_children(id, false);
        let Some(el) = self.ast.element(id) else {
            return "_e()".to_string();
        };
        let name = el
            .slot_name
            .clone()
            .flatten()
            .unwrap_or_else(|| "\"default\"".to_string());
        let attrs = (!el.attrs.is_empty() || !el.dynamic_attrs.is_empty()).then(|| {
            let camelized: Vec<Attr> = el
                .attrs
                .iter()
                .chain(&el.dynamic_attrs)
                .map(|attr| Attr {
                    name: camelize(&attr.name),
                    ..attr.clone()
                })
                .collect();
            gen_props(&camelized)
        });
        let bind = el.attr("v-bind").filter(|bind| !bind.is_empty());

        let mut code = format!("_t({name}");
        if let Some(children) = &children {
            code.push_str(&format!(",function(){{return {children}}}"));
        }
        if (attrs.is_some() || bind.is_some()) && children.is_none() {
            code.push_str(",null");
        }
        if let Some(attrs) = &attrs {
            code.push(',');
            code.push_str(attrs);
        }
        if let Some(bind) = bind {
            if attrs.is_none() {
                code.push_str(",null");
            }
            code.push(',');
            code.push_str(bind);
        }
        code.push(')');
        code
    }

    fn gen_component(&mut self, component: &str, id: NodeId) -> String {
        let inline_template = self.ast.element(id).is_some_and(|el| el.inline_template);
        let children = if inline_template {
            None
        } else {
            self.gen_children(id, true)
        };
        let data = self.gen_data(id);
        match children {
            Some(children) => format!("_c({component},{data},{children})"),
            None => format!("_c({component},{data})"),
        }
    }

    fn gen_inline_template(&mut self, id: NodeId) -> Option<String> {
        let el = self.ast.element(id)?;
        let child = el.children.first().copied().filter(|&child| self.ast.element(child).is_some());
        if el.children.len() != 1 || child.is_none() {
            let span = Some(el.span);
            self.diagnostics.error(ErrorKind::InlineTemplateChildren, span);
        }
        let child = child?;

        let mut inner = CodeGenerator::new(&mut *self.ast, self.options);
        let code = inner.gen_root(child);
        let static_render_fns: Vec<String> = inner
            .static_render_fns
            .iter()
            .map(|code| format!("function(){{{code}}}"))
            .collect();
        let diagnostics = std::mem::take(&mut inner.diagnostics);
        self.diagnostics.extend(diagnostics);

        Some(format!(
            "inlineTemplate:{{render:function(){{with(this){{return {code}}}}},staticRenderFns:[{}]}}",
            static_render_fns.join(",")
        ))
    }
}

fn needs_normalization(el: &Element) -> bool {
    el.for_info.is_some() || el.tag == "template" || el.tag == "slot"
}

fn contains_slot_child(ast: &Ast, id: NodeId) -> bool {
    match ast.element(id) {
        Some(el) => el.tag == "slot" || el.children.iter().any(|&child| contains_slot_child(ast, child)),
        None => false,
    }
}

/// Generates an object literal for attributes or DOM properties; dynamic
/// names are merged in with `_d`.
pub fn gen_props(props: &[Attr]) -> String {
    let mut static_props = Vec::new();
    let mut dynamic_props = Vec::new();
    for prop in props {
        let value = escape_line_terminators(&prop.value);
        if prop.dynamic {
            dynamic_props.push(format!("{},{value}", prop.name));
        } else {
            static_props.push(format!("\"{}\":{value}", prop.name));
        }
    }
    let static_props = format!("{{{}}}", static_props.join(","));
    if dynamic_props.is_empty() {
        static_props
    } else {
        format!("_d({static_props},[{}])", dynamic_props.join(","))
    }
}

/// `_v(...)` for a text node.
pub fn gen_text(text: &Text) -> String {
    match &text.expression {
        Some(expression) => format!("_v({})", expression.expression),
        None => format!("_v({})", escape_line_terminators(&stringify(&text.text))),
    }
}

/// `_e(...)` for a comment node.
pub fn gen_comment(comment: &Comment) -> String {
    format!("_e({})", stringify(&comment.text))
}

/// String hash used to key scoped slots under a condition, computed over
/// UTF-16 code units the way the runtime's string hash is.
fn hash(text: &str) -> u32 {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut hash: i32 = 5381;
    for &unit in units.iter().rev() {
        hash = hash.wrapping_mul(33) ^ i32::from(unit);
    }
    hash as u32
}
