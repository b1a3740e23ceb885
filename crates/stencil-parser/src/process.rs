//! Directive and attribute resolution for elements.
//!
//! Structural directives (`v-for`, `v-if`, `v-once`, `v-pre`) are resolved
//! when an element opens. Everything else is resolved by
//! [`ParseContext::process_element`] when it closes.

use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;
use stencil_span::Span;

use crate::assign::gen_assignment_code;
use crate::ast::{Ast, Attr, Directive, Element, ForInfo, IfCondition, Modifiers, Node, NodeId};
use crate::context::ParseContext;
use crate::error::ErrorKind;
use crate::filter::parse_filters;
use crate::helpers::{
    add_attr, add_directive, add_handler, add_prop, get_and_remove_attr, get_and_remove_attr_by_regex,
    get_binding_attr, raw_binding_attr, EventSpec,
};
use crate::text::parse_text;
use crate::util::{camelize, hyphenate, stringify};

static FOR_ALIAS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^(.*?)\s+(?:in|of)\s+(.*)$").unwrap());
static FOR_ITERATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",([^,}\]]*)(?:,([^,}\]]*))?$").unwrap());
static SLOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^v-slot(:|$)|^#").unwrap());

/// Scope token for slots declared without a scope expression.
pub const EMPTY_SLOT_SCOPE_TOKEN: &str = "_empty_";

/// Splits a `v-for` expression into its source and aliases.
///
/// `(item, key, index) in source` and `item of source` are accepted. Returns
/// `None` when there is no `in`/`of`.
pub fn parse_for(exp: &str) -> Option<ForInfo> {
    let captures = FOR_ALIAS_RE.captures(exp)?;
    let source = captures.get(2)?.as_str().trim().to_string();
    let raw_alias = captures.get(1)?.as_str().trim();
    let alias = raw_alias.strip_prefix('(').unwrap_or(raw_alias);
    let alias = alias.strip_suffix(')').unwrap_or(alias);

    match FOR_ITERATOR_RE.captures(alias) {
        Some(iterators) => {
            let whole = iterators.get(0)?;
            Some(ForInfo {
                source,
                alias: alias[..whole.start()].trim().to_string(),
                iterator1: iterators
                    .get(1)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|it| !it.is_empty()),
                iterator2: iterators
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|it| !it.is_empty()),
            })
        }
        None => Some(ForInfo {
            source,
            alias: alias.to_string(),
            iterator1: None,
            iterator2: None,
        }),
    }
}

/// Splits `.modifier` suffixes off an attribute name.
///
/// Dots inside a dynamic argument (`:[a.b]`) are not modifiers.
pub fn parse_modifiers(name: &str) -> (String, Option<Modifiers>) {
    let region_start = name.rfind(']').map_or(0, |close| close + 1);
    let (head, tail) = name.split_at(region_start);
    let mut stripped = head.to_string();
    let mut modifiers = Modifiers::new();
    let mut rest = tail;
    while let Some(dot) = rest.find('.') {
        stripped.push_str(&rest[..dot]);
        let after = &rest[dot + 1..];
        let len = after.find('.').unwrap_or(after.len());
        if len == 0 {
            stripped.push('.');
            rest = after;
            continue;
        }
        modifiers.insert(SmolStr::new(&after[..len]));
        rest = &after[len..];
    }
    stripped.push_str(rest);
    (stripped, (!modifiers.is_empty()).then_some(modifiers))
}

fn dynamic_arg(name: &str) -> Option<&str> {
    name.strip_prefix('[')?.strip_suffix(']')
}

fn strip_directive_prefix(name: &str) -> Option<&str> {
    name.strip_prefix("v-")
        .or_else(|| name.strip_prefix('@'))
        .or_else(|| name.strip_prefix(':'))
        .or_else(|| name.strip_prefix('#'))
}

/// Marks an element that carries `v-pre`.
pub fn process_pre(el: &mut Element) {
    if get_and_remove_attr(el, "v-pre", false).is_some() {
        el.pre = true;
    }
}

/// Turns every attribute of a `v-pre` element into a literal attribute.
pub fn process_raw_attrs(el: &mut Element) {
    if el.attrs_list.is_empty() {
        if !el.pre {
            el.plain = true;
        }
        return;
    }
    el.attrs = el
        .attrs_list
        .iter()
        .map(|attr| Attr {
            name: attr.name.clone(),
            value: stringify(&attr.value),
            dynamic: false,
            span: Some(attr.span),
        })
        .collect();
}

/// Resolves `v-if`, `v-else-if` and `v-else`.
pub fn process_if(el: &mut Element, id: NodeId) {
    match get_and_remove_attr(el, "v-if", false).filter(|exp| !exp.is_empty()) {
        Some(exp) => {
            el.if_exp = Some(exp.clone());
            add_if_condition(el, Some(exp), id);
        }
        None => {
            if get_and_remove_attr(el, "v-else", false).is_some() {
                el.is_else = true;
            }
            if let Some(exp) = get_and_remove_attr(el, "v-else-if", false).filter(|exp| !exp.is_empty()) {
                el.else_if = Some(exp);
            }
        }
    }
}

/// Resolves `v-once`.
pub fn process_once(el: &mut Element) {
    if get_and_remove_attr(el, "v-once", false).is_some() {
        el.once = true;
    }
}

/// Appends a branch to the condition chain of `el`.
pub fn add_if_condition(el: &mut Element, exp: Option<String>, block: NodeId) {
    el.if_conditions.push(IfCondition { exp, block });
}

/// Whether `el` or one of its ancestors carries `v-for`.
fn check_in_for(ast: &Ast, el: &Element) -> bool {
    el.for_info.is_some()
        || el.parent.is_some_and(|parent| {
            ast.ancestors_inclusive(parent)
                .any(|id| ast.element(id).is_some_and(|el| el.for_info.is_some()))
        })
}

impl ParseContext<'_> {
    /// Resolves `v-for`, reporting expressions without `in`/`of`.
    pub fn process_for(&mut self, el: &mut Element) {
        let Some(exp) = get_and_remove_attr(el, "v-for", false).filter(|exp| !exp.is_empty()) else {
            return;
        };
        match parse_for(&exp) {
            Some(info) => el.for_info = Some(info),
            None => self.warn(ErrorKind::InvalidFor { expression: exp }, el.attr_span("v-for")),
        }
    }

    /// Resolves everything left on element `id` once its children are known.
    pub fn process_element(&mut self, ast: &mut Ast, id: NodeId) {
        let Some(slot) = ast.element_mut(id) else {
            return;
        };
        let mut el = std::mem::take(slot);
        self.resolve_element(ast, id, &mut el);
        if let Some(slot) = ast.element_mut(id) {
            *slot = el;
        }
    }

    fn resolve_element(&mut self, ast: &mut Ast, id: NodeId, el: &mut Element) {
        self.process_key(ast, el);
        el.plain = el.key.is_none() && el.scoped_slots.is_empty() && el.attrs_list.is_empty();
        if let Some(r) = get_binding_attr(el, "ref", true).filter(|r| !r.is_empty()) {
            el.ref_ = Some(r);
            el.ref_in_for = check_in_for(ast, el);
        }
        self.process_slot_content(ast, id, el);
        self.process_slot_outlet(el);
        if let Some(component) = get_binding_attr(el, "is", true).filter(|c| !c.is_empty()) {
            el.component = Some(component);
        }
        if get_and_remove_attr(el, "inline-template", false).is_some() {
            el.inline_template = true;
        }
        let options = self.options;
        for module in &options.modules {
            module.transform_node(self, el);
        }
        self.process_attrs(ast, el);
    }

    fn process_key(&mut self, ast: &Ast, el: &mut Element) {
        let Some(exp) = get_binding_attr(el, "key", true).filter(|exp| !exp.is_empty()) else {
            return;
        };
        let span = raw_binding_attr(el, "key").map(|attr| attr.span);
        if el.tag == "template" {
            self.warn(ErrorKind::KeyedTemplate, span);
        }
        if let Some(info) = &el.for_info {
            let iterator = info.iterator2.as_ref().or(info.iterator1.as_ref());
            let in_transition_group = el
                .parent
                .and_then(|parent| ast.element(parent))
                .is_some_and(|parent| parent.tag == "transition-group");
            if iterator == Some(&exp) && in_transition_group {
                self.tip(ErrorKind::IndexAsKey, span);
            }
        }
        el.key = Some(exp);
    }

    fn process_slot_content(&mut self, ast: &mut Ast, id: NodeId, el: &mut Element) {
        if el.tag == "template" {
            let scope = get_and_remove_attr(el, "scope", false).filter(|s| !s.is_empty());
            if scope.is_some() {
                self.tip(ErrorKind::DeprecatedScope, el.attr_span("scope"));
            }
            el.slot_scope = scope.or_else(|| {
                get_and_remove_attr(el, "slot-scope", false).filter(|s| !s.is_empty())
            });
        } else if let Some(scope) = get_and_remove_attr(el, "slot-scope", false).filter(|s| !s.is_empty()) {
            if el.attr("v-for").is_some_and(|v| !v.is_empty()) {
                self.tip(
                    ErrorKind::SlotScopeWithFor {
                        tag: el.tag.to_string(),
                    },
                    el.attr_span("slot-scope"),
                );
            }
            el.slot_scope = Some(scope);
        }

        if let Some(target) = get_binding_attr(el, "slot", true).filter(|t| !t.is_empty()) {
            el.slot_target = Some(if target == "\"\"" {
                "\"default\"".to_string()
            } else {
                target.clone()
            });
            el.slot_target_dynamic = [":slot", "v-bind:slot"]
                .iter()
                .any(|name| el.attr(name).is_some_and(|v| !v.is_empty()));
            if el.tag != "template" && el.slot_scope.is_none() {
                let span = raw_binding_attr(el, "slot").map(|attr| attr.span);
                add_attr(el, "slot", target, span, false);
            }
        }

        let Some(binding) = get_and_remove_attr_by_regex(el, &SLOT_RE) else {
            return;
        };
        let scope = if binding.value.is_empty() {
            EMPTY_SLOT_SCOPE_TOKEN.to_string()
        } else {
            binding.value.clone()
        };

        if el.tag == "template" {
            if el.slot_target.is_some() || el.slot_scope.is_some() {
                self.warn(ErrorKind::MixedSlotSyntax, Some(el.span));
            }
            let parent_is_component = el
                .parent
                .and_then(|parent| ast.element(parent))
                .map_or(true, |parent| self.maybe_component(parent));
            if !parent_is_component {
                self.warn(ErrorKind::MisplacedSlotTemplate, Some(el.span));
            }
            let (name, dynamic) = self.slot_name(&binding.name, binding.span);
            el.slot_target = Some(name);
            el.slot_target_dynamic = dynamic;
            el.slot_scope = Some(scope);
            return;
        }

        if !self.maybe_component(el) {
            self.warn(ErrorKind::SlotOnElement, Some(binding.span));
        }
        if el.slot_scope.is_some() || el.slot_target.is_some() {
            self.warn(ErrorKind::MixedSlotSyntax, Some(el.span));
        }
        if !el.scoped_slots.is_empty() {
            self.warn(ErrorKind::AmbiguousDefaultSlot, Some(binding.span));
        }

        let (name, dynamic) = self.slot_name(&binding.name, binding.span);
        let container = ast.create_element("template", Vec::new(), Some(id));
        let moved: Vec<NodeId> = el
            .children
            .iter()
            .copied()
            .filter(|&child| !is_scoped_slot(ast, child))
            .collect();
        for &child in &moved {
            if let Some(child) = ast.element_mut(child) {
                child.parent = Some(container);
            }
        }
        if let Some(template) = ast.element_mut(container) {
            template.slot_target = Some(name.clone());
            template.slot_target_dynamic = dynamic;
            template.slot_scope = Some(scope);
            template.children = moved;
            template.span = el.span;
        }
        el.scoped_slots.insert(name, container);
        el.children.clear();
        el.plain = false;
    }

    /// Returns the slot name expression of a `v-slot` attribute and whether
    /// it is dynamic.
    fn slot_name(&mut self, attr_name: &str, span: Span) -> (String, bool) {
        let mut name = SLOT_RE.replace(attr_name, "").into_owned();
        if name.is_empty() {
            if attr_name.starts_with('#') {
                self.warn(ErrorKind::MissingSlotName, Some(span));
            } else {
                name = "default".to_string();
            }
        }
        match dynamic_arg(&name) {
            Some(inner) => (inner.to_string(), true),
            None => (format!("\"{name}\""), false),
        }
    }

    fn process_slot_outlet(&mut self, el: &mut Element) {
        if el.tag != "slot" {
            return;
        }
        el.slot_name = Some(get_binding_attr(el, "name", true));
        if el.key.is_some() {
            let span = raw_binding_attr(el, "key").map(|attr| attr.span);
            self.warn(ErrorKind::KeyedSlot, span);
        }
    }

    fn process_attrs(&mut self, ast: &Ast, el: &mut Element) {
        let list = el.attrs_list.clone();
        for raw in &list {
            let span = Some(raw.span);
            if strip_directive_prefix(&raw.name).is_none() {
                self.plain_attr(el, &raw.name, &raw.value, raw.span);
                continue;
            }

            el.has_bindings = true;
            let (name, modifiers) = parse_modifiers(&raw.name);

            if let Some(bound) = name.strip_prefix(':').or_else(|| name.strip_prefix("v-bind:")) {
                self.bind_attr(el, bound, &raw.value, modifiers.as_ref(), span);
            } else if let Some(event) = name.strip_prefix('@').or_else(|| name.strip_prefix("v-on:")) {
                let (event, dynamic) = match dynamic_arg(event) {
                    Some(inner) => (inner, true),
                    None => (event, false),
                };
                let spec = EventSpec {
                    name: event.to_string(),
                    value: raw.value.clone(),
                    modifiers,
                    important: false,
                    dynamic,
                    span,
                };
                add_handler(el, spec, &mut self.diagnostics);
            } else {
                let name = strip_directive_prefix(&name).unwrap_or(&name);
                let (name, arg) = match name.split_once(':') {
                    Some((name, arg)) if !arg.is_empty() => (name, Some(arg)),
                    _ => (name, None),
                };
                let (arg, is_dynamic_arg) = match arg.map(|arg| (arg, dynamic_arg(arg))) {
                    Some((_, Some(inner))) => (Some(inner.to_string()), true),
                    Some((arg, None)) => (Some(arg.to_string()), false),
                    None => (None, false),
                };
                add_directive(
                    el,
                    Directive {
                        name: SmolStr::new(name),
                        raw_name: raw.name.clone(),
                        value: raw.value.clone(),
                        arg,
                        is_dynamic_arg,
                        modifiers,
                        span,
                    },
                );
                if name == "model" {
                    self.check_for_alias_model(ast, el, &raw.value);
                }
            }
        }
    }

    fn bind_attr(&mut self, el: &mut Element, name: &str, raw_value: &str, modifiers: Option<&Modifiers>, span: Option<Span>) {
        let value = parse_filters(raw_value);
        let (mut name, dynamic) = match dynamic_arg(name) {
            Some(inner) => (inner.to_string(), true),
            None => (name.to_string(), false),
        };
        if value.trim().is_empty() {
            self.warn(ErrorKind::EmptyBinding { name: name.clone() }, span);
        }

        let has = |modifier: &str| modifiers.is_some_and(|mods| mods.contains(modifier));
        if has("prop") && !dynamic {
            name = camelize(&name);
            if name == "innerHtml" {
                name = "innerHTML".to_string();
            }
        }
        if has("camel") && !dynamic {
            name = camelize(&name);
        }
        if has("sync") {
            let assignment = gen_assignment_code(&value, "$event");
            if dynamic {
                let spec = EventSpec {
                    dynamic: true,
                    span,
                    ..EventSpec::new(format!("\"update:\"+({name})"), assignment)
                };
                add_handler(el, spec, &mut self.diagnostics);
            } else {
                let camel = camelize(&name);
                let hyphen = hyphenate(&name);
                let spec = EventSpec {
                    span,
                    ..EventSpec::new(format!("update:{camel}"), assignment.clone())
                };
                add_handler(el, spec, &mut self.diagnostics);
                if hyphen != camel {
                    let spec = EventSpec {
                        span,
                        ..EventSpec::new(format!("update:{hyphen}"), assignment)
                    };
                    add_handler(el, spec, &mut self.diagnostics);
                }
            }
        }

        if has("prop") || (el.component.is_none() && self.must_use_prop(el, &name)) {
            add_prop(el, name, value, span, dynamic);
        } else {
            add_attr(el, name, value, span, dynamic);
        }
    }

    fn plain_attr(&mut self, el: &mut Element, name: &str, value: &str, span: Span) {
        if parse_text(value, self.delimiters()).is_some() {
            self.warn(
                ErrorKind::InterpolationInAttribute {
                    name: name.to_string(),
                    value: value.to_string(),
                },
                Some(span),
            );
        }
        add_attr(el, name, stringify(value), Some(span), false);
        if el.component.is_none() && name == "muted" && self.must_use_prop(el, name) {
            add_prop(el, name, "true", Some(span), false);
        }
    }

    fn check_for_alias_model(&mut self, ast: &Ast, el: &Element, value: &str) {
        let ancestors = el
            .parent
            .into_iter()
            .flat_map(|parent| ast.ancestors_inclusive(parent))
            .filter_map(|id| ast.element(id));
        for candidate in std::iter::once(el).chain(ancestors) {
            if candidate.for_info.as_ref().is_some_and(|info| info.alias == value) {
                self.warn(
                    ErrorKind::ModelOnForAlias {
                        tag: el.tag.to_string(),
                        value: value.to_string(),
                    },
                    el.attr_span("v-model"),
                );
            }
        }
    }
}

/// Whether `id` is an element that declares a slot scope.
pub(crate) fn is_scoped_slot(ast: &Ast, id: NodeId) -> bool {
    matches!(ast.get(id), Some(Node::Element(el)) if el.slot_scope.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_for() {
        assert_eq!(
            parse_for("item in items"),
            Some(ForInfo {
                source: "items".into(),
                alias: "item".into(),
                iterator1: None,
                iterator2: None,
            })
        );
        assert_eq!(
            parse_for("(value, key, index) of object"),
            Some(ForInfo {
                source: "object".into(),
                alias: "value".into(),
                iterator1: Some("key".into()),
                iterator2: Some("index".into()),
            })
        );
        assert_eq!(
            parse_for("{ a, b } in list"),
            Some(ForInfo {
                source: "list".into(),
                alias: "{ a, b }".into(),
                iterator1: None,
                iterator2: None,
            })
        );
        assert_eq!(parse_for("items"), None);
    }

    #[test]
    fn test_parse_modifiers() {
        let (name, modifiers) = parse_modifiers("@click.stop.prevent");
        assert_eq!(name, "@click");
        let modifiers: Vec<_> = modifiers.unwrap().into_iter().collect();
        assert_eq!(modifiers, vec!["stop", "prevent"]);

        let (name, modifiers) = parse_modifiers(":[a.b].sync");
        assert_eq!(name, ":[a.b]");
        assert!(modifiers.unwrap().contains("sync"));

        assert_eq!(parse_modifiers("v-model"), ("v-model".to_string(), None));
    }
}
