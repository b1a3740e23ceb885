//! The tree builder.
//!
//! [`parse`] drives the tokenizer and turns its events into an [`Ast`]:
//! elements are pushed on a stack while open and resolved when they close,
//! condition chains are linked, whitespace is normalized and text is split
//! into interpolations.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use stencil_span::Span;

use crate::ast::{Ast, Comment, Element, Node, NodeId, RawAttr, Text};
use crate::context::ParseContext;
use crate::entities::decode_text;
use crate::error::{CompilerError, ErrorKind};
use crate::options::{ParserOptions, WhitespaceMode};
use crate::process::{add_if_condition, is_scoped_slot, process_if, process_once, process_pre, process_raw_attrs};
use crate::scanner::{scan, ScanHandler, ScanOptions};
use crate::text::parse_text;
use crate::util::is_blank;

static INVALID_ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\s"'<>/=]"#).unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// The tree and diagnostics of one parse.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// The node arena; `ast.root` is `None` when no element was found.
    pub ast: Ast,
    /// Problems with the template.
    pub errors: Vec<CompilerError>,
    /// Advice that does not affect the output.
    pub tips: Vec<CompilerError>,
}

/// Parses `template` into an AST.
///
/// Never fails: problems are reported in [`ParseResult::errors`] and the
/// tree is built from whatever could be recovered.
pub fn parse(template: &str, options: &ParserOptions) -> ParseResult {
    log::debug!("parsing template ({} bytes)", template.len());
    let mut builder = TreeBuilder {
        template,
        cx: ParseContext::new(options),
        ast: Ast::new(),
        stack: Vec::new(),
        current_parent: None,
        in_v_pre: false,
        in_pre: false,
    };
    let scan_options = ScanOptions {
        platform: options.platform.as_ref(),
        expect_html: options.expect_html,
        should_decode_newlines: options.should_decode_newlines,
        should_decode_newlines_for_href: options.should_decode_newlines_for_href,
        keep_comments: options.comments,
    };
    scan(template, &scan_options, &mut builder);

    let diagnostics = builder.cx.diagnostics;
    ParseResult {
        ast: builder.ast,
        errors: diagnostics.errors,
        tips: diagnostics.tips,
    }
}

struct TreeBuilder<'t, 'o> {
    template: &'t str,
    cx: ParseContext<'o>,
    ast: Ast,
    stack: Vec<NodeId>,
    current_parent: Option<NodeId>,
    in_v_pre: bool,
    in_pre: bool,
}

fn is_forbidden_tag(el: &Element) -> bool {
    el.tag == "style"
        || (el.tag == "script" && el.attr("type").map_or(true, |ty| ty.is_empty() || ty == "text/javascript"))
}

fn is_text_tag(el: &Element) -> bool {
    el.tag == "script" || el.tag == "style"
}

impl TreeBuilder<'_, '_> {
    fn check_attribute_names(&mut self, attrs: &[RawAttr]) {
        let mut seen = IndexSet::with_capacity(attrs.len());
        for attr in attrs {
            if !seen.insert(attr.name.as_str()) {
                self.cx.warn(
                    ErrorKind::DuplicateAttribute {
                        name: attr.name.clone(),
                    },
                    Some(attr.span),
                );
            }
            if INVALID_ATTRIBUTE_RE.is_match(&attr.name) {
                let start = attr.span.range().start + attr.name.find('[').unwrap_or(0);
                let end = attr.span.range().start + attr.name.len();
                self.cx
                    .warn(ErrorKind::InvalidAttributeName, Some(Span::at(start, end)));
            }
        }
    }

    fn check_root_constraints(&mut self, id: NodeId) {
        let Some(el) = self.ast.element(id) else {
            return;
        };
        let fragment = (el.tag == "slot" || el.tag == "template").then(|| (el.tag.to_string(), el.span));
        let for_span = el.has_attr("v-for").then(|| el.attr_span("v-for"));
        if let Some((tag, span)) = fragment {
            self.cx
                .warn_once(ErrorKind::FragmentRoot { tag }, Some(Span::empty(span.range().start)));
        }
        if let Some(span) = for_span {
            self.cx.warn_once(ErrorKind::ForOnRoot, span);
        }
    }

    fn trim_ending_whitespace(&mut self, id: NodeId) {
        if self.in_pre {
            return;
        }
        loop {
            let Some(&last) = self.ast.children(id).last() else {
                return;
            };
            let is_space = matches!(self.ast.get(last), Some(Node::Text(text)) if text.text == " ");
            if !is_space {
                return;
            }
            if let Some(el) = self.ast.element_mut(id) {
                el.children.pop();
            }
        }
    }

    fn close_element(&mut self, id: NodeId) {
        self.trim_ending_whitespace(id);
        let processed = self.ast.element(id).map_or(true, |el| el.processed);
        if !self.in_v_pre && !processed {
            self.cx.process_element(&mut self.ast, id);
        }

        let Some(el) = self.ast.element(id) else {
            return;
        };
        let is_branch = el.else_if.is_some() || el.is_else;
        let else_if = el.else_if.clone();
        let forbidden = el.forbidden;
        let span = el.span;
        let scoped_slot_name = el
            .slot_scope
            .as_ref()
            .map(|_| el.slot_target.clone().unwrap_or_else(|| "\"default\"".to_string()));

        if self.stack.is_empty() && self.ast.root != Some(id) {
            let root = self.ast.root.filter(|&root| {
                is_branch && self.ast.element(root).is_some_and(Element::has_if)
            });
            match root.and_then(|root| self.ast.element_mut(root)) {
                Some(root) => {
                    add_if_condition(root, else_if, id);
                    self.check_root_constraints(id);
                }
                None => self
                    .cx
                    .warn_once(ErrorKind::MultipleRoots, Some(Span::empty(span.range().start))),
            }
        }

        if let Some(parent) = self.current_parent.filter(|_| !forbidden) {
            if is_branch {
                self.process_if_conditions(id, parent);
            } else {
                if let Some(name) = scoped_slot_name {
                    if let Some(parent) = self.ast.element_mut(parent) {
                        parent.scoped_slots.insert(name, id);
                    }
                }
                if let Some(parent_el) = self.ast.element_mut(parent) {
                    parent_el.children.push(id);
                }
                if let Some(el) = self.ast.element_mut(id) {
                    el.parent = Some(parent);
                }
            }
        }

        let children: Vec<NodeId> = self
            .ast
            .children(id)
            .iter()
            .copied()
            .filter(|&child| !is_scoped_slot(&self.ast, child))
            .collect();
        if let Some(el) = self.ast.element_mut(id) {
            el.children = children;
        }
        self.trim_ending_whitespace(id);

        let Some(el) = self.ast.element(id) else {
            return;
        };
        if el.pre {
            self.in_v_pre = false;
        }
        if self.cx.platform().is_pre_tag(&el.tag) {
            self.in_pre = false;
        }

        let options = self.cx.options;
        if options.modules.is_empty() {
            return;
        }
        if let Some(slot) = self.ast.element_mut(id) {
            let mut el = std::mem::take(slot);
            for module in &options.modules {
                module.post_transform_node(&mut self.cx, &mut el);
            }
            if let Some(slot) = self.ast.element_mut(id) {
                *slot = el;
            }
        }
    }

    /// Links a `v-else`/`v-else-if` element to the preceding `v-if`.
    fn process_if_conditions(&mut self, id: NodeId, parent: NodeId) {
        let prev = self.find_prev_element(parent);
        let Some(el) = self.ast.element(id) else {
            return;
        };
        let else_if = el.else_if.clone();
        let prev = prev.filter(|&prev| self.ast.element(prev).is_some_and(Element::has_if));
        if let Some(prev) = prev.and_then(|prev| self.ast.element_mut(prev)) {
            add_if_condition(prev, else_if, id);
            return;
        }

        let Some(el) = self.ast.element(id) else {
            return;
        };
        let (directive, attr) = match &el.else_if {
            Some(exp) => (format!("else-if=\"{exp}\""), "v-else-if"),
            None => ("else".to_string(), "v-else"),
        };
        let kind = ErrorKind::ElseWithoutIf {
            directive,
            tag: el.tag.to_string(),
        };
        let span = el.attr_span(attr);
        self.cx.warn(kind, span);
    }

    /// Finds the last element child of `parent`, dropping the text and
    /// comments after it.
    fn find_prev_element(&mut self, parent: NodeId) -> Option<NodeId> {
        loop {
            let &last = self.ast.children(parent).last()?;
            match self.ast.get(last) {
                Some(Node::Element(_)) => return Some(last),
                Some(node) => {
                    if let Some(text) = node.text().filter(|text| *text != " ") {
                        let kind = ErrorKind::TextBetweenBranches {
                            text: text.trim().to_string(),
                        };
                        let span = node.span();
                        self.cx.warn(kind, Some(span));
                    }
                }
                None => {}
            }
            if let Some(parent) = self.ast.element_mut(parent) {
                parent.children.pop();
            }
        }
    }

    fn push_child(&mut self, parent: NodeId, node: Node) {
        let id = self.ast.push(node);
        if let Some(parent) = self.ast.element_mut(parent) {
            parent.children.push(id);
        }
    }
}

impl ScanHandler for TreeBuilder<'_, '_> {
    fn start(&mut self, tag: &str, attrs: Vec<RawAttr>, unary: bool, span: Span) {
        let options = self.cx.options;
        let platform = self.cx.platform();
        let ns = self
            .current_parent
            .and_then(|parent| self.ast.element(parent))
            .and_then(|parent| parent.ns.clone())
            .or_else(|| platform.tag_namespace(tag).map(Into::into));

        self.check_attribute_names(&attrs);

        let mut id = self.ast.create_element(tag, attrs, self.current_parent);
        if let Some(el) = self.ast.element_mut(id) {
            el.ns = ns;
            el.span = span;
            if is_forbidden_tag(el) {
                el.forbidden = true;
                self.cx.warn(
                    ErrorKind::ForbiddenTag { tag: tag.to_string() },
                    Some(Span::empty(span.range().start)),
                );
            }
        }

        for module in &options.modules {
            if let Some(replacement) = module.pre_transform_node(&mut self.cx, &mut self.ast, id) {
                id = replacement;
            }
        }

        let in_v_pre = self.in_v_pre;
        let Some(el) = self.ast.element_mut(id) else {
            return;
        };
        if !in_v_pre {
            process_pre(el);
            if el.pre {
                self.in_v_pre = true;
            }
        }
        if platform.is_pre_tag(&el.tag) {
            self.in_pre = true;
        }
        if self.in_v_pre {
            process_raw_attrs(el);
        } else if !el.processed {
            self.cx.process_for(el);
            process_if(el, id);
            process_once(el);
        }

        if self.ast.root.is_none() {
            self.ast.root = Some(id);
            self.check_root_constraints(id);
        }

        if unary {
            self.close_element(id);
        } else {
            self.current_parent = Some(id);
            self.stack.push(id);
        }
    }

    fn end(&mut self, _tag: &str, span: Span) {
        let Some(id) = self.stack.pop() else {
            return;
        };
        self.current_parent = self.stack.last().copied();
        if let Some(el) = self.ast.element_mut(id) {
            el.span = Span::new(el.span.start, span.end);
        }
        self.close_element(id);
    }

    fn chars(&mut self, text: &str, span: Span) {
        let Some(parent) = self.current_parent else {
            if text == self.template {
                self.cx
                    .warn_once(ErrorKind::TextOnlyTemplate, Some(Span::empty(span.range().start)));
            } else if !is_blank(text) {
                let kind = ErrorKind::TextOutsideRoot {
                    text: text.trim().to_string(),
                };
                self.cx.warn_once(kind, Some(Span::empty(span.range().start)));
            }
            return;
        };
        let Some(parent_el) = self.ast.element(parent) else {
            return;
        };

        let options = self.cx.options;
        let no_children = parent_el.children.is_empty();
        let text = if self.in_pre || !is_blank(text) {
            if is_text_tag(parent_el) {
                text.to_string()
            } else {
                decode_text(text).into_owned()
            }
        } else if no_children {
            return;
        } else {
            let keep = match options.whitespace {
                Some(WhitespaceMode::Condense) => !text.contains(['\r', '\n']),
                Some(WhitespaceMode::Preserve) => true,
                None => options.preserve_whitespace,
            };
            if !keep {
                return;
            }
            " ".to_string()
        };

        let text = if !self.in_pre && options.whitespace == Some(WhitespaceMode::Condense) {
            WHITESPACE_RE.replace_all(&text, " ").into_owned()
        } else {
            text
        };

        let expression = if !self.in_v_pre && text != " " {
            parse_text(&text, self.cx.delimiters())
        } else {
            None
        };
        if expression.is_none() && text == " " && !no_children {
            let last_is_space = parent_el
                .children
                .last()
                .and_then(|&last| self.ast.get(last))
                .and_then(Node::text)
                == Some(" ");
            if last_is_space {
                return;
            }
        }
        self.push_child(parent, Node::Text(Text { text, expression, span }));
    }

    fn comment(&mut self, text: &str, span: Span) {
        if let Some(parent) = self.current_parent {
            let node = Node::Comment(Comment {
                text: text.to_string(),
                span,
            });
            self.push_child(parent, node);
        }
    }

    fn warn(&mut self, kind: ErrorKind, span: Option<Span>) {
        self.cx.warn(kind, span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_default(template: &str) -> ParseResult {
        parse(template, &ParserOptions::default())
    }

    fn root(result: &ParseResult) -> &Element {
        result.ast.root_element().unwrap()
    }

    fn child_texts(result: &ParseResult, id: NodeId) -> Vec<String> {
        result
            .ast
            .children(id)
            .iter()
            .map(|&child| match &result.ast[child] {
                Node::Element(el) => format!("<{}>", el.tag),
                node => node.text().unwrap_or_default().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_simple_tree() {
        let result = parse_default("<div><p>a</p> <span>b</span></div>");
        assert!(result.errors.is_empty());
        let root_id = result.ast.root.unwrap();
        assert_eq!(child_texts(&result, root_id), vec!["<p>", " ", "<span>"]);
        let p = result.ast.children(root_id)[0];
        assert_eq!(result.ast.parent(p), Some(root_id));
    }

    #[test]
    fn test_if_chain_with_three_branches() {
        let result = parse_default(
            r#"<div><p v-if="a">1</p><p v-else-if="b">2</p><p v-else>3</p></div>"#,
        );
        assert!(result.errors.is_empty());
        let root_id = result.ast.root.unwrap();
        let children = result.ast.children(root_id);
        assert_eq!(children.len(), 1);
        let first = result.ast.element(children[0]).unwrap();
        let exps: Vec<_> = first.if_conditions.iter().map(|c| c.exp.clone()).collect();
        assert_eq!(exps, vec![Some("a".into()), Some("b".into()), None]);
    }

    #[test]
    fn test_whitespace_between_branches_is_dropped() {
        let result = parse_default("<div><p v-if=\"a\"></p>\n  <p v-else></p></div>");
        assert!(result.errors.is_empty());
        assert_eq!(root(&result).children.len(), 1);
    }

    #[test]
    fn test_text_between_branches_warns() {
        let result = parse_default(r#"<div><p v-if="a"></p>x<p v-else></p></div>"#);
        assert_eq!(
            result.errors[0].kind,
            ErrorKind::TextBetweenBranches { text: "x".into() }
        );
    }

    #[test]
    fn test_else_without_if() {
        let result = parse_default(r#"<div><p v-else></p></div>"#);
        assert_eq!(
            result.errors[0].kind,
            ErrorKind::ElseWithoutIf {
                directive: "else".into(),
                tag: "p".into(),
            }
        );
        assert!(root(&result).children.is_empty());
    }

    #[test]
    fn test_root_level_else_chain() {
        let result = parse_default(r#"<div v-if="a"></div><span v-else></span>"#);
        assert!(result.errors.is_empty());
        assert_eq!(root(&result).if_conditions.len(), 2);
    }

    #[test]
    fn test_multiple_roots() {
        let result = parse_default("<div></div><span></span><p></p>");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::MultipleRoots);
    }

    #[test]
    fn test_text_only_template() {
        let result = parse_default("hello");
        assert_eq!(result.ast.root, None);
        assert_eq!(result.errors[0].kind, ErrorKind::TextOnlyTemplate);
    }

    #[test]
    fn test_root_constraints() {
        let result = parse_default(r#"<template><div></div></template>"#);
        assert_eq!(
            result.errors[0].kind,
            ErrorKind::FragmentRoot {
                tag: "template".into()
            }
        );
        let result = parse_default(r#"<div v-for="i in list"></div>"#);
        assert_eq!(result.errors[0].kind, ErrorKind::ForOnRoot);
    }

    #[test]
    fn test_forbidden_tags_are_not_attached() {
        let result = parse_default("<div><style>a{}</style><script type=\"text/x-template\"></script></div>");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(child_texts(&result, result.ast.root.unwrap()), vec!["<script>"]);
    }

    #[test]
    fn test_interpolated_text() {
        let result = parse_default("<p>Hello {{ name }}</p>");
        let child = root(&result).children[0];
        match &result.ast[child] {
            Node::Text(text) => {
                assert_eq!(
                    text.expression.as_ref().map(|e| e.expression.as_str()),
                    Some(r#""Hello "+_s(name)"#)
                );
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_condense_whitespace() {
        let options = ParserOptions::default().with_whitespace(WhitespaceMode::Condense);
        let result = parse(
            "<div><span>a</span>\n  <span>b</span> <i>c   d</i></div>",
            &options,
        );
        let root_id = result.ast.root.unwrap();
        assert_eq!(child_texts(&result, root_id), vec!["<span>", "<span>", " ", "<i>"]);
        let italic = result.ast.children(root_id)[3];
        assert_eq!(child_texts(&result, italic), vec!["c d"]);
    }

    #[test]
    fn test_v_pre_keeps_raw_attributes() {
        let result = parse_default(r#"<div v-pre><span :a="b">{{ raw }}</span></div>"#);
        let span = result.ast.children(result.ast.root.unwrap())[0];
        let el = result.ast.element(span).unwrap();
        assert_eq!(el.attrs[0].name, ":a");
        assert_eq!(el.attrs[0].value, "\"b\"");
        match &result.ast[el.children[0]] {
            Node::Text(text) => assert!(text.expression.is_none()),
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_directives_resolved() {
        let result = parse_default(
            r#"<div :id="a | b" @click.stop="go" v-custom:arg.mod="x" class="c" :[key]="v"></div>"#,
        );
        let el = root(&result);
        assert!(el.has_bindings);
        assert!(!el.plain);
        assert_eq!(el.attrs[0].name, "id");
        assert_eq!(el.attrs[0].value, "_f(\"b\")(a)");
        assert_eq!(el.attrs[1].value, "\"c\"");
        assert_eq!(el.dynamic_attrs[0].name, "key");
        assert!(el.events.contains_key("click"));
        let directive = &el.directives[0];
        assert_eq!(directive.name, "custom");
        assert_eq!(directive.arg.as_deref(), Some("arg"));
        assert!(directive.modifiers.as_ref().unwrap().contains("mod"));
    }

    #[test]
    fn test_sync_modifier_adds_update_handlers() {
        let result = parse_default(r#"<comp :foo-bar.sync="val"></comp>"#);
        let el = root(&result);
        let names: Vec<_> = el.events.keys().cloned().collect();
        assert_eq!(names, vec!["update:fooBar", "update:foo-bar"]);
        assert_eq!(el.events["update:fooBar"][0].value, "val=$event");
    }

    #[test]
    fn test_key_and_ref_in_for() {
        let result = parse_default(r#"<ul><li v-for="(item, i) in items" :key="item.id"><a ref="link"></a></li></ul>"#);
        let li = result.ast.children(result.ast.root.unwrap())[0];
        let li_el = result.ast.element(li).unwrap();
        assert_eq!(li_el.key.as_deref(), Some("item.id"));
        assert_eq!(li_el.for_info.as_ref().unwrap().iterator1.as_deref(), Some("i"));
        let a = result.ast.element(li_el.children[0]).unwrap();
        assert_eq!(a.ref_.as_deref(), Some("\"link\""));
        assert!(a.ref_in_for);
    }

    #[test]
    fn test_invalid_for() {
        let result = parse_default(r#"<div><p v-for="items"></p></div>"#);
        assert_eq!(
            result.errors[0].kind,
            ErrorKind::InvalidFor {
                expression: "items".into()
            }
        );
    }

    #[test]
    fn test_scoped_slot_template() {
        let result = parse_default(r#"<comp><template #item="{ x }">{{ x }}</template><p>d</p></comp>"#);
        let el = root(&result);
        assert_eq!(el.children.len(), 1);
        let slot = el.scoped_slots["\"item\""];
        let template = result.ast.element(slot).unwrap();
        assert_eq!(template.slot_scope.as_deref(), Some("{ x }"));
    }

    #[test]
    fn test_v_slot_on_component_creates_default_template() {
        let result = parse_default(r#"<comp v-slot="props"><span>{{ props.a }}</span></comp>"#);
        let el = root(&result);
        assert!(el.children.is_empty());
        let slot = el.scoped_slots["\"default\""];
        let template = result.ast.element(slot).unwrap();
        assert_eq!(template.slot_scope.as_deref(), Some("props"));
        assert_eq!(template.children.len(), 1);
        assert_eq!(result.ast.parent(template.children[0]), Some(slot));
    }

    #[test]
    fn test_interpolation_in_attribute() {
        let result = parse_default(r#"<div id="{{ a }}"></div>"#);
        assert!(matches!(
            result.errors[0].kind,
            ErrorKind::InterpolationInAttribute { .. }
        ));
    }

    #[test]
    fn test_model_on_for_alias() {
        let result = parse_default(r#"<div><input v-for="item in list" v-model="item" /></div>"#);
        assert!(matches!(result.errors[0].kind, ErrorKind::ModelOnForAlias { .. }));
    }

    #[test]
    fn test_comments_kept() {
        let options = ParserOptions::default().with_comments(true);
        let result = parse("<div><!-- note --></div>", &options);
        let child = root(&result).children[0];
        assert!(matches!(&result.ast[child], Node::Comment(c) if c.text == " note "));
    }

    #[test]
    fn test_duplicate_attribute() {
        let result = parse_default(r#"<div id="a" id="b"></div>"#);
        assert_eq!(
            result.errors[0].kind,
            ErrorKind::DuplicateAttribute { name: "id".into() }
        );
    }
}
