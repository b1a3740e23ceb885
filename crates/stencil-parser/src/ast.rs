//! AST types for templates.
//!
//! Nodes live in an [`Ast`] arena and refer to each other by [`NodeId`].
//! Parents are plain ids, so a tree can be walked upwards without shared
//! ownership.

use std::ops::Index;

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;
use stencil_span::Span;

use crate::text::TextExpression;

/// Index of a node inside an [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(u32);

impl NodeId {
    /// Returns the arena slot of this node.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owning storage for every node produced while parsing one template.
///
/// Nodes that were dropped from the tree (for example text between `v-if`
/// branches) stay allocated but are no longer reachable from [`Ast::root`].
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    /// The root element, or `None` when the template produced no element.
    pub root: Option<NodeId>,
}

impl Ast {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `node` and returns its id.
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Allocates a new element.
    pub fn create_element(
        &mut self,
        tag: impl Into<SmolStr>,
        attrs: Vec<RawAttr>,
        parent: Option<NodeId>,
    ) -> NodeId {
        self.push(Node::Element(Element::new(tag, attrs, parent)))
    }

    /// Returns the node with the given id.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Returns the node with the given id mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Returns the element with the given id.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.get(id).and_then(Node::as_element)
    }

    /// Returns the element with the given id mutably.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Returns the root element.
    pub fn root_element(&self) -> Option<&Element> {
        self.root.and_then(|root| self.element(root))
    }

    /// Number of allocated nodes, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no node was allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of an element; empty for text and comments.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.element(id).map_or(&[], |el| el.children.as_slice())
    }

    /// Parent element of an element.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.element(id).and_then(|el| el.parent)
    }

    /// Iterates over `id` and then each of its ancestors.
    pub fn ancestors_inclusive(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&current| self.parent(current))
    }

    /// Returns every node reachable from `id` in document order, including
    /// the blocks of condition chains.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            out.push(current);
            if let Some(el) = self.element(current) {
                let branches = el.if_conditions.iter().skip(1).map(|c| c.block);
                let nested: Vec<NodeId> = el.children.iter().copied().chain(branches).collect();
                pending.extend(nested.into_iter().rev());
            }
        }
        out
    }

    /// Iterates over every allocated node.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index as u32), node))
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

/// A node of the template tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A tag and everything resolved from its attributes.
    Element(Element),
    /// Literal or interpolated text.
    Text(Text),
    /// An HTML comment, kept only when requested.
    Comment(Comment),
}

impl Node {
    /// Returns the element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Returns the element mutably, if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The text of a text or comment node.
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Element(_) => None,
            Node::Text(text) => Some(&text.text),
            Node::Comment(comment) => Some(&comment.text),
        }
    }

    /// The source span of the node.
    pub fn span(&self) -> Span {
        match self {
            Node::Element(el) => el.span,
            Node::Text(text) => text.span,
            Node::Comment(comment) => comment.span,
        }
    }

    /// Whether the node renders the same output on every render.
    ///
    /// Elements report what the optimizer marked; interpolated text is never
    /// static.
    pub fn is_static(&self) -> bool {
        match self {
            Node::Element(el) => el.is_static,
            Node::Text(text) => text.expression.is_none(),
            Node::Comment(_) => true,
        }
    }
}

/// A text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// The decoded text.
    pub text: String,
    /// The interpolation expression, when the text contains interpolations.
    pub expression: Option<TextExpression>,
    /// Source span.
    pub span: Span,
}

/// A comment node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// The comment body without `<!--` and `-->`.
    pub text: String,
    /// Source span.
    pub span: Span,
}

/// An attribute exactly as it appeared in the start tag, entity-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawAttr {
    /// The attribute name including any directive prefix and modifiers.
    pub name: String,
    /// The value, empty when the attribute had none.
    pub value: String,
    /// Source span of the whole attribute.
    pub span: Span,
}

/// A resolved attribute or DOM property binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// The attribute name, or the name expression when `dynamic`.
    pub name: String,
    /// A JavaScript expression for the value.
    pub value: String,
    /// Whether `name` is an expression evaluated at render time.
    pub dynamic: bool,
    /// Source span.
    pub span: Option<Span>,
}

/// The set of `.modifier` suffixes of a directive or event.
pub type Modifiers = IndexSet<SmolStr>;

/// A generic directive (`v-name:arg.mod="value"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The directive name without `v-`.
    pub name: SmolStr,
    /// The attribute name as written.
    pub raw_name: String,
    /// The directive expression.
    pub value: String,
    /// The argument, or its expression when `is_dynamic_arg`.
    pub arg: Option<String>,
    /// Whether the argument was written as `[expr]`.
    pub is_dynamic_arg: bool,
    /// Modifiers, `None` when none were written.
    pub modifiers: Option<Modifiers>,
    /// Source span.
    pub span: Option<Span>,
}

/// One event handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handler {
    /// The handler expression or statement.
    pub value: String,
    /// Whether the event name is an expression.
    pub dynamic: bool,
    /// Modifiers left after the name-changing ones were applied.
    pub modifiers: Option<Modifiers>,
    /// Source span.
    pub span: Option<Span>,
}

/// The parts of a `v-for` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForInfo {
    /// The iterated expression.
    pub source: String,
    /// The item alias.
    pub alias: String,
    /// The key or index alias.
    pub iterator1: Option<String>,
    /// The index alias when iterating over an object.
    pub iterator2: Option<String>,
}

/// One branch of a condition chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfCondition {
    /// The condition, `None` for the `v-else` branch.
    pub exp: Option<String>,
    /// The element rendered for this branch.
    pub block: NodeId,
}

/// Component `v-model` data produced during code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBinding {
    /// The bound value expression.
    pub value: String,
    /// The source expression as a string literal.
    pub expression: String,
    /// The update callback.
    pub callback: String,
}

/// Object spread from `v-bind="obj"`, applied around the data object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindObject {
    /// The object expression.
    pub value: String,
    /// Whether `.prop` was given.
    pub prop: bool,
    /// Whether `.sync` was given.
    pub sync: bool,
}

/// An element and everything its attributes resolved to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: SmolStr,
    pub ns: Option<SmolStr>,
    /// Attributes not yet consumed by a resolver, in source order.
    pub attrs_list: Vec<RawAttr>,
    /// Every attribute by name, including consumed ones.
    pub attrs_map: IndexMap<String, String>,
    pub raw_attrs_map: IndexMap<String, RawAttr>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub span: Span,

    pub attrs: Vec<Attr>,
    pub dynamic_attrs: Vec<Attr>,
    pub props: Vec<Attr>,
    pub directives: Vec<Directive>,
    pub events: IndexMap<String, Vec<Handler>>,
    pub native_events: IndexMap<String, Vec<Handler>>,
    pub has_bindings: bool,

    pub for_info: Option<ForInfo>,
    pub if_exp: Option<String>,
    pub else_if: Option<String>,
    pub is_else: bool,
    pub if_conditions: Vec<IfCondition>,
    pub once: bool,

    pub key: Option<String>,
    pub ref_: Option<String>,
    pub ref_in_for: bool,

    pub slot_target: Option<String>,
    pub slot_target_dynamic: bool,
    pub slot_scope: Option<String>,
    /// Name expression of a `<slot>` outlet; `Some` only on `<slot>`.
    pub slot_name: Option<Option<String>>,
    pub scoped_slots: IndexMap<String, NodeId>,

    pub component: Option<String>,
    pub inline_template: bool,

    /// Per-module data such as `staticClass` or `styleBinding`.
    pub module_data: IndexMap<SmolStr, String>,
    pub model: Option<ModelBinding>,
    pub wrap_data: Option<BindObject>,
    pub wrap_listeners: Option<String>,

    pub plain: bool,
    pub pre: bool,
    pub processed: bool,
    pub forbidden: bool,

    pub is_static: bool,
    pub static_root: bool,
    pub static_in_for: bool,
}

impl Element {
    /// Creates an element from its start-tag attributes.
    pub fn new(tag: impl Into<SmolStr>, attrs: Vec<RawAttr>, parent: Option<NodeId>) -> Self {
        let mut attrs_map = IndexMap::with_capacity(attrs.len());
        let mut raw_attrs_map = IndexMap::with_capacity(attrs.len());
        for attr in &attrs {
            attrs_map.insert(attr.name.clone(), attr.value.clone());
            raw_attrs_map.insert(attr.name.clone(), attr.clone());
        }
        Self {
            tag: tag.into(),
            attrs_list: attrs,
            attrs_map,
            raw_attrs_map,
            parent,
            ..Self::default()
        }
    }

    /// Returns the value of an attribute as written, consumed or not.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs_map.get(name).map(String::as_str)
    }

    /// Returns true if the attribute was written on the element.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs_map.contains_key(name)
    }

    /// Span of a raw attribute, for diagnostics.
    pub fn attr_span(&self, name: &str) -> Option<Span> {
        self.raw_attrs_map.get(name).map(|attr| attr.span)
    }

    /// Whether the element has a condition of its own (`v-if`).
    pub fn has_if(&self) -> bool {
        self.if_exp.is_some()
    }

    /// Names of every piece of data the element carries besides its tag,
    /// attributes and children.
    ///
    /// The optimizer compares this list against the static keys.
    pub fn data_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        let flags: [(&'static str, bool); 27] = [
            ("ns", self.ns.is_some()),
            ("key", self.key.is_some()),
            ("ref", self.ref_.is_some()),
            ("refInFor", self.ref_in_for),
            ("for", self.for_info.is_some()),
            ("if", self.if_exp.is_some()),
            ("elseif", self.else_if.is_some()),
            ("else", self.is_else),
            ("ifConditions", !self.if_conditions.is_empty()),
            ("once", self.once),
            ("pre", self.pre),
            ("processed", self.processed),
            ("forbidden", self.forbidden),
            ("hasBindings", self.has_bindings),
            ("props", !self.props.is_empty()),
            ("dynamicAttrs", !self.dynamic_attrs.is_empty()),
            ("directives", !self.directives.is_empty()),
            ("events", !self.events.is_empty()),
            ("nativeEvents", !self.native_events.is_empty()),
            ("slotTarget", self.slot_target.is_some()),
            ("slotScope", self.slot_scope.is_some()),
            ("slotName", self.slot_name.is_some()),
            ("scopedSlots", !self.scoped_slots.is_empty()),
            ("component", self.component.is_some()),
            ("inlineTemplate", self.inline_template),
            ("model", self.model.is_some()),
            ("wrapData", self.wrap_data.is_some() || self.wrap_listeners.is_some()),
        ];
        keys.extend(flags.iter().filter(|(_, present)| *present).map(|(key, _)| *key));
        keys.extend(self.module_data.keys().map(SmolStr::as_str));
        keys
    }
}
