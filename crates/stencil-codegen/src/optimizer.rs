//! Static subtree detection.
//!
//! The optimizer walks the tree twice. The first pass marks every node whose
//! output never changes between renders; the second pass picks the static
//! subtrees large enough to be hoisted into their own render function, so the
//! runtime can reuse them and skip them while patching.

use std::sync::Arc;

use stencil_parser::{Ast, BasePlatform, Module, Node, NodeId, Platform};

/// Options for [`optimize`].
#[derive(Debug, Clone)]
pub struct OptimizerOptions {
    /// Tag knowledge; non-reserved tags are treated as components.
    pub platform: Arc<dyn Platform>,
    /// Module data keys that do not make an element dynamic.
    pub static_keys: Vec<&'static str>,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            platform: Arc::new(BasePlatform),
            static_keys: Vec::new(),
        }
    }
}

impl OptimizerOptions {
    /// Collects the static keys of `modules`.
    pub fn new(platform: Arc<dyn Platform>, modules: &[Arc<dyn Module>]) -> Self {
        let static_keys = modules
            .iter()
            .flat_map(|module| module.static_keys().iter().copied())
            .collect();
        Self {
            platform,
            static_keys,
        }
    }
}

/// Marks static nodes and static roots of `ast`.
pub fn optimize(ast: &mut Ast, options: &OptimizerOptions) {
    let Some(root) = ast.root else {
        return;
    };
    let optimizer = Optimizer { options };
    optimizer.mark_static(ast, root);
    optimizer.mark_static_roots(ast, root, false);
    log::debug!("optimized template of {} nodes", ast.len());
}

struct Optimizer<'o> {
    options: &'o OptimizerOptions,
}

impl Optimizer<'_> {
    fn is_reserved(&self, tag: &str) -> bool {
        self.options.platform.is_reserved_tag(tag)
    }

    fn is_static(&self, ast: &Ast, id: NodeId) -> bool {
        let el = match &ast[id] {
            Node::Element(el) => el,
            node => return node.is_static(),
        };
        if el.pre {
            return true;
        }
        !el.has_bindings
            && el.if_exp.is_none()
            && el.for_info.is_none()
            && !matches!(el.tag.as_str(), "slot" | "component")
            && self.is_reserved(&el.tag)
            && !is_direct_child_of_template_for(ast, id)
            && el
                .data_keys()
                .iter()
                .all(|key| self.options.static_keys.contains(key))
    }

    fn mark_static(&self, ast: &mut Ast, id: NodeId) {
        let is_static = self.is_static(ast, id);
        let Some(el) = ast.element_mut(id) else {
            return;
        };
        el.is_static = is_static;

        // Children of a component do not affect the component's own mark.
        if !self.is_reserved(&el.tag) && el.tag != "slot" && !el.has_attr("inline-template") {
            return;
        }

        let children = el.children.clone();
        let branches: Vec<NodeId> = el.if_conditions.iter().skip(1).map(|c| c.block).collect();
        let mut all_static = true;
        for child in children.into_iter().chain(branches) {
            self.mark_static(ast, child);
            all_static &= ast[child].is_static();
        }
        if !all_static {
            if let Some(el) = ast.element_mut(id) {
                el.is_static = false;
            }
        }
    }

    fn mark_static_roots(&self, ast: &mut Ast, id: NodeId, in_for: bool) {
        let Some(el) = ast.element(id) else {
            return;
        };
        let only_text_child = el.children.len() == 1
            && matches!(ast.get(el.children[0]), Some(Node::Text(_) | Node::Comment(_)));
        let static_root = el.is_static && !el.children.is_empty() && !only_text_child;
        let children = el.children.clone();
        let branches: Vec<NodeId> = el.if_conditions.iter().skip(1).map(|c| c.block).collect();
        let in_for_children = in_for || el.for_info.is_some();

        let Some(el) = ast.element_mut(id) else {
            return;
        };
        if el.is_static || el.once {
            el.static_in_for = in_for;
        }
        el.static_root = static_root;
        if static_root {
            return;
        }

        for child in children {
            self.mark_static_roots(ast, child, in_for_children);
        }
        for block in branches {
            self.mark_static_roots(ast, block, in_for);
        }
    }
}

fn is_direct_child_of_template_for(ast: &Ast, id: NodeId) -> bool {
    for ancestor in ast.ancestors_inclusive(id).skip(1) {
        let Some(el) = ast.element(ancestor) else {
            return false;
        };
        if el.tag != "template" {
            return false;
        }
        if el.for_info.is_some() {
            return true;
        }
    }
    false
}
