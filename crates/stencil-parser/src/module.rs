//! Per-node transform hooks supplied by a platform.

use std::fmt;

use crate::ast::{Ast, Element, NodeId};
use crate::context::ParseContext;

/// A set of node hooks and the data keys they own.
///
/// Hooks of every registered module run in registration order. All hooks
/// default to doing nothing.
pub trait Module: Send + Sync + fmt::Debug {
    /// Data keys this module produces that do not make an element dynamic.
    fn static_keys(&self) -> &'static [&'static str] {
        &[]
    }

    /// Runs right after an element is created, before structural
    /// directives are resolved.
    ///
    /// Returning a different id replaces the element in the tree.
    fn pre_transform_node(
        &self,
        _cx: &mut ParseContext<'_>,
        _ast: &mut Ast,
        _id: NodeId,
    ) -> Option<NodeId> {
        None
    }

    /// Runs while the element is closed, before the remaining attributes are
    /// resolved.
    fn transform_node(&self, _cx: &mut ParseContext<'_>, _el: &mut Element) {}

    /// Runs after the element is linked into the tree.
    fn post_transform_node(&self, _cx: &mut ParseContext<'_>, _el: &mut Element) {}

    /// Returns the data-object entries for this module, each followed by a
    /// comma.
    fn gen_data(&self, _el: &Element) -> String {
        String::new()
    }
}
