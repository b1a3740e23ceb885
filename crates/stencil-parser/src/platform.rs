//! Platform knowledge about tags and attributes.

use std::fmt;

/// Tag and attribute predicates supplied by the target platform.
///
/// Every method defaults to "no", which is the behavior of a bare compiler
/// without platform knowledge: no unary tags, every tag a component.
pub trait Platform: Send + Sync + fmt::Debug {
    /// Whether whitespace inside `tag` is preserved verbatim.
    fn is_pre_tag(&self, _tag: &str) -> bool {
        false
    }

    /// Whether `tag` never has children or a closing tag.
    fn is_unary_tag(&self, _tag: &str) -> bool {
        false
    }

    /// Whether `tag` may be left open and is implicitly closed by a sibling.
    fn can_be_left_open_tag(&self, _tag: &str) -> bool {
        false
    }

    /// Whether `tag` implicitly closes an open paragraph.
    fn is_non_phrasing_tag(&self, _tag: &str) -> bool {
        false
    }

    /// Whether binding `attr` on `tag` must set a DOM property.
    fn must_use_prop(&self, _tag: &str, _ty: Option<&str>, _attr: &str) -> bool {
        false
    }

    /// The namespace of `tag`, if it has one of its own.
    fn tag_namespace(&self, _tag: &str) -> Option<&'static str> {
        None
    }

    /// Whether `tag` is a native element rather than a component.
    fn is_reserved_tag(&self, _tag: &str) -> bool {
        false
    }
}

/// A platform without any tag knowledge.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasePlatform;

impl Platform for BasePlatform {}
