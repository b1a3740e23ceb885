//! Compile-time directive handlers.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use stencil_parser::ast::{BindObject, Directive, Element};
use stencil_parser::{Diagnostics, ErrorKind, Platform};

/// What a directive handler may touch besides the element.
pub struct DirectiveContext<'a> {
    /// Where problems are reported.
    pub diagnostics: &'a mut Diagnostics,
    /// Tag knowledge of the target platform.
    pub platform: &'a dyn Platform,
}

/// Rewrites an element for one directive at code generation time.
///
/// Handlers run before the data object of the element is generated, so
/// props and handlers they add end up in the output.
pub trait DirectiveGen: Send + Sync + fmt::Debug {
    /// Applies the directive to `el`.
    ///
    /// Returns true if the directive must also be emitted in `directives:`
    /// for the runtime.
    fn generate(&self, el: &mut Element, dir: &Directive, cx: &mut DirectiveContext<'_>) -> bool;
}

/// Directive handlers by directive name.
pub type DirectiveMap = IndexMap<String, Arc<dyn DirectiveGen>>;

/// `v-on="listeners"`: wraps the data object with `_g`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnDirective;

impl DirectiveGen for OnDirective {
    fn generate(&self, el: &mut Element, dir: &Directive, cx: &mut DirectiveContext<'_>) -> bool {
        if dir.modifiers.is_some() {
            cx.diagnostics.error(ErrorKind::ListenersWithModifiers, dir.span);
        }
        el.wrap_listeners = Some(dir.value.clone());
        false
    }
}

/// `v-bind="object"`: wraps the data object with `_b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindDirective;

impl DirectiveGen for BindDirective {
    fn generate(&self, el: &mut Element, dir: &Directive, _cx: &mut DirectiveContext<'_>) -> bool {
        let has = |modifier: &str| dir.modifiers.as_ref().is_some_and(|mods| mods.contains(modifier));
        el.wrap_data = Some(BindObject {
            value: dir.value.clone(),
            prop: has("prop"),
            sync: has("sync"),
        });
        false
    }
}

/// `v-cloak` only matters before compilation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloakDirective;

impl DirectiveGen for CloakDirective {
    fn generate(&self, _el: &mut Element, _dir: &Directive, _cx: &mut DirectiveContext<'_>) -> bool {
        false
    }
}

/// The platform-independent directive handlers.
pub fn base_directives() -> DirectiveMap {
    let mut directives: DirectiveMap = IndexMap::new();
    directives.insert("on".into(), Arc::new(OnDirective));
    directives.insert("bind".into(), Arc::new(BindDirective));
    directives.insert("cloak".into(), Arc::new(CloakDirective));
    directives
}
