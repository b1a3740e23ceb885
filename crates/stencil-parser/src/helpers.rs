//! Attribute bookkeeping on elements.
//!
//! Directive resolvers consume attributes from `attrs_list` as they handle
//! them; whatever is left at the end becomes a plain attribute.

use regex::Regex;
use stencil_span::Span;

use crate::ast::{Attr, Directive, Element, Handler, Modifiers, RawAttr};
use crate::error::{Diagnostics, ErrorKind};
use crate::filter::parse_filters;
use crate::util::stringify;

/// Removes `name` from the unconsumed attributes and returns its value.
///
/// The attribute stays in `attrs_map` unless `remove_from_map` is set, so
/// later resolvers can still see that it was written.
pub fn get_and_remove_attr(el: &mut Element, name: &str, remove_from_map: bool) -> Option<String> {
    let value = el.attrs_map.get(name).cloned();
    if value.is_some() {
        if let Some(index) = el.attrs_list.iter().position(|attr| attr.name == name) {
            el.attrs_list.remove(index);
        }
    }
    if remove_from_map {
        el.attrs_map.shift_remove(name);
    }
    value
}

/// Removes and returns the first unconsumed attribute whose name matches.
pub fn get_and_remove_attr_by_regex(el: &mut Element, pattern: &Regex) -> Option<RawAttr> {
    let index = el.attrs_list.iter().position(|attr| pattern.is_match(&attr.name))?;
    Some(el.attrs_list.remove(index))
}

/// Consumes `:name` or `v-bind:name` and returns the filter-expanded
/// expression.
///
/// Without a binding and with `get_static` set, consumes the static `name`
/// attribute and returns it as a string literal.
pub fn get_binding_attr(el: &mut Element, name: &str, get_static: bool) -> Option<String> {
    let shorthand = get_and_remove_attr(el, &format!(":{name}"), false).filter(|v| !v.is_empty());
    let dynamic = match shorthand {
        Some(value) => Some(value),
        None => get_and_remove_attr(el, &format!("v-bind:{name}"), false),
    };
    if let Some(value) = dynamic {
        return Some(parse_filters(&value));
    }
    if get_static {
        return get_and_remove_attr(el, name, false).map(|value| stringify(&value));
    }
    None
}

/// Looks up the raw attribute that binds `name`, for its span.
pub fn raw_binding_attr<'a>(el: &'a Element, name: &str) -> Option<&'a RawAttr> {
    el.raw_attrs_map
        .get(&format!(":{name}"))
        .or_else(|| el.raw_attrs_map.get(&format!("v-bind:{name}")))
        .or_else(|| el.raw_attrs_map.get(name))
}

/// Adds a DOM property binding.
pub fn add_prop(el: &mut Element, name: impl Into<String>, value: impl Into<String>, span: Option<Span>, dynamic: bool) {
    el.props.push(Attr {
        name: name.into(),
        value: value.into(),
        dynamic,
        span,
    });
    el.plain = false;
}

/// Adds an attribute binding; dynamic names go to `dynamic_attrs`.
pub fn add_attr(el: &mut Element, name: impl Into<String>, value: impl Into<String>, span: Option<Span>, dynamic: bool) {
    let attr = Attr {
        name: name.into(),
        value: value.into(),
        dynamic,
        span,
    };
    if dynamic {
        el.dynamic_attrs.push(attr);
    } else {
        el.attrs.push(attr);
    }
    el.plain = false;
}

/// Adds an attribute as if it had been written in the source.
pub fn add_raw_attr(el: &mut Element, name: &str, value: &str, span: Span) {
    el.attrs_map.insert(name.to_string(), value.to_string());
    el.attrs_list.push(RawAttr {
        name: name.to_string(),
        value: value.to_string(),
        span,
    });
}

/// Adds a directive for the code generator.
pub fn add_directive(el: &mut Element, directive: Directive) {
    el.directives.push(directive);
    el.plain = false;
}

/// An event handler registration.
#[derive(Debug, Clone, Default)]
pub struct EventSpec {
    /// The event name, or its expression when `dynamic`.
    pub name: String,
    /// The handler.
    pub value: String,
    /// Modifiers as written; `None` when there were none.
    pub modifiers: Option<Modifiers>,
    /// Put the handler before existing ones for the same event.
    pub important: bool,
    /// Whether `name` is an expression.
    pub dynamic: bool,
    /// Source span.
    pub span: Option<Span>,
}

impl EventSpec {
    /// A static event without modifiers.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    /// Marks the handler as running before others for the same event.
    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }
}

fn marker(symbol: char, name: &str, dynamic: bool) -> String {
    if dynamic {
        format!("_p({name},\"{symbol}\")")
    } else {
        format!("{symbol}{name}")
    }
}

/// Registers an event handler.
///
/// Modifiers that change the event itself (`right`, `middle`, `capture`,
/// `once`, `passive`, `native`) are applied to the name or target map and
/// removed; the rest stay on the handler for the code generator.
pub fn add_handler(el: &mut Element, spec: EventSpec, diagnostics: &mut Diagnostics) {
    let EventSpec {
        mut name,
        value,
        modifiers,
        important,
        dynamic,
        span,
    } = spec;
    let had_modifiers = modifiers.is_some();
    let mut modifiers = modifiers.unwrap_or_default();

    if modifiers.contains("prevent") && modifiers.contains("passive") {
        diagnostics.error(ErrorKind::PassiveWithPrevent, span);
    }

    if modifiers.contains("right") {
        if dynamic {
            name = format!("({name})==='click'?'contextmenu':({name})");
        } else if name == "click" {
            name = "contextmenu".to_string();
            modifiers.shift_remove("right");
        }
    } else if modifiers.contains("middle") {
        if dynamic {
            name = format!("({name})==='click'?'mouseup':({name})");
        } else if name == "click" {
            name = "mouseup".to_string();
        }
    }

    if modifiers.shift_remove("capture") {
        name = marker('!', &name, dynamic);
    }
    if modifiers.shift_remove("once") {
        name = marker('~', &name, dynamic);
    }
    if modifiers.shift_remove("passive") {
        name = marker('&', &name, dynamic);
    }

    let events = if modifiers.shift_remove("native") {
        &mut el.native_events
    } else {
        &mut el.events
    };

    let handler = Handler {
        value: value.trim().to_string(),
        dynamic,
        modifiers: had_modifiers.then_some(modifiers),
        span,
    };

    let handlers = events.entry(name).or_default();
    if important {
        handlers.insert(0, handler);
    } else {
        handlers.push(handler);
    }
    el.plain = false;
}
