use indexmap::IndexMap;

use crate::ast::Element;
use crate::context::ParseContext;
use crate::error::ErrorKind;
use crate::helpers::{get_and_remove_attr, get_binding_attr};
use crate::module::Module;
use crate::text::parse_text;
use crate::util::stringify;

/// Parses a `style` attribute into property/value pairs.
///
/// Semicolons inside parentheses, as in `url(data:...;base64,...)`, do not
/// end a declaration.
pub fn parse_style_text(css: &str) -> IndexMap<String, String> {
    let mut declarations = IndexMap::new();
    for item in split_declarations(css) {
        if let Some((property, value)) = item.split_once(':') {
            if !value.is_empty() {
                declarations.insert(property.trim().to_string(), value.trim().to_string());
            }
        }
    }
    declarations
}

fn split_declarations(css: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut start = 0;
    for (index, c) in css.char_indices() {
        if c != ';' {
            continue;
        }
        let after = &css[index + 1..];
        let in_parens = after
            .find(['(', ')'])
            .is_some_and(|pos| after[pos..].starts_with(')'));
        if !in_parens {
            items.push(&css[start..index]);
            start = index + 1;
        }
    }
    items.push(&css[start..]);
    items.into_iter().filter(|item| !item.is_empty()).collect()
}

/// Splits `style` into a static object and a binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleModule;

impl Module for StyleModule {
    fn static_keys(&self) -> &'static [&'static str] {
        &["staticStyle"]
    }

    fn transform_node(&self, cx: &mut ParseContext<'_>, el: &mut Element) {
        if let Some(style) = get_and_remove_attr(el, "style", false).filter(|s| !s.is_empty()) {
            if parse_text(&style, cx.delimiters()).is_some() {
                cx.warn(
                    ErrorKind::InterpolationInAttribute {
                        name: "style".into(),
                        value: style.clone(),
                    },
                    el.attr_span("style"),
                );
            }
            let object = parse_style_text(&style)
                .iter()
                .map(|(property, value)| format!("{}:{}", stringify(property), stringify(value)))
                .collect::<Vec<_>>()
                .join(",");
            el.module_data
                .insert("staticStyle".into(), format!("{{{object}}}"));
        }
        if let Some(binding) = get_binding_attr(el, "style", false).filter(|b| !b.is_empty()) {
            el.module_data.insert("styleBinding".into(), binding);
        }
    }

    fn gen_data(&self, el: &Element) -> String {
        let mut data = String::new();
        if let Some(style) = el.module_data.get("staticStyle") {
            data.push_str(&format!("staticStyle:{style},"));
        }
        if let Some(binding) = el.module_data.get("styleBinding") {
            data.push_str(&format!("style:({binding}),"));
        }
        data
    }
}
