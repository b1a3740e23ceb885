use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::Element;
use crate::context::ParseContext;
use crate::error::ErrorKind;
use crate::helpers::{get_and_remove_attr, get_binding_attr};
use crate::module::Module;
use crate::text::parse_text;
use crate::util::stringify;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Splits `class` into a static part and a binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassModule;

impl Module for ClassModule {
    fn static_keys(&self) -> &'static [&'static str] {
        &["staticClass"]
    }

    fn transform_node(&self, cx: &mut ParseContext<'_>, el: &mut Element) {
        let static_class = get_and_remove_attr(el, "class", false).filter(|c| !c.is_empty());
        if let Some(class) = static_class {
            if parse_text(&class, cx.delimiters()).is_some() {
                cx.warn(
                    ErrorKind::InterpolationInAttribute {
                        name: "class".into(),
                        value: class.clone(),
                    },
                    el.attr_span("class"),
                );
            }
            let normalized = WHITESPACE_RE.replace_all(&class, " ");
            el.module_data
                .insert("staticClass".into(), stringify(normalized.trim()));
        }
        if let Some(binding) = get_binding_attr(el, "class", false).filter(|b| !b.is_empty()) {
            el.module_data.insert("classBinding".into(), binding);
        }
    }

    fn gen_data(&self, el: &Element) -> String {
        let mut data = String::new();
        if let Some(class) = el.module_data.get("staticClass") {
            data.push_str(&format!("staticClass:{class},"));
        }
        if let Some(binding) = el.module_data.get("classBinding") {
            data.push_str(&format!("class:{binding},"));
        }
        data
    }
}
