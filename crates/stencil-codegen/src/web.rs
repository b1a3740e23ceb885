//! Directive handlers of the web platform: `v-model`, `v-text` and `v-html`.

use std::sync::Arc;

use stencil_parser::assign::gen_assignment_code;
use stencil_parser::ast::{Directive, Element, ModelBinding};
use stencil_parser::helpers::{add_handler, add_prop, get_binding_attr, EventSpec};
use stencil_parser::util::stringify;
use stencil_parser::web::{web_modules, WebPlatform};
use stencil_parser::ErrorKind;

use crate::codegen::{base_directives, CodegenOptions, DirectiveContext, DirectiveGen, DirectiveMap};

/// Event name the runtime maps to `input` or `change` for range inputs.
pub const RANGE_TOKEN: &str = "__r";

/// Two-way binding on form elements and components.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelDirective;

impl DirectiveGen for ModelDirective {
    fn generate(&self, el: &mut Element, dir: &Directive, cx: &mut DirectiveContext<'_>) -> bool {
        let value = dir.value.as_str();
        let modifiers = Modifiers::of(dir);
        let ty = el.attr("type").map(str::to_string);
        let tag = el.tag.clone();

        if tag == "input" && ty.as_deref() == Some("file") {
            cx.diagnostics.error(
                ErrorKind::ModelOnFileInput {
                    tag: tag.to_string(),
                    value: value.to_string(),
                },
                el.attr_span("v-model"),
            );
        }

        if el.component.is_some() {
            gen_component_model(el, value, modifiers);
            return false;
        }
        match (tag.as_str(), ty.as_deref()) {
            ("select", _) => gen_select(el, value, modifiers, cx),
            ("input", Some("checkbox")) => gen_checkbox_model(el, value, modifiers, cx),
            ("input", Some("radio")) => gen_radio_model(el, value, modifiers, cx),
            ("input" | "textarea", _) => gen_default_model(el, value, modifiers, cx),
            _ if !cx.platform.is_reserved_tag(&tag) => {
                gen_component_model(el, value, modifiers);
                return false;
            }
            _ => cx.diagnostics.error(
                ErrorKind::UnsupportedModel {
                    tag: tag.to_string(),
                    value: value.to_string(),
                },
                el.attr_span("v-model"),
            ),
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Modifiers {
    lazy: bool,
    number: bool,
    trim: bool,
}

impl Modifiers {
    fn of(dir: &Directive) -> Self {
        let has = |name: &str| dir.modifiers.as_ref().is_some_and(|mods| mods.contains(name));
        Self {
            lazy: has("lazy"),
            number: has("number"),
            trim: has("trim"),
        }
    }
}

fn add_change_handler(el: &mut Element, event: &str, code: String, cx: &mut DirectiveContext<'_>) {
    add_handler(el, EventSpec::new(event, code).important(), cx.diagnostics);
}

/// Fills `el.model` for a component, which receives the value as a prop
/// and reports changes through a callback.
fn gen_component_model(el: &mut Element, value: &str, modifiers: Modifiers) {
    let base = "$$v";
    let mut value_expression = base.to_string();
    if modifiers.trim {
        value_expression = format!("(typeof {base} === 'string'? {base}.trim(): {base})");
    }
    if modifiers.number {
        value_expression = format!("_n({value_expression})");
    }
    let assignment = gen_assignment_code(value, &value_expression);
    el.model = Some(ModelBinding {
        value: format!("({value})"),
        expression: stringify(value),
        callback: format!("function ({base}) {{{assignment}}}"),
    });
}

fn gen_select(el: &mut Element, value: &str, modifiers: Modifiers, cx: &mut DirectiveContext<'_>) {
    let selected = format!(
        "Array.prototype.filter.call($event.target.options,function(o){{return o.selected}}).map(function(o){{var val = \"_value\" in o ? o._value : o.value;return {}}})",
        if modifiers.number { "_n(val)" } else { "val" }
    );
    let assignment = gen_assignment_code(
        value,
        "$event.target.multiple ? $$selectedVal : $$selectedVal[0]",
    );
    let code = format!("var $$selectedVal = {selected}; {assignment}");
    add_change_handler(el, "change", code, cx);
}

fn gen_checkbox_model(el: &mut Element, value: &str, modifiers: Modifiers, cx: &mut DirectiveContext<'_>) {
    let value_binding = get_binding_attr(el, "value", true).unwrap_or_else(|| "null".into());
    let true_binding = get_binding_attr(el, "true-value", true).unwrap_or_else(|| "true".into());
    let false_binding = get_binding_attr(el, "false-value", true).unwrap_or_else(|| "false".into());

    let checked_when_scalar = if true_binding == "true" {
        format!(":({value})")
    } else {
        format!(":_q({value},{true_binding})")
    };
    add_prop(
        el,
        "checked",
        format!("Array.isArray({value})?_i({value},{value_binding})>-1{checked_when_scalar}"),
        None,
        false,
    );

    let item = if modifiers.number {
        format!("_n({value_binding})")
    } else {
        value_binding
    };
    let code = format!(
        "var $$a={value},$$el=$event.target,$$c=$$el.checked?({true_binding}):({false_binding});\
         if(Array.isArray($$a)){{var $$v={item},$$i=_i($$a,$$v);\
         if($$el.checked){{$$i<0&&({})}}else{{$$i>-1&&({})}}}}else{{{}}}",
        gen_assignment_code(value, "$$a.concat([$$v])"),
        gen_assignment_code(value, "$$a.slice(0,$$i).concat($$a.slice($$i+1))"),
        gen_assignment_code(value, "$$c"),
    );
    add_change_handler(el, "change", code, cx);
}

fn gen_radio_model(el: &mut Element, value: &str, modifiers: Modifiers, cx: &mut DirectiveContext<'_>) {
    let mut value_binding = get_binding_attr(el, "value", true).unwrap_or_else(|| "null".into());
    if modifiers.number {
        value_binding = format!("_n({value_binding})");
    }
    add_prop(el, "checked", format!("_q({value},{value_binding})"), None, false);
    add_change_handler(el, "change", gen_assignment_code(value, &value_binding), cx);
}

fn gen_default_model(el: &mut Element, value: &str, modifiers: Modifiers, cx: &mut DirectiveContext<'_>) {
    let ty = el.attr("type").map(str::to_string);

    let bound_value = ["v-bind:value", ":value"]
        .into_iter()
        .find_map(|name| el.attr(name).filter(|v| !v.is_empty()).map(|v| (name, v.to_string())));
    let type_bound = ["v-bind:type", ":type"]
        .iter()
        .any(|name| el.attr(name).is_some_and(|v| !v.is_empty()));
    if let Some((binding, bound)) = bound_value.filter(|_| !type_bound) {
        cx.diagnostics.error(
            ErrorKind::ValueConflictsWithModel {
                binding: binding.to_string(),
                value: bound,
            },
            el.attr_span(binding),
        );
    }

    let is_range = ty.as_deref() == Some("range");
    let event = if modifiers.lazy {
        "change"
    } else if is_range {
        RANGE_TOKEN
    } else {
        "input"
    };

    let mut value_expression = "$event.target.value".to_string();
    if modifiers.trim {
        value_expression = "$event.target.value.trim()".to_string();
    }
    if modifiers.number {
        value_expression = format!("_n({value_expression})");
    }
    let mut code = gen_assignment_code(value, &value_expression);
    if !modifiers.lazy && !is_range {
        code = format!("if($event.target.composing)return;{code}");
    }

    add_prop(el, "value", format!("({value})"), None, false);
    add_change_handler(el, event, code, cx);
    if modifiers.trim || modifiers.number {
        add_handler(el, EventSpec::new("blur", "$forceUpdate()"), cx.diagnostics);
    }
}

/// `v-text`: sets `textContent`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDirective;

impl DirectiveGen for TextDirective {
    fn generate(&self, el: &mut Element, dir: &Directive, _cx: &mut DirectiveContext<'_>) -> bool {
        if !dir.value.is_empty() {
            add_prop(el, "textContent", format!("_s({})", dir.value), dir.span, false);
        }
        false
    }
}

/// `v-html`: sets `innerHTML`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDirective;

impl DirectiveGen for HtmlDirective {
    fn generate(&self, el: &mut Element, dir: &Directive, _cx: &mut DirectiveContext<'_>) -> bool {
        if !dir.value.is_empty() {
            add_prop(el, "innerHTML", format!("_s({})", dir.value), dir.span, false);
        }
        false
    }
}

/// The `model`, `text` and `html` handlers.
pub fn web_directives() -> DirectiveMap {
    let mut directives = DirectiveMap::new();
    directives.insert("model".into(), Arc::new(ModelDirective));
    directives.insert("text".into(), Arc::new(TextDirective));
    directives.insert("html".into(), Arc::new(HtmlDirective));
    directives
}

/// Code generator options for HTML templates.
pub fn web_codegen_options() -> CodegenOptions {
    let mut directives = base_directives();
    directives.extend(web_directives());
    CodegenOptions {
        platform: Arc::new(WebPlatform),
        modules: web_modules(),
        directives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::generate;
    use pretty_assertions::assert_eq;
    use stencil_parser::{parse, web::web_parser_options};

    fn render(template: &str) -> String {
        let mut ast = parse(template, &web_parser_options()).ast;
        generate(&mut ast, &web_codegen_options()).render
    }

    #[test]
    fn test_text_input_model() {
        assert_eq!(
            render(r#"<input v-model="msg">"#),
            r#"with(this){return _c('input',{directives:[{name:"model",rawName:"v-model",value:(msg),expression:"msg"}],domProps:{"value":(msg)},on:{"input":function($event){if($event.target.composing)return;msg=$event.target.value}}})}"#
        );
    }

    #[test]
    fn test_lazy_trim_number_model() {
        assert_eq!(
            render(r#"<input v-model.lazy.trim.number="n">"#),
            r#"with(this){return _c('input',{directives:[{name:"model",rawName:"v-model.lazy.trim.number",value:(n),expression:"n",modifiers:{"lazy":true,"trim":true,"number":true}}],domProps:{"value":(n)},on:{"change":function($event){n=_n($event.target.value.trim())},"blur":function($event){return $forceUpdate()}}})}"#
        );
    }

    #[test]
    fn test_checkbox_model() {
        let code = render(r#"<input type="checkbox" v-model="checked">"#);
        assert!(code.contains(r#"domProps:{"checked":Array.isArray(checked)?_i(checked,null)>-1:(checked)}"#));
        assert!(code.contains("$$i<0&&(checked=$$a.concat([$$v]))"));
    }

    #[test]
    fn test_radio_model() {
        let code = render(r#"<input type="radio" value="a" v-model="picked">"#);
        assert!(code.contains(r#"domProps:{"checked":_q(picked,"a")}"#));
        assert!(code.contains(r#"on:{"change":function($event){picked="a"}}"#));
    }

    #[test]
    fn test_select_model() {
        let code = render(r#"<select v-model="selected"><option>a</option></select>"#);
        assert!(code.contains("var $$selectedVal = Array.prototype.filter"));
        assert!(code.contains("selected=$event.target.multiple ? $$selectedVal : $$selectedVal[0]"));
    }

    #[test]
    fn test_component_model() {
        assert_eq!(
            render(r#"<my-input v-model.trim="obj.name"></my-input>"#),
            r#"with(this){return _c('my-input',{model:{value:(obj.name),callback:function ($$v) {$set(obj, "name", (typeof $$v === 'string'? $$v.trim(): $$v))},expression:"obj.name"}})}"#
        );
    }

    #[test]
    fn test_model_errors() {
        let mut ast = parse(r#"<div><input type="file" v-model="f"><div v-model="x"></div></div>"#, &web_parser_options()).ast;
        let result = generate(&mut ast, &web_codegen_options());
        let kinds: Vec<_> = result.errors.iter().map(|e| e.kind.clone()).collect();
        assert!(matches!(kinds[0], ErrorKind::ModelOnFileInput { .. }));
        assert!(matches!(kinds[1], ErrorKind::UnsupportedModel { .. }));
    }

    #[test]
    fn test_value_conflicts_with_model() {
        let mut ast = parse(r#"<input v-model="a" :value="b">"#, &web_parser_options()).ast;
        let result = generate(&mut ast, &web_codegen_options());
        assert_eq!(
            result.errors[0].kind,
            ErrorKind::ValueConflictsWithModel {
                binding: ":value".into(),
                value: "b".into(),
            }
        );
    }

    #[test]
    fn test_text_and_html() {
        assert_eq!(
            render(r#"<div><p v-text="a"></p><p v-html="b"></p></div>"#),
            r#"with(this){return _c('div',[_c('p',{domProps:{"textContent":_s(a)}}),_c('p',{domProps:{"innerHTML":_s(b)}})])}"#
        );
    }
}
