//! End-to-end generation tests: parse, optimize and generate with the web
//! platform, then compare the render code.

use pretty_assertions::assert_eq;
use stencil_codegen::{generate, optimize, web::web_codegen_options, CodegenResult, OptimizerOptions};
use stencil_parser::{parse, web::web_parser_options, ErrorKind, ParserOptions};

fn compile_with(template: &str, parser_options: &ParserOptions) -> CodegenResult {
    let parsed = parse(template, parser_options);
    let mut ast = parsed.ast;
    let optimizer_options =
        OptimizerOptions::new(parser_options.platform.clone(), &parser_options.modules);
    optimize(&mut ast, &optimizer_options);
    generate(&mut ast, &web_codegen_options())
}

fn compile(template: &str) -> CodegenResult {
    compile_with(template, &web_parser_options())
}

fn render(template: &str) -> String {
    compile(template).render
}

#[test]
fn test_interpolation_with_attribute() {
    assert_eq!(
        render(r#"<div id="app">{{ msg }}</div>"#),
        r#"with(this){return _c('div',{attrs:{"id":"app"}},[_v(_s(msg))])}"#
    );
}

#[test]
fn test_filters_in_interpolation() {
    assert_eq!(
        render("<p>{{ price | currency('$') | round }}</p>"),
        r#"with(this){return _c('p',[_v(_s(_f("round")(_f("currency")(price,'$'))))])}"#
    );
}

#[test]
fn test_condition_chain() {
    assert_eq!(
        render(r#"<div><p v-if="a">A</p><p v-else-if="b">B</p><p v-else>C</p></div>"#),
        r#"with(this){return _c('div',[(a)?_c('p',[_v("A")]):(b)?_c('p',[_v("B")]):_c('p',[_v("C")])])}"#
    );
}

#[test]
fn test_condition_without_else() {
    assert_eq!(
        render(r#"<div><span v-if="show">x</span></div>"#),
        r#"with(this){return _c('div',[(show)?_c('span',[_v("x")]):_e()])}"#
    );
}

#[test]
fn test_keyed_list() {
    assert_eq!(
        render(r#"<ul><li v-for="(item, i) in items" :key="item.id">{{ item.text }}</li></ul>"#),
        r#"with(this){return _c('ul',_l((items),function(item,i){return _c('li',{key:item.id},[_v(_s(item.text))])}),0)}"#
    );
}

#[test]
fn test_inline_statement_handler() {
    assert_eq!(
        render(r#"<button @click="count++">+</button>"#),
        r#"with(this){return _c('button',{on:{"click":function($event){count++}}},[_v("+")])}"#
    );
}

#[test]
fn test_native_modifier_on_component() {
    assert_eq!(
        render(r#"<my-button @click.native.prevent="go"></my-button>"#),
        r#"with(this){return _c('my-button',{nativeOn:{"click":function($event){$event.preventDefault();return go.apply(null, arguments)}}})}"#
    );
}

#[test]
fn test_event_markers() {
    assert_eq!(
        render(r#"<div @scroll.passive="onScroll" @click.capture.once="c"></div>"#),
        r#"with(this){return _c('div',{on:{"&scroll":function($event){return onScroll.apply(null, arguments)},"~!click":function($event){return c.apply(null, arguments)}}})}"#
    );
}

#[test]
fn test_sync_binding() {
    assert_eq!(
        render(r#"<comp :title.sync="t"></comp>"#),
        r#"with(this){return _c('comp',{attrs:{"title":t},on:{"update:title":function($event){t=$event}}})}"#
    );
}

#[test]
fn test_class_and_style() {
    assert_eq!(
        render(r#"<div class="a" :class="{b: c}" style="color: red" :style="s"></div>"#),
        r#"with(this){return _c('div',{staticClass:"a",class:{b: c},staticStyle:{"color":"red"},style:(s)})}"#
    );
}

#[test]
fn test_dom_props() {
    assert_eq!(
        render(r#"<input :value="v" :checked="c">"#),
        r#"with(this){return _c('input',{domProps:{"value":v,"checked":c}})}"#
    );
}

#[test]
fn test_dynamic_attribute_name() {
    assert_eq!(
        render(r#"<div :[name]="v"></div>"#),
        r#"with(this){return _c('div',_b({},"div",_d({},[name,v])))}"#
    );
}

#[test]
fn test_object_bind_and_listeners() {
    assert_eq!(
        render(r#"<div v-bind="attrs" v-on="listeners"></div>"#),
        r#"with(this){return _c('div',_g(_b({},'div',attrs,false),listeners))}"#
    );
}

#[test]
fn test_slot_outlet() {
    assert_eq!(
        render(r#"<div><slot name="header" :title="t">fallback</slot></div>"#),
        r#"with(this){return _c('div',[_t("header",function(){return [_v("fallback")]},{"title":t})],2)}"#
    );
}

#[test]
fn test_default_slot_with_bind_object() {
    assert_eq!(
        render(r#"<div><slot v-bind="props"></slot></div>"#),
        r#"with(this){return _c('div',[_t("default",null,null,props)],2)}"#
    );
}

#[test]
fn test_named_scoped_slot() {
    assert_eq!(
        render(r#"<my-list :items="xs"><template v-slot:item="{ row }"><span>{{ row }}</span></template></my-list>"#),
        r#"with(this){return _c('my-list',{attrs:{"items":xs},scopedSlots:_u([{key:"item",fn:function({ row }){return [_c('span',[_v(_s(row))])]}}])})}"#
    );
}

#[test]
fn test_slot_without_scope_is_proxied() {
    assert_eq!(
        render(r#"<my-card><template #title><b>hi</b></template></my-card>"#),
        r#"with(this){return _c('my-card',{scopedSlots:_u([{key:"title",fn:function(){return [_c('b',[_v("hi")])]},proxy:true}])})}"#
    );
}

#[test]
fn test_scoped_slot_under_for_forces_update() {
    let code = render(
        r#"<div><my-row v-for="r in rows" :key="r.id"><template #cell="{ value }">{{ value }}</template></my-row></div>"#,
    );
    assert!(code.contains(",null,true)"), "{code}");
}

#[test]
fn test_legacy_slot_attribute() {
    assert_eq!(
        render(r#"<my-layout><p slot="footer">f</p></my-layout>"#),
        r#"with(this){return _c('my-layout',[_c('p',{attrs:{"slot":"footer"},slot:"footer"},[_v("f")])])}"#
    );
}

#[test]
fn test_dynamic_component() {
    assert_eq!(
        render(r#"<component :is="view" :foo="bar"></component>"#),
        r#"with(this){return _c(view,{tag:"component",attrs:{"foo":bar}})}"#
    );
}

#[test]
fn test_template_condition_renders_children_array() {
    assert_eq!(
        render(r#"<div><template v-if="ok"><p>a</p><p>b</p></template></div>"#),
        r#"with(this){return _c('div',[(ok)?[_c('p',[_v("a")]),_c('p',[_v("b")])]:_e()],2)}"#
    );
}

#[test]
fn test_static_roots_are_hoisted() {
    let result = compile(r#"<div><header><h1>Title</h1><p>sub</p></header><p>{{ body }}</p></div>"#);
    assert_eq!(
        result.render,
        r#"with(this){return _c('div',[_m(0),_c('p',[_v(_s(body))])])}"#
    );
    assert_eq!(
        result.static_render_fns,
        vec![r#"with(this){return _c('header',[_c('h1',[_v("Title")]),_c('p',[_v("sub")])])}"#]
    );
}

#[test]
fn test_single_text_child_is_inlined() {
    let result = compile("<div>hello</div>");
    assert_eq!(result.render, r#"with(this){return _c('div',[_v("hello")])}"#);
    assert!(result.static_render_fns.is_empty());
}

#[test]
fn test_once_is_hoisted() {
    let result = compile("<div><span v-once>{{ x }}</span></div>");
    assert_eq!(result.render, "with(this){return _c('div',[_m(0)])}");
    assert_eq!(
        result.static_render_fns,
        vec!["with(this){return _c('span',[_v(_s(x))])}"]
    );
}

#[test]
fn test_once_in_keyed_for() {
    let result = compile(r#"<div><div v-for="i in list" :key="i"><span v-once>{{ i }}</span></div></div>"#);
    assert!(result.errors.is_empty());
    assert!(
        result.render.contains("_o(_c('span',[_v(_s(i))]),0,i)"),
        "{}",
        result.render
    );
}

#[test]
fn test_once_in_unkeyed_for_is_an_error() {
    let result = compile(r#"<div><div v-for="i in list"><span v-once>{{ i }}</span></div></div>"#);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, ErrorKind::UnkeyedOnce);
}

#[test]
fn test_unkeyed_component_list_is_a_tip() {
    let result = compile(r#"<div><comp v-for="x in xs"></comp></div>"#);
    assert!(result.errors.is_empty());
    assert_eq!(
        result.tips[0].kind,
        ErrorKind::UnkeyedComponentList {
            tag: "comp".into(),
            alias: "x".into(),
            iterable: "xs".into(),
        }
    );
    assert!(result.tips[0].message().starts_with(r#"<comp v-for="x in xs">: component lists"#));
    assert_eq!(
        result.render,
        "with(this){return _c('div',_l((xs),function(x){return _c('comp')}),1)}"
    );
}

#[test]
fn test_v_pre_keeps_raw_markup() {
    let result = compile(r#"<div v-pre><span :a="b">{{ c }}</span></div>"#);
    assert_eq!(result.render, "with(this){return _m(0)}");
    assert_eq!(
        result.static_render_fns,
        vec![r#"with(this){return _c('div',{pre:true},[_c('span',{pre:true,attrs:{":a":"b"}},[_v("{{ c }}")])])}"#]
    );
}

#[test]
fn test_comments_are_kept_on_request() {
    let options = web_parser_options().with_comments(true);
    let result = compile_with("<div><!-- note --></div>", &options);
    assert_eq!(result.render, r#"with(this){return _c('div',[_e(" note ")])}"#);
}

#[test]
fn test_inline_template() {
    let result = compile(r#"<comp inline-template><div>{{ a }}</div></comp>"#);
    assert_eq!(
        result.render,
        r#"with(this){return _c('comp',{inlineTemplate:{render:function(){with(this){return _c('div',[_v(_s(a))])}},staticRenderFns:[]}})}"#
    );
}

#[test]
fn test_inline_template_needs_one_child() {
    let result = compile(r#"<comp inline-template><p>a</p><p>b</p></comp>"#);
    assert_eq!(result.errors[0].kind, ErrorKind::InlineTemplateChildren);
}

#[test]
fn test_ref_in_for() {
    let code = render(r#"<ul><li v-for="x in xs" ref="items"></li></ul>"#);
    assert!(code.contains(r#"{ref:"items",refInFor:true}"#), "{code}");
}

#[test]
fn test_key_modifier_and_exact() {
    let code = render(r#"<input @keyup.enter.exact="submit">"#);
    assert!(
        code.contains(r#"if(!$event.type.indexOf('key')&&_k($event.keyCode,"enter",13,$event.key,"Enter"))return null;if($event.ctrlKey||$event.shiftKey||$event.altKey||$event.metaKey)return null;return submit.apply(null, arguments)"#),
        "{code}"
    );
}

#[test]
fn test_model_with_dynamic_type() {
    let code = render(r#"<input v-model="value" :type="kind">"#);
    assert!(code.starts_with("with(this){return ((kind)==='checkbox')?"), "{code}");
    assert!(code.contains(r#"attrs:{"type":"checkbox"}"#));
    assert!(code.contains(r#"attrs:{"type":"radio"}"#));
    assert!(code.contains(r#"attrs:{"type":kind}"#));
}

#[test]
fn test_line_terminators_are_escaped() {
    let code = render("<p>a\u{2028}b</p>");
    assert_eq!(code, r#"with(this){return _c('p',[_v("a\u2028b")])}"#);
}
