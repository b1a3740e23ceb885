//! Tests for the compile pipeline: option merging, trimming, source ranges
//! and the render-function cache.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use stencil::{
    compile, web_options, Compiler, CompilerOptions, Delimiters, ErrorKind, WhitespaceMode,
};
use stencil_codegen::{DirectiveContext, DirectiveGen};
use stencil_parser::ast::{Directive, Element};
use stencil_parser::helpers::add_prop;

#[test]
fn test_compile_web_template() {
    let result = compile(r#"<div><p v-if="a">A</p><p v-else-if="b">B</p><p v-else>C</p></div>"#, None);
    assert!(result.errors.is_empty());
    insta::assert_snapshot!(
        result.render,
        @r#"with(this){return _c('div',[(a)?_c('p',[_v("A")]):(b)?_c('p',[_v("B")]):_c('p',[_v("C")])])}"#
    );
}

#[test]
fn test_static_subtree_is_hoisted() {
    let result = compile("<div><p>a</p><p>b</p></div>", None);
    insta::assert_snapshot!(result.render, @"with(this){return _m(0)}");
    insta::assert_snapshot!(
        result.static_render_fns.join("\n"),
        @r#"with(this){return _c('div',[_c('p',[_v("a")]),_c('p',[_v("b")])])}"#
    );
}

#[test]
fn test_optimizer_can_be_disabled() {
    let options = CompilerOptions::new().with_optimize(false);
    let result = compile("<div><p>a</p><p>b</p></div>", Some(&options));
    assert_eq!(
        result.render,
        r#"with(this){return _c('div',[_c('p',[_v("a")]),_c('p',[_v("b")])])}"#
    );
    assert!(result.static_render_fns.is_empty());
}

#[test]
fn test_surrounding_whitespace_is_trimmed() {
    let result = compile("\n\n   <span>x</span>\n  ", None);
    assert!(result.errors.is_empty());
    assert_eq!(result.render, r#"with(this){return _c('span',[_v("x")])}"#);
}

#[test]
fn test_source_range_accounts_for_trimmed_whitespace() {
    let template = "\n  <div><span></div>";
    let options = CompilerOptions::new().with_output_source_range(true);
    let result = compile(template, Some(&options));
    let error = &result.errors[0];
    assert_eq!(error.kind, ErrorKind::UnclosedTag { tag: "span".into() });
    let span = error.span.expect("span");
    assert_eq!(span.range().start, 8);
    assert!(span.slice(template).is_some_and(|text| text.starts_with("<span")));
}

#[test]
fn test_text_only_template() {
    let result = compile("just text", None);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, ErrorKind::TextOnlyTemplate);
    assert!(result.ast.root.is_none());
    assert_eq!(result.render, r#"with(this){return _c("div")}"#);
}

#[test]
fn test_custom_delimiters() {
    let options = CompilerOptions::new().with_delimiters(Delimiters::new("${", "}"));
    let result = compile("<p>${ a } {{ b }}</p>", Some(&options));
    assert_eq!(
        result.render,
        r#"with(this){return _c('p',[_v(_s(a)+" {{ b }}")])}"#
    );
}

#[test]
fn test_comments_option() {
    let template = "<div><!-- c --><p>{{ a }}</p></div>";
    let without = compile(template, None);
    assert_eq!(without.render, "with(this){return _c('div',[_c('p',[_v(_s(a))])])}");

    let options = CompilerOptions::new().with_comments(true);
    let with = compile(template, Some(&options));
    assert_eq!(
        with.render,
        r#"with(this){return _c('div',[_e(" c "),_c('p',[_v(_s(a))])])}"#
    );
}

#[test]
fn test_condense_whitespace() {
    let template = "<div>\n  <span>a</span>\n  <span>b</span> <i>{{ c }}</i>\n</div>";
    let options = CompilerOptions::new().with_whitespace(WhitespaceMode::Condense);
    let result = compile(template, Some(&options));
    assert_eq!(
        result.render,
        r#"with(this){return _c('div',[_c('span',[_v("a")]),_c('span',[_v("b")]),_v(" "),_c('i',[_v(_s(c))])])}"#
    );
}

#[derive(Debug)]
struct AutofocusDirective;

impl DirectiveGen for AutofocusDirective {
    fn generate(&self, el: &mut Element, dir: &Directive, _cx: &mut DirectiveContext<'_>) -> bool {
        add_prop(el, "autofocus", "true", dir.span, false);
        false
    }
}

#[test]
fn test_custom_directive_from_options() {
    let template = r#"<input v-focus>"#;
    let runtime = compile(template, None);
    assert_eq!(
        runtime.render,
        r#"with(this){return _c('input',{directives:[{name:"focus",rawName:"v-focus"}]})}"#
    );

    let options = CompilerOptions::new().with_directive("focus", Arc::new(AutofocusDirective));
    let compiled = compile(template, Some(&options));
    assert_eq!(
        compiled.render,
        r#"with(this){return _c('input',{domProps:{"autofocus":true}})}"#
    );
}

#[test]
fn test_tips_are_separate_from_errors() {
    let result = compile(r#"<ul><item v-for="x in xs"></item></ul>"#, None);
    assert!(result.errors.is_empty());
    assert_eq!(result.tips.len(), 1);
    assert!(matches!(result.tips[0].kind, ErrorKind::UnkeyedComponentList { .. }));
}

#[test]
fn test_cached_functions_are_shared() {
    let compiler = Compiler::web();
    let first = compiler.compile_to_functions("<p>{{ a }}</p>", None);
    let second = compiler.compile_to_functions("<p>{{ a }}</p>", None);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.render.body(), "with(this){return _c('p',[_v(_s(a))])}");
    assert_eq!(compiler.cache_len(), 1);
}

#[test]
fn test_cache_is_keyed_by_delimiters() {
    let compiler = Compiler::web();
    let options = CompilerOptions::new().with_delimiters(Delimiters::new("[[", "]]"));
    let default = compiler.compile_to_functions("<p>[[ a ]]</p>", None);
    let custom = compiler.compile_to_functions("<p>[[ a ]]</p>", Some(&options));
    assert!(!Arc::ptr_eq(&default, &custom));
    assert_eq!(default.render.body(), r#"with(this){return _c('p',[_v("[[ a ]]")])}"#);
    assert_eq!(custom.render.body(), "with(this){return _c('p',[_v(_s(a))])}");
    assert_eq!(compiler.cache_len(), 2);

    compiler.clear_cache();
    assert_eq!(compiler.cache_len(), 0);
}

#[test]
fn test_broken_expression_becomes_function_error() {
    let compiler = Compiler::web();
    let functions = compiler.compile_to_functions("<p>{{ a( }}</p>", None);
    assert!(functions.render.is_noop());
    assert_eq!(functions.errors.len(), 1);
    match &functions.errors[0].kind {
        ErrorKind::FunctionGeneration { reason, code } => {
            assert!(!reason.is_empty());
            assert!(code.contains("_s(a()"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_division_after_increment_renders() {
    let compiler = Compiler::web();
    let functions = compiler.compile_to_functions("<p>{{ count++ / 2 }}</p>", None);
    assert!(functions.errors.is_empty(), "{:?}", functions.errors);
    assert!(!functions.render.is_noop());
    assert_eq!(functions.render.body(), "with(this){return _c('p',[_v(_s(count++ / 2))])}");
}

#[test]
fn test_static_render_fns_become_functions() {
    let compiler = Compiler::web();
    let functions = compiler.compile_to_functions("<div><b>x</b><i>y</i></div>", None);
    assert!(functions.errors.is_empty());
    assert_eq!(functions.static_render_fns.len(), 1);
    assert_eq!(functions.render.body(), "with(this){return _m(0)}");
}

#[test]
fn test_compiler_is_shared_across_threads() {
    let compiler = Compiler::web();
    let template = r#"<ul><li v-for="i in items" :key="i">{{ i }}</li></ul>"#;
    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| compiler.compile_to_functions(template, None)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread panicked"))
            .collect()
    });
    for result in &results[1..] {
        assert!(Arc::ptr_eq(&results[0], result));
    }
}

#[test]
fn test_base_options_are_not_mutated_by_overrides() {
    let compiler = Compiler::new(web_options());
    let options = CompilerOptions::new().with_comments(true);
    compiler.compile("<div><!-- x --></div>", Some(&options));
    assert_eq!(compiler.base_options().comments, None);
}
