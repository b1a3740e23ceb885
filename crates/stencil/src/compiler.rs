//! The compile pipeline and the compiled-function cache.

use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use stencil_codegen::{generate, optimize};
use stencil_parser::{parse, Ast, CompilerError, Delimiters};

use crate::function::CompiledFunctions;
use crate::options::CompilerOptions;

/// Output of [`Compiler::compile`].
#[derive(Debug, Clone, Default)]
pub struct CompileResult {
    /// The parsed and optimized tree.
    pub ast: Ast,
    /// `with(this){return ...}` for the whole template.
    pub render: String,
    /// Bodies of the hoisted static subtrees.
    pub static_render_fns: Vec<String>,
    /// Problems with the template.
    pub errors: Vec<CompilerError>,
    /// Advice that does not affect the output.
    pub tips: Vec<CompilerError>,
}

/// A template compiler bound to a set of base options.
///
/// The compiler is `Sync`: the base options are read-only and the cache of
/// [`compile_to_functions`](Self::compile_to_functions) is behind a lock.
#[derive(Debug, Default)]
pub struct Compiler {
    base: CompilerOptions,
    cache: RwLock<FxHashMap<String, Arc<CompiledFunctions>>>,
}

impl Compiler {
    /// Creates a compiler with `base` options, usually a platform's.
    pub fn new(base: CompilerOptions) -> Self {
        Self {
            base,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// A compiler for HTML templates.
    pub fn web() -> Self {
        Self::new(crate::web_options())
    }

    /// The options every compile starts from.
    pub fn base_options(&self) -> &CompilerOptions {
        &self.base
    }

    /// Compiles `template` into render code.
    ///
    /// `options` are layered over the base options for this call only.
    /// Compilation never fails; problems are reported in
    /// [`CompileResult::errors`].
    pub fn compile(&self, template: &str, options: Option<&CompilerOptions>) -> CompileResult {
        compile_with(template, &self.resolve(options))
    }

    /// Compiles `template` into render functions, reusing an earlier result
    /// for the same delimiters and template.
    ///
    /// A repeated call returns the same `Arc`.
    pub fn compile_to_functions(
        &self,
        template: &str,
        options: Option<&CompilerOptions>,
    ) -> Arc<CompiledFunctions> {
        let options = self.resolve(options);
        let key = cache_key(options.delimiters.as_ref(), template);

        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(functions) = cached {
            log::debug!("compile cache hit ({} bytes)", template.len());
            return functions;
        }
        log::debug!("compile cache miss ({} bytes)", template.len());

        let functions = Arc::new(CompiledFunctions::from(compile_with(template, &options)));
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(key).or_insert(functions))
    }

    /// Number of cached templates.
    pub fn cache_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drops every cached template.
    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn resolve(&self, options: Option<&CompilerOptions>) -> CompilerOptions {
        match options {
            Some(options) => self.base.merge(options),
            None => self.base.clone(),
        }
    }
}

fn cache_key(delimiters: Option<&Delimiters>, template: &str) -> String {
    match delimiters {
        Some(delimiters) => format!("{},{}{template}", delimiters.open, delimiters.close),
        None => template.to_string(),
    }
}

/// Runs parse, optimize and generate over the trimmed template.
pub fn compile_with(template: &str, options: &CompilerOptions) -> CompileResult {
    let leading = template.len() - template.trim_start().len();
    let source = template.trim();

    let parsed = parse(source, &options.parser_options());
    let mut ast = parsed.ast;
    let mut errors = parsed.errors;
    let mut tips = parsed.tips;

    if options.should_optimize() {
        optimize(&mut ast, &options.optimizer_options());
    }
    let code = generate(&mut ast, &options.codegen_options());
    errors.extend(code.errors);
    tips.extend(code.tips);

    let keep_range = options.keeps_source_range();
    for diagnostic in errors.iter_mut().chain(tips.iter_mut()) {
        diagnostic.span = if keep_range {
            diagnostic.span.map(|span| span.shifted(leading))
        } else {
            None
        };
    }

    log::debug!(
        "compiled template: {} static render fns, {} errors, {} tips",
        code.static_render_fns.len(),
        errors.len(),
        tips.len()
    );

    CompileResult {
        ast,
        render: code.render,
        static_render_fns: code.static_render_fns,
        errors,
        tips,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key(None, "<div/>"), "<div/>");
        assert_eq!(
            cache_key(Some(&Delimiters::new("${", "}")), "<div/>"),
            "${,}<div/>"
        );
    }

    #[test]
    fn test_spans_are_dropped_without_source_range() {
        let result = compile_with("  <div><span></div>", &crate::web_options());
        assert!(!result.errors.is_empty());
        assert!(result.errors.iter().all(|error| error.span.is_none()));
    }
}
