//! Compiler configuration and option merging.

use std::sync::Arc;

use stencil_codegen::codegen::base_directives;
use stencil_codegen::{CodegenOptions, DirectiveGen, DirectiveMap, OptimizerOptions};
use stencil_parser::{BasePlatform, Delimiters, Module, ParserOptions, Platform, WhitespaceMode};

/// Options for one compilation.
///
/// Unset (`None`) fields fall back to the value of the options they are
/// merged into, and finally to the parser defaults.
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    /// Tag and attribute knowledge.
    pub platform: Option<Arc<dyn Platform>>,
    /// Node hooks; merging appends.
    pub modules: Vec<Arc<dyn Module>>,
    /// Directive code generators; merging replaces entries by name.
    pub directives: DirectiveMap,
    /// Interpolation markers.
    pub delimiters: Option<Delimiters>,
    /// Whitespace handling.
    pub whitespace: Option<WhitespaceMode>,
    /// Keep whitespace between elements when `whitespace` is unset.
    pub preserve_whitespace: Option<bool>,
    /// Keep comment nodes.
    pub comments: Option<bool>,
    /// Report diagnostics with spans into the untrimmed template.
    pub output_source_range: Option<bool>,
    /// Apply HTML content-model rules.
    pub expect_html: Option<bool>,
    /// Decode `&#10;` and `&#9;` in attribute values.
    pub should_decode_newlines: Option<bool>,
    /// Decode `&#10;` and `&#9;` in `href` of `<a>`.
    pub should_decode_newlines_for_href: Option<bool>,
    /// Run the static optimizer; on unless `Some(false)`.
    pub optimize: Option<bool>,
}

impl CompilerOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the platform that knows the target's tags.
    pub fn with_platform(mut self, platform: Arc<dyn Platform>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Appends a module.
    pub fn with_module(mut self, module: Arc<dyn Module>) -> Self {
        self.modules.push(module);
        self
    }

    /// Adds or replaces the directive handler for `name`.
    pub fn with_directive(mut self, name: impl Into<String>, directive: Arc<dyn DirectiveGen>) -> Self {
        self.directives.insert(name.into(), directive);
        self
    }

    /// Sets the text interpolation delimiters.
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = Some(delimiters);
        self
    }

    /// Sets how whitespace-only text is handled.
    pub fn with_whitespace(mut self, mode: WhitespaceMode) -> Self {
        self.whitespace = Some(mode);
        self
    }

    /// Keeps comments in the output.
    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = Some(comments);
        self
    }

    /// Attaches source spans to diagnostics.
    pub fn with_output_source_range(mut self, enabled: bool) -> Self {
        self.output_source_range = Some(enabled);
        self
    }

    /// Enables or disables static hoisting.
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = Some(optimize);
        self
    }

    /// Layers `overrides` over `self`.
    ///
    /// Modules of `overrides` run after the modules of `self`; directives
    /// of `overrides` replace same-named ones. Every other field is taken
    /// from `overrides` when it is set there.
    pub fn merge(&self, overrides: &CompilerOptions) -> CompilerOptions {
        let mut merged = self.clone();
        merged.modules.extend(overrides.modules.iter().cloned());
        for (name, directive) in &overrides.directives {
            merged.directives.insert(name.clone(), Arc::clone(directive));
        }
        if overrides.platform.is_some() {
            merged.platform = overrides.platform.clone();
        }
        if overrides.delimiters.is_some() {
            merged.delimiters = overrides.delimiters.clone();
        }
        merged.whitespace = overrides.whitespace.or(self.whitespace);
        merged.preserve_whitespace = overrides.preserve_whitespace.or(self.preserve_whitespace);
        merged.comments = overrides.comments.or(self.comments);
        merged.output_source_range = overrides.output_source_range.or(self.output_source_range);
        merged.expect_html = overrides.expect_html.or(self.expect_html);
        merged.should_decode_newlines = overrides
            .should_decode_newlines
            .or(self.should_decode_newlines);
        merged.should_decode_newlines_for_href = overrides
            .should_decode_newlines_for_href
            .or(self.should_decode_newlines_for_href);
        merged.optimize = overrides.optimize.or(self.optimize);
        merged
    }

    /// The platform, or one without tag knowledge.
    pub fn platform(&self) -> Arc<dyn Platform> {
        self.platform
            .clone()
            .unwrap_or_else(|| Arc::new(BasePlatform))
    }

    /// Parser options, falling back to the parser defaults for unset fields.
    pub fn parser_options(&self) -> ParserOptions {
        let defaults = ParserOptions::default();
        ParserOptions {
            platform: self.platform(),
            modules: self.modules.clone(),
            delimiters: self.delimiters.clone(),
            whitespace: self.whitespace,
            preserve_whitespace: self
                .preserve_whitespace
                .unwrap_or(defaults.preserve_whitespace),
            comments: self.comments.unwrap_or(defaults.comments),
            expect_html: self.expect_html.unwrap_or(defaults.expect_html),
            should_decode_newlines: self
                .should_decode_newlines
                .unwrap_or(defaults.should_decode_newlines),
            should_decode_newlines_for_href: self
                .should_decode_newlines_for_href
                .unwrap_or(defaults.should_decode_newlines_for_href),
        }
    }

    /// Optimizer options for the resolved platform and modules.
    pub fn optimizer_options(&self) -> OptimizerOptions {
        OptimizerOptions::new(self.platform(), &self.modules)
    }

    /// Code generator options; the `on`, `bind` and `cloak` handlers are
    /// always present unless overridden by name.
    pub fn codegen_options(&self) -> CodegenOptions {
        let mut directives = base_directives();
        for (name, directive) in &self.directives {
            directives.insert(name.clone(), Arc::clone(directive));
        }
        CodegenOptions {
            platform: self.platform(),
            modules: self.modules.clone(),
            directives,
        }
    }

    pub(crate) fn should_optimize(&self) -> bool {
        self.optimize != Some(false)
    }

    pub(crate) fn keeps_source_range(&self) -> bool {
        self.output_source_range == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_codegen::codegen::CloakDirective;
    use stencil_parser::web::{web_modules, WebPlatform};

    #[test]
    fn test_merge_appends_modules() {
        let base = CompilerOptions::new().with_module(web_modules()[0].clone());
        let extra = CompilerOptions::new().with_module(web_modules()[1].clone());
        let merged = base.merge(&extra);
        assert_eq!(merged.modules.len(), 2);
        assert!(format!("{:?}", merged.modules[0]).contains("Class"));
        assert!(format!("{:?}", merged.modules[1]).contains("Style"));
    }

    #[test]
    fn test_merge_overrides_set_fields_only() {
        let base = CompilerOptions::new()
            .with_comments(true)
            .with_whitespace(WhitespaceMode::Condense)
            .with_platform(Arc::new(WebPlatform));
        let overrides = CompilerOptions::new().with_comments(false);
        let merged = base.merge(&overrides);
        assert_eq!(merged.comments, Some(false));
        assert_eq!(merged.whitespace, Some(WhitespaceMode::Condense));
        assert!(merged.platform.is_some());
    }

    #[test]
    fn test_merge_layers_directives() {
        let base = CompilerOptions::new().with_directive("focus", Arc::new(CloakDirective));
        let overrides = CompilerOptions::new().with_directive("tooltip", Arc::new(CloakDirective));
        let merged = base.merge(&overrides);
        let names: Vec<_> = merged.directives.keys().map(String::as_str).collect();
        assert_eq!(names, ["focus", "tooltip"]);
    }

    #[test]
    fn test_codegen_options_keep_base_directives() {
        let options = CompilerOptions::new().with_directive("focus", Arc::new(CloakDirective));
        let codegen = options.codegen_options();
        for name in ["on", "bind", "cloak", "focus"] {
            assert!(codegen.directives.contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn test_parser_defaults_apply_to_unset_fields() {
        let parser = CompilerOptions::new().parser_options();
        assert!(parser.preserve_whitespace);
        assert!(!parser.comments);
        assert!(!parser.expect_html);
    }

    #[test]
    fn test_optimize_is_on_by_default() {
        assert!(CompilerOptions::new().should_optimize());
        assert!(!CompilerOptions::new().with_optimize(false).should_optimize());
    }
}
