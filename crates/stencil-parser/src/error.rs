//! Compiler diagnostics.
//!
//! Nothing in the pipeline aborts on a malformed template. Problems are
//! recorded as [`CompilerError`]s in one of two lists: errors, which make the
//! output suspect, and tips, which point at questionable but working code.

use stencil_span::Span;
use thiserror::Error;

/// A diagnostic produced while compiling a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct CompilerError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Where it went wrong, when known.
    pub span: Option<Span>,
}

impl CompilerError {
    /// Creates a new diagnostic.
    pub fn new(kind: ErrorKind, span: Option<Span>) -> Self {
        Self { kind, span }
    }

    /// Returns the diagnostic text.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// The kind of diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    // === Tokenizer ===
    /// An open tag was closed implicitly.
    #[error("tag <{tag}> has no matching end tag.")]
    UnclosedTag {
        /// The tag as written in the source.
        tag: String,
    },

    /// Input that could not be tokenized was emitted as text.
    #[error("Mal-formatted tag at end of template: \"{rest}\"")]
    MalformedTag {
        /// The unconsumed remainder.
        rest: String,
    },

    // === Tree structure ===
    /// An attribute name contains characters that cannot appear in one.
    #[error(
        "Invalid dynamic argument expression: attribute names cannot contain spaces, quotes, <, >, / or =."
    )]
    InvalidAttributeName,

    /// An attribute appears twice on the same element.
    #[error("duplicate attribute: {name}")]
    DuplicateAttribute {
        /// The repeated attribute name.
        name: String,
    },

    /// A `<style>` or script element was found in the template.
    #[error(
        "Templates should only be responsible for mapping the state to the UI. Avoid placing tags with side-effects in your templates, such as <{tag}>, as they will not be parsed."
    )]
    ForbiddenTag {
        /// The forbidden tag.
        tag: String,
    },

    /// The root element may render zero or several nodes.
    #[error("Cannot use <{tag}> as component root element because it may contain multiple nodes.")]
    FragmentRoot {
        /// `slot` or `template`.
        tag: String,
    },

    /// The root element carries `v-for`.
    #[error("Cannot use v-for on stateful component root element because it renders multiple elements.")]
    ForOnRoot,

    /// A second root-level element that is not part of a condition chain.
    #[error(
        "Component template should contain exactly one root element. If you are using v-if on multiple elements, use v-else-if to chain them instead."
    )]
    MultipleRoots,

    /// The template is nothing but text.
    #[error("Component template requires a root element, rather than just text.")]
    TextOnlyTemplate,

    /// Text found outside the root element.
    #[error("text \"{text}\" outside root element will be ignored.")]
    TextOutsideRoot {
        /// The trimmed text.
        text: String,
    },

    // === Directives ===
    /// A `v-for` expression without `in`/`of`.
    #[error("Invalid v-for expression: {expression}")]
    InvalidFor {
        /// The raw expression.
        expression: String,
    },

    /// `v-else` or `v-else-if` without a preceding `v-if` sibling.
    #[error("v-{directive} used on element <{tag}> without corresponding v-if.")]
    ElseWithoutIf {
        /// `else` or `else-if="..."`.
        directive: String,
        /// The element carrying the directive.
        tag: String,
    },

    /// Text between the branches of a condition chain.
    #[error("text \"{text}\" between v-if and v-else(-if) will be ignored.")]
    TextBetweenBranches {
        /// The trimmed text.
        text: String,
    },

    /// `key` on a `<template>` element.
    #[error("<template> cannot be keyed. Place the key on real elements instead.")]
    KeyedTemplate,

    /// `key` on a `<slot>` element.
    #[error(
        "`key` does not work on <slot> because slots are abstract outlets and can possibly expand into multiple elements. Use the key on a wrapping element instead."
    )]
    KeyedSlot,

    /// The v-for index is used as key inside `<transition-group>`.
    #[error(
        "Do not use v-for index as key on <transition-group> children, this is the same as not using keys."
    )]
    IndexAsKey,

    /// The deprecated `scope` attribute on a `<template>`.
    #[error(
        "the \"scope\" attribute for scoped slots have been deprecated and replaced by \"slot-scope\" since 2.5. The new \"slot-scope\" attribute can also be used on plain elements in addition to <template> to denote scoped slots."
    )]
    DeprecatedScope,

    /// `slot-scope` combined with `v-for` on the same element.
    #[error(
        "Ambiguous combined usage of slot-scope and v-for on <{tag}> (v-for takes higher priority). Use a wrapper <template> for the scoped slot to make it clearer."
    )]
    SlotScopeWithFor {
        /// The element carrying both.
        tag: String,
    },

    /// `v-slot` mixed with `slot`/`slot-scope`.
    #[error("Unexpected mixed usage of different slot syntaxes.")]
    MixedSlotSyntax,

    /// `<template v-slot>` nested below a non-component.
    #[error("<template v-slot> can only appear at the root level inside the receiving component")]
    MisplacedSlotTemplate,

    /// `v-slot` on a plain element.
    #[error("v-slot can only be used on components or <template>.")]
    SlotOnElement,

    /// `v-slot` on a component that also has named slot templates.
    #[error(
        "To avoid scope ambiguity, the default slot should also use <template> syntax when there are other named slots."
    )]
    AmbiguousDefaultSlot,

    /// `#` without a slot name.
    #[error("v-slot shorthand syntax requires a slot name.")]
    MissingSlotName,

    /// `v-bind:x=""`.
    #[error("The value for a v-bind expression cannot be empty. Found in \"v-bind:{name}\"")]
    EmptyBinding {
        /// The bound attribute.
        name: String,
    },

    /// `{{ }}` used in a plain attribute value.
    #[error(
        "{name}=\"{value}\": Interpolation inside attributes has been removed. Use v-bind or the colon shorthand instead. For example, instead of <div {name}=\"{{{{ val }}}}\">, use <div :{name}=\"val\">."
    )]
    InterpolationInAttribute {
        /// The attribute name.
        name: String,
        /// The raw attribute value.
        value: String,
    },

    /// `v-model` bound straight to a `v-for` alias.
    #[error(
        "<{tag} v-model=\"{value}\">: You are binding v-model directly to a v-for iteration alias. This will not be able to modify the v-for source array because writing to the alias is like modifying a function local variable. Consider using an array of objects and use v-model on an object property instead."
    )]
    ModelOnForAlias {
        /// The element carrying `v-model`.
        tag: String,
        /// The model expression.
        value: String,
    },

    /// `.passive` combined with `.prevent`.
    #[error("passive and prevent can't be used together. Passive handler can't prevent default event.")]
    PassiveWithPrevent,

    // === Code generation ===
    /// `v-once` inside an unkeyed `v-for`.
    #[error("v-once can only be used inside v-for that is keyed. ")]
    UnkeyedOnce,

    /// A component rendered by `v-for` without a key.
    #[error(
        "<{tag} v-for=\"{alias} in {iterable}\">: component lists rendered with v-for should have explicit keys. See https://vuejs.org/guide/list.html#key for more info."
    )]
    UnkeyedComponentList {
        /// The repeated component.
        tag: String,
        /// The loop alias.
        alias: String,
        /// The iterated expression.
        iterable: String,
    },

    /// An inline-template component without exactly one child element.
    #[error("Inline-template components must have exactly one child element.")]
    InlineTemplateChildren,

    /// `v-on="obj"` with modifiers.
    #[error("v-on without argument does not support modifiers.")]
    ListenersWithModifiers,

    /// `v-model` on a file input.
    #[error(
        "<{tag} v-model=\"{value}\" type=\"file\">:\nFile inputs are read only. Use a v-on:change listener instead."
    )]
    ModelOnFileInput {
        /// The element.
        tag: String,
        /// The model expression.
        value: String,
    },

    /// `v-model` on an element that cannot hold a value.
    #[error(
        "<{tag} v-model=\"{value}\">: v-model is not supported on this element type. If you are working with contenteditable, it's recommended to wrap a library dedicated for that purpose inside a custom component."
    )]
    UnsupportedModel {
        /// The element.
        tag: String,
        /// The model expression.
        value: String,
    },

    /// `:value` together with `v-model`.
    #[error(
        "{binding}=\"{value}\" conflicts with v-model on the same element because the latter already expands to a value binding internally"
    )]
    ValueConflictsWithModel {
        /// `v-bind:value` or `:value`.
        binding: String,
        /// The bound expression.
        value: String,
    },

    // === Function generation ===
    /// Generated code that cannot be turned into a function.
    #[error("Failed to generate render function: {reason} in\n\n{code}\n")]
    FunctionGeneration {
        /// Why the code was rejected.
        reason: String,
        /// The offending code.
        code: String,
    },
}

/// Collected errors and tips of one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Problems with the template.
    pub errors: Vec<CompilerError>,
    /// Advice that does not affect the output.
    pub tips: Vec<CompilerError>,
}

impl Diagnostics {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error.
    pub fn error(&mut self, kind: ErrorKind, span: Option<Span>) {
        log::trace!("error: {kind}");
        self.errors.push(CompilerError::new(kind, span));
    }

    /// Records a tip.
    pub fn tip(&mut self, kind: ErrorKind, span: Option<Span>) {
        log::trace!("tip: {kind}");
        self.tips.push(CompilerError::new(kind, span));
    }

    /// Moves every diagnostic of `other` into `self`.
    pub fn extend(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
        self.tips.extend(other.tips);
    }

    /// Returns true if neither errors nor tips were recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.tips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolation_message_keeps_braces() {
        let kind = ErrorKind::InterpolationInAttribute {
            name: "id".into(),
            value: "{{ a }}".into(),
        };
        assert_eq!(
            kind.to_string(),
            "id=\"{{ a }}\": Interpolation inside attributes has been removed. Use v-bind or the colon shorthand instead. For example, instead of <div id=\"{{ val }}\">, use <div :id=\"val\">."
        );
    }

    #[test]
    fn test_diagnostics_split() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.error(ErrorKind::MultipleRoots, None);
        diagnostics.tip(ErrorKind::IndexAsKey, Some(Span::at(1, 2)));
        assert_eq!(diagnostics.errors.len(), 1);
        assert_eq!(diagnostics.tips[0].span, Some(Span::at(1, 2)));
    }
}
