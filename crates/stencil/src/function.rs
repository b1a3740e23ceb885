//! Render functions built from generated code.
//!
//! Generated code is handed to a JavaScript runtime as the body of a
//! function. Before that happens the body is parsed once, so a broken user
//! expression surfaces as a diagnostic rather than a syntax error at render
//! time.

use std::fmt;
use std::sync::Arc;

use stencil_parser::{CompilerError, ErrorKind};
use swc_common::{FileName, SourceMap};
use swc_ecma_parser::{Parser, StringInput, Syntax};

use crate::compiler::CompileResult;

/// The body of a render function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderFunction {
    body: String,
}

impl RenderFunction {
    /// Wraps `body` after checking that it is well formed.
    pub fn new(body: String) -> Result<Self, CompilerError> {
        match check_syntax(&body) {
            Ok(()) => Ok(Self { body }),
            Err(reason) => Err(CompilerError::new(
                ErrorKind::FunctionGeneration { reason, code: body },
                None,
            )),
        }
    }

    /// A function that renders nothing, used in place of a rejected body.
    pub fn noop() -> Self {
        Self::default()
    }

    /// The code inside the function.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether this is the empty function that replaced a rejected body.
    pub fn is_noop(&self) -> bool {
        self.body.is_empty()
    }
}

impl fmt::Display for RenderFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&wrap(&self.body))
    }
}

/// The cached output of [`Compiler::compile_to_functions`](crate::Compiler::compile_to_functions).
#[derive(Debug, Clone, Default)]
pub struct CompiledFunctions {
    /// Main render function.
    pub render: RenderFunction,
    /// Hoisted static subtrees, indexed by `_m(i)`.
    pub static_render_fns: Vec<RenderFunction>,
    /// Compile errors followed by function generation errors.
    pub errors: Vec<CompilerError>,
    /// Compile tips.
    pub tips: Vec<CompilerError>,
}

impl From<CompileResult> for CompiledFunctions {
    fn from(result: CompileResult) -> Self {
        let mut errors = result.errors;
        let mut make = |code: String| {
            RenderFunction::new(code).unwrap_or_else(|error| {
                errors.push(error);
                RenderFunction::noop()
            })
        };
        let render = make(result.render);
        let static_render_fns = result.static_render_fns.into_iter().map(&mut make).collect();
        Self {
            render,
            static_render_fns,
            errors,
            tips: result.tips,
        }
    }
}

/// Parses `body` as the body of a plain (non-strict) script function.
///
/// The error message of the first syntax error is returned.
pub fn check_syntax(body: &str) -> Result<(), String> {
    let cm: Arc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Custom("render".into()).into(), wrap(body));
    let mut parser = Parser::new(Syntax::Es(Default::default()), StringInput::from(&*fm), None);
    let script = parser.parse_script();
    let recovered = parser.take_errors();
    match script {
        Err(error) => Err(error.kind().msg().into_owned()),
        Ok(_) => match recovered.first() {
            Some(error) => Err(error.kind().msg().into_owned()),
            None => Ok(()),
        },
    }
}

fn wrap(body: &str) -> String {
    format!("function anonymous(\n) {{\n{body}\n}}")
}
