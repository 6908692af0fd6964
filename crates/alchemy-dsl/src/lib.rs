//! Alchemy DSL Compiler
//!
//! This crate compiles workflow source text into a graph of typed node
//! instances and port-to-port edges.
//!
//! # Pipeline Overview
//!
//! ```text
//! ┌─────────┐     ┌─────────┐     ┌───────────┐     ┌──────────┐
//! │ Source  │────▶│ Tokens  │────▶│    AST    │────▶│  Graph   │
//! │  Text   │     │ (Lexer) │     │ (Parser)  │     │(Resolver)│
//! └─────────┘     └─────────┘     └───────────┘     └──────────┘
//!                                       │                 ▲
//!                                       ▼                 │
//!                                 ┌───────────┐     ┌──────────┐
//!                                 │Synthesizer│────▶│ Registry │
//!                                 └───────────┘     └──────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use alchemy_dsl::{CompileOptions, Compiler};
//!
//! let mut compiler = Compiler::new(CompileOptions::default());
//! let output = compiler.compile(r#"
//!     workspace {
//!         node Blur { inputs { in: image } outputs { out: image } }
//!     }
//! "#);
//! assert!(output.is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod compiler;
pub mod error;
pub mod legacy;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod synth;
pub mod token;
pub mod walk;

pub use compiler::{CompileOptions, Compiler};
pub use error::{Error, Result, SyntaxError};
pub use parser::{ParseOutcome, Parser};

use alchemy_core::CompileOutput;

/// Compile a source string against a fresh registry of built-in types
pub fn compile(source: &str) -> CompileOutput {
    Compiler::new(CompileOptions::default()).compile(source)
}
