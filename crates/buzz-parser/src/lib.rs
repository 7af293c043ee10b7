//! Single-pass parser, resolver, and type inference for buzz.
//!
//! The parser builds the AST, resolves names across locals, upvalues, and
//! globals, and infers types in one pass. Forward references to globals are
//! carried by type placeholders ([`buzz_types`]): by the time a declaration
//! completes, every earlier use of it has either been proven consistent or
//! produced a diagnostic at the use site. The compiler never revisits a
//! function body after parsing it.

pub mod ast;
pub mod native;
pub mod parser;
pub mod scope;

pub use ast::json::JsonDumper;
pub use ast::{Ast, Node, NodeId, NodeKind};
pub use native::{NativeHandle, NativeResolver, PathResolver};
pub use parser::{CompilationUnit, ParseOptions, Parser};
pub use scope::{Frame, Global, Local, SlotKind, UpValue};
