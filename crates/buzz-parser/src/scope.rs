//! Symbol tables: per-frame locals and upvalues, per-parser globals.
//!
//! Locals and upvalues live in fixed-capacity (255) arrays per [`Frame`];
//! the caps are observable in diagnostics and match the byte-code layer's
//! single-byte slot encoding. Globals form one ordered list per compilation
//! unit; import merging appends to it without ever removing entries, so
//! global indices stay stable for the byte-code layer.

use crate::ast::NodeId;
use buzz_common::Atom;
use buzz_common::limits::{MAX_LOCALS, MAX_UPVALUES};
use buzz_scanner::Literal;
use buzz_types::TypeId;

/// Which table a resolved variable reference landed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotKind {
    Local,
    UpValue,
    Global,
}

impl SlotKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SlotKind::Local => "Local",
            SlotKind::UpValue => "UpValue",
            SlotKind::Global => "Global",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Local {
    pub name: Atom,
    pub type_def: TypeId,
    /// Scope depth at declaration; `-1` until the initializer completes, so
    /// a local can never be read inside its own initializer.
    pub depth: i32,
    pub captured: bool,
    pub constant: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpValue {
    /// Slot in the enclosing frame's locals (`is_local`) or upvalues.
    pub index: u8,
    pub is_local: bool,
}

#[derive(Clone, Debug)]
pub struct Global {
    /// Namespace prefix stamped by a prefixed import.
    pub prefix: Option<Atom>,
    pub name: Atom,
    pub type_def: TypeId,
    /// False while the initializer is being parsed; reading an uninitialized
    /// global is an error.
    pub initialized: bool,
    pub exported: bool,
    pub export_alias: Option<Atom>,
    /// Merged from an import but not visible to the importing unit. Hidden
    /// globals stay in the list so indices remain stable.
    pub hidden: bool,
    pub constant: bool,
}

/// Per-function compilation context.
///
/// Frames form a stack through `enclosing`; the parser holds the innermost
/// one. Each frame tracks its locals, upvalues, scope depth, the `Function`
/// node being built, and that function's constant pool.
#[derive(Debug)]
pub struct Frame {
    pub enclosing: Option<Box<Frame>>,
    pub locals: Vec<Local>,
    pub upvalues: Vec<UpValue>,
    pub scope_depth: i32,
    pub function_node: NodeId,
    /// The `Function` type of the function being compiled (return type
    /// checks for `return` statements).
    pub function_type: TypeId,
    pub constants: Vec<Literal>,
}

impl Frame {
    #[must_use]
    pub fn new(function_node: NodeId, function_type: TypeId) -> Self {
        Self {
            enclosing: None,
            locals: Vec::new(),
            upvalues: Vec::new(),
            scope_depth: 0,
            function_node,
            function_type,
            constants: Vec::new(),
        }
    }

    /// Add a local in uninitialized state (`depth = -1`). Errors when the
    /// frame is full.
    pub fn add_local(
        &mut self,
        name: Atom,
        type_def: TypeId,
        constant: bool,
    ) -> Result<u8, &'static str> {
        if self.locals.len() >= MAX_LOCALS {
            return Err("Can't have more than 255 local variables in one function.");
        }
        self.locals.push(Local {
            name,
            type_def,
            depth: -1,
            captured: false,
            constant,
        });
        Ok((self.locals.len() - 1) as u8)
    }

    /// Register an upvalue, deduplicating repeated captures of the same slot.
    pub fn add_upvalue(&mut self, index: u8, is_local: bool) -> Result<u8, &'static str> {
        let upvalue = UpValue { index, is_local };
        if let Some(existing) = self.upvalues.iter().position(|&u| u == upvalue) {
            return Ok(existing as u8);
        }
        if self.upvalues.len() >= MAX_UPVALUES {
            return Err("Can't capture more than 255 variables in one function.");
        }
        self.upvalues.push(upvalue);
        Ok((self.upvalues.len() - 1) as u8)
    }

    /// Intern a literal in this function's constant pool, deduplicating.
    pub fn add_constant(&mut self, literal: Literal) -> usize {
        if let Some(existing) = self.constants.iter().position(|&c| c == literal) {
            return existing;
        }
        self.constants.push(literal);
        self.constants.len() - 1
    }
}

#[cfg(test)]
#[path = "../tests/scope_tests.rs"]
mod tests;
