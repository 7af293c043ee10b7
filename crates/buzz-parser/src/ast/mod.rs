//! AST node model.
//!
//! Nodes live in one arena per compilation root and reference each other by
//! [`NodeId`]. Every node carries the token it started at and an optional
//! type annotation; expression nodes always get one, statements usually not.
//! The arena is append-only: no node is dropped mid-parse, and imported
//! units' nodes share the root's arena so `Import` nodes can point into them.

pub mod json;

use crate::native::NativeHandle;
use crate::scope::SlotKind;
use buzz_common::Atom;
use buzz_scanner::{Token, TokenKind};
use buzz_types::TypeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("AST arena overflow"));
        self.nodes.push(node);
        id
    }

    /// # Panics
    ///
    /// Panics if `id` was not produced by this arena.
    #[must_use]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// The token this node started at; diagnostics and JSON locations use it.
    pub location: Token,
    pub type_def: Option<TypeId>,
}

/// A call argument, optionally named (`f(x: 1)`).
#[derive(Debug, Clone)]
pub struct CallArgument {
    pub name: Option<Atom>,
    pub value: NodeId,
}

/// One member of an `object`/`class` declaration body.
#[derive(Debug, Clone)]
pub enum ObjectMember {
    Method {
        name: Atom,
        function: NodeId,
    },
    Field {
        name: Atom,
        type_def: TypeId,
        default: Option<NodeId>,
        is_static: bool,
    },
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A function literal: named, anonymous, method, catch clause, test, or
    /// a compilation unit's synthetic top-level function. The function's
    /// signature and kind live in the node's `type_def`.
    Function {
        name: Atom,
        body: Option<NodeId>,
        native: Option<NativeHandle>,
    },
    Enum {
        name: Atom,
        cases: Vec<(Atom, Option<NodeId>)>,
    },
    VarDeclaration {
        name: Atom,
        constant: bool,
        slot: u32,
        slot_kind: SlotKind,
        value: Option<NodeId>,
    },
    FunDeclaration {
        function: NodeId,
        slot: u32,
        slot_kind: SlotKind,
    },
    /// A `var` declaration whose declared type is a list; kept distinct so
    /// the byte-code layer can pre-size the backing storage.
    ListDeclaration {
        name: Atom,
        constant: bool,
        slot: u32,
        slot_kind: SlotKind,
        value: Option<NodeId>,
    },
    MapDeclaration {
        name: Atom,
        constant: bool,
        slot: u32,
        slot_kind: SlotKind,
        value: Option<NodeId>,
    },
    ObjectDeclaration {
        name: Atom,
        members: Vec<ObjectMember>,
    },
    Binary {
        left: NodeId,
        right: NodeId,
        operator: TokenKind,
    },
    Unary {
        operand: NodeId,
        operator: TokenKind,
    },
    Subscript {
        subscripted: NodeId,
        index: NodeId,
        /// Set when the subscript is an assignment target (`a[i] = v`).
        value: Option<NodeId>,
    },
    Unwrap {
        unwrapped: NodeId,
    },
    ForceUnwrap {
        unwrapped: NodeId,
    },
    Is {
        left: NodeId,
        of: TypeId,
    },
    And {
        left: NodeId,
        right: NodeId,
    },
    Or {
        left: NodeId,
        right: NodeId,
    },
    NamedVariable {
        name: Atom,
        slot: u32,
        slot_kind: SlotKind,
        /// Set when the variable is an assignment target (`x = v`).
        value: Option<NodeId>,
    },
    Number {
        value: f64,
    },
    /// An interpolated string; elements alternate `StringLiteral` pieces and
    /// arbitrary expressions.
    String {
        elements: Vec<NodeId>,
    },
    StringLiteral {
        value: Atom,
    },
    Boolean {
        value: bool,
    },
    Null,
    List {
        items: Vec<NodeId>,
    },
    Map {
        keys: Vec<NodeId>,
        values: Vec<NodeId>,
    },
    Super {
        member: Atom,
    },
    Dot {
        callee: NodeId,
        member: Atom,
        /// Set when the member access is an assignment target.
        value: Option<NodeId>,
    },
    ObjectInit {
        object: NodeId,
        properties: Vec<(Atom, NodeId)>,
    },
    Throw {
        value: NodeId,
    },
    Break,
    Continue,
    Call {
        callee: NodeId,
        arguments: Vec<CallArgument>,
        catches: Vec<NodeId>,
    },
    SuperCall {
        member: Atom,
        arguments: Vec<CallArgument>,
        catches: Vec<NodeId>,
    },
    If {
        condition: NodeId,
        body: NodeId,
        else_branch: Option<NodeId>,
    },
    Block {
        statements: Vec<NodeId>,
    },
    Return {
        value: Option<NodeId>,
    },
    For {
        init_expression: Option<NodeId>,
        condition: NodeId,
        post_loop: Vec<NodeId>,
        body: NodeId,
    },
    ForEach {
        /// `VarDeclaration` for the key binding, when two bindings are given.
        key: Option<NodeId>,
        /// `VarDeclaration` for the value binding.
        value: NodeId,
        iterable: NodeId,
        block: NodeId,
    },
    DoUntil {
        condition: NodeId,
        block: NodeId,
    },
    While {
        condition: NodeId,
        block: NodeId,
    },
    Export {
        name: Atom,
        alias: Option<Atom>,
    },
    Import {
        imported_symbols: Vec<Atom>,
        prefix: Option<Atom>,
        path: Atom,
    },
    /// One inline `catch` clause attached to a call.
    Catch {
        clause: NodeId,
    },
}

impl NodeKind {
    /// The `"node"` discriminator emitted in the JSON dump.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            NodeKind::Function { .. } => "Function",
            NodeKind::Enum { .. } => "Enum",
            NodeKind::VarDeclaration { .. } => "VarDeclaration",
            NodeKind::FunDeclaration { .. } => "FunDeclaration",
            NodeKind::ListDeclaration { .. } => "ListDeclaration",
            NodeKind::MapDeclaration { .. } => "MapDeclaration",
            NodeKind::ObjectDeclaration { .. } => "ObjectDeclaration",
            NodeKind::Binary { .. } => "Binary",
            NodeKind::Unary { .. } => "Unary",
            NodeKind::Subscript { .. } => "Subscript",
            NodeKind::Unwrap { .. } => "Unwrap",
            NodeKind::ForceUnwrap { .. } => "ForceUnwrap",
            NodeKind::Is { .. } => "Is",
            NodeKind::And { .. } => "And",
            NodeKind::Or { .. } => "Or",
            NodeKind::NamedVariable { .. } => "NamedVariable",
            NodeKind::Number { .. } => "Number",
            NodeKind::String { .. } => "String",
            NodeKind::StringLiteral { .. } => "StringLiteral",
            NodeKind::Boolean { .. } => "Boolean",
            NodeKind::Null => "Null",
            NodeKind::List { .. } => "List",
            NodeKind::Map { .. } => "Map",
            NodeKind::Super { .. } => "Super",
            NodeKind::Dot { .. } => "Dot",
            NodeKind::ObjectInit { .. } => "ObjectInit",
            NodeKind::Throw { .. } => "Throw",
            NodeKind::Break => "Break",
            NodeKind::Continue => "Continue",
            NodeKind::Call { .. } => "Call",
            NodeKind::SuperCall { .. } => "SuperCall",
            NodeKind::If { .. } => "If",
            NodeKind::Block { .. } => "Block",
            NodeKind::Return { .. } => "Return",
            NodeKind::For { .. } => "For",
            NodeKind::ForEach { .. } => "ForEach",
            NodeKind::DoUntil { .. } => "DoUntil",
            NodeKind::While { .. } => "While",
            NodeKind::Export { .. } => "Export",
            NodeKind::Import { .. } => "Import",
            NodeKind::Catch { .. } => "Catch",
        }
    }
}
