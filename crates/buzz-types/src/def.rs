//! `TypeDef` and its payload structs.

use buzz_common::Atom;
use buzz_scanner::Token;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// A stable handle into the [`crate::TypeRegistry`]'s slot vector.
///
/// Ids never move or get recycled; resolving a placeholder rewrites the slot
/// contents, not the id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    // Primitive types are pre-registered in slot order by `TypeRegistry::new`.
    pub const BOOL: TypeId = TypeId(0);
    pub const NUMBER: TypeId = TypeId(1);
    pub const STRING: TypeId = TypeId(2);
    pub const TYPE: TypeId = TypeId(3);
    pub const VOID: TypeId = TypeId(4);
}

/// A type descriptor: a kind plus the `optional` flag every type carries.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDef {
    pub kind: DefKind,
    pub optional: bool,
}

impl TypeDef {
    #[must_use]
    pub const fn new(kind: DefKind) -> Self {
        Self {
            kind,
            optional: false,
        }
    }

    #[must_use]
    pub const fn optional(kind: DefKind) -> Self {
        Self {
            kind,
            optional: true,
        }
    }

    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self.kind, DefKind::Placeholder(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DefKind {
    Bool,
    Number,
    String,
    /// First-class type value (`type` keyword).
    Type,
    Void,
    List {
        item: TypeId,
    },
    Map {
        key: TypeId,
        value: TypeId,
    },
    /// An object or class *definition*. Instances are `ObjectInstance`.
    Object(ObjectDef),
    ObjectInstance {
        of: TypeId,
    },
    /// An enum *definition*. Case values are `EnumInstance`.
    Enum(EnumDef),
    EnumInstance {
        of: TypeId,
    },
    /// Any callable: scripted functions, methods, and `extern` natives
    /// (distinguished by `native`).
    Function(FunctionDef),
    Placeholder(PlaceholderDef),
}

/// Where a function came from and how it may be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Method,
    Anonymous,
    /// Inline `catch` clause closure.
    Catch,
    /// An imported compilation unit's top-level function.
    Script,
    /// A root compilation unit's top-level function.
    ScriptEntryPoint,
    /// `main` at script scope, promoted from `ScriptEntryPoint` typing.
    EntryPoint,
    Test,
    Extern,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: Atom,
    pub return_type: TypeId,
    /// Parameter order is the call convention; insertion order is semantic.
    pub parameters: IndexMap<Atom, TypeId>,
    pub has_defaults: FxHashMap<Atom, bool>,
    pub kind: FunctionKind,
    pub lambda: bool,
    /// Body is an external symbol resolved from a shared library.
    pub native: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectDef {
    pub name: Atom,
    /// Field order matters for initialization and JSON output.
    pub fields: IndexMap<Atom, TypeId>,
    pub methods: FxHashMap<Atom, TypeId>,
    pub static_fields: FxHashMap<Atom, TypeId>,
    /// Member placeholders created by forward access (`Self.x` before the
    /// member is parsed); resolved when the declaration completes.
    pub placeholders: FxHashMap<Atom, TypeId>,
    pub static_placeholders: FxHashMap<Atom, TypeId>,
    pub super_type: Option<TypeId>,
    /// `class` declarations are inheritable, `object` declarations are not.
    pub inheritable: bool,
}

impl ObjectDef {
    #[must_use]
    pub fn new(name: Atom, inheritable: bool) -> Self {
        Self {
            name,
            fields: IndexMap::new(),
            methods: FxHashMap::default(),
            static_fields: FxHashMap::default(),
            placeholders: FxHashMap::default(),
            static_placeholders: FxHashMap::default(),
            super_type: None,
            inheritable,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumDef {
    pub name: Atom,
    pub case_type: TypeId,
    pub cases: Vec<Atom>,
}

/// How a child placeholder derived from its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderRelation {
    /// Child is the result type of calling the parent.
    Call,
    /// Child is the element type of indexing the parent.
    Subscript,
    /// Child is the key type when subscribing the parent as a map.
    Key,
    /// Child is the type of member `child.name` on the parent.
    FieldAccess,
    /// Parent is the destination type; child is the assigned value's type.
    Assignment,
    /// Child is the instance form of the parent (a type reference used in
    /// declaration position before the type is declared).
    Instance,
}

/// A stand-in for a type that is not known yet.
///
/// Placeholders form a DAG rooted at a reference to an unknown symbol. Each
/// child records the operation that produced it; the booleans record the
/// assumptions usage has imposed so far (checked by
/// [`crate::TypeRegistry::is_coherent`] and used for diagnostics).
#[derive(Clone, Debug, PartialEq)]
pub struct PlaceholderDef {
    /// Symbol name for root placeholders; member name for `FieldAccess`
    /// children.
    pub name: Option<Atom>,
    /// The token that created this placeholder. Diagnostics raised during
    /// resolution point here, at the original use site.
    pub where_token: Token,
    /// First parent this placeholder was linked under (a child can gain
    /// further parents, e.g. when one expression is both a call result and
    /// an assigned value; the per-edge relation lives in `children`).
    pub parent: Option<TypeId>,
    pub parent_relation: Option<PlaceholderRelation>,
    /// Outgoing edges: each child with the relation that produced it.
    pub children: Vec<(TypeId, PlaceholderRelation)>,
    /// Partial knowledge recorded before full resolution (e.g. a
    /// pre-registered `fun` placeholder is known to be a function).
    pub resolved_kind: Option<FunctionKind>,
    pub callable: Option<bool>,
    pub subscriptable: Option<bool>,
    pub field_accessible: Option<bool>,
    pub assignable: Option<bool>,
}

impl PlaceholderDef {
    #[must_use]
    pub fn new(name: Option<Atom>, where_token: Token) -> Self {
        Self {
            name,
            where_token,
            parent: None,
            parent_relation: None,
            children: Vec::new(),
            resolved_kind: None,
            callable: None,
            subscriptable: None,
            field_accessible: None,
            assignable: None,
        }
    }
}
