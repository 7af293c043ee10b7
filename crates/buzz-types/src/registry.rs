//! The type registry: slot storage, canonical strings, and interning.

use crate::def::{DefKind, PlaceholderDef, TypeDef, TypeId};
use buzz_common::Interner;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Owns every `TypeDef` of a compilation root behind stable [`TypeId`]s.
///
/// Concrete (non-placeholder) types are interned: `get_or_intern` with two
/// structurally identical descriptors returns the same id. Placeholders are
/// allocated fresh on every call — each carries per-use state and must retain
/// identity until resolution overwrites its slot.
///
/// Interior mutability keeps the registry usable behind `&self` from the
/// parser and any nested import parses; the front end is single-threaded and
/// the registry is treated as immutable once parsing completes.
pub struct TypeRegistry {
    slots: RefCell<Vec<TypeDef>>,
    interned: RefCell<FxHashMap<String, TypeId>>,
    strings: Rc<Interner>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new(strings: Rc<Interner>) -> Self {
        let registry = Self {
            slots: RefCell::new(Vec::new()),
            interned: RefCell::new(FxHashMap::default()),
            strings,
        };
        // Slot order must match the TypeId::BOOL..TypeId::VOID constants.
        for kind in [
            DefKind::Bool,
            DefKind::Number,
            DefKind::String,
            DefKind::Type,
            DefKind::Void,
        ] {
            registry.get_or_intern(TypeDef::new(kind));
        }
        registry
    }

    #[must_use]
    pub fn strings(&self) -> &Rc<Interner> {
        &self.strings
    }

    /// Intern a concrete descriptor, or allocate a fresh slot for a
    /// placeholder (placeholders are never deduplicated).
    pub fn get_or_intern(&self, def: TypeDef) -> TypeId {
        // Types that contain an unresolved placeholder anywhere must not be
        // interned either: their canonical strings are not yet meaningful and
        // would collide across distinct placeholders.
        if def.is_placeholder() || self.contains_placeholder(&def) {
            return self.push(def);
        }
        let canonical = self.canonical_of(&def);
        if let Some(&existing) = self.interned.borrow().get(&canonical) {
            return existing;
        }
        let id = self.push(def);
        trace!(canonical, id = id.0, "interned type");
        self.interned.borrow_mut().insert(canonical, id);
        id
    }

    /// Allocate a fresh placeholder slot.
    pub fn placeholder(&self, def: PlaceholderDef) -> TypeId {
        self.push(TypeDef::new(DefKind::Placeholder(def)))
    }

    /// Clone out the descriptor behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this registry.
    #[must_use]
    pub fn def(&self, id: TypeId) -> TypeDef {
        self.slots.borrow()[id.0 as usize].clone()
    }

    /// Overwrite the slot behind `id`. Resolution uses this to rewrite a
    /// placeholder into its concrete type without touching any reference.
    pub(crate) fn overwrite(&self, id: TypeId, def: TypeDef) {
        self.slots.borrow_mut()[id.0 as usize] = def;
    }

    /// Mutate an object definition in place (member insertion while its
    /// declaration is being parsed). The canonical string of an object is its
    /// sentinel-prefixed name, so member changes never invalidate interning.
    pub fn with_object_mut<R>(
        &self,
        id: TypeId,
        f: impl FnOnce(&mut crate::def::ObjectDef) -> R,
    ) -> Option<R> {
        let mut slots = self.slots.borrow_mut();
        match &mut slots[id.0 as usize].kind {
            DefKind::Object(def) => Some(f(def)),
            _ => None,
        }
    }

    pub(crate) fn with_placeholder_mut<R>(
        &self,
        id: TypeId,
        f: impl FnOnce(&mut PlaceholderDef) -> R,
    ) -> Option<R> {
        let mut slots = self.slots.borrow_mut();
        match &mut slots[id.0 as usize].kind {
            DefKind::Placeholder(def) => Some(f(def)),
            _ => None,
        }
    }

    /// The `ObjectInstance`/`EnumInstance` view of a definition type; any
    /// other type is its own instance form.
    pub fn instance_of(&self, id: TypeId) -> TypeId {
        let def = self.def(id);
        match def.kind {
            DefKind::Object(_) => self.get_or_intern(TypeDef {
                kind: DefKind::ObjectInstance { of: id },
                optional: def.optional,
            }),
            DefKind::Enum(_) => self.get_or_intern(TypeDef {
                kind: DefKind::EnumInstance { of: id },
                optional: def.optional,
            }),
            _ => id,
        }
    }

    /// A type identical to `id` with the `optional` flag overridden.
    ///
    /// Placeholders are adjusted in place (they are identity types, so a
    /// copy would sever the relation DAG).
    pub fn with_optional(&self, id: TypeId, optional: bool) -> TypeId {
        let mut def = self.def(id);
        if def.optional == optional {
            return id;
        }
        if def.is_placeholder() {
            self.slots.borrow_mut()[id.0 as usize].optional = optional;
            return id;
        }
        def.optional = optional;
        self.get_or_intern(def)
    }

    // =========================================================================
    // Canonical strings
    // =========================================================================

    /// The canonical string of the type behind `id`.
    ///
    /// This is the interning key, so its exact spelling is a compatibility
    /// contract: `bool`/`num`/`str`/`type`/`void`, `[item]`, `{key,value}`,
    /// `Function name(p1,p2) > ret`, instances by declared name, definitions
    /// with an `object `/`enum ` sentinel prefix, `?` suffix when optional.
    #[must_use]
    pub fn canonical(&self, id: TypeId) -> String {
        self.canonical_of(&self.def(id))
    }

    pub(crate) fn canonical_of(&self, def: &TypeDef) -> String {
        let mut base = match &def.kind {
            DefKind::Bool => "bool".to_string(),
            DefKind::Number => "num".to_string(),
            DefKind::String => "str".to_string(),
            DefKind::Type => "type".to_string(),
            DefKind::Void => "void".to_string(),
            DefKind::List { item } => format!("[{}]", self.canonical(*item)),
            DefKind::Map { key, value } => {
                format!("{{{},{}}}", self.canonical(*key), self.canonical(*value))
            }
            DefKind::Object(object) => format!("object {}", self.strings.resolve(object.name)),
            DefKind::Enum(enumeration) => {
                format!("enum {}", self.strings.resolve(enumeration.name))
            }
            DefKind::ObjectInstance { of } => match self.def(*of).kind {
                DefKind::Object(object) => self.strings.resolve(object.name),
                _ => "object instance".to_string(),
            },
            DefKind::EnumInstance { of } => match self.def(*of).kind {
                DefKind::Enum(enumeration) => self.strings.resolve(enumeration.name),
                _ => "enum instance".to_string(),
            },
            DefKind::Function(function) => {
                let parameters = function
                    .parameters
                    .values()
                    .map(|&p| self.canonical(p))
                    .collect::<Vec<_>>()
                    .join(",");
                format!(
                    "Function {}({}) > {}",
                    self.strings.resolve(function.name),
                    parameters,
                    self.canonical(function.return_type)
                )
            }
            DefKind::Placeholder(placeholder) => match placeholder.name {
                Some(name) => self.strings.resolve(name),
                None => "placeholder".to_string(),
            },
        };
        if def.optional {
            base.push('?');
        }
        base
    }

    /// Parse a canonical string back into a type, for the primitive, list,
    /// map, and optional forms (the ones that round-trip without a symbol
    /// table). Returns `None` for malformed input or named types.
    pub fn parse_canonical(&self, text: &str) -> Option<TypeId> {
        let (id, rest) = self.parse_canonical_prefix(text)?;
        if rest.is_empty() { Some(id) } else { None }
    }

    fn parse_canonical_prefix<'t>(&self, text: &'t str) -> Option<(TypeId, &'t str)> {
        let (base, mut rest) = if let Some(inner) = text.strip_prefix('[') {
            let (item, after) = self.parse_canonical_prefix(inner)?;
            let after = after.strip_prefix(']')?;
            (
                self.get_or_intern(TypeDef::new(DefKind::List { item })),
                after,
            )
        } else if let Some(inner) = text.strip_prefix('{') {
            let (key, after) = self.parse_canonical_prefix(inner)?;
            let after = after.strip_prefix(',')?;
            let (value, after) = self.parse_canonical_prefix(after)?;
            let after = after.strip_prefix('}')?;
            (
                self.get_or_intern(TypeDef::new(DefKind::Map { key, value })),
                after,
            )
        } else if let Some(after) = text.strip_prefix("bool") {
            (TypeId::BOOL, after)
        } else if let Some(after) = text.strip_prefix("num") {
            (TypeId::NUMBER, after)
        } else if let Some(after) = text.strip_prefix("str") {
            (TypeId::STRING, after)
        } else if let Some(after) = text.strip_prefix("type") {
            (TypeId::TYPE, after)
        } else if let Some(after) = text.strip_prefix("void") {
            (TypeId::VOID, after)
        } else {
            return None;
        };
        if let Some(after) = rest.strip_prefix('?') {
            rest = after;
            return Some((self.with_optional(base, true), rest));
        }
        Some((base, rest))
    }

    fn contains_placeholder(&self, def: &TypeDef) -> bool {
        match &def.kind {
            DefKind::Placeholder(_) => true,
            DefKind::List { item } => self.contains_placeholder(&self.def(*item)),
            DefKind::Map { key, value } => {
                self.contains_placeholder(&self.def(*key))
                    || self.contains_placeholder(&self.def(*value))
            }
            DefKind::ObjectInstance { of } | DefKind::EnumInstance { of } => {
                self.def(*of).is_placeholder()
            }
            DefKind::Function(function) => {
                self.def(function.return_type).is_placeholder()
                    || function
                        .parameters
                        .values()
                        .any(|&p| self.def(p).is_placeholder())
            }
            _ => false,
        }
    }

    fn push(&self, def: TypeDef) -> TypeId {
        let mut slots = self.slots.borrow_mut();
        let id = TypeId(u32::try_from(slots.len()).expect("type registry overflow"));
        slots.push(def);
        id
    }
}
