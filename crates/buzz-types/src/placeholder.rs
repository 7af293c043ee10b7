//! The placeholder engine: linking usage relations and propagating
//! resolution when concrete types arrive.
//!
//! A placeholder is created whenever the parser references a name that is not
//! declared yet, or an expression's type cannot be determined because one of
//! its inputs is a placeholder. Each use links a child placeholder to its
//! parent with the relation that produced it. When a declaration completes,
//! [`TypeRegistry::resolve_placeholder`] walks the relation tree: children
//! either become concrete types or produce a diagnostic at their original use
//! site. This replaces a second semantic pass — the compiler never revisits a
//! function body after parsing it.

use crate::def::{DefKind, PlaceholderRelation, TypeDef, TypeId};
use crate::registry::TypeRegistry;
use buzz_scanner::Token;
use tracing::{debug, trace};

/// A type error raised during placeholder resolution, located at the
/// placeholder's originating token (the use site, not the declaration site).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub at: Token,
    pub message: String,
}

impl TypeRegistry {
    /// Record that `child` derives from `parent` via `relation`.
    ///
    /// Both ends must be placeholders. The relation also records a usage
    /// assumption on the parent (`callable`, `subscriptable`, ...), checked
    /// by [`Self::is_coherent`].
    pub fn link(&self, parent: TypeId, child: TypeId, relation: PlaceholderRelation) {
        debug_assert!(self.def(parent).is_placeholder());
        debug_assert!(self.def(child).is_placeholder());

        self.with_placeholder_mut(parent, |def| {
            def.children.push((child, relation));
            match relation {
                PlaceholderRelation::Call => def.callable = Some(true),
                PlaceholderRelation::Subscript | PlaceholderRelation::Key => {
                    def.subscriptable = Some(true);
                }
                PlaceholderRelation::FieldAccess => def.field_accessible = Some(true),
                PlaceholderRelation::Assignment => def.assignable = Some(true),
                PlaceholderRelation::Instance => {}
            }
        });
        self.with_placeholder_mut(child, |def| {
            if def.parent.is_none() {
                def.parent = Some(parent);
                def.parent_relation = Some(relation);
            }
        });
        trace!(parent = parent.0, child = child.0, ?relation, "linked placeholder");
    }

    /// A placeholder is incoherent when its recorded usage assumptions cannot
    /// all hold for one type (nothing is both callable and subscriptable, or
    /// field-accessible and subscriptable).
    #[must_use]
    pub fn is_coherent(&self, id: TypeId) -> bool {
        match &self.def(id).kind {
            DefKind::Placeholder(def) => {
                let callable = def.callable.unwrap_or(false);
                let subscriptable = def.subscriptable.unwrap_or(false);
                let field_accessible = def.field_accessible.unwrap_or(false);
                !(callable && subscriptable) && !(field_accessible && subscriptable)
            }
            _ => true,
        }
    }

    /// Resolve placeholder `placeholder` to the concrete type `concrete`.
    ///
    /// Children are validated against their relation and recursively
    /// resolved, then the placeholder's slot is overwritten in place so every
    /// outstanding reference observes the concrete type. `constant` is the
    /// constness of the binding being resolved; an `Assignment` child on a
    /// constant binding is an error.
    ///
    /// Each child's resolution is independent: one failing relation does not
    /// stop the others, and every error points at that placeholder's own
    /// `where` token. Resolving an already-resolved id, or resolving against
    /// a type that is itself still a placeholder, is a no-op.
    pub fn resolve_placeholder(
        &self,
        placeholder: TypeId,
        concrete: TypeId,
        constant: bool,
    ) -> Vec<TypeError> {
        let mut errors = Vec::new();
        self.resolve_inner(placeholder, concrete, constant, &mut errors);
        errors
    }

    fn resolve_inner(
        &self,
        placeholder: TypeId,
        concrete: TypeId,
        constant: bool,
        errors: &mut Vec<TypeError>,
    ) {
        let concrete_def = self.def(concrete);
        if concrete_def.is_placeholder() {
            // The resolving type is itself unknown; resolution will happen
            // when it does.
            return;
        }
        let current = self.def(placeholder);
        let DefKind::Placeholder(def) = current.kind else {
            // Already resolved; second resolution is a no-op.
            return;
        };
        debug!(
            placeholder = placeholder.0,
            concrete = self.canonical(concrete),
            children = def.children.len(),
            "resolving placeholder"
        );

        for &(child, relation) in &def.children {
            self.resolve_child(child, relation, concrete, &concrete_def, constant, errors);
        }

        self.overwrite(
            placeholder,
            TypeDef {
                kind: concrete_def.kind,
                optional: concrete_def.optional || current.optional,
            },
        );
    }

    fn resolve_child(
        &self,
        child: TypeId,
        relation: PlaceholderRelation,
        concrete: TypeId,
        concrete_def: &TypeDef,
        constant: bool,
        errors: &mut Vec<TypeError>,
    ) {
        let DefKind::Placeholder(child_def) = self.def(child).kind else {
            return;
        };
        let at = child_def.where_token;

        match relation {
            PlaceholderRelation::Call => match &concrete_def.kind {
                DefKind::Function(function) => {
                    self.resolve_inner(child, function.return_type, false, errors);
                }
                DefKind::Object(_) => {
                    self.resolve_inner(child, self.instance_of(concrete), false, errors);
                }
                _ => errors.push(TypeError {
                    at,
                    message: format!("Can't call `{}`.", self.canonical(concrete)),
                }),
            },
            PlaceholderRelation::Subscript => match concrete_def.kind {
                DefKind::List { item } => self.resolve_inner(child, item, false, errors),
                DefKind::Map { value, .. } => {
                    // Map lookups can miss, so the element type is optional.
                    self.resolve_inner(child, self.with_optional(value, true), false, errors);
                }
                _ => errors.push(TypeError {
                    at,
                    message: format!("Can't subscript `{}`.", self.canonical(concrete)),
                }),
            },
            PlaceholderRelation::Key => match concrete_def.kind {
                DefKind::Map { key, .. } => self.resolve_inner(child, key, false, errors),
                _ => errors.push(TypeError {
                    at,
                    message: format!("Can't subscript `{}` with a key.", self.canonical(concrete)),
                }),
            },
            PlaceholderRelation::FieldAccess => {
                self.resolve_field_access(child, &child_def, concrete, concrete_def, errors);
            }
            PlaceholderRelation::Instance => {
                self.resolve_inner(child, self.instance_of(concrete), false, errors);
            }
            PlaceholderRelation::Assignment => {
                if constant {
                    errors.push(TypeError {
                        at,
                        message: "Can't assign to constant.".to_string(),
                    });
                } else {
                    self.resolve_inner(child, self.instance_of(concrete), false, errors);
                }
            }
        }
    }

    /// Instance member lookup on an object definition, walking supers.
    fn instance_member(&self, object_type: TypeId, member: buzz_common::Atom) -> Option<TypeId> {
        let mut current = Some(object_type);
        while let Some(object_id) = current {
            let DefKind::Object(object) = self.def(object_id).kind else {
                return None;
            };
            if let Some(&field) = object.fields.get(&member) {
                return Some(field);
            }
            if let Some(&method) = object.methods.get(&member) {
                return Some(method);
            }
            current = object.super_type;
        }
        None
    }

    fn resolve_field_access(
        &self,
        child: TypeId,
        child_def: &crate::def::PlaceholderDef,
        concrete: TypeId,
        concrete_def: &TypeDef,
        errors: &mut Vec<TypeError>,
    ) {
        let at = child_def.where_token;
        let Some(member) = child_def.name else {
            errors.push(TypeError {
                at,
                message: "Field access requires a member name.".to_string(),
            });
            return;
        };

        match &concrete_def.kind {
            DefKind::ObjectInstance { of } => match self.def(*of).kind {
                DefKind::Object(object) => {
                    // Fields shadow methods; the inheritance chain is walked
                    // when the object itself misses.
                    if let Some(found) = self.instance_member(*of, member) {
                        self.resolve_inner(child, found, false, errors);
                    } else {
                        errors.push(TypeError {
                            at,
                            message: format!(
                                "Object `{}` has no member `{}`.",
                                self.strings().resolve(object.name),
                                self.strings().resolve(member)
                            ),
                        });
                    }
                }
                _ => errors.push(TypeError {
                    at,
                    message: format!("Can't access members of `{}`.", self.canonical(concrete)),
                }),
            },
            DefKind::Object(object) => {
                // Forward static access (`Self.x` style) before instances exist.
                if let Some(&field) = object.static_fields.get(&member) {
                    self.resolve_inner(child, field, false, errors);
                } else if let Some(&method) = object.methods.get(&member) {
                    self.resolve_inner(child, method, false, errors);
                } else {
                    errors.push(TypeError {
                        at,
                        message: format!(
                            "Object `{}` has no static member `{}`.",
                            self.strings().resolve(object.name),
                            self.strings().resolve(member)
                        ),
                    });
                }
            }
            DefKind::Enum(enumeration) => {
                // A missing case is a definite error, never silent.
                if enumeration.cases.contains(&member) {
                    self.resolve_inner(child, self.instance_of(concrete), false, errors);
                } else {
                    errors.push(TypeError {
                        at,
                        message: format!(
                            "Enum `{}` has no case `{}`.",
                            self.strings().resolve(enumeration.name),
                            self.strings().resolve(member)
                        ),
                    });
                }
            }
            _ => errors.push(TypeError {
                at,
                message: format!("Can't access members of `{}`.", self.canonical(concrete)),
            }),
        }
    }
}
