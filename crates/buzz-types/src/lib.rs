//! Type definitions, interning registry, and placeholder engine.
//!
//! The registry hands out stable [`TypeId`] handles. Concrete types are
//! deduplicated by their canonical string, so two structurally identical
//! types always compare equal by id. Placeholders — stand-ins for types that
//! are not known yet — are never deduplicated: each one carries per-use state
//! (where it was created, how it was used) and is resolved *in place* once
//! the real type arrives, so every outstanding `TypeId` that pointed at the
//! placeholder transparently observes the resolved type.

pub mod def;
pub mod placeholder;
pub mod registry;

pub use def::{
    DefKind, EnumDef, FunctionDef, FunctionKind, ObjectDef, PlaceholderDef, PlaceholderRelation,
    TypeDef, TypeId,
};
pub use placeholder::TypeError;
pub use registry::TypeRegistry;

#[cfg(test)]
mod tests;
