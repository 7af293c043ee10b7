//! JSON dump of the AST.
//!
//! Every node emits `{ "node": "<Kind>", …kind-specific fields…,
//! "type_def": "<canonical>|N/A" }`. Field names are a stable contract used
//! by `buzz ast` tooling; changing them breaks downstream consumers.

use crate::ast::{Ast, CallArgument, NodeId, NodeKind, ObjectMember};
use buzz_common::Atom;
use buzz_types::TypeRegistry;
use serde_json::{Map, Value, json};

pub struct JsonDumper<'a> {
    ast: &'a Ast,
    registry: &'a TypeRegistry,
}

impl<'a> JsonDumper<'a> {
    #[must_use]
    pub fn new(ast: &'a Ast, registry: &'a TypeRegistry) -> Self {
        Self { ast, registry }
    }

    #[must_use]
    pub fn dump(&self, id: NodeId) -> Value {
        let node = self.ast.get(id);
        let mut object = Map::new();
        object.insert("node".to_string(), json!(node.kind.name()));
        if let (NodeKind::Function { .. }, Some(type_def)) = (&node.kind, node.type_def) {
            if let buzz_types::DefKind::Function(function) = &self.registry.def(type_def).kind {
                object.insert(
                    "function_kind".to_string(),
                    json!(format!("{:?}", function.kind)),
                );
            }
        }
        self.dump_fields(&node.kind, &mut object);
        let type_def = node
            .type_def
            .map_or_else(|| "N/A".to_string(), |ty| self.registry.canonical(ty));
        object.insert("type_def".to_string(), json!(type_def));
        Value::Object(object)
    }

    fn atom(&self, atom: Atom) -> Value {
        json!(self.registry.strings().resolve(atom))
    }

    fn optional_node(&self, id: Option<NodeId>) -> Value {
        id.map_or(Value::Null, |id| self.dump(id))
    }

    fn nodes(&self, ids: &[NodeId]) -> Value {
        Value::Array(ids.iter().map(|&id| self.dump(id)).collect())
    }

    fn arguments(&self, arguments: &[CallArgument]) -> Value {
        Value::Array(
            arguments
                .iter()
                .map(|argument| {
                    json!({
                        "name": argument.name.map(|name| self.atom(name)),
                        "value": self.dump(argument.value),
                    })
                })
                .collect(),
        )
    }

    fn dump_fields(&self, kind: &NodeKind, object: &mut Map<String, Value>) {
        let mut set = |key: &str, value: Value| {
            object.insert(key.to_string(), value);
        };
        match kind {
            NodeKind::Function { name, body, native } => {
                set("identifier", self.atom(*name));
                set("native", json!(native.is_some()));
                set("body", self.optional_node(*body));
            }
            NodeKind::Enum { name, cases } => {
                set("identifier", self.atom(*name));
                set(
                    "cases",
                    Value::Array(
                        cases
                            .iter()
                            .map(|(case, value)| {
                                json!({
                                    "name": self.atom(*case),
                                    "value": self.optional_node(*value),
                                })
                            })
                            .collect(),
                    ),
                );
            }
            NodeKind::VarDeclaration {
                name,
                constant,
                slot,
                slot_kind,
                value,
            }
            | NodeKind::ListDeclaration {
                name,
                constant,
                slot,
                slot_kind,
                value,
            }
            | NodeKind::MapDeclaration {
                name,
                constant,
                slot,
                slot_kind,
                value,
            } => {
                set("identifier", self.atom(*name));
                set("constant", json!(constant));
                set("slot", json!(slot));
                set("slot_type", json!(slot_kind.name()));
                set("value", self.optional_node(*value));
            }
            NodeKind::FunDeclaration {
                function,
                slot,
                slot_kind,
            } => {
                set("function", self.dump(*function));
                set("slot", json!(slot));
                set("slot_type", json!(slot_kind.name()));
            }
            NodeKind::ObjectDeclaration { name, members } => {
                set("identifier", self.atom(*name));
                set(
                    "members",
                    Value::Array(
                        members
                            .iter()
                            .map(|member| match member {
                                ObjectMember::Method { name, function } => json!({
                                    "name": self.atom(*name),
                                    "kind": "method",
                                    "function": self.dump(*function),
                                }),
                                ObjectMember::Field {
                                    name,
                                    type_def,
                                    default,
                                    is_static,
                                } => json!({
                                    "name": self.atom(*name),
                                    "kind": if *is_static { "static" } else { "field" },
                                    "type_def": self.registry.canonical(*type_def),
                                    "default": self.optional_node(*default),
                                }),
                            })
                            .collect(),
                    ),
                );
            }
            NodeKind::Binary {
                left,
                right,
                operator,
            } => {
                set("left", self.dump(*left));
                set("operator", json!(format!("{operator:?}")));
                set("right", self.dump(*right));
            }
            NodeKind::Unary { operand, operator } => {
                set("operator", json!(format!("{operator:?}")));
                set("left", self.dump(*operand));
            }
            NodeKind::Subscript {
                subscripted,
                index,
                value,
            } => {
                set("subscripted", self.dump(*subscripted));
                set("index", self.dump(*index));
                set("value", self.optional_node(*value));
            }
            NodeKind::Unwrap { unwrapped } | NodeKind::ForceUnwrap { unwrapped } => {
                set("unwrapped", self.dump(*unwrapped));
            }
            NodeKind::Is { left, of } => {
                set("left", self.dump(*left));
                set("right", json!(self.registry.canonical(*of)));
            }
            NodeKind::And { left, right } | NodeKind::Or { left, right } => {
                set("left", self.dump(*left));
                set("right", self.dump(*right));
            }
            NodeKind::NamedVariable {
                name,
                slot,
                slot_kind,
                value,
            } => {
                set("identifier", self.atom(*name));
                set("slot", json!(slot));
                set("slot_type", json!(slot_kind.name()));
                set("value", self.optional_node(*value));
            }
            NodeKind::Number { value } => {
                set("constant", json!(value));
            }
            NodeKind::String { elements } => {
                set("elements", self.nodes(elements));
            }
            NodeKind::StringLiteral { value } => {
                set("constant", self.atom(*value));
            }
            NodeKind::Boolean { value } => {
                set("constant", json!(value));
            }
            NodeKind::Null | NodeKind::Break | NodeKind::Continue => {}
            NodeKind::List { items } => {
                set("items", self.nodes(items));
            }
            NodeKind::Map { keys, values } => {
                set("keys", self.nodes(keys));
                set("values", self.nodes(values));
            }
            NodeKind::Super { member } => {
                set("identifier", self.atom(*member));
            }
            NodeKind::Dot {
                callee,
                member,
                value,
            } => {
                set("callee", self.dump(*callee));
                set("identifier", self.atom(*member));
                set("value", self.optional_node(*value));
            }
            NodeKind::ObjectInit { object: of, properties } => {
                set("object", self.dump(*of));
                set(
                    "properties",
                    Value::Array(
                        properties
                            .iter()
                            .map(|(name, value)| {
                                json!({
                                    "name": self.atom(*name),
                                    "value": self.dump(*value),
                                })
                            })
                            .collect(),
                    ),
                );
            }
            NodeKind::Throw { value } => {
                set("value", self.dump(*value));
            }
            NodeKind::Call {
                callee,
                arguments,
                catches,
            } => {
                set("callee", self.dump(*callee));
                set("arguments", self.arguments(arguments));
                set("catches", self.nodes(catches));
            }
            NodeKind::SuperCall {
                member,
                arguments,
                catches,
            } => {
                set("identifier", self.atom(*member));
                set("arguments", self.arguments(arguments));
                set("catches", self.nodes(catches));
            }
            NodeKind::If {
                condition,
                body,
                else_branch,
            } => {
                set("condition", self.dump(*condition));
                set("body", self.dump(*body));
                set("else", self.optional_node(*else_branch));
            }
            NodeKind::Block { statements } => {
                set("body", self.nodes(statements));
            }
            NodeKind::Return { value } => {
                set("value", self.optional_node(*value));
            }
            NodeKind::For {
                init_expression,
                condition,
                post_loop,
                body,
            } => {
                set("init_expression", self.optional_node(*init_expression));
                set("condition", self.dump(*condition));
                set("post_loop", self.nodes(post_loop));
                set("body", self.dump(*body));
            }
            NodeKind::ForEach {
                key,
                value,
                iterable,
                block,
            } => {
                set("key", self.optional_node(*key));
                set("value", self.dump(*value));
                set("iterable", self.dump(*iterable));
                set("block", self.dump(*block));
            }
            NodeKind::DoUntil { condition, block } | NodeKind::While { condition, block } => {
                set("condition", self.dump(*condition));
                set("block", self.dump(*block));
            }
            NodeKind::Export { name, alias } => {
                set("identifier", self.atom(*name));
                set("alias", alias.map_or(Value::Null, |alias| self.atom(alias)));
            }
            NodeKind::Import {
                imported_symbols,
                prefix,
                path,
            } => {
                set(
                    "imported_symbols",
                    Value::Array(
                        imported_symbols
                            .iter()
                            .map(|&symbol| self.atom(symbol))
                            .collect(),
                    ),
                );
                set(
                    "prefix",
                    prefix.map_or(Value::Null, |prefix| self.atom(prefix)),
                );
                set("path", self.atom(*path));
            }
            NodeKind::Catch { clause } => {
                set("clause", self.dump(*clause));
            }
        }
    }
}
