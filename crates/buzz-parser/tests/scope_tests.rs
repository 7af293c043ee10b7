use super::*;
use crate::ast::NodeId;
use buzz_types::TypeId;

fn frame() -> Frame {
    Frame::new(NodeId(0), TypeId::VOID)
}

#[test]
fn locals_cap_at_255() {
    let mut frame = frame();
    for i in 0..MAX_LOCALS {
        assert!(frame.add_local(Atom(i as u32), TypeId::NUMBER, false).is_ok());
    }
    assert!(frame.add_local(Atom(999), TypeId::NUMBER, false).is_err());
}

#[test]
fn new_locals_start_uninitialized() {
    let mut frame = frame();
    let slot = frame.add_local(Atom(0), TypeId::NUMBER, false).unwrap();
    assert_eq!(frame.locals[slot as usize].depth, -1);
    assert!(!frame.locals[slot as usize].captured);
}

#[test]
fn upvalues_deduplicate_by_slot_and_locality() {
    let mut frame = frame();
    let first = frame.add_upvalue(3, true).unwrap();
    let again = frame.add_upvalue(3, true).unwrap();
    let other = frame.add_upvalue(3, false).unwrap();

    assert_eq!(first, again);
    assert_ne!(first, other);
    assert_eq!(frame.upvalues.len(), 2);
}

#[test]
fn constant_pool_deduplicates_literals() {
    let mut frame = frame();
    let a = frame.add_constant(Literal::Number(1.0));
    let b = frame.add_constant(Literal::Number(1.0));
    let c = frame.add_constant(Literal::Number(2.0));

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(frame.constants.len(), 2);
}
