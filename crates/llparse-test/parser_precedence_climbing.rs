//! Scenario 5: a binary-operator precedence rule parses with the right
//! shape and associativity, not just without error.

use llparse_core::llspec::{Opcode, Qualifier};

use crate::utils::{compile, parse_tree, w_emit, Node};

fn grammar() -> llparse_core::Grammar {
  compile(|w| {
    w_emit(w, Opcode::LprDecl { name: "int".into() });
    w_emit(w, Opcode::LprDecl { name: "plus".into() });
    w_emit(w, Opcode::LprDecl { name: "star".into() });
    w_emit(w, Opcode::PprDecl { name: "Expr".into() });

    w_emit(w, Opcode::Lpr { name: "int".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::KleenePlus);
    w_emit(w, Opcode::Charset { text: "0-9".into() });
    w_emit(w, Opcode::Close);
    w_emit(w, Opcode::Close);

    w_emit(w, Opcode::Lpr { name: "plus".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::String { text: "+".into() });
    w_emit(w, Opcode::Close);

    w_emit(w, Opcode::Lpr { name: "star".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::String { text: "*".into() });
    w_emit(w, Opcode::Close);

    // Expr : Int | Expr '+' Expr | Expr '*' Expr, '*' binding tighter.
    w_emit(w, Opcode::Ppr { name: "Expr".into(), qualifier: Qualifier::Precedence });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::Name { target: "int".into() });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::Name { target: "Expr".into() });
    w_emit(w, Opcode::Name { target: "plus".into() });
    w_emit(w, Opcode::Name { target: "Expr".into() });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::Name { target: "Expr".into() });
    w_emit(w, Opcode::Name { target: "star".into() });
    w_emit(w, Opcode::Name { target: "Expr".into() });
    w_emit(w, Opcode::Close);
  })
}

#[test]
fn binds_star_tighter_than_plus() {
  let g = grammar();
  let int_id = g.resolve("int").expect("int declared").0;
  let plus_id = g.resolve("plus").expect("plus declared").0;
  let star_id = g.resolve("star").expect("star declared").0;
  let expr_id = g.resolve("Expr").expect("Expr declared").0;

  let tree = parse_tree(&g, "Expr", "1+2*3");

  let expected = Node::Branch(
    expr_id,
    vec![
      Node::Leaf(int_id),
      Node::Leaf(plus_id),
      Node::Branch(expr_id, vec![Node::Leaf(int_id), Node::Leaf(star_id), Node::Leaf(int_id)]),
    ],
  );
  assert_eq!(tree, expected, "expected 1+2*3 to parse as 1+(2*3)");
}

#[test]
fn left_associates_same_precedence_operators() {
  let g = grammar();
  let expr_id = g.resolve("Expr").expect("Expr declared").0;

  let tree = parse_tree(&g, "Expr", "1+2+3");
  let Node::Branch(id, children) = &tree else { panic!("expected a branch, got {tree:?}") };
  assert_eq!(*id, expr_id);
  // "1+2+3" must be (1+2)+3: the left child is itself an Expr, the right a
  // bare Int leaf.
  assert_eq!(children.len(), 3);
  assert!(matches!(children[0], Node::Branch(i, _) if i == expr_id), "left operand should be a nested Expr: {children:?}");
  assert!(matches!(children[2], Node::Leaf(_)), "right operand should be a bare Int leaf: {children:?}");
}
