//! `Opcode::PrecedPred`/`Opcode::Pylon` are part of the opcode contract a
//! `Writer` can emit directly, independent of the `Qualifier::Precedence`
//! lowering pass that synthesizes the same terms internally. This checks
//! that path on its own: emitted straight into an ordinary rule, they must
//! thread through `Lowerer::emit_term`'s dispatch and land in the compiled
//! rule's terms in order.

use llparse_core::llspec::{Opcode, Qualifier};
use llparse_core::parse_table::Term;
use llparse_core::symbol::Domain;

use crate::utils::{compile, w_emit};

#[test]
fn preced_pred_and_pylon_emitted_directly_land_in_the_compiled_rule() {
  let g = compile(|w| {
    w_emit(w, Opcode::LprDecl { name: "tok".into() });
    w_emit(w, Opcode::PprDecl { name: "Start".into() });

    w_emit(w, Opcode::Lpr { name: "tok".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::String { text: "a".into() });
    w_emit(w, Opcode::Close);

    w_emit(w, Opcode::Ppr { name: "Start".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::PrecedPred { preced_max: 5, preced_val: 2 });
    w_emit(w, Opcode::Name { target: "tok".into() });
    w_emit(w, Opcode::Pylon);
    w_emit(w, Opcode::Close);
  });

  let (tok_id, _) = g.resolve("tok").expect("tok declared");
  let (start_id, start_domain) = g.resolve("Start").expect("Start declared");
  assert_eq!(start_domain, Domain::Token);

  let table = g.ppr_table();
  let rule_idx = table.nonterm_info(start_id).expect("Start has an info entry").rules.clone();
  assert_eq!(rule_idx.len(), 1, "the single alternative should produce a single rule");

  let terms = &table.rule(rule_idx[0]).terms;
  assert_eq!(
    terms,
    &[
      Term::PrecedencePredicate { preced_max: 5, preced_val: 2 },
      Term::Terminal { low: tok_id, high: tok_id, assertion: false },
      Term::Pylon,
    ],
    "PrecedPred and Pylon must thread through emit_term in emission order"
  );
}
