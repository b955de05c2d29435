use rpds::Stack;

use crate::term::{Term, VarId};

/// Binders of the enclosing abstractions, innermost on top, paired up between
/// the two terms being compared.
type Binders = Stack<(VarId, VarId)>;

/// Equality up to consistent renaming of bound variables.
///
/// Bound variables match when they refer to the binder at the same depth on
/// both sides; free variables match by name.
pub fn alpha_equal(lhs: &Term, rhs: &Term) -> bool {
    let mut pending = vec![(lhs, rhs, Binders::new())];
    while let Some((lhs, rhs, binders)) = pending.pop() {
        match (lhs, rhs) {
            (Term::Variable(l), Term::Variable(r)) => {
                let l_index = binders.iter().position(|(b, _)| *b == l.id());
                let r_index = binders.iter().position(|(_, b)| *b == r.id());
                let matched = match (l_index, r_index) {
                    (Some(l_index), Some(r_index)) => l_index == r_index,
                    (None, None) => l.name() == r.name(),
                    _ => false,
                };
                if !matched {
                    return false;
                }
            }
            (Term::Abstract(l, l_body), Term::Abstract(r, r_body)) => {
                pending.push((l_body.as_ref(), r_body.as_ref(), binders.push((l.id(), r.id()))));
            }
            (Term::Apply(l_fun, l_arg), Term::Apply(r_fun, r_arg)) => {
                pending.push((l_arg.as_ref(), r_arg.as_ref(), binders.clone()));
                pending.push((l_fun.as_ref(), r_fun.as_ref(), binders));
            }
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{encoding, term::Var};

    fn identity(name: &str) -> Term {
        let x = Var::new(name);
        Term::abstraction(x.clone(), Term::variable(&x))
    }

    /// `λa b. a` and `λa b. b` under the given names.
    fn select(first: &str, second: &str, pick_first: bool) -> Term {
        let (a, b) = (Var::new(first), Var::new(second));
        let picked = if pick_first { &a } else { &b };
        Term::abstractions(vec![a.clone(), b.clone()], Term::variable(picked))
    }

    #[test]
    fn test_renamed_binders_are_equal() {
        assert!(alpha_equal(&identity("x"), &identity("y")));
        assert!(alpha_equal(&select("x", "y", true), &select("p", "q", true)));
        assert!(!alpha_equal(&select("x", "y", true), &select("x", "y", false)));
    }

    #[test]
    fn test_free_variables_compare_by_name() {
        let (a, also_a, b) = (Var::new("a"), Var::new("a"), Var::new("b"));
        assert!(alpha_equal(&Term::variable(&a), &Term::variable(&also_a)));
        assert!(!alpha_equal(&Term::variable(&a), &Term::variable(&b)));
    }

    #[test]
    fn test_bound_never_matches_free() {
        // λx.x against λy.x where the second x is free
        let x = Var::new("x");
        let y = Var::new("y");
        let free_x = Var::new("x");
        let bound = Term::abstraction(x.clone(), Term::variable(&x));
        let constant = Term::abstraction(y, Term::variable(&free_x));
        assert!(!alpha_equal(&bound, &constant));
        assert!(!alpha_equal(&constant, &bound));
    }

    #[test]
    fn test_shape_mismatch() {
        let x = Var::new("x");
        let apply = Term::application(Term::variable(&x), Term::variable(&x));
        assert!(!alpha_equal(&apply, &Term::variable(&x)));
        assert!(!alpha_equal(&identity("x"), &apply));
    }

    #[test]
    fn test_relation_properties() {
        let terms = [
            identity("x"),
            identity("y"),
            select("a", "b", true),
            select("a", "b", false),
            encoding::numeral(2),
            encoding::numeral(3),
            encoding::tuple(vec![identity("x"), encoding::numeral(1)]),
            encoding::list(vec![identity("z"), identity("w")]),
        ];
        for t in &terms {
            assert!(alpha_equal(t, t));
            assert!(alpha_equal(t, &t.fresh_copy()));
            for u in &terms {
                assert_eq!(alpha_equal(t, u), alpha_equal(u, t));
                for v in &terms {
                    if alpha_equal(t, u) && alpha_equal(u, v) {
                        assert!(alpha_equal(t, v));
                    }
                }
            }
        }
    }
}
