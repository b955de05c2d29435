//! Capture-avoiding substitution.
//!
//! Every abstraction the substitution passes through is alpha-renamed: its
//! binder is replaced by a fresh one and the occurrences in its body follow.
//! This happens whether or not the replacement has free variables, so a
//! substituted term never shares binder identities with its surroundings.

use rpds::HashTrieMap;

use crate::term::{guarded, Term, Var, VarId};

/// Old binder identity to the binder that replaced it.
type Renaming = HashTrieMap<VarId, Var>;

/// `target[binder := replacement]`. Each occurrence receives its own fresh
/// copy of `replacement`.
pub fn substitute(target: &Term, binder: VarId, replacement: &Term) -> Term {
    rewrite(target, Some((binder, replacement)), &Renaming::new())
}

/// Copy of `term` in which every binder has a fresh identity.
pub fn fresh_copy(term: &Term) -> Term {
    rewrite(term, None, &Renaming::new())
}

/// Alpha-renames `λbinder. body`, returning the new binder and body. A
/// standalone helper: [`substitute`] renames as it goes and does not call it.
pub fn alpha_rename(binder: &Var, body: &Term) -> (Var, Term) {
    let fresh = binder.refresh();
    let renaming = Renaming::new().insert(binder.id(), fresh.clone());
    let body = rewrite(body, None, &renaming);
    (fresh, body)
}

/// Renaming and substitution in one pass. Renaming each abstraction with a
/// separate traversal before substituting into it gives the same result but
/// revisits every nested body once per enclosing binder.
fn rewrite(term: &Term, target: Option<(VarId, &Term)>, renaming: &Renaming) -> Term {
    guarded(|| match term {
        Term::Variable(var) => match target {
            Some((binder, replacement)) if var.id() == binder => fresh_copy(replacement),
            _ => renaming
                .get(&var.id())
                .map_or_else(|| term.clone(), Term::variable),
        },
        Term::Apply(lhs, rhs) => Term::application(
            rewrite(lhs, target, renaming),
            rewrite(rhs, target, renaming),
        ),
        // Shadowed: nothing below refers to the target any more.
        Term::Abstract(binder, _)
            if target.map(|(id, _)| id) == Some(binder.id()) && renaming.is_empty() =>
        {
            term.clone()
        }
        Term::Abstract(binder, body) => {
            let target = target.filter(|(id, _)| *id != binder.id());
            let fresh = binder.refresh();
            let renaming = renaming.insert(binder.id(), fresh.clone());
            Term::abstraction(fresh, rewrite(body, target, &renaming))
        }
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::equiv::alpha_equal;

    #[test]
    fn test_substitute_variable() {
        let (x, y) = (Var::new("x"), Var::new("y"));
        let result = substitute(&Term::variable(&x), x.id(), &Term::variable(&y));
        assert_eq!(result, Term::variable(&y));
        let untouched = substitute(&Term::variable(&y), x.id(), &Term::variable(&x));
        assert_eq!(untouched, Term::variable(&y));
    }

    #[test]
    fn test_shadowed_binder_is_left_alone() {
        // (λx.x)[x := x'] where x' is a different variable also named x
        let x = Var::new("x");
        let identity = Term::abstraction(x.clone(), Term::variable(&x));
        let other = Var::new("x");
        let result = substitute(&identity, x.id(), &Term::variable(&other));
        assert_eq!(result, identity);
        assert!(alpha_equal(&result, &identity));
    }

    #[test]
    fn test_bound_occurrences_are_not_replaced() {
        // (λx.x)[y := x]: the bound x stays bound
        let (x, y) = (Var::new("x"), Var::new("y"));
        let identity = Term::abstraction(x.clone(), Term::variable(&x));
        let free_x = Var::new("x");
        let result = substitute(&identity, y.id(), &Term::variable(&free_x));
        assert!(alpha_equal(&result, &identity));
        assert!(!result.occurs_free(free_x.id()));
        assert!(result.free_variables().is_empty());
    }

    #[test]
    fn test_substitution_avoids_capture() {
        // (λy. x y)[x := y] must not become λy. y y
        let (x, y) = (Var::new("x"), Var::new("y"));
        let body = Term::abstraction(
            y.clone(),
            Term::application(Term::variable(&x), Term::variable(&y)),
        );
        let free_y = Var::new("y");
        let result = substitute(&body, x.id(), &Term::variable(&free_y));

        let Term::Abstract(binder, inner) = &result else {
            panic!("expected an abstraction, got {result}");
        };
        assert_ne!(binder.id(), y.id());
        let Term::Apply(lhs, rhs) = inner.as_ref() else {
            panic!("expected an application, got {inner}");
        };
        assert!(lhs.is_variable(free_y.id()));
        assert!(rhs.is_variable(binder.id()));
        assert_eq!(result.to_string(), "λy1.y y1");
    }

    #[test]
    fn test_renaming_reaches_shadowed_bodies() {
        // (λy. λx. y x)[x := z]: the inner λx shadows x, but the y inside it
        // must still follow the renamed outer binder.
        let (x, y, z) = (Var::new("x"), Var::new("y"), Var::new("z"));
        let term = Term::abstraction(
            y.clone(),
            Term::abstraction(
                x.clone(),
                Term::application(Term::variable(&y), Term::variable(&x)),
            ),
        );
        let result = substitute(&term, x.id(), &Term::variable(&z));
        assert!(alpha_equal(&result, &term));
        assert!(!result.occurs_free(y.id()));
    }

    #[test]
    fn test_each_occurrence_gets_a_fresh_copy() {
        let (x, a) = (Var::new("x"), Var::new("a"));
        let identity = Term::abstraction(a.clone(), Term::variable(&a));
        let target = Term::application(Term::variable(&x), Term::variable(&x));
        let result = substitute(&target, x.id(), &identity);
        let Term::Apply(lhs, rhs) = &result else {
            panic!("expected an application, got {result}");
        };
        match (lhs.as_ref(), rhs.as_ref()) {
            (Term::Abstract(l, _), Term::Abstract(r, _)) => {
                assert_ne!(l.id(), r.id());
                assert_ne!(l.id(), a.id());
            }
            _ => panic!("expected two abstractions, got {result}"),
        }
        assert_eq!(result.to_string(), "(λa.a) (λa1.a1)");
    }

    #[test]
    fn test_alpha_rename() {
        let (x, y) = (Var::new("x"), Var::new("y"));
        let body = Term::application(Term::variable(&x), Term::variable(&y));
        let (fresh, renamed) = alpha_rename(&x, &body);
        assert_eq!(fresh.name(), "x");
        assert_ne!(fresh.id(), x.id());
        assert!(renamed.occurs_free(fresh.id()));
        assert!(!renamed.occurs_free(x.id()));
        assert!(renamed.occurs_free(y.id()));
    }
}
