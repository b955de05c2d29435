//! Church encodings of data and their decoders.
//!
//! Decoders inspect the shape of a term and return `None` for anything that
//! is not a well-formed encoding; they never fail otherwise.

use crate::{
    prelude::*,
    term::{guarded, Term, Var},
};

/// `λf x. fⁿ x`
pub fn numeral(n: Nat) -> Term {
    let (f, x) = (Var::new("f"), Var::new("x"));
    let mut body = Term::variable(&x);
    for _ in 0..n {
        body = Term::application(Term::variable(&f), body);
    }
    Term::abstractions(vec![f, x], body)
}

/// Counts the applications of `f` in `λf x. f (f … x)`. The identity is the
/// eta-reduced form of one and decodes as `1`.
pub fn as_numeral(term: &Term) -> Option<Nat> {
    let Term::Abstract(f, body) = term else {
        return None;
    };
    if body.is_variable(f.id()) {
        return Some(1);
    }
    let Term::Abstract(x, body) = body.as_ref() else {
        return None;
    };
    let mut body: &Term = body;
    let mut n = 0;
    while let Term::Apply(function, argument) = body {
        if !function.is_variable(f.id()) {
            return None;
        }
        n += 1;
        body = argument.as_ref();
    }
    body.is_variable(x.id()).then_some(n)
}

/// `λp. p e1 … en`
pub fn tuple(elements: Vec<Term>) -> Term {
    let p = Var::new("p");
    Term::abstraction(p.clone(), Term::applications(Term::variable(&p), elements))
}

pub fn as_tuple(term: &Term) -> Option<Vec<Term>> {
    let Term::Abstract(p, body) = term else {
        return None;
    };
    let mut body: &Term = body;
    let mut elements = vec![];
    while let Term::Apply(function, argument) = body {
        if argument.occurs_free(p.id()) {
            return None;
        }
        elements.push(argument.as_ref().clone());
        body = function.as_ref();
    }
    if elements.is_empty() || !body.is_variable(p.id()) {
        return None;
    }
    elements.reverse();
    Some(elements)
}

/// `λx y. y`
pub fn nil() -> Term {
    let (x, y) = (Var::new("x"), Var::new("y"));
    Term::abstractions(vec![x, y.clone()], Term::variable(&y))
}

/// `λx y. x head tail`
pub fn cons(head: Term, tail: Term) -> Term {
    let (x, y) = (Var::new("x"), Var::new("y"));
    Term::abstractions(
        vec![x.clone(), y],
        Term::applications(Term::variable(&x), [head, tail]),
    )
}

pub fn list(elements: Vec<Term>) -> Term {
    elements
        .into_iter()
        .rev()
        .fold(nil(), |tail, head| cons(head, tail))
}

pub fn as_list(term: &Term) -> Option<Vec<Term>> {
    let mut elements = vec![];
    let mut term = term;
    loop {
        let Term::Abstract(x, body) = term else {
            return None;
        };
        let Term::Abstract(y, body) = body.as_ref() else {
            return None;
        };
        if body.is_variable(y.id()) {
            return Some(elements);
        }
        let Term::Apply(init, tail) = body.as_ref() else {
            return None;
        };
        let Term::Apply(head_of, head) = init.as_ref() else {
            return None;
        };
        let mentions_binders = |t: &Term| t.occurs_free(x.id()) || t.occurs_free(y.id());
        if !head_of.is_variable(x.id())
            || mentions_binders(head.as_ref())
            || mentions_binders(tail.as_ref())
        {
            return None;
        }
        elements.push(head.as_ref().clone());
        term = tail.as_ref();
    }
}

/// Fixed-point combinator used to tie recursive definitions.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, derive_more::Display, Debug)]
pub enum Combinator {
    /// `Θ = (λx y. y (x x y)) (λx y. y (x x y))`
    #[default]
    #[display(fmt = "turing")]
    Turing,
    /// `Y = λf. (λx. f (x x)) (λx. f (x x))`
    #[display(fmt = "curry")]
    Curry,
}

impl Combinator {
    pub fn term(self) -> Term {
        match self {
            Self::Turing => {
                let half = || {
                    let (x, y) = (Var::new("x"), Var::new("y"));
                    let xxy = Term::applications(
                        Term::variable(&x),
                        [Term::variable(&x), Term::variable(&y)],
                    );
                    Term::abstractions(
                        vec![x, y.clone()],
                        Term::application(Term::variable(&y), xxy),
                    )
                };
                Term::application(half(), half())
            }
            Self::Curry => {
                let f = Var::new("f");
                let half = || {
                    let x = Var::new("x");
                    let xx = Term::application(Term::variable(&x), Term::variable(&x));
                    Term::abstraction(x, Term::application(Term::variable(&f), xx))
                };
                Term::abstraction(f.clone(), Term::application(half(), half()))
            }
        }
    }

    /// `combinator (λself_ref. body)`
    pub fn fix(self, self_ref: Var, body: Term) -> Term {
        Term::application(self.term(), Term::abstraction(self_ref, body))
    }
}

/// Readable form of a decodable value, with decodable elements of lists and
/// tuples described the same way and anything else rendered as a term.
pub fn describe(term: &Term) -> Option<String> {
    fn element(term: &Term) -> String {
        describe(term).unwrap_or_else(|| term.to_string())
    }
    fn join(elements: &[Term]) -> String {
        elements.iter().map(element).collect::<Vec<_>>().join(", ")
    }
    guarded(|| {
        if let Some(n) = as_numeral(term) {
            Some(n.to_string())
        } else if let Some(elements) = as_list(term) {
            Some(format!("[{}]", join(&elements)))
        } else {
            as_tuple(term).map(|elements| format!("<{}>", join(&elements)))
        }
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        equiv::alpha_equal,
        eval::{reduce, Mode, Strategy},
    };

    fn free(name: &str) -> Term {
        Term::variable(&Var::new(name))
    }

    #[test]
    fn test_numeral() {
        assert_eq!(numeral(0).to_string(), "λf x.x");
        assert_eq!(numeral(3).to_string(), "λf x.f (f (f x))");
        for n in 0..=50 {
            assert_eq!(as_numeral(&numeral(n)), Some(n));
        }
    }

    #[test]
    fn test_elements_survive_encoding() {
        let elements = || vec![free("a"), numeral(2), tuple(vec![free("b"), free("c")])];
        let same = |decoded: Option<Vec<Term>>| {
            let decoded = decoded.unwrap();
            decoded.len() == 3
                && decoded
                    .iter()
                    .zip(elements())
                    .all(|(lhs, rhs)| alpha_equal(lhs, &rhs))
        };
        assert!(same(as_tuple(&tuple(elements()))));
        assert!(same(as_list(&list(elements()))));
    }

    #[test]
    fn test_numeral_rejects_other_shapes() {
        let (f, x) = (Var::new("f"), Var::new("x"));
        // λf x. x f
        let swapped = Term::abstractions(
            vec![f.clone(), x.clone()],
            Term::application(Term::variable(&x), Term::variable(&f)),
        );
        assert_eq!(as_numeral(&swapped), None);
        // λf x. f
        let constant = Term::abstractions(vec![f.clone(), x], Term::variable(&f));
        assert_eq!(as_numeral(&constant), None);
        assert_eq!(as_numeral(&free("n")), None);
        assert_eq!(as_numeral(&tuple(vec![free("a"), free("b")])), None);
    }

    #[test]
    fn test_identity_is_one() {
        let a = Var::new("a");
        assert_eq!(as_numeral(&Term::abstraction(a.clone(), Term::variable(&a))), Some(1));
        // eta-reducing one gives the identity
        let reduced = reduce(&numeral(1), Mode::Eta, Strategy::LeftmostOutermost, None);
        assert_eq!(reduced.term.to_string(), "λf.f");
        assert_eq!(as_numeral(&reduced.term), Some(1));
    }

    #[test]
    fn test_tuple() {
        let pair = tuple(vec![free("a"), numeral(1)]);
        assert_eq!(pair.to_string(), "λp.p a (λf x.f x)");
        let elements = as_tuple(&pair).unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].to_string(), "a");
        assert_eq!(as_numeral(&elements[1]), Some(1));
    }

    #[test]
    fn test_tuple_rejects_mentioning_binder() {
        let p = Var::new("p");
        let term = Term::abstraction(
            p.clone(),
            Term::application(Term::variable(&p), Term::variable(&p)),
        );
        assert_eq!(as_tuple(&term), None);
        // the empty spine is the identity, not a tuple
        assert_eq!(as_tuple(&tuple(vec![])), None);
    }

    #[test]
    fn test_list() {
        assert_eq!(nil().to_string(), "λx y.y");
        assert_eq!(as_list(&nil()).map(|es| es.len()), Some(0));
        let term = list(vec![numeral(1), numeral(2), free("z")]);
        let elements = as_list(&term).unwrap();
        assert_eq!(elements.len(), 3);
        assert_eq!(as_numeral(&elements[0]), Some(1));
        assert_eq!(as_numeral(&elements[1]), Some(2));
        assert_eq!(elements[2].to_string(), "z");
        assert!(alpha_equal(&term, &cons(numeral(1), list(vec![numeral(2), free("z")]))));
    }

    #[test]
    fn test_list_rejects_malformed() {
        let (x, y) = (Var::new("x"), Var::new("y"));
        // λx y. x y nil: the head is the binder y
        let term = Term::abstractions(
            vec![x.clone(), y.clone()],
            Term::applications(Term::variable(&x), [Term::variable(&y), nil()]),
        );
        assert_eq!(as_list(&term), None);
        // a tail that is not a list
        assert_eq!(as_list(&cons(numeral(1), free("t"))), None);
        assert_eq!(as_list(&numeral(2)), None);
    }

    #[test]
    fn test_combinator_terms() {
        assert_eq!(
            Combinator::Turing.term().to_string(),
            "(λx y.y (x x y)) (λx1 y1.y1 (x1 x1 y1))"
        );
        assert_eq!(
            Combinator::Curry.term().to_string(),
            "λf.(λx.f (x x)) (λx1.f (x1 x1))"
        );
        assert_eq!(Combinator::default(), Combinator::Turing);
        assert_eq!(Combinator::Curry.to_string(), "curry");
    }

    #[test]
    fn test_fix_unfolds() {
        // fix (λr. λa. a) behaves like λa. a once unfolded
        for combinator in [Combinator::Turing, Combinator::Curry] {
            let (r, a) = (Var::new("r"), Var::new("a"));
            let fixed = combinator.fix(r, Term::abstraction(a.clone(), Term::variable(&a)));
            let applied = Term::application(fixed, free("v"));
            let reduction = reduce(&applied, Mode::Beta, Strategy::LeftmostOutermost, Some(100));
            assert!(!reduction.exhausted, "{combinator}");
            assert_eq!(reduction.term.to_string(), "v");
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&numeral(3)).as_deref(), Some("3"));
        // zero and the empty list coincide; numerals win
        assert_eq!(describe(&nil()).as_deref(), Some("0"));
        assert_eq!(
            describe(&list(vec![numeral(1), numeral(2)])).as_deref(),
            Some("[1, 2]")
        );
        assert_eq!(
            describe(&tuple(vec![free("a"), numeral(1)])).as_deref(),
            Some("<a, 1>")
        );
        assert_eq!(
            describe(&list(vec![tuple(vec![numeral(2), numeral(4)])])).as_deref(),
            Some("[<2, 4>]")
        );
        assert_eq!(describe(&free("a")), None);
    }
}
