use tracing::{debug, trace};

use crate::{
    subst::substitute,
    term::{guarded, Term},
};

/// Which redex is contracted when there are several.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, derive_more::Display, Debug)]
pub enum Strategy {
    /// Normal order: always the leftmost-outermost redex. Finds the normal
    /// form whenever there is one.
    #[default]
    #[display(fmt = "lo")]
    LeftmostOutermost,
    /// Follows the left spine of applications and gives up when it ends in a
    /// variable, except for an argument that is itself an application. Can stop
    /// short of a normal form that `LeftmostOutermost` reaches.
    #[display(fmt = "leftmost")]
    Leftmost,
}

/// Which kinds of redex are contracted.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, derive_more::Display, Debug)]
pub enum Mode {
    #[display(fmt = "beta")]
    Beta,
    #[display(fmt = "eta")]
    Eta,
    /// Beta when possible, eta otherwise.
    #[default]
    #[display(fmt = "both")]
    Both,
}

/// Result of iterated reduction.
#[derive(Clone, Debug)]
pub struct Reduction {
    pub term: Term,
    pub steps: usize,
    /// The step bound stopped the reduction while a redex remained.
    pub exhausted: bool,
}

fn contract(function: &Term, argument: &Term) -> Option<Term> {
    match function {
        Term::Abstract(binder, body) => Some(substitute(body, binder.id(), argument)),
        _ => None,
    }
}

fn beta_leftmost_outermost(term: &Term) -> Option<Term> {
    guarded(|| match term {
        Term::Variable(_) => None,
        Term::Abstract(binder, body) => Some(Term::Abstract(
            binder.clone(),
            beta_leftmost_outermost(body)?.into(),
        )),
        Term::Apply(lhs, rhs) => {
            if let Some(reduced) = contract(lhs, rhs) {
                return Some(reduced);
            }
            if let Some(lhs) = beta_leftmost_outermost(lhs) {
                return Some(Term::Apply(lhs.into(), rhs.clone()));
            }
            beta_leftmost_outermost(rhs).map(|rhs| Term::Apply(lhs.clone(), rhs.into()))
        }
    })
}

fn beta_leftmost(term: &Term) -> Option<Term> {
    guarded(|| match term {
        Term::Variable(_) => None,
        Term::Abstract(binder, body) => {
            Some(Term::Abstract(binder.clone(), beta_leftmost(body)?.into()))
        }
        Term::Apply(lhs, rhs) => match lhs.as_ref() {
            Term::Abstract(_, _) => contract(lhs, rhs),
            Term::Apply(_, _) => {
                beta_leftmost(lhs).map(|lhs| Term::Apply(lhs.into(), rhs.clone()))
            }
            Term::Variable(_) => match rhs.as_ref() {
                Term::Apply(_, _) => {
                    beta_leftmost(rhs).map(|rhs| Term::Apply(lhs.clone(), rhs.into()))
                }
                _ => None,
            },
        },
    })
}

/// One beta contraction, or `None` if `strategy` finds no redex.
pub fn beta_step(term: &Term, strategy: Strategy) -> Option<Term> {
    match strategy {
        Strategy::LeftmostOutermost => beta_leftmost_outermost(term),
        Strategy::Leftmost => beta_leftmost(term),
    }
}

/// One eta contraction `λv. f v → f` (with `v` not free in `f`), outermost
/// and leftmost first.
pub fn eta_step(term: &Term) -> Option<Term> {
    guarded(|| match term {
        Term::Variable(_) => None,
        Term::Abstract(binder, body) => {
            if let Term::Apply(function, argument) = body.as_ref() {
                if argument.is_variable(binder.id()) && !function.occurs_free(binder.id()) {
                    return Some(function.as_ref().clone());
                }
            }
            eta_step(body).map(|body| Term::Abstract(binder.clone(), body.into()))
        }
        Term::Apply(lhs, rhs) => {
            if let Some(lhs) = eta_step(lhs) {
                return Some(Term::Apply(lhs.into(), rhs.clone()));
            }
            eta_step(rhs).map(|rhs| Term::Apply(lhs.clone(), rhs.into()))
        }
    })
}

fn has_beta_redex(term: &Term, strategy: Strategy) -> bool {
    guarded(|| match term {
        Term::Variable(_) => false,
        Term::Abstract(_, body) => has_beta_redex(body, strategy),
        Term::Apply(lhs, rhs) => match (strategy, lhs.as_ref()) {
            (_, Term::Abstract(_, _)) => true,
            (Strategy::LeftmostOutermost, _) => {
                has_beta_redex(lhs, strategy) || has_beta_redex(rhs, strategy)
            }
            (Strategy::Leftmost, Term::Apply(_, _)) => has_beta_redex(lhs, strategy),
            (Strategy::Leftmost, Term::Variable(_)) => {
                matches!(rhs.as_ref(), Term::Apply(_, _)) && has_beta_redex(rhs, strategy)
            }
        },
    })
}

fn has_eta_redex(term: &Term) -> bool {
    guarded(|| match term {
        Term::Variable(_) => false,
        Term::Abstract(binder, body) => {
            matches!(
                body.as_ref(),
                Term::Apply(function, argument)
                    if argument.is_variable(binder.id()) && !function.occurs_free(binder.id())
            ) || has_eta_redex(body)
        }
        Term::Apply(lhs, rhs) => has_eta_redex(lhs) || has_eta_redex(rhs),
    })
}

/// Whether [`step`] would find nothing to contract. Searches without
/// building the contracted term.
pub fn is_normal(term: &Term, mode: Mode, strategy: Strategy) -> bool {
    match mode {
        Mode::Beta => !has_beta_redex(term, strategy),
        Mode::Eta => !has_eta_redex(term),
        Mode::Both => !has_beta_redex(term, strategy) && !has_eta_redex(term),
    }
}

pub fn step(term: &Term, mode: Mode, strategy: Strategy) -> Option<Term> {
    match mode {
        Mode::Beta => beta_step(term, strategy),
        Mode::Eta => eta_step(term),
        Mode::Both => beta_step(term, strategy).or_else(|| eta_step(term)),
    }
}

/// Reduces until no redex of the selected kind is left, or `max_steps`
/// contractions have been made. `None` means no bound.
pub fn reduce(term: &Term, mode: Mode, strategy: Strategy, max_steps: Option<usize>) -> Reduction {
    reduce_with(term, mode, strategy, max_steps, |_, _| {})
}

/// [`reduce`], calling `observe` with `(0, term)` and then with every
/// intermediate term and the number of steps taken to reach it.
pub fn reduce_with(
    term: &Term,
    mode: Mode,
    strategy: Strategy,
    max_steps: Option<usize>,
    mut observe: impl FnMut(usize, &Term),
) -> Reduction {
    let mut term = term.clone();
    let mut steps = 0;
    observe(steps, &term);
    loop {
        if matches!(max_steps, Some(bound) if steps >= bound) {
            let exhausted = !is_normal(&term, mode, strategy);
            if exhausted {
                debug!(steps, "step bound exhausted");
            } else {
                debug!(steps, "reached normal form");
            }
            return Reduction {
                term,
                steps,
                exhausted,
            };
        }
        let Some(next) = step(&term, mode, strategy) else {
            debug!(steps, "reached normal form");
            return Reduction {
                term,
                steps,
                exhausted: false,
            };
        };
        term = next;
        steps += 1;
        trace!(steps, %term);
        observe(steps, &term);
    }
}
