use std::{
    collections::{HashMap, HashSet},
    mem,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use rpds::HashTrieSet;

use crate::{prelude::*, subst};

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Runs `f` on a freshly grown stack segment if the current one is nearly
/// exhausted. Every structural recursion over terms goes through this.
pub(crate) fn guarded<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, f)
}

static NEXT_VAR_ID: AtomicU64 = AtomicU64::new(0);

/// Binding identity of a variable. Never reused within a process.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, derive_more::Display, Debug)]
#[display(fmt = "#{_0}")]
pub struct VarId(u64);

impl VarId {
    fn fresh() -> Self {
        Self(NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A variable: a display name plus the identity that binding is decided by.
#[derive(PartialEq, Eq, Hash, Clone, derive_more::Display, Debug)]
#[display(fmt = "{name}")]
pub struct Var {
    name: Identifier,
    id: VarId,
}

impl Var {
    pub fn new(name: impl Into<String>) -> Self {
        Self::named(ident(name))
    }
    pub fn named(name: Identifier) -> Self {
        Self {
            name,
            id: VarId::fresh(),
        }
    }
    /// Same display name, new identity.
    pub fn refresh(&self) -> Self {
        Self::named(self.name.clone())
    }
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
    pub fn ident(&self) -> &Identifier {
        &self.name
    }
    pub fn id(&self) -> VarId {
        self.id
    }
}

pub type TermRef = Rc<Term>;

/// Terms are immutable; unchanged subtrees are shared between the input and
/// output of a rewrite. `==` compares binding identities, see
/// [`crate::equiv::alpha_equal`] for equality up to renaming.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Term {
    /// `x`
    Variable(Var),
    /// `λx. t`
    Abstract(Var, TermRef),
    /// `t t`
    Apply(TermRef, TermRef),
}

thread_local! {
    /// Takes the place of children detached while a term is torn down.
    static HOLE: TermRef = Rc::new(Term::Variable(Var::new("_")));
}

/// Tears terms down with a work list instead of one nested drop per level.
impl Drop for Term {
    fn drop(&mut self) {
        fn detach(term: &mut Term, hole: &TermRef, pending: &mut Vec<TermRef>) {
            match term {
                Term::Variable(_) => {}
                Term::Abstract(_, body) => pending.push(mem::replace(body, hole.clone())),
                Term::Apply(lhs, rhs) => {
                    pending.push(mem::replace(lhs, hole.clone()));
                    pending.push(mem::replace(rhs, hole.clone()));
                }
            }
        }
        if let Term::Variable(_) = self {
            return;
        }
        // Fails only once thread-local storage is gone; the nested drop is left
        // to run as usual then.
        let _ = HOLE.try_with(|hole| {
            let mut pending = vec![];
            detach(self, hole, &mut pending);
            while let Some(mut child) = pending.pop() {
                if let Some(term) = Rc::get_mut(&mut child) {
                    detach(term, hole, &mut pending);
                }
            }
        });
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Copy, derive_more::Display, Debug)]
pub enum Tag {
    #[display(fmt = "variable")]
    Variable,
    #[display(fmt = "abstraction")]
    Abstraction,
    #[display(fmt = "application")]
    Application,
}

impl Term {
    pub fn variable(var: &Var) -> Self {
        Self::Variable(var.clone())
    }

    pub fn abstraction(binder: Var, body: Term) -> Self {
        Self::Abstract(binder, body.into())
    }

    pub fn application(function: Term, argument: Term) -> Self {
        Self::Apply(function.into(), argument.into())
    }

    /// `λb1 b2 … bn. body`
    pub fn abstractions(binders: Vec<Var>, body: Term) -> Self {
        binders
            .into_iter()
            .rev()
            .fold(body, |body, binder| Self::abstraction(binder, body))
    }

    /// `head a1 a2 … an`, associated to the left.
    pub fn applications(head: Term, arguments: impl IntoIterator<Item = Term>) -> Self {
        arguments.into_iter().fold(head, Self::application)
    }

    pub fn tag(&self) -> Tag {
        match self {
            Self::Variable(_) => Tag::Variable,
            Self::Abstract(_, _) => Tag::Abstraction,
            Self::Apply(_, _) => Tag::Application,
        }
    }

    /// Whether this is exactly an occurrence of `id`.
    pub fn is_variable(&self, id: VarId) -> bool {
        matches!(self, Self::Variable(var) if var.id == id)
    }

    /// Structural copy in which every binder gets a fresh identity.
    pub fn fresh_copy(&self) -> Self {
        subst::fresh_copy(self)
    }

    /// Whether a variable with identity `id` occurs in this term outside any
    /// abstraction binding `id`.
    pub fn occurs_free(&self, id: VarId) -> bool {
        let mut pending = vec![self];
        while let Some(term) = pending.pop() {
            match term {
                Self::Variable(var) if var.id == id => return true,
                Self::Variable(_) => {}
                Self::Abstract(binder, _) if binder.id == id => {}
                Self::Abstract(_, body) => pending.push(body.as_ref()),
                Self::Apply(lhs, rhs) => {
                    pending.push(rhs.as_ref());
                    pending.push(lhs.as_ref());
                }
            }
        }
        false
    }

    /// Names of the free variables, in order of first occurrence.
    pub fn free_variables(&self) -> Vec<Identifier> {
        let mut seen = HashSet::new();
        let mut names = vec![];
        let mut pending = vec![(self, HashTrieSet::new())];
        while let Some((term, bound)) = pending.pop() {
            match term {
                Self::Variable(var) => {
                    if !bound.contains(&var.id) && seen.insert(var.name.clone()) {
                        names.push(var.name.clone());
                    }
                }
                Self::Abstract(binder, body) => pending.push((body.as_ref(), bound.insert(binder.id))),
                Self::Apply(lhs, rhs) => {
                    pending.push((rhs.as_ref(), bound.clone()));
                    pending.push((lhs.as_ref(), bound));
                }
            }
        }
        names
    }

}

/// Printed names for binders. Distinct binders sharing a name are numbered in
/// the order they appear, the first keeping the bare name; a suffix is never a
/// name already taken by a free variable or another binder.
fn display_names(term: &Term) -> HashMap<VarId, String> {
    let mut taken: HashSet<String> = term
        .free_variables()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let mut names = HashMap::new();
    let mut pending = vec![term];
    while let Some(term) = pending.pop() {
        match term {
            Term::Variable(_) => {}
            Term::Abstract(binder, body) => {
                if !names.contains_key(&binder.id) {
                    let mut name = binder.name().to_string();
                    let mut suffix = 0;
                    while taken.contains(&name) {
                        suffix += 1;
                        name = format!("{}{suffix}", binder.name());
                    }
                    taken.insert(name.clone());
                    names.insert(binder.id, name);
                }
                pending.push(body.as_ref());
            }
            Term::Apply(lhs, rhs) => {
                pending.push(rhs.as_ref());
                pending.push(lhs.as_ref());
            }
        }
    }
    names
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn fmt_rec(
            term: &Term,
            names: &HashMap<VarId, String>,
            f: &mut std::fmt::Formatter<'_>,
        ) -> std::fmt::Result {
            fn name<'a>(var: &'a Var, names: &'a HashMap<VarId, String>) -> &'a str {
                names.get(&var.id).map_or(var.name(), String::as_str)
            }
            guarded(|| match term {
                Term::Variable(var) => f.write_str(name(var, names)),
                Term::Abstract(binder, body) => {
                    f.write_str("λ")?;
                    f.write_str(name(binder, names))?;
                    let mut body = body;
                    while let Term::Abstract(binder, inner) = body.as_ref() {
                        f.write_str(" ")?;
                        f.write_str(name(binder, names))?;
                        body = inner;
                    }
                    f.write_str(".")?;
                    fmt_rec(body, names, f)
                }
                Term::Apply(lhs, rhs) => {
                    if let Term::Abstract(_, _) = lhs.as_ref() {
                        f.write_str("(")?;
                        fmt_rec(lhs, names, f)?;
                        f.write_str(")")?;
                    } else {
                        fmt_rec(lhs, names, f)?;
                    }
                    f.write_str(" ")?;
                    if let Term::Variable(_) = rhs.as_ref() {
                        fmt_rec(rhs, names, f)
                    } else {
                        f.write_str("(")?;
                        fmt_rec(rhs, names, f)?;
                        f.write_str(")")
                    }
                }
            })
        }
        fmt_rec(self, &display_names(self), f)
    }
}
