use std::rc::Rc;

use crate::{prelude::*, term::guarded};

#[derive(PartialEq, Eq, Hash, Clone, derive_more::Display, Debug)]
pub enum Token {
    #[display(fmt = "(")]
    LParen,
    #[display(fmt = ")")]
    RParen,
    #[display(fmt = "<")]
    LAngle,
    #[display(fmt = ">")]
    RAngle,
    #[display(fmt = "[")]
    LBracket,
    #[display(fmt = "]")]
    RBracket,
    #[display(fmt = ",")]
    Comma,
    #[display(fmt = ".")]
    Dot,
    #[display(fmt = ";")]
    Semicolon,

    #[display(fmt = "::")]
    Cons,
    #[display(fmt = ":=")]
    Define,

    #[display(fmt = "λ")]
    Lambda,

    #[display(fmt = "{_0}")]
    Nat(Nat),
    #[display(fmt = "{_0}")]
    Ident(Identifier),
}

/// Surface syntax, before names are resolved.
#[derive(Clone, Debug)]
pub enum Term {
    Variable(Spanned<Identifier>),
    Nat(Nat),
    /// `λx y z. body`, binders in source order.
    Abstract(Vec<Spanned<Identifier>>, Rc<Spanned<Self>>),
    Apply(Rc<Spanned<Self>>, Rc<Spanned<Self>>),
    /// `<a, b, …>`
    Tuple(Vec<Rc<Spanned<Self>>>),
    /// `[a, b, …]`
    List(Vec<Rc<Spanned<Self>>>),
    /// `head :: tail`
    Cons(Rc<Spanned<Self>>, Rc<Spanned<Self>>),
}

impl Term {
    /// Whether `name` occurs in this term outside any abstraction rebinding it.
    pub fn mentions(&self, name: &Identifier) -> bool {
        guarded(|| match self {
            Term::Variable(var) => var.value() == name,
            Term::Nat(_) => false,
            Term::Abstract(binders, body) => {
                binders.iter().all(|binder| binder.value() != name)
                    && body.value().mentions(name)
            }
            Term::Apply(lhs, rhs) | Term::Cons(lhs, rhs) => {
                lhs.value().mentions(name) || rhs.value().mentions(name)
            }
            Term::Tuple(elements) | Term::List(elements) => elements
                .iter()
                .any(|element| element.value().mentions(name)),
        })
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn elements(
            f: &mut std::fmt::Formatter<'_>,
            elements: &[Rc<Spanned<Term>>],
        ) -> std::fmt::Result {
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_fmt(format_args!("{element}"))?;
            }
            Ok(())
        }
        match self {
            Term::Variable(name) => f.write_str(name.value()),
            Term::Nat(v) => f.write_fmt(format_args!("{v}")),
            Term::Abstract(binders, body) => {
                f.write_str("(λ")?;
                for (i, binder) in binders.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    f.write_str(binder.value())?;
                }
                f.write_fmt(format_args!(". {body})"))
            }
            Term::Apply(lhs, rhs) => f.write_fmt(format_args!("({lhs} {rhs})")),
            Term::Tuple(es) => {
                f.write_str("<")?;
                elements(f, es)?;
                f.write_str(">")
            }
            Term::List(es) => {
                f.write_str("[")?;
                elements(f, es)?;
                f.write_str("]")
            }
            Term::Cons(head, tail) => f.write_fmt(format_args!("({head} :: {tail})")),
        }
    }
}

#[derive(Clone, derive_more::Display, Debug)]
pub enum Command {
    #[display(fmt = "{_0}")]
    Term(Spanned<Term>),
    #[display(fmt = "{_0} := {_1}")]
    Define(Spanned<Identifier>, Spanned<Term>),
}
