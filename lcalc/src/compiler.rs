use std::rc::Rc;

use rpds::{HashTrieMap, Stack};
use tracing::debug;

use crate::{
    config::Config,
    encoding, lang,
    prelude::*,
    term::{guarded, Term, Var},
};

/// Named definitions visible to compiled terms.
#[derive(Default, Clone, Debug)]
pub struct Context {
    definitions: HashTrieMap<Identifier, Rc<Term>>,
}

impl Context {
    pub fn define(&mut self, name: Identifier, term: Term) {
        self.definitions = self.definitions.insert(name, term.into());
    }

    /// A copy of the definition with fresh binders, ready to be spliced into
    /// another term.
    pub fn lookup(&self, name: &Identifier) -> Option<Term> {
        self.definitions.get(name).map(|term| term.fresh_copy())
    }

    pub fn contains(&self, name: &Identifier) -> bool {
        self.definitions.contains_key(name)
    }

    /// Definitions sorted by name.
    pub fn iter(&self) -> Vec<(Identifier, Rc<Term>)> {
        let mut definitions = self
            .definitions
            .iter()
            .map(|(name, term)| (name.clone(), term.clone()))
            .collect::<Vec<_>>();
        definitions.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));
        definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.size()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Binders enclosing the term being compiled, innermost on top.
type Scope = Stack<Var>;

fn compile(
    context: &Context,
    config: &Config,
    scope: &Scope,
    term: &Spanned<lang::Term>,
) -> Result<Term> {
    guarded(|| {
        let compile_all = |elements: &[Rc<Spanned<lang::Term>>]| {
            elements
                .iter()
                .map(|element| compile(context, config, scope, element))
                .collect::<Result<Vec<_>>>()
        };
        let value = match term.value() {
            lang::Term::Variable(name) => {
                if let Some(var) = scope.iter().find(|var| var.ident() == name.value()) {
                    Term::variable(var)
                } else if let Some(definition) = context.lookup(name.value()) {
                    definition
                } else if config.strict {
                    return Err(Error::custom(
                        name.span(),
                        format!("Undefined variable {name}"),
                    ));
                } else {
                    Term::variable(&Var::named(name.value().clone()))
                }
            }
            lang::Term::Nat(n) => encoding::numeral(*n),
            lang::Term::Abstract(binders, body) => {
                let vars = binders
                    .iter()
                    .map(|binder| Var::named(binder.value().clone()))
                    .collect::<Vec<_>>();
                let scope = vars
                    .iter()
                    .fold(scope.clone(), |scope, var| scope.push(var.clone()));
                let body = compile(context, config, &scope, body)?;
                Term::abstractions(vars, body)
            }
            lang::Term::Apply(lhs, rhs) => Term::application(
                compile(context, config, scope, lhs)?,
                compile(context, config, scope, rhs)?,
            ),
            lang::Term::Tuple(elements) => encoding::tuple(compile_all(elements)?),
            lang::Term::List(elements) => encoding::list(compile_all(elements)?),
            lang::Term::Cons(head, tail) => encoding::cons(
                compile(context, config, scope, head)?,
                compile(context, config, scope, tail)?,
            ),
        };
        Ok(value)
    })
}

/// Resolves names against `context`: the innermost binder of a name wins,
/// then definitions, and anything else is a free variable (an error in
/// strict mode). Numbers, tuples and lists become their Church encodings.
pub fn compile_term(context: &Context, config: &Config, term: &Spanned<lang::Term>) -> Result<Term> {
    compile(context, config, &Scope::new(), term)
}

/// Compiles the body of `name := term`. A body that refers to its own name is
/// closed over it with the configured fixed-point combinator.
pub fn compile_definition(
    context: &Context,
    config: &Config,
    name: &Spanned<Identifier>,
    term: &Spanned<lang::Term>,
) -> Result<Term> {
    if !term.value().mentions(name.value()) {
        return compile_term(context, config, term);
    }
    debug!(%name, fixpoint = %config.fixpoint, "recursive definition");
    let self_ref = Var::named(name.value().clone());
    let body = compile(context, config, &Scope::new().push(self_ref.clone()), term)?;
    Ok(config.fixpoint.fix(self_ref, body))
}
