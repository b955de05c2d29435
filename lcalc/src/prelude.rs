use std::rc::Rc;

/// Natural numbers as written in source and decoded from Church numerals.
pub type Nat = u64;
pub type Identifier = Rc<String>;

pub fn ident(name: impl Into<String>) -> Identifier {
    Identifier::new(name.into())
}

/// Character offsets into the input, as chumsky reports them.
pub type Span = std::ops::Range<usize>;

/// The smallest span covering both `lhs` and `rhs`.
pub fn merge_span(lhs: &Span, rhs: &Span) -> Span {
    lhs.start.min(rhs.start)..lhs.end.max(rhs.end)
}

#[derive(derive_more::AsRef, Clone, derive_more::Display, Debug)]
#[display(bound = "T: std::fmt::Display")]
#[display(fmt = "{value}")]
pub struct Spanned<T> {
    pub span: Span,
    #[as_ref]
    pub value: T,
}
impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { span, value }
    }
    pub fn forget_span(self) -> T {
        self.value
    }
    pub fn value(&self) -> &T {
        &self.value
    }
    pub fn span(&self) -> Span {
        self.span.clone()
    }
}

pub use chumsky::error::Error as _;
/// Lexing, parsing and name resolution all report through chumsky's error type
/// so the REPL can render every failure with the same report builder.
pub type Error<I = String> = chumsky::error::Simple<I, Span>;
pub type Result<T, E = Error> = std::result::Result<T, E>;
