use std::rc::Rc;

use chumsky::prelude::*;

use crate::{
    lang::{Command, Term, Token},
    prelude::*,
};

pub trait SimpleParser<I: Clone + std::hash::Hash, O>:
    Parser<I, O, Error = Error<I>> + Clone
{
    #[allow(clippy::type_complexity)]
    fn spanned(self) -> chumsky::combinator::MapWithSpan<Self, fn(O, Span) -> Spanned<O>, O>
    where
        Self: Sized,
        I: std::cmp::Eq,
    {
        self.map_with_span(|value, span| Spanned::new(value, span))
    }

    fn refcounted(self) -> chumsky::combinator::Map<Self, fn(O) -> Rc<O>, O>
    where
        Self: Sized,
        I: std::cmp::Eq,
    {
        self.map(Rc::new)
    }
}
impl<I: Clone + std::hash::Hash, O, T> SimpleParser<I, O> for T where
    T: Parser<I, O, Error = Error<I>> + Clone
{
}

/// Whitespace and `#` line comments.
fn trivia() -> impl SimpleParser<char, ()> {
    let whitespace = filter(|c: &char| c.is_whitespace()).ignored();
    let comment = just('#')
        .then(filter(|c: &char| *c != '\n').repeated())
        .ignored();
    choice((whitespace, comment)).repeated().ignored()
}

pub fn lexer() -> impl SimpleParser<char, Vec<Spanned<Token>>> {
    let symbols = choice((
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just('<').to(Token::LAngle),
        just('>').to(Token::RAngle),
        just('[').to(Token::LBracket),
        just(']').to(Token::RBracket),
        just(',').to(Token::Comma),
        just('.').to(Token::Dot),
        just(';').to(Token::Semicolon),
        just("::").to(Token::Cons),
        just(":=").to(Token::Define),
        just('\\').to(Token::Lambda),
        just('λ').to(Token::Lambda),
    ));
    let others = choice((
        text::int::<char, _>(10)
            .from_str()
            .try_map(|r, span| r.map_err(|e| Error::custom(span, format!("{e}"))))
            .map(Token::Nat),
        text::ident().map(|ident: String| Token::Ident(ident.into())),
    ));
    let token = choice((symbols, others));
    trivia()
        .ignore_then(token.spanned().then_ignore(trivia()).repeated())
        .then_ignore(end())
}

fn term_parser() -> impl SimpleParser<Token, Spanned<Term>> {
    recursive(|term: Recursive<_, Spanned<Term>, _>| {
        let ident = select! { Token::Ident(ident) => ident, }.spanned();

        let variable = ident.map(Term::Variable).labelled("variable");
        let nat = select! { Token::Nat(n) => Term::Nat(n), }.labelled("number");

        let parenthesized = term
            .clone()
            .map(Spanned::forget_span)
            .delimited_by(just(Token::LParen), just(Token::RParen));

        // <term, term, ...>
        let tuple = term
            .clone()
            .refcounted()
            .then(
                just(Token::Comma)
                    .ignore_then(term.clone().refcounted())
                    .repeated()
                    .at_least(1),
            )
            .delimited_by(just(Token::LAngle), just(Token::RAngle))
            .map(|(first, rest)| Term::Tuple(std::iter::once(first).chain(rest).collect()))
            .labelled("tuple");

        // [term, ...]
        let list = term
            .clone()
            .refcounted()
            .separated_by(just(Token::Comma))
            .delimited_by(just(Token::LBracket), just(Token::RBracket))
            .map(Term::List)
            .labelled("list");

        // λx y. term
        let lambda = just(Token::Lambda)
            .ignore_then(ident.repeated().at_least(1))
            .then_ignore(just(Token::Dot))
            .then(term.clone().refcounted())
            .map(|(binders, body)| Term::Abstract(binders, body))
            .labelled("abstract");

        let atom = choice((variable, nat, parenthesized, tuple, list, lambda)).spanned();

        // term term
        let apply = atom.clone().then(atom.repeated()).foldl(|lhs, rhs| {
            let span = merge_span(&lhs.span, &rhs.span);
            Spanned::new(Term::Apply(lhs.into(), rhs.into()), span)
        });

        // term :: term
        apply
            .then(just(Token::Cons).ignore_then(term.clone()).or_not())
            .map(|(head, tail)| match tail {
                Some(tail) => {
                    let span = merge_span(&head.span, &tail.span);
                    Spanned::new(Term::Cons(head.into(), tail.into()), span)
                }
                None => head,
            })
    })
    .labelled("term")
}

fn command_parser() -> impl SimpleParser<Token, Command> {
    let ident = select! { Token::Ident(ident) => ident }.spanned();
    let define = ident
        .then_ignore(just(Token::Define))
        .then(term_parser())
        .map(|(name, term)| Command::Define(name, term));
    let term = term_parser().map(Command::Term);
    choice((define, term))
}

fn commands_parser() -> impl SimpleParser<Token, Vec<Command>> {
    command_parser()
        .separated_by(just(Token::Semicolon))
        .allow_trailing()
}

fn stringify<I: std::fmt::Display + Clone + std::hash::Hash + Eq>(
    es: Vec<Error<I>>,
) -> Vec<Error<String>> {
    es.into_iter().map(|e| e.map(|e| e.to_string())).collect()
}

pub fn tokenize(s: &str) -> Result<Vec<Spanned<Token>>, Vec<Error<String>>> {
    lexer().parse(s).map_err(stringify)
}

fn parse_full<T>(s: &str, parser: impl SimpleParser<Token, T>) -> Result<T, Vec<Error<String>>> {
    let len = s.chars().count();
    let eoi = len..len + 1;
    let tokens = tokenize(s)?;
    parser
        .then_ignore(end())
        .parse(chumsky::Stream::from_iter(
            eoi,
            tokens
                .into_iter()
                .map(|Spanned { span, value }| (value, span)),
        ))
        .map_err(stringify)
}

pub fn parse_term(s: &str) -> Result<Spanned<Term>, Vec<Error<String>>> {
    parse_full(s, term_parser())
}

pub fn parse_commands(s: &str) -> Result<Vec<Command>, Vec<Error<String>>> {
    parse_full(s, commands_parser())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn lex(s: &str) -> Vec<Token> {
        tokenize(s)
            .unwrap()
            .iter()
            .map(Spanned::value)
            .cloned()
            .collect()
    }

    fn parse(s: &str) -> String {
        parse_term(s).unwrap().to_string()
    }

    #[test]
    fn test_lexer() {
        assert_eq!(
            lex("\\x.x"),
            vec![
                Token::Lambda,
                Token::Ident(ident("x")),
                Token::Dot,
                Token::Ident(ident("x"))
            ]
        );
        assert_eq!(lex("λ"), vec![Token::Lambda]);
        assert_eq!(
            lex("sum := 12 :: nil;"),
            vec![
                Token::Ident(ident("sum")),
                Token::Define,
                Token::Nat(12),
                Token::Cons,
                Token::Ident(ident("nil")),
                Token::Semicolon
            ]
        );
        assert_eq!(lex("  # nothing but a comment\n  "), vec![]);
        assert_eq!(lex("x_1 # trailing"), vec![Token::Ident(ident("x_1"))]);
        assert!(tokenize("x ? y").is_err());
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("λx. f").unwrap();
        let spans = tokens.iter().map(Spanned::span).collect::<Vec<_>>();
        assert_eq!(spans, vec![0..1, 1..2, 2..3, 4..5]);
        assert_eq!(parse_term("f  x").unwrap().span, 0..4);
    }

    #[test]
    fn test_application_and_lambda() {
        assert_eq!(parse("f x y"), "((f x) y)");
        assert_eq!(parse("f (x y)"), "(f (x y))");
        assert_eq!(parse("λx y.x y z"), "(λx y. ((x y) z))");
        assert_eq!(parse("(\\x.x) y"), "((λx. x) y)");
        assert_eq!(parse("f λx.x y"), "(f (λx. (x y)))");
    }

    #[test]
    fn test_sugar() {
        assert_eq!(parse("<1, λx.x>"), "<1, (λx. x)>");
        assert_eq!(parse("<a, b, c>"), "<a, b, c>");
        assert_eq!(parse("[]"), "[]");
        assert_eq!(parse("[1, f x]"), "[1, (f x)]");
        assert_eq!(parse("f x :: g y :: nil"), "((f x) :: ((g y) :: nil))");
        assert_eq!(parse("x # comment\n y"), "(x y)");
    }

    #[test]
    fn test_commands() {
        let commands = parse_commands("id := λx.x; id 1;").unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].to_string(), "id := (λx. x)");
        assert_eq!(commands[1].to_string(), "(id 1)");
        assert!(parse_commands("").unwrap().is_empty());
        assert_eq!(
            parse_commands("f := g\nh").unwrap()[0].to_string(),
            "f := (g h)"
        );
    }

    #[test]
    fn test_errors() {
        assert!(parse_term("λ.x").is_err());
        assert!(parse_term("(x").is_err());
        assert!(parse_term("<x>").is_err());
        assert!(parse_term("x y)").is_err());
        assert!(parse_term("").is_err());
        assert!(parse_commands("x :=").is_err());
        assert!(parse_commands("x := y := z").is_err());
    }
}
