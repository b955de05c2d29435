use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use clap::Parser;
use lcalc::{
    compiler::{self, Context},
    config::{self, Config},
    encoding::{describe, Combinator},
    equiv::alpha_equal,
    eval::{self, Mode, Reduction, Strategy},
    lang::{self, Command},
    parser,
    prelude::*,
    stdlib, Term,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use util::{
    repl::{self, Flow},
    ResultExt,
};

#[derive(Parser)]
#[command(version, about = "Untyped lambda calculus interpreter", long_about = None)]
struct Cli {
    /// Files to import before anything else.
    files: Vec<PathBuf>,

    /// Evaluate this input and exit instead of starting the REPL.
    #[arg(short, long)]
    command: Option<String>,

    #[arg(long, default_value_t = Strategy::default())]
    strategy: Strategy,

    #[arg(long, default_value_t = Mode::default())]
    mode: Mode,

    /// Reduction step bound, negative for none.
    #[arg(
        long,
        default_value_t = config::DEFAULT_MAX_STEPS as i64,
        allow_negative_numbers = true
    )]
    max_steps: i64,

    /// Print every reduction step.
    #[arg(short, long)]
    verbose: bool,

    /// Combinator used for recursive definitions.
    #[arg(long, default_value_t = Combinator::default())]
    fixpoint: Combinator,

    /// Reject undefined free variables.
    #[arg(long)]
    strict: bool,

    /// Start without the Church prelude.
    #[arg(long)]
    no_prelude: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            strategy: self.strategy,
            mode: self.mode,
            max_steps: config::limit_from(self.max_steps),
            verbose: self.verbose,
            fixpoint: self.fixpoint,
            strict: self.strict,
        }
    }
}

fn build_report(e: Error) -> Report<Span> {
    use chumsky::error::SimpleReason;
    let found = e.found().map(String::as_str).unwrap_or("end of input");
    let report = Report::build(ReportKind::Error, (), e.span().start);
    match e.reason() {
        SimpleReason::Unexpected => {
            let expected = e
                .expected()
                .map(|t| t.as_deref().unwrap_or("end of input"))
                .collect::<Vec<_>>()
                .join(", ");
            let message = if expected.is_empty() {
                format!("Unexpected {found}")
            } else {
                format!("Unexpected {found}, expected {expected}")
            };
            report.with_message(message).with_label(
                Label::new(e.span())
                    .with_message(format!("Unexpected {}", found.fg(Color::Red)))
                    .with_color(Color::Red),
            )
        }
        SimpleReason::Unclosed { span, delimiter } => report
            .with_message(format!("Unclosed delimiter {}", delimiter.fg(Color::Yellow)))
            .with_label(
                Label::new(span.clone())
                    .with_message(format!("Opened here {}", delimiter.fg(Color::Yellow)))
                    .with_color(Color::Yellow),
            )
            .with_label(
                Label::new(e.span())
                    .with_message(format!("Must be closed before {}", found.fg(Color::Red)))
                    .with_color(Color::Red),
            ),
        SimpleReason::Custom(msg) => report.with_message(msg).with_label(
            Label::new(e.span())
                .with_message(format!("{}", msg.fg(Color::Red)))
                .with_color(Color::Red),
        ),
    }
    .finish()
}

fn report(input: &str, es: Vec<Error>) -> std::io::Result<()> {
    for e in es {
        build_report(e).eprint(Source::from(input))?;
    }
    Ok(())
}

fn print_reduction(reduction: &Reduction) {
    println!("{}", reduction.term);
    let steps = match reduction.steps {
        1 => "1 step".to_string(),
        n => format!("{n} steps"),
    };
    match describe(&reduction.term) {
        Some(value) => println!("  -- {value}, {steps}"),
        None => println!("  -- {steps}"),
    }
    if reduction.exhausted {
        eprintln!(
            "Stopped after {} steps without reaching a normal form",
            reduction.steps
        );
    }
}

type CommandResult<'a, T = ()> = std::result::Result<T, (&'a str, Vec<Error>)>;

struct Interpreter {
    context: Context,
    config: Config,
}

impl Interpreter {
    fn compile<'i>(&self, input: &'i str, term: &Spanned<lang::Term>) -> CommandResult<'i, Term> {
        compiler::compile_term(&self.context, &self.config, term).map_err(|e| (input, vec![e]))
    }

    fn reduce(&self, term: &Term) -> Reduction {
        if self.config.verbose {
            self.config
                .reduce_with(term, |n, term| println!("{n} -> {term}"))
        } else {
            self.config.reduce(term)
        }
    }

    fn tokenize(input: &str) -> CommandResult {
        let tokens = parser::tokenize(input)
            .map_err(|es| (input, es))?
            .iter()
            .map(|token| token.value().to_string())
            .collect::<Vec<_>>();
        println!("{}", tokens.join(" "));
        Ok(())
    }

    fn parse(input: &str) -> CommandResult {
        for command in parser::parse_commands(input).map_err(|es| (input, es))? {
            println!("{command}");
        }
        Ok(())
    }

    fn step<'i>(&self, input: &'i str) -> CommandResult<'i> {
        let term = parser::parse_term(input).map_err(|es| (input, es))?;
        let term = self.compile(input, &term)?;
        match eval::step(&term, self.config.mode, self.config.strategy) {
            Some(next) => println!("{next}"),
            None => println!("{term}\n  -- normal form"),
        }
        Ok(())
    }

    fn equal<'i>(&self, input: &'i str) -> CommandResult<'i> {
        let commands = parser::parse_commands(input).map_err(|es| (input, es))?;
        let terms = match commands.as_slice() {
            [Command::Term(lhs), Command::Term(rhs)] => [lhs, rhs],
            _ => {
                let span = 0..input.chars().count();
                let message = "Expected two terms separated by ;";
                return Err((input, vec![Error::custom(span, message)]));
            }
        };
        let mut normal_forms = vec![];
        for term in terms {
            let reduction = self.reduce(&self.compile(input, term)?);
            if reduction.exhausted {
                eprintln!("Stopped reducing {} after {} steps", term, reduction.steps);
            }
            normal_forms.push(reduction.term);
        }
        println!("{}", alpha_equal(&normal_forms[0], &normal_forms[1]));
        Ok(())
    }

    fn evaluate<'i>(&mut self, input: &'i str) -> CommandResult<'i> {
        for command in parser::parse_commands(input).map_err(|es| (input, es))? {
            match command {
                Command::Term(term) => {
                    let term = self.compile(input, &term)?;
                    print_reduction(&self.reduce(&term));
                }
                Command::Define(name, term) => {
                    let term =
                        compiler::compile_definition(&self.context, &self.config, &name, &term)
                            .map_err(|e| (input, vec![e]))?;
                    println!("{name} := {term}");
                    self.context.define(name.forget_span(), term);
                }
            }
        }
        Ok(())
    }

    fn import(&mut self, path: &Path) -> Result<()> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        info!(path = %path.display(), "importing");
        if let Err((input, es)) = self.evaluate(&source) {
            report(input, es)?;
            bail!("Failed to import {}", path.display());
        }
        Ok(())
    }

    fn set(&mut self, input: &str) {
        match input.split_whitespace().collect::<Vec<_>>().as_slice() {
            [key, value] => match self.config.set(key, value) {
                Ok(()) => println!("{key} = {value}"),
                Err(e) => eprintln!("{e}"),
            },
            _ => eprintln!("Usage: :set key value"),
        }
    }

    fn show_definitions(&self) {
        for (name, term) in self.context.iter() {
            println!("{name} := {term}");
        }
    }

    fn show_help() {
        println!(
            "{}",
            r#"
term; name := term     -- same as :eval
:tokenize   input      -- show the tokens
:parse      input      -- show the parsed statements
:eval       input      -- evaluate terms and add definitions
:step       term       -- contract a single redex
:equal      term; term -- compare normal forms up to renaming
:set        key value  -- change a setting
:settings              -- show the settings
:defs                  -- show the definitions
:import     path       -- evaluate a file
:clear                 -- clear the screen
:help                  -- show this message
:quit                  -- leave
        "#
            .trim()
        );
    }

    fn handle_repl_input<'i>(&mut self, input: &'i str) -> CommandResult<'i, Flow> {
        let (cmd, input) = if let Some(stripped) = input.strip_prefix(':') {
            stripped
                .trim_start()
                .split_once(char::is_whitespace)
                .unwrap_or((stripped.trim(), ""))
        } else {
            ("", input)
        };
        match cmd {
            "to" | "tokenize" => Self::tokenize(input)?,
            "p" | "parse" => Self::parse(input)?,
            "" | "e" | "eval" | "evaluate" => self.evaluate(input)?,
            "s" | "step" => self.step(input)?,
            "eq" | "equal" => self.equal(input)?,
            "set" => self.set(input),
            "settings" => println!("{}", self.config),
            "d" | "defs" => self.show_definitions(),
            "i" | "import" => {
                if let Err(e) = self.import(Path::new(input.trim())) {
                    eprintln!("{e:?}");
                }
            }
            "clear" => print!("\x1B[2J\x1B[1;1H"),
            "h" | "help" => Self::show_help(),
            "q" | "quit" | "exit" => return Ok(Flow::Exit),
            _ => {
                eprintln!("Unknown command {cmd}");
                Self::show_help();
            }
        }
        Ok(Flow::Continue)
    }
}

impl repl::Repl for Interpreter {
    type Error = anyhow::Error;
    const HISTORY: Option<&'static str> = Some("/tmp/lcalc.history");
    const PROMPT: &'static str = "λ> ";
    fn evaluate(&mut self, input: String) -> Result<Flow, Self::Error> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Flow::Continue);
        }
        match self.handle_repl_input(input) {
            Ok(flow) => Ok(flow),
            Err((input, es)) => {
                report(input, es)?;
                Ok(Flow::Continue)
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    let context = if cli.no_prelude {
        Context::default()
    } else {
        stdlib::prelude(&config).staticalize("Failed to load the prelude")?
    };
    let mut interpreter = Interpreter { context, config };
    for file in &cli.files {
        interpreter.import(file)?;
    }

    if let Some(command) = &cli.command {
        if let Err((input, es)) = interpreter.evaluate(command) {
            report(input, es)?;
            bail!("Failed to evaluate {command}");
        }
        return Ok(());
    }

    println!("Hi, this is an untyped lambda calculus REPL. :h to show help");
    println!();
    repl::start_repl(interpreter)?;
    Ok(())
}
