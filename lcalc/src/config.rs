use std::str::FromStr;

use thiserror::Error;

use crate::{
    encoding::Combinator,
    eval::{self, Mode, Reduction, Strategy},
    term::Term,
};

pub const DEFAULT_MAX_STEPS: usize = 10_000;

#[derive(Error, PartialEq, Eq, Debug)]
pub enum ConfigError {
    #[error("Unknown setting {0}")]
    UnknownSetting(String),
    #[error("Invalid value {value} for {key}, expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, expected: &'static str) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
            expected,
        }
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lo" | "normal" | "leftmost-outermost" => Ok(Self::LeftmostOutermost),
            "leftmost" => Ok(Self::Leftmost),
            _ => Err(ConfigError::invalid("strategy", s, "lo or leftmost")),
        }
    }
}

impl FromStr for Mode {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beta" => Ok(Self::Beta),
            "eta" => Ok(Self::Eta),
            "both" => Ok(Self::Both),
            _ => Err(ConfigError::invalid("mode", s, "beta, eta or both")),
        }
    }
}

impl FromStr for Combinator {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "turing" | "theta" => Ok(Self::Turing),
            "curry" | "y" => Ok(Self::Curry),
            _ => Err(ConfigError::invalid("fixpoint", s, "turing or curry")),
        }
    }
}

fn parse_flag(key: &'static str, s: &str) -> Result<bool, ConfigError> {
    match s {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::invalid(key, s, "on or off")),
    }
}

fn flag(b: bool) -> &'static str {
    if b {
        "on"
    } else {
        "off"
    }
}

/// Step bound from its user-facing spelling, where a negative number means
/// unbounded.
pub fn limit_from(n: i64) -> Option<usize> {
    usize::try_from(n).ok()
}

/// Settings of an interpreter session.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Config {
    pub strategy: Strategy,
    pub mode: Mode,
    /// `None` for no bound.
    pub max_steps: Option<usize>,
    /// Print every intermediate term.
    pub verbose: bool,
    /// Combinator tying recursive definitions.
    pub fixpoint: Combinator,
    /// Reject free variables that are neither bound nor defined.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            mode: Mode::default(),
            max_steps: Some(DEFAULT_MAX_STEPS),
            verbose: false,
            fixpoint: Combinator::default(),
            strict: false,
        }
    }
}

impl Config {
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "strategy" => self.strategy = value.parse()?,
            "mode" => self.mode = value.parse()?,
            "steps" | "max_steps" | "max-steps" => {
                let n = value
                    .parse::<i64>()
                    .map_err(|_| ConfigError::invalid("max_steps", value, "an integer"))?;
                self.max_steps = limit_from(n);
            }
            "verbose" => self.verbose = parse_flag("verbose", value)?,
            "fixpoint" => self.fixpoint = value.parse()?,
            "strict" => self.strict = parse_flag("strict", value)?,
            _ => return Err(ConfigError::UnknownSetting(key.to_string())),
        }
        Ok(())
    }

    pub fn reduce(&self, term: &Term) -> Reduction {
        eval::reduce(term, self.mode, self.strategy, self.max_steps)
    }

    pub fn reduce_with(&self, term: &Term, observe: impl FnMut(usize, &Term)) -> Reduction {
        eval::reduce_with(term, self.mode, self.strategy, self.max_steps, observe)
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "strategy  = {}", self.strategy)?;
        writeln!(f, "mode      = {}", self.mode)?;
        match self.max_steps {
            Some(n) => writeln!(f, "max_steps = {n}")?,
            None => writeln!(f, "max_steps = -1")?,
        }
        writeln!(f, "verbose   = {}", flag(self.verbose))?;
        writeln!(f, "fixpoint  = {}", self.fixpoint)?;
        write!(f, "strict    = {}", flag(self.strict))
    }
}
