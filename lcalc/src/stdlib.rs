use tracing::debug;

use crate::{
    compiler::{compile_definition, Context},
    config::Config,
    lang::Command,
    parser::parse_commands,
    prelude::*,
};

pub const PRELUDE: &str = include_str!("prelude.lc");

/// A context holding the definitions of [`PRELUDE`].
pub fn prelude(config: &Config) -> Result<Context, Vec<Error>> {
    let mut context = Context::default();
    for command in parse_commands(PRELUDE)? {
        match command {
            Command::Define(name, term) => {
                let term =
                    compile_definition(&context, config, &name, &term).map_err(|e| vec![e])?;
                context.define(name.forget_span(), term);
            }
            Command::Term(term) => {
                return Err(vec![Error::custom(
                    term.span(),
                    "Only definitions are allowed in the prelude",
                )])
            }
        }
    }
    debug!(definitions = context.len(), "loaded prelude");
    Ok(context)
}
