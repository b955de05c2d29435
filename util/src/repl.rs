use rustyline::{error::ReadlineError, Editor};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error<E> {
    #[error(transparent)]
    Readline(ReadlineError),
    #[error("Eval failed: {0:?}")]
    EvalError(E),
}

/// Whether the loop keeps reading after an input was handled.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Flow {
    Continue,
    Exit,
}

pub trait Repl {
    type Error: std::fmt::Debug;
    const HISTORY: Option<&'static str> = None;
    const PROMPT: &'static str = ">> ";
    /// Shown while a `\`-terminated line is waiting for the rest of the input.
    const CONTINUATION: &'static str = ".. ";
    fn evaluate(&mut self, input: String) -> Result<Flow, Self::Error>;
}

/// Appends `line` to the pending input. Returns `true` if the input is
/// complete, i.e. the line did not end with a backslash.
fn accumulate(pending: &mut Option<String>, mut line: String) -> bool {
    let complete = !line.ends_with('\\');
    if !complete {
        line.pop();
        line.push('\n');
    }
    match pending.as_mut() {
        Some(input) => input.push_str(line.as_str()),
        None => *pending = Some(line),
    }
    complete
}

pub fn start_repl<R: Repl>(mut repl: R) -> Result<(), Error<R::Error>> {
    let mut editor = Editor::<()>::new();
    if let Some(history) = R::HISTORY {
        editor.load_history(history).ok();
    }
    let mut pending: Option<String> = None;
    loop {
        let prompt = if pending.is_some() {
            R::CONTINUATION
        } else {
            R::PROMPT
        };
        match editor.readline(prompt) {
            Ok(line) => {
                if !accumulate(&mut pending, line) {
                    continue;
                }
                let input = pending.take().unwrap_or_default();
                editor.add_history_entry(input.as_str());
                let flow = repl.evaluate(input).map_err(Error::EvalError)?;
                if let Some(history) = R::HISTORY {
                    editor.save_history(history).map_err(Error::Readline)?;
                }
                if flow == Flow::Exit {
                    println!("Bye!");
                    break Ok(());
                }
            }
            Err(ReadlineError::Interrupted) if pending.is_some() => {
                pending = None;
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Bye!");
                break Ok(());
            }
            Err(e) => break Err(Error::Readline(e)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_accumulate() {
        let mut pending = None;
        assert!(!accumulate(&mut pending, "a := λx.\\".to_string()));
        assert_eq!(pending.as_deref(), Some("a := λx.\n"));
        assert!(accumulate(&mut pending, "x".to_string()));
        assert_eq!(pending.as_deref(), Some("a := λx.\nx"));

        let mut pending = None;
        assert!(accumulate(&mut pending, "succ 2".to_string()));
        assert_eq!(pending.as_deref(), Some("succ 2"));
    }
}
