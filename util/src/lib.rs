pub mod repl;

use anyhow::anyhow;

/// Turns errors that only implement `Debug` (parser error lists, mostly) into
/// `anyhow` errors, prefixed with what was being done.
pub trait ResultExt<T> {
    fn staticalize(self, doing: &str) -> anyhow::Result<T>;
}
impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    fn staticalize(self, doing: &str) -> anyhow::Result<T> {
        self.map_err(|e| anyhow!("{doing}: {e:?}"))
    }
}
