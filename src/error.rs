//! Error types used by the [`wiki-elastic`](crate) program.
//!
//! The [`elastic`](crate::elastic) module reports failures through its own typed errors
//! (see [`DispatchError`](crate::elastic::DispatchError)); the types here are used by the
//! command-line layer.

use std::fmt::{Display, Formatter};

use anyhow::Context;

/// Error type used by the [`wiki-elastic`](crate) program.
///
/// Currently mapped to [`anyhow::Error`].
pub type Error = anyhow::Error;

/// Result type used by the [`wiki-elastic`](crate) program.
///
/// Currently mapped to [`anyhow::Result`] in order to use our [`Error`] type.
pub type Result<T> = anyhow::Result<T>;

/// Multiple errors collected while waiting on concurrent operations.
#[derive(Debug)]
pub struct MultiError(Vec<Error>);

impl MultiError {
    /// Returns `Ok` if `errors` is empty, otherwise a [`MultiError`] wrapped in `context`.
    pub fn check<C, F>(errors: Vec<Error>, context: F) -> Result<()>
    where
        F: FnOnce() -> C,
        C: Display + Send + Sync + 'static,
    {
        errors
            .is_empty()
            .then_some(())
            .ok_or_else(|| MultiError(errors))
            .with_context(context)
    }

    pub fn errors(&self) -> &[Error] {
        &self.0
    }
}

impl Display for MultiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Multiple errors encountered:\n")?;
        self.0
            .iter()
            .enumerate()
            .try_fold((), |_, (i, error)| writeln!(f, "{i}: {error}\n"))
    }
}

impl std::error::Error for MultiError {}
