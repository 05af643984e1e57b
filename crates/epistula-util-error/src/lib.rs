//! Error helpers shared by the Epistula crates.

use std::error::Error;
use std::fmt;

pub type WhateverResult<T> = std::result::Result<T, snafu::Whatever>;

/// `err` followed by its whole `source()` chain.
pub fn chain<'a>(
    err: &'a (dyn Error + 'static),
) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

/// First error in the chain of `err` that is a `T`.
pub fn find_in_chain<'a, T>(err: &'a (dyn Error + 'static)) -> Option<&'a T>
where
    T: Error + 'static,
{
    chain(err).find_map(|e| e.downcast_ref::<T>())
}

/// One-line rendering of an error and its sources, as in `outer: inner`.
pub struct CompactError<'e>(&'e (dyn Error + 'e));

impl fmt::Display for CompactError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut errors = std::iter::successors(Some(self.0), |&e| e.source());
        if let Some(first) = errors.next() {
            write!(f, "{first}")?;
        }
        for err in errors {
            write!(f, ": {err}")?;
        }
        Ok(())
    }
}

pub trait FmtCompact {
    /// For logging: `err = %err.fmt_compact()`.
    fn fmt_compact(&self) -> CompactError<'_>;
}

impl<E> FmtCompact for E
where
    E: Error,
{
    fn fmt_compact(&self) -> CompactError<'_> {
        CompactError(self)
    }
}
