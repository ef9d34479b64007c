//! Lazy, fallible result sequences.

use std::fmt;

use crate::error::{QueryError, QueryResult};
use crate::query::paginate;

/// A single-pass sequence of query results.
///
/// Items are produced on demand. The first error ends the sequence: the
/// error is yielded once and every later call to `next` returns `None`, so
/// a failing stage aborts instead of silently dropping records.
pub struct Cursor<'a, R> {
    inner: Box<dyn Iterator<Item = QueryResult<R>> + 'a>,
    failed: bool,
}

impl<'a, R: 'a> Cursor<'a, R> {
    /// Wrap a fallible iterator.
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = QueryResult<R>> + 'a,
    {
        Self {
            inner: Box::new(iter),
            failed: false,
        }
    }

    /// Wrap an infallible sequence of records.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        I::IntoIter: 'a,
    {
        Self::new(records.into_iter().map(Ok))
    }

    /// A cursor that yields nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// A cursor that yields `error` and then ends.
    #[must_use]
    pub fn failed(error: QueryError) -> Self {
        Self::new(std::iter::once(Err(error)))
    }

    /// Keep records for which `predicate` returns `Ok(true)`.
    pub(crate) fn try_filter<F>(self, mut predicate: F) -> Self
    where
        F: FnMut(&R) -> QueryResult<bool> + 'a,
    {
        Self::new(self.filter_map(move |item| match item {
            Ok(record) => match predicate(&record) {
                Ok(true) => Some(Ok(record)),
                Ok(false) => None,
                Err(e) => Some(Err(e)),
            },
            Err(e) => Some(Err(e)),
        }))
    }

    /// Skip the first `n` records.
    #[must_use]
    pub fn skip_records(self, n: usize) -> Self {
        Self::new(paginate::offset(n, self))
    }

    /// Yield at most `n` records.
    #[must_use]
    pub fn take_records(self, n: usize) -> Self {
        Self::new(paginate::limit(n, self))
    }
}

impl<R> Iterator for Cursor<'_, R> {
    type Item = QueryResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.inner.next()?;
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}

impl<R> fmt::Debug for Cursor<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuses_after_error() {
        let items = vec![
            Ok(1),
            Err(QueryError::InvalidOrder(String::new())),
            Ok(2),
        ];
        let mut cursor = Cursor::new(items.into_iter());
        assert_eq!(cursor.next(), Some(Ok(1)));
        assert!(matches!(cursor.next(), Some(Err(_))));
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_try_filter_propagates_error() {
        let cursor = Cursor::from_records(vec![1, 2, 3]).try_filter(|n| {
            if *n == 2 {
                Err(QueryError::InvalidOperator("?".into()))
            } else {
                Ok(true)
            }
        });
        let out: Vec<_> = cursor.collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Ok(1));
        assert!(out[1].is_err());
    }

    #[test]
    fn test_empty_and_failed() {
        assert_eq!(Cursor::<i32>::empty().count(), 0);
        let out: Vec<_> = Cursor::<i32>::failed(QueryError::InvalidOrder("x".into())).collect();
        assert_eq!(out, vec![Err(QueryError::InvalidOrder("x".into()))]);
    }
}
