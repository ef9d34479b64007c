//! Offset and limit stages.
//!
//! Both stages count only successful items. Errors pass straight through,
//! so an error inside the skipped prefix still reaches the consumer.

/// Iterator returned by [`offset`].
#[derive(Debug, Clone)]
pub struct Offset<I> {
    inner: I,
    remaining: usize,
}

/// Iterator returned by [`limit`].
#[derive(Debug, Clone)]
pub struct Limit<I> {
    inner: I,
    remaining: usize,
}

/// Skip the first `n` successful items of `items`.
pub fn offset<I, T, E>(n: usize, items: I) -> Offset<I::IntoIter>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    Offset {
        inner: items.into_iter(),
        remaining: n,
    }
}

/// Yield at most `n` successful items of `items`.
pub fn limit<I, T, E>(n: usize, items: I) -> Limit<I::IntoIter>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    Limit {
        inner: items.into_iter(),
        remaining: n,
    }
}

impl<I, T, E> Iterator for Offset<I>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.inner.next()?;
            if self.remaining > 0 && item.is_ok() {
                self.remaining = self.remaining.saturating_sub(1);
                continue;
            }
            return Some(item);
        }
    }
}

impl<I, T, E> Iterator for Limit<I>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.inner.next()?;
        if item.is_ok() {
            self.remaining = self.remaining.saturating_sub(1);
        }
        Some(item)
    }
}
