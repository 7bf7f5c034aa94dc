//! Pagination shared by site and page queries.

use serde::{Deserialize, Serialize};

/// Offset/limit window over query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: usize,
    pub limit: usize,
}

impl Pagination {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Keeps only the items inside the window.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }

    /// The window following this one.
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }
}

/// Applies an optional pagination window.
pub(crate) fn paginate<T>(items: Vec<T>, pagination: Option<&Pagination>) -> Vec<T> {
    match pagination {
        Some(pagination) => pagination.apply(items),
        None => items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_window() {
        let page = Pagination::new(2, 3);
        assert_eq!(page.apply((0..10).collect()), vec![2, 3, 4]);
        assert_eq!(page.next().apply((0..10).collect()), vec![5, 6, 7]);
        assert_eq!(Pagination::new(8, 5).apply((0..10).collect()), vec![8, 9]);
    }

    #[test]
    fn test_unbounded_window_has_no_next() {
        let all = Pagination::new(3, usize::MAX);
        assert_eq!(all.apply((0..5).collect()), vec![3, 4]);

        let next = all.next();
        assert_eq!(next.offset, usize::MAX);
        assert!(next.apply((0..5).collect::<Vec<i32>>()).is_empty());
    }
}
