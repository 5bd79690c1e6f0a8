//! Splitting ordered result sets into fixed-size pages.
//!
//! Page numbers come straight from the `?page=` query parameter and are
//! resolved leniently: anything that is not an integer selects the first page,
//! and integers outside `1..=num_pages` select the last page.

use std::num::{IntErrorKind, NonZeroU64};

/// Page size of every post listing.
pub const POSTS_PER_PAGE: NonZeroU64 = NonZeroU64::new(10).unwrap();

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct Paginator {
    count: u64,
    per_page: NonZeroU64,
}

/// Row window a page covers, ready for `LIMIT` and `OFFSET`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

impl Paginator {
    #[must_use]
    pub fn new(count: u64, per_page: NonZeroU64) -> Self {
        Self { count, per_page }
    }

    #[must_use]
    pub fn count(self) -> u64 {
        self.count
    }

    #[must_use]
    pub fn per_page(self) -> NonZeroU64 {
        self.per_page
    }

    /// Always at least one, so an empty listing still has a first page.
    #[must_use]
    pub fn num_pages(self) -> u64 {
        self.count.div_ceil(self.per_page.get()).max(1)
    }

    #[must_use]
    pub fn page_number(self, raw: Option<&str>) -> u64 {
        let Some(raw) = raw else {
            return 1;
        };

        match raw.trim().parse::<i64>() {
            Ok(number) => u64::try_from(number)
                .ok()
                .filter(|number| (1..=self.num_pages()).contains(number))
                .unwrap_or_else(|| self.num_pages()),
            Err(err) => match err.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => self.num_pages(),
                _ => 1,
            },
        }
    }

    /// Window for `number`, which must already be resolved.
    #[must_use]
    pub fn window(self, number: u64) -> PageWindow {
        let number = number.clamp(1, self.num_pages());

        PageWindow {
            offset: (number - 1) * self.per_page.get(),
            limit: self.per_page.get(),
        }
    }

    #[must_use]
    pub fn page<T>(self, number: u64, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: number.clamp(1, self.num_pages()),
            paginator: self,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Page<T> {
    items: Vec<T>,
    number: u64,
    paginator: Paginator,
}

impl<T> Page<T> {
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn number(&self) -> u64 {
        self.number
    }

    #[must_use]
    pub fn num_pages(&self) -> u64 {
        self.paginator.num_pages()
    }

    /// Total number of items across all pages.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.paginator.count()
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then_some(self.number + 1)
    }

    #[must_use]
    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then_some(self.number - 1)
    }

    /// 1-based index of the first item on this page, 0 when there are none.
    #[must_use]
    pub fn start_index(&self) -> u64 {
        if self.count() == 0 {
            0
        } else {
            self.paginator.window(self.number).offset + 1
        }
    }

    /// 1-based index of the last item on this page.
    #[must_use]
    pub fn end_index(&self) -> u64 {
        if self.number == self.num_pages() {
            self.count()
        } else {
            self.number * self.paginator.per_page().get()
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            paginator: self.paginator,
        }
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::page::{POSTS_PER_PAGE, PageWindow, Paginator};
    use std::num::NonZeroU64;

    const TOTAL_POSTS: u64 = 13;

    fn paginator(count: u64) -> Paginator {
        Paginator::new(count, POSTS_PER_PAGE)
    }

    #[test]
    fn num_pages() {
        assert_eq!(paginator(0).num_pages(), 1);
        assert_eq!(paginator(1).num_pages(), 1);
        assert_eq!(paginator(10).num_pages(), 1);
        assert_eq!(paginator(11).num_pages(), 2);
        assert_eq!(paginator(TOTAL_POSTS).num_pages(), 2);
        assert_eq!(paginator(100).num_pages(), 10);
    }

    #[test]
    fn page_number_resolution() {
        let paginator = paginator(TOTAL_POSTS);

        assert_eq!(paginator.page_number(None), 1);
        assert_eq!(paginator.page_number(Some("1")), 1);
        assert_eq!(paginator.page_number(Some("2")), 2);
        assert_eq!(paginator.page_number(Some(" 2 ")), 2);

        assert_eq!(paginator.page_number(Some("")), 1);
        assert_eq!(paginator.page_number(Some("abc")), 1);
        assert_eq!(paginator.page_number(Some("2.0")), 1);

        assert_eq!(paginator.page_number(Some("3")), 2);
        assert_eq!(paginator.page_number(Some("0")), 2);
        assert_eq!(paginator.page_number(Some("-1")), 2);
        assert_eq!(paginator.page_number(Some("99999999999999999999999")), 2);
    }

    #[test]
    fn empty_listing_has_one_empty_page() {
        let paginator = paginator(0);
        let page = paginator.page::<()>(paginator.page_number(Some("5")), Vec::new());

        assert_eq!(page.number(), 1);
        assert!(page.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
        assert_eq!(page.start_index(), 0);
        assert_eq!(page.end_index(), 0);
    }

    #[test]
    fn windows() {
        let paginator = paginator(TOTAL_POSTS);

        assert_eq!(
            paginator.window(1),
            PageWindow {
                offset: 0,
                limit: 10
            }
        );
        assert_eq!(
            paginator.window(2),
            PageWindow {
                offset: 10,
                limit: 10
            }
        );

        let small = Paginator::new(7, NonZeroU64::new(3).unwrap());
        assert_eq!(small.window(3).offset, 6);
    }

    #[test]
    fn page_navigation() {
        let paginator = paginator(TOTAL_POSTS);

        let first = paginator.page(1, (0..10).collect());
        assert_eq!(first.len(), 10);
        assert!(first.has_next());
        assert!(!first.has_previous());
        assert_eq!(first.next_page_number(), Some(2));
        assert_eq!(first.previous_page_number(), None);
        assert_eq!((first.start_index(), first.end_index()), (1, 10));

        let second = paginator.page(2, (10..13).collect());
        assert_eq!(second.len(), 3);
        assert!(!second.has_next());
        assert!(second.has_previous());
        assert_eq!(second.previous_page_number(), Some(1));
        assert_eq!((second.start_index(), second.end_index()), (11, 13));
        assert_eq!(second.count(), TOTAL_POSTS);
    }

    #[test]
    fn map_keeps_position() {
        let page = paginator(TOTAL_POSTS).page(2, vec![1, 2, 3]);
        let mapped = page.map(|n| n * 10);

        assert_eq!(mapped.items(), &[10, 20, 30]);
        assert_eq!(mapped.number(), 2);
        assert_eq!(mapped.num_pages(), 2);
    }
}
