//! Page navigation under post listings.

use maud::{Markup, Render, html};
use yatube_common::page::Page;

/// How many page numbers are shown on either side of the current one.
const NEIGHBOURS: u64 = 2;

#[derive(Debug, Clone)]
pub struct Pagination<'a> {
    base_url: &'a str,
    current: u64,
    num_pages: u64,
}

impl<'a> Pagination<'a> {
    #[must_use]
    pub fn new<T>(base_url: &'a str, page: &Page<T>) -> Self {
        Self {
            base_url,
            current: page.number(),
            num_pages: page.num_pages(),
        }
    }

    fn url(&self, number: u64) -> String {
        if number == 1 {
            self.base_url.to_owned()
        } else {
            format!("{}?page={number}", self.base_url)
        }
    }
}

impl Render for Pagination<'_> {
    fn render(&self) -> Markup {
        if self.num_pages <= 1 {
            return html! {};
        }

        let start = self.current.saturating_sub(NEIGHBOURS).max(1);
        let end = (self.current + NEIGHBOURS).min(self.num_pages);

        html! {
            nav class="pagination" aria-label="Pages" {
                @if self.current > 1 {
                    a href=(self.url(1)) { "« first" }
                    a href=(self.url(self.current - 1)) { "previous" }
                }

                @for number in start..=end {
                    @if number == self.current {
                        span class="current" aria-current="page" { (number) }
                    } @else {
                        a href=(self.url(number)) { (number) }
                    }
                }

                @if self.current < self.num_pages {
                    a href=(self.url(self.current + 1)) { "next" }
                    a href=(self.url(self.num_pages)) { "last »" }
                }
            }
        }
    }
}
