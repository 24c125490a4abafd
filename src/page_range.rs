use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// A single token of a range spec: one page ("5") or a closed interval ("9-10").
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)(?:-([0-9]+))?$").expect("valid token regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
    /// The interval was written high-to-low, e.g. "9-6".
    pub descending: bool,
}

impl PageRange {
    /// Parse one token like "5", "1-5" or "9-6". Returns `None` for anything
    /// that is not one of those shapes.
    pub fn parse(s: &str) -> Option<Self> {
        let caps = TOKEN.captures(s.trim())?;
        let a = parse_number(caps.get(1)?.as_str());
        let b = caps.get(2).map_or(a, |m| parse_number(m.as_str()));

        Some(PageRange {
            start: a.min(b),
            end: a.max(b),
            descending: a > b,
        })
    }

    /// The pages of this range that fall inside `1..=max`, ascending.
    /// A `max` of 0 means the page count is unknown and only the lower bound applies.
    pub fn expand(&self, max: u32) -> std::ops::RangeInclusive<u32> {
        let lo = self.start.max(1);
        let hi = if max > 0 { self.end.min(max) } else { self.end };
        if lo > hi {
            // empty
            return 1..=0;
        }
        lo..=hi
    }

    /// Like [`PageRange::expand`], but in the direction the range was written.
    pub fn expand_as_written(&self, max: u32) -> Vec<u32> {
        let pages = self.expand(max);
        if self.descending {
            pages.rev().collect()
        } else {
            pages.collect()
        }
    }
}

// The token regex guarantees ASCII digits, so the only possible failure is overflow.
fn parse_number(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

/// Parse a comma-separated list of page ranges like "1-5,10,15-12", skipping
/// empty and malformed tokens.
pub fn parse_page_ranges(s: &str) -> Vec<PageRange> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(PageRange::parse)
        .collect()
}

/// A deduplicated, ascending set of 1-based page numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSelection(Vec<u32>);

impl PageSelection {
    /// Parse a range spec with set semantics: token order does not matter,
    /// duplicates collapse, and pages outside `1..=max` are dropped.
    pub fn parse(spec: &str, max: u32) -> Self {
        let pages: BTreeSet<u32> = parse_page_ranges(spec)
            .iter()
            .flat_map(|range| range.expand(max))
            .collect();
        PageSelection(pages.into_iter().collect())
    }

    /// Every page of a `total`-page document.
    pub fn all(total: u32) -> Self {
        PageSelection((1..=total).collect())
    }

    pub fn pages(&self) -> &[u32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, page: u32) -> bool {
        self.0.binary_search(&page).is_ok()
    }
}

impl std::fmt::Display for PageSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for page in self.pages() {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}", page)?;
            first = false;
        }
        Ok(())
    }
}

/// Parse a range spec with sequence semantics: one ascending group per token,
/// in the order the tokens were written. Tokens that clamp away are dropped.
pub fn parse_page_groups(spec: &str, max: u32) -> Vec<Vec<u32>> {
    parse_page_ranges(spec)
        .iter()
        .map(|range| range.expand(max).collect::<Vec<_>>())
        .filter(|group| !group.is_empty())
        .collect()
}

/// Parse a range spec as an explicit page order, e.g. "3,1-2,9-7".
/// Nothing is sorted or deduplicated; intervals run in the written direction.
pub fn parse_page_order(spec: &str, max: u32) -> Vec<u32> {
    parse_page_ranges(spec)
        .iter()
        .flat_map(|range| range.expand_as_written(max))
        .collect()
}
