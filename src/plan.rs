//! Page plans: the ordered instructions for assembling an output document
//! from the pages of a source document.
//!
//! Everything here is pure data. A [`PageSource`] turns a plan into a real
//! document.

use anyhow::{anyhow, Result};
use thiserror::Error;

use crate::page_range::PageSelection;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    /// A selection the operation cannot do without resolved to no pages.
    #[error("no pages selected")]
    SelectionEmpty,

    /// A grouping spec produced no usable groups at all.
    #[error("no valid page ranges")]
    NoValidRanges,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Right, // 90° clockwise
    Down,  // 180°
    Left,  // 90° counter-clockwise
}

impl Rotation {
    /// Normalize an angle in degrees to a rotation. Counter-clockwise angles
    /// are turned into their clockwise equivalent. Only quarter turns are
    /// representable in a PDF page's `/Rotate`.
    pub fn from_degrees(degrees: i64, counter_clockwise: bool) -> Result<Self> {
        let mut angle = degrees.rem_euclid(360);
        if counter_clockwise {
            angle = (360 - angle) % 360;
        }
        match angle {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Right),
            180 => Ok(Rotation::Down),
            270 => Ok(Rotation::Left),
            _ => Err(anyhow!(
                "Rotation must be a multiple of 90 degrees, got {}",
                degrees
            )),
        }
    }

    /// Clockwise degrees, as stored in `/Rotate`.
    pub fn degrees(self) -> i64 {
        match self {
            Rotation::None => 0,
            Rotation::Right => 90,
            Rotation::Down => 180,
            Rotation::Left => 270,
        }
    }

    /// Add this rotation to an existing `/Rotate` value.
    pub fn apply_to(self, current: i64) -> i64 {
        (current + self.degrees()).rem_euclid(360)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanStep {
    /// Copy original page `page` (1-based), turned by `rotation`.
    Copy { page: u32, rotation: Rotation },
    /// Insert a blank page.
    Blank(PageSize),
}

impl PlanStep {
    pub fn copy(page: u32) -> Self {
        PlanStep::Copy {
            page,
            rotation: Rotation::None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePlan {
    steps: Vec<PlanStep>,
}

impl PagePlan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        PagePlan { steps }
    }

    /// Copy every page of a `total`-page document unchanged.
    pub fn identity(total: u32) -> Self {
        PagePlan::new((1..=total).map(PlanStep::copy).collect())
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Source pages referenced by this plan, in plan order.
    pub fn source_pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.steps.iter().filter_map(|step| match step {
            PlanStep::Copy { page, .. } => Some(*page),
            PlanStep::Blank(_) => None,
        })
    }

    pub fn blank_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, PlanStep::Blank(_)))
            .count()
    }
}

/// A document that can report its pages and build a new document from a plan.
pub trait PageSource {
    type Output;

    fn page_count(&self) -> u32;

    fn page_size(&self, page: u32) -> Result<PageSize>;

    fn materialize(&self, plan: &PagePlan) -> Result<Self::Output>;
}

/// Keep only the selected pages. Used by extract.
pub fn keep(selection: &PageSelection) -> PagePlan {
    PagePlan::new(selection.iter().map(PlanStep::copy).collect())
}

/// Drop the selected pages. Used by delete.
///
/// An empty selection is rejected: removing nothing would quietly produce a
/// full copy of the input.
pub fn remove(total: u32, selection: &PageSelection) -> Result<PagePlan, PlanError> {
    if selection.is_empty() {
        return Err(PlanError::SelectionEmpty);
    }
    Ok(PagePlan::new(
        (1..=total)
            .filter(|page| !selection.contains(*page))
            .map(PlanStep::copy)
            .collect(),
    ))
}

/// All original pages, then one extra copy of each selected page.
pub fn duplicate(total: u32, selection: &PageSelection) -> PagePlan {
    let mut plan = PagePlan::identity(total);
    plan.steps.extend(selection.iter().map(PlanStep::copy));
    plan
}

/// Insert a blank page after every page in `positions`, sized like the page it follows.
pub fn insert_blank<F>(total: u32, positions: &PageSelection, mut size_of: F) -> PagePlan
where
    F: FnMut(u32) -> PageSize,
{
    let mut steps = Vec::with_capacity(total as usize + positions.len());
    for page in 1..=total {
        steps.push(PlanStep::copy(page));
        if positions.contains(page) {
            steps.push(PlanStep::Blank(size_of(page)));
        }
    }
    PagePlan::new(steps)
}

/// Copy pages in exactly the given order. Repeats and omissions are kept as is.
pub fn reorder(order: &[u32]) -> PagePlan {
    PagePlan::new(order.iter().copied().map(PlanStep::copy).collect())
}

/// One plan per group, in group order.
pub fn split(groups: &[Vec<u32>]) -> Result<Vec<PagePlan>, PlanError> {
    let plans: Vec<PagePlan> = groups
        .iter()
        .filter(|group| !group.is_empty())
        .map(|group| reorder(group))
        .collect();

    if plans.is_empty() {
        return Err(PlanError::NoValidRanges);
    }
    Ok(plans)
}

/// All original pages, with the selected ones turned by `rotation`.
pub fn rotate(
    total: u32,
    selection: &PageSelection,
    rotation: Rotation,
) -> Result<PagePlan, PlanError> {
    if selection.is_empty() {
        return Err(PlanError::SelectionEmpty);
    }
    Ok(PagePlan::new(
        (1..=total)
            .map(|page| PlanStep::Copy {
                page,
                rotation: if selection.contains(page) {
                    rotation
                } else {
                    Rotation::None
                },
            })
            .collect(),
    ))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn permutation() -> impl Strategy<Value = Vec<u32>> {
        (1u32..30).prop_flat_map(|n| Just((1..=n).collect::<Vec<_>>()).prop_shuffle())
    }

    proptest! {
        #[test]
        fn inverse_reorder_restores_order(order in permutation()) {
            let mut inverse = vec![0; order.len()];
            for (position, page) in order.iter().enumerate() {
                inverse[*page as usize - 1] = position as u32 + 1;
            }

            let shuffled: Vec<u32> = reorder(&order).source_pages().collect();
            let restored: Vec<u32> = reorder(&inverse)
                .source_pages()
                .map(|position| shuffled[position as usize - 1])
                .collect();

            let identity: Vec<u32> = (1..=order.len() as u32).collect();
            prop_assert_eq!(restored, identity);
        }

        #[test]
        fn plan_lengths_add_up(total in 1u32..40, spec in "[0-9, -]{0,20}") {
            let selection = PageSelection::parse(&spec, total);
            let n = total as usize;

            prop_assert_eq!(keep(&selection).len(), selection.len());
            prop_assert_eq!(duplicate(total, &selection).len(), n + selection.len());
            let inserted = insert_blank(total, &selection, |_| PageSize::LETTER);
            prop_assert_eq!(inserted.len(), n + selection.len());
            if let Ok(plan) = remove(total, &selection) {
                prop_assert_eq!(plan.len(), n - selection.len());
            }
            for page in duplicate(total, &selection).source_pages() {
                prop_assert!(page >= 1 && page <= total);
            }
        }
    }
}
