// Copyright 2025 the Aural UI Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Aural Focus: focus traversal for disclosure widgets.
//!
//! Overlays such as modals and drawers confine Tab to their interior, and
//! composite widgets such as menus, tab lists, and listboxes move a "roving"
//! focus with the arrow keys plus Home/End. Both are the same question asked
//! of a different candidate set: *given where focus is now and a navigation
//! intent, which candidate is next?*
//!
//! This crate answers it with:
//! - **Navigation intents** ([`Navigation`]): Tab/Shift+Tab, arrows, Home/End.
//! - A **read-only view of candidates** ([`FocusEntry`] / [`FocusSpace`]) that
//!   places each focusable element in a 2D coordinate space.
//! - Pluggable **policies** ([`FocusPolicy`]), with [`DefaultPolicy`] covering
//!   reading-order traversal, directional arrows, and first/last jumps.
//! - [`trap`], the focus-trap step used for modal Tab handling.
//!
//! ## Minimal example
//!
//! A focus trap over the two buttons of a confirmation dialog:
//!
//! ```rust
//! use kurbo::Rect;
//! use aural_focus::{FocusEntry, FocusSpace, trap};
//!
//! let entries = vec![
//!     FocusEntry::new(1_u32, Rect::new(0.0, 0.0, 10.0, 10.0)),
//!     FocusEntry::new(2_u32, Rect::new(20.0, 0.0, 30.0, 10.0)),
//! ];
//! let space = FocusSpace { nodes: &entries };
//!
//! // Tab moves from "Cancel" to "Confirm"…
//! assert_eq!(trap(Some(1), false, &space), Some(2));
//! // …and wraps instead of leaving the dialog.
//! assert_eq!(trap(Some(2), false, &space), Some(1));
//! // Focus that escaped the dialog is pulled back to the first candidate.
//! assert_eq!(trap(Some(99), false, &space), Some(1));
//! ```
//!
//! ## Roving focus
//!
//! ```rust
//! use kurbo::Rect;
//! use aural_focus::{DefaultPolicy, FocusEntry, FocusPolicy, FocusSpace, Navigation, WrapMode};
//!
//! // A vertical menu with a disabled middle item.
//! let items = vec![
//!     FocusEntry::new("copy", Rect::new(0.0, 0.0, 80.0, 20.0)),
//!     FocusEntry::new("paste", Rect::new(0.0, 20.0, 80.0, 40.0)).disabled(),
//!     FocusEntry::new("delete", Rect::new(0.0, 40.0, 80.0, 60.0)),
//! ];
//! let space = FocusSpace { nodes: &items };
//! let policy = DefaultPolicy { wrap: WrapMode::Never };
//!
//! assert_eq!(policy.next(Some("copy"), Navigation::Down, &space), Some("delete"));
//! assert_eq!(policy.next(Some("copy"), Navigation::Last, &space), Some("delete"));
//! assert_eq!(policy.next(Some("delete"), Navigation::Down, &space), None);
//! ```
//!
//! The types are generic over the element handle `K`, so hosts can use any
//! small, copyable id. A [`FocusSpace`] should use one coordinate space for
//! all of its entries so that directional movement compares positions
//! meaningfully.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support in `kurbo`.
//! - `libm`: `no_std` + `alloc` builds relying on `libm` for float math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;

use kurbo::Rect;

/// A keyboard navigation intent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Forward in reading order (Tab).
    Next,
    /// Backward in reading order (Shift+Tab).
    Prev,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Jump to the first candidate (Home).
    First,
    /// Jump to the last candidate (End).
    Last,
}

impl Navigation {
    /// The intent for a Tab keypress, honoring Shift.
    #[must_use]
    pub const fn tab(shift: bool) -> Self {
        if shift { Self::Prev } else { Self::Next }
    }
}

/// A single focusable candidate within a [`FocusSpace`].
#[derive(Clone, Debug)]
pub struct FocusEntry<K> {
    /// Element handle.
    pub id: K,
    /// Bounds in the coordinate space of the surrounding [`FocusSpace`].
    pub rect: Rect,
    /// Optional explicit ordering key, like a positive `tabindex`.
    ///
    /// Entries with an explicit order come before entries without one.
    pub order: Option<i32>,
    /// Disabled entries are skipped by every policy.
    pub enabled: bool,
}

impl<K> FocusEntry<K> {
    /// An enabled entry with no explicit order.
    pub const fn new(id: K, rect: Rect) -> Self {
        Self {
            id,
            rect,
            order: None,
            enabled: true,
        }
    }

    /// Set an explicit ordering key.
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Mark the entry as disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A read-only snapshot of focusable candidates.
///
/// Hosts build one from the interior of a widget (for a focus trap) or from a
/// composite widget's items (for roving focus) at the moment a key arrives.
#[derive(Clone, Debug)]
pub struct FocusSpace<'a, K> {
    /// Candidate entries. Order does not matter; policies sort as needed.
    pub nodes: &'a [FocusEntry<K>],
}

impl<K> FocusSpace<'_, K> {
    /// Whether at least one candidate can take focus.
    pub fn has_enabled(&self) -> bool {
        self.nodes.iter().any(|e| e.enabled)
    }
}

/// What happens at either end of the sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Stop at the ends; there is no next candidate past the last one.
    Never,
    /// Wrap around to the other end.
    Wrap,
}

/// Trait for focus traversal policies.
///
/// `origin` is the currently focused element, or `None` when nothing inside
/// the space has focus. Origins that are not part of the space are treated
/// the same as `None`.
pub trait FocusPolicy<K>
where
    K: Copy + Eq,
{
    /// Compute the next focus target.
    fn next(&self, origin: Option<K>, direction: Navigation, space: &FocusSpace<'_, K>)
    -> Option<K>;
}

/// Reading-order policy with directional arrows and Home/End.
#[derive(Copy, Clone, Debug)]
pub struct DefaultPolicy {
    /// Wrap behavior for `Next`/`Prev` and the linear arrow fallback.
    pub wrap: WrapMode,
}

impl Default for DefaultPolicy {
    fn default() -> Self {
        Self {
            wrap: WrapMode::Wrap,
        }
    }
}

impl<K> FocusPolicy<K> for DefaultPolicy
where
    K: Copy + Eq,
{
    fn next(
        &self,
        origin: Option<K>,
        direction: Navigation,
        space: &FocusSpace<'_, K>,
    ) -> Option<K> {
        match direction {
            Navigation::Next => next_linear(origin, space, self.wrap, Step::Forward),
            Navigation::Prev => next_linear(origin, space, self.wrap, Step::Backward),
            Navigation::First => sorted_enabled(space).first().map(|&i| space.nodes[i].id),
            Navigation::Last => sorted_enabled(space).last().map(|&i| space.nodes[i].id),
            Navigation::Up | Navigation::Down | Navigation::Left | Navigation::Right => origin
                .and_then(|o| next_directional(o, direction, space))
                .or_else(|| {
                    let step = match direction {
                        Navigation::Up | Navigation::Left => Step::Backward,
                        _ => Step::Forward,
                    };
                    next_linear(origin, space, self.wrap, step)
                }),
        }
    }
}

/// One Tab step inside a focus trap.
///
/// Always wraps. Returns `None` only when the space has no enabled
/// candidate, in which case the host should let the key through.
pub fn trap<K>(origin: Option<K>, shift: bool, space: &FocusSpace<'_, K>) -> Option<K>
where
    K: Copy + Eq,
{
    DefaultPolicy {
        wrap: WrapMode::Wrap,
    }
    .next(origin, Navigation::tab(shift), space)
}

#[derive(Copy, Clone)]
enum Step {
    Forward,
    Backward,
}

fn sorted_enabled<K>(space: &FocusSpace<'_, K>) -> Vec<usize> {
    let nodes = space.nodes;
    let mut indices: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.enabled.then_some(i))
        .collect();
    indices.sort_by(|&ia, &ib| compare_linear(&nodes[ia], &nodes[ib]));
    indices
}

fn next_linear<K>(
    origin: Option<K>,
    space: &FocusSpace<'_, K>,
    wrap: WrapMode,
    step: Step,
) -> Option<K>
where
    K: Copy + Eq,
{
    let nodes = space.nodes;
    let indices = sorted_enabled(space);
    let (&first, &last) = (indices.first()?, indices.last()?);

    let origin_pos = origin.and_then(|o| indices.iter().position(|&i| nodes[i].id == o));
    let wraps = matches!(wrap, WrapMode::Wrap);

    let idx = match (step, origin_pos) {
        (Step::Forward, None) => first,
        (Step::Backward, None) => last,
        (Step::Forward, Some(pos)) if pos + 1 < indices.len() => indices[pos + 1],
        (Step::Forward, Some(_)) if wraps => first,
        (Step::Backward, Some(pos)) if pos > 0 => indices[pos - 1],
        (Step::Backward, Some(_)) if wraps => last,
        _ => return None,
    };
    Some(nodes[idx].id)
}

fn compare_linear<K>(a: &FocusEntry<K>, b: &FocusEntry<K>) -> Ordering {
    match (a.order, b.order) {
        (Some(ao), Some(bo)) => ao
            .cmp(&bo)
            .then_with(|| compare_rect_reading(&a.rect, &b.rect)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_rect_reading(&a.rect, &b.rect),
    }
}

fn compare_rect_reading(a: &Rect, b: &Rect) -> Ordering {
    const RELATIVE_EPS: f64 = 1e-6;
    let (ay, by) = (a.y0, b.y0);
    if (ay - by).abs() > f64::max(ay.abs(), by.abs()) * RELATIVE_EPS {
        return ay.partial_cmp(&by).unwrap_or(Ordering::Equal);
    }
    a.x0.partial_cmp(&b.x0).unwrap_or(Ordering::Equal)
}

fn next_directional<K>(origin: K, direction: Navigation, space: &FocusSpace<'_, K>) -> Option<K>
where
    K: Copy + Eq,
{
    let nodes = space.nodes;
    let origin_entry = nodes.iter().find(|e| e.id == origin && e.enabled)?;
    let oc = origin_entry.rect.center();

    let mut best: Option<(f64, K)> = None;
    for candidate in nodes {
        if !candidate.enabled || candidate.id == origin {
            continue;
        }
        let cc = candidate.rect.center();
        let (dx, dy) = (cc.x - oc.x, cc.y - oc.y);

        let (primary, secondary, forward_sign) = match direction {
            Navigation::Right => (dx, dy, 1.0),
            Navigation::Left => (dx, dy, -1.0),
            Navigation::Down => (dy, dx, 1.0),
            Navigation::Up => (dy, dx, -1.0),
            _ => return None,
        };
        if forward_sign * primary <= 0.0 {
            continue;
        }

        // Off-axis distance counts four times as much as on-axis distance.
        let score = primary.abs() + 4.0 * secondary.abs();
        if score.is_finite() && best.is_none_or(|(s, _)| score < s) {
            best = Some((score, candidate.id));
        }
    }
    best.map(|(_, id)| id)
}
