// Copyright 2025 the Aural UI Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: widget ids, states, close reasons, change notices, and element lookups.

use alloc::sync::Arc;
use core::borrow::Borrow;
use core::fmt;
use core::ops::Deref;

/// Caller-supplied id of one disclosure widget instance.
///
/// Ids are opaque strings and must be unique within one [`Disclosure`](crate::Disclosure).
/// Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(Arc<str>);

impl WidgetId {
    /// Create an id from any string.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for WidgetId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for WidgetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WidgetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<&WidgetId> for WidgetId {
    fn from(id: &WidgetId) -> Self {
        id.clone()
    }
}

impl From<alloc::string::String> for WidgetId {
    fn from(id: alloc::string::String) -> Self {
        Self(Arc::from(id))
    }
}

/// Tag shared by widgets of which at most one may be open at a time.
///
/// Dropdowns, selects, and context menus typically share one group so that
/// opening any of them closes the others.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExclusiveGroup(Arc<str>);

impl ExclusiveGroup {
    /// Create a group tag.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(Arc::from(tag.as_ref()))
    }

    /// The tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ExclusiveGroup {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Lifecycle state of one controller.
///
/// `Opening` and `Closing` bridge to the render adapter: they last until the
/// adapter reports that mounting or unmounting finished.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum State {
    /// Hidden. The initial state.
    #[default]
    Closed,
    /// Open requested; waiting for the render adapter.
    Opening,
    /// Shown and receiving routed input.
    Open,
    /// Close requested; waiting for the render adapter.
    Closing,
}

impl State {
    /// `Opening` or `Closing`.
    pub const fn is_transitional(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }

    /// `Opening` or `Open`: the widget is, or is about to be, visible.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Opening | Self::Open)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Closing => "closing",
        })
    }
}

/// Why a transition happened.
///
/// Subscribers use this to tell "the user dismissed it" apart from "the app
/// closed it".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reason {
    /// The Escape key.
    Escape,
    /// A pointer-down outside the widget's boundary.
    OutsideClick,
    /// Closed because a sibling in the same exclusive group opened.
    Explicit,
    /// Requested through the API.
    Programmatic,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Escape => "escape",
            Self::OutsideClick => "outside-click",
            Self::Explicit => "explicit",
            Self::Programmatic => "programmatic",
        })
    }
}

/// A state change delivered to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change<'a> {
    /// The widget that changed.
    pub id: &'a WidgetId,
    /// The state it entered.
    pub state: State,
    /// What caused the transition.
    pub reason: Reason,
}

/// Parent relationships between host elements.
///
/// Used to decide whether a pointer target lies inside a widget: the target
/// is inside when it, or one of its ancestors, is a boundary element.
pub trait ParentLookup<K> {
    /// Return the parent of `node`, or `None` at a root.
    fn parent_of(&self, node: &K) -> Option<K>;
}

/// A lookup with no parents: containment degrades to exact matches.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoParent;

impl<K> ParentLookup<K> for NoParent {
    fn parent_of(&self, _: &K) -> Option<K> {
        None
    }
}

impl<K, F> ParentLookup<K> for F
where
    F: Fn(&K) -> Option<K>,
{
    fn parent_of(&self, node: &K) -> Option<K> {
        self(node)
    }
}

/// Whether `target` is one of `roots` or has one of them as an ancestor.
pub(crate) fn is_within<K: Copy + Eq>(
    target: K,
    roots: &[K],
    parents: &impl ParentLookup<K>,
) -> bool {
    let mut cur = Some(target);
    // Caller ensures acyclic ancestry.
    while let Some(node) = cur {
        if roots.contains(&node) {
            return true;
        }
        cur = parents.parent_of(&node);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_id_borrows_as_str() {
        let mut map = hashbrown::HashMap::new();
        map.insert(WidgetId::from("modal-1"), 1);
        assert_eq!(map.get("modal-1"), Some(&1));
        assert_eq!(WidgetId::from("modal-1").as_str(), "modal-1");
    }

    #[test]
    fn containment_walks_ancestors() {
        // 4 -> 3 -> 2 -> 1
        let parents = |n: &u32| (*n > 1).then(|| n - 1);
        assert!(is_within(4_u32, &[2], &parents));
        assert!(is_within(2_u32, &[2], &parents));
        assert!(!is_within(1_u32, &[2], &parents));
        assert!(!is_within(4_u32, &[], &parents));
    }

    #[test]
    fn no_parent_is_exact_match_only() {
        assert!(is_within(7_u32, &[7], &NoParent));
        assert!(!is_within(8_u32, &[7], &NoParent));
    }
}
