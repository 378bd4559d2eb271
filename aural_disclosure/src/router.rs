// Copyright 2025 the Aural UI Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input routing.
//!
//! ## Overview
//!
//! Keeps the stack of active widgets and decides which of them an input
//! applies to. Like a responder router it only computes targets; the
//! engine carries out the resulting transitions.
//!
//! ## Stack discipline
//!
//! - A widget joins the top of the stack when it starts opening, and a
//!   re-opened widget moves back to the top.
//! - It leaves the stack when it starts closing or is destroyed.
//! - Escape goes to the top entry only and never falls through to the
//!   widgets below it, even when the top one ignores Escape.
//! - An outside pointer-down is checked against every `Open` entry,
//!   bottom to top. Each widget decides on its own, so one click can close several.
//! - Tab trapping belongs to the topmost active widget with
//!   [`Behavior::TRAP_FOCUS`].
//!
//! Arrow keys, Home, and End are not routed here. Composite widgets move
//! their own roving focus, for example with [`aural_focus::DefaultPolicy`].

use alloc::vec::Vec;

use crate::options::Behavior;
use crate::registry::Registry;
use crate::types::{ParentLookup, State, WidgetId, is_within};

/// Active widgets in open-request order (top last).
#[derive(Clone, Debug, Default)]
pub(crate) struct InputRouter {
    stack: Vec<WidgetId>,
}

impl InputRouter {
    /// Put `id` on top of the stack.
    pub(crate) fn raise(&mut self, id: &WidgetId) {
        self.remove(id);
        self.stack.push(id.clone());
    }

    pub(crate) fn remove(&mut self, id: &str) {
        self.stack.retain(|entry| entry.as_str() != id);
    }

    pub(crate) fn stack(&self) -> &[WidgetId] {
        &self.stack
    }

    /// The widget Escape should close, if any.
    pub(crate) fn escape_target<K: Copy + Eq>(&self, registry: &Registry<K>) -> Option<WidgetId> {
        let top = self.stack.last()?;
        let ctl = registry.get(top)?;
        (ctl.state().is_active() && ctl.options().has(Behavior::CLOSE_ON_ESCAPE))
            .then(|| top.clone())
    }

    /// Widgets a pointer-down on `target` dismisses, bottom to top.
    ///
    /// A widget stays open when `target` is inside its boundary or its
    /// trigger, as resolved through `parents`.
    pub(crate) fn outside_targets<K: Copy + Eq>(
        &self,
        registry: &Registry<K>,
        target: K,
        parents: &impl ParentLookup<K>,
    ) -> Vec<WidgetId> {
        self.stack
            .iter()
            .filter(|id| {
                registry.get(id).is_some_and(|ctl| {
                    ctl.state() == State::Open
                        && ctl.options().has(Behavior::CLOSE_ON_OUTSIDE_CLICK)
                        && !is_within(target, &ctl.boundary, parents)
                        && !ctl.trigger.is_some_and(|t| is_within(target, &[t], parents))
                })
            })
            .cloned()
            .collect()
    }

    /// Active widgets sharing `id`'s exclusive group, most recent first.
    pub(crate) fn group_siblings<K: Copy + Eq>(
        &self,
        registry: &Registry<K>,
        id: &WidgetId,
    ) -> Vec<WidgetId> {
        let Some(group) = registry.get(id).and_then(|c| c.options().exclusive_group.as_ref())
        else {
            return Vec::new();
        };
        self.stack
            .iter()
            .rev()
            .filter(|other| *other != id)
            .filter(|other| {
                registry.get(other).is_some_and(|ctl| {
                    ctl.state().is_active() && ctl.options().exclusive_group.as_ref() == Some(group)
                })
            })
            .cloned()
            .collect()
    }

    /// The widget currently confining Tab, if any.
    pub(crate) fn trap_owner<'a, K: Copy + Eq>(
        &'a self,
        registry: &Registry<K>,
    ) -> Option<&'a WidgetId> {
        self.stack.iter().rev().find(|id| {
            registry.get(id).is_some_and(|ctl| {
                ctl.state().is_active() && ctl.options().has(Behavior::TRAP_FOCUS)
            })
        })
    }
}
