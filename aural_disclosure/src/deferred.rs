// Copyright 2025 the Aural UI Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Requests made from inside subscriber callbacks.
//!
//! A subscriber runs while the engine is in the middle of an operation, so
//! it cannot reach the engine directly. It gets a [`Deferred`] instead. Requests
//! pushed there run in FIFO order once the current operation (including any
//! exclusive-group or outside-click broadcast) has finished.
//!
//! ```
//! use aural_disclosure::{Disclosure, State, WidgetOptions};
//!
//! let mut ui: Disclosure<u32> = Disclosure::new();
//! ui.register("panel", WidgetOptions::popover());
//! // Closing the modal also closes its companion panel.
//! ui.on_widget_change("modal", |change, deferred| {
//!     if change.state == State::Closed {
//!         deferred.close("panel");
//!     }
//! });
//! ui.open_widget("modal");
//! ui.open_widget("panel");
//! ui.close_widget("modal");
//! assert!(!ui.is_widget_open("panel"));
//! ```

use alloc::collections::VecDeque;

use crate::types::{Reason, WidgetId};

/// A queued request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Open(WidgetId),
    Close(WidgetId, Reason),
    Toggle(WidgetId),
}

/// Queue of requests made by subscribers.
#[derive(Debug, Default)]
pub struct Deferred {
    queue: VecDeque<Command>,
}

impl Deferred {
    /// Open a widget after the current operation.
    pub fn open(&mut self, id: impl Into<WidgetId>) {
        self.queue.push_back(Command::Open(id.into()));
    }

    /// Close a widget after the current operation.
    pub fn close(&mut self, id: impl Into<WidgetId>) {
        self.close_with(id, Reason::Programmatic);
    }

    /// Close a widget with a specific reason after the current operation.
    pub fn close_with(&mut self, id: impl Into<WidgetId>, reason: Reason) {
        self.queue.push_back(Command::Close(id.into(), reason));
    }

    /// Toggle a widget after the current operation.
    pub fn toggle(&mut self, id: impl Into<WidgetId>) {
        self.queue.push_back(Command::Toggle(id.into()));
    }

    /// Number of queued requests.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn pop(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }
}
