// Copyright 2025 the Aural UI Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between the state machine and whatever actually draws widgets.
//!
//! The engine never touches the DOM (or any other scene). On every
//! `Opening`/`Closing` transition it asks a [`RenderAdapter`] to mount or
//! unmount the widget and waits for completion before finalizing the state.
//!
//! Completion is either immediate ([`RenderSignal::Complete`]) or reported
//! later through [`Disclosure::render_complete`](crate::Disclosure::render_complete)
//! with the [`RenderTicket`] handed to the adapter. Every transition gets a
//! fresh ticket, so completions that arrive after a transition was cancelled
//! are recognized as stale and ignored.

use crate::types::WidgetId;

/// Identifies one mount or unmount request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderTicket(pub(crate) u64);

impl RenderTicket {
    /// The raw ticket number, for hosts that need to store it outside Rust.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Rebuild a ticket from [`RenderTicket::get`].
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Whether a render request has already finished.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderSignal {
    /// Finished synchronously; the engine finalizes the transition at once.
    Complete,
    /// Finishes later (for example at the end of a CSS animation); the host
    /// calls `render_complete` with the ticket.
    Pending,
}

/// Mounts, unmounts, and positions widgets on behalf of the engine.
///
/// `K` is the host's element handle, used for focus return.
pub trait RenderAdapter<K> {
    /// Show the widget.
    fn mount(&mut self, id: &WidgetId, ticket: RenderTicket) -> RenderSignal;

    /// Hide the widget.
    fn unmount(&mut self, id: &WidgetId, ticket: RenderTicket) -> RenderSignal;

    /// Recompute on-screen placement of an open widget.
    fn reposition(&mut self, id: &WidgetId) {
        let _ = id;
    }

    /// Move keyboard focus back to the element that opened the widget.
    fn return_focus(&mut self, id: &WidgetId, trigger: K) {
        let _ = (id, trigger);
    }
}

/// An adapter that completes every request synchronously and draws nothing.
///
/// Useful for headless hosts and tests, and as the default adapter.
#[derive(Copy, Clone, Debug, Default)]
pub struct ImmediateRender;

impl<K> RenderAdapter<K> for ImmediateRender {
    fn mount(&mut self, _: &WidgetId, _: RenderTicket) -> RenderSignal {
        RenderSignal::Complete
    }

    fn unmount(&mut self, _: &WidgetId, _: RenderTicket) -> RenderSignal {
        RenderSignal::Complete
    }
}
