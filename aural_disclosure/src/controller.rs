// Copyright 2025 the Aural UI Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-widget state machine.
//!
//! ```text
//! Closed --open--> Opening --render complete--> Open
//! Open   --close-> Closing --render complete--> Closed
//! Opening --close--> Closing     (cancel)
//! Closing --open---> Opening     (reverse)
//! ```
//!
//! A controller only decides transitions and records them. The engine
//! carries out the side effects (render adapter calls, stack updates, and
//! notifications) based on the [`Begin`] it gets back.

use alloc::boxed::Box;
use smallvec::SmallVec;

use crate::deferred::Deferred;
use crate::options::WidgetOptions;
use crate::render::RenderTicket;
use crate::types::{Change, Reason, State, WidgetId};

pub(crate) type Callback = Box<dyn FnMut(&Change<'_>, &mut Deferred)>;

struct Subscriber {
    key: u64,
    callback: Callback,
}

/// An in-flight render request.
#[derive(Copy, Clone, Debug)]
struct Transition {
    ticket: RenderTicket,
    /// First engine tick seen after the request; `None` until then.
    started: Option<u64>,
    reason: Reason,
    timed_out: bool,
}

/// Outcome of an open or close request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Begin {
    /// Already there or already on the way; nothing to do.
    Ignore,
    /// Entered a transitional state; the engine issues the render request.
    Started,
    /// The previous render request timed out (or the caller asked for an
    /// eager retry); the engine re-issues it without a new notification.
    Retry,
}

pub(crate) struct Controller<K> {
    pub(crate) id: WidgetId,
    state: State,
    /// Element to hand focus back to. A back-reference only.
    pub(crate) trigger: Option<K>,
    registered: WidgetOptions,
    /// Set once options came from an explicit registration or open.
    pinned: bool,
    /// Snapshot taken when the widget last started opening.
    active: WidgetOptions,
    pub(crate) boundary: SmallVec<[K; 2]>,
    subscribers: SmallVec<[Subscriber; 2]>,
    transition: Option<Transition>,
}

impl<K: core::fmt::Debug> core::fmt::Debug for Controller<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("trigger", &self.trigger)
            .field("active", &self.active)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq> Controller<K> {
    pub(crate) fn new(id: WidgetId, options: WidgetOptions, pinned: bool) -> Self {
        Self {
            id,
            state: State::Closed,
            trigger: None,
            active: options.clone(),
            registered: options,
            pinned,
            boundary: SmallVec::new(),
            subscribers: SmallVec::new(),
            transition: None,
        }
    }

    pub(crate) fn state(&self) -> State {
        self.state
    }

    /// Options in effect for the current (or last) open.
    pub(crate) fn options(&self) -> &WidgetOptions {
        &self.active
    }

    pub(crate) fn registered(&self) -> &WidgetOptions {
        &self.registered
    }

    pub(crate) fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Replace unpinned options with explicit ones.
    pub(crate) fn pin(&mut self, options: WidgetOptions) {
        if !self.pinned {
            if !self.state.is_active() {
                self.active = options.clone();
            }
            self.registered = options;
            self.pinned = true;
        }
    }

    /// Handle an open request.
    ///
    /// With `eager`, a repeated request re-issues a pending render even if
    /// it has not timed out.
    pub(crate) fn begin_open(
        &mut self,
        trigger: Option<K>,
        options: Option<WidgetOptions>,
        ticket: RenderTicket,
        eager: bool,
        reason: Reason,
    ) -> Begin {
        match self.state {
            State::Open => Begin::Ignore,
            State::Opening => self.retry(ticket, eager),
            State::Closed | State::Closing => {
                self.active = options.unwrap_or_else(|| self.registered.clone());
                self.trigger = trigger;
                self.enter(State::Opening, ticket, reason);
                Begin::Started
            }
        }
    }

    /// Handle a close request. Closing while `Opening` cancels the open.
    pub(crate) fn begin_close(&mut self, ticket: RenderTicket, eager: bool, reason: Reason) -> Begin {
        match self.state {
            State::Closed => Begin::Ignore,
            State::Closing => self.retry(ticket, eager),
            State::Open | State::Opening => {
                self.enter(State::Closing, ticket, reason);
                Begin::Started
            }
        }
    }

    /// Finalize the in-flight transition if `ticket` belongs to it.
    ///
    /// Returns the settled state and the reason that started the transition.
    pub(crate) fn finish(&mut self, ticket: RenderTicket) -> Option<(State, Reason)> {
        let transition = self.transition.filter(|t| t.ticket == ticket)?;
        self.state = match self.state {
            State::Opening => State::Open,
            State::Closing => State::Closed,
            settled => settled,
        };
        self.transition = None;
        Some((self.state, transition.reason))
    }

    /// The ticket of the in-flight render request, if any.
    pub(crate) fn pending_ticket(&self) -> Option<RenderTicket> {
        self.transition.map(|t| t.ticket)
    }

    /// Report a timeout once per transition: returns the elapsed time the
    /// first time `timeout` is exceeded.
    ///
    /// The first check after a request only stamps its start, so time the
    /// host spent idle before the request is never counted.
    pub(crate) fn check_timeout(&mut self, now: u64, timeout: u64) -> Option<u64> {
        let transition = self.transition.as_mut()?;
        let Some(started) = transition.started else {
            transition.started = Some(now);
            return None;
        };
        let elapsed = now.saturating_sub(started);
        if transition.timed_out || elapsed < timeout {
            return None;
        }
        transition.timed_out = true;
        Some(elapsed)
    }

    pub(crate) fn subscribe(&mut self, key: u64, callback: Callback) {
        self.subscribers.push(Subscriber { key, callback });
    }

    pub(crate) fn unsubscribe(&mut self, key: u64) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.key != key);
        self.subscribers.len() != before
    }

    /// Tell every subscriber about the current state.
    pub(crate) fn notify(&mut self, reason: Reason, deferred: &mut Deferred) {
        let change = Change {
            id: &self.id,
            state: self.state,
            reason,
        };
        for s in &mut self.subscribers {
            (s.callback)(&change, deferred);
        }
    }

    fn enter(&mut self, state: State, ticket: RenderTicket, reason: Reason) {
        tracing::trace!(id = %self.id, from = %self.state, to = %state, %reason, "transition");
        self.state = state;
        self.transition = Some(Transition {
            ticket,
            started: None,
            reason,
            timed_out: false,
        });
    }

    fn retry(&mut self, ticket: RenderTicket, eager: bool) -> Begin {
        match &mut self.transition {
            Some(t) if t.timed_out || eager => {
                t.ticket = ticket;
                t.started = None;
                t.timed_out = false;
                Begin::Retry
            }
            _ => Begin::Ignore,
        }
    }
}
