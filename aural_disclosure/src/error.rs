// Copyright 2025 the Aural UI Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics reported by the engine.
//!
//! None of these cross the public API as a `Result`: the engine keeps
//! working and reports them to `tracing` and to the hook installed with
//! [`Disclosure::set_diagnostics`](crate::Disclosure::set_diagnostics).

use crate::types::{State, WidgetId};

/// A non-fatal condition detected by the engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DisclosureError {
    /// A request named a widget that was never registered or opened.
    ///
    /// Requests like this are no-ops; this variant is only logged.
    #[error("widget `{id}` is not registered")]
    UnknownWidget {
        /// The requested id.
        id: WidgetId,
    },
    /// The render adapter did not finish a transition in time.
    ///
    /// The controller stays in its transitional state until the adapter
    /// completes or the caller retries `open`/`close`.
    #[error("widget `{id}` stuck {state} for {elapsed}ms waiting for the render adapter")]
    RenderTimeout {
        /// The stuck widget.
        id: WidgetId,
        /// `Opening` or `Closing`.
        state: State,
        /// Host milliseconds since the transition started.
        elapsed: u64,
    },
    /// A second registration under an existing id carried different options.
    ///
    /// The first registration wins.
    #[error("widget `{id}` registered twice with different options; keeping the first")]
    DuplicateId {
        /// The contested id.
        id: WidgetId,
    },
}

impl DisclosureError {
    /// The widget the diagnostic is about.
    pub fn id(&self) -> &WidgetId {
        match self {
            Self::UnknownWidget { id }
            | Self::RenderTimeout { id, .. }
            | Self::DuplicateId { id } => id,
        }
    }
}
