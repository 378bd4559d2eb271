// Copyright 2025 the Aural UI Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Aural Disclosure: a headless controller engine for disclosure widgets.
//!
//! ## Overview
//!
//! Modals, drawers, dropdowns, selects, context menus, popovers, and
//! tooltips all share one lifecycle: something opens them, they animate in,
//! they stay open until Escape, a click outside, or an explicit close, and
//! then they animate out and hand focus back. This crate owns that
//! lifecycle so that component bindings (React hooks, Vue composables, Web
//! Components, or anything else) only translate it.
//!
//! The engine is built from four parts:
//!
//! - A **registry** mapping [`WidgetId`]s to per-widget controllers.
//!   Controllers are created on first use and live until
//!   [`Disclosure::destroy`].
//! - A **state machine** per widget:
//!   `Closed → Opening → Open → Closing → Closed`, where the transitional
//!   states wait for a [`RenderAdapter`] to finish mounting or unmounting.
//! - An **input router** that keeps a stack of active widgets and routes
//!   Escape, outside pointer-downs, and Tab (focus traps) to the right one.
//! - The **consumer API** on [`Disclosure`]: open, close, toggle, query, and
//!   subscribe by id.
//!
//! ## Behavior
//!
//! Each widget carries [`WidgetOptions`]: a set of [`Behavior`] flags plus an
//! optional [`ExclusiveGroup`]. Opening a widget closes the active members
//! of its group first, most recent first, with [`Reason::Explicit`].
//! Presets such as [`WidgetOptions::modal`] and
//! [`WidgetOptions::dropdown`] cover the usual patterns.
//!
//! ## Re-entrancy
//!
//! Subscribers cannot call back into the engine while it is notifying them.
//! They receive a [`Deferred`] queue instead; requests pushed there run in
//! order once the current operation finishes.
//!
//! ## Diagnostics
//!
//! Nothing here fails loudly. Unknown ids are no-ops, stuck renders and
//! conflicting registrations are reported as [`DisclosureError`]s through
//! `tracing` and an optional hook, and the engine keeps going.
//!
//! ## Example
//!
//! ```rust
//! use aural_disclosure::{Disclosure, Reason, State, WidgetOptions};
//!
//! let mut ui: Disclosure<u32> = Disclosure::new();
//! ui.register("file", WidgetOptions::dropdown("menubar"));
//! ui.register("edit", WidgetOptions::dropdown("menubar"));
//! ui.register("settings", WidgetOptions::modal());
//!
//! ui.on_widget_change("file", |change, _| {
//!     if change.state == State::Closed {
//!         assert_eq!(change.reason, Reason::Explicit);
//!     }
//! });
//!
//! ui.open_widget("settings");
//! ui.open_widget("file");
//! // Opening "edit" closes its sibling in the menu bar.
//! assert_eq!(ui.open_widget("edit"), State::Open);
//! assert!(!ui.is_widget_open("file"));
//!
//! // Escape only reaches the top of the stack.
//! ui.handle_escape();
//! assert!(!ui.is_widget_open("edit"));
//! assert!(ui.is_widget_open("settings"));
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support in dependencies.
//! - `libm`: `no_std` + `alloc` builds relying on `libm` for float math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod controller;
mod deferred;
mod engine;
mod error;
mod options;
mod registry;
mod render;
mod router;
mod types;

pub use aural_focus;
pub use deferred::Deferred;
pub use engine::{Disclosure, Subscription, TabRoute};
pub use error::DisclosureError;
pub use options::{Behavior, EngineConfig, WidgetOptions};
pub use render::{ImmediateRender, RenderAdapter, RenderSignal, RenderTicket};
pub use types::{Change, ExclusiveGroup, NoParent, ParentLookup, Reason, State, WidgetId};
