// Copyright 2025 the Aural UI Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-widget options and engine configuration.

use crate::types::ExclusiveGroup;

bitflags::bitflags! {
    /// Dismissal and focus behavior of a widget.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Behavior: u8 {
        /// Escape closes the widget when it is on top of the open stack.
        const CLOSE_ON_ESCAPE        = 0b0000_0001;
        /// A pointer-down outside the boundary closes the widget.
        ///
        /// Clear it to keep a modal's backdrop from dismissing it.
        const CLOSE_ON_OUTSIDE_CLICK = 0b0000_0010;
        /// Focus goes back to the trigger when the widget closes.
        const RETURN_FOCUS           = 0b0000_0100;
        /// Tab and Shift+Tab stay inside the widget while it is open.
        const TRAP_FOCUS             = 0b0000_1000;
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Self::CLOSE_ON_ESCAPE | Self::CLOSE_ON_OUTSIDE_CLICK | Self::RETURN_FOCUS
    }
}

/// Options of one widget.
///
/// A controller keeps the options it was registered with, and snapshots the
/// effective options (registered or overridden) each time it opens.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct WidgetOptions {
    /// Dismissal and focus behavior.
    pub behavior: Behavior,
    /// Opening this widget closes every other open widget with the same tag.
    pub exclusive_group: Option<ExclusiveGroup>,
}

impl WidgetOptions {
    /// Modal dialog: traps focus, closes on Escape and backdrop click.
    pub fn modal() -> Self {
        Self {
            behavior: Behavior::default() | Behavior::TRAP_FOCUS,
            exclusive_group: None,
        }
    }

    /// Side drawer: same dismissal rules as a modal.
    pub fn drawer() -> Self {
        Self::modal()
    }

    /// Dropdown menu in the given exclusive group.
    pub fn dropdown(group: impl Into<ExclusiveGroup>) -> Self {
        Self::default().in_group(group)
    }

    /// Select listbox in the given exclusive group.
    pub fn select(group: impl Into<ExclusiveGroup>) -> Self {
        Self::default().in_group(group)
    }

    /// Context menu in the given exclusive group.
    ///
    /// Context menus are opened by a pointer gesture, not a focusable
    /// trigger, so focus is not returned on close.
    pub fn context_menu(group: impl Into<ExclusiveGroup>) -> Self {
        Self::default()
            .without(Behavior::RETURN_FOCUS)
            .in_group(group)
    }

    /// Non-modal popover.
    pub fn popover() -> Self {
        Self::default()
    }

    /// Tooltip: dismissed by Escape only, never takes focus.
    pub fn tooltip() -> Self {
        Self {
            behavior: Behavior::CLOSE_ON_ESCAPE,
            exclusive_group: None,
        }
    }

    /// Put the widget in an exclusive group.
    #[must_use]
    pub fn in_group(mut self, group: impl Into<ExclusiveGroup>) -> Self {
        self.exclusive_group = Some(group.into());
        self
    }

    /// Add behavior flags.
    #[must_use]
    pub fn with(mut self, flags: Behavior) -> Self {
        self.behavior |= flags;
        self
    }

    /// Remove behavior flags.
    #[must_use]
    pub fn without(mut self, flags: Behavior) -> Self {
        self.behavior &= !flags;
        self
    }

    /// Shorthand for `has(Behavior::…)` checks.
    pub fn has(&self, flags: Behavior) -> bool {
        self.behavior.contains(flags)
    }
}

/// Engine-wide configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// How long, in host milliseconds, a render may stay pending before a
    /// [`RenderTimeout`](crate::DisclosureError::RenderTimeout) is reported.
    /// A repeated open or close re-sends a stalled render only after that
    /// report.
    ///
    /// `None` disables the diagnostic, and a repeated open or close then
    /// re-sends a pending render right away.
    pub render_timeout: Option<u64>,
    /// Options used for widgets created without explicit options.
    pub default_options: WidgetOptions,
}

impl Default for EngineConfig {
    /// One second render timeout and [`WidgetOptions::default`].
    fn default() -> Self {
        Self {
            render_timeout: Some(1000),
            default_options: WidgetOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Set the render timeout.
    #[must_use]
    pub fn with_render_timeout(mut self, timeout: Option<u64>) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// Set the options used for widgets created without explicit options.
    #[must_use]
    pub fn with_default_options(mut self, options: WidgetOptions) -> Self {
        self.default_options = options;
        self
    }
}
