// Copyright 2025 the Aural UI Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Roving focus inside an open menu with `aural_focus`.
//!
//! The disclosure engine opens and closes the menu; arrow keys plus Home and
//! End move focus between its items without involving the engine at all.
//!
//! Run:
//! - `cargo run -p aural_demos --example roving_menu`

use aural_disclosure::{Disclosure, WidgetOptions};
use aural_focus::{DefaultPolicy, FocusEntry, FocusPolicy, FocusSpace, Navigation, WrapMode};
use kurbo::Rect;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut ui: Disclosure<&'static str> = Disclosure::new();
    ui.register("edit-menu", WidgetOptions::dropdown("menubar"));
    ui.open_with("edit-menu", Some("edit-button"), None);

    let items = [
        FocusEntry::new("undo", Rect::new(0.0, 0.0, 120.0, 24.0)),
        FocusEntry::new("redo", Rect::new(0.0, 24.0, 120.0, 48.0)).disabled(),
        FocusEntry::new("cut", Rect::new(0.0, 48.0, 120.0, 72.0)),
        FocusEntry::new("copy", Rect::new(0.0, 72.0, 120.0, 96.0)),
    ];
    let space = FocusSpace { nodes: &items };
    let policy = DefaultPolicy {
        wrap: WrapMode::Wrap,
    };

    let mut focused = policy.next(None, Navigation::First, &space);
    println!("menu opened, focus on {focused:?}");
    for key in [
        Navigation::Down,
        Navigation::Down,
        Navigation::Down,
        Navigation::Up,
        Navigation::Last,
        Navigation::First,
    ] {
        focused = policy.next(focused, key, &space).or(focused);
        println!("{key:?} -> {focused:?}");
    }

    ui.handle_escape();
    println!("edit menu open: {}", ui.is_widget_open("edit-menu"));
}
