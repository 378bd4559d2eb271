// Copyright 2025 the Aural UI Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A settings modal hosting a dropdown, driven by a fake animated renderer.
//!
//! This example shows how a host wires the engine up:
//! - a [`RenderAdapter`] whose mounts finish a few frames later,
//! - a parent map so clicks inside nested elements count as inside,
//! - Escape, outside clicks, and Tab forwarded from the event loop,
//! - `tick` from the frame loop so stuck animations get reported.
//!
//! Run:
//! - `RUST_LOG=aural_disclosure=trace cargo run -p aural_demos --example modal_stack`

use std::collections::HashMap;

use aural_disclosure::aural_focus::{FocusEntry, FocusSpace};
use aural_disclosure::{
    Disclosure, EngineConfig, RenderAdapter, RenderSignal, RenderTicket, State, TabRoute,
    WidgetId, WidgetOptions,
};
use kurbo::Rect;

/// Element handles in the fake scene.
type Node = u32;

const BODY: Node = 1;
const OPEN_SETTINGS: Node = 2;
const SETTINGS: Node = 10;
const THEME_BUTTON: Node = 11;
const SAVE_BUTTON: Node = 12;
const THEME_MENU: Node = 20;
const DARK_ITEM: Node = 21;

/// Pretends every mount and unmount is a 3-frame CSS transition.
#[derive(Default)]
struct Animations {
    running: Vec<(WidgetId, RenderTicket, u32)>,
}

impl Animations {
    /// Advance one frame and return the transitions that just ended.
    fn frame(&mut self) -> Vec<(WidgetId, RenderTicket)> {
        let mut done = Vec::new();
        self.running.retain_mut(|(id, ticket, left)| {
            *left -= 1;
            if *left == 0 {
                done.push((id.clone(), *ticket));
            }
            *left > 0
        });
        done
    }
}

impl RenderAdapter<Node> for Animations {
    fn mount(&mut self, id: &WidgetId, ticket: RenderTicket) -> RenderSignal {
        tracing::info!(%id, "mount animation started");
        self.running.push((id.clone(), ticket, 3));
        RenderSignal::Pending
    }

    fn unmount(&mut self, id: &WidgetId, ticket: RenderTicket) -> RenderSignal {
        tracing::info!(%id, "unmount animation started");
        self.running.push((id.clone(), ticket, 3));
        RenderSignal::Pending
    }

    fn return_focus(&mut self, id: &WidgetId, trigger: Node) {
        tracing::info!(%id, trigger, "focus returned");
    }
}

type Ui = Disclosure<Node, Animations, Box<dyn Fn(&Node) -> Option<Node>>>;

fn run_frames(ui: &mut Ui, clock: &mut u64, frames: u32) {
    for _ in 0..frames {
        *clock += 16;
        ui.tick(*clock);
        for (id, ticket) in ui.adapter_mut().frame() {
            ui.render_complete(&id, ticket);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let parents: HashMap<Node, Node> = [
        (OPEN_SETTINGS, BODY),
        (SETTINGS, BODY),
        (THEME_BUTTON, SETTINGS),
        (SAVE_BUTTON, SETTINGS),
        (THEME_MENU, BODY),
        (DARK_ITEM, THEME_MENU),
    ]
    .into_iter()
    .collect();
    let lookup: Box<dyn Fn(&Node) -> Option<Node>> = Box::new(move |n| parents.get(n).copied());

    let config = EngineConfig::default().with_render_timeout(Some(500));
    let mut ui: Ui = Disclosure::with_parts(config, Animations::default(), lookup);
    ui.set_diagnostics(|err| println!("diagnostic: {err}"));

    ui.register("settings", WidgetOptions::modal());
    ui.register("theme", WidgetOptions::dropdown("settings-menus"));
    ui.set_boundary("settings", [SETTINGS]);
    ui.set_boundary("theme", [THEME_MENU]);
    // The theme menu is portaled to the body but belongs to the modal.
    ui.add_boundary("settings", THEME_MENU);

    ui.on_widget_change("settings", |change, deferred| {
        println!("settings -> {} ({})", change.state, change.reason);
        if change.state == State::Closing {
            deferred.close("theme");
        }
    });
    ui.on_widget_change("theme", |change, _| {
        println!("theme -> {} ({})", change.state, change.reason);
    });

    let mut clock = 0;

    ui.open_with("settings", Some(OPEN_SETTINGS), None);
    run_frames(&mut ui, &mut clock, 3);
    ui.open_with("theme", Some(THEME_BUTTON), None);
    run_frames(&mut ui, &mut clock, 3);
    println!("stack: {:?}", ui.open_stack());

    // Tab cycles inside the modal.
    let focusables = [
        FocusEntry::new(THEME_BUTTON, Rect::new(10.0, 10.0, 90.0, 30.0)),
        FocusEntry::new(SAVE_BUTTON, Rect::new(10.0, 50.0, 90.0, 70.0)),
    ];
    let space = FocusSpace { nodes: &focusables };
    if let TabRoute::Focus(next) = ui.handle_tab(Some(SAVE_BUTTON), false, &space) {
        println!("tab from save lands on {next}");
    }

    // Picking an item inside the menu closes nothing.
    println!("click dark item: {:?}", ui.handle_pointer_down(DARK_ITEM));
    // Clicking the modal's own body closes only the menu.
    println!("click modal: {:?}", ui.handle_pointer_down(SAVE_BUTTON));
    run_frames(&mut ui, &mut clock, 3);

    ui.open_with("theme", Some(THEME_BUTTON), None);
    run_frames(&mut ui, &mut clock, 3);
    // Escape peels the menu first, then the modal.
    println!("escape: {:?}", ui.handle_escape());
    println!("escape: {:?}", ui.handle_escape());
    run_frames(&mut ui, &mut clock, 3);

    // An animation that never finishes.
    ui.open_widget("settings");
    ui.adapter_mut().running.clear();
    run_frames(&mut ui, &mut clock, 40);
    println!("settings is {:?}", ui.state("settings"));
}
