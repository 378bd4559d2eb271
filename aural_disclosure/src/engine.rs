// Copyright 2025 the Aural UI Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: the only surface bindings talk to.

use alloc::boxed::Box;
use alloc::vec::Vec;

use aural_focus::FocusSpace;

use crate::controller::{Begin, Controller};
use crate::deferred::{Command, Deferred};
use crate::error::DisclosureError;
use crate::options::{Behavior, EngineConfig, WidgetOptions};
use crate::registry::{Registry, Resolved};
use crate::render::{ImmediateRender, RenderAdapter, RenderSignal, RenderTicket};
use crate::router::InputRouter;
use crate::types::{Change, NoParent, ParentLookup, Reason, State, WidgetId};

type DiagnosticsHook = Box<dyn FnMut(&DisclosureError)>;

/// Handle returned by [`Disclosure::on_widget_change`].
///
/// Dropping it does not unsubscribe; pass it to [`Disclosure::unsubscribe`]
/// when the consumer tears down.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: WidgetId,
    key: u64,
}

impl Subscription {
    /// The widget this subscription watches.
    pub fn widget(&self) -> &WidgetId {
        &self.id
    }
}

/// What the host should do with a Tab keypress.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TabRoute<K> {
    /// Prevent the default action and focus this element.
    Focus(K),
    /// Let the platform handle the key.
    Default,
}

/// Disclosure engine for one document.
///
/// ## Usage
///
/// - Construct with [`Disclosure::new`] for a headless engine, or with
///   [`Disclosure::with_parts`] to plug in a [`RenderAdapter`] and a
///   [`ParentLookup`] over host elements.
/// - Bindings drive widgets through [`open_widget`](Self::open_widget),
///   [`close_widget`](Self::close_widget), [`toggle_widget`](Self::toggle_widget),
///   [`is_widget_open`](Self::is_widget_open), and
///   [`on_widget_change`](Self::on_widget_change).
/// - The host forwards raw input: [`handle_escape`](Self::handle_escape),
///   [`handle_pointer_down`](Self::handle_pointer_down), and
///   [`handle_tab`](Self::handle_tab), plus [`tick`](Self::tick) from its
///   frame loop and [`render_complete`](Self::render_complete) when an
///   animation ends.
///
/// Everything runs synchronously on the caller's thread. Nothing here
/// returns an error or panics on a bad id; see [`DisclosureError`] for what
/// gets reported instead.
///
/// `K` is the host's element handle (for triggers, boundaries, and focus).
pub struct Disclosure<K, R = ImmediateRender, P = NoParent> {
    config: EngineConfig,
    registry: Registry<K>,
    router: InputRouter,
    adapter: R,
    parents: P,
    deferred: Deferred,
    diagnostics: Option<DiagnosticsHook>,
    now: u64,
    next_ticket: u64,
    next_subscription: u64,
}

impl<K, R, P> core::fmt::Debug for Disclosure<K, R, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Disclosure")
            .field("config", &self.config)
            .field("open_stack", &self.router)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq> Disclosure<K> {
    /// A headless engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// A headless engine with an explicit configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_parts(config, ImmediateRender, NoParent)
    }
}

impl<K: Copy + Eq> Default for Disclosure<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, R, P> Disclosure<K, R, P>
where
    K: Copy + Eq,
    R: RenderAdapter<K>,
    P: ParentLookup<K>,
{
    /// Create an engine with a render adapter and a parent lookup.
    pub fn with_parts(config: EngineConfig, adapter: R, parents: P) -> Self {
        Self {
            config,
            registry: Registry::default(),
            router: InputRouter::default(),
            adapter,
            parents,
            deferred: Deferred::default(),
            diagnostics: None,
            now: 0,
            next_ticket: 0,
            next_subscription: 0,
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The render adapter.
    pub fn adapter(&self) -> &R {
        &self.adapter
    }

    /// The render adapter, mutably.
    pub fn adapter_mut(&mut self) -> &mut R {
        &mut self.adapter
    }

    /// Install a hook that receives every reported [`DisclosureError`].
    pub fn set_diagnostics(&mut self, hook: impl FnMut(&DisclosureError) + 'static) {
        self.diagnostics = Some(Box::new(hook));
    }

    // Consumer-facing API.

    /// Open a widget, creating it with default options if needed.
    ///
    /// Returns the state once the request (and anything subscribers queued
    /// in response) has been processed: `Open` with a synchronous adapter,
    /// `Opening` while a render is pending.
    pub fn open_widget(&mut self, id: impl Into<WidgetId>) -> State {
        self.open_with(id, None, None)
    }

    /// Close a widget. Unknown ids are ignored and yield `None`.
    pub fn close_widget(&mut self, id: &str) -> Option<State> {
        self.close_with(id, Reason::Programmatic)
    }

    /// Open a closed widget, close anything else. Unknown ids are ignored.
    pub fn toggle_widget(&mut self, id: &str) -> Option<State> {
        self.toggle_with(id, None)
    }

    /// Toggle a widget from a trigger element.
    ///
    /// When opening, `trigger` is recorded as in [`open_with`](Self::open_with).
    /// Without one, the trigger recorded by an earlier open is kept, so a
    /// toggle button stays inside the widget for outside-click purposes.
    pub fn toggle_with(&mut self, id: &str, trigger: Option<K>) -> Option<State> {
        let state = self.do_toggle(id, trigger);
        self.drain();
        state.and_then(|_| self.state(id))
    }

    /// Whether the widget is fully `Open`.
    pub fn is_widget_open(&self, id: &str) -> bool {
        self.state(id) == Some(State::Open)
    }

    /// Subscribe to state changes of a widget.
    ///
    /// The callback receives every state the widget enters, with the reason.
    /// Requests made through the [`Deferred`] argument run after the current
    /// operation. Subscribing to an unknown id registers it with default
    /// options, which a later [`register`](Self::register) may still replace.
    pub fn on_widget_change(
        &mut self,
        id: impl Into<WidgetId>,
        callback: impl FnMut(&Change<'_>, &mut Deferred) + 'static,
    ) -> Subscription {
        let id = id.into();
        self.next_subscription += 1;
        let key = self.next_subscription;
        let (ctl, _) = self
            .registry
            .get_or_create(&id, &self.config.default_options, false);
        ctl.subscribe(key, Box::new(callback));
        Subscription { id, key }
    }

    /// Remove a subscription. Returns whether it was still registered.
    pub fn unsubscribe(&mut self, subscription: &Subscription) -> bool {
        self.registry
            .get_mut(&subscription.id)
            .is_some_and(|ctl| ctl.unsubscribe(subscription.key))
    }

    // Lifecycle.

    /// Register a widget with explicit options without opening it.
    ///
    /// Returns `true` when the widget was created. Registering an existing id
    /// with different options keeps the first options and reports
    /// [`DisclosureError::DuplicateId`].
    pub fn register(&mut self, id: impl Into<WidgetId>, options: WidgetOptions) -> bool {
        let id = id.into();
        let (_, resolved) = self.registry.get_or_create(&id, &options, true);
        if resolved == Resolved::Conflict {
            self.report(DisclosureError::DuplicateId { id });
        }
        resolved == Resolved::Created
    }

    /// Remove a widget, its subscribers, and its stack entry.
    ///
    /// Nothing is notified and the render adapter is not called: the owning
    /// consumer is already tearing down. Returns whether the id existed.
    pub fn destroy(&mut self, id: &str) -> bool {
        self.router.remove(id);
        let existed = self.registry.destroy(id).is_some();
        tracing::debug!(id, existed, "destroy");
        existed
    }

    /// Open a widget with an optional trigger and per-open option override.
    ///
    /// The trigger receives focus back when the widget closes (if
    /// [`Behavior::RETURN_FOCUS`] is set) and counts as inside the widget for
    /// outside-click purposes. Override options apply to this open only.
    pub fn open_with(
        &mut self,
        id: impl Into<WidgetId>,
        trigger: Option<K>,
        options: Option<WidgetOptions>,
    ) -> State {
        let id = id.into();
        self.do_open(&id, trigger, options);
        self.drain();
        self.state(&id).unwrap_or_default()
    }

    /// Close a widget with an explicit reason. Unknown ids are ignored.
    pub fn close_with(&mut self, id: &str, reason: Reason) -> Option<State> {
        self.do_close(id, reason)?;
        self.drain();
        self.state(id)
    }

    /// Report that the render adapter finished the request for `ticket`.
    ///
    /// Stale tickets (from a transition that was since cancelled or retried)
    /// are ignored.
    pub fn render_complete(&mut self, id: &str, ticket: RenderTicket) -> Option<State> {
        if !self.settle(id, ticket) {
            tracing::debug!(id, ticket = ticket.get(), "ignoring stale render completion");
        }
        self.drain();
        self.state(id)
    }

    /// Replace the elements that count as inside the widget.
    pub fn set_boundary(&mut self, id: &str, elements: impl IntoIterator<Item = K>) -> bool {
        let Some(ctl) = self.registry.get_mut(id) else {
            return false;
        };
        ctl.boundary.clear();
        ctl.boundary.extend(elements);
        true
    }

    /// Add one element that counts as inside the widget.
    ///
    /// A modal can list the root of a popup it hosts so that clicks in the
    /// popup do not dismiss the modal.
    pub fn add_boundary(&mut self, id: &str, element: K) -> bool {
        let Some(ctl) = self.registry.get_mut(id) else {
            return false;
        };
        if !ctl.boundary.contains(&element) {
            ctl.boundary.push(element);
        }
        true
    }

    /// Ask the adapter to reposition an active widget.
    pub fn reposition(&mut self, id: &str) {
        if let Some(ctl) = self.registry.get(id)
            && ctl.state().is_active()
        {
            self.adapter.reposition(&ctl.id);
        }
    }

    /// Ask the adapter to reposition every active widget, bottom to top.
    pub fn reposition_all(&mut self) {
        for id in self.router.stack() {
            self.adapter.reposition(id);
        }
    }

    // Input.

    /// Route an Escape keypress. Returns the widget it closed.
    pub fn handle_escape(&mut self) -> Option<WidgetId> {
        let target = self.router.escape_target(&self.registry)?;
        self.do_close(&target, Reason::Escape);
        self.drain();
        Some(target)
    }

    /// Route a pointer-down on `target`. Returns the widgets it dismissed.
    pub fn handle_pointer_down(&mut self, target: K) -> Vec<WidgetId> {
        let dismissed = self
            .router
            .outside_targets(&self.registry, target, &self.parents);
        for id in &dismissed {
            self.do_close(id, Reason::OutsideClick);
        }
        self.drain();
        dismissed
    }

    /// The widget whose focusable elements the host should collect for
    /// [`handle_tab`](Self::handle_tab), if a focus trap is active.
    pub fn focus_trap(&self) -> Option<&WidgetId> {
        self.router.trap_owner(&self.registry)
    }

    /// Route a Tab keypress.
    ///
    /// `space` holds the focusable elements of the [`focus_trap`](Self::focus_trap)
    /// widget. Without an active trap, or with no enabled candidates, the key
    /// is left to the platform.
    pub fn handle_tab(
        &self,
        origin: Option<K>,
        shift: bool,
        space: &FocusSpace<'_, K>,
    ) -> TabRoute<K> {
        if self.focus_trap().is_none() {
            return TabRoute::Default;
        }
        aural_focus::trap(origin, shift, space).map_or(TabRoute::Default, TabRoute::Focus)
    }

    /// Advance the engine clock (host milliseconds) and report renders that
    /// exceeded [`EngineConfig::render_timeout`].
    ///
    /// A render's time starts at the first tick after it was requested, so a
    /// frame loop that sleeps while idle does not cause false reports.
    pub fn tick(&mut self, now: u64) {
        self.now = self.now.max(now);
        let Some(timeout) = self.config.render_timeout else {
            return;
        };
        let mut stuck = Vec::new();
        for ctl in self.registry.values_mut() {
            if let Some(elapsed) = ctl.check_timeout(self.now, timeout) {
                stuck.push(DisclosureError::RenderTimeout {
                    id: ctl.id.clone(),
                    state: ctl.state(),
                    elapsed,
                });
            }
        }
        for err in stuck {
            self.report(err);
        }
    }

    // Introspection.

    /// Current state of a widget, or `None` if it is not registered.
    pub fn state(&self, id: &str) -> Option<State> {
        self.registry.get(id).map(Controller::state)
    }

    /// Whether a widget is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.registry.get(id).is_some()
    }

    /// Number of registered widgets.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether no widget is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Active widgets in open order, top last.
    pub fn open_stack(&self) -> &[WidgetId] {
        self.router.stack()
    }

    // Internals. None of these drain the deferred queue.

    fn ticket(&mut self) -> RenderTicket {
        self.next_ticket += 1;
        RenderTicket(self.next_ticket)
    }

    fn do_open(&mut self, id: &WidgetId, trigger: Option<K>, options: Option<WidgetOptions>) {
        let ticket = self.ticket();
        let (ctl, _) = self
            .registry
            .get_or_create(id, &self.config.default_options, false);
        let eager = self.config.render_timeout.is_none();
        match ctl.begin_open(trigger, options, ticket, eager, Reason::Programmatic) {
            Begin::Ignore => {}
            Begin::Retry => {
                tracing::debug!(%id, "retrying mount");
                self.mount(id, ticket);
            }
            Begin::Started => {
                ctl.notify(Reason::Programmatic, &mut self.deferred);
                self.router.raise(id);
                // Siblings close before this widget can finish opening.
                for sibling in self.router.group_siblings(&self.registry, id) {
                    self.do_close(&sibling, Reason::Explicit);
                }
                self.mount(id, ticket);
            }
        }
    }

    fn do_close(&mut self, id: &str, reason: Reason) -> Option<State> {
        let ticket = self.ticket();
        let Some(ctl) = self.registry.get_mut(id) else {
            let err = DisclosureError::UnknownWidget {
                id: WidgetId::new(id),
            };
            tracing::debug!("close ignored: {err}");
            return None;
        };
        let wid = ctl.id.clone();
        let eager = self.config.render_timeout.is_none();
        match ctl.begin_close(ticket, eager, reason) {
            Begin::Ignore => {}
            Begin::Retry => {
                tracing::debug!(id, "retrying unmount");
                self.unmount(&wid, ticket);
            }
            Begin::Started => {
                ctl.notify(reason, &mut self.deferred);
                let focus = ctl
                    .trigger
                    .filter(|_| ctl.options().has(Behavior::RETURN_FOCUS));
                self.router.remove(id);
                if let Some(trigger) = focus {
                    self.adapter.return_focus(&wid, trigger);
                }
                self.unmount(&wid, ticket);
            }
        }
        self.state(id)
    }

    fn do_toggle(&mut self, id: &str, trigger: Option<K>) -> Option<State> {
        let Some(ctl) = self.registry.get(id) else {
            let err = DisclosureError::UnknownWidget {
                id: WidgetId::new(id),
            };
            tracing::debug!("toggle ignored: {err}");
            return None;
        };
        if ctl.state() == State::Closed {
            let wid = ctl.id.clone();
            let trigger = trigger.or(ctl.trigger);
            self.do_open(&wid, trigger, None);
            self.state(id)
        } else {
            self.do_close(id, Reason::Programmatic)
        }
    }

    fn mount(&mut self, id: &WidgetId, ticket: RenderTicket) {
        if self.adapter.mount(id, ticket) == RenderSignal::Complete {
            self.settle(id, ticket);
        }
    }

    fn unmount(&mut self, id: &WidgetId, ticket: RenderTicket) {
        if self.adapter.unmount(id, ticket) == RenderSignal::Complete {
            self.settle(id, ticket);
        }
    }

    /// Finish the transition owning `ticket` and notify subscribers.
    fn settle(&mut self, id: &str, ticket: RenderTicket) -> bool {
        let Some(ctl) = self.registry.get_mut(id) else {
            return false;
        };
        let Some((state, reason)) = ctl.finish(ticket) else {
            return false;
        };
        tracing::trace!(id, to = %state, "render complete");
        ctl.notify(reason, &mut self.deferred);
        true
    }

    fn drain(&mut self) {
        while let Some(command) = self.deferred.pop() {
            tracing::debug!(?command, "running deferred request");
            match command {
                Command::Open(id) => self.do_open(&id, None, None),
                Command::Close(id, reason) => {
                    self.do_close(&id, reason);
                }
                Command::Toggle(id) => {
                    self.do_toggle(&id, None);
                }
            }
        }
    }

    fn report(&mut self, err: DisclosureError) {
        tracing::warn!(id = %err.id(), "{err}");
        if let Some(hook) = &mut self.diagnostics {
            hook(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use aural_focus::FocusEntry;
    use core::cell::RefCell;
    use kurbo::Rect;

    type Log = Rc<RefCell<Vec<(String, State, Reason)>>>;

    fn entry(id: &str, state: State, reason: Reason) -> (String, State, Reason) {
        (id.to_string(), state, reason)
    }

    fn watch<R, P>(ui: &mut Disclosure<u32, R, P>, id: &str, log: &Log) -> Subscription
    where
        R: RenderAdapter<u32>,
        P: ParentLookup<u32>,
    {
        let log = log.clone();
        ui.on_widget_change(id, move |change, _| {
            log.borrow_mut()
                .push((change.id.to_string(), change.state, change.reason));
        })
    }

    /// Records every request; completes them only when `pending` is off.
    #[derive(Default)]
    struct Animated {
        pending: bool,
        requests: Vec<(WidgetId, RenderTicket)>,
        focused: Vec<(WidgetId, u32)>,
        repositioned: Vec<WidgetId>,
    }

    impl RenderAdapter<u32> for Animated {
        fn mount(&mut self, id: &WidgetId, ticket: RenderTicket) -> RenderSignal {
            self.requests.push((id.clone(), ticket));
            if self.pending {
                RenderSignal::Pending
            } else {
                RenderSignal::Complete
            }
        }

        fn unmount(&mut self, id: &WidgetId, ticket: RenderTicket) -> RenderSignal {
            self.mount(id, ticket)
        }

        fn reposition(&mut self, id: &WidgetId) {
            self.repositioned.push(id.clone());
        }

        fn return_focus(&mut self, id: &WidgetId, trigger: u32) {
            self.focused.push((id.clone(), trigger));
        }
    }

    fn animated(config: EngineConfig, pending: bool) -> Disclosure<u32, Animated> {
        let adapter = Animated {
            pending,
            ..Animated::default()
        };
        Disclosure::with_parts(config, adapter, NoParent)
    }

    fn last_ticket(ui: &Disclosure<u32, Animated>) -> RenderTicket {
        ui.adapter().requests.last().map(|r| r.1).unwrap()
    }

    #[test]
    fn exclusive_group_closes_sibling_before_opening() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        let log = Log::default();
        ui.register("a", WidgetOptions::dropdown("menus"));
        ui.register("b", WidgetOptions::dropdown("menus"));
        ui.register("tip", WidgetOptions::tooltip());
        watch(&mut ui, "a", &log);
        watch(&mut ui, "b", &log);
        ui.open_widget("tip");
        ui.open_widget("a");
        log.borrow_mut().clear();

        assert_eq!(ui.open_widget("b"), State::Open);
        assert_eq!(
            *log.borrow(),
            [
                entry("b", State::Opening, Reason::Programmatic),
                entry("a", State::Closing, Reason::Explicit),
                entry("a", State::Closed, Reason::Explicit),
                entry("b", State::Open, Reason::Programmatic),
            ]
        );
        assert!(!ui.is_widget_open("a"));
        // Widgets outside the group are untouched.
        assert!(ui.is_widget_open("tip"));
        assert_eq!(ui.open_stack(), [WidgetId::from("tip"), WidgetId::from("b")]);
    }

    #[test]
    fn modal_opens_then_escape_closes_it() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        let log = Log::default();
        ui.register("modal-1", WidgetOptions::modal());
        watch(&mut ui, "modal-1", &log);

        assert_eq!(ui.open_widget("modal-1"), State::Open);
        assert_eq!(
            log.borrow().last(),
            Some(&entry("modal-1", State::Open, Reason::Programmatic))
        );
        ui.handle_escape();
        assert_eq!(ui.state("modal-1"), Some(State::Closed));
        assert_eq!(
            log.borrow().last(),
            Some(&entry("modal-1", State::Closed, Reason::Escape))
        );
    }

    #[test]
    fn one_outside_click_can_close_several_widgets() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        ui.open_widget("a");
        ui.open_widget("b");
        assert!(ui.set_boundary("a", [1]));
        assert!(ui.set_boundary("b", [2]));
        assert!(!ui.set_boundary("ghost", [3]));
        assert_eq!(
            ui.handle_pointer_down(3),
            [WidgetId::from("a"), WidgetId::from("b")]
        );
        assert!(ui.open_stack().is_empty());
    }

    #[test]
    fn requests_queued_during_outside_click_run_after_it() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        let log = Log::default();
        for id in ["a", "b"] {
            let sink = log.clone();
            ui.on_widget_change(id, move |change, deferred| {
                sink.borrow_mut()
                    .push((change.id.to_string(), change.state, change.reason));
                if change.state == State::Closed {
                    deferred.open("c");
                    // Already closing from the same click: a no-op.
                    deferred.close("b");
                }
            });
        }
        watch(&mut ui, "c", &log);
        ui.open_widget("a");
        ui.open_widget("b");
        log.borrow_mut().clear();

        assert_eq!(
            ui.handle_pointer_down(3),
            [WidgetId::from("a"), WidgetId::from("b")]
        );
        assert_eq!(
            *log.borrow(),
            [
                entry("a", State::Closing, Reason::OutsideClick),
                entry("a", State::Closed, Reason::OutsideClick),
                entry("b", State::Closing, Reason::OutsideClick),
                entry("b", State::Closed, Reason::OutsideClick),
                entry("c", State::Opening, Reason::Programmatic),
                entry("c", State::Open, Reason::Programmatic),
            ]
        );
        // The widget opened afterwards is not dismissed by the same click.
        assert_eq!(ui.open_stack(), [WidgetId::from("c")]);
    }

    #[test]
    fn escape_closes_only_the_top_widget() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        let log = Log::default();
        ui.register("modal", WidgetOptions::modal());
        ui.register("menu", WidgetOptions::popover());
        watch(&mut ui, "menu", &log);
        ui.open_widget("modal");
        ui.open_widget("menu");

        assert_eq!(ui.handle_escape(), Some(WidgetId::from("menu")));
        assert!(ui.is_widget_open("modal"));
        assert_eq!(
            log.borrow().last(),
            Some(&entry("menu", State::Closed, Reason::Escape))
        );
        assert_eq!(ui.handle_escape(), Some(WidgetId::from("modal")));
        assert_eq!(ui.handle_escape(), None);
    }

    #[test]
    fn escape_is_swallowed_by_a_top_widget_that_ignores_it() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        ui.register("modal", WidgetOptions::modal());
        ui.register(
            "wizard",
            WidgetOptions::modal().without(Behavior::CLOSE_ON_ESCAPE),
        );
        ui.open_widget("modal");
        ui.open_widget("wizard");
        assert_eq!(ui.handle_escape(), None);
        assert!(ui.is_widget_open("modal"));
        assert!(ui.is_widget_open("wizard"));
    }

    #[test]
    fn outside_click_spares_boundary_and_trigger() {
        // 11's parent is 10, 41's parent is 40, and so on.
        let parents = |n: &u32| (n % 10 != 0).then(|| n - n % 10);
        let mut ui: Disclosure<u32, ImmediateRender, _> =
            Disclosure::with_parts(EngineConfig::default(), ImmediateRender, parents);
        let log = Log::default();
        ui.register("menu", WidgetOptions::popover());
        watch(&mut ui, "menu", &log);
        ui.set_boundary("menu", [10]);
        ui.open_with("menu", Some(20), None);

        assert!(ui.handle_pointer_down(11).is_empty());
        assert!(ui.handle_pointer_down(20).is_empty());
        assert!(ui.is_widget_open("menu"));
        assert_eq!(ui.handle_pointer_down(99), [WidgetId::from("menu")]);
        assert_eq!(
            log.borrow().last(),
            Some(&entry("menu", State::Closed, Reason::OutsideClick))
        );
    }

    #[test]
    fn nested_popup_needs_parent_boundary() {
        let parents = |n: &u32| (n % 10 != 0).then(|| n - n % 10);
        let mut ui: Disclosure<u32, ImmediateRender, _> =
            Disclosure::with_parts(EngineConfig::default(), ImmediateRender, parents);
        ui.register("modal", WidgetOptions::modal());
        ui.register("menu", WidgetOptions::popover());
        ui.set_boundary("modal", [30]);
        ui.set_boundary("menu", [40]);
        ui.add_boundary("modal", 40);
        ui.open_widget("modal");
        ui.open_widget("menu");

        assert!(ui.handle_pointer_down(41).is_empty());
        assert_eq!(ui.handle_pointer_down(31), [WidgetId::from("menu")]);
        assert!(ui.is_widget_open("modal"));
        assert!(!ui.add_boundary("ghost", 1));
    }

    #[test]
    fn closing_an_unknown_or_closed_widget_does_nothing() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        assert_eq!(ui.close_widget("ghost"), None);
        assert_eq!(ui.toggle_widget("ghost"), None);
        assert!(ui.is_empty());

        let log = Log::default();
        watch(&mut ui, "x", &log);
        assert_eq!(ui.close_widget("x"), Some(State::Closed));
        assert!(log.borrow().is_empty());
        assert_eq!(ui.len(), 1);
    }

    #[test]
    fn toggle_twice_returns_to_closed() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        let log = Log::default();
        watch(&mut ui, "w", &log);
        assert_eq!(ui.toggle_widget("w"), Some(State::Open));
        assert_eq!(ui.toggle_widget("w"), Some(State::Closed));
        assert_eq!(
            *log.borrow(),
            [
                entry("w", State::Opening, Reason::Programmatic),
                entry("w", State::Open, Reason::Programmatic),
                entry("w", State::Closing, Reason::Programmatic),
                entry("w", State::Closed, Reason::Programmatic),
            ]
        );
    }

    #[test]
    fn repeated_open_notifies_once() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        let log = Log::default();
        watch(&mut ui, "w", &log);
        ui.open_widget("w");
        ui.open_widget("w");
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn close_during_pending_open_cancels_it() {
        let mut ui = animated(EngineConfig::default(), true);
        let log = Log::default();
        watch(&mut ui, "w", &log);

        assert_eq!(ui.open_widget("w"), State::Opening);
        assert!(!ui.is_widget_open("w"));
        assert_eq!(ui.open_stack(), [WidgetId::from("w")]);
        let mount = last_ticket(&ui);

        assert_eq!(ui.close_widget("w"), Some(State::Closing));
        assert!(ui.open_stack().is_empty());
        let unmount = last_ticket(&ui);

        // The mount finishing late is stale.
        assert_eq!(ui.render_complete("w", mount), Some(State::Closing));
        assert_eq!(ui.render_complete("w", unmount), Some(State::Closed));
        assert_eq!(
            *log.borrow(),
            [
                entry("w", State::Opening, Reason::Programmatic),
                entry("w", State::Closing, Reason::Programmatic),
                entry("w", State::Closed, Reason::Programmatic),
            ]
        );
    }

    #[test]
    fn open_during_pending_close_reverses_it() {
        let mut ui = animated(EngineConfig::default(), true);
        ui.open_widget("w");
        let mount = last_ticket(&ui);
        ui.render_complete("w", mount);
        assert!(ui.is_widget_open("w"));

        ui.close_widget("w");
        let unmount = last_ticket(&ui);
        assert_eq!(ui.open_widget("w"), State::Opening);
        let remount = last_ticket(&ui);
        assert_eq!(ui.render_complete("w", unmount), Some(State::Opening));
        assert_eq!(ui.render_complete("w", remount), Some(State::Open));
    }

    #[test]
    fn render_timeout_is_reported_once_and_open_retries() {
        let config = EngineConfig::default().with_render_timeout(Some(100));
        let mut ui = animated(config, true);
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = reports.clone();
        ui.set_diagnostics(move |err| sink.borrow_mut().push(err.clone()));

        ui.tick(10);
        ui.open_widget("w");
        let first = last_ticket(&ui);
        ui.tick(50);
        // Still within the timeout: a second open is a no-op.
        ui.open_widget("w");
        assert_eq!(ui.adapter().requests.len(), 1);
        ui.tick(140);
        assert!(reports.borrow().is_empty());

        ui.tick(150);
        ui.tick(500);
        assert_eq!(
            *reports.borrow(),
            [DisclosureError::RenderTimeout {
                id: "w".into(),
                state: State::Opening,
                elapsed: 100,
            }]
        );

        assert_eq!(ui.open_widget("w"), State::Opening);
        assert_eq!(ui.adapter().requests.len(), 2);
        let retry = last_ticket(&ui);
        assert_ne!(first, retry);
        assert_eq!(ui.render_complete("w", first), Some(State::Opening));
        assert_eq!(ui.render_complete("w", retry), Some(State::Open));
    }

    #[test]
    fn idle_clock_does_not_count_toward_timeout() {
        let mut ui = animated(EngineConfig::default(), true);
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = reports.clone();
        ui.set_diagnostics(move |err| sink.borrow_mut().push(err.clone()));

        ui.tick(0);
        ui.open_widget("w");
        // The host's frame loop slept for ten seconds before this frame.
        ui.tick(10_016);
        ui.tick(10_032);
        assert!(reports.borrow().is_empty());
        // Not stalled, so reopening does not mount a second time.
        ui.open_widget("w");
        assert_eq!(ui.adapter().requests.len(), 1);

        ui.tick(11_016);
        assert_eq!(
            *reports.borrow(),
            [DisclosureError::RenderTimeout {
                id: "w".into(),
                state: State::Opening,
                elapsed: 1000,
            }]
        );
    }

    #[test]
    fn without_timeouts_close_can_always_be_retried() {
        let config = EngineConfig::default().with_render_timeout(None);
        let mut ui = animated(config, true);
        let reports = Rc::new(RefCell::new(0));
        let sink = reports.clone();
        ui.set_diagnostics(move |_| *sink.borrow_mut() += 1);
        ui.open_widget("w");
        let mount = last_ticket(&ui);
        ui.render_complete("w", mount);

        assert_eq!(ui.close_widget("w"), Some(State::Closing));
        ui.tick(1_000_000);
        assert_eq!(*reports.borrow(), 0);

        // The first unmount never finishes; closing again re-sends it.
        let stuck = last_ticket(&ui);
        assert_eq!(ui.close_widget("w"), Some(State::Closing));
        assert_eq!(ui.adapter().requests.len(), 3);
        let resent = last_ticket(&ui);
        assert_eq!(ui.render_complete("w", stuck), Some(State::Closing));
        assert_eq!(ui.render_complete("w", resent), Some(State::Closed));
    }

    #[test]
    fn conflicting_registration_keeps_first_options() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = reports.clone();
        ui.set_diagnostics(move |err| sink.borrow_mut().push(err.clone()));

        assert!(ui.register("m", WidgetOptions::modal()));
        assert!(!ui.register("m", WidgetOptions::modal()));
        assert!(reports.borrow().is_empty());
        assert!(!ui.register("m", WidgetOptions::tooltip()));
        assert_eq!(
            *reports.borrow(),
            [DisclosureError::DuplicateId { id: "m".into() }]
        );

        ui.open_widget("m");
        assert_eq!(ui.focus_trap(), Some(&WidgetId::from("m")));
    }

    #[test]
    fn subscriber_requests_run_after_the_current_operation() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        let log = Log::default();
        let sink = log.clone();
        ui.on_widget_change("a", move |change, deferred| {
            sink.borrow_mut()
                .push((change.id.to_string(), change.state, change.reason));
            if change.state == State::Open {
                deferred.open("b");
            }
        });
        watch(&mut ui, "b", &log);

        ui.open_widget("a");
        assert!(ui.is_widget_open("b"));
        assert_eq!(
            *log.borrow(),
            [
                entry("a", State::Opening, Reason::Programmatic),
                entry("a", State::Open, Reason::Programmatic),
                entry("b", State::Opening, Reason::Programmatic),
                entry("b", State::Open, Reason::Programmatic),
            ]
        );
    }

    #[test]
    fn tab_is_trapped_inside_the_topmost_modal() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        let entries = vec![
            FocusEntry::new(1_u32, Rect::new(0.0, 0.0, 10.0, 10.0)),
            FocusEntry::new(2_u32, Rect::new(20.0, 0.0, 30.0, 10.0)),
        ];
        let space = FocusSpace { nodes: &entries };
        assert_eq!(ui.handle_tab(Some(2), false, &space), TabRoute::Default);

        ui.register("dialog", WidgetOptions::modal());
        ui.open_widget("dialog");
        ui.open_widget("tip");
        assert_eq!(ui.focus_trap(), Some(&WidgetId::from("dialog")));
        assert_eq!(ui.handle_tab(Some(2), false, &space), TabRoute::Focus(1));
        assert_eq!(ui.handle_tab(Some(1), true, &space), TabRoute::Focus(2));

        let empty: [FocusEntry<u32>; 0] = [];
        let nothing = FocusSpace { nodes: &empty };
        assert_eq!(ui.handle_tab(Some(1), false, &nothing), TabRoute::Default);

        ui.close_widget("dialog");
        assert_eq!(ui.focus_trap(), None);
        assert_eq!(ui.handle_tab(Some(2), false, &space), TabRoute::Default);
    }

    #[test]
    fn toggle_keeps_or_records_the_trigger() {
        let mut ui = animated(EngineConfig::default(), false);
        ui.register("dd", WidgetOptions::dropdown("menus"));
        ui.open_with("dd", Some(5), None);
        ui.close_widget("dd");

        // Toggling without a trigger keeps the one from the earlier open.
        assert_eq!(ui.toggle_widget("dd"), Some(State::Open));
        assert!(ui.handle_pointer_down(5).is_empty());
        assert!(ui.is_widget_open("dd"));
        assert_eq!(ui.toggle_widget("dd"), Some(State::Closed));

        ui.register("sel", WidgetOptions::select("forms"));
        assert_eq!(ui.toggle_with("sel", Some(9)), Some(State::Open));
        assert!(ui.handle_pointer_down(9).is_empty());
        assert_eq!(ui.toggle_with("sel", Some(9)), Some(State::Closed));
        assert_eq!(
            ui.adapter().focused,
            [
                (WidgetId::from("dd"), 5),
                (WidgetId::from("dd"), 5),
                (WidgetId::from("sel"), 9),
            ]
        );
        assert_eq!(ui.toggle_with("ghost", Some(1)), None);
        assert!(!ui.contains("ghost"));
    }

    #[test]
    fn focus_returns_to_trigger_unless_disabled() {
        let mut ui = animated(EngineConfig::default(), false);
        ui.register("menu", WidgetOptions::popover());
        ui.register("ctx", WidgetOptions::context_menu("menus"));
        ui.open_with("menu", Some(7), None);
        ui.close_widget("menu");
        ui.open_with("ctx", Some(8), None);
        ui.close_widget("ctx");
        // No trigger, nothing to return to.
        ui.open_widget("menu");
        ui.close_widget("menu");
        assert_eq!(ui.adapter().focused, [(WidgetId::from("menu"), 7)]);
    }

    #[test]
    fn override_options_last_one_open() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        ui.open_with("w", None, Some(WidgetOptions::modal()));
        assert_eq!(ui.focus_trap(), Some(&WidgetId::from("w")));
        ui.close_widget("w");
        ui.open_widget("w");
        assert_eq!(ui.focus_trap(), None);
    }

    #[test]
    fn destroy_is_silent() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        let log = Log::default();
        watch(&mut ui, "w", &log);
        ui.open_widget("w");
        log.borrow_mut().clear();

        assert!(ui.destroy("w"));
        assert!(!ui.contains("w"));
        assert!(ui.open_stack().is_empty());
        assert!(log.borrow().is_empty());
        assert!(!ui.destroy("w"));
        assert_eq!(ui.handle_escape(), None);
    }

    #[test]
    fn unsubscribed_callbacks_stop_firing() {
        let mut ui: Disclosure<u32> = Disclosure::new();
        let log = Log::default();
        let sub = watch(&mut ui, "w", &log);
        assert_eq!(sub.widget(), &WidgetId::from("w"));
        ui.open_widget("w");
        assert!(ui.unsubscribe(&sub));
        assert!(!ui.unsubscribe(&sub));
        ui.close_widget("w");
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn reposition_only_reaches_active_widgets() {
        let mut ui = animated(EngineConfig::default(), false);
        ui.open_widget("a");
        ui.open_widget("b");
        ui.register("idle", WidgetOptions::popover());
        ui.reposition("idle");
        ui.reposition("ghost");
        ui.reposition_all();
        ui.reposition("a");
        assert_eq!(
            ui.adapter().repositioned,
            [WidgetId::from("a"), WidgetId::from("b"), WidgetId::from("a")]
        );
    }
}
