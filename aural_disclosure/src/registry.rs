// Copyright 2025 the Aural UI Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Id → controller map.
//!
//! The registry only owns the map. It never touches the render adapter and
//! never notifies anyone; the engine does both.

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::controller::Controller;
use crate::options::WidgetOptions;
use crate::types::WidgetId;

/// How [`Registry::get_or_create`] resolved an id.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Resolved {
    Created,
    Existing,
    /// Existing, pinned, and the new options differ. The old ones win.
    Conflict,
}

#[derive(Debug)]
pub(crate) struct Registry<K> {
    controllers: HashMap<WidgetId, Controller<K>>,
}

impl<K> Default for Registry<K> {
    fn default() -> Self {
        Self {
            controllers: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq> Registry<K> {
    /// Return the controller for `id`, creating a `Closed` one if needed.
    ///
    /// `options` are used for creation. For an existing controller they are
    /// ignored, except that explicit options pin an unpinned controller.
    pub(crate) fn get_or_create(
        &mut self,
        id: &WidgetId,
        options: &WidgetOptions,
        explicit: bool,
    ) -> (&mut Controller<K>, Resolved) {
        let ctl = match self.controllers.entry(id.clone()) {
            Entry::Vacant(slot) => {
                let ctl = Controller::new(id.clone(), options.clone(), explicit);
                return (slot.insert(ctl), Resolved::Created);
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };
        let resolved = if !explicit || !ctl.is_pinned() {
            if explicit {
                ctl.pin(options.clone());
            }
            Resolved::Existing
        } else if ctl.registered() == options {
            Resolved::Existing
        } else {
            Resolved::Conflict
        };
        (ctl, resolved)
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Controller<K>> {
        self.controllers.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Controller<K>> {
        self.controllers.get_mut(id)
    }

    /// Remove a controller. Absent ids are ignored.
    pub(crate) fn destroy(&mut self, id: &str) -> Option<Controller<K>> {
        self.controllers.remove(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.controllers.len()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Controller<K>> {
        self.controllers.values_mut()
    }
}
