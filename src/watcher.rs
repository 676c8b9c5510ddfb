/// Navigation watcher: notices client-side navigation and host re-renders by polling
use crate::host::PageObservation;
use crate::page::is_qualifying;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchDecision {
    /// Nothing changed that needs attention
    Idle,
    /// Qualifying page entered or re-rendered: run setup again
    Rearm,
    /// Left the remembered qualifying page
    Forget,
}

#[derive(Debug, Default)]
pub struct NavigationWatcher {
    last_location: Option<String>,
}

impl NavigationWatcher {
    pub fn new() -> Self {
        NavigationWatcher { last_location: None }
    }

    pub fn last_location(&self) -> Option<&str> {
        self.last_location.as_deref()
    }

    /// Decide what one polling tick should do.
    ///
    /// Setup re-runs when the location changed, or when it did not change but
    /// the control went missing while the page is in edit mode (the host
    /// re-rendered without navigating).
    pub fn tick(&mut self, observation: &PageObservation) -> WatchDecision {
        let location_changed = self.last_location.as_deref() != Some(observation.location.as_str());
        let control_missing = !observation.control_present;

        if !(location_changed || (control_missing && observation.edit_mode)) {
            return WatchDecision::Idle;
        }

        if is_qualifying(&observation.location) {
            self.last_location = Some(observation.location.clone());
            WatchDecision::Rearm
        } else if self.last_location.take().is_some() {
            WatchDecision::Forget
        } else {
            WatchDecision::Idle
        }
    }
}

struct PollingState {
    window: web_sys::Window,
    timeout_id: Option<i32>,
    interval_id: Option<i32>,
    tick: Option<Closure<dyn FnMut()>>,
    kickoff: Option<Closure<dyn FnMut()>>,
}

/// Periodic task on the browser event loop: `tick` runs every `interval_ms`
/// once `initial_delay_ms` has passed. Stopped explicitly or on drop.
pub struct PollingTask {
    state: Rc<RefCell<PollingState>>,
}

impl PollingTask {
    pub fn start(
        initial_delay_ms: i32,
        interval_ms: i32,
        tick: impl FnMut() + 'static,
    ) -> Result<PollingTask, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

        let state = Rc::new(RefCell::new(PollingState {
            window: window.clone(),
            timeout_id: None,
            interval_id: None,
            tick: Some(Closure::wrap(Box::new(tick) as Box<dyn FnMut()>)),
            kickoff: None,
        }));

        let weak = Rc::downgrade(&state);
        let kickoff = Closure::wrap(Box::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let mut state = state.borrow_mut();
            state.timeout_id = None;

            let Some(tick) = state.tick.as_ref() else {
                return;
            };
            let started = state.window.set_interval_with_callback_and_timeout_and_arguments_0(
                tick.as_ref().unchecked_ref(),
                interval_ms,
            );
            match started {
                Ok(id) => state.interval_id = Some(id),
                Err(e) => log::error!("Failed to start navigation polling: {:?}", e),
            }
        }) as Box<dyn FnMut()>);

        let timeout_id = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            kickoff.as_ref().unchecked_ref(),
            initial_delay_ms,
        )?;

        {
            let mut s = state.borrow_mut();
            s.timeout_id = Some(timeout_id);
            s.kickoff = Some(kickoff);
        }

        log::debug!("Navigation polling every {}ms after {}ms", interval_ms, initial_delay_ms);
        Ok(PollingTask { state })
    }

    pub fn is_running(&self) -> bool {
        let state = self.state.borrow();
        state.timeout_id.is_some() || state.interval_id.is_some()
    }

    pub fn stop(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = state.timeout_id.take() {
            state.window.clear_timeout_with_handle(id);
        }
        if let Some(id) = state.interval_id.take() {
            state.window.clear_interval_with_handle(id);
        }
    }
}

impl Drop for PollingTask {
    fn drop(&mut self) {
        self.stop();
        let mut state = self.state.borrow_mut();
        state.tick = None;
        state.kickoff = None;
    }
}
