/// Cover Splitter - splits combined movie cover scans into front and back covers
/// Built with Rust + WASM as a host UI plugin

pub mod config;
pub mod controller;
pub mod cover;
pub mod dom;
pub mod error;
pub mod host;
pub mod page;
pub mod splitter;
pub mod updater;
pub mod watcher;

use config::Config;
use controller::ActionController;
use dom::BrowserPage;
use host::PageObservation;
use log::{debug, info, trace, warn};
use splitter::FetchSplitter;
use std::cell::RefCell;
use std::rc::Rc;
use updater::GqlCoverUpdater;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use watcher::{NavigationWatcher, PollingTask, WatchDecision};

// Host plugin event bus
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = stash, js_name = addEventListener)]
    fn add_host_listener(event: &str, callback: &js_sys::Function);
}

type BrowserController = ActionController<BrowserPage, FetchSplitter, GqlCoverUpdater>;

struct App {
    config: Rc<Config>,
    controller: Rc<BrowserController>,
    watcher: RefCell<NavigationWatcher>,
    polling: RefCell<Option<PollingTask>>,
}

thread_local! {
    static APP: RefCell<Option<Rc<App>>> = const { RefCell::new(None) };
}

impl App {
    /// Host signalled a movie page: make sure polling runs, then detect
    fn on_page_loaded(self: &Rc<Self>) {
        self.ensure_polling();

        let controller = Rc::clone(&self.controller);
        spawn_local(async move {
            let outcome = controller.rearm().await;
            debug!("Detection after page load: {:?}", outcome);
        });
    }

    fn ensure_polling(self: &Rc<Self>) {
        if self.polling.borrow().is_some() {
            return;
        }

        let weak = Rc::downgrade(self);
        let task = PollingTask::start(
            self.config.poll_initial_delay_ms,
            self.config.poll_interval_ms,
            move || {
                if let Some(app) = weak.upgrade() {
                    app.poll();
                }
            },
        );

        match task {
            Ok(task) => *self.polling.borrow_mut() = Some(task),
            Err(e) => warn!("Navigation polling unavailable: {:?}", e),
        }
    }

    fn poll(&self) {
        let observation = PageObservation::capture(self.controller.host());
        let mut watcher = self.watcher.borrow_mut();
        let moved = watcher.last_location() != Some(observation.location.as_str());
        let decision = watcher.tick(&observation);
        drop(watcher);

        match decision {
            WatchDecision::Rearm => {
                // Re-renders in edit mode repeat every tick on unsplittable pages
                if moved {
                    debug!("Re-arming on {}", observation.location);
                } else {
                    trace!("Re-arming on {}", observation.location);
                }
                let controller = Rc::clone(&self.controller);
                spawn_local(async move {
                    controller.rearm().await;
                });
            }
            // Polling stays on; the next qualifying page re-arms
            WatchDecision::Forget => debug!("Left movie page: {}", observation.location),
            WatchDecision::Idle => {}
        }
    }
}

// Set up panic hook and logging once the module loads
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Register with the host using the default configuration
#[wasm_bindgen]
pub fn install() -> Result<(), JsValue> {
    install_config(Config::default())
}

/// Register with the host; `config` may override any subset of the defaults
#[wasm_bindgen]
pub fn install_with_config(config: JsValue) -> Result<(), JsValue> {
    let config: Config = if config.is_null() || config.is_undefined() {
        Config::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
    };
    install_config(config)
}

fn install_config(config: Config) -> Result<(), JsValue> {
    if APP.with(|slot| slot.borrow().is_some()) {
        warn!("Cover splitter already installed");
        return Ok(());
    }

    let config = Rc::new(config);
    let page = BrowserPage::new(Rc::clone(&config))?;
    let controller =
        ActionController::new(page, FetchSplitter, GqlCoverUpdater, Rc::clone(&config));

    let app = Rc::new(App {
        config: Rc::clone(&config),
        controller: Rc::new(controller),
        watcher: RefCell::new(NavigationWatcher::new()),
        polling: RefCell::new(None),
    });

    let weak = Rc::downgrade(&app);
    let on_page = Closure::wrap(Box::new(move || {
        if let Some(app) = weak.upgrade() {
            app.on_page_loaded();
        }
    }) as Box<dyn FnMut()>);
    add_host_listener(&config.page_event, on_page.as_ref().unchecked_ref());
    on_page.forget();

    APP.with(|slot| *slot.borrow_mut() = Some(app));
    info!("Cover splitter listening for {}", config.page_event);
    Ok(())
}
