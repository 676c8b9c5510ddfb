/// `PageHost` over the live document
use crate::config::Config;
use crate::cover::{CoverImage, CoverImages, CoverRole};
use crate::dom::waiter::{wait_for_element, wait_for_image};
use crate::host::{ActivateFn, PageHost};
use crate::page::cache_busted;
use async_trait::async_trait;
use log::{error, warn};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlElement, HtmlImageElement, Window};

const BACK_COVER_ALT: &str = "Back Cover";

pub struct BrowserPage {
    window: Window,
    document: Document,
    config: Rc<Config>,
}

impl BrowserPage {
    pub fn new(config: Rc<Config>) -> Result<BrowserPage, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(BrowserPage {
            window,
            document,
            config,
        })
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn image(&self, selector: &str) -> Option<HtmlImageElement> {
        self.query(selector).and_then(|e| e.dyn_into().ok())
    }

    fn control(&self) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(&self.config.control.id)
            .and_then(|e| e.dyn_into().ok())
    }

    fn describe(role: CoverRole, img: &HtmlImageElement) -> CoverImage {
        CoverImage::new(role, img.natural_width(), img.natural_height(), img.src())
    }

    fn create_control(&self, on_activate: ActivateFn) -> Result<(), JsValue> {
        let group = self
            .query(&self.config.selectors.button_group)
            .ok_or_else(|| JsValue::from_str("button group disappeared"))?;

        let button = self.document.create_element("button")?;
        button.set_id(&self.config.control.id);
        button.set_attribute("type", "button")?;
        button.set_class_name(&self.config.control.class);
        button.set_text_content(Some(&self.config.control.label));

        let on_click = Closure::wrap(Box::new(move |event: Event| match on_activate() {
            Some(run) => spawn_local(async move {
                run.await;
            }),
            None => {
                event.prevent_default();
                event.stop_propagation();
            }
        }) as Box<dyn FnMut(Event)>);
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        // Lives as long as the button; the host discards both on re-render
        on_click.forget();

        group.append_child(&button)?;
        Ok(())
    }

    fn clone_front_as_back(&self, back_ref: &str) -> Result<(), JsValue> {
        let front = self
            .query(&self.config.selectors.front_cover)
            .ok_or_else(|| JsValue::from_str("front cover disappeared"))?;
        let frame = front
            .parent_node()
            .ok_or_else(|| JsValue::from_str("front cover has no parent"))?;
        let container = self
            .query(&self.config.selectors.image_container)
            .ok_or_else(|| JsValue::from_str("image container disappeared"))?;

        let twin: Element = frame.clone_node_with_deep(true)?.dyn_into()?;
        let img = match twin.dyn_ref::<HtmlImageElement>() {
            Some(img) => img.clone(),
            None => twin
                .query_selector("img")?
                .ok_or_else(|| JsValue::from_str("cloned cover has no image"))?
                .dyn_into()?,
        };
        img.set_alt(BACK_COVER_ALT);
        img.set_src(back_ref);

        container.append_child(&twin)?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl PageHost for BrowserPage {
    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn is_control_present(&self) -> bool {
        self.control().is_some()
    }

    fn is_edit_mode(&self) -> bool {
        self.query(&self.config.selectors.edit_header).is_some()
    }

    async fn wait_until_ready(&self) {
        let selectors = &self.config.selectors;
        for selector in [&selectors.detail_container, &selectors.button_group] {
            if let Err(e) = wait_for_element(&self.document, selector).await {
                error!("Waiting for {} failed: {:?}", selector, e);
            }
        }
    }

    async fn find_cover_images(&self) -> CoverImages {
        let selectors = &self.config.selectors;

        let front = match self.image(&selectors.front_cover) {
            Some(img) => {
                if let Err(e) = wait_for_image(&img).await {
                    warn!("Front cover never settled: {:?}", e);
                }
                Self::describe(CoverRole::Front, &img)
            }
            None => CoverImage::absent(CoverRole::Front),
        };

        let back = match self.image(&selectors.back_cover) {
            Some(img) => Self::describe(CoverRole::Back, &img),
            None => CoverImage::absent(CoverRole::Back),
        };

        CoverImages { front, back }
    }

    fn install_control(&self, on_activate: ActivateFn) {
        if let Err(e) = self.create_control(on_activate) {
            error!("Failed to install split control: {:?}", e);
        }
    }

    fn set_control_disabled(&self, disabled: bool) {
        let Some(control) = self.control() else {
            return;
        };
        let result = if disabled {
            control.set_attribute("disabled", "true")
        } else {
            control.remove_attribute("disabled")
        };
        if let Err(e) = result {
            error!("Failed to toggle split control: {:?}", e);
        }
    }

    fn set_control_hidden(&self, hidden: bool) {
        let Some(control) = self.control() else {
            return;
        };
        let style = control.style();
        let hidden_now = style.get_property_value("display").ok().as_deref() == Some("none");
        let result = match (hidden, hidden_now) {
            (true, false) => style.set_property("display", "none"),
            (false, true) => style.set_property("display", "inline-block"),
            _ => Ok(()),
        };
        if let Err(e) = result {
            error!("Failed to toggle split control visibility: {:?}", e);
        }
    }

    fn insert_back_cover(&self, back_ref: &str) {
        if let Err(e) = self.clone_front_as_back(back_ref) {
            error!("Failed to show new back cover: {:?}", e);
        }
    }

    fn reload_front_cover(&self) {
        if let Some(img) = self.image(&self.config.selectors.front_cover) {
            img.set_src(&cache_busted(&img.src(), js_sys::Date::now() as u64));
        }
    }

    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            error!("Failed to alert: {:?}", e);
        }
    }
}
