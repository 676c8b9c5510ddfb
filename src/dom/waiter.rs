/// Waiting for host-page nodes that may not be rendered yet
use js_sys::{Array, Function, Promise};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Event, HtmlImageElement, MutationObserver, MutationObserverInit};

/// Resolve `selector` to the first matching element, now or on the first
/// document mutation that makes it match. No timeout: a node that never
/// appears keeps the future pending.
pub async fn wait_for_element(document: &Document, selector: &str) -> Result<Element, JsValue> {
    if let Some(element) = document.query_selector(selector)? {
        return Ok(element);
    }

    let resolver: Rc<RefCell<Option<Function>>> = Rc::default();
    let promise = {
        let resolver = Rc::clone(&resolver);
        Promise::new(&mut move |resolve, _reject| {
            *resolver.borrow_mut() = Some(resolve);
        })
    };

    let on_mutation = {
        let document = document.clone();
        let selector = selector.to_string();
        Closure::wrap(Box::new(move |_records: Array, observer: MutationObserver| {
            if let Ok(Some(element)) = document.query_selector(&selector) {
                observer.disconnect();
                if let Some(resolve) = resolver.borrow_mut().take() {
                    let _ = resolve.call1(&JsValue::NULL, &element);
                }
            }
        }) as Box<dyn FnMut(Array, MutationObserver)>)
    };

    let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer.observe_with_options(document, &options)?;

    let element = JsFuture::from(promise).await?;
    drop(on_mutation);

    element.dyn_into::<Element>()
}

/// Resolve once `img` has finished loading, successfully or not
pub async fn wait_for_image(img: &HtmlImageElement) -> Result<(), JsValue> {
    if img.complete() {
        return Ok(());
    }

    let resolver: Rc<RefCell<Option<Function>>> = Rc::default();
    let promise = {
        let resolver = Rc::clone(&resolver);
        Promise::new(&mut move |resolve, _reject| {
            *resolver.borrow_mut() = Some(resolve);
        })
    };

    // A broken image settles too; its natural size reads as 0x0
    let on_settled = Closure::wrap(Box::new(move |_event: Event| {
        if let Some(resolve) = resolver.borrow_mut().take() {
            let _ = resolve.call0(&JsValue::NULL);
        }
    }) as Box<dyn FnMut(Event)>);

    img.add_event_listener_with_callback("load", on_settled.as_ref().unchecked_ref())?;
    img.add_event_listener_with_callback("error", on_settled.as_ref().unchecked_ref())?;

    JsFuture::from(promise).await?;

    img.remove_event_listener_with_callback("load", on_settled.as_ref().unchecked_ref())?;
    img.remove_event_listener_with_callback("error", on_settled.as_ref().unchecked_ref())?;
    Ok(())
}
