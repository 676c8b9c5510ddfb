//! Browser tests for the DOM bindings. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use cover_splitter::config::Config;
use cover_splitter::dom::BrowserPage;
use cover_splitter::dom::waiter::wait_for_element;
use cover_splitter::host::{ActivationFuture, PageHost};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn mount(html: &str) -> HtmlElement {
    let doc = document();
    let root: HtmlElement = doc.create_element("div").unwrap().dyn_into().unwrap();
    root.set_inner_html(html);
    doc.body().unwrap().append_child(&root).unwrap();
    root
}

#[wasm_bindgen_test]
async fn test_wait_for_present_element() {
    let root = mount(r#"<p id="already-here"></p>"#);

    let element = wait_for_element(&document(), "#already-here").await.unwrap();

    assert_eq!(element.id(), "already-here");
    root.remove();
}

#[wasm_bindgen_test]
async fn test_wait_for_late_element() {
    let root = mount("");
    let late = root.clone();
    wasm_bindgen_futures::spawn_local(async move {
        late.set_inner_html(r#"<span class="late-node"></span>"#);
    });

    let element = wait_for_element(&document(), ".late-node").await.unwrap();

    assert_eq!(element.tag_name(), "SPAN");
    root.remove();
}

#[wasm_bindgen_test]
fn test_control_toggles() {
    let root = mount(
        r#"<div class="detail-header edit"></div>
           <div class="movie-head"><div class="details-edit"></div></div>"#,
    );
    let page = BrowserPage::new(Rc::new(Config::default())).unwrap();

    assert!(page.is_edit_mode());
    assert!(!page.is_control_present());

    page.install_control(Rc::new(|| -> Option<ActivationFuture> { None }));
    assert!(page.is_control_present());

    let control: HtmlElement =
        document().get_element_by_id("crop-btn").unwrap().dyn_into().unwrap();
    assert_eq!(control.text_content().as_deref(), Some("Split Cover"));

    page.set_control_disabled(true);
    assert!(control.has_attribute("disabled"));
    page.set_control_disabled(false);
    assert!(!control.has_attribute("disabled"));

    page.set_control_hidden(true);
    assert_eq!(control.style().get_property_value("display").unwrap(), "none");
    page.set_control_hidden(false);
    assert_eq!(control.style().get_property_value("display").unwrap(), "inline-block");

    root.remove();
}

#[wasm_bindgen_test]
fn test_insert_back_cover_clones_front_frame() {
    let root = mount(
        r#"<div class="movie-images">
             <a class="movie-image"><img alt="Front Cover" src="/movie/42/frontimage"></a>
           </div>"#,
    );
    let page = BrowserPage::new(Rc::new(Config::default())).unwrap();

    page.insert_back_cover("https://x/back.png");

    let back = document()
        .query_selector("div.movie-images img[alt='Back Cover']")
        .unwrap()
        .expect("back cover inserted");
    assert_eq!(back.get_attribute("src").as_deref(), Some("https://x/back.png"));
    assert_eq!(back.parent_element().unwrap().class_name(), "movie-image");

    root.remove();
}
