#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

use js_sys::{Function, Object, Reflect};
use topography_wasm::{start, start_topography, BrowserOptions};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::HtmlCanvasElement;

wasm_bindgen_test_configure!(run_in_browser);

fn object(entries: &[(&str, JsValue)]) -> JsValue {
    let obj = Object::new();
    for (key, value) in entries {
        Reflect::set(&obj, &JsValue::from_str(key), value).unwrap();
    }
    obj.into()
}

fn canvas() -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .unwrap()
        .dyn_into()
        .unwrap();
    canvas.set_width(120);
    canvas.set_height(80);
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

#[wasm_bindgen_test]
fn options_read_well_typed_keys() {
    let get_size = Function::new_no_args("return { width: 10, height: 20 };");
    let element = web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .create_element("div")
        .unwrap();
    let options = BrowserOptions::from_js(&object(&[
        ("lineColor", JsValue::from_str("red")),
        ("getSize", get_size.into()),
        ("observeElement", element.into()),
    ]));
    assert_eq!(options.line_color.as_deref(), Some("red"));
    assert!(options.get_size.is_some());
    assert!(options.observe_element.is_some());
}

#[wasm_bindgen_test]
fn options_ignore_mistyped_and_missing_keys() {
    let options = BrowserOptions::from_js(&object(&[
        ("lineColor", JsValue::from_f64(42.0)),
        ("getSize", JsValue::from_str("not a function")),
        ("observeElement", Object::new().into()),
    ]));
    assert_eq!(options.line_color, None);
    assert!(options.get_size.is_none());
    assert!(options.observe_element.is_none());

    let options = BrowserOptions::from_js(&object(&[("lineColor", JsValue::NULL)]));
    assert_eq!(options.line_color, None);

    for value in [JsValue::UNDEFINED, JsValue::NULL, JsValue::from_str("red")] {
        let options = BrowserOptions::from_js(&value);
        assert!(options.line_color.is_none() && options.get_size.is_none());
    }
}

#[wasm_bindgen_test]
fn missing_canvas_returns_noop_stop() {
    let mut handle = start(None, BrowserOptions::default());
    assert!(!handle.is_running());
    handle.stop();

    let stop = start_topography(None, JsValue::UNDEFINED);
    assert!(stop.call0(&JsValue::NULL).is_ok());
    assert!(stop.call0(&JsValue::NULL).is_ok());
}

#[wasm_bindgen_test]
fn stop_is_idempotent_on_a_running_canvas() {
    let canvas = canvas();
    let options = BrowserOptions {
        line_color: Some("rebeccapurple".into()),
        ..BrowserOptions::default()
    };
    let mut handle = start(Some(canvas.clone()), options);
    assert!(handle.is_running());
    handle.stop();
    assert!(!handle.is_running());
    handle.stop();

    let stop = start_topography(Some(canvas), object(&[("lineColor", JsValue::from_f64(1.0))]));
    assert!(stop.call0(&JsValue::NULL).is_ok());
    assert!(stop.call0(&JsValue::NULL).is_ok());
}
