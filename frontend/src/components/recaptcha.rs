use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{js_sys, window, Element};
use yew::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = grecaptcha, js_name = render, catch)]
    fn grecaptcha_render(container: &Element, parameters: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = grecaptcha, js_name = reset, catch)]
    fn grecaptcha_reset(widget_id: &JsValue) -> Result<(), JsValue>;
}

const LOAD_ATTEMPTS: u32 = 50;
const LOAD_POLL_MS: u32 = 200;

// The api.js script loads async; wait until `grecaptcha.render` exists.
fn grecaptcha_ready() -> bool {
    let Some(window) = window() else {
        return false;
    };
    js_sys::Reflect::get(&window, &JsValue::from_str("grecaptcha"))
        .and_then(|api| js_sys::Reflect::get(&api, &JsValue::from_str("render")))
        .map(|render| render.is_function())
        .unwrap_or(false)
}

#[derive(Default)]
struct Widget {
    id: Option<JsValue>,
    // Kept alive for as long as the widget can call back.
    callbacks: Vec<Closure<dyn Fn(JsValue)>>,
}

#[derive(Properties, PartialEq)]
pub struct RecaptchaProps {
    pub site_key: String,
    /// Whether the workflow currently holds a token. Dropping to false resets the widget.
    pub has_token: bool,
    pub on_token: Callback<String>,
    pub on_expired: Callback<()>,
}

#[function_component(Recaptcha)]
pub fn recaptcha(props: &RecaptchaProps) -> Html {
    let container = use_node_ref();
    let widget = use_mut_ref(Widget::default);

    {
        let container = container.clone();
        let widget = widget.clone();
        let site_key = props.site_key.clone();
        let on_token = props.on_token.clone();
        let on_expired = props.on_expired.clone();
        use_effect_with_deps(
            move |_| {
                spawn_local(render_when_ready(container, widget, site_key, on_token, on_expired));
                || ()
            },
            (),
        );
    }

    {
        let widget = widget.clone();
        use_effect_with_deps(
            move |has_token| {
                if !*has_token {
                    if let Some(id) = widget.borrow().id.as_ref() {
                        if let Err(e) = grecaptcha_reset(id) {
                            warn!("Failed to reset reCAPTCHA: {:?}", e);
                        }
                    }
                }
                || ()
            },
            props.has_token,
        );
    }

    html! {
        <div class="recaptcha-container" ref={container}></div>
    }
}

async fn render_when_ready(
    container: NodeRef,
    widget: Rc<RefCell<Widget>>,
    site_key: String,
    on_token: Callback<String>,
    on_expired: Callback<()>,
) {
    let mut attempts = 0;
    while !grecaptcha_ready() {
        attempts += 1;
        if attempts >= LOAD_ATTEMPTS {
            error!("reCAPTCHA script did not load");
            return;
        }
        TimeoutFuture::new(LOAD_POLL_MS).await;
    }

    let Some(element) = container.cast::<Element>() else {
        warn!("reCAPTCHA container is gone before render");
        return;
    };

    let token_callback = Closure::<dyn Fn(JsValue)>::new(move |token: JsValue| {
        if let Some(token) = token.as_string() {
            on_token.emit(token);
        }
    });
    let expired_callback = {
        let on_expired = on_expired.clone();
        Closure::<dyn Fn(JsValue)>::new(move |_| on_expired.emit(()))
    };
    // A widget error leaves no usable token either.
    let error_callback = Closure::<dyn Fn(JsValue)>::new(move |_| on_expired.emit(()));

    let parameters = js_sys::Object::new();
    let entries: [(&str, &JsValue); 4] = [
        ("sitekey", &JsValue::from_str(&site_key)),
        ("callback", token_callback.as_ref()),
        ("expired-callback", expired_callback.as_ref()),
        ("error-callback", error_callback.as_ref()),
    ];
    for (key, value) in entries {
        let _ = js_sys::Reflect::set(&parameters, &JsValue::from_str(key), value);
    }

    match grecaptcha_render(&element, &parameters) {
        Ok(id) => {
            info!("reCAPTCHA widget rendered");
            let mut widget = widget.borrow_mut();
            widget.id = Some(id);
            widget.callbacks = vec![token_callback, expired_callback, error_callback];
        }
        Err(e) => error!("Failed to render reCAPTCHA: {:?}", e),
    }
}
