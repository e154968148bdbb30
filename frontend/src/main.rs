use yew::prelude::*;
use log::{info, Level};

mod config;
mod intake;
mod timer;
mod components {
    pub mod contact_form;
    pub mod recaptcha;
}
mod pages {
    pub mod landing;
}

use pages::landing::Landing;

#[function_component]
fn App() -> Html {
    html! {
        <Landing />
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(Level::Info).expect("error initializing log");
    // Workflow events from diffrenzz-leads are emitted through tracing
    tracing_wasm::set_as_global_default();

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}
