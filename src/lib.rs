// Frontend
use std::rc::Rc;

use yew::prelude::*;
use wasm_bindgen::prelude::*;
use bounce::BounceRoot;


pub mod bridge;
pub mod config;
pub mod entity;
pub mod interface;
pub mod utils;
pub mod wallet;

use config::Config;
use interface::Main;

#[derive(Properties, PartialEq)]
struct AppProps {
    config: Rc<Config>,
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    html! {
        <>
        <BounceRoot>
            <Main config={props.config.clone()}/>
        </BounceRoot>
        </>
    }
}

#[wasm_bindgen(start)]
fn run_app() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    let config = Config::from_env().map_err(|e| JsValue::from_str(&e.to_string()))?;
    wallet::web3modal::init(&config)?;
    log::info!("starting {}", config.app_name);
    yew::Renderer::<App>::with_props(AppProps { config: Rc::new(config) }).render();
    Ok(())
}
