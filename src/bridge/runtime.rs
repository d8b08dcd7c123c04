use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, error, info};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlCanvasElement, HtmlScriptElement};

use crate::config::UnityBuild;

/// The embedded game as seen from the host page.
pub trait GameRuntime {
    fn is_ready(&self) -> bool;
    fn send_message(&self, object: &str, method: &str, payload: &str);
}

#[wasm_bindgen]
extern "C" {
    #[derive(Clone)]
    pub type UnityInstance;

    #[wasm_bindgen(method, js_name = SendMessage)]
    fn send_message(this: &UnityInstance, object: &str, method: &str, payload: &str);

    #[wasm_bindgen(method, js_name = Quit)]
    fn quit(this: &UnityInstance) -> js_sys::Promise;

    #[wasm_bindgen(catch, js_name = createUnityInstance)]
    fn create_unity_instance(
        canvas: &HtmlCanvasElement,
        config: &JsValue,
    ) -> Result<js_sys::Promise, JsValue>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InstanceConfig<'a> {
    data_url: &'a str,
    framework_url: &'a str,
    code_url: &'a str,
}

/// Holds at most one live instance. Starting a load or clearing the slot
/// invalidates every load started before it.
pub struct InstanceSlot<T> {
    generation: Cell<u64>,
    instance: RefCell<Option<T>>,
}

impl<T> Default for InstanceSlot<T> {
    fn default() -> Self {
        Self {
            generation: Cell::new(0),
            instance: RefCell::new(None),
        }
    }
}

impl<T> InstanceSlot<T> {
    /// Starts a load and returns its ticket.
    pub fn begin(&self) -> u64 {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        next
    }

    pub fn is_current(&self, load: u64) -> bool {
        self.generation.get() == load
    }

    /// Stores `instance` if `load` is still current, otherwise hands it back.
    pub fn finish(&self, load: u64, instance: T) -> Result<(), T> {
        if !self.is_current(load) {
            return Err(instance);
        }
        *self.instance.borrow_mut() = Some(instance);
        Ok(())
    }

    pub fn clear(&self) -> Option<T> {
        self.generation.set(self.generation.get() + 1);
        self.instance.borrow_mut().take()
    }

    pub fn is_filled(&self) -> bool {
        self.instance.borrow().is_some()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.instance.borrow().as_ref().map(f)
    }
}

// the loader script defines `createUnityInstance` and is injected once per page
#[derive(Clone, Default)]
enum Loader {
    #[default]
    Missing,
    Loading(HtmlScriptElement),
    Ready,
}

/// Unity WebGL build loaded into a canvas. Ready once the instance exists.
#[derive(Clone, Default)]
pub struct UnityRuntime {
    slot: Rc<InstanceSlot<UnityInstance>>,
    loader: Rc<RefCell<Loader>>,
}

impl UnityRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiates the build into `canvas`, injecting the loader script first
    /// if the page does not have it yet. `on_ready` runs once the instance
    /// resolves, unless `unload` or another `load` happened in between.
    pub fn load(
        &self,
        canvas: HtmlCanvasElement,
        build: &UnityBuild,
        on_ready: impl FnOnce() + 'static,
    ) -> Result<(), JsValue> {
        self.unload();
        let load = self.slot.begin();
        let config = serde_wasm_bindgen::to_value(&InstanceConfig {
            data_url: &build.data_url,
            framework_url: &build.framework_url,
            code_url: &build.code_url,
        })?;
        let slot = self.slot.clone();
        let start = move || instantiate(slot, load, canvas, config, on_ready);

        match self.loader_script(&build.loader_url)? {
            None => start(),
            Some(script) => {
                let loader = self.loader.clone();
                let onload = Closure::once_into_js(move || {
                    *loader.borrow_mut() = Loader::Ready;
                    start();
                });
                script.set_onload(Some(onload.unchecked_ref()));
            }
        }
        Ok(())
    }

    /// Quits the current instance and cancels any load still in flight.
    pub fn unload(&self) {
        if let Some(instance) = self.slot.clear() {
            quit(instance);
        }
    }

    // `None` once the loader has run, otherwise the script still loading
    fn loader_script(&self, url: &str) -> Result<Option<HtmlScriptElement>, JsValue> {
        let current = self.loader.borrow().clone();
        match current {
            Loader::Ready => Ok(None),
            Loader::Loading(script) => Ok(Some(script)),
            Loader::Missing => {
                let document = web_sys::window()
                    .and_then(|w| w.document())
                    .ok_or_else(|| JsValue::from_str("no document"))?;
                let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
                let script: HtmlScriptElement = document.create_element("script")?.dyn_into()?;
                script.set_src(url);

                let loader = self.loader.clone();
                let src = url.to_string();
                let onerror = Closure::once_into_js(move || {
                    error!("Unity loader failed to load from {}", src);
                    let failed = std::mem::take(&mut *loader.borrow_mut());
                    if let Loader::Loading(script) = failed {
                        script.remove();
                    }
                });
                script.set_onerror(Some(onerror.unchecked_ref()));
                body.append_child(&script)?;
                *self.loader.borrow_mut() = Loader::Loading(script.clone());
                Ok(Some(script))
            }
        }
    }
}

fn instantiate(
    slot: Rc<InstanceSlot<UnityInstance>>,
    load: u64,
    canvas: HtmlCanvasElement,
    config: JsValue,
    on_ready: impl FnOnce() + 'static,
) {
    if !slot.is_current(load) {
        debug!("game unloaded before the loader ran");
        return;
    }
    let promise = match create_unity_instance(&canvas, &config) {
        Ok(promise) => promise,
        Err(e) => {
            error!("createUnityInstance failed: {:?}", e);
            return;
        }
    };
    spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(instance) => match slot.finish(load, instance.unchecked_into()) {
                Ok(()) => {
                    info!("Unity instance ready");
                    on_ready();
                }
                Err(late) => {
                    debug!("game unloaded while loading, quitting the late instance");
                    quit(late);
                }
            },
            Err(e) => error!("Unity build failed to load: {:?}", e),
        }
    });
}

fn quit(instance: UnityInstance) {
    spawn_local(async move {
        if let Err(e) = JsFuture::from(instance.quit()).await {
            error!("Unity quit failed: {:?}", e);
        }
    });
}

impl PartialEq for UnityRuntime {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl GameRuntime for UnityRuntime {
    fn is_ready(&self) -> bool {
        self.slot.is_filled()
    }

    fn send_message(&self, object: &str, method: &str, payload: &str) {
        self.slot
            .with(|instance| instance.send_message(object, method, payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_load_fills_the_slot() {
        let slot = InstanceSlot::default();
        let load = slot.begin();
        assert_eq!(slot.finish(load, "game"), Ok(()));
        assert!(slot.is_filled());
        assert_eq!(slot.with(|g| g.len()), Some(4));
    }

    #[test]
    fn load_finishing_after_clear_is_handed_back() {
        let slot = InstanceSlot::default();
        let load = slot.begin();
        assert_eq!(slot.clear(), None);

        assert_eq!(slot.finish(load, "orphan"), Err("orphan"));
        assert!(!slot.is_filled());
    }

    #[test]
    fn newer_load_supersedes_older_one() {
        let slot = InstanceSlot::default();
        let first = slot.begin();
        slot.clear();
        let second = slot.begin();

        assert!(!slot.is_current(first));
        assert_eq!(slot.finish(first, 1), Err(1));
        assert_eq!(slot.finish(second, 2), Ok(()));
        assert_eq!(slot.with(|n| *n), Some(2));
    }

    #[test]
    fn clear_returns_instance_for_quitting() {
        let slot = InstanceSlot::default();
        let load = slot.begin();
        slot.finish(load, "game").unwrap();

        assert_eq!(slot.clear(), Some("game"));
        assert!(!slot.is_filled());
        assert!(!slot.is_current(load));
    }
}
