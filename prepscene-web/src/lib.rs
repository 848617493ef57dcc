/// Prepscene Web - live scene view mounted into a browser container
///
/// `WebRenderer::mount` owns everything it creates in the page: the canvas,
/// its event listeners, a resize observer and the animation frame loop.
/// `dispose` (or dropping the renderer) releases all of it.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use prepscene_core::{LiveView, SceneConfig, SceneError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, HtmlElement, PointerEvent,
    ResizeObserver, WheelEvent, Window,
};

mod canvas;

#[wasm_bindgen(start)]
pub fn initialize() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    init_logger();
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

fn to_js(err: SceneError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn surface_error(msg: &str) -> JsValue {
    to_js(SceneError::surface(msg))
}

/// Parse the scene handed over from JavaScript.
fn parse_scene(scene_json: &str) -> Result<SceneConfig, SceneError> {
    SceneConfig::from_json(scene_json)
}

/// Canvas, view state and device pixel ratio shared by all callbacks.
struct Stage {
    view: LiveView,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    pixel_ratio: f64,
}

impl Stage {
    fn fit_to(&mut self, container: &HtmlElement) {
        let width = container.client_width().max(1);
        let height = container.client_height().max(1);
        self.canvas
            .set_width((f64::from(width) * self.pixel_ratio).round() as u32);
        self.canvas
            .set_height((f64::from(height) * self.pixel_ratio).round() as u32);
        self.view.resize(width as f32, height as f32);
    }

    fn paint(&self) {
        if let Err(err) = canvas::paint(&self.context, &self.view.frame(), self.pixel_ratio) {
            log::warn!("failed to paint frame: {err:?}");
        }
    }
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }

    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `requestAnimationFrame` loop that ticks and repaints the stage.
struct FrameLoop {
    callback: FrameCallback,
    handle: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    fn start(window: &Window, stage: Rc<RefCell<Stage>>) -> Result<Self, JsValue> {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(None));

        let next = Rc::clone(&callback);
        let next_handle = Rc::clone(&handle);
        let scheduler = window.clone();
        *callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
            {
                let mut stage = stage.borrow_mut();
                stage.view.tick(timestamp / 1000.0);
                stage.paint();
            }
            if let Some(cb) = next.borrow().as_ref() {
                next_handle.set(
                    scheduler
                        .request_animation_frame(cb.as_ref().unchecked_ref())
                        .ok(),
                );
            }
        }));

        if let Some(cb) = callback.borrow().as_ref() {
            handle.set(Some(
                window.request_animation_frame(cb.as_ref().unchecked_ref())?,
            ));
        }
        Ok(Self { callback, handle })
    }

    fn stop(&self, window: &Window) {
        if let Some(id) = self.handle.take() {
            let _ = window.cancel_animation_frame(id);
        }
        // Breaks the self-reference held by the callback.
        self.callback.borrow_mut().take();
    }
}

/// Live renderer for one container element.
#[wasm_bindgen]
pub struct WebRenderer {
    window: Window,
    container: HtmlElement,
    stage: Rc<RefCell<Stage>>,
    listeners: Vec<Listener>,
    observer: Option<ResizeObserver>,
    on_resize: Option<Closure<dyn FnMut()>>,
    frames: Option<FrameLoop>,
}

#[wasm_bindgen]
impl WebRenderer {
    /// Mount a scene into the element with id `container_id`.
    ///
    /// Fails without touching the page when the scene does not parse, the
    /// container is missing or no 2D context is available.
    pub fn mount(container_id: &str, scene_json: &str) -> Result<WebRenderer, JsValue> {
        let scene = parse_scene(scene_json).map_err(to_js)?;

        let window = web_sys::window().ok_or_else(|| surface_error("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| surface_error("no document"))?;
        let container: HtmlElement = document
            .get_element_by_id(container_id)
            .ok_or_else(|| surface_error(&format!("no element with id `{container_id}`")))?
            .dyn_into()
            .map_err(|_| surface_error(&format!("`{container_id}` is not an HTML element")))?;

        let canvas: HtmlCanvasElement = document
            .create_element("canvas")?
            .dyn_into()
            .map_err(|_| surface_error("could not create a canvas"))?;
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| surface_error("2d context unavailable"))?
            .dyn_into()
            .map_err(|_| surface_error("unexpected context type"))?;

        let style = canvas.style();
        style.set_property("display", "block")?;
        style.set_property("width", "100%")?;
        style.set_property("height", "100%")?;
        style.set_property("touch-action", "none")?;

        let mut stage = Stage {
            view: LiveView::new(scene, 1.0, 1.0),
            canvas: canvas.clone(),
            context,
            pixel_ratio: window.device_pixel_ratio().max(1.0),
        };
        stage.fit_to(&container);

        container.append_child(&canvas)?;
        let mut renderer = WebRenderer {
            window: window.clone(),
            container,
            stage: Rc::new(RefCell::new(stage)),
            listeners: Vec::new(),
            observer: None,
            on_resize: None,
            frames: None,
        };

        // Anything that fails from here on is unwound by Drop.
        renderer.install_listeners(&canvas)?;
        renderer.observe_resize()?;
        renderer.frames = Some(FrameLoop::start(&window, Rc::clone(&renderer.stage))?);
        log::debug!("mounted scene into #{container_id}");
        Ok(renderer)
    }

    /// Return the camera to the scene's default pose.
    pub fn reset(&self) {
        self.stage.borrow_mut().view.reset();
    }

    /// Restart the ball's motion from the start of its path.
    #[wasm_bindgen(js_name = playAnimation)]
    pub fn play_animation(&self) {
        let now = self
            .window
            .performance()
            .map_or(0.0, |performance| performance.now() / 1000.0);
        self.stage.borrow_mut().view.play_animation(now);
    }

    /// Tear down the canvas, listeners, observer and frame loop.
    pub fn dispose(&mut self) {
        if let Some(frames) = self.frames.take() {
            frames.stop(&self.window);
        }
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.on_resize = None;
        let stage = self.stage.borrow();
        if stage.canvas.parent_node().is_some() {
            stage.canvas.remove();
            log::debug!("unmounted scene");
        }
    }
}

impl WebRenderer {
    fn install_listeners(&mut self, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
        let target: &EventTarget = canvas.as_ref();

        let stage = Rc::clone(&self.stage);
        let capture = canvas.clone();
        self.listeners
            .push(Listener::attach(target, "pointerdown", move |event| {
                if let Some(event) = event.dyn_ref::<PointerEvent>() {
                    let _ = capture.set_pointer_capture(event.pointer_id());
                    stage
                        .borrow_mut()
                        .view
                        .pointer_down(event.offset_x() as f32, event.offset_y() as f32);
                }
            })?);

        let stage = Rc::clone(&self.stage);
        self.listeners
            .push(Listener::attach(target, "pointermove", move |event| {
                if let Some(event) = event.dyn_ref::<PointerEvent>() {
                    stage
                        .borrow_mut()
                        .view
                        .pointer_move(event.offset_x() as f32, event.offset_y() as f32);
                }
            })?);

        for kind in ["pointerup", "pointercancel"] {
            let stage = Rc::clone(&self.stage);
            self.listeners.push(Listener::attach(target, kind, move |_| {
                stage.borrow_mut().view.pointer_up();
            })?);
        }

        let stage = Rc::clone(&self.stage);
        self.listeners.push(Listener::attach(target, "wheel", move |event| {
            if let Some(wheel) = event.dyn_ref::<WheelEvent>() {
                event.prevent_default();
                let steps = wheel.delta_y().signum() as f32;
                stage.borrow_mut().view.zoom(steps);
            }
        })?);
        Ok(())
    }

    fn observe_resize(&mut self) -> Result<(), JsValue> {
        let stage = Rc::clone(&self.stage);
        let container = self.container.clone();
        let on_resize = Closure::<dyn FnMut()>::new(move || {
            stage.borrow_mut().fit_to(&container);
        });
        let observer = ResizeObserver::new(on_resize.as_ref().unchecked_ref())?;
        observer.observe(&self.container);
        self.observer = Some(observer);
        self.on_resize = Some(on_resize);
        Ok(())
    }
}

impl Drop for WebRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scene() {
        let scene = parse_scene(r#"{"kind": "cube", "cube": {"variant": "twoCubes"}}"#).unwrap();
        assert!(scene.as_cube().is_some());
    }

    #[test]
    fn test_parse_scene_rejects_unknown_kind() {
        let err = parse_scene(r#"{"kind": "teapot"}"#).unwrap_err();
        assert!(matches!(err, SceneError::Catalog(_)));
    }
}
