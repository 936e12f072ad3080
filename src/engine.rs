use crate::browser;
use anyhow::{anyhow, Error, Result};
use async_trait::async_trait;
use futures::channel::mpsc::{unbounded, UnboundedReceiver};
use futures::channel::oneshot::channel;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement, KeyboardEvent, MouseEvent};

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    /// `now` is the Performance clock in milliseconds; wall-clock timers
    /// (spawning, animation, the post-activation hold) compare against it.
    fn update(&mut self, input: &InputState, now: f64);
    fn draw(&self, renderer: &Renderer);
}

// length of a frame in milliseconds
const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut input_receiver = prepare_input()?;
        let mut game = game.initialize().await?;
        let mut input = InputState::new();
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
            accumulated_delta: 0.0,
        };
        let renderer = Renderer {
            context: browser::context()?,
        };
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            process_input(&mut input, &mut input_receiver);
            game_loop.accumulated_delta += (perf - game_loop.last_frame) as f32;
            while game_loop.accumulated_delta > FRAME_SIZE {
                game.update(&input, perf);
                // a click activates at most one simulation step
                input.clear_click();
                game_loop.accumulated_delta -= FRAME_SIZE;
            }
            game_loop.last_frame = perf;
            game.draw(&renderer);
            let _ = browser::request_animation_frame(f.borrow().as_ref().unwrap());
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

// ==================== Input ====================
// Browser events are queued on an unbounded channel by the handlers and
// drained once per animation frame, so the simulation only ever sees input
// at step boundaries.

enum InputEvent {
    KeyUp(KeyboardEvent),
    KeyDown(KeyboardEvent),
    Click(MouseEvent),
}

pub struct InputState {
    pressed_keys: HashMap<String, KeyboardEvent>,
    clicked: bool,
}

impl InputState {
    fn new() -> Self {
        InputState {
            pressed_keys: HashMap::new(),
            clicked: false,
        }
    }

    pub fn is_pressed(&self, code: &str) -> bool {
        self.pressed_keys.contains_key(code)
    }

    /// True while a canvas click is pending; cleared after the next
    /// simulation step consumes it.
    pub fn clicked(&self) -> bool {
        self.clicked
    }

    fn set_pressed(&mut self, code: &str, event: KeyboardEvent) {
        self.pressed_keys.insert(code.into(), event);
    }

    fn set_released(&mut self, code: &str) {
        self.pressed_keys.remove(code);
    }

    fn clear_click(&mut self) {
        self.clicked = false;
    }
}

fn prepare_input() -> Result<UnboundedReceiver<InputEvent>> {
    let (sender, receiver) = unbounded();
    let keydown_sender = Rc::new(RefCell::new(sender));
    let keyup_sender = Rc::clone(&keydown_sender);
    let click_sender = Rc::clone(&keydown_sender);

    let onkeydown = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
        let _ = keydown_sender
            .borrow_mut()
            .start_send(InputEvent::KeyDown(event));
    }) as Box<dyn FnMut(KeyboardEvent)>);

    let onkeyup = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
        let _ = keyup_sender
            .borrow_mut()
            .start_send(InputEvent::KeyUp(event));
    }) as Box<dyn FnMut(KeyboardEvent)>);

    let onclick = browser::closure_wrap(Box::new(move |event: MouseEvent| {
        let _ = click_sender
            .borrow_mut()
            .start_send(InputEvent::Click(event));
    }) as Box<dyn FnMut(MouseEvent)>);

    browser::window()?.set_onkeydown(Some(onkeydown.as_ref().unchecked_ref()));
    browser::window()?.set_onkeyup(Some(onkeyup.as_ref().unchecked_ref()));
    browser::canvas()?.set_onclick(Some(onclick.as_ref().unchecked_ref()));
    onkeydown.forget();
    onkeyup.forget();
    onclick.forget();

    Ok(receiver)
}

fn process_input(state: &mut InputState, receiver: &mut UnboundedReceiver<InputEvent>) {
    loop {
        match receiver.try_next() {
            Ok(None) => break,
            Err(_err) => break,
            Ok(Some(event)) => match event {
                InputEvent::KeyUp(event) => state.set_released(&event.code()),
                InputEvent::KeyDown(event) => state.set_pressed(&event.code(), event),
                InputEvent::Click(_) => state.clicked = true,
            },
        };
    }
}

// ==================== Geometry ====================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict overlap test : rectangles that merely share an edge do not
    /// intersect.
    pub fn intersects(&self, rect: &Rect) -> bool {
        self.x < rect.right()
            && self.right() > rect.x
            && self.y < rect.bottom()
            && self.bottom() > rect.y
    }
}

// ==================== Sprite sheet ====================

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Sheet {
    pub frames: HashMap<String, Cell>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Cell {
    pub frame: SheetRect,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SheetRect {
    pub x: i16,
    pub y: i16,
    pub w: i16,
    pub h: i16,
}

// ==================== Renderer ====================

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    pub fn draw_image(&self, image: &HtmlImageElement, frame: &Rect, destination: &Rect) {
        self.context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                frame.x.into(),
                frame.y.into(),
                frame.width.into(),
                frame.height.into(),
                destination.x.into(),
                destination.y.into(),
                destination.width.into(),
                destination.height.into(),
            )
            .expect("Drawing is throwing exceptions! Unrecoverable error");
    }

    /// Draw the whole image stretched over `destination`.
    pub fn draw_scaled_image(&self, image: &HtmlImageElement, destination: &Rect) {
        self.context
            .draw_image_with_html_image_element_and_dw_and_dh(
                image,
                destination.x.into(),
                destination.y.into(),
                destination.width.into(),
                destination.height.into(),
            )
            .expect("Drawing is throwing exceptions! Unrecoverable error");
    }

    pub fn fill_rect(&self, rect: &Rect, style: &str) {
        self.context.set_fill_style_str(style);
        self.context.fill_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    pub fn text(&self, text: &str, location: &Point, font: &str, style: &str, align: &str) {
        self.context.set_font(font);
        self.context.set_fill_style_str(style);
        self.context.set_text_align(align);
        self.context
            .fill_text(text, location.x.into(), location.y.into())
            .expect("Text drawing is throwing exceptions! Unrecoverable error");
    }

    #[cfg(debug_assertions)]
    pub fn draw_rect(&self, bounding_box: &Rect) {
        self.context.set_stroke_style_str("#FF0000");
        self.context.stroke_rect(
            bounding_box.x.into(),
            bounding_box.y.into(),
            bounding_box.width.into(),
            bounding_box.height.into(),
        );
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine.rs::load_image] Error loading image: {:#?}",
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    rx.await??;

    Ok(image)
}
