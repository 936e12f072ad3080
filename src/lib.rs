// ==================== Imports ====================
use engine::GameLoop;
use game::FlappyShark;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
mod browser;
mod engine;
mod game;
mod leaderboard;
mod sim;

// ==================== Main Functions ====================
/// Main entry for the Webassembly module
/// - initializes panic reporting
/// - sizes the canvas to the game viewport
/// - starts the game loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    let canvas = browser::canvas().expect("canvas should be an HtmlCanvasElement");
    canvas.set_width(sim::VIEWPORT_WIDTH as u32);
    canvas.set_height(sim::VIEWPORT_HEIGHT as u32);

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        GameLoop::start(FlappyShark::new())
            .await
            .expect("Could not start game loop");
    });

    Ok(())
}
