use crate::browser;
use crate::engine;
use crate::engine::{Game, InputState, Point, Rect, Renderer, Sheet};
use crate::leaderboard::{Leaderboard, Profile};
use crate::sim::pipe::Pipe;
use crate::sim::state::{Event, SessionMachine};
use crate::sim::{World, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::join;
use rand::thread_rng;
use web_sys::HtmlImageElement;

const SHARK_CELL: &str = "shark.png";
const BUBBLE_CELL: &str = "bubble.png";

const TEXT_FONT: &str = "16px Arial";
const HEADLINE_FONT: &str = "20px Arial";

pub enum FlappyShark {
    /// Initial state while resources are being loaded
    /// Transition to `Loaded` once initialization is complete
    Loading,

    /// Active game state with every asset and the player profile in hand
    Loaded(Reef),
}

impl FlappyShark {
    const SHEET_PATH: &'static str = "sprites.json";
    const IMAGE_PATH: &'static str = "sprites.png";
    const BACKGROUND_PATH: &'static str = "background.png";

    pub fn new() -> Self {
        FlappyShark::Loading
    }

    async fn load_sprite_sheet() -> Result<Sheet> {
        browser::fetch_json::<Sheet>(Self::SHEET_PATH)
            .await
            .with_context(|| format!("Failed to load sprite sheet from : {}", Self::SHEET_PATH))
    }

    async fn load_sprite_image() -> Result<HtmlImageElement> {
        engine::load_image(Self::IMAGE_PATH).await.with_context(|| {
            format!(
                "Failed to load sprite image resource from : {}",
                Self::IMAGE_PATH
            )
        })
    }
}

#[async_trait(?Send)]
impl Game for FlappyShark {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            FlappyShark::Loading => {
                let (sheet_result, image_result) =
                    join!(Self::load_sprite_sheet(), Self::load_sprite_image());
                let sheet = sheet_result?;
                let sprites = image_result?;
                let background = engine::load_image(Self::BACKGROUND_PATH)
                    .await
                    .with_context(|| {
                        format!("Failed to load background from : {}", Self::BACKGROUND_PATH)
                    })?;

                let mut rng = thread_rng();
                let profile = Profile::load_or_register(&mut rng)?;
                let leaderboard = Leaderboard::load();
                let machine = SessionMachine::new(&mut rng, browser::now()?);

                Ok(Box::new(FlappyShark::Loaded(Reef {
                    machine: Some(machine),
                    sheet,
                    sprites,
                    background,
                    profile,
                    leaderboard,
                    space_down: false,
                })))
            }
            FlappyShark::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, input: &InputState, now: f64) {
        if let FlappyShark::Loaded(reef) = self {
            // keydown auto-repeat never releases the key, so only a fresh
            // press counts as an activation
            let space_pressed = input.is_pressed("Space");
            let activated = input.clicked() || (space_pressed && !reef.space_down);
            reef.space_down = space_pressed;

            if let Some(machine) = reef.machine.take() {
                let mut rng = thread_rng();
                let was_over = machine.is_over();

                let machine = if activated {
                    machine.transition(Event::Activate, &mut rng, now)
                } else {
                    machine
                };
                let machine = machine.transition(Event::Tick, &mut rng, now);

                if machine.is_over() && !was_over {
                    reef.leaderboard.record(&reef.profile, machine.score());
                    if let Err(err) = reef.leaderboard.save() {
                        log!("Could not persist the score table : {:#?}", err);
                    }
                }
                reef.machine = Some(machine);
            }
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let FlappyShark::Loaded(reef) = self {
            renderer.clear(&Rect::new(0.0, 0.0, VIEWPORT_WIDTH, VIEWPORT_HEIGHT));
            if let Some(machine) = &reef.machine {
                reef.draw_world(machine.world(), renderer);
                match machine {
                    SessionMachine::Ready(_) => reef.draw_title(renderer),
                    SessionMachine::Playing(_) => reef.draw_score(machine.score(), renderer),
                    SessionMachine::GameOver(_) => {
                        reef.draw_score(machine.score(), renderer);
                        reef.draw_game_over(machine.score(), renderer);
                    }
                }
            }
        }
    }
}

pub struct Reef {
    machine: Option<SessionMachine>,
    sheet: Sheet,
    sprites: HtmlImageElement,
    background: HtmlImageElement,
    profile: Profile,
    leaderboard: Leaderboard,
    space_down: bool,
}

impl Reef {
    fn draw_world(&self, world: &World, renderer: &Renderer) {
        self.draw_background(world.background_offset(), renderer);
        self.draw_cell(SHARK_CELL, &world.shark().bounding_box(), renderer);
        for pair in world.pipes() {
            self.draw_pipe(pair.top(), renderer);
            self.draw_pipe(pair.bottom(), renderer);
        }
        for bubble in world.bubbles() {
            self.draw_cell(BUBBLE_CELL, bubble.bounding_box(), renderer);
        }

        #[cfg(debug_assertions)]
        {
            renderer.draw_rect(&world.shark().bounding_box());
            for pair in world.pipes() {
                renderer.draw_rect(pair.top().bounding_box());
                renderer.draw_rect(pair.bottom().bounding_box());
            }
        }
    }

    /// Two copies of the backdrop stitched at the scroll offset cover the
    /// whole viewport for any offset in `[0, VIEWPORT_WIDTH)`.
    fn draw_background(&self, offset: f32, renderer: &Renderer) {
        let first = Rect::new(-offset, 0.0, VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
        let second = Rect::new(VIEWPORT_WIDTH - offset, 0.0, VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
        renderer.draw_scaled_image(&self.background, &first);
        renderer.draw_scaled_image(&self.background, &second);
    }

    fn draw_pipe(&self, pipe: &Pipe, renderer: &Renderer) {
        let cell_name = format!("jellyfish_{}.png", pipe.frame());
        self.draw_cell(&cell_name, pipe.bounding_box(), renderer);
    }

    fn draw_cell(&self, name: &str, destination: &Rect, renderer: &Renderer) {
        match self.sheet.frames.get(name) {
            Some(sprite) => renderer.draw_image(
                &self.sprites,
                &Rect::new(
                    sprite.frame.x as f32,
                    sprite.frame.y as f32,
                    sprite.frame.w as f32,
                    sprite.frame.h as f32,
                ),
                destination,
            ),
            None => log!("WARNING sprite cell missing : {}", name),
        }
    }

    fn draw_score(&self, score: u32, renderer: &Renderer) {
        renderer.text(
            &format!("Score: {}", score),
            &Point { x: 30.0, y: 50.0 },
            TEXT_FONT,
            "white",
            "left",
        );
    }

    fn draw_title(&self, renderer: &Renderer) {
        renderer.text(
            "Flappy Baby Shark",
            &Point {
                x: VIEWPORT_WIDTH / 2.0,
                y: VIEWPORT_HEIGHT / 2.0 - 50.0,
            },
            HEADLINE_FONT,
            "white",
            "center",
        );
        renderer.text(
            "Press Space or click to start",
            &Point {
                x: VIEWPORT_WIDTH / 2.0,
                y: VIEWPORT_HEIGHT / 2.0,
            },
            TEXT_FONT,
            "white",
            "center",
        );
    }

    /// The crashed world stays visible behind a dimming overlay, with the
    /// final score and the score table on top.
    fn draw_game_over(&self, score: u32, renderer: &Renderer) {
        renderer.fill_rect(
            &Rect::new(0.0, 0.0, VIEWPORT_WIDTH, VIEWPORT_HEIGHT),
            "rgba(0, 0, 0, 0.5)",
        );

        let center_x = VIEWPORT_WIDTH / 2.0;
        renderer.text(
            "Game Over!",
            &Point {
                x: center_x,
                y: VIEWPORT_HEIGHT / 2.0 - 50.0,
            },
            HEADLINE_FONT,
            "white",
            "center",
        );
        renderer.text(
            &format!("Score: {}", score),
            &Point {
                x: center_x,
                y: VIEWPORT_HEIGHT / 2.0,
            },
            HEADLINE_FONT,
            "white",
            "center",
        );
        renderer.text(
            "Press Space or click to restart",
            &Point {
                x: center_x,
                y: VIEWPORT_HEIGHT / 2.0 + 40.0,
            },
            TEXT_FONT,
            "white",
            "center",
        );

        let mut line_y = VIEWPORT_HEIGHT / 2.0 + 90.0;
        renderer.text(
            "Leaderboard",
            &Point {
                x: center_x,
                y: line_y,
            },
            TEXT_FONT,
            "white",
            "center",
        );
        for entry in self.leaderboard.entries() {
            line_y += 24.0;
            renderer.text(
                &format!("{} {}: {}", entry.emoji, entry.name, entry.score),
                &Point {
                    x: center_x,
                    y: line_y,
                },
                TEXT_FONT,
                "white",
                "center",
            );
        }
    }
}
