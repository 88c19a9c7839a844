mod input;
mod tappy;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use tappy::config::TappyConfig;
use tappy::engine::RoundEngine;
use tappy::save::ScoreStorage;
use tappy::TappyGame;
use time::GameTime;

/// Query the grid container's bounding rect and convert pixel coordinates to a cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

#[cfg(target_arch = "wasm32")]
fn platform_setup() -> (TappyConfig, Box<dyn ScoreStorage>) {
    (tappy::config::load(), Box::new(tappy::save::LocalStorage))
}

#[cfg(not(target_arch = "wasm32"))]
fn platform_setup() -> (TappyConfig, Box<dyn ScoreStorage>) {
    (TappyConfig::default(), Box::new(tappy::save::MemoryStorage::new()))
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let (config, storage) = platform_setup();
    let seed = (js_sys::Math::random() * u32::MAX as f64) as u32;
    let engine = RoundEngine::new(config, storage).with_seed(seed);

    let game = Rc::new(RefCell::new(TappyGame::new(engine)));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let game_time = Rc::new(RefCell::new(GameTime::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let action = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                    .and_then(|(col, row)| cs.hit_test(col, row))
            };

            if let Some(action_id) = action {
                game.borrow_mut().handle_input(&InputEvent::Click(action_id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                game.borrow_mut().handle_input(&InputEvent::Key(c));
            }
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let elapsed = game_time.borrow_mut().update(now_ms());
            let mut game = game.borrow_mut();
            game.tick(elapsed);

            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }

            game.render(f, size, &click_state);
        }
    });

    Ok(())
}
