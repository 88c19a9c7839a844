//! Gaia Tappy rendering: counters, round timer, the node button with its tap
//! markers, the model shop and the notification log.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, TabBar};

use super::actions::{
    BUY_UPGRADE_BASE, CALL_AMIR, RESTART, RUN_NODE, TOGGLE_RATIO_MOBILE, TOGGLE_RATIO_PC,
};
use super::engine::RoundSnapshot;
use super::state::{LogEntry, RoundPhase};
use super::{DisplayMode, Particle, TappyGame, EFFECT_LIFETIME_MS};

const BUTTON_WIDTH: u16 = 20;

pub fn render(
    game: &TappyGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let snap = game.engine.snapshot();
    let narrow = game.display_mode == DisplayMode::Mobile || is_narrow_layout(area.width);
    let mut cs = click_state.borrow_mut();

    if narrow {
        render_narrow(game, &snap, f, area, &mut cs);
    } else {
        render_wide(game, &snap, f, area, &mut cs);
    }
}

/// PC ratio: counters on top, node and Amir side by side, shop | log below.
fn render_wide(
    game: &TappyGame,
    snap: &RoundSnapshot,
    f: &mut Frame,
    area: Rect,
    cs: &mut ClickState,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // counters
            Constraint::Length(3), // timer
            Constraint::Length(8), // node
            Constraint::Min(9),    // models | log
            Constraint::Length(3), // footer
        ])
        .split(area);

    render_counters(snap, f, chunks[0]);
    render_timer(snap, f, chunks[1]);

    let node_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(BUTTON_WIDTH + 4), Constraint::Length(24)])
        .split(chunks[2]);
    render_node(game, snap, f, node_chunks[0], cs);
    render_amir(snap, f, node_chunks[1], cs);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[3]);
    render_models(snap, f, body[0], cs);
    render_log(game.engine.log(), f, body[1]);

    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(10)])
        .split(chunks[4]);
    render_ratio_toggle(game.display_mode, f, footer[0], cs);
    render_disclaimer(f, footer[1]);
}

/// Mobile ratio: everything stacked in one column.
fn render_narrow(
    game: &TappyGame,
    snap: &RoundSnapshot,
    f: &mut Frame,
    area: Rect,
    cs: &mut ClickState,
) {
    let models_height = (snap.owned.len().max(1) + snap.shop.len() + 5) as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // counters
            Constraint::Length(3),             // timer
            Constraint::Length(8),             // node
            Constraint::Length(3),             // amir
            Constraint::Length(models_height), // models
            Constraint::Min(3),                // log
            Constraint::Length(3),             // footer
        ])
        .split(area);

    render_counters(snap, f, chunks[0]);
    render_timer(snap, f, chunks[1]);
    render_node(game, snap, f, chunks[2], cs);
    render_amir(snap, f, chunks[3], cs);
    render_models(snap, f, chunks[4], cs);
    render_log(game.engine.log(), f, chunks[5]);
    render_ratio_toggle(game.display_mode, f, chunks[6], cs);
}

fn render_counters(snap: &RoundSnapshot, f: &mut Frame, area: Rect) {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let line = Line::from(vec![
        Span::styled(" Throughputs: ", label),
        Span::styled(format!("{}/{}", snap.throughputs, snap.threshold), value),
        Span::styled("  │  Gaia Points: ", label),
        Span::styled(
            snap.points.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  │  High Score: ", label),
        Span::styled(snap.high_score.to_string(), Style::default().fg(Color::Cyan)),
        Span::styled("  │  Rounds: ", label),
        Span::styled(snap.rounds_played.to_string(), Style::default().fg(Color::White)),
    ]);
    let widget = Paragraph::new(line)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Gaia Tappy "),
        )
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn render_timer(snap: &RoundSnapshot, f: &mut Frame, area: Rect) {
    let ratio = if snap.round_seconds > 0 {
        (snap.time_remaining as f64 / snap.round_seconds as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let color = if snap.time_remaining > 5 { Color::Green } else { Color::Red };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" Time Left: {}s ", snap.time_remaining)),
        )
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio(ratio)
        .label("");
    f.render_widget(gauge, area);
}

/// The big tap button with markers floating above it.
fn render_node(
    game: &TappyGame,
    snap: &RoundSnapshot,
    f: &mut Frame,
    area: Rect,
    cs: &mut ClickState,
) {
    let running = snap.phase == RoundPhase::Running;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if running { Color::Yellow } else { Color::DarkGray }))
        .title(format!(" Node x{} ", snap.multiplier));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height < 3 || inner.width < 4 {
        return;
    }

    // rows: [0,1] markers, [2..5) button, [5] hint / restart
    let button_w = BUTTON_WIDTH.min(inner.width);
    let button_y = inner.y + inner.height.saturating_sub(4).min(2);
    let button = Rect::new(
        inner.x + (inner.width - button_w) / 2,
        button_y,
        button_w,
        inner.height.min(3),
    );

    let (label, style) = if running {
        let bg = if game.press_flash_ms > 0 { Color::White } else { Color::Yellow };
        ("Run Node", Style::default().fg(Color::Black).bg(bg).add_modifier(Modifier::BOLD))
    } else {
        ("Game Over", Style::default().fg(Color::Black).bg(Color::Gray))
    };
    let widget = Paragraph::new(Line::from(Span::styled(label, style)))
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style))
        .alignment(Alignment::Center);
    f.render_widget(widget, button);
    if running {
        cs.add_click_target(button, RUN_NODE);
    }

    let bottom = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
    if bottom.y >= button.y + button.height {
        let mut cl = ClickableList::new();
        if running {
            cl.push(Line::from(Span::styled(
                "Space / tap the button",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            cl.push_clickable(
                Line::from(Span::styled(
                    "[R] Restart",
                    Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD),
                )),
                RESTART,
            );
        }
        cl.register_targets(bottom, cs, 0, 0, 0);
        f.render_widget(
            Paragraph::new(cl.into_lines()).alignment(Alignment::Center),
            bottom,
        );
    }

    render_particles(&game.particles, f, inner, button);
}

/// Map a marker's pixel-ish offset to a cell above the button, rising as it ages.
fn particle_cell(p: &Particle, area: Rect, button: Rect) -> Option<(u16, u16)> {
    let center_x = (button.x + button.width / 2) as i32;
    let x = center_x + p.effect.x as i32 / 4;
    // y: -30 is the row just above the button, -79 one row higher
    let base_rise = ((-(p.effect.y as i32)) - 30) / 25;
    let age_rise = (p.age_ms * 2 / EFFECT_LIFETIME_MS) as i32;
    let y = button.y as i32 - 1 - base_rise - age_rise;
    let inside = x >= area.x as i32
        && x < (area.x + area.width) as i32
        && y >= area.y as i32
        && y < (area.y + area.height) as i32;
    inside.then_some((x as u16, y as u16))
}

fn render_particles(particles: &[Particle], f: &mut Frame, area: Rect, button: Rect) {
    for p in particles {
        let Some((x, y)) = particle_cell(p, area, button) else {
            continue;
        };
        let color = if p.age_ms < EFFECT_LIFETIME_MS / 3 {
            Color::White
        } else if p.age_ms < EFFECT_LIFETIME_MS * 2 / 3 {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let widget = Paragraph::new(Span::styled(
            "◆",
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        f.render_widget(widget, Rect::new(x, y, 1, 1));
    }
}

fn render_amir(snap: &RoundSnapshot, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let (text, style) = if snap.burst_active {
        (
            "Amir is on it!",
            Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else if snap.power_up_available {
        (
            "[A] Call Amir",
            Style::default().fg(Color::White).bg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else {
        ("Call Amir", Style::default().fg(Color::Gray).bg(Color::DarkGray))
    };

    let mut cl = ClickableList::new();
    if snap.power_up_available {
        cl.push_clickable(Line::from(Span::styled(text, style)), CALL_AMIR);
    } else {
        cl.push(Line::from(Span::styled(text, style)));
    }
    cl.register_targets(area, cs, 1, 1, 0);

    let widget = Paragraph::new(cl.into_lines())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(" Power-up "),
        )
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn render_models(snap: &RoundSnapshot, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        "Your Models:",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if snap.owned.is_empty() {
        cl.push(Line::from(Span::styled(
            "  No models purchased yet.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }
    for kind in &snap.owned {
        cl.push(Line::from(vec![
            Span::styled(format!("  {:<8}", kind.name()), Style::default().fg(Color::White)),
            Span::styled(format!("x{}", kind.multiplier()), Style::default().fg(Color::Green)),
        ]));
    }

    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled(
        "Purchase Models:",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for entry in &snap.shop {
        let kind = entry.kind;
        let style = if entry.affordable {
            let bg = match kind.index() {
                0 => Color::Blue,
                1 => Color::Magenta,
                _ => Color::Red,
            };
            Style::default().fg(Color::White).bg(bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let suffix = if entry.owned { " ✓" } else { "" };
        cl.push_clickable(
            Line::from(vec![
                Span::styled(
                    format!(" [{}] Buy {} ({} GP)", kind.key(), kind.name(), kind.cost()),
                    style,
                ),
                Span::styled(suffix, Style::default().fg(Color::Green)),
            ]),
            BUY_UPGRADE_BASE + kind.index() as u16,
        );
    }

    // wrapped buttons stay clickable on every row they cover
    cl.register_targets(area, cs, 1, 1, area.width.saturating_sub(2));

    let widget = Paragraph::new(cl.into_lines())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Models "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_log(log: &[LogEntry], f: &mut Frame, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let start = log.len().saturating_sub(visible);
    let lines: Vec<Line> = log[start..]
        .iter()
        .map(|entry| {
            let style = if entry.is_important {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Log "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_ratio_toggle(mode: DisplayMode, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let style = |active: bool| {
        if active {
            Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    };
    TabBar::new(" │ ")
        .tab("PC Ratio", style(mode == DisplayMode::Pc), TOGGLE_RATIO_PC)
        .tab("Mobile Ratio", style(mode == DisplayMode::Mobile), TOGGLE_RATIO_MOBILE)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .render(f, area, cs);
}

fn render_disclaimer(f: &mut Frame, area: Rect) {
    let widget = Paragraph::new(Line::from(Span::styled(
        "Purely for entertainment; not affiliated with GaiaNet or its rewards. Made with ❤ by B",
        Style::default().fg(Color::DarkGray),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .wrap(Wrap { trim: true });
    f.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tappy::config::TappyConfig;
    use crate::tappy::engine::RoundEngine;
    use crate::tappy::save::MemoryStorage;
    use crate::tappy::state::{TapEffect, UpgradeKind};
    use ratzilla::ratatui::backend::TestBackend;
    use ratzilla::ratatui::Terminal;

    fn game() -> TappyGame {
        TappyGame::new(RoundEngine::new(
            TappyConfig::default(),
            Box::new(MemoryStorage::new()),
        ))
    }

    /// Draw one frame; returns the screen rows and the registered targets.
    fn draw(
        game: &TappyGame,
        width: u16,
        height: u16,
    ) -> (Vec<String>, Rc<RefCell<ClickState>>) {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let cs = Rc::new(RefCell::new(ClickState::new()));
        terminal
            .draw(|f| {
                let area = f.area();
                game.render(f, area, &cs);
            })
            .unwrap();
        let cells: Vec<String> = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol().to_string())
            .collect();
        let rows = cells.chunks(width as usize).map(|r| r.concat()).collect();
        (rows, cs)
    }

    fn row_of(rows: &[String], needle: &str) -> Option<u16> {
        rows.iter().position(|r| r.contains(needle)).map(|i| i as u16)
    }

    #[test]
    fn counters_show_rounds_played() {
        let mut g = game();
        let (rows, _) = draw(&g, 80, 30);
        assert!(row_of(&rows, "Rounds: 0").is_some());
        g.tick(20_000);
        let (rows, _) = draw(&g, 80, 30);
        assert!(row_of(&rows, "Rounds: 1").is_some());
        assert!(row_of(&rows, "Game Over").is_some());
    }

    #[test]
    fn shop_rows_are_clickable_where_drawn() {
        let g = game();
        let (rows, cs) = draw(&g, 80, 30);
        for kind in UpgradeKind::all() {
            let row = row_of(&rows, &format!("Buy {}", kind.name())).unwrap();
            // models panel is the left half
            assert_eq!(
                cs.borrow().hit_test(5, row),
                Some(BUY_UPGRADE_BASE + kind.index() as u16)
            );
        }
    }

    #[test]
    fn narrow_screen_keeps_buy_buttons_clickable() {
        let g = game();
        let (rows, cs) = draw(&g, 40, 50);
        let row = row_of(&rows, "Buy Llama").unwrap();
        assert_eq!(cs.borrow().hit_test(1, row), Some(BUY_UPGRADE_BASE + 2));
    }

    fn particle(x: i16, y: i16, age_ms: u32) -> Particle {
        Particle {
            effect: TapEffect { id: 0, x, y },
            age_ms,
        }
    }

    #[test]
    fn fresh_marker_sits_just_above_button() {
        let area = Rect::new(0, 0, 40, 6);
        let button = Rect::new(10, 2, 20, 3);
        assert_eq!(particle_cell(&particle(0, -30, 0), area, button), Some((20, 1)));
    }

    #[test]
    fn high_marker_starts_one_row_up() {
        let area = Rect::new(0, 0, 40, 6);
        let button = Rect::new(10, 2, 20, 3);
        assert_eq!(particle_cell(&particle(-20, -79, 0), area, button), Some((15, 0)));
    }

    #[test]
    fn aging_marker_leaves_the_area() {
        let area = Rect::new(0, 0, 40, 6);
        let button = Rect::new(10, 2, 20, 3);
        assert_eq!(particle_cell(&particle(0, -30, 500), area, button), Some((20, 0)));
        assert_eq!(particle_cell(&particle(0, -79, 500), area, button), None);
    }
}
