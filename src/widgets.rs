//! Reusable clickable UI components.
//!
//! Each component renders and registers its own click targets, so what the
//! player sees and what a tap hits can't drift apart.
//!
//! - [`TabBar`]: a row of selectable labels (the PC/Mobile ratio switch).
//! - [`ClickableList`]: vertical lines with per-row click targets.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Paragraph};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── TabBar ─────────────────────────────────────────────────────

/// A single row of labels separated by `separator`. Click targets follow the
/// rendered label widths.
///
/// ```ignore
/// TabBar::new(" │ ")
///     .tab("PC Ratio", style_pc, TOGGLE_RATIO_PC)
///     .tab("Mobile Ratio", style_mobile, TOGGLE_RATIO_MOBILE)
///     .render(f, area, &mut cs);
/// ```
pub struct TabBar<'a> {
    tabs: Vec<(String, Style, u16)>,
    separator: &'a str,
    block: Option<Block<'a>>,
}

impl<'a> TabBar<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self {
            tabs: Vec::new(),
            separator,
            block: None,
        }
    }

    pub fn tab(mut self, label: impl Into<String>, style: Style, action_id: u16) -> Self {
        self.tabs.push((label.into(), style, action_id));
        self
    }

    /// Wrap in a [`Block`]; targets are placed inside `Block::inner()`.
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let mut spans: Vec<Span> = Vec::new();
        let sep_width = Line::from(self.separator).width() as u16;
        let mut widths: Vec<(u16, u16)> = Vec::new();

        for (i, (label, style, action_id)) in self.tabs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(
                    self.separator,
                    Style::default().fg(Color::DarkGray),
                ));
            }
            let padded = format!(" {} ", label);
            widths.push((Line::from(padded.as_str()).width() as u16, *action_id));
            spans.push(Span::styled(padded, *style));
        }

        let inner = match &self.block {
            Some(block) => block.inner(area),
            None => area,
        };

        let line = Line::from(spans);
        let paragraph = match self.block {
            Some(block) => Paragraph::new(line).block(block),
            None => Paragraph::new(line),
        };
        f.render_widget(paragraph, area);

        // Full outer height for tap tolerance.
        cs.register_tab_targets(
            &widths,
            sep_width,
            inner.x,
            area.y,
            inner.width,
            area.height.max(1),
        );
    }
}

// ── ClickableList ──────────────────────────────────────────────

/// Lines paired with click actions. Targets are registered by line index,
/// so inserting a header above a button moves its target with it.
///
/// ```ignore
/// let mut cl = ClickableList::new();
/// cl.push(Line::from("Purchase Models:"));
/// cl.push_clickable(Line::from("[1] Buy Qwen (20 GP)"), BUY_UPGRADE_BASE);
/// cl.register_targets(area, &mut cs, 1, 1, area.width - 2);
/// f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
/// ```
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)`.
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        let idx = self.lines.len() as u16;
        self.actions.push((idx, action_id));
        self.lines.push(line);
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register click targets for all clickable lines.
    ///
    /// * `top_offset` / `bottom_offset`: rows taken by borders.
    /// * `inner_width`: wrap width; `0` means the widget doesn't wrap and
    ///   every line is one row.
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top_offset: u16,
        bottom_offset: u16,
        inner_width: u16,
    ) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);

        let w = inner_width as usize;
        let mut visual_starts: Vec<u16> = Vec::with_capacity(self.lines.len());
        let mut visual_heights: Vec<u16> = Vec::with_capacity(self.lines.len());
        let mut cumulative: u16 = 0;
        for line in &self.lines {
            visual_starts.push(cumulative);
            let lw = line.width();
            let h = if w == 0 || lw <= w { 1 } else { lw.div_ceil(w) as u16 };
            visual_heights.push(h);
            cumulative += h;
        }

        for &(line_idx, action_id) in &self.actions {
            let li = line_idx as usize;
            if li >= self.lines.len() {
                continue;
            }
            for r in 0..visual_heights[li] {
                let screen_row = content_y + visual_starts[li] + r;
                if screen_row >= content_end {
                    break;
                }
                cs.add_row_target(area, screen_row, action_id);
            }
        }
    }
}
