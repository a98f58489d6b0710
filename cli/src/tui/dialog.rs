// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{cell::RefCell, rc::Rc};

use ratatui::crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::symbols::border;
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use synccal_core::{Device, Viewport};
use unicode_width::UnicodeWidthStr;

use crate::tui::dispatcher::{Action, Dispatcher, EventKind, Target};

/// What the dialog shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogContent {
    pub title: String,
    pub lines: Vec<String>,
}

impl DialogContent {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    /// Width needed to show every line, borders included.
    fn width(&self) -> u16 {
        let widest = self
            .lines
            .iter()
            .map(|a| a.width())
            .chain(std::iter::once(self.title.width() + 2))
            .max()
            .unwrap_or(0);
        u16::try_from(widest + 4).unwrap_or(u16::MAX)
    }

    fn height(&self) -> u16 {
        u16::try_from(self.lines.len() + 2).unwrap_or(u16::MAX)
    }
}

/// Per-show overrides of the dialog's look.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleOverrides {
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub border_style: Option<Style>,
}

/// The single modal region shared by the whole screen.
#[derive(Debug)]
pub struct DialogPresenter {
    device: Device,
    viewport: Viewport,
    content: Option<DialogContent>,
    overrides: StyleOverrides,
}

impl DialogPresenter {
    pub fn new(device: Device, viewport: Viewport) -> Self {
        Self {
            device,
            viewport,
            content: None,
            overrides: StyleOverrides::default(),
        }
    }

    pub fn register_to(that: Rc<RefCell<Self>>, dispatcher: &mut Dispatcher) {
        let on_key = {
            let that = that.clone();
            Rc::new(RefCell::new(move |action: &Action| {
                if let Action::Key(key) = action {
                    that.borrow_mut().on_key(*key);
                }
            }))
        };
        dispatcher.on(Target::Dialog, EventKind::Key, on_key);

        let on_resize = Rc::new(RefCell::new(move |action: &Action| {
            if let Action::Resize(viewport) = action {
                that.borrow_mut().resize(*viewport);
            }
        }));
        dispatcher.on(Target::Screen, EventKind::Resize, on_resize);
    }

    /// Replaces whatever is shown.
    pub fn show(&mut self, content: DialogContent, overrides: StyleOverrides) {
        tracing::debug!(title = %content.title, "showing dialog");
        self.content = Some(content);
        self.overrides = overrides;
    }

    pub fn close(&mut self) {
        self.content = None;
        self.overrides = StyleOverrides::default();
    }

    pub fn is_visible(&self) -> bool {
        self.content.is_some()
    }

    /// Closes the dialog on escape, returns whether the key was consumed.
    pub fn on_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Esc if self.is_visible() => {
                self.close();
                true
            }
            _ => false,
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Area of the dialog centered in the viewport, `None` when hidden.
    ///
    /// The height is capped to the viewport except on small screens, where the
    /// dialog may run past the bottom and gets clipped when rendered.
    pub fn placement(&self) -> Option<Rect> {
        let content = self.content.as_ref()?;
        let Viewport { width, height } = self.viewport;

        let w = self.overrides.width.unwrap_or_else(|| content.width());
        let w = w.min(width);
        let h = self.overrides.height.unwrap_or_else(|| content.height());
        let h = match self.device.is_small_screen() {
            true => h,
            false => h.min(height),
        };

        let left = (width - w) / 2;
        let top = height.saturating_sub(h) / 2;
        Some(Rect::new(left, top, w, h))
    }

    /// Draws the dialog over the buffer, anything outside the buffer is dropped.
    pub fn render(&self, buf: &mut Buffer) {
        let (Some(content), Some(area)) = (self.content.as_ref(), self.placement()) else {
            return;
        };
        let area = area.intersection(buf.area);
        if area.is_empty() {
            tracing::debug!(?area, "dialog out of the screen, skipped");
            return;
        }

        let title = Line::from(format!(" {} ", content.title).bold());
        let block = Block::bordered()
            .border_set(border::ROUNDED)
            .border_style(self.overrides.border_style.unwrap_or_default())
            .title(title.centered())
            .title_bottom(Line::from(vec![" Close ".into(), "<Esc> ".blue().bold()]).centered());

        let lines: Vec<Line> = content.lines.iter().map(|a| Line::from(a.as_str())).collect();
        Clear.render(area, buf);
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
