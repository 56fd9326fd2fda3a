use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use hamprep::pool::Category;

use crate::ui::theme::Theme;

pub struct MenuItem {
    pub category: Category,
    pub key: String,
    pub status: String,
}

/// Category picker shown at startup and between study runs.
pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            items: Category::ALL
                .iter()
                .enumerate()
                .map(|(i, &category)| MenuItem {
                    category,
                    key: (i + 1).to_string(),
                    status: "Loading question pool...".to_string(),
                })
                .collect(),
            selected: 0,
            theme,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_category(&self) -> Category {
        self.items
            .get(self.selected)
            .map(|item| item.category)
            .unwrap_or_default()
    }

    pub fn select(&mut self, category: Category) {
        if let Some(i) = self.items.iter().position(|item| item.category == category) {
            self.selected = i;
        }
    }

    pub fn set_status(&mut self, category: Category, status: String) {
        if let Some(item) = self.items.iter_mut().find(|item| item.category == category) {
            item.status = status;
        }
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(inner);

        let title = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "hamprep",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Amateur Radio License Exam Practice",
                Style::default().fg(colors.fg()),
            )),
        ])
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[1]);

        for (i, (item, row)) in self.items.iter().zip(rows.iter()).enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let label_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };

            Paragraph::new(vec![
                Line::from(Span::styled(
                    format!(" {indicator} [{}] {}", item.key, item.category.label()),
                    label_style,
                )),
                Line::from(Span::styled(
                    format!("     {}", item.status),
                    Style::default().fg(colors.text_dim()),
                )),
            ])
            .render(*row, buf);
        }
    }
}
