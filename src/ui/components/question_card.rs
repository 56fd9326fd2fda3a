use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::app::{Notice, QuestionView};
use crate::ui::theme::Theme;

/// Prompt, reference and numbered options, with the learner's pick and the
/// correct answer highlighted once feedback arrives.
pub struct QuestionCard<'a> {
    view: Option<&'a QuestionView>,
    notice: Option<&'a Notice>,
    theme: &'a Theme,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OptionMark {
    Plain,
    Correct,
    Missed,
}

impl<'a> QuestionCard<'a> {
    pub fn new(view: Option<&'a QuestionView>, notice: Option<&'a Notice>, theme: &'a Theme) -> Self {
        Self { view, notice, theme }
    }

    fn mark(view: &QuestionView, index: usize) -> OptionMark {
        let Some(feedback) = view.feedback.as_ref() else {
            return OptionMark::Plain;
        };
        if view.options[index] == feedback.correct_option {
            OptionMark::Correct
        } else if view.chosen == Some(index) {
            OptionMark::Missed
        } else {
            OptionMark::Plain
        }
    }

    fn notice_lines(&self, notice: &Notice) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        match notice {
            Notice::Loading(category) => vec![Line::from(Span::styled(
                format!("Loading the {} question pool...", category.label()),
                Style::default().fg(colors.text_dim()),
            ))],
            Notice::Unavailable(category, reason) => vec![
                Line::from(Span::styled(
                    format!("Cannot load the {} question pool.", category.label()),
                    Style::default()
                        .fg(colors.error())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    reason.clone(),
                    Style::default().fg(colors.text_dim()),
                )),
            ],
        }
    }

    fn question_lines(&self, view: &QuestionView) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let mut lines = vec![
            Line::from(Span::styled(
                view.prompt.clone(),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
        ];
        if let Some(reference) = view.reference.as_ref() {
            lines.push(Line::from(Span::styled(
                format!("Reference: {reference}"),
                Style::default().fg(colors.text_dim()),
            )));
        }
        lines.push(Line::from(""));

        for (i, option) in view.options.iter().enumerate() {
            let style = match Self::mark(view, i) {
                OptionMark::Correct => Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
                OptionMark::Missed => Style::default()
                    .fg(colors.error())
                    .add_modifier(Modifier::CROSSED_OUT),
                OptionMark::Plain => Style::default().fg(colors.fg()),
            };
            let pointer = if view.chosen == Some(i) { ">" } else { " " };
            lines.push(Line::from(Span::styled(
                format!(" {pointer} {}. {option}", i + 1),
                style,
            )));
        }

        if let Some(feedback) = view.feedback.as_ref() {
            lines.push(Line::from(""));
            let line = if feedback.is_correct {
                Span::styled("Correct!", Style::default().fg(colors.success()))
            } else {
                Span::styled(
                    format!("Incorrect. The answer is: {}", feedback.correct_option),
                    Style::default().fg(colors.warning()),
                )
            };
            lines.push(Line::from(line));
        }
        lines
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = match (self.notice, self.view) {
            (Some(notice), _) => self.notice_lines(notice),
            (None, Some(view)) => self.question_lines(view),
            (None, None) => Vec::new(),
        };

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
