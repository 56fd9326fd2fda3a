use anyhow::Result;
use rand::rngs::SmallRng;
use tracing::debug;

use hamprep::config::Config;
use hamprep::engine::SelectionEngine;
use hamprep::error::StudyError;
use hamprep::pool::{Category, QuestionPool};
use hamprep::session::{DisplaySink, PoolSlot, ProgressSummary, SessionController};
use hamprep::store::ProgressStore;

use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Question,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub is_correct: bool,
    pub correct_option: String,
}

/// What the question screen draws for the current question.
#[derive(Clone, Debug, Default)]
pub struct QuestionView {
    pub prompt: String,
    pub reference: Option<String>,
    pub options: Vec<String>,
    pub chosen: Option<usize>,
    pub feedback: Option<Feedback>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Loading(Category),
    Unavailable(Category, String),
}

/// Display sink that keeps the latest rendered state for the next frame.
#[derive(Debug, Default)]
pub struct ScreenSink {
    pub question: Option<QuestionView>,
    pub summary: Option<ProgressSummary>,
    pub notice: Option<Notice>,
}

impl ScreenSink {
    pub fn mark_choice(&mut self, index: usize) {
        if let Some(view) = self.question.as_mut() {
            view.chosen = Some(index);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl DisplaySink for ScreenSink {
    fn render_question(&mut self, prompt: &str, reference: Option<&str>, options: &[String]) {
        self.notice = None;
        self.question = Some(QuestionView {
            prompt: prompt.to_string(),
            reference: reference.map(str::to_string),
            options: options.to_vec(),
            chosen: None,
            feedback: None,
        });
    }

    fn render_feedback(&mut self, is_correct: bool, correct_option: &str) {
        if let Some(view) = self.question.as_mut() {
            view.feedback = Some(Feedback {
                is_correct,
                correct_option: correct_option.to_string(),
            });
        }
    }

    fn render_progress_summary(&mut self, summary: &ProgressSummary) {
        self.summary = Some(*summary);
    }

    fn render_unavailable(&mut self, category: Category, reason: &str) {
        self.question = None;
        self.notice = Some(Notice::Unavailable(category, reason.to_string()));
    }

    fn render_loading(&mut self, category: Category) {
        self.question = None;
        self.notice = Some(Notice::Loading(category));
    }
}

pub struct App {
    pub screen: AppScreen,
    pub controller: SessionController<ScreenSink, SmallRng>,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        config: &Config,
        theme: &'static Theme,
        store: ProgressStore,
        rng: SmallRng,
        initial: Category,
    ) -> Self {
        let engine = SelectionEngine::new(config.batch_policy());
        let controller = SessionController::new(store, engine, ScreenSink::default(), rng, initial);
        let mut menu = Menu::new(theme);
        menu.select(initial);

        Self {
            screen: AppScreen::Menu,
            controller,
            menu,
            theme,
            should_quit: false,
        }
    }

    pub fn view(&self) -> &ScreenSink {
        self.controller.sink()
    }

    pub fn pool_loaded(&mut self, category: Category, loaded: Result<QuestionPool>) {
        self.controller.install_pool(category, loaded);
        self.refresh_menu_status(category);

        // A learner already waiting on this category gets their question now
        let waiting = self.screen == AppScreen::Question
            && self.controller.current_category() == category
            && matches!(self.view().notice, Some(Notice::Loading(_)));
        if waiting {
            self.next_question();
        }
    }

    pub fn start_category(&mut self, category: Category) {
        self.menu.select(category);
        self.screen = AppScreen::Question;
        self.controller.sink_mut().clear();
        let result = self.controller.select_category(category).map(|_| ());
        Self::log_outcome(result);
    }

    pub fn next_question(&mut self) {
        let result = self.controller.load_next_question().map(|_| ());
        Self::log_outcome(result);
    }

    /// Answer with option `index` if a question is waiting; otherwise a
    /// number key does nothing.
    pub fn choose(&mut self, index: usize) {
        if self.controller.pending().is_none() {
            return;
        }
        if let Some(view) = self.controller.sink().question.as_ref() {
            if index >= view.options.len() {
                return;
            }
        }
        self.controller.sink_mut().mark_choice(index);
        match self.controller.submit_choice(index) {
            Ok(outcome) => {
                if outcome.pass_completed {
                    debug!(category = %self.controller.current_category(), "pass finished in UI");
                }
            }
            Err(err) => debug!(error = %err, "choice rejected"),
        }
        self.refresh_menu_status(self.controller.current_category());
    }

    /// Enter/n: move on once the current question has been answered.
    pub fn advance(&mut self) {
        let answered = self
            .view()
            .question
            .as_ref()
            .is_some_and(|q| q.feedback.is_some());
        if answered || self.view().notice.is_some() {
            self.next_question();
        }
    }

    pub fn back_to_menu(&mut self) {
        self.refresh_menu_status(self.controller.current_category());
        self.screen = AppScreen::Menu;
    }

    pub fn refresh_menu_status(&mut self, category: Category) {
        let status = match self.controller.pool_slot(category) {
            PoolSlot::Loading => "Loading question pool...".to_string(),
            PoolSlot::Unavailable(_) => "Question pool unavailable".to_string(),
            PoolSlot::Ready(_) => match self.controller.summary(category) {
                Some(summary) => format!(
                    "Pass {}  Batch {}/{}  {}/{} correct in batch  {} questions",
                    summary.pass_number,
                    summary.batch_index + 1,
                    summary.batch_count.max(1),
                    summary.correct_count,
                    summary.seen_count,
                    summary.pool_len,
                ),
                None => String::new(),
            },
        };
        self.menu.set_status(category, status);
    }

    fn log_outcome(result: Result<(), StudyError>) {
        // Errors are already on screen through the sink
        if let Err(err) = result {
            debug!(error = %err, "no question shown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hamprep::pool::{Question, QuestionId};
    use hamprep::store::MemoryBackend;
    use rand::SeedableRng;

    fn pool(category: Category, count: u64) -> QuestionPool {
        let questions = (1..=count)
            .map(|n| Question {
                id: QuestionId::Number(n),
                prompt: format!("question {n}"),
                options: vec![format!("right {n}"), format!("wrong {n}")],
                correct_index: 0,
                reference: Some(String::new()),
            })
            .collect();
        QuestionPool::new(category, questions, true).unwrap()
    }

    fn test_app() -> App {
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        App::new(
            &Config::default(),
            theme,
            ProgressStore::open(Box::new(MemoryBackend::new())),
            SmallRng::seed_from_u64(7),
            Category::Technician,
        )
    }

    #[test]
    fn test_waiting_learner_gets_question_when_pool_arrives() {
        let mut app = test_app();
        app.start_category(Category::Technician);
        assert_eq!(app.view().notice, Some(Notice::Loading(Category::Technician)));

        app.pool_loaded(Category::Technician, Ok(pool(Category::Technician, 3)));
        let view = app.view().question.as_ref().unwrap();
        assert_eq!(view.options.len(), 1);
        assert_eq!(view.reference, None);
    }

    #[test]
    fn test_choose_records_feedback() {
        let mut app = test_app();
        app.pool_loaded(Category::Technician, Ok(pool(Category::Technician, 3)));
        app.start_category(Category::Technician);
        app.choose(0);

        let view = app.view().question.as_ref().unwrap();
        assert_eq!(view.chosen, Some(0));
        assert!(view.feedback.as_ref().unwrap().is_correct);
        assert_eq!(app.view().summary.unwrap().seen_count, 1);
    }

    #[test]
    fn test_advance_requires_an_answer() {
        let mut app = test_app();
        app.pool_loaded(Category::Technician, Ok(pool(Category::Technician, 3)));
        app.start_category(Category::Technician);
        let first = app.controller.pending().unwrap().question.id.clone();

        app.advance();
        assert_eq!(app.controller.pending().unwrap().question.id, first);

        app.choose(0);
        app.advance();
        assert!(app.controller.pending().is_some());
    }

    #[test]
    fn test_unavailable_pool_shows_notice() {
        let mut app = test_app();
        app.pool_loaded(Category::Extra, Err(anyhow::anyhow!("missing file")));
        app.start_category(Category::Extra);
        assert!(matches!(
            app.view().notice,
            Some(Notice::Unavailable(Category::Extra, _))
        ));
        assert_eq!(app.menu.items[2].status, "Question pool unavailable");
    }
}
