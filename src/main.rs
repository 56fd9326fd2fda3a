mod app;
mod event;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use tracing::{info, warn};

use hamprep::config::{Config, default_data_dir};
use hamprep::logging;
use hamprep::pool::{BundledSource, Category};
use hamprep::store::{JsonStore, MemoryBackend, ProgressBackend, ProgressStore};

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};
use ui::components::progress_bar::ProgressBar;
use ui::components::question_card::QuestionCard;
use ui::layout::{AppLayout, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "hamprep",
    version,
    about = "Amateur radio license exam practice with adaptive question batches"
)]
struct Cli {
    #[arg(short, long, help = "Start in this category (technician, general, extra)")]
    category: Option<Category>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Seed for question order and option shuffling")]
    seed: Option<u64>,

    #[arg(long, help = "Keep progress in memory only for this run")]
    ephemeral: bool,

    #[arg(long, value_name = "CATEGORY", help = "Reset saved progress for a category and exit")]
    reset: Option<Category>,

    #[arg(long, value_name = "PATH", help = "Write saved progress to a file and exit")]
    export: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Replace saved progress from an export file and exit")]
    import: Option<PathBuf>,
}

impl Cli {
    fn is_maintenance(&self) -> bool {
        self.reset.is_some() || self.export.is_some() || self.import.is_some()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    config.validate(&Theme::available_themes());

    if cli.is_maintenance() {
        logging::init_stderr_logging(&config.log_filter);
        return run_maintenance(&cli);
    }

    // Logging is best effort; the UI runs either way
    if let Err(err) = logging::init_file_logging(&default_data_dir(), &config.log_filter) {
        eprintln!("hamprep: logging disabled: {err:#}");
    }

    let theme_name = cli.theme.clone().unwrap_or_else(|| config.theme.clone());
    let theme: &'static Theme = Box::leak(Box::new(Theme::load(&theme_name).unwrap_or_default()));

    let backend: Box<dyn ProgressBackend> = if cli.ephemeral {
        info!("ephemeral session, progress will not be saved");
        Box::new(MemoryBackend::new())
    } else {
        match JsonStore::new() {
            Ok(store) => Box::new(store),
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(error = %reason, "progress directory unavailable, keeping progress in memory");
                Box::new(MemoryBackend::new())
            }
        }
    };
    let store = ProgressStore::open(backend);
    let rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let initial = cli.category.unwrap_or(config.default_category);
    let source = BundledSource::with_override_dir(config.pool_dir());

    let mut app = App::new(&config, theme, store, rng, initial);
    if cli.category.is_some() {
        app.start_category(initial);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));
    events.spawn_pool_loader(source);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_maintenance(cli: &Cli) -> Result<()> {
    let json = JsonStore::new()?;

    if let Some(path) = cli.export.as_deref() {
        json.export_to(path)?;
        println!("Exported progress to {}", path.display());
    }
    if let Some(path) = cli.import.as_deref() {
        json.import_from(path)?;
        println!("Imported progress from {}", path.display());
    }
    if let Some(category) = cli.reset {
        let mut store = ProgressStore::open(Box::new(json));
        store.reset(category);
        println!("Reset {} progress", category.label());
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::PoolLoaded(category, loaded) => app.pool_loaded(category, loaded),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Question => handle_question_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char(ch @ '1'..='9') => {
            let index = ch as usize - '1' as usize;
            if let Some(&category) = Category::ALL.get(index) {
                app.start_category(category);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            let category = app.menu.selected_category();
            app.start_category(category);
        }
        _ => {}
    }
}

fn handle_question_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') | KeyCode::Esc => app.back_to_menu(),
        KeyCode::Char(ch @ '1'..='9') => app.choose(ch as usize - '1' as usize),
        KeyCode::Enter | KeyCode::Char('n') => app.advance(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Question => render_question(frame, app),
    }
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(Line::from(Span::styled(
        " hamprep ",
        Style::default()
            .fg(colors.header_fg())
            .bg(colors.header_bg())
            .add_modifier(Modifier::BOLD),
    )))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout[0]);

    let menu_area = ui::layout::centered_rect(60, 70, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [1-3] Study  [Enter] Select  [q] Quit ",
        Style::default().fg(colors.text_dim()),
    )));
    frame.render_widget(footer, layout[2]);
}

fn render_question(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(area);
    let view = app.view();
    let category = app.controller.current_category();

    let mut header_text = format!(" {} ", category.label());
    if let (Some(summary), false) = (view.summary.as_ref(), app_layout.tier.show_sidebar()) {
        header_text.push_str(&format!(
            "| Pass {} | Batch {}/{} | {}/{} correct ",
            summary.pass_number,
            summary.batch_index + 1,
            summary.batch_count.max(1),
            summary.correct_count,
            summary.seen_count,
        ));
    }
    let header = Paragraph::new(Line::from(Span::styled(
        header_text,
        Style::default()
            .fg(colors.header_fg())
            .bg(colors.header_bg())
            .add_modifier(Modifier::BOLD),
    )))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, app_layout.header);

    let show_progress =
        view.summary.is_some() && app_layout.tier.show_progress_bar(app_layout.main.height);
    let mut constraints = vec![Constraint::Min(5)];
    if show_progress {
        constraints.push(Constraint::Length(3));
    }
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(app_layout.main);

    let card = QuestionCard::new(view.question.as_ref(), view.notice.as_ref(), app.theme);
    frame.render_widget(card, main_layout[0]);

    if let (true, Some(summary)) = (show_progress, view.summary.as_ref()) {
        let covered = (summary.pass_progress() * summary.pool_len as f64).round();
        let bar = ProgressBar::new(&format!("Pass {}", summary.pass_number), summary.pass_progress(), app.theme)
            .caption(format!("{covered:.0}/{} questions", summary.pool_len));
        frame.render_widget(bar, main_layout[1]);
    }

    if let (Some(sidebar), Some(summary)) = (app_layout.sidebar, view.summary.as_ref()) {
        let accuracy = if summary.seen_count == 0 {
            0.0
        } else {
            f64::from(summary.correct_count) / summary.seen_count as f64 * 100.0
        };
        let lines = vec![
            Line::from(Span::styled(
                " Progress",
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!(" Pass:      {}", summary.pass_number)),
            Line::from(format!(
                " Batch:     {} of {}",
                summary.batch_index + 1,
                summary.batch_count.max(1)
            )),
            Line::from(format!(" Seen:      {}", summary.seen_count)),
            Line::from(format!(" Correct:   {}", summary.correct_count)),
            Line::from(format!(" Accuracy:  {accuracy:.0}%")),
            Line::from(format!(" Pool size: {}", summary.pool_len)),
        ];
        let panel = Paragraph::new(lines)
            .style(Style::default().fg(colors.fg()))
            .block(Block::bordered().border_style(Style::default().fg(colors.border())))
            .wrap(Wrap { trim: false });
        frame.render_widget(panel, sidebar);
    }

    let hints = ["[1-9] Answer", "[Enter/n] Next", "[c/Esc] Categories", "[q] Quit"];
    let footer_line = pack_hint_lines(&hints, app_layout.footer.width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    let footer = Paragraph::new(Line::from(Span::styled(
        footer_line,
        Style::default().fg(colors.text_dim()),
    )));
    frame.render_widget(footer, app_layout.footer);
}
