use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use marginalia_config::{self as config, Config};
use marginalia_engine::{
    AnnotateOptions, Annotation, LocateReport, MatchPolicy, annotate_into, annotate_markdown, io,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::{
    env,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};

mod terminal;

use terminal::TerminalRenderer;

struct App {
    source: String,
    annotations: Vec<Annotation>,
    options: AnnotateOptions,
    /// Why each annotation could not be placed, if it could not
    failures: Vec<Option<String>>,
    list_state: ListState,
    content: Vec<Line<'static>>,
    scroll: u16,
}

impl App {
    fn new(source: String, annotations: Vec<Annotation>, options: AnnotateOptions) -> Result<Self> {
        let mut app = Self {
            source,
            failures: vec![None; annotations.len()],
            annotations,
            options,
            list_state: ListState::default(),
            content: Vec::new(),
            scroll: 0,
        };

        if !app.annotations.is_empty() {
            app.list_state.select(Some(0));
        }
        let report = app.render()?;
        for unlocated in report.unlocatable {
            app.failures[unlocated.annotation] = Some(unlocated.reason.to_string());
        }

        Ok(app)
    }

    fn render(&mut self) -> Result<LocateReport> {
        let selected = self
            .list_state
            .selected()
            .and_then(|index| self.annotations.get(index))
            .map(|annotation| annotation.id.clone());
        let mut renderer = TerminalRenderer::new(selected);
        let report = annotate_into(&self.source, &self.annotations, &self.options, &mut renderer)?;
        self.content = renderer.into_lines();
        Ok(report)
    }

    fn next_annotation(&mut self) -> Result<()> {
        if self.annotations.is_empty() {
            return Ok(());
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.annotations.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
        self.render().map(|_| ())
    }

    fn previous_annotation(&mut self) -> Result<()> {
        if self.annotations.is_empty() {
            return Ok(());
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.annotations.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
        self.render().map(|_| ())
    }

    fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

fn usage(program: &str) -> String {
    format!("Usage: {program} <document.md> [annotations.json] [--preview]")
}

fn annotate_options(config: &Config, document: &Path) -> AnnotateOptions {
    AnnotateOptions {
        document: document.display().to_string(),
        policy: match config.matching.policy {
            config::MatchPolicy::FirstOccurrence => MatchPolicy::FirstOccurrence,
            config::MatchPolicy::NearestToHint => MatchPolicy::NearestToHint,
        },
        strip_markup: config.normalizer.strip_markup,
        marker_class: config.render.marker_class.clone(),
        include_title: config.render.include_title,
    }
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().collect();
    let preview = args.iter().any(|arg| arg == "--preview");
    let paths: Vec<&String> = args.iter().skip(1).filter(|arg| *arg != "--preview").collect();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let (document_path, annotations_path) = match paths.as_slice() {
        [document] => {
            let document = PathBuf::from(document);
            match config.annotations_for(&document) {
                Some(annotations) => (document, annotations),
                None => {
                    eprintln!("Error: No annotations file given and no annotations_dir configured");
                    eprintln!("{}", usage(&args[0]));
                    eprintln!(
                        "Or set annotations_dir in {}",
                        Config::config_path().display()
                    );
                    process::exit(1);
                }
            }
        }
        [document, annotations] => (PathBuf::from(document), PathBuf::from(annotations)),
        _ => {
            eprintln!("{}", usage(&args[0]));
            process::exit(1);
        }
    };

    let source = io::read_file(&document_path)
        .with_context(|| format!("reading document {}", document_path.display()))?;
    let annotations = io::load_annotations(&annotations_path)
        .with_context(|| format!("loading annotations {}", annotations_path.display()))?;
    let options = annotate_options(&config, &document_path);
    log::info!(
        "annotating {} with {} annotations",
        document_path.display(),
        annotations.len()
    );

    if preview {
        return run_preview(source, annotations, options);
    }

    let annotated = annotate_markdown(&source, &annotations, &options)?;
    println!("{}", annotated.html);
    for unlocated in &annotated.report.unlocatable {
        eprintln!("unlocatable annotation {}: {}", unlocated.id, unlocated.reason);
    }

    Ok(())
}

fn run_preview(source: String, annotations: Vec<Annotation>, options: AnnotateOptions) -> Result<()> {
    let mut app = App::new(source, annotations, options)?;
    // stderr belongs to the terminal UI from here on
    log::set_max_level(log::LevelFilter::Off);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_annotation()?,
                KeyCode::Up | KeyCode::Char('k') => app.previous_annotation()?,
                KeyCode::PageDown | KeyCode::Char(' ') => app.scroll_down(),
                KeyCode::PageUp | KeyCode::Char('b') => app.scroll_up(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
        .split(rows[0]);

    // Annotation list panel
    let items: Vec<ListItem> = app
        .annotations
        .iter()
        .zip(&app.failures)
        .map(|(annotation, failure)| {
            let mut lines = vec![Line::from(vec![Span::styled(
                annotation.selection.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )])];
            if !annotation.content.is_empty() {
                lines.push(Line::from(format!("  {}", annotation.content)));
            }
            if let Some(reason) = failure {
                lines.push(Line::from(Span::styled(
                    format!("  not found: {reason}"),
                    Style::default().fg(Color::Red),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Annotations"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(list, chunks[0], &mut app.list_state);

    // Document panel
    let content = Paragraph::new(app.content.clone())
        .block(Block::default().borders(Borders::ALL).title("Document"))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));

    f.render_widget(content, chunks[1]);

    let help = Paragraph::new(Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("↑/k: Previous | "),
        Span::raw("↓/j: Next | "),
        Span::raw("Space/PgDn: Scroll down | b/PgUp: Scroll up"),
    ]));

    f.render_widget(help, rows[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_options_follow_config() {
        let mut config = Config::default();
        config.matching.policy = config::MatchPolicy::NearestToHint;
        config.render.marker_class = "note".to_string();
        config.normalizer.strip_markup = true;

        let options = annotate_options(&config, Path::new("laws.md"));

        assert_eq!(options.document, "laws.md");
        assert_eq!(options.policy, MatchPolicy::NearestToHint);
        assert_eq!(options.marker_class, "note");
        assert!(options.strip_markup);
        assert!(options.include_title);
    }

    #[test]
    fn test_app_records_failures() {
        let annotations = vec![
            Annotation::new("a", "robot"),
            Annotation::new("b", "android"),
        ];

        let app = App::new(
            "A robot may not.".to_string(),
            annotations,
            AnnotateOptions::default(),
        )
        .unwrap();

        assert_eq!(app.failures[0], None);
        assert!(app.failures[1].is_some());
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn test_selection_wraps_around() {
        let annotations = vec![Annotation::new("a", "robot"), Annotation::new("b", "may")];
        let mut app = App::new(
            "A robot may not.".to_string(),
            annotations,
            AnnotateOptions::default(),
        )
        .unwrap();

        app.previous_annotation().unwrap();
        assert_eq!(app.list_state.selected(), Some(1));
        app.next_annotation().unwrap();
        assert_eq!(app.list_state.selected(), Some(0));
    }
}
