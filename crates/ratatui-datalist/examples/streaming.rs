use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEventKind;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui_datalist::DataListView;
use ratatui_datalist::ListDataSource;
use ratatui_datalist::ListViewOptions;
use ratatui_datalist::SourceState;
use ratatui_datalist::VecSource;
use ratatui_datalist::VisualRow;
use ratatui_datalist::crossterm_input::input_event_from_crossterm;
use ratatui_datalist::help::HelpBar;
use ratatui_datalist::keymap;
use ratatui_datalist::keymap::Binding;
use ratatui_datalist::theme::Theme;
use std::io;
use std::rc::Rc;
use std::time::Duration;
use std::time::Instant;

const PAGE_SIZE: u32 = 25;
const PAGES: u32 = 12;
const PAGE_DELAY: Duration = Duration::from_millis(400);

#[derive(Clone)]
struct LogLine {
    seq: u32,
    level: &'static str,
    message: String,
}

/// Pretends to fetch pages from a remote log service.
struct Feed {
    source: Rc<VecSource<LogLine>>,
    next_page: u32,
    last_fetch: Instant,
}

impl Feed {
    fn new() -> Self {
        Self {
            source: Rc::new(VecSource::with_state(Vec::new(), SourceState::Idle)),
            next_page: 0,
            last_fetch: Instant::now(),
        }
    }

    fn tick(&mut self) {
        match self.source.state() {
            SourceState::Exhausted | SourceState::Failed => return,
            SourceState::Idle => {
                self.source.set_state(SourceState::Loading);
                self.last_fetch = Instant::now();
                return;
            }
            SourceState::Loading | SourceState::Ready => {}
        }
        if self.last_fetch.elapsed() < PAGE_DELAY {
            return;
        }
        self.last_fetch = Instant::now();
        let first = self.next_page * PAGE_SIZE;
        self.source.extend((first..first + PAGE_SIZE).map(|seq| LogLine {
            seq,
            level: if seq % 11 == 0 { "WARN" } else { "INFO" },
            message: format!("request {seq} handled"),
        }));
        self.next_page += 1;
        let state = if self.next_page == PAGES {
            SourceState::Exhausted
        } else {
            SourceState::Loading
        };
        self.source.set_state(state);
    }

    fn retry(&mut self) {
        self.next_page = 0;
        self.source.reset(Vec::new());
        self.source.set_state(SourceState::Idle);
    }
}

fn log_row(line: &LogLine, _index: usize) -> VisualRow {
    let row = VisualRow::new(line.message.clone())
        .with_icon(line.level)
        .with_secondary(format!("#{}", line.seq));
    if line.level == "WARN" {
        row.with_style(Style::default().yellow())
    } else {
        row
    }
}

type LogAdapter = fn(&LogLine, usize) -> VisualRow;

fn main() -> io::Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &Theme::default());

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn run<B: ratatui::backend::Backend<Error = io::Error>>(
    terminal: &mut Terminal<B>,
    theme: &Theme,
) -> io::Result<()> {
    let mut feed = Feed::new();
    let mut view = DataListView::new(
        &feed.source,
        log_row as LogAdapter,
        ListViewOptions::default(),
        None,
    );

    let mut bindings = view.list().options().bindings.help();
    bindings.push(Binding::new("x", "fail", vec![keymap::key_char('x')]));
    bindings.push(Binding::new("r", "retry", vec![keymap::key_char('r')]));
    bindings.push(Binding::new("q", "quit", vec![keymap::key_char('q')]));
    let help = HelpBar::new(bindings);

    loop {
        feed.tick();

        terminal.draw(|f| {
            let area = f.area();
            let [main, status, footer] = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                ])
                .areas(area);

            let block = Block::default()
                .title("Streaming DataListView")
                .borders(Borders::ALL);
            let inner = block.inner(main);
            f.render_widget(block, main);

            let buf = f.buffer_mut();
            view.render(inner, buf, theme);

            let line = format!(
                "state={:?}  rows={}  pages={}/{PAGES}",
                view.state(),
                view.materialized_len(),
                feed.next_page,
            );
            let span = Span::styled(line, Style::default());
            buf.set_span(status.x, status.y, &span, status.width);
            help.render(footer, buf, theme);
        })?;

        if !crossterm::event::poll(Duration::from_millis(50))? {
            continue;
        }
        let event = crossterm::event::read()?;
        if let Event::Key(key) = &event
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') => {
                    view.detach();
                    return Ok(());
                }
                KeyCode::Char('x') => {
                    feed.source.fail("connection to log service lost");
                    continue;
                }
                KeyCode::Char('r') => {
                    feed.retry();
                    continue;
                }
                _ => {}
            }
        }
        if let Some(ev) = input_event_from_crossterm(event) {
            view.handle_event(ev);
        }
    }
}
