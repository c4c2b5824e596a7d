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
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui_datalist::DataListView;
use ratatui_datalist::ListAction;
use ratatui_datalist::ListDataSource;
use ratatui_datalist::ListViewOptions;
use ratatui_datalist::VecSource;
use ratatui_datalist::VirtualWindowOptions;
use ratatui_datalist::VisualRow;
use ratatui_datalist::crossterm_input::input_event_from_crossterm;
use ratatui_datalist::help::HelpBar;
use ratatui_datalist::keymap;
use ratatui_datalist::keymap::Binding;
use ratatui_datalist::theme::Theme;
use std::io;
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone)]
struct Entry {
    id: u32,
    name: String,
}

type EntryAdapter = fn(&Entry, usize) -> VisualRow;
type View = DataListView<VecSource<Entry>, EntryAdapter>;

fn entry_row(entry: &Entry, _index: usize) -> VisualRow {
    VisualRow::new(format!("{:06}  {}", entry.id, entry.name))
        .with_icon(if entry.id % 7 == 0 { "★" } else { "·" })
        .with_tag(entry.id as u64)
}

fn main() -> io::Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = Theme::default();
    let source = Rc::new(VecSource::new(
        (0..200_000)
            .map(|id| Entry {
                id,
                name: "The quick brown fox jumps over the lazy dog".to_string(),
            })
            .collect(),
    ));
    let mut view: View = DataListView::new(
        &source,
        entry_row as EntryAdapter,
        ListViewOptions::default(),
        Some(VirtualWindowOptions {
            window_size: 64,
            preload: 16,
            viewport_height: 0,
        }),
    );

    let res = run(&mut terminal, &theme, &source, &mut view);

    view.detach();
    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn run<B: ratatui::backend::Backend<Error = io::Error>>(
    terminal: &mut Terminal<B>,
    theme: &Theme,
    source: &Rc<VecSource<Entry>>,
    view: &mut View,
) -> io::Result<()> {
    let mut bindings = view.list().options().bindings.help();
    bindings.push(Binding::new("/", "filter", vec![keymap::key_char('/')]));
    bindings.push(Binding::new("e", "edit", vec![keymap::key_char('e')]));
    bindings.push(Binding::new("q", "quit", vec![keymap::key_char('q')]));
    let help = HelpBar::new(bindings);

    let mut query: Option<String> = None;
    let mut last_activated: Option<u32> = None;

    loop {
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
                .title("DataListView (200k items, windowed)")
                .borders(Borders::ALL);
            let inner = block.inner(main);
            f.render_widget(block, main);

            let buf = f.buffer_mut();
            view.render(inner, buf, theme);

            let w = view.window();
            let list = view.list();
            let pct = list.viewport().percent_y().unwrap_or(0);
            let mut line = format!(
                "selected={:?}  window={}..{}  rows={}  scroll={pct}%",
                list.selected(),
                w.window_start,
                w.window_end,
                list.len(),
            );
            if let Some(q) = &query {
                line.push_str(&format!("  filter: {q}_"));
            }
            if let Some(id) = last_activated {
                line.push_str(&format!("  opened #{id}"));
            }
            let span = Span::styled(line, Style::default());
            buf.set_span(status.x, status.y, &span, status.width);
            help.render(footer, buf, theme);
        })?;

        if !crossterm::event::poll(Duration::from_millis(50))? {
            continue;
        }
        let event = crossterm::event::read()?;

        if let Some(q) = query.as_mut()
            && let Event::Key(key) = &event
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Esc => {
                    query = None;
                    let _ = view.set_filter("");
                }
                KeyCode::Enter => query = None,
                KeyCode::Backspace => {
                    q.pop();
                    let _ = view.set_filter(q);
                }
                KeyCode::Char(c) => {
                    q.push(c);
                    let _ = view.set_filter(q);
                }
                _ => {}
            }
            continue;
        }

        if let Event::Key(key) = &event
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('/') => {
                    query = Some(String::new());
                    continue;
                }
                KeyCode::Char('e') => {
                    let list = view.list();
                    let target = list.selected().and_then(|i| list.source_index(i));
                    drop(list);
                    if let Some(index) = target
                        && let Some(mut entry) = source.get(index)
                    {
                        entry.name = format!("edited {}", entry.name);
                        source.update(index, entry);
                    }
                    continue;
                }
                _ => {}
            }
        }

        if let Some(ev) = input_event_from_crossterm(event)
            && let ListAction::Activated(index) = view.handle_event(ev)
        {
            last_activated = source.get(index).map(|e| e.id);
        }
    }
}
