#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;

use std::io;
use std::path;
use std::time::Instant;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Gauge;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use syntect::highlighting::Theme;
use tokio::sync::mpsc;
use tui_textarea::Input;
use tui_textarea::Key;
use tui_textarea::TextArea;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::ClientError;
use crate::domain::models::Event;
use crate::domain::models::FormField;
use crate::domain::models::KeyDisplay;
use crate::domain::models::KeyStatusKind;
use crate::domain::models::NumericField;
use crate::domain::models::Output;
use crate::domain::models::StoreBox;
use crate::domain::models::EMPTY_OUTPUT_HINT;
use crate::domain::models::EMPTY_OUTPUT_TITLE;
use crate::domain::services::clipboard::ClipboardService;
use crate::domain::services::events::EventsService;
use crate::domain::services::Controller;
use crate::domain::services::Credentials;
use crate::domain::services::Scroll;
use crate::domain::services::Syntaxes;

pub const HOTKEYS: &str = "HOTKEYS:
- Tab / Shift+Tab: Move between fields.
- Left / Right: Change the selected option or step a number.
- Enter: Save the API key while its field is focused.
- Ctrl+S: Save the API key.
- Ctrl+K: Clear the saved API key.
- Ctrl+V: Show or hide the API key.
- Ctrl+G: Generate a script from the description.
- Ctrl+Y: Copy the script to the clipboard.
- Ctrl+D: Download the script to a file.
- Ctrl+F: Format the script.
- Ctrl+L: Clear the description and the output.
- Ctrl+E: Load an example description.
- Up / Down / PgUp / PgDn: Scroll the output.
- Ctrl+C: Quit.";

const FOCUS_COLOUR: Color = Color::Rgb(99, 102, 241);
const MUTED_COLOUR: Color = Color::DarkGray;

/// Presentation state that never reaches the controller: focus, editors and
/// the cached highlighted output.
pub struct Form<'a> {
    pub focus: FormField,
    description: TextArea<'a>,
    description_revision: u64,
    /// Text typed into the focused numeric field, applied on Enter or when
    /// focus moves.
    pub numeric_draft: Option<String>,
    output_lines: Vec<Line<'static>>,
    output_revision: Option<u64>,
    pub scroll: Scroll,
    theme: &'static Theme,
}

impl<'a> Form<'a> {
    pub fn new(theme: &'static Theme) -> Form<'a> {
        return Form {
            focus: FormField::Description,
            description: TextArea::default(),
            description_revision: 0,
            numeric_draft: None,
            output_lines: vec![],
            output_revision: None,
            scroll: Scroll::default(),
            theme,
        };
    }

    /// Pulls controller changes into the editor and the highlighted output.
    pub fn sync(&mut self, controller: &Controller) {
        if self.description_revision != controller.view.description_revision {
            self.description = TextArea::new(
                controller
                    .view
                    .description
                    .split('\n')
                    .map(|e| return e.to_string())
                    .collect::<Vec<String>>(),
            );
            self.description_revision = controller.view.description_revision;
        }

        if self.output_revision != Some(controller.view.output_revision) {
            self.output_lines = match &controller.view.output {
                Output::Empty => vec![],
                Output::Script(script) => Syntaxes::highlight_lua(script, self.theme),
            };
            self.output_revision = Some(controller.view.output_revision);
            self.scroll.reset();
        }

        if self.focus == FormField::NpcTags && !controller.view.npc_tags_visible {
            self.focus = FormField::Mode;
        }
    }

    fn mirror_description(&self, controller: &mut Controller) {
        controller.view.description = self.description.lines().join("\n");
    }

    fn commit_numeric(&mut self, controller: &mut Controller) {
        if let (FormField::Numeric(field), Some(draft)) = (self.focus, self.numeric_draft.take()) {
            report(controller.set_numeric(field, &draft));
        }
    }

    pub fn move_focus(&mut self, controller: &mut Controller, forward: bool) {
        self.commit_numeric(controller);
        self.focus = self
            .focus
            .cycle(forward, controller.view.npc_tags_visible);
    }

    pub fn handle_enter(&mut self, controller: &mut Controller) {
        match self.focus {
            FormField::ApiKey => report(controller.save_key()),
            FormField::Numeric(_) => self.commit_numeric(controller),
            FormField::Mode => controller.toggle_mode(),
            FormField::Description => {
                self.description.insert_newline();
                self.mirror_description(controller);
            }
            _ => (),
        }
    }

    pub fn handle_paste(&mut self, controller: &mut Controller, text: &str) {
        match self.focus {
            FormField::Description => {
                for char in text.chars() {
                    if char == '\n' {
                        self.description.insert_newline();
                    } else if char != '\r' {
                        self.description.insert_char(char);
                    }
                }
                self.mirror_description(controller);
            }
            FormField::ApiKey => {
                controller.view.key_field.push_str(text.trim());
            }
            FormField::NpcTags => {
                controller.view.npc_tags.push_str(&text.replace(['\n', '\r'], ""));
            }
            _ => (),
        }
    }

    /// Applies a hotkey. Returns false when the input is not one.
    pub fn handle_hotkey(&mut self, controller: &mut Controller, input: &Input) -> bool {
        if !input.ctrl {
            return false;
        }

        match input.key {
            Key::Char('s') => report(controller.save_key()),
            Key::Char('k') => report(controller.clear_key()),
            Key::Char('v') => controller.toggle_key_visibility(),
            Key::Char('g') => {
                self.commit_numeric(controller);
                report(controller.generate());
            }
            Key::Char('y') => report(controller.copy()),
            Key::Char('d') => report(controller.download().map(|_| return ())),
            Key::Char('f') => report(controller.format()),
            Key::Char('l') => controller.clear(),
            Key::Char('e') => controller.load_example(),
            _ => return false,
        }

        return true;
    }

    pub fn handle_input(&mut self, controller: &mut Controller, input: Input) {
        if self.handle_hotkey(controller, &input) {
            return;
        }

        let forward = match input.key {
            Key::Right => Some(true),
            Key::Left => Some(false),
            _ => None,
        };

        match (self.focus, forward) {
            (FormField::Mode, Some(_)) => controller.toggle_mode(),
            (FormField::Model, Some(forward)) => controller.cycle_model(forward),
            (FormField::AgentMode, Some(forward)) => controller.cycle_agent_mode(forward),
            (FormField::Numeric(field), Some(forward)) => {
                self.numeric_draft = None;
                controller.step_numeric(field, forward);
            }
            (FormField::Description, _) => {
                if self.description.input(input) {
                    self.mirror_description(controller);
                }
            }
            (FormField::ApiKey, _) => edit_line(&mut controller.view.key_field, &input),
            (FormField::NpcTags, _) => edit_line(&mut controller.view.npc_tags, &input),
            (FormField::Numeric(field), None) => {
                let mut draft = self
                    .numeric_draft
                    .take()
                    .unwrap_or_else(|| return controller.view.readouts.get(field).to_string());
                if draft == controller.view.readouts.get(field) && matches!(input.key, Key::Char(_)) {
                    draft.clear();
                }
                edit_line(&mut draft, &input);
                self.numeric_draft = Some(draft);
            }
            _ => match input.key {
                Key::Up => self.scroll.up(),
                Key::Down => self.scroll.down(),
                _ => (),
            },
        }
    }
}

fn report<T>(res: Result<T, ClientError>) {
    match res {
        Err(err) if err.is_nothing_to_act_on() => {
            tracing::debug!(error = %err, "No script to act on");
        }
        Err(err) => {
            tracing::warn!(error = %err, "Form action was not applied");
        }
        Ok(_) => (),
    }
}

/// Minimal single line editing for the short text fields.
pub fn edit_line(text: &mut String, input: &Input) {
    match input {
        Input {
            key: Key::Char(char),
            ctrl: false,
            alt: false,
            ..
        } => text.push(*char),
        Input {
            key: Key::Backspace,
            ..
        } => {
            text.pop();
        }
        _ => (),
    }
}

/// What the API key field shows. A mask is safe to print, anything else is
/// hidden while concealed.
pub fn key_field_text(key_field: &str, key_display: KeyDisplay) -> String {
    if key_display == KeyDisplay::Revealed || Credentials::looks_masked(key_field) {
        return key_field.to_string();
    }

    return "•".repeat(key_field.chars().count());
}

fn settings_line<'b>(form: &Form, field: FormField, value: String) -> Line<'b> {
    let focused = form.focus == field;
    let marker = if focused { "› " } else { "  " };
    let mut value_style = Style::default();
    if focused {
        value_style = value_style.fg(FOCUS_COLOUR).add_modifier(Modifier::BOLD);
    }

    let mut value = value;
    if focused && !field.is_text() && field != FormField::Description {
        value = format!("◀ {value} ▶");
    }

    return Line::from(vec![
        Span::raw(marker),
        Span::styled(format!("{:<18}", field.title()), Style::default().fg(MUTED_COLOUR)),
        Span::styled(value, value_style),
    ]);
}

/// Lines of the settings panel, in tab order.
pub fn settings_lines<'b>(form: &Form, controller: &Controller) -> Vec<Line<'b>> {
    let view = &controller.view;
    let config = &controller.config;
    let mut lines = vec![settings_line(
        form,
        FormField::ApiKey,
        key_field_text(&view.key_field, view.key_display),
    )];

    if let Some(status) = &view.key_status {
        let colour = match status.kind {
            KeyStatusKind::Saved => Color::Rgb(16, 185, 129),
            KeyStatusKind::Warning => Color::Rgb(245, 158, 11),
            KeyStatusKind::Cleared => MUTED_COLOUR,
        };
        lines.push(Line::from(Span::styled(
            format!("    {}", status.text),
            Style::default().fg(colour),
        )));
    }

    lines.push(Line::from(""));
    lines.push(settings_line(form, FormField::Mode, config.mode.to_string()));
    if view.npc_tags_visible {
        lines.push(settings_line(form, FormField::NpcTags, view.npc_tags.to_string()));
    }
    lines.push(settings_line(form, FormField::Model, config.model.to_string()));

    let numeric = |field: NumericField| {
        let mut value = view.readouts.get(field).to_string();
        if form.focus == FormField::Numeric(field) {
            if let Some(draft) = &form.numeric_draft {
                value = format!("{draft}_");
            }
        }
        return settings_line(form, FormField::Numeric(field), value);
    };

    lines.push(numeric(NumericField::Temperature));
    lines.push(numeric(NumericField::MaxTokens));
    lines.push(numeric(NumericField::TopP));
    lines.push(numeric(NumericField::FrequencyPenalty));
    lines.push(numeric(NumericField::PresencePenalty));
    lines.push(settings_line(
        form,
        FormField::AgentMode,
        config.agent_mode.to_string(),
    ));
    lines.push(numeric(NumericField::MaxIterations));

    return lines;
}

fn focused_block<'b>(title: &'b str, focused: bool) -> Block<'b> {
    let mut border_style = Style::default().fg(MUTED_COLOUR);
    if focused {
        border_style = Style::default().fg(FOCUS_COLOUR);
    }

    return Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
}

fn render_description<B: Backend>(
    frame: &mut Frame<'_, B>,
    rect: Rect,
    form: &mut Form,
    controller: &Controller,
) {
    let focused = form.focus == FormField::Description;
    let block = focused_block(" Description ", focused);

    if controller.view.description.is_empty() && !focused {
        let placeholder = Paragraph::new(controller.view.description_placeholder.to_string())
            .style(Style::default().fg(MUTED_COLOUR))
            .wrap(Wrap { trim: false })
            .block(block);
        frame.render_widget(placeholder, rect);
        return;
    }

    form.description.set_block(block);
    if focused {
        form.description
            .set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
    } else {
        form.description.set_cursor_style(Style::default());
    }
    form.description.set_cursor_line_style(Style::default());
    frame.render_widget(form.description.widget(), rect);
}

fn render_output<B: Backend>(
    frame: &mut Frame<'_, B>,
    rect: Rect,
    form: &mut Form,
    controller: &Controller,
) {
    let block = focused_block(" Lua script ", false);

    if controller.view.output == Output::Empty {
        let empty = Paragraph::new(vec![
            Line::from(Span::styled(
                EMPTY_OUTPUT_TITLE,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                EMPTY_OUTPUT_HINT,
                Style::default().fg(MUTED_COLOUR),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(empty, rect);
        return;
    }

    let viewport = rect.height.saturating_sub(2);
    let content_length = u16::try_from(form.output_lines.len()).unwrap_or(u16::MAX);
    form.scroll.set_state(content_length, viewport);

    let script = Paragraph::new(form.output_lines.clone())
        .block(block)
        .scroll((form.scroll.position, 0));
    frame.render_widget(script, rect);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        rect.inner(&Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut form.scroll.scrollbar_state,
    );
}

fn render_status<B: Backend>(frame: &mut Frame<'_, B>, rect: Rect, controller: &Controller) {
    if let Some(progress) = controller.view.progress {
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" Generating "))
            .gauge_style(Style::default().fg(FOCUS_COLOUR))
            .percent(progress.clamp(0.0, 100.0) as u16);
        frame.render_widget(gauge, rect);
        return;
    }

    let help = Paragraph::new(
        "Tab: next field · Ctrl+G: generate · Ctrl+Y: copy · Ctrl+D: download · Ctrl+F: format · Ctrl+E: example · Ctrl+C: quit",
    )
    .style(Style::default().fg(MUTED_COLOUR))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, rect);
}

fn render_notifications<B: Backend>(frame: &mut Frame<'_, B>, controller: &Controller) {
    let area = frame.size();
    let width = area.width.min(60);
    let mut y = area.y + 1;

    for notification in controller.view.notifications.iter().rev() {
        let height = 3;
        if y + height > area.height {
            break;
        }

        let rect = Rect::new(area.width.saturating_sub(width + 1), y, width, height);
        let colour = notification.kind.colour();
        let paragraph = Paragraph::new(notification.message.to_string())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(colour))
                    .title(format!(" {} ", notification.kind)),
            );

        frame.render_widget(Clear, rect);
        frame.render_widget(paragraph, rect);
        y += height;
    }
}

fn render<B: Backend>(frame: &mut Frame<'_, B>, form: &mut Form, controller: &Controller) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Min(10), Constraint::Length(3)])
        .split(frame.size());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Length(46), Constraint::Min(20)])
        .split(layout[0]);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(columns[1]);

    let settings = Paragraph::new(settings_lines(form, controller)).block(focused_block(
        " Settings ",
        form.focus != FormField::Description,
    ));
    frame.render_widget(settings, columns[0]);

    render_description(frame, main[0], form, controller);
    render_output(frame, main[1], form, controller);
    render_status(frame, layout[1], controller);
    render_notifications(frame, controller);
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    controller: &mut Controller,
    form: &mut Form<'_>,
    events: &mut EventsService,
) -> Result<()> {
    #[cfg(feature = "dev")]
    controller.load_example();

    controller.check_backend();

    loop {
        form.sync(controller);
        terminal.draw(|frame| {
            render(frame, form, controller);
        })?;

        let event = events.next().await?;
        if !handle_event(controller, form, event, Instant::now()) {
            break;
        }
    }

    return Ok(());
}

/// Expires notifications, then applies one loop event. Returns false when the
/// loop should exit.
fn handle_event(
    controller: &mut Controller,
    form: &mut Form,
    event: Event,
    now: Instant,
) -> bool {
    controller.tick(now);

    match event {
        Event::BackendHealth(res) => controller.on_backend_health(res),
        Event::GenerationProgress(increment) => controller.on_generation_progress(increment),
        Event::GenerationSettling() => controller.on_generation_settling(),
        Event::GenerationSettled(outcome) => controller.on_generation_settled(outcome),
        Event::KeyboardCTRLC() => return false,
        Event::KeyboardTab() => form.move_focus(controller, true),
        Event::KeyboardBackTab() => form.move_focus(controller, false),
        Event::KeyboardEnter() => form.handle_enter(controller),
        Event::KeyboardPaste(text) => form.handle_paste(controller, &text),
        Event::KeyboardCharInput(input) => form.handle_input(controller, input),
        Event::UIScrollDown() => form.scroll.down(),
        Event::UIScrollUp() => form.scroll.up(),
        Event::UIScrollPageDown() => form.scroll.down_page(),
        Event::UIScrollPageUp() => form.scroll.up_page(),
        Event::UIResize() => (),
        Event::UITick() => (),
    }

    return true;
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    );
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    store: StoreBox,
    action_tx: mpsc::UnboundedSender<Action>,
    event_tx: mpsc::UnboundedSender<Event>,
    event_rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let theme = Syntaxes::theme(&Config::get(ConfigKey::Theme))?;
    let mut controller = Controller::new(
        Config::generation_config()?,
        store,
        Box::<ClipboardService>::default(),
        path::PathBuf::from(Config::get(ConfigKey::DownloadDir)),
        action_tx,
        event_tx,
    );
    let mut form = Form::new(theme);
    let mut events = EventsService::new(event_rx);

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    start_loop(&mut terminal, &mut controller, &mut form, &mut events).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
