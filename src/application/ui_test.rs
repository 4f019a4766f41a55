use std::path;
use std::time::Duration;
use std::time::Instant;

use anyhow::Result;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tui_textarea::Input;
use tui_textarea::Key;

use super::edit_line;
use super::handle_event;
use super::key_field_text;
use super::render;
use super::Form;
use crate::domain::models::Action;
use crate::domain::models::Clipboard;
use crate::domain::models::Event;
use crate::domain::models::FormField;
use crate::domain::models::GenerationConfig;
use crate::domain::models::GenerationMode;
use crate::domain::models::KeyDisplay;
use crate::domain::models::KeyStatusKind;
use crate::domain::models::NotificationKind;
use crate::domain::models::NumericField;
use crate::domain::services::Controller;
use crate::domain::services::Syntaxes;
use crate::infrastructure::stores::MemoryStore;

struct NoopClipboard {}

impl Clipboard for NoopClipboard {
    fn set_text(&mut self, _text: &str) -> Result<()> {
        return Ok(());
    }
}

fn char_input(char: char) -> Input {
    return Input {
        key: Key::Char(char),
        ctrl: false,
        alt: false,
    };
}

fn ctrl_input(char: char) -> Input {
    return Input {
        key: Key::Char(char),
        ctrl: true,
        alt: false,
    };
}

fn key_input(key: Key) -> Input {
    return Input {
        key,
        ctrl: false,
        alt: false,
    };
}

fn setup() -> (
    Controller,
    Form<'static>,
    mpsc::UnboundedReceiver<Action>,
    mpsc::UnboundedReceiver<Event>,
) {
    let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let controller = Controller::new(
        GenerationConfig::default(),
        Box::<MemoryStore>::default(),
        Box::new(NoopClipboard {}),
        path::PathBuf::from("."),
        action_tx,
        event_tx,
    );
    let form = Form::new(Syntaxes::theme("base16-ocean.dark").unwrap());

    return (controller, form, action_rx, event_rx);
}

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;

    return buffer
        .content
        .chunks(width)
        .map(|row| {
            return row
                .iter()
                .map(|cell| return cell.symbol.to_string())
                .collect::<String>();
        })
        .collect::<Vec<String>>()
        .join("\n");
}

#[test]
fn it_edits_single_lines() {
    let mut text = "ab".to_string();

    edit_line(&mut text, &char_input('c'));
    assert_eq!(text, "abc");

    edit_line(&mut text, &key_input(Key::Backspace));
    assert_eq!(text, "ab");

    edit_line(&mut text, &ctrl_input('x'));
    assert_eq!(text, "ab");
}

#[test]
fn it_conceals_raw_keys_only() {
    assert_eq!(
        key_field_text("sk-proj-...WXYZ", KeyDisplay::Concealed),
        "sk-proj-...WXYZ"
    );
    assert_eq!(key_field_text("sk-raw", KeyDisplay::Concealed), "••••••");
    assert_eq!(key_field_text("sk-raw", KeyDisplay::Revealed), "sk-raw");
}

#[tokio::test]
async fn it_skips_hidden_npc_tags() {
    let (mut controller, mut form, _action_rx, _event_rx) = setup();
    form.focus = FormField::Mode;

    form.move_focus(&mut controller, true);
    assert_eq!(form.focus, FormField::Model);

    controller.set_mode(GenerationMode::Encounter);
    form.focus = FormField::Mode;
    form.move_focus(&mut controller, true);
    assert_eq!(form.focus, FormField::NpcTags);
}

#[tokio::test]
async fn it_commits_numeric_drafts_on_focus_change() {
    let (mut controller, mut form, _action_rx, _event_rx) = setup();
    form.focus = FormField::Numeric(NumericField::Temperature);

    form.handle_input(&mut controller, char_input('1'));
    form.handle_input(&mut controller, char_input('.'));
    form.handle_input(&mut controller, char_input('5'));
    assert_eq!(form.numeric_draft.as_deref(), Some("1.5"));
    assert_eq!(controller.config.temperature, 0.7);

    form.move_focus(&mut controller, true);
    assert_eq!(controller.config.temperature, 1.5);
    assert_eq!(form.numeric_draft, None);
}

#[tokio::test]
async fn it_rejects_non_numeric_drafts() {
    let (mut controller, mut form, _action_rx, _event_rx) = setup();
    form.focus = FormField::Numeric(NumericField::MaxTokens);

    form.handle_input(&mut controller, char_input('x'));
    form.handle_enter(&mut controller);

    assert_eq!(controller.config.max_tokens, 4000);
    assert_eq!(
        controller.view.notifications.last().unwrap().kind,
        NotificationKind::Warning
    );
}

#[tokio::test]
async fn it_steps_and_cycles_with_arrows() {
    let (mut controller, mut form, _action_rx, _event_rx) = setup();

    form.focus = FormField::Numeric(NumericField::TopP);
    form.handle_input(&mut controller, key_input(Key::Right));
    assert_eq!(controller.view.readouts.get(NumericField::TopP), "0.95");

    form.focus = FormField::Model;
    form.handle_input(&mut controller, key_input(Key::Right));
    assert_eq!(controller.config.model, "gpt-4.1-mini");

    form.focus = FormField::Mode;
    form.handle_input(&mut controller, key_input(Key::Left));
    assert_eq!(controller.config.mode, GenerationMode::Encounter);
}

#[tokio::test]
async fn it_saves_keys_with_enter() {
    let (mut controller, mut form, _action_rx, _event_rx) = setup();
    form.focus = FormField::ApiKey;

    form.handle_paste(&mut controller, "sk-proj-1234567890abcdefWXYZ\n");
    form.handle_enter(&mut controller);

    assert_eq!(controller.config.api_key, "sk-proj-1234567890abcdefWXYZ");
    assert_eq!(controller.view.key_field, "sk-proj-...WXYZ");
}

#[tokio::test]
async fn it_mirrors_typed_descriptions() {
    let (mut controller, mut form, mut action_rx, _event_rx) = setup();

    form.handle_input(&mut controller, char_input('h'));
    form.handle_input(&mut controller, char_input('i'));
    form.handle_enter(&mut controller);
    form.handle_paste(&mut controller, "there");
    assert_eq!(controller.view.description, "hi\nthere");

    assert!(form.handle_hotkey(&mut controller, &ctrl_input('g')));
    match action_rx.try_recv().unwrap() {
        Action::BackendRequest(req) => assert_eq!(req.input, "hi\nthere"),
        action => panic!("Unexpected action {action:?}"),
    }
}

#[tokio::test]
async fn it_renders_the_form() -> Result<()> {
    let (mut controller, mut form, _action_rx, _event_rx) = setup();
    let mut terminal = Terminal::new(TestBackend::new(120, 40))?;

    form.sync(&controller);
    terminal.draw(|frame| {
        render(frame, &mut form, &controller);
    })?;
    let text = buffer_text(&terminal);
    assert!(text.contains("Settings"));
    assert!(text.contains("The generated Lua script will be shown here"));
    assert!(text.contains("gpt-4.1"));

    controller.view.display_result("local zone = CreateZone()");
    form.sync(&controller);
    terminal.draw(|frame| {
        render(frame, &mut form, &controller);
    })?;
    let text = buffer_text(&terminal);
    assert!(text.contains("local zone = CreateZone()"));

    return Ok(());
}

#[tokio::test]
async fn it_expires_notifications_during_steady_input() {
    let (mut controller, mut form, _action_rx, _event_rx) = setup();
    let start = Instant::now();
    controller.view.notify(NotificationKind::Success, "API key saved");
    controller.view.set_key_status(
        KeyStatusKind::Saved,
        "Saved",
        Some(start + Duration::from_secs(3)),
    );

    for step in 1..=9 {
        let now = start + Duration::from_millis(400 * step);
        let event = if step % 2 == 0 {
            Event::UIScrollDown()
        } else {
            Event::KeyboardCharInput(char_input('a'))
        };
        assert!(handle_event(&mut controller, &mut form, event, now));

        if step < 7 {
            assert_eq!(controller.view.notifications.len(), 1);
            assert!(controller.view.key_status.is_some());
        }
    }

    assert!(controller.view.notifications.is_empty());
    assert!(controller.view.key_status.is_none());
    assert!(!handle_event(
        &mut controller,
        &mut form,
        Event::KeyboardCTRLC(),
        Instant::now()
    ));
}
