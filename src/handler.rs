use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::{App, ReplyEvent};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key)?,
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work whether or not the panel is open
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }
    if key.code == KeyCode::Char('t') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.toggle();
        return Ok(());
    }

    if app.visible {
        handle_panel_key(app, key);
    } else {
        handle_closed_key(app, key);
    }

    Ok(())
}

fn handle_closed_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') | KeyCode::Enter => app.open(),
        _ => {}
    }
}

fn handle_panel_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close(),

        // Send. Overlapping sends are allowed; each spawns its own task
        // and replies land in arrival order.
        KeyCode::Enter => {
            if let Some(text) = app.submit() {
                dispatch(app, text);
            }
        }

        // Transcript scrolling
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),

        // Input editing
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

/// Spawn one round trip. The task outlives any close of the panel; its
/// reply still renders into the transcript when it arrives.
fn dispatch(app: &App, text: String) {
    let client = app.client.clone();
    let tx = app.reply_tx.clone();

    tokio::spawn(async move {
        let event = match client.send(&text).await {
            Ok(reply) => ReplyEvent::Reply(reply),
            Err(e) => ReplyEvent::Failed(format!("Error: {e:#}")),
        };
        // Receiver gone means the UI loop has exited; nothing to render.
        let _ = tx.send(event);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ChatRole;
    use crate::config::Config;
    use crossterm::event::KeyEvent;
    use tokio::sync::mpsc;

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(&Config::new(), tx)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::from(code)).unwrap();
    }

    #[test]
    fn open_and_close_keys() {
        let mut app = test_app();
        assert!(!app.visible);

        press(&mut app, KeyCode::Char('c'));
        assert!(app.visible);

        press(&mut app, KeyCode::Esc);
        assert!(!app.visible);

        // Esc on an already-closed panel stays closed
        press(&mut app, KeyCode::Esc);
        assert!(!app.visible);
    }

    #[test]
    fn typing_goes_to_input_when_open() {
        let mut app = test_app();
        app.open();

        for c in "hey".chars() {
            press(&mut app, KeyCode::Char(c));
        }

        assert_eq!(app.input, "hey");
        assert_eq!(app.input_cursor, 3);
    }

    #[test]
    fn cursor_editing_is_utf8_safe() {
        let mut app = test_app();
        app.open();

        for c in "héllo".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace);

        assert_eq!(app.input, "hélo");
        assert_eq!(app.input_cursor, 2);

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.input, "élo");
    }

    #[tokio::test]
    async fn enter_on_empty_input_sends_nothing() {
        let mut app = test_app();
        app.open();

        press(&mut app, KeyCode::Enter);

        assert!(app.transcript.is_empty());
        assert_eq!(app.pending, 0);
    }

    #[tokio::test]
    async fn enter_dispatches_and_appends_user_entry() {
        let mut app = test_app();
        app.open();

        for c in "hello".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.transcript.len(), 1);
        assert_eq!(app.transcript[0].role, ChatRole::User);
        assert_eq!(app.input, "");
        assert_eq!(app.pending, 1);
    }

    #[test]
    fn ctrl_t_toggles_from_either_state() {
        let mut app = test_app();

        let toggle = KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL);
        handle_key(&mut app, toggle).unwrap();
        assert!(app.visible);

        handle_key(&mut app, toggle).unwrap();
        assert!(!app.visible);

        // Open panel: Ctrl-T still toggles instead of typing a 't'
        app.open();
        handle_key(&mut app, toggle).unwrap();
        assert!(!app.visible);
        assert_eq!(app.input, "");
    }

    #[test]
    fn quit_keys() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = test_app();
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        )
        .unwrap();
        assert!(app.should_quit);
    }
}
