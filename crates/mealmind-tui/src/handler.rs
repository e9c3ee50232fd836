use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mealmind_core::{ScreenId, Status};

use crate::app::{App, FormField, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::ScreenLoaded { ticket, result } => app.on_screen_loaded(ticket, result),
        AppEvent::ImageLoaded { ticket, result } => app.on_image_loaded(ticket, result),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // A notice lasts until the next key, then the hints come back
    app.notice = None;

    if app.show_api_key_input {
        handle_api_key_input(app, key);
        return;
    }

    match app.session.status() {
        Status::Idle => match app.input_mode {
            InputMode::Normal => handle_form_normal(app, key),
            InputMode::Editing => handle_form_editing(app, key),
        },
        Status::Loading | Status::Error => handle_screen_keys(app, key),
        Status::Success => handle_success(app, key),
    }
}

fn handle_api_key_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_api_key_input(),
        KeyCode::Enter => app.save_api_key(),
        KeyCode::Backspace => {
            if app.api_key_input_cursor > 0 {
                app.api_key_input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
                app.api_key_input.remove(byte_pos);
            }
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
            app.api_key_input.insert(byte_pos, c);
            app.api_key_input_cursor += 1;
        }
        KeyCode::Left => {
            app.api_key_input_cursor = app.api_key_input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.api_key_input.chars().count();
            app.api_key_input_cursor = (app.api_key_input_cursor + 1).min(char_count);
        }
        _ => {}
    }
}

fn handle_form_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => app.next_field(),
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => app.prev_field(),

        KeyCode::Char('l') | KeyCode::Right => match app.form_field {
            FormField::FoodType | FormField::SpiceLevel => app.activate_field(),
            _ => app.chip_right(),
        },
        KeyCode::Char('h') | KeyCode::Left => app.chip_left(),

        KeyCode::Char('i') | KeyCode::Enter if app.form_field.is_text() => {
            if app.form_field == FormField::Inventory {
                app.input_cursor = app.session.input().chars().count();
            }
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char(' ') | KeyCode::Enter => app.activate_field(),

        KeyCode::Char('s') => app.submit(),
        KeyCode::Char('K') => app.open_api_key_input(),

        _ => {}
    }
}

fn handle_form_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            app.next_field();
        }
        _ if app.form_field == FormField::Inventory => handle_inventory_editing(app, key),
        _ => handle_detail_editing(app, key),
    }
}

fn handle_inventory_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit(),
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let input = app.session.input_mut();
                let byte_pos = char_to_byte_index(input, app.input_cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let input = app.session.input_mut();
            if app.input_cursor < input.chars().count() {
                let byte_pos = char_to_byte_index(input, app.input_cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.session.input().chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.session.input().chars().count();
        }
        KeyCode::Char(c) => {
            let input = app.session.input_mut();
            let byte_pos = char_to_byte_index(input, app.input_cursor);
            input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

/// Baby age and pet details are short, so they only append and delete.
fn handle_detail_editing(app: &mut App, key: KeyEvent) {
    let field = app.form_field;
    match key.code {
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            let mut text = app.detail_text(field);
            text.pop();
            app.set_detail_text(field, &text);
        }
        KeyCode::Char(c) => {
            let mut text = app.detail_text(field);
            text.push(c);
            app.set_detail_text(field, &text);
        }
        _ => {}
    }
}

/// Navigation shared by every non-form state, including loading and error.
fn handle_screen_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('h') => app.navigate(ScreenId::Home),
        KeyCode::Char('i') => app.navigate(ScreenId::Inventory),
        KeyCode::Char('m') => app.navigate(ScreenId::MealList),
        KeyCode::Char('z') => app.navigate(ScreenId::ZeroWaste),
        KeyCode::Char('r') => app.reset(),
        KeyCode::Char('K') => app.open_api_key_input(),
        _ => {}
    }
}

fn handle_success(app: &mut App, key: KeyEvent) {
    let screen = app.session.current_screen();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.list_down(),
        KeyCode::Char('k') | KeyCode::Up => app.list_up(),

        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.content_scroll = app.content_scroll.saturating_add(10);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.content_scroll = app.content_scroll.saturating_sub(10);
        }

        KeyCode::Enter if screen == Some(ScreenId::MealList) => app.open_selected_recipe(),

        // Home stat tiles
        KeyCode::Char('1') | KeyCode::Char('2') if screen == Some(ScreenId::Home) => {
            app.navigate(ScreenId::Inventory)
        }
        KeyCode::Char('3') if screen == Some(ScreenId::Home) => app.navigate(ScreenId::MealList),

        KeyCode::Char('g') if screen == Some(ScreenId::RecipeDetail) => app.generate_image(),
        KeyCode::Char('w') if screen == Some(ScreenId::RecipeDetail) => app.save_image(),
        KeyCode::Char('b') | KeyCode::Esc if screen == Some(ScreenId::RecipeDetail) => {
            app.navigate(ScreenId::MealList)
        }

        _ => handle_screen_keys(app, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealmind_core::Config;
    use tokio::sync::mpsc;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::with_services(Config::new(), tx, None);
        app.close_api_key_input();
        app
    }

    #[test]
    fn char_to_byte_index_handles_multibyte() {
        assert_eq!(char_to_byte_index("jalapeño", 7), 8);
        assert_eq!(char_to_byte_index("jalapeño", 20), "jalapeño".len());
        assert_eq!(char_to_byte_index("", 0), 0);
    }

    #[test]
    fn inventory_editing_moves_cursor() {
        let mut app = app();
        type_str(&mut app, "eggs milk");
        press(&mut app, KeyCode::Home);
        type_str(&mut app, "3 ");
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.session.input(), "3 eggs mil");

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.session.input(), " eggs mil");
    }

    #[test]
    fn detail_fields_edit_preferences() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        app.form_field = FormField::PetMode;
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.form_field, FormField::PetDetails);

        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "Catt");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.session.preferences().current().pet_details(), Some("Cat"));
    }

    #[test]
    fn api_key_popup_captures_keys() {
        let mut app = app();
        app.open_api_key_input();
        type_str(&mut app, "qk");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.api_key_input, "k");
        assert!(!app.should_quit);
        assert_eq!(app.session.input(), "");

        press(&mut app, KeyCode::Esc);
        assert!(!app.show_api_key_input);
    }

    #[test]
    fn next_key_dismisses_notice() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        app.notice = Some("Saved image to /tmp/dal.png".to_string());

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.notice, None);
        assert_eq!(app.form_field, FormField::FoodType);
    }

    #[test]
    fn ctrl_c_quits_from_anywhere() {
        let mut app = app();
        app.open_api_key_input();
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }
}
