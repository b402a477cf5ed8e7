// ============================================================================
// APP - UI state and event handling
// ============================================================================
//
// Keyboard and mouse input both resolve to a `Control` and go through
// `App::apply`, so every button has exactly one behaviour.

use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::{info, warn};

use crate::clipboard;
use crate::columns::{ColumnToggle, LANGUAGES};
use crate::layout::Viewport;
use crate::session::Session;
use crate::storage::KeyValueStore;
use crate::theme::{DEFAULT_THEME, THEME_KEY, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    LanguageSelect,
    Study,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    Return,
    PrevPage,
    NextPage,
    HideKnown,
    ShowAll,
    Reset,
    ExportKnown,
    ExportNextUnknown,
    Column(ColumnToggle),
    NextTheme,
    PrevTheme,
    OpenVideo,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Warning, message: message.into() }
    }

    fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }
}

pub struct AppConfig {
    pub data_dir: PathBuf,
    pub touch: bool,
}

pub struct App {
    pub screen: Screen,
    pub config: AppConfig,
    pub store: Box<dyn KeyValueStore>,
    pub theme: &'static Theme,
    pub language_idx: usize,
    pub session: Option<Session>,
    pub viewport: Viewport,
    pub notice: Option<Notice>,
    pub should_quit: bool,

    // Keyboard focus within the current page, and grid scroll in rows
    pub focus: usize,
    pub row_scroll: usize,

    // UI areas for mouse support
    pub cell_items: Vec<(usize, Rect)>, // (original index, clickable area)
    pub control_btns: Vec<(Control, Rect)>,
    pub language_items: Vec<(usize, Rect)>,
}

impl App {
    pub fn new(config: AppConfig, store: Box<dyn KeyValueStore>) -> Self {
        let theme_name = store
            .get(THEME_KEY)
            .unwrap_or_else(|| DEFAULT_THEME.to_string());
        let viewport = Viewport::from_terminal(80, 0, config.touch);
        Self {
            screen: Screen::LanguageSelect,
            theme: Theme::by_name(&theme_name),
            config,
            store,
            language_idx: 0,
            session: None,
            viewport,
            notice: None,
            should_quit: false,
            focus: 0,
            row_scroll: 0,
            cell_items: Vec::new(),
            control_btns: Vec::new(),
            language_items: Vec::new(),
        }
    }

    pub fn selected_language(&self) -> &'static str {
        LANGUAGES[self.language_idx.min(LANGUAGES.len() - 1)]
    }

    pub fn start_session(&mut self, language: &str) {
        if let Some(idx) = LANGUAGES.iter().position(|l| *l == language) {
            self.language_idx = idx;
        }
        let session = Session::open(language, &self.config.data_dir, &*self.store);
        self.session = Some(session);
        self.screen = Screen::Study;
        self.reset_view();
    }

    pub fn refresh_viewport(&mut self) {
        self.viewport = Viewport::detect(self.config.touch);
    }

    fn reset_view(&mut self) {
        self.focus = 0;
        self.row_scroll = 0;
    }

    fn page_len(&self) -> usize {
        self.session
            .as_ref()
            .map(|s| s.current_page().len())
            .unwrap_or(0)
    }

    fn clamp_focus(&mut self) {
        self.focus = self.focus.min(self.page_len().saturating_sub(1));
    }

    pub fn apply(&mut self, control: Control) {
        match control {
            Control::Quit => self.should_quit = true,
            Control::NextTheme => self.set_theme(self.theme.next()),
            Control::PrevTheme => self.set_theme(self.theme.prev()),
            Control::Start => {
                let language = self.selected_language();
                self.start_session(language);
            }
            Control::Return => {
                self.session = None;
                self.screen = Screen::LanguageSelect;
                self.cell_items.clear();
            }
            _ => self.apply_to_session(control),
        }
    }

    fn apply_to_session(&mut self, control: Control) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let store = &mut *self.store;

        match control {
            Control::NextPage => {
                if session.next_page(store) {
                    self.reset_view();
                }
            }
            Control::PrevPage => {
                if session.prev_page(store) {
                    self.reset_view();
                }
            }
            Control::HideKnown => {
                session.hide_known(store);
                self.reset_view();
            }
            Control::ShowAll => {
                session.show_all(store);
                self.reset_view();
            }
            Control::Reset => {
                session.reset(store);
                self.reset_view();
            }
            Control::Column(toggle) => {
                session.toggle_column(toggle);
            }
            Control::ExportKnown => {
                let text = session.export_known();
                self.copy_export(text, "No known words to copy.", "Known words copied!");
            }
            Control::ExportNextUnknown => {
                let text = session.export_next_unknown();
                self.copy_export(text, "No unknown words left.", "Next 20 unknown words copied!");
            }
            Control::OpenVideo => {
                if let Some(url) = session.lesson_video() {
                    if let Err(e) = open::that(url) {
                        warn!("failed to open {}: {}", url, e);
                        self.notice = Some(Notice::error(format!("Could not open video:\n{}", url)));
                    }
                }
            }
            _ => {}
        }
        self.clamp_focus();
    }

    fn copy_export(&mut self, text: Option<String>, empty: &str, done: &str) {
        let Some(text) = text else {
            self.notice = Some(Notice::warning(empty));
            return;
        };
        self.notice = Some(match clipboard::copy_text(&text) {
            Ok(()) => Notice::success(done),
            Err(e) => {
                warn!("clipboard write failed: {e:#}");
                Notice::error(format!("{}\n\nCopy these words manually:\n{}", e, text))
            }
        });
    }

    fn set_theme(&mut self, theme: &'static Theme) {
        self.theme = theme;
        if let Err(e) = self.store.set(THEME_KEY, theme.name.to_string()) {
            warn!("failed to save theme: {e:#}");
        }
        info!(theme = theme.name, "theme changed");
    }

    pub fn toggle_focused(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(&index) = session.current_page().get(self.focus) {
            session.toggle(index, &mut *self.store);
        }
        self.clamp_focus();
    }

    fn move_focus(&mut self, delta: isize) {
        let len = self.page_len();
        if len == 0 {
            return;
        }
        let target = self.focus as isize + delta;
        if (0..len as isize).contains(&target) {
            self.focus = target as usize;
        }
    }
}

// ============================================================================
// EVENT HANDLING
// ============================================================================

/// Returns true when the app should exit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    if app.notice.is_some() {
        app.notice = None;
        return Ok(false);
    }

    match app.screen {
        Screen::LanguageSelect => handle_language_key(app, key),
        Screen::Study => handle_study_key(app, key),
    }

    Ok(app.should_quit)
}

fn handle_language_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up => app.language_idx = app.language_idx.saturating_sub(1),
        KeyCode::Down => {
            app.language_idx = (app.language_idx + 1).min(LANGUAGES.len() - 1);
        }
        KeyCode::Left => app.apply(Control::PrevTheme),
        KeyCode::Right | KeyCode::Char('t') => app.apply(Control::NextTheme),
        KeyCode::Enter => app.apply(Control::Start),
        KeyCode::Esc | KeyCode::Char('q') => app.apply(Control::Quit),
        _ => {}
    }
}

fn handle_study_key(app: &mut App, key: KeyEvent) {
    let columns = app.viewport.column_count() as isize;
    let control = match key.code {
        KeyCode::Char('q') => Some(Control::Quit),
        KeyCode::Esc | KeyCode::Char('b') => Some(Control::Return),
        KeyCode::Char('n') | KeyCode::PageDown => Some(Control::NextPage),
        KeyCode::Char('p') | KeyCode::PageUp => Some(Control::PrevPage),
        KeyCode::Char('f') => Some(Control::HideKnown),
        KeyCode::Char('a') => Some(Control::ShowAll),
        KeyCode::Char('R') => Some(Control::Reset),
        KeyCode::Char('e') => Some(Control::ExportKnown),
        KeyCode::Char('u') => Some(Control::ExportNextUnknown),
        KeyCode::Char('t') => Some(Control::NextTheme),
        KeyCode::Char('v') => Some(Control::OpenVideo),
        KeyCode::Char(c @ '1'..='4') => app.session.as_ref().and_then(|s| {
            let slot = c as usize - '1' as usize;
            s.mapping().available_toggles().get(slot).copied().map(Control::Column)
        }),
        KeyCode::Left => {
            app.move_focus(-1);
            None
        }
        KeyCode::Right => {
            app.move_focus(1);
            None
        }
        KeyCode::Up => {
            app.move_focus(-columns);
            None
        }
        KeyCode::Down => {
            app.move_focus(columns);
            None
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            app.toggle_focused();
            None
        }
        _ => None,
    };

    if let Some(control) = control {
        app.apply(control);
    }
}

pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.notice.is_some() {
                app.notice = None;
                return;
            }
            handle_mouse_left(app, mouse);
        }
        // The grid follows focus, so scrolling moves focus a row at a time.
        MouseEventKind::ScrollDown => {
            let columns = app.viewport.column_count() as isize;
            app.move_focus(columns);
        }
        MouseEventKind::ScrollUp => {
            let columns = app.viewport.column_count() as isize;
            app.move_focus(-columns);
        }
        _ => {}
    }
}

fn handle_mouse_left(app: &mut App, mouse: MouseEvent) {
    if let Some(control) = app
        .control_btns
        .iter()
        .find(|(_, rect)| inside_rect(mouse, *rect))
        .map(|(control, _)| *control)
    {
        app.apply(control);
        return;
    }

    match app.screen {
        Screen::LanguageSelect => {
            if let Some(idx) = find_clicked_item(mouse, &app.language_items) {
                app.language_idx = idx;
            }
        }
        Screen::Study => {
            if let Some(index) = find_clicked_item(mouse, &app.cell_items) {
                if let Some(session) = app.session.as_mut() {
                    if let Some(pos) = session.current_page().iter().position(|i| *i == index) {
                        app.focus = pos;
                    }
                    session.toggle(index, &mut *app.store);
                }
                app.clamp_focus();
            }
        }
    }
}

pub fn inside_rect(mouse: MouseEvent, rect: Rect) -> bool {
    mouse.row >= rect.y
        && mouse.row < rect.y + rect.height
        && mouse.column >= rect.x
        && mouse.column < rect.x + rect.width
}

// Helper: Find clicked item index from mouse event
fn find_clicked_item(mouse: MouseEvent, items: &[(usize, Rect)]) -> Option<usize> {
    items
        .iter()
        .find(|(_, rect)| inside_rect(mouse, *rect))
        .map(|(idx, _)| *idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::fs;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn app_with_words(n: usize) -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let mut csv = String::from("Hanzi,Pinyin,English\n");
        for i in 0..n {
            csv.push_str(&format!("字{},zi{},char{}\n", i, i, i));
        }
        fs::write(dir.path().join("chinese.csv"), csv).unwrap();

        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            touch: false,
        };
        let mut app = App::new(config, Box::new(MemoryStore::new()));
        app.start_session("chinese");
        (dir, app)
    }

    #[test]
    fn theme_is_restored_from_store() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "matcha".to_string()).unwrap();
        let config = AppConfig { data_dir: PathBuf::from("."), touch: false };
        let mut app = App::new(config, Box::new(store));
        assert_eq!(app.theme.name, "matcha");

        app.apply(Control::NextTheme);
        assert_eq!(app.store.get(THEME_KEY).as_deref(), Some(app.theme.name));
    }

    #[test]
    fn keys_drive_paging_and_toggling() {
        let (_dir, mut app) = app_with_words(250);
        assert_eq!(app.screen, Screen::Study);

        handle_key(&mut app, key(KeyCode::Right)).unwrap();
        handle_key(&mut app, key(KeyCode::Char(' '))).unwrap();
        assert!(app.session.as_ref().unwrap().is_known(1));

        handle_key(&mut app, key(KeyCode::Char('n'))).unwrap();
        assert_eq!(app.session.as_ref().unwrap().pager().cursor(), 100);
        assert_eq!(app.focus, 0);

        handle_key(&mut app, key(KeyCode::Char('p'))).unwrap();
        handle_key(&mut app, key(KeyCode::Char('f'))).unwrap();
        let session = app.session.as_ref().unwrap();
        assert!(session.pager().is_hiding());
        assert_eq!(session.current_page()[1], 2);
    }

    #[test]
    fn number_keys_toggle_available_columns() {
        let (_dir, mut app) = app_with_words(5);
        handle_key(&mut app, key(KeyCode::Char('1'))).unwrap();
        assert!(!app.session.as_ref().unwrap().columns().phonetic);
        // Chinese has two toggles; a third slot does nothing.
        handle_key(&mut app, key(KeyCode::Char('3'))).unwrap();
        assert!(app.session.as_ref().unwrap().columns().translation);
    }

    #[test]
    fn empty_export_shows_notice_that_any_key_dismisses() {
        let (_dir, mut app) = app_with_words(5);
        handle_key(&mut app, key(KeyCode::Char('e'))).unwrap();
        assert_eq!(app.notice, Some(Notice::warning("No known words to copy.")));

        handle_key(&mut app, key(KeyCode::Char('n'))).unwrap();
        assert_eq!(app.notice, None);
    }

    #[test]
    fn clicking_a_cell_toggles_its_word() {
        let (_dir, mut app) = app_with_words(10);
        app.cell_items = vec![(7, Rect::new(10, 5, 8, 3))];
        handle_mouse(&mut app, click(12, 6));
        assert!(app.session.as_ref().unwrap().is_known(7));
        assert_eq!(app.focus, 7);

        handle_mouse(&mut app, click(12, 6));
        assert!(!app.session.as_ref().unwrap().is_known(7));
    }

    #[test]
    fn clicking_a_button_applies_its_control() {
        let (_dir, mut app) = app_with_words(10);
        app.control_btns = vec![(Control::Return, Rect::new(0, 0, 10, 3))];
        handle_mouse(&mut app, click(3, 1));
        assert_eq!(app.screen, Screen::LanguageSelect);
        assert!(app.session.is_none());
    }

    #[test]
    fn missing_word_list_still_opens_empty_grid() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig { data_dir: dir.path().to_path_buf(), touch: false };
        let mut app = App::new(config, Box::new(MemoryStore::new()));
        app.apply(Control::Start);
        assert_eq!(app.screen, Screen::Study);
        let session = app.session.as_ref().unwrap();
        assert!(session.load_failed());
        handle_key(&mut app, key(KeyCode::Char(' '))).unwrap();
        handle_key(&mut app, key(KeyCode::Char('n'))).unwrap();
    }
}
