// ============================================================================
// SESSION - Per-language study state
// ============================================================================
//
// Owns everything one language session mutates. Every mutation writes the
// known set, hide flag and page cursor back to the store before returning.

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::columns::{ColumnMapping, ColumnToggle, ColumnVisibility};
use crate::dataset::{Dataset, dataset_path};
use crate::pager::{PAGE_SIZE, Pager};
use crate::selection::{EXPORT_BATCH, SelectionSet};
use crate::storage::{KeyValueStore, load_json_or_default, storage_key};

const SELECTED_ITEMS: &str = "selectedItems";
const IS_HIDING: &str = "isHiding";
const START_INDEX: &str = "startIndex";

const CHINESE_LESSON_VIDEOS: [&str; 4] = [
    "https://www.youtube.com/embed/5ZmgiEcfN7U",
    "https://www.youtube.com/embed/w9m6bPczqoc",
    "https://www.youtube.com/embed/4TvMvpVg0Z4?si=wsP1NmtfkinWRZyS",
    "https://www.youtube.com/embed/yb6R23cKPy4?si=zE6m4__VwMA1AkSi",
];

pub struct Session {
    language: String,
    dataset: Dataset,
    mapping: ColumnMapping,
    selection: SelectionSet,
    pager: Pager,
    columns: ColumnVisibility,
    load_failed: bool,
}

impl Session {
    /// Load `{data_dir}/{language}.csv`. A load failure is logged and leaves
    /// the session with no words.
    pub fn open(language: &str, data_dir: &Path, store: &dyn KeyValueStore) -> Self {
        let path = dataset_path(data_dir, language);
        match Dataset::load(&path) {
            Ok(dataset) => Self::restore(language, dataset, store),
            Err(e) => {
                error!("CSV load error: {e:#}");
                let mut session = Self::restore(language, Dataset::default(), store);
                session.load_failed = true;
                session
            }
        }
    }

    pub fn restore(language: &str, dataset: Dataset, store: &dyn KeyValueStore) -> Self {
        let mapping = ColumnMapping::for_language(language);
        let selection = load_selection(language, &dataset, store);
        let hiding: bool = load_json_or_default(store, &storage_key(IS_HIDING, language));
        let cursor = store
            .get(&storage_key(START_INDEX, language))
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let pager = Pager::restore(dataset.len(), &selection, hiding, cursor);

        info!(
            language,
            words = dataset.len(),
            known = selection.known_count(),
            hiding,
            cursor = pager.cursor(),
            "session restored"
        );

        Self {
            language: language.to_string(),
            columns: ColumnVisibility::for_mapping(&mapping),
            dataset,
            mapping,
            selection,
            pager,
            load_failed: false,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn columns(&self) -> &ColumnVisibility {
        &self.columns
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn is_known(&self, index: usize) -> bool {
        self.selection.contains(index)
    }

    pub fn known_count(&self) -> usize {
        self.selection.known_count()
    }

    pub fn current_page(&self) -> &[usize] {
        self.pager.current_page()
    }

    pub fn page_label(&self) -> Option<String> {
        self.pager.page_label()
    }

    /// Flip the known state of the word at `index`. Returns the new state,
    /// or `None` if no such word exists.
    pub fn toggle(&mut self, index: usize, store: &mut dyn KeyValueStore) -> Option<bool> {
        let record = self.dataset.get(index)?;
        let known = self.selection.toggle(index, record);
        self.pager.refresh(&self.selection);
        debug!(index, known, "toggled word");
        self.persist(store);
        Some(known)
    }

    pub fn hide_known(&mut self, store: &mut dyn KeyValueStore) {
        self.pager.hide_known(&self.selection);
        info!(visible = self.pager.visible().len(), "hiding known words");
        self.persist(store);
    }

    /// Re-read the known set from the store first; another session may have
    /// written it since this one loaded.
    pub fn show_all(&mut self, store: &mut dyn KeyValueStore) {
        if let Err(e) = store.reload() {
            warn!("store reload failed: {e:#}");
        }
        self.selection = load_selection(&self.language, &self.dataset, store);
        self.pager.show_all(&self.selection);
        info!(known = self.selection.known_count(), "showing all words");
        self.persist(store);
    }

    pub fn next_page(&mut self, store: &mut dyn KeyValueStore) -> bool {
        let moved = self.pager.advance();
        if moved {
            self.persist(store);
        }
        moved
    }

    pub fn prev_page(&mut self, store: &mut dyn KeyValueStore) -> bool {
        let moved = self.pager.retreat();
        if moved {
            self.persist(store);
        }
        moved
    }

    pub fn reset(&mut self, store: &mut dyn KeyValueStore) {
        self.selection = SelectionSet::new();
        self.pager.reset();
        if self.load_failed {
            return;
        }
        for purpose in [SELECTED_ITEMS, START_INDEX, IS_HIDING] {
            if let Err(e) = store.remove(&storage_key(purpose, &self.language)) {
                warn!("failed to clear {}: {e:#}", purpose);
            }
        }
        info!(language = %self.language, "progress reset");
        self.persist(store);
    }

    /// Returns the new visibility, or `None` when the language has no such column.
    pub fn toggle_column(&mut self, toggle: ColumnToggle) -> Option<bool> {
        self.mapping.column(toggle)?;
        Some(self.columns.toggle(toggle))
    }

    pub fn export_known(&self) -> Option<String> {
        self.selection
            .export_known(&self.mapping)
            .map(|words| words.join("\n"))
    }

    pub fn export_next_unknown(&self) -> Option<String> {
        self.selection
            .export_next_unknown(
                self.pager.current_page(),
                &self.dataset,
                &self.mapping,
                EXPORT_BATCH,
            )
            .map(|words| words.join("\n"))
    }

    /// Chinese lesson video for the current page, while all words are shown.
    pub fn lesson_video(&self) -> Option<&'static str> {
        if self.language != "chinese" || self.pager.is_hiding() {
            return None;
        }
        CHINESE_LESSON_VIDEOS
            .get(self.pager.cursor() / PAGE_SIZE)
            .copied()
    }

    // Stored progress belongs to a word list this session never saw, so a
    // failed load must not overwrite it.
    fn persist(&self, store: &mut dyn KeyValueStore) {
        if self.load_failed {
            debug!(language = %self.language, "word list missing, not saving");
            return;
        }
        let writes = vec![
            (
                storage_key(SELECTED_ITEMS, &self.language),
                serde_json::to_string(&self.selection).unwrap_or_else(|_| "{}".to_string()),
            ),
            (storage_key(IS_HIDING, &self.language), self.pager.is_hiding().to_string()),
            (storage_key(START_INDEX, &self.language), self.pager.cursor().to_string()),
        ];
        if let Err(e) = store.set_many(writes) {
            warn!(language = %self.language, "failed to save progress: {e:#}");
        }
    }
}

fn load_selection(language: &str, dataset: &Dataset, store: &dyn KeyValueStore) -> SelectionSet {
    let mut selection: SelectionSet =
        load_json_or_default(store, &storage_key(SELECTED_ITEMS, language));
    let dropped = selection.retain_valid(dataset);
    if dropped > 0 {
        warn!(dropped, "discarded known words outside the word list");
    }
    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Record;
    use crate::storage::MemoryStore;

    fn japanese(n: usize) -> Dataset {
        Dataset::new(
            (0..n)
                .map(|i| {
                    Record::new(vec![
                        ("Kanji".to_string(), format!("字{}", i)),
                        ("Kana".to_string(), format!("じ{}", i)),
                        ("English".to_string(), format!("char{}", i)),
                        ("Romaji".to_string(), format!("ji{}", i)),
                    ])
                })
                .collect(),
        )
    }

    #[test]
    fn state_survives_a_new_session() {
        let mut store = MemoryStore::new();
        let mut session = Session::restore("japanese", japanese(250), &store);
        session.toggle(3, &mut store);
        session.toggle(140, &mut store);
        session.next_page(&mut store);

        let reopened = Session::restore("japanese", japanese(250), &store);
        assert_eq!(reopened.known_count(), 2);
        assert!(reopened.is_known(140));
        assert_eq!(reopened.pager().cursor(), 100);
        assert_eq!(store.get("startIndex-japanese").as_deref(), Some("100"));
        assert_eq!(store.get("isHiding-japanese").as_deref(), Some("false"));
    }

    #[test]
    fn sessions_are_isolated_by_language() {
        let mut store = MemoryStore::new();
        let mut session = Session::restore("japanese", japanese(10), &store);
        session.toggle(1, &mut store);

        let other = Session::restore("chinese", japanese(10), &store);
        assert_eq!(other.known_count(), 0);
    }

    #[test]
    fn toggle_out_of_range_is_ignored() {
        let mut store = MemoryStore::new();
        let mut session = Session::restore("japanese", japanese(10), &store);
        assert_eq!(session.toggle(10, &mut store), None);
        assert_eq!(session.known_count(), 0);
    }

    #[test]
    fn toggle_twice_keeps_count() {
        let mut store = MemoryStore::new();
        let mut session = Session::restore("japanese", japanese(10), &store);
        session.toggle(4, &mut store);
        let count = session.known_count();
        assert_eq!(session.toggle(6, &mut store), Some(true));
        assert_eq!(session.toggle(6, &mut store), Some(false));
        assert_eq!(session.known_count(), count);
    }

    #[test]
    fn show_all_picks_up_selection_written_elsewhere() {
        let mut store = MemoryStore::new();
        let mut session = Session::restore("japanese", japanese(10), &store);
        session.hide_known(&mut store);

        let mut other = Session::restore("japanese", japanese(10), &store);
        other.toggle(8, &mut store);

        assert!(!session.is_known(8));
        session.show_all(&mut store);
        assert!(session.is_known(8));
        assert_eq!(session.pager().visible().len(), 10);
    }

    #[test]
    fn reset_twice_matches_reset_once() {
        let mut store = MemoryStore::new();
        let mut session = Session::restore("japanese", japanese(300), &store);
        session.toggle(0, &mut store);
        session.next_page(&mut store);
        session.hide_known(&mut store);

        session.reset(&mut store);
        let once = (
            session.known_count(),
            session.pager().clone(),
            store.get("selectedItems-japanese"),
        );
        session.reset(&mut store);
        let twice = (
            session.known_count(),
            session.pager().clone(),
            store.get("selectedItems-japanese"),
        );

        assert_eq!(once, twice);
        assert_eq!(session.known_count(), 0);
        assert_eq!(session.pager().cursor(), 0);
        assert!(!session.pager().is_hiding());
        assert_eq!(session.pager().visible().len(), 300);
        assert_eq!(store.get("selectedItems-japanese").as_deref(), Some("{}"));
    }

    #[test]
    fn exports_join_headwords_with_newlines() {
        let mut store = MemoryStore::new();
        let mut session = Session::restore("japanese", japanese(30), &store);
        assert_eq!(session.export_known(), None);

        session.toggle(5, &mut store);
        session.toggle(1, &mut store);
        assert_eq!(session.export_known().as_deref(), Some("字1\n字5"));

        let next = session.export_next_unknown().unwrap();
        let lines: Vec<&str> = next.lines().collect();
        assert_eq!(lines.len(), 20);
        assert_eq!(&lines[..3], &["字0", "字2", "字3"]);
    }

    #[test]
    fn column_toggle_requires_mapped_column() {
        let store = MemoryStore::new();
        let mut session = Session::restore("chinese", Dataset::default(), &store);
        assert_eq!(session.toggle_column(ColumnToggle::Example), None);
        assert_eq!(session.toggle_column(ColumnToggle::Phonetic), Some(false));
        assert!(!session.columns().phonetic);
    }

    #[test]
    fn lesson_video_only_for_chinese_while_showing_all() {
        let mut store = MemoryStore::new();
        let mut session = Session::restore("chinese", japanese(600), &store);
        assert_eq!(session.lesson_video(), Some(CHINESE_LESSON_VIDEOS[0]));
        session.next_page(&mut store);
        assert_eq!(session.lesson_video(), Some(CHINESE_LESSON_VIDEOS[1]));
        for _ in 0..3 {
            session.next_page(&mut store);
        }
        assert_eq!(session.lesson_video(), None);

        session.hide_known(&mut store);
        assert_eq!(session.lesson_video(), None);

        let japanese_session = Session::restore("japanese", japanese(10), &store);
        assert_eq!(japanese_session.lesson_video(), None);
    }

    #[test]
    fn missing_word_list_leaves_session_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let session = Session::open("french", dir.path(), &store);
        assert!(session.load_failed());
        assert!(session.current_page().is_empty());
        assert_eq!(session.page_label(), None);
    }

    #[test]
    fn missing_word_list_keeps_stored_progress() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MemoryStore::new();
        let saved = r#"{"1":{"French":"mot1"},"5":{"French":"mot5"}}"#;
        store.set("selectedItems-french", saved.to_string()).unwrap();
        store.set("startIndex-french", "300".to_string()).unwrap();
        store.set("isHiding-french", "true".to_string()).unwrap();

        let mut session = Session::open("french", dir.path(), &store);
        session.hide_known(&mut store);
        session.show_all(&mut store);
        session.next_page(&mut store);
        session.reset(&mut store);

        assert_eq!(store.get("selectedItems-french").as_deref(), Some(saved));
        assert_eq!(store.get("startIndex-french").as_deref(), Some("300"));
        assert_eq!(store.get("isHiding-french").as_deref(), Some("true"));
    }

    #[test]
    fn corrupt_stored_state_is_replaced_by_defaults() {
        let mut store = MemoryStore::new();
        store.set("selectedItems-japanese", "[1,2".to_string()).unwrap();
        store.set("startIndex-japanese", "abc".to_string()).unwrap();
        let session = Session::restore("japanese", japanese(10), &store);
        assert_eq!(session.known_count(), 0);
        assert_eq!(session.pager().cursor(), 0);
    }
}
