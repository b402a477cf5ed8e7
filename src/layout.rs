// ============================================================================
// LAYOUT - Responsive grid geometry and cell contents
// ============================================================================

use crate::columns::{ColumnMapping, ColumnToggle, ColumnVisibility};
use crate::dataset::Record;

// Nominal pixel width of one terminal column when the terminal does not
// report its pixel size.
const CELL_WIDTH_PX: u32 = 8;

const CJK_NUMERALS: [&str; 10] = ["一", "二", "三", "四", "五", "六", "七", "八", "九", "十"];
const FRENCH_NUMERALS: [&str; 10] = [
    "un", "deux", "trois", "quatre", "cinq", "six", "sept", "huit", "neuf", "dix",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width_px: u32,
    pub touch: bool,
}

impl Viewport {
    /// Prefer the reported pixel width; otherwise estimate it from columns.
    pub fn from_terminal(columns: u16, pixel_width: u16, touch: bool) -> Self {
        let width_px = if pixel_width > 0 {
            u32::from(pixel_width)
        } else {
            u32::from(columns) * CELL_WIDTH_PX
        };
        Self { width_px, touch }
    }

    pub fn detect(touch: bool) -> Self {
        match crossterm::terminal::window_size() {
            Ok(size) => Self::from_terminal(size.columns, size.width, touch),
            Err(_) => {
                let (columns, _) = crossterm::terminal::size().unwrap_or((80, 24));
                Self::from_terminal(columns, 0, touch)
            }
        }
    }

    pub fn column_count(&self) -> usize {
        if self.width_px < 768 || (self.touch && self.width_px < 1024) {
            4
        } else if self.width_px < 1300 {
            6
        } else {
            10
        }
    }
}

pub fn header_labels(language: &str, columns: usize) -> Vec<&'static str> {
    let numerals: &[&'static str] = if language == "french" {
        &FRENCH_NUMERALS
    } else {
        &CJK_NUMERALS
    };
    numerals.iter().copied().take(columns).collect()
}

/// Headword first, then each shown optional field in fixed order.
pub fn cell_lines(record: &Record, mapping: &ColumnMapping, flags: &ColumnVisibility) -> Vec<String> {
    let mut parts = vec![record.field_or_empty(mapping.headword).to_string()];
    for toggle in ColumnToggle::ALL {
        if let Some(column) = mapping.column(toggle) {
            if flags.is_shown(toggle) {
                parts.push(record.get(column).unwrap_or("").to_string());
            }
        }
    }

    // French cells get a blank line between fields.
    if mapping.example.is_some() {
        let mut spaced = Vec::with_capacity(parts.len() * 2);
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                spaced.push(String::new());
            }
            spaced.push(part);
        }
        spaced
    } else {
        parts
    }
}

/// Split a page into rows of `columns` cells, row-major.
pub fn grid_rows(page: &[usize], columns: usize) -> Vec<&[usize]> {
    page.chunks(columns.max(1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_count_follows_width_thresholds() {
        let at = |width_px, touch| Viewport { width_px, touch }.column_count();
        assert_eq!(at(767, false), 4);
        assert_eq!(at(768, false), 6);
        assert_eq!(at(1299, false), 6);
        assert_eq!(at(1300, false), 10);
        assert_eq!(at(1000, true), 4);
        assert_eq!(at(1024, true), 6);
        assert_eq!(at(1400, true), 10);
    }

    #[test]
    fn viewport_estimates_pixels_from_columns() {
        assert_eq!(Viewport::from_terminal(120, 0, false).width_px, 960);
        assert_eq!(Viewport::from_terminal(120, 1500, false).width_px, 1500);
    }

    #[test]
    fn headers_use_language_numerals() {
        assert_eq!(header_labels("japanese", 4), vec!["一", "二", "三", "四"]);
        assert_eq!(header_labels("french", 6).last(), Some(&"six"));
        assert_eq!(header_labels("chinese", 10).len(), 10);
    }

    #[test]
    fn cell_shows_headword_then_enabled_fields() {
        let record = Record::new(vec![
            ("Kanji".to_string(), "水".to_string()),
            ("Kana".to_string(), "みず".to_string()),
            ("English".to_string(), "water".to_string()),
            ("Romaji".to_string(), "mizu".to_string()),
        ]);
        let mapping = ColumnMapping::for_language("japanese");
        let mut flags = ColumnVisibility::for_mapping(&mapping);
        assert_eq!(cell_lines(&record, &mapping, &flags), vec!["水", "みず", "mizu", "water"]);

        flags.toggle(ColumnToggle::Phonetic);
        assert_eq!(cell_lines(&record, &mapping, &flags), vec!["水", "mizu", "water"]);
    }

    #[test]
    fn french_cells_are_spaced_out() {
        let record = Record::new(vec![
            ("French".to_string(), "chat".to_string()),
            ("English".to_string(), "cat".to_string()),
            ("Example".to_string(), "Le chat dort.".to_string()),
        ]);
        let mapping = ColumnMapping::for_language("french");
        let flags = ColumnVisibility::for_mapping(&mapping);
        assert_eq!(
            cell_lines(&record, &mapping, &flags),
            vec!["chat", "", "cat", "", "Le chat dort."]
        );
    }

    #[test]
    fn rows_fill_left_to_right() {
        let page: Vec<usize> = (0..10).collect();
        let rows = grid_rows(&page, 4);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], &[8, 9]);
    }
}
