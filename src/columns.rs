// ============================================================================
// COLUMNS - Language column mapping and per-column visibility
// ============================================================================

pub const LANGUAGES: &[&str] = &["japanese", "chinese", "french"];

/// Which record keys back each logical field for a language. Every field is
/// `None` for an unrecognized language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnMapping {
    pub headword: Option<&'static str>,
    pub phonetic: Option<&'static str>,
    pub secondary_phonetic: Option<&'static str>,
    pub translation: Option<&'static str>,
    pub example: Option<&'static str>,
}

impl ColumnMapping {
    pub fn for_language(language: &str) -> Self {
        match language {
            "japanese" => Self {
                headword: Some("Kanji"),
                phonetic: Some("Kana"),
                secondary_phonetic: Some("Romaji"),
                translation: Some("English"),
                example: None,
            },
            "chinese" => Self {
                headword: Some("Hanzi"),
                phonetic: Some("Pinyin"),
                secondary_phonetic: None,
                translation: Some("English"),
                example: None,
            },
            "french" => Self {
                headword: Some("French"),
                phonetic: None,
                secondary_phonetic: None,
                translation: Some("English"),
                example: Some("Example"),
            },
            _ => Self::default(),
        }
    }

    pub fn column(&self, toggle: ColumnToggle) -> Option<&'static str> {
        match toggle {
            ColumnToggle::Phonetic => self.phonetic,
            ColumnToggle::SecondaryPhonetic => self.secondary_phonetic,
            ColumnToggle::Translation => self.translation,
            ColumnToggle::Example => self.example,
        }
    }

    /// Toggles offered for this language, in display order.
    pub fn available_toggles(&self) -> Vec<ColumnToggle> {
        ColumnToggle::ALL
            .iter()
            .copied()
            .filter(|t| self.column(*t).is_some())
            .collect()
    }

    pub fn toggle_label(&self, toggle: ColumnToggle) -> &'static str {
        match toggle {
            ColumnToggle::Translation => "English",
            other => self.column(other).unwrap_or(""),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnToggle {
    Phonetic,
    SecondaryPhonetic,
    Translation,
    Example,
}

impl ColumnToggle {
    pub const ALL: [ColumnToggle; 4] = [
        ColumnToggle::Phonetic,
        ColumnToggle::SecondaryPhonetic,
        ColumnToggle::Translation,
        ColumnToggle::Example,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnVisibility {
    pub phonetic: bool,
    pub secondary_phonetic: bool,
    pub translation: bool,
    pub example: bool,
}

impl ColumnVisibility {
    /// Every field the mapping defines starts visible.
    pub fn for_mapping(mapping: &ColumnMapping) -> Self {
        Self {
            phonetic: mapping.phonetic.is_some(),
            secondary_phonetic: mapping.secondary_phonetic.is_some(),
            translation: mapping.translation.is_some(),
            example: mapping.example.is_some(),
        }
    }

    pub fn is_shown(&self, toggle: ColumnToggle) -> bool {
        match toggle {
            ColumnToggle::Phonetic => self.phonetic,
            ColumnToggle::SecondaryPhonetic => self.secondary_phonetic,
            ColumnToggle::Translation => self.translation,
            ColumnToggle::Example => self.example,
        }
    }

    pub fn toggle(&mut self, toggle: ColumnToggle) -> bool {
        let flag = match toggle {
            ColumnToggle::Phonetic => &mut self.phonetic,
            ColumnToggle::SecondaryPhonetic => &mut self.secondary_phonetic,
            ColumnToggle::Translation => &mut self.translation,
            ColumnToggle::Example => &mut self.example,
        };
        *flag = !*flag;
        *flag
    }
}
