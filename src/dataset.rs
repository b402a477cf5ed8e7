// ============================================================================
// DATASET - Word list loading
// ============================================================================

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use tracing::info;

const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024; // 50 MB max per word list

/// One vocabulary entry: named string fields in header order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Missing columns read as empty, like an absent property in the word list.
    pub fn field_or_empty(&self, column: Option<&str>) -> &str {
        column.and_then(|c| self.get(c)).unwrap_or("")
    }
}

// Stored as a JSON object so the persisted selection keeps the column names.
impl serde::Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> serde::Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of column names to strings")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Record, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    fields.push((name, value));
                }
                Ok(Record { fields })
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Parse CSV with a header row; header names become field names.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .context("reading header row")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result?;
            let fields = headers
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), row.get(i).unwrap_or("").to_string()))
                .collect();
            records.push(Record::new(fields));
        }

        Ok(Self::new(records))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let metadata =
            fs::metadata(path).with_context(|| format!("word list {}", path.display()))?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(anyhow::anyhow!(
                "Word list {} exceeds maximum size limit",
                path.display()
            ));
        }

        let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let dataset =
            Self::from_reader(file).with_context(|| format!("parsing {}", path.display()))?;
        info!(path = %path.display(), words = dataset.len(), "loaded word list");
        Ok(dataset)
    }
}

pub fn dataset_path(data_dir: &Path, language: &str) -> PathBuf {
    data_dir.join(format!("{}.csv", language))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAPANESE: &str = "Kanji,Kana,English,Romaji\n\
                            日,にち,day,nichi\n\
                            本,ほん,book,hon\n\
                            人,ひと\n";

    #[test]
    fn parses_rows_with_header_names() {
        let dataset = Dataset::from_reader(JAPANESE.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 3);

        let first = dataset.get(0).unwrap();
        assert_eq!(first.get("Kanji"), Some("日"));
        assert_eq!(first.get("Romaji"), Some("nichi"));
        assert_eq!(first.get("Hanzi"), None);
    }

    #[test]
    fn short_rows_read_missing_fields_as_empty() {
        let dataset = Dataset::from_reader(JAPANESE.as_bytes()).unwrap();
        let short = dataset.get(2).unwrap();
        assert_eq!(short.get("Kana"), Some("ひと"));
        assert_eq!(short.get("English"), Some(""));
        assert_eq!(short.field_or_empty(Some("Missing")), "");
        assert_eq!(short.field_or_empty(None), "");
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let text = "French,English,Example\n\"bonjour\",hello,\"Bonjour, Marie !\"\n";
        let dataset = Dataset::from_reader(text.as_bytes()).unwrap();
        assert_eq!(dataset.get(0).unwrap().get("Example"), Some("Bonjour, Marie !"));
    }

    #[test]
    fn record_json_keeps_column_order() {
        let dataset = Dataset::from_reader(JAPANESE.as_bytes()).unwrap();
        let json = serde_json::to_string(dataset.get(1).unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"Kanji":"本","Kana":"ほん","English":"book","Romaji":"hon"}"#
        );
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, dataset.get(1).unwrap());
    }

    #[test]
    fn load_reads_language_file_from_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("chinese.csv"), "Hanzi,Pinyin,English\n你,nǐ,you\n").unwrap();

        let path = dataset_path(dir.path(), "chinese");
        let dataset = Dataset::load(&path).unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(Dataset::load(&dataset_path(dir.path(), "french")).is_err());
    }
}
