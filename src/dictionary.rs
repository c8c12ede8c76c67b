use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DictionaryEntry {
    pub word: String,
    pub definition: String,
    pub audio_file: String,
}

#[derive(thiserror::Error, Debug)]
pub enum DictionaryError {
    #[error("File '{0}' does not exist. Place it in the project root.")]
    Missing(String),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed dictionary '{path}': {message}")]
    Parse { path: String, message: String },
}

/// Read-only word list loaded once at startup.
#[derive(Debug, Default)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    // word -> index of its first row
    index: HashMap<String, usize>,
}

impl Dictionary {
    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        let display = path.display().to_string();

        if !path.exists() {
            return Err(DictionaryError::Missing(display));
        }

        let file = File::open(path).map_err(|source| DictionaryError::Io {
            path: display.clone(),
            source,
        })?;

        Self::from_reader(file).map_err(|e| DictionaryError::Parse {
            path: display,
            message: e.to_string(),
        })
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
        let entries = reader
            .deserialize()
            .collect::<Result<Vec<DictionaryEntry>, _>>()?;
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<DictionaryEntry>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            index.entry(entry.word.clone()).or_insert(i);
        }
        Self { entries, index }
    }

    /// Exact, case-sensitive match. Duplicate words resolve to the first row.
    pub fn lookup(&self, word: &str) -> Option<&DictionaryEntry> {
        self.index.get(word).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
