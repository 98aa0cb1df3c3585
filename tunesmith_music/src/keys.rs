// Key table: the tonic names a song may be generated in.
//
// Loaded from JSON of the form `{"keys": ["C", "F#", "Bb", ...]}`. The
// default table is embedded from `data/keys.json` at compile time. Every
// entry is parsed on load, so a table that loads successfully only ever hands
// out valid note names.

use crate::error::{MusicError, Result};
use crate::pitch::NoteName;
use serde::Deserialize;
use std::path::Path;
use tunesmith_prng::RandomSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTable {
    keys: Vec<NoteName>,
}

#[derive(Deserialize)]
struct RawKeyTable {
    keys: Vec<String>,
}

impl KeyTable {
    /// Build a table from raw names. Fails on an empty list or any
    /// unparseable name.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        if names.is_empty() {
            return Err(MusicError::InvalidKeyTable("no keys listed".to_string()));
        }
        let keys = names
            .iter()
            .map(|name| {
                NoteName::parse(name.as_ref())
                    .map_err(|_| MusicError::InvalidKeyTable(format!("bad key {:?}", name.as_ref())))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(KeyTable { keys })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawKeyTable = serde_json::from_str(json)?;
        KeyTable::new(&raw.keys)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        KeyTable::from_json(&data)
    }

    pub fn keys(&self) -> &[NoteName] {
        &self.keys
    }

    pub fn contains(&self, name: NoteName) -> bool {
        self.keys.contains(&name)
    }

    /// A tonic drawn uniformly from the table.
    pub fn random_key(&self, rng: &mut impl RandomSource) -> NoteName {
        *rng.choice(&self.keys)
    }
}

/// The key table embedded at compile time.
///
/// Panics if the embedded JSON is malformed.
pub fn default_key_table() -> KeyTable {
    let json = include_str!("../../data/keys.json");
    KeyTable::from_json(json).expect("embedded keys.json is malformed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunesmith_prng::{ScriptedSource, SongRng};

    #[test]
    fn embedded_table_loads() {
        let table = default_key_table();
        assert!(table.keys().len() >= 12);
        assert!(table.contains(NoteName::parse("C").unwrap()));
        assert!(table.contains(NoteName::parse("Bb").unwrap()));
    }

    #[test]
    fn random_key_comes_from_the_table() {
        let table = KeyTable::new(&["D", "Eb"]).unwrap();
        let mut rng = SongRng::new(17);
        for _ in 0..50 {
            assert!(table.contains(table.random_key(&mut rng)));
        }
        let mut last = ScriptedSource::constant(1.0);
        assert_eq!(table.random_key(&mut last).to_string(), "Eb");
    }

    #[test]
    fn bad_tables_are_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(KeyTable::new(&empty), Err(MusicError::InvalidKeyTable(_))));
        assert!(matches!(
            KeyTable::from_json(r#"{"keys": ["C", "H"]}"#),
            Err(MusicError::InvalidKeyTable(msg)) if msg.contains('H')
        ));
        assert!(matches!(
            KeyTable::from_json(r#"{"tonics": []}"#),
            Err(MusicError::Config(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        std::fs::write(&path, r#"{"keys": ["G", "F#"]}"#).unwrap();
        let table = KeyTable::load(&path).unwrap();
        assert_eq!(table.keys().len(), 2);
    }
}
