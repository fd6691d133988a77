//! Demo scores in both notations, embedded at build time from `library/`.

include!(concat!(env!("OUT_DIR"), "/scores.rs"));

/// A score with its name and content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Path relative to `library/`, e.g. `abc/ode_to_joy.abc`
    pub name: String,
    pub content: String,
}

impl Score {
    fn from_entry((name, content): &(&str, &str)) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    /// File extension of the score (`abc` or `notes`)
    pub fn extension(&self) -> &str {
        self.name.rsplit_once('.').map_or("", |(_, ext)| ext)
    }
}

/// Get all embedded scores
pub fn get_all_scores() -> Vec<Score> {
    SCORES.iter().map(Score::from_entry).collect()
}

/// Get a score by name
pub fn get_score(name: &str) -> Option<Score> {
    SCORES
        .iter()
        .find(|(n, _)| *n == name)
        .map(Score::from_entry)
}

/// List all score names
pub fn list_scores() -> Vec<&'static str> {
    SCORES.iter().map(|(name, _)| *name).collect()
}
