//! Dialogue script
//!
//! Lines are terminated by ';'. The character right after each ';' (the
//! newline in a normal script) is dropped, and anything after the last ';'
//! is ignored.

use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dialogue {
    lines: Vec<String>,
    current: usize,
}

impl Dialogue {
    pub fn parse(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut line = String::new();
        let mut chars = text.chars();

        while let Some(ch) = chars.next() {
            if ch != ';' {
                line.push(ch);
                continue;
            }
            chars.next();
            lines.push(std::mem::take(&mut line));
        }

        Self { lines, current: 0 }
    }

    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// A missing or unreadable script gives an empty dialogue.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(dialogue) => {
                log::debug!("Loaded {} dialogue lines from {}", dialogue.len(), path.display());
                dialogue
            }
            Err(e) => {
                log::error!("Failed to read the dialogue file at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Next line. Once the script runs out the last line repeats.
    pub fn advance(&mut self) -> Option<&str> {
        if self.current < self.lines.len() {
            self.current += 1;
        }
        let index = self.current.checked_sub(1)?;
        self.lines.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    #[test]
    fn test_parse_drops_char_after_delimiter() {
        let mut dialogue = Dialogue::parse("First line;\nSecond\nhalf;\ntrailing");
        assert_eq!(dialogue.len(), 2);
        assert_eq!(dialogue.advance(), Some("First line"));
        assert_eq!(dialogue.advance(), Some("Second\nhalf"));
    }

    #[test]
    fn test_advance_repeats_last_line() {
        let mut dialogue = Dialogue::parse("a;\nb;\n");
        dialogue.advance();
        assert_eq!(dialogue.advance(), Some("b"));
        assert_eq!(dialogue.advance(), Some("b"));
    }

    #[test]
    fn test_empty_dialogue() {
        let mut dialogue = Dialogue::parse("no delimiter here");
        assert!(dialogue.is_empty());
        assert_eq!(dialogue.advance(), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = setup_test_dir();
        let path = dir.path().join("dialogue.txt");
        fs::write(&path, "Hello;\nWorld;\n").unwrap();

        let dialogue = Dialogue::load(&path).unwrap();
        assert_eq!(dialogue.len(), 2);

        let missing = Dialogue::load_or_empty(dir.path().join("missing.txt"));
        assert!(missing.is_empty());
    }
}
