//! Loads the sweep's prompts from a CSV file with a header row.

use chatbench_core::prompt::{DEFAULT_PROMPT_COLUMN, DEFAULT_PROMPT_LIMIT, collect_unique};
use chatbench_core::{ChatbenchError, Prompt, PromptSettings, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads one named column of a CSV source into a deduplicated, capped list
/// of prompts.
#[derive(Debug, Clone)]
pub struct CsvPromptLoader {
    column: String,
    limit: usize,
}

impl Default for CsvPromptLoader {
    fn default() -> Self {
        Self {
            column: DEFAULT_PROMPT_COLUMN.to_string(),
            limit: DEFAULT_PROMPT_LIMIT,
        }
    }
}

impl CsvPromptLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &PromptSettings) -> Self {
        Self::new()
            .with_column(settings.column.clone())
            .with_limit(settings.limit)
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Loads prompts from the file at `path`.
    ///
    /// # Returns
    ///
    /// - `Ok(prompts)`: at most `limit` unique prompts in first-seen order;
    ///   empty for an empty or header-only file
    /// - `Err(ChatbenchError::FileAccess)`: the file is missing, unreadable or
    ///   not valid CSV text
    pub fn load(&self, path: &Path) -> Result<Vec<Prompt>> {
        let origin = path.display().to_string();
        let file = File::open(path)
            .map_err(|e| ChatbenchError::file_access(origin.clone(), e.to_string()))?;
        self.load_from_reader(file, &origin)
    }

    /// Same as [`load`](Self::load) for any reader; `origin` names the source
    /// in errors and logs.
    pub fn load_from_reader<R: Read>(&self, source: R, origin: &str) -> Result<Vec<Prompt>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(source);

        let headers = reader
            .headers()
            .map_err(|e| ChatbenchError::file_access(origin, e.to_string()))?
            .clone();

        let Some(column) = headers
            .iter()
            .position(|name| name.trim_start_matches('\u{feff}').trim() == self.column)
        else {
            if !headers.is_empty() {
                tracing::warn!(
                    source = origin,
                    column = %self.column,
                    "Prompt column not found in header; no prompts loaded"
                );
            }
            return Ok(Vec::new());
        };

        let mut failure = None;
        let candidates = reader.records().map_while(|row| match row {
            Ok(record) => Some(record.get(column).map(str::to_string)),
            Err(err) => {
                failure = Some(err);
                None
            }
        });
        let prompts = collect_unique(candidates, self.limit);

        if let Some(err) = failure {
            return Err(ChatbenchError::file_access(origin, err.to_string()));
        }

        tracing::info!(source = origin, count = prompts.len(), "Loaded prompts");
        Ok(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn texts(prompts: &[Prompt]) -> Vec<&str> {
        prompts.iter().map(Prompt::as_str).collect()
    }

    fn load_str(content: &str) -> Result<Vec<Prompt>> {
        CsvPromptLoader::new().load_from_reader(content.as_bytes(), "inline")
    }

    #[test]
    fn reads_the_statement_column() {
        let prompts = load_str("id,Statement,status\n1,I feel anxious,Anxiety\n2, I can't sleep ,Stress\n")
            .unwrap();
        assert_eq!(texts(&prompts), ["I feel anxious", "I can't sleep"]);
    }

    #[test]
    fn quoted_fields_keep_commas_and_newlines() {
        let prompts = load_str("Statement\n\"one, two\"\n\"line\nbreak\"\n").unwrap();
        assert_eq!(texts(&prompts), ["one, two", "line\nbreak"]);
    }

    #[test]
    fn twenty_five_rows_with_duplicates_yield_twenty() {
        let mut content = String::from("Statement,status\n");
        for i in 1..=25 {
            let text = if i == 3 || i == 7 {
                "row 1".to_string()
            } else {
                format!("row {i}")
            };
            content.push_str(&format!("{text},x\n"));
        }

        let prompts = load_str(&content).unwrap();

        assert_eq!(prompts.len(), 20);
        assert_eq!(prompts[0].as_str(), "row 1");
        assert_eq!(prompts[2].as_str(), "row 4");
        assert_eq!(prompts[19].as_str(), "row 22");
    }

    #[test]
    fn rows_without_a_value_are_skipped() {
        let prompts = load_str("a,Statement\n1,\n2\n3,kept\n").unwrap();
        assert_eq!(texts(&prompts), ["kept"]);
    }

    #[test]
    fn empty_and_header_only_sources_are_not_errors() {
        assert!(load_str("").unwrap().is_empty());
        assert!(load_str("Statement,status\n").unwrap().is_empty());
    }

    #[test]
    fn missing_column_yields_nothing() {
        assert!(load_str("text\nhello\n").unwrap().is_empty());
    }

    #[test]
    fn custom_column_and_limit() {
        let prompts = CsvPromptLoader::new()
            .with_column("text")
            .with_limit(2)
            .load_from_reader("text\na\nb\nc\n".as_bytes(), "inline")
            .unwrap();
        assert_eq!(texts(&prompts), ["a", "b"]);
    }

    #[test]
    fn rows_after_the_cap_are_never_parsed() {
        // The third data row is invalid UTF-8 but is never reached.
        let mut bytes = b"Statement\na\nb\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        let prompts = CsvPromptLoader::new()
            .with_limit(2)
            .load_from_reader(bytes.as_slice(), "inline")
            .unwrap();
        assert_eq!(texts(&prompts), ["a", "b"]);
    }

    #[test]
    fn settings_select_column_and_limit() {
        let settings = PromptSettings {
            path: "unused.csv".into(),
            column: "text".to_string(),
            limit: 1,
        };
        let prompts = CsvPromptLoader::from_settings(&settings)
            .load_from_reader("Statement,text\nx,first\ny,second\n".as_bytes(), "inline")
            .unwrap();
        assert_eq!(texts(&prompts), ["first"]);
    }

    #[test]
    fn missing_file_is_a_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvPromptLoader::new()
            .load(&dir.path().join("nope.csv"))
            .unwrap_err();
        assert!(err.is_file_access());
    }

    #[test]
    fn loads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Statement").unwrap();
        writeln!(file, "from disk").unwrap();

        let prompts = CsvPromptLoader::new().load(file.path()).unwrap();
        assert_eq!(texts(&prompts), ["from disk"]);
    }
}
