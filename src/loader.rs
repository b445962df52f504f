//! This module provides the `AutomatonLoader` struct, responsible for loading automaton
//! definitions and input documents from bytes, strings, files, and directories.

use crate::parser::{parse, parse_input};
use crate::types::{Automaton, DfaError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `AutomatonLoader` is a utility struct for loading automata.
/// Loading never caches anything: each call parses and validates from scratch.
pub struct AutomatonLoader;

impl AutomatonLoader {
    /// Loads an automaton from raw definition bytes.
    ///
    /// # Returns
    ///
    /// * `Ok(Automaton)` if the bytes are a valid definition.
    /// * `Err(DfaError::ParseError)` if the bytes cannot be decoded.
    /// * `Err(DfaError::ValidationError)` if the definition is inconsistent.
    pub fn load_from_bytes(bytes: &[u8]) -> Result<Automaton, DfaError> {
        parse(bytes)
    }

    /// Loads an automaton from the provided string content.
    pub fn load_from_str(content: &str) -> Result<Automaton, DfaError> {
        parse(content.as_bytes())
    }

    /// Loads a single automaton from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Automaton)` if the file is successfully read and parsed.
    /// * `Err(DfaError::FileError)` if the file cannot be read.
    /// * `Err(DfaError::ParseError)` or `Err(DfaError::ValidationError)` as for
    ///   [`AutomatonLoader::load_from_bytes`].
    pub fn load_from_file(path: &Path) -> Result<Automaton, DfaError> {
        debug!(path = %path.display(), "loading automaton definition");

        let content = fs::read(path).map_err(|e| {
            DfaError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        parse(&content)
    }

    /// Loads all definition files (`.json` extension) from a given directory.
    ///
    /// Directories and non-`.json` files are skipped. Each element of the result is either
    /// the path and its automaton or the error that prevented loading it. Results are sorted
    /// by path.
    pub fn load_from_directory(directory: &Path) -> Vec<Result<(PathBuf, Automaton), DfaError>> {
        if !directory.exists() {
            return vec![Err(DfaError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(DfaError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                        paths.push(path);
                    }
                }
                Err(e) => results.push(Err(DfaError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }
        paths.sort();

        debug!(
            directory = %directory.display(),
            count = paths.len(),
            "loading automaton definitions"
        );

        results.extend(paths.into_iter().map(|path| {
            Self::load_from_file(&path)
                .map(|automaton| (path.clone(), automaton))
                .map_err(|e| match e {
                    DfaError::FileError(_) => e,
                    other => DfaError::FileError(format!(
                        "Failed to load automaton from {}: {}",
                        path.display(),
                        other
                    )),
                })
        }));

        results
    }

    /// Decodes an input document (`{ "input": "..." }`) and returns the input string.
    pub fn load_input(bytes: &[u8]) -> Result<String, DfaError> {
        parse_input(bytes)
    }

    /// Reads and decodes an input document from a file.
    pub fn load_input_file(path: &Path) -> Result<String, DfaError> {
        debug!(path = %path.display(), "loading input document");

        let content = fs::read(path).map_err(|e| {
            DfaError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        parse_input(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Verdict;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID: &str = r#"{
        "states": ["q0", "q1"],
        "transitions": { "q0": { "a": "q1" } },
        "initialState": "q0",
        "finalStates": ["q1"]
    }"#;

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("valid.json");
        write_file(&file_path, VALID);

        let automaton = AutomatonLoader::load_from_file(&file_path).unwrap();
        assert_eq!(automaton.initial_state(), "q0");
        assert_eq!(automaton.run("a"), Verdict::Accepted);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.json");
        write_file(&file_path, "This is not a valid definition");

        let result = AutomatonLoader::load_from_file(&file_path);
        assert!(matches!(result, Err(DfaError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = AutomatonLoader::load_from_file(&dir.path().join("missing.json"));

        assert!(matches!(result, Err(DfaError::FileError(_))));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempdir().unwrap();

        write_file(&dir.path().join("a-valid.json"), VALID);
        write_file(&dir.path().join("b-invalid.json"), "{}");
        write_file(&dir.path().join("ignored.txt"), VALID);
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let results = AutomatonLoader::load_from_directory(dir.path());
        assert_eq!(results.len(), 2);

        let (path, automaton) = results[0].as_ref().unwrap();
        assert!(path.ends_with("a-valid.json"));
        assert_eq!(automaton.states().len(), 2);

        match &results[1] {
            Err(DfaError::FileError(msg)) => assert!(msg.contains("b-invalid.json")),
            other => panic!("Expected a file error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_missing_directory() {
        let results = AutomatonLoader::load_from_directory(Path::new("/definitely/not/here"));

        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_load_input_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("input.json");
        write_file(&file_path, r#"{ "input": "0110" }"#);

        assert_eq!(AutomatonLoader::load_input_file(&file_path).unwrap(), "0110");
        assert_eq!(
            AutomatonLoader::load_input(br#"{ "input": "ab" }"#).unwrap(),
            "ab"
        );
    }

    #[test]
    fn test_load_from_str_and_bytes_agree() {
        let from_str = AutomatonLoader::load_from_str(VALID).unwrap();
        let from_bytes = AutomatonLoader::load_from_bytes(VALID.as_bytes()).unwrap();

        assert_eq!(from_str, from_bytes);
    }
}
