//! Template set: the files `init` materializes into an emaki project.

use std::collections::{BTreeSet, HashSet};
use std::path::{Component, Path, PathBuf};

use crate::domain::DomainError;

/// Entry-point source compiled by `elm make`, relative to the project root.
pub const ENTRY_SOURCE: &str = "src/Main.elm";

/// Build artifact directory served by the static file server.
pub const ARTIFACT_DIR: &str = "output";

/// Compiled page written by the compiler.
pub const ARTIFACT_INDEX: &str = "output/index.html";

const ELM_JSON: &str = r#"{
    "type": "application",
    "source-directories": [
        "src",
        "../src"
    ],
    "elm-version": "0.19.1",
    "dependencies": {
        "direct": {
            "elm/browser": "1.0.2",
            "elm/core": "1.0.5",
            "elm/html": "1.0.0"
        },
        "indirect": {
            "elm/json": "1.1.3",
            "elm/time": "1.0.0",
            "elm/url": "1.0.0",
            "elm/virtual-dom": "1.0.3"
        }
    },
    "test-dependencies": {
        "direct": {},
        "indirect": {}
    }
}
"#;

const MAIN_ELM: &str = r#"module Main exposing (main)

import Html exposing (Html, text)


main : Html msg
main =
    text "Hello, World!"
"#;

const GITIGNORE: &str = "# elm-package generated files
elm-stuff
# elm-repl generated files
repl-temp-*
# elm-emaki build output
output
";

/// Templates written by `elm-emaki init`.
pub const EMAKI_TEMPLATES: &[TemplateEntry] = &[
    TemplateEntry::new("elm.json", ELM_JSON),
    TemplateEntry::new(ENTRY_SOURCE, MAIN_ELM),
    TemplateEntry::new(".gitignore", GITIGNORE),
];

/// One scaffolded file: where it goes and what it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateEntry {
    relative_path: &'static str,
    content: &'static str,
}

impl TemplateEntry {
    pub const fn new(relative_path: &'static str, content: &'static str) -> Self {
        Self {
            relative_path,
            content,
        }
    }

    pub fn relative_path(&self) -> &Path {
        Path::new(self.relative_path)
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    /// Absolute target of this entry under `root`.
    pub fn target(&self, root: &Path) -> PathBuf {
        root.join(self.relative_path)
    }

    fn validate(&self) -> Result<(), DomainError> {
        let path = self.relative_path();
        let invalid = |reason: &str| DomainError::InvalidTemplatePath {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        if self.relative_path.is_empty() {
            return Err(invalid("path is empty"));
        }
        for component in path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir => return Err(invalid("path escapes the project root")),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("path must be relative"))
                }
            }
        }
        if path.file_name().is_none() {
            return Err(invalid("path does not name a file"));
        }
        Ok(())
    }
}

/// Fixed set of templates keyed by relative path.
///
/// Paths are unique and relative to the project root; both are checked
/// when the set is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    entries: Vec<TemplateEntry>,
}

impl TemplateSet {
    pub fn new(entries: impl IntoIterator<Item = TemplateEntry>) -> Result<Self, DomainError> {
        let entries: Vec<TemplateEntry> = entries.into_iter().collect();
        let mut seen = HashSet::new();

        for entry in &entries {
            entry.validate()?;
            let normalized: PathBuf = entry
                .relative_path()
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect();
            if !seen.insert(normalized) {
                return Err(DomainError::DuplicateTemplatePath(
                    entry.relative_path().to_path_buf(),
                ));
            }
        }

        Ok(Self { entries })
    }

    /// The emaki starter project.
    pub fn emaki() -> Self {
        Self {
            entries: EMAKI_TEMPLATES.to_vec(),
        }
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parent directories needed under `root`, deduplicated.
    pub fn parent_dirs(&self, root: &Path) -> BTreeSet<PathBuf> {
        self.entries
            .iter()
            .filter_map(|entry| entry.target(root).parent().map(Path::to_path_buf))
            .collect()
    }
}
