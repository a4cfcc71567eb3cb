//! Project initializer
//!
//! Materializes a [`TemplateSet`] under a project root without clobbering:
//! every file is created exclusively, and an existing file is only replaced
//! after the operator confirms.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{EntryOutcome, InitReport, TemplateEntry, TemplateSet, WriteOutcome};
use crate::infrastructure::traits::{ConfirmationPrompt, FileSystem};
use crate::util::path::display_relative;

/// Writes the template set into a project directory.
pub struct InitService {
    fs: Arc<dyn FileSystem>,
    prompt: Arc<dyn ConfirmationPrompt>,
    templates: TemplateSet,
    display_base: Option<PathBuf>,
}

impl InitService {
    /// Create a new init service.
    ///
    /// # Arguments
    /// * `fs` - Filesystem abstraction
    /// * `prompt` - Asked once per file that already exists
    /// * `templates` - Files to write
    pub fn new(
        fs: Arc<dyn FileSystem>,
        prompt: Arc<dyn ConfirmationPrompt>,
        templates: TemplateSet,
    ) -> Self {
        Self {
            fs,
            prompt,
            templates,
            display_base: None,
        }
    }

    /// Show paths in prompts and status lines relative to `base`.
    pub fn with_display_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.display_base = Some(base.into());
        self
    }

    /// Write every template under `root`; see [`InitService::initialize_with`].
    pub fn initialize(&self, root: &Path) -> ApplicationResult<InitReport> {
        self.initialize_with(root, |_| {})
    }

    /// Write every template under `root`, calling `on_entry` as each one settles.
    ///
    /// Directories are created first. Entries are then handled one by one;
    /// a failing entry does not stop the others from being attempted, but
    /// the first failure is returned once all entries were tried. Entries
    /// already written stay written.
    #[instrument(skip(self, on_entry), fields(root = %root.display()))]
    pub fn initialize_with<F>(&self, root: &Path, mut on_entry: F) -> ApplicationResult<InitReport>
    where
        F: FnMut(&EntryOutcome),
    {
        self.ensure_directories(root)?;

        let mut report = InitReport::default();
        let mut first_error: Option<ApplicationError> = None;
        let mut failed = 0usize;

        for entry in self.templates.entries() {
            match self.materialize(root, entry) {
                Ok(outcome) => {
                    on_entry(&outcome);
                    report.entries.push(outcome);
                }
                Err(e) => {
                    warn!("init: {}: {}", entry.relative_path().display(), e);
                    failed += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            warn!(
                "init: {} of {} entries failed",
                failed,
                self.templates.len()
            );
            return Err(e);
        }

        debug!(
            "init: generated={}, overwritten={}, skipped={}",
            report.count(WriteOutcome::Generated),
            report.count(WriteOutcome::Overwritten),
            report.count(WriteOutcome::Skipped)
        );
        Ok(report)
    }

    /// Create the root and every template's parent directory.
    fn ensure_directories(&self, root: &Path) -> ApplicationResult<()> {
        for dir in self.templates.parent_dirs(root) {
            debug!("ensure_directories: {}", dir.display());
            self.fs.create_dir_all(&dir).scaffold_context(&dir)?;
        }
        Ok(())
    }

    /// Create one entry; on conflict ask, then overwrite or keep.
    fn materialize(&self, root: &Path, entry: &TemplateEntry) -> ApplicationResult<EntryOutcome> {
        let target = entry.target(root);
        let display_path = self.display_path(&target);

        let outcome = match self.fs.write_new(&target, entry.content()) {
            Ok(()) => WriteOutcome::Generated,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let message = format!("{} already exists. Overwrite?", display_path.display());
                let overwrite = self
                    .prompt
                    .ask(&message)
                    .with_path_context("ask to overwrite", &target)?;

                if overwrite {
                    self.fs
                        .write(&target, entry.content())
                        .scaffold_context(&target)?;
                    WriteOutcome::Overwritten
                } else {
                    debug!("materialize: keeping {}", target.display());
                    WriteOutcome::Skipped
                }
            }
            Err(e) => return Err(e).scaffold_context(&target),
        };

        Ok(EntryOutcome {
            relative_path: entry.relative_path().to_path_buf(),
            display_path,
            outcome,
        })
    }

    fn display_path(&self, target: &Path) -> PathBuf {
        match &self.display_base {
            Some(base) => display_relative(target, base),
            None => target.to_path_buf(),
        }
    }
}
