//! Core library for mdp: renders a Markdown file to sanitized HTML, writes it
//! to a temporary page and opens that page in the platform's default viewer.
//!
//! # Example
//!
//! ```rust,no_run
//! use mdp::RunOptions;
//!
//! # fn demo() -> Result<(), mdp::error::PreviewError> {
//! let options = RunOptions::new("README.md").skip_preview(true);
//! let mut stdout = std::io::stdout();
//! let page = mdp::run(&options, &mut stdout)?;
//! assert!(page.exists());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod error;
pub mod preview;
pub mod render;
pub mod template;
pub mod writer;

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::TempPath;

use crate::error::PreviewError;
use crate::preview::Previewer;

/// Everything a single preview run needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub template: Option<PathBuf>,
    pub skip_preview: bool,
    /// Where the page is written. Defaults to the system temporary directory.
    pub temp_dir: Option<PathBuf>,
    pub previewer: Previewer,
}

impl RunOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            template: None,
            skip_preview: false,
            temp_dir: None,
            previewer: Previewer::new(),
        }
    }

    /// An empty path means no template, same as `None`.
    pub fn template(mut self, template: Option<PathBuf>) -> Self {
        self.template = template.filter(|path| !path.as_os_str().is_empty());
        self
    }

    pub fn skip_preview(mut self, skip: bool) -> Self {
        self.skip_preview = skip;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn previewer(mut self, previewer: Previewer) -> Self {
        self.previewer = previewer;
        self
    }
}

/// Renders `input` into a complete page, without touching the filesystem
/// beyond reading the template.
pub fn parse_content(input: &[u8], template: Option<&Path>) -> Result<Vec<u8>, PreviewError> {
    let body = render::render_safe(input);
    debug!("Sanitized fragment is {} bytes", body.as_str().len());
    template::build_page(body, template)
}

/// Runs the whole pipeline and returns the path of the written page.
///
/// The path is printed to `out`. With `skip_preview` the page is left on
/// disk; otherwise it is opened and then removed, whether or not the preview
/// succeeded.
pub fn run(options: &RunOptions, out: &mut dyn Write) -> Result<PathBuf, PreviewError> {
    let input = fs::read(&options.input).map_err(|source| PreviewError::InputRead {
        path: options.input.clone(),
        source,
    })?;
    debug!(
        "Read {} bytes from {}",
        input.len(),
        options.input.display()
    );

    let page = parse_content(&input, options.template.as_deref())?;

    let dir = options.temp_dir.clone().unwrap_or_else(env::temp_dir);
    let path = writer::save_page(&dir, &page)?;

    writeln!(out, "{}", path.display()).map_err(PreviewError::OutputWrite)?;

    if options.skip_preview {
        debug!("Preview skipped, keeping {}", path.display());
        return Ok(path);
    }

    let cleanup = TempPath::from_path(&path);
    let outcome = options.previewer.preview(&path);

    if let Err(err) = cleanup.close() {
        warn!("Failed to remove {}: {err}", path.display());
    }

    outcome.map(|()| path)
}
