//! Defines the command-line interface for the application.

use clap::builder::{OsStringValueParser, TypedValueParser};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mdp",
    version,
    about = "Preview a Markdown file as sanitized HTML in the default viewer."
)]
pub struct Cli {
    /// Markdown file to preview.
    #[arg(short, long, value_name = "FILE_PATH")]
    pub file: PathBuf,

    /// Skip auto preview. The generated page is kept and its path printed.
    #[arg(short, long = "skip-preview")]
    pub skip_preview: bool,

    /// Alternate template file (tera syntax, with `title` and `body` variables).
    /// An empty value selects the built-in template.
    #[arg(
        short,
        long,
        value_name = "TEMPLATE_PATH",
        value_parser = OsStringValueParser::new().map(PathBuf::from)
    )]
    pub template: Option<PathBuf>,
}

/// Rewrites the single-dash `-file` spelling into `--file`, which clap would
/// otherwise read as `-f ile`.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-file") => OsString::from("--file"),
            Some(other) if other.starts_with("-file=") => OsString::from(format!("-{other}")),
            _ => arg,
        })
        .collect()
}
