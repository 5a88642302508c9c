//! Opens files with the platform's default viewer.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::error::PreviewError;

/// How long to wait after the opener returns, so a slow viewer can read the
/// file before it is removed.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// The document-opening command of a supported platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opener {
    /// `xdg-open` on Linux.
    XdgOpen,
    /// `cmd.exe /C start` on Windows.
    CmdStart,
    /// `open` on macOS.
    Open,
}

impl Opener {
    /// Selects the opener for an OS name as reported by [`std::env::consts::OS`].
    pub fn for_os(os: &str) -> Result<Self, PreviewError> {
        match os {
            "linux" => Ok(Self::XdgOpen),
            "windows" => Ok(Self::CmdStart),
            "macos" => Ok(Self::Open),
            other => Err(PreviewError::UnsupportedPlatform(other.to_string())),
        }
    }

    pub fn current() -> Result<Self, PreviewError> {
        Self::for_os(env::consts::OS)
    }

    pub fn program(self) -> &'static str {
        match self {
            Self::XdgOpen => "xdg-open",
            Self::CmdStart => "cmd.exe",
            Self::Open => "open",
        }
    }

    pub fn args(self, path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = match self {
            Self::CmdStart => vec!["/C".into(), "start".into()],
            Self::XdgOpen | Self::Open => Vec::new(),
        };
        args.push(path.as_os_str().to_owned());
        args
    }
}

/// Launches the platform opener for a file.
#[derive(Debug, Clone)]
pub struct Previewer {
    search_path: Option<OsString>,
    delay: Duration,
}

impl Default for Previewer {
    fn default() -> Self {
        Self {
            search_path: None,
            delay: DEFAULT_DELAY,
        }
    }
}

impl Previewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks the opener up in `paths` (formatted like `PATH`) instead of the
    /// process environment.
    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Finds the executable for `opener`.
    pub fn resolve(&self, opener: Opener) -> Result<PathBuf, PreviewError> {
        let program = opener.program();
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(program, Some(paths.as_os_str()), cwd)
            }
            None => which::which(program),
        };

        found.map_err(|source| PreviewError::OpenerNotFound {
            command: program,
            source,
        })
    }

    /// Opens `path` with the current platform's opener and waits for the
    /// opener to exit.
    ///
    /// The configured delay elapses before any launch failure is returned.
    pub fn preview(&self, path: &Path) -> Result<(), PreviewError> {
        let opener = Opener::current()?;
        let program = self.resolve(opener)?;
        debug!("Resolved {} to {}", opener.program(), program.display());

        let outcome = launch(&program, &opener.args(path));

        thread::sleep(self.delay);

        outcome
    }
}

fn launch(program: &Path, args: &[OsString]) -> Result<(), PreviewError> {
    info!(
        "Running {} {}",
        program.display(),
        args.iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| PreviewError::OpenerLaunch {
            program: program.to_path_buf(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(PreviewError::OpenerExit {
            program: program.to_path_buf(),
            status,
        })
    }
}
