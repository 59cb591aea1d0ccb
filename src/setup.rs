//! One-time shell setup: put the `groq-chat` install directory on `PATH`.
//!
//! This only ever runs when asked for with `--install`.  Each shell profile is
//! appended to at most once; running the step again changes nothing.

use std::fs::{self, OpenOptions};
use std::io::Write;

use utf8path::Path;

use crate::error::{Error, Result};

const PROFILES: &[&str] = &[".zshrc", ".bashrc"];
const MARKER: &str = "# Added by groq-chat --install";

/// What [`ensure_in_path`] did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// The directory was already on `PATH`; nothing was touched.
    pub already_on_path: bool,
    /// Profiles that gained an export line, in the order they were written.
    pub updated: Vec<Path<'static>>,
}

/// Ensure `bin_dir` is added to `PATH` by the user's shell profiles.
///
/// `path_var` is the current value of `PATH` and `home` the user's home
/// directory.  Every existing profile that does not already mention
/// `bin_dir` gets an export line appended.  When no profile exists, a new
/// `.zshrc` is created.
pub fn ensure_in_path(bin_dir: &Path, home: &Path, path_var: &str) -> Result<InstallReport> {
    if path_var.split(':').any(|entry| entry == bin_dir.as_str()) {
        return Ok(InstallReport {
            already_on_path: true,
            updated: Vec::new(),
        });
    }

    let export = format!("\n{MARKER}\nexport PATH=\"$PATH:{}\"\n", bin_dir.as_str());
    let profiles: Vec<Path<'static>> = PROFILES
        .iter()
        .map(|name| home.join(*name).into_owned())
        .collect();

    let mut report = InstallReport::default();
    let existing: Vec<&Path<'static>> = profiles.iter().filter(|p| p.exists()).collect();
    if existing.is_empty() {
        append(&profiles[0], &export)?;
        report.updated.push(profiles[0].clone());
        return Ok(report);
    }
    for profile in existing {
        let content = fs::read_to_string(profile)
            .map_err(|err| Error::io(format!("failed to read {}", profile.as_str()), err))?;
        if content.contains(bin_dir.as_str()) {
            tracing::debug!(profile = %profile.as_str(), "profile already mentions install dir");
            continue;
        }
        append(profile, &export)?;
        report.updated.push(profile.clone());
    }
    Ok(report)
}

/// Run [`ensure_in_path`] for the directory holding the running executable.
pub fn install_current_exe() -> Result<(Path<'static>, InstallReport)> {
    let exe = std::env::current_exe()
        .map_err(|err| Error::io("failed to locate the running executable", err))?;
    let bin_dir = exe
        .parent()
        .map(|dir| dir.to_path_buf())
        .ok_or_else(|| Error::validation("executable has no parent directory", None))?;
    let bin_dir = Path::try_from(bin_dir)
        .map_err(|_| Error::validation("install directory is not valid UTF-8", None))?;
    let home = dirs::home_dir()
        .ok_or_else(|| Error::validation("could not determine the home directory", None))?;
    let home = Path::try_from(home)
        .map_err(|_| Error::validation("home directory is not valid UTF-8", None))?;
    let path_var = std::env::var("PATH").unwrap_or_default();

    let report = ensure_in_path(&bin_dir, &home, &path_var)?;
    Ok((bin_dir, report))
}

fn append(profile: &Path, text: &str) -> Result<()> {
    tracing::info!(profile = %profile.as_str(), "adding install dir to PATH");
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(profile)
        .map_err(|err| Error::io(format!("failed to open {}", profile.as_str()), err))?;
    file.write_all(text.as_bytes())
        .map_err(|err| Error::io(format!("failed to write {}", profile.as_str()), err))
}
