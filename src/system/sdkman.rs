// src/system/sdkman.rs

//! SDKMAN!-backed [`VersionManager`].
//!
//! Local facts (what is installed, linked, in use or archived) are read from the
//! SDKMAN! directory layout. Remote version lists and every mutation go through
//! the `sdk` shell function, sourced from `bin/sdkman-init.sh` in a bash child.

use crate::{
    models::{ShogunConfig, Version},
    system::{
        executor::{self, ExecutionError},
        jdk_scanner,
        version_manager::{ManagerResult, VersionManager, VersionManagerError},
    },
};
use lazy_static::lazy_static;
use regex::Regex;
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

lazy_static! {
    static ref SEPARATOR_RE: Regex = Regex::new(r"^\s*=+\s*$").unwrap();
}

const INIT_SCRIPT: &str = "bin/sdkman-init.sh";
const CANDIDATES_DIR: &str = "candidates";
const ARCHIVES_DIR: &str = "archives";
const CURRENT_LINK: &str = "current";
const CANDIDATES_FILE: &str = "var/candidates";
const VERSION_FILE: &str = "var/version";
const CONFIG_FILE: &str = "etc/config";
const OFFLINE_ENV: &str = "SDKMAN_OFFLINE_MODE";
const GRAAL_UPDATER: &str = "bin/gu";
const INSTALL_URL: &str = "https://get.sdkman.io";
const STABLE_VERSION_URL: &str = "https://api.sdkman.io/2/broker/download/sdkman/version/stable";

/// Talks to an SDKMAN! installation rooted at `dir`.
#[derive(Debug, Clone)]
pub struct SdkMan {
    dir: PathBuf,
    bash: String,
}

impl SdkMan {
    pub fn new(dir: PathBuf, bash: impl Into<String>) -> Self {
        Self {
            dir,
            bash: bash.into(),
        }
    }

    pub fn from_config(config: &ShogunConfig) -> anyhow::Result<Self> {
        let dir = crate::core::paths::resolve_sdkman_dir(config)?;
        Ok(Self::new(dir, config.bash_path.clone()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn env(&self) -> HashMap<String, String> {
        HashMap::from([(
            crate::constants::SDKMAN_DIR_ENV.to_string(),
            self.dir.to_string_lossy().into_owned(),
        )])
    }

    /// Runs `sdk <args...>` and returns its output; a failing exit status
    /// becomes `ExternalToolFailure`.
    fn sdk(&self, args: &[&str]) -> ManagerResult<String> {
        if !self.is_installed() {
            return Err(VersionManagerError::NotInstalled);
        }
        let init = self.dir.join(INIT_SCRIPT);
        let init = init.to_string_lossy();
        let mut script = format!("source {} && sdk", executor::quote(&init)?);
        for arg in args {
            script.push(' ');
            script.push_str(&executor::quote(arg)?);
        }
        executor::run_bash_checked(&self.bash, &script, &self.dir, &self.env()).map_err(to_tool_failure)
    }

    fn candidate_dir(&self, candidate: &str) -> PathBuf {
        self.dir.join(CANDIDATES_DIR).join(candidate)
    }

    fn archive_path(&self, candidate: &str, identifier: &str) -> PathBuf {
        self.dir
            .join(ARCHIVES_DIR)
            .join(format!("{}-{}.zip", candidate, identifier))
    }

    fn read_var(&self, relative: &str) -> Option<String> {
        fs::read_to_string(self.dir.join(relative))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Versions with a directory (or link) under `candidates/<candidate>`.
    fn local_versions(&self, candidate: &str) -> ManagerResult<Vec<Version>> {
        let dir = self.candidate_dir(candidate);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let current = fs::read_link(dir.join(CURRENT_LINK))
            .ok()
            .and_then(|target| target.file_name().map(|n| n.to_string_lossy().into_owned()));

        let mut versions = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == CURRENT_LINK {
                continue;
            }
            let linked = entry.file_type()?.is_symlink();
            let mut version = Version::available(candidate, name.clone());
            version.path = Some(entry.path());
            version.installed = !linked;
            version.locally_installed = linked;
            version.in_use = current.as_deref() == Some(name.as_str());
            version.native_image = jdk_scanner::has_native_image(&entry.path());
            versions.push(version);
        }
        versions.sort_by(|a, b| b.identifier.cmp(&a.identifier));
        Ok(versions)
    }
}

fn to_tool_failure(error: ExecutionError) -> VersionManagerError {
    match error {
        ExecutionError::NonZeroExitStatus { command, output } => {
            VersionManagerError::ExternalToolFailure { command, output }
        }
        other => VersionManagerError::Execution(other),
    }
}

/// Extracts version identifiers from `sdk list <candidate>` output, in the
/// order printed. Handles both the tabular layout (java) and the grid layout
/// used by every other candidate.
pub fn parse_version_list(output: &str) -> Vec<String> {
    let mut separators = 0;
    let mut identifiers = Vec::new();
    for line in output.lines() {
        if SEPARATOR_RE.is_match(line) {
            separators += 1;
            continue;
        }
        // Section 3 (after the title block) holds the versions.
        if separators != 2 {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('-') {
            continue;
        }
        if trimmed.contains('|') {
            let last = trimmed.rsplit('|').next().unwrap_or_default().trim();
            if !last.is_empty() && last != "Identifier" {
                identifiers.push(last.to_string());
            }
            continue;
        }
        identifiers.extend(
            trimmed
                .split_whitespace()
                .filter(|token| !matches!(*token, ">" | "*" | "+"))
                .map(|token| token.trim_start_matches(['>', '*', '+']).to_string())
                .filter(|token| !token.is_empty()),
        );
    }
    identifiers
}

/// Folds local facts into the remote list: remote order first, then versions
/// only known locally.
fn merge(remote: Vec<String>, candidate: &str, local: Vec<Version>, sdk: &SdkMan) -> Vec<Version> {
    let mut local: Vec<Option<Version>> = local.into_iter().map(Some).collect();
    let mut merged = Vec::with_capacity(remote.len() + local.len());

    for identifier in remote {
        let known = local
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|v| v.identifier == identifier))
            .and_then(Option::take);
        merged.push(known.unwrap_or_else(|| Version::available(candidate, identifier)));
    }
    merged.extend(local.into_iter().flatten());

    for version in &mut merged {
        if !version.is_present() {
            version.archived = sdk.has_archive(version);
        }
    }
    merged
}

impl VersionManager for SdkMan {
    fn is_installed(&self) -> bool {
        self.dir.join(INIT_SCRIPT).is_file()
    }

    fn is_offline(&self) -> bool {
        if env::var(OFFLINE_ENV).is_ok_and(|v| v == "true") {
            return true;
        }
        fs::read_to_string(self.dir.join(CONFIG_FILE))
            .map(|config| {
                config
                    .lines()
                    .any(|line| line.trim() == "sdkman_offline_mode=true")
            })
            .unwrap_or(false)
    }

    fn version(&self) -> ManagerResult<String> {
        self.read_var(VERSION_FILE)
            .ok_or(VersionManagerError::NotInstalled)
    }

    fn is_update_available(&self) -> bool {
        if self.is_offline() {
            return false;
        }
        let Some(local) = self.read_var(VERSION_FILE) else {
            return false;
        };
        let script = format!("curl -sf --max-time 5 {}", STABLE_VERSION_URL);
        match executor::run_bash_checked(&self.bash, &script, &self.dir, &self.env()) {
            Ok(remote) => {
                let remote = remote.trim();
                !remote.is_empty() && remote != local
            }
            Err(e) => {
                log::debug!("Update check failed: {}", e);
                false
            }
        }
    }

    fn list_candidates(&self) -> ManagerResult<Vec<String>> {
        let listed = match self.read_var(CANDIDATES_FILE) {
            Some(listed) => listed,
            None => {
                // The cache file appears after the first `sdk update`.
                self.sdk(&["update"])?;
                self.read_var(CANDIDATES_FILE).unwrap_or_default()
            }
        };
        Ok(listed
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn installed_candidates(&self) -> ManagerResult<Vec<String>> {
        let root = self.dir.join(CANDIDATES_DIR);
        if !root.is_dir() {
            return Ok(Vec::new());
        }
        let mut installed = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.local_versions(&name)?.is_empty() {
                installed.push(name);
            }
        }
        installed.sort();
        Ok(installed)
    }

    fn list(&self, candidate: &str) -> ManagerResult<Vec<Version>> {
        let local = self.local_versions(candidate)?;
        let remote = if self.is_offline() {
            Vec::new()
        } else {
            parse_version_list(&self.sdk(&["list", candidate])?)
        };
        Ok(merge(remote, candidate, local, self))
    }

    fn install(&self, version: &Version) -> ManagerResult<()> {
        match (&version.path, version.detected) {
            (Some(path), true) => {
                let path = path.to_string_lossy();
                self.sdk(&["install", &version.candidate, &version.identifier, &path])?;
            }
            _ => {
                self.sdk(&["install", &version.candidate, &version.identifier])?;
            }
        }
        Ok(())
    }

    fn uninstall(&self, version: &Version) -> ManagerResult<()> {
        self.sdk(&["uninstall", &version.candidate, &version.identifier])?;
        Ok(())
    }

    fn make_default(&self, candidate: &str, version: &Version) -> ManagerResult<()> {
        self.sdk(&["default", candidate, &version.identifier])?;
        Ok(())
    }

    fn remove_archive(&self, version: &Version) -> ManagerResult<()> {
        let archive = self.archive_path(&version.candidate, &version.identifier);
        log::debug!("Removing archive '{}'", archive.display());
        fs::remove_file(archive)?;
        Ok(())
    }

    fn has_archive(&self, version: &Version) -> bool {
        self.archive_path(&version.candidate, &version.identifier)
            .is_file()
    }

    fn archives_size(&self) -> u64 {
        WalkDir::new(self.dir.join(ARCHIVES_DIR))
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.metadata().ok())
            .map(|metadata| metadata.len())
            .sum()
    }

    fn flush_archives(&self) -> ManagerResult<()> {
        self.sdk(&["flush", "archives"])?;
        Ok(())
    }

    fn install_tool(&self) -> ManagerResult<()> {
        let script = format!("curl -s {} | bash", executor::quote(INSTALL_URL)?);
        // SDKMAN_DIR in the environment makes the installer use the configured location.
        let home = dirs::home_dir().unwrap_or_else(env::temp_dir);
        executor::run_bash_checked(&self.bash, &script, &home, &self.env())
            .map_err(to_tool_failure)?;
        Ok(())
    }

    fn update_tool(&self) -> ManagerResult<()> {
        self.sdk(&["selfupdate"])?;
        Ok(())
    }

    fn install_native_image(&self, version: &Version) -> ManagerResult<()> {
        let home = version
            .path
            .clone()
            .unwrap_or_else(|| self.candidate_dir(&version.candidate).join(&version.identifier));
        if !home.is_dir() {
            return Err(VersionManagerError::NoInstallPath {
                candidate: version.candidate.clone(),
                version: version.identifier.clone(),
            });
        }
        let updater = home.join(GRAAL_UPDATER);
        let script = format!(
            "{} install native-image",
            executor::quote(&updater.to_string_lossy())?
        );
        executor::run_bash_checked(&self.bash, &script, &home, &self.env())
            .map_err(to_tool_failure)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const JAVA_LIST: &str = "\
================================================================================
Available Java Versions for Linux 64bit
================================================================================
 Vendor        | Use | Version      | Dist    | Status     | Identifier
--------------------------------------------------------------------------------
 Corretto      |     | 21.0.2       | amzn    |            | 21.0.2-amzn
 Temurin       | >>> | 21.0.2       | tem     | installed  | 21.0.2-tem
               |     | 17.0.10      | tem     |            | 17.0.10-tem
================================================================================
Omit Identifier to install default version 21.0.2-tem:
================================================================================
";

    const MAVEN_LIST: &str = "\
================================================================================
Available Maven Versions
================================================================================
 > * 3.9.6               3.8.8               3.6.3
     3.9.5             + 3.8.7
================================================================================
+ - local version
* - installed
> - currently in use
================================================================================
";

    #[test]
    fn test_parse_tabular_list() {
        assert_eq!(
            parse_version_list(JAVA_LIST),
            vec!["21.0.2-amzn", "21.0.2-tem", "17.0.10-tem"]
        );
    }

    #[test]
    fn test_parse_grid_list_skips_markers_and_legend() {
        assert_eq!(
            parse_version_list(MAVEN_LIST),
            vec!["3.9.6", "3.8.8", "3.6.3", "3.9.5", "3.8.7"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_local_facts_from_directory_layout() {
        let root = tempdir().unwrap();
        let maven = root.path().join(CANDIDATES_DIR).join("maven");
        fs::create_dir_all(maven.join("3.9.6")).unwrap();
        fs::create_dir_all(maven.join("3.8.8")).unwrap();
        let external = root.path().join("external-maven");
        fs::create_dir_all(&external).unwrap();
        std::os::unix::fs::symlink(&external, maven.join("local-dev")).unwrap();
        std::os::unix::fs::symlink(maven.join("3.9.6"), maven.join(CURRENT_LINK)).unwrap();
        fs::create_dir_all(root.path().join(ARCHIVES_DIR)).unwrap();
        fs::write(root.path().join(ARCHIVES_DIR).join("maven-3.6.3.zip"), b"zip").unwrap();

        let sdk = SdkMan::new(root.path().to_path_buf(), "bash");
        let local = sdk.local_versions("maven").unwrap();
        let merged = merge(
            vec!["3.9.6".into(), "3.8.8".into(), "3.6.3".into()],
            "maven",
            local,
            &sdk,
        );

        let ids: Vec<_> = merged.iter().map(|v| v.identifier.as_str()).collect();
        assert_eq!(ids, vec!["3.9.6", "3.8.8", "3.6.3", "local-dev"]);
        assert!(merged[0].installed && merged[0].in_use);
        assert!(merged[1].installed && !merged[1].in_use);
        assert!(!merged[2].is_present() && merged[2].archived);
        assert!(merged[3].locally_installed && !merged[3].installed);

        assert_eq!(sdk.installed_candidates().unwrap(), vec!["maven"]);
        assert_eq!(sdk.archives_size(), 3);
        assert!(sdk.has_archive(&merged[2]));
        assert!(!sdk.has_archive(&merged[1]));
        assert!(!sdk.is_installed(), "no init script in the fixture");
        assert!(matches!(
            sdk.uninstall(&merged[0]),
            Err(VersionManagerError::NotInstalled)
        ));
    }

    #[test]
    fn test_native_image_needs_an_install_directory() {
        let root = tempdir().unwrap();
        let sdk = SdkMan::new(root.path().to_path_buf(), "bash");
        let mut graal = Version::available("java", "21.0.2-graalce");
        graal.installed = true;
        assert!(matches!(
            sdk.install_native_image(&graal),
            Err(VersionManagerError::NoInstallPath { .. })
        ));
    }

    #[test]
    fn test_candidates_and_offline_flag_from_var_files() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("var")).unwrap();
        fs::create_dir_all(root.path().join("etc")).unwrap();
        fs::write(root.path().join(CANDIDATES_FILE), "ant,gradle, java ,maven\n").unwrap();
        fs::write(root.path().join(VERSION_FILE), "5.18.2\n").unwrap();
        fs::write(root.path().join(CONFIG_FILE), "sdkman_offline_mode=true\n").unwrap();

        let sdk = SdkMan::new(root.path().to_path_buf(), "bash");
        assert_eq!(
            sdk.list_candidates().unwrap(),
            vec!["ant", "gradle", "java", "maven"]
        );
        assert_eq!(sdk.version().unwrap(), "5.18.2");
        assert!(sdk.is_offline());
        assert!(!sdk.is_update_available(), "never checked while offline");
    }
}
