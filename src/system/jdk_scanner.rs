// src/system/jdk_scanner.rs

//! Finds JDKs installed outside of the version manager so they can be offered
//! for registration as `Detected` versions of the `java` candidate.

use crate::{constants::JAVA_CANDIDATE, models::Version};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A JDK home sits at most this deep below a scan root
/// (`<root>/<name>.jdk/Contents/Home/release` on macOS).
const MAX_SCAN_DEPTH: usize = 4;

const RELEASE_FILE: &str = "release";

/// Scans every root and returns one detected version per JDK home found.
/// Unreadable roots are skipped.
pub fn scan(roots: &[PathBuf]) -> Vec<Version> {
    let mut found = Vec::new();
    for root in roots {
        if !root.is_dir() {
            log::debug!("JDK scan root '{}' does not exist, skipping.", root.display());
            continue;
        }
        for entry in WalkDir::new(root)
            .max_depth(MAX_SCAN_DEPTH)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.file_name() != RELEASE_FILE || !entry.file_type().is_file() {
                continue;
            }
            let Some(home) = entry.path().parent() else {
                continue;
            };
            if !has_java_binary(home) {
                continue;
            }
            if let Some(identifier) = identifier_for(root, home) {
                log::debug!("Found JDK '{}' at '{}'", identifier, home.display());
                let mut version = Version::detected(JAVA_CANDIDATE, identifier, home.to_path_buf());
                version.native_image = has_native_image(home);
                found.push(version);
            }
        }
    }
    found.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    found.dedup_by(|a, b| a.identifier == b.identifier);
    found
}

fn has_java_binary(home: &Path) -> bool {
    let bin = home.join("bin");
    bin.join("java").is_file() || bin.join("java.exe").is_file()
}

/// Whether the GraalVM `native-image` command is installed in a JDK home.
pub fn has_native_image(home: &Path) -> bool {
    let bin = home.join("bin");
    bin.join("native-image").is_file() || bin.join("native-image.cmd").is_file()
}

/// Names a JDK after its top-level directory below the scan root,
/// without the `.jdk` bundle suffix.
fn identifier_for(root: &Path, home: &Path) -> Option<String> {
    let relative = home.strip_prefix(root).ok()?;
    let top = relative.components().next()?.as_os_str().to_string_lossy();
    let name = top.strip_suffix(".jdk").unwrap_or(&top).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn fake_jdk(home: &Path) {
        fs::create_dir_all(home.join("bin")).unwrap();
        fs::write(home.join("bin").join("java"), b"").unwrap();
        fs::write(home.join(RELEASE_FILE), b"JAVA_VERSION=\"21.0.2\"\n").unwrap();
    }

    #[test]
    fn test_scan_finds_macos_and_flat_layouts() {
        let root = tempdir().unwrap();
        fake_jdk(&root.path().join("zulu-17.jdk").join("Contents").join("Home"));
        fake_jdk(&root.path().join("temurin-21"));
        // A release file without a java binary is not a JDK.
        fs::create_dir_all(root.path().join("docs")).unwrap();
        fs::write(root.path().join("docs").join(RELEASE_FILE), b"").unwrap();

        let found = scan(&[root.path().to_path_buf()]);
        let ids: Vec<_> = found.iter().map(|v| v.identifier.as_str()).collect();
        assert_eq!(ids, vec!["temurin-21", "zulu-17"]);
        assert!(found.iter().all(|v| v.detected && !v.is_present()));
        assert!(found.iter().all(|v| v.candidate == JAVA_CANDIDATE));
        assert_eq!(
            found[1].path.as_deref(),
            Some(root.path().join("zulu-17.jdk/Contents/Home").as_path())
        );
    }

    #[test]
    fn test_scan_notes_native_image_command() {
        let root = tempdir().unwrap();
        let graal = root.path().join("graalvm-ce-21");
        fake_jdk(&graal);
        fs::write(graal.join("bin").join("native-image"), b"").unwrap();
        fake_jdk(&root.path().join("temurin-21"));

        let found = scan(&[root.path().to_path_buf()]);
        let with_native: Vec<_> = found
            .iter()
            .filter(|v| v.native_image)
            .map(|v| v.identifier.as_str())
            .collect();
        assert_eq!(with_native, vec!["graalvm-ce-21"]);
    }

    #[test]
    fn test_missing_root_is_skipped() {
        assert!(scan(&[PathBuf::from("/definitely/not/here")]).is_empty());
    }
}
