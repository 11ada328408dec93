//! Java project helpers: entry discovery, `.properties` files and version sniffing.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Default entry-point pattern for [`create_rollup_input_config`].
pub const DEFAULT_INPUT_PATTERN: &str = "src/**/main.ts";

/// Default base directory for entry aliases.
pub const DEFAULT_INPUT_BASE: &str = "src";

/// Default pattern for [`read_properties_files`].
pub const DEFAULT_PROPERTIES_PATTERN: &str = "**/*.properties";

/// Expand glob `patterns` relative to `cwd` into sorted, de-duplicated files.
fn glob_files(patterns: &[&str], cwd: &Path) -> Result<Vec<PathBuf>> {
    let root = glob::Pattern::escape(&cwd.to_string_lossy());
    let mut files = Vec::new();

    for pattern in patterns {
        let full = if Path::new(pattern).is_absolute() {
            (*pattern).to_string()
        } else {
            format!("{}/{}", root.trim_end_matches('/'), pattern)
        };
        let paths = glob::glob(&full).map_err(|e| Error::Pattern {
            pattern: (*pattern).to_string(),
            message: e.msg.to_string(),
        })?;
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!(path = %e.path().display(), "skipping unreadable path"),
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Lexical relative path from `base` to `path`, with `/` separators.
fn relative_to(path: &Path, base: &Path) -> String {
    let path: Vec<Component<'_>> = path.components().filter(|c| *c != Component::CurDir).collect();
    let base: Vec<Component<'_>> = base.components().filter(|c| *c != Component::CurDir).collect();
    let common = path.iter().zip(&base).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = std::iter::repeat("..".to_string())
        .take(base.len() - common)
        .collect();
    parts.extend(
        path[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

/// Discover entry points and key them by alias.
///
/// The alias is the file's path relative to `base_dir`, without extension:
/// `src/pages/admin/main.ts` with base `src` becomes `pages/admin/main`.
/// Values are absolute paths.
pub fn create_rollup_input_config(
    patterns: &[&str],
    base_dir: &str,
    cwd: &Path,
) -> Result<BTreeMap<String, PathBuf>> {
    let patterns = if patterns.is_empty() {
        &[DEFAULT_INPUT_PATTERN][..]
    } else {
        patterns
    };

    let mut inputs = BTreeMap::new();
    for file in glob_files(patterns, cwd)? {
        let relative = file.strip_prefix(cwd).unwrap_or(&file);
        let alias = relative_to(&relative.with_extension(""), Path::new(base_dir));
        inputs.insert(alias, file);
    }
    Ok(inputs)
}

/// Parse `.properties` content. Comments start with `#` or `!`; the key ends
/// at the first `=`.
#[must_use]
pub fn parse_properties(content: &str) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (key, value) = line.split_once('=').unwrap_or((line, ""));
        let key = key.trim();
        if !key.is_empty() {
            properties.insert(key.to_string(), value.trim().to_string());
        }
    }
    properties
}

/// Read every `.properties` file matching `patterns` under `cwd`.
///
/// Files are read in path order; a key defined in several files keeps the
/// last value.
pub fn read_properties_files(patterns: &[&str], cwd: &Path) -> Result<BTreeMap<String, String>> {
    let patterns = if patterns.is_empty() {
        &[DEFAULT_PROPERTIES_PATTERN][..]
    } else {
        patterns
    };

    let mut properties = BTreeMap::new();
    for file in glob_files(patterns, cwd)? {
        let content = javite_util::fs::read_to_string_lossy(&file)?;
        properties.extend(parse_properties(&content));
    }
    Ok(properties)
}

#[must_use]
pub fn is_maven_project(root: &Path) -> bool {
    root.join("pom.xml").exists()
}

#[must_use]
pub fn is_gradle_project(root: &Path) -> bool {
    root.join("build.gradle").exists()
}

#[must_use]
pub fn is_kotlin_dsl_project(root: &Path) -> bool {
    root.join("build.gradle.kts").exists()
}

/// Outcome of a best-effort version lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionProbe {
    Detected(String),
    /// No build file declares a version.
    Undetected,
    /// A build file exists but could not be read.
    Failed(String),
}

impl VersionProbe {
    /// The detected version, or an empty string.
    #[must_use]
    pub fn or_empty(&self) -> &str {
        match self {
            Self::Detected(version) => version,
            Self::Undetected | Self::Failed(_) => "",
        }
    }
}

fn capture(pattern: &str, haystack: &str) -> Option<String> {
    let re = regex_lite::Regex::new(pattern).ok()?;
    re.captures(haystack)?
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
}

fn java_version_constant(pattern: &str, haystack: &str) -> Option<String> {
    capture(pattern, haystack).map(|v| v.replacen('_', ".", 1))
}

fn maven_version(pom: &str) -> Option<String> {
    capture(r"<java\.version>(.*?)</java\.version>", pom)
}

fn gradle_version(script: &str) -> Option<String> {
    capture(r#"(?i)sourceCompatibility\s*=\s*['"]?(\d+(?:\.\d+)?)['"]?"#, script).or_else(|| {
        java_version_constant(
            r"(?i)sourceCompatibility\s*=\s*JavaVersion\.VERSION_(\d+(?:_\d+)?)",
            script,
        )
    })
}

fn kotlin_dsl_version(script: &str) -> Option<String> {
    java_version_constant(
        r"(?i)sourceCompatibility\s*=\s*JavaVersion\.VERSION_(\d+(?:_\d+)?)",
        script,
    )
}

/// Java version declared by the project's build files.
///
/// Looks at `pom.xml`, `build.gradle` and `build.gradle.kts` in that order;
/// a later file that declares a version wins.
#[must_use]
pub fn java_version(root: &Path) -> VersionProbe {
    type Sniffer = fn(&str) -> Option<String>;
    type Detector = fn(&Path) -> bool;
    let candidates: [(&str, Detector, Sniffer); 3] = [
        ("pom.xml", is_maven_project, maven_version),
        ("build.gradle", is_gradle_project, gradle_version),
        ("build.gradle.kts", is_kotlin_dsl_project, kotlin_dsl_version),
    ];

    let mut probe = VersionProbe::Undetected;
    for (file, detect, sniff) in candidates {
        if !detect(root) {
            continue;
        }
        let path = root.join(file);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                if let Some(version) = sniff(&content) {
                    probe = VersionProbe::Detected(version);
                }
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "failed to read build file");
                return VersionProbe::Failed(format!("{}: {e}", path.display()));
            }
        }
    }
    probe
}
