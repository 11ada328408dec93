//! Plugin options and their normalization into a canonical [`PluginConfig`].

use super::url::DevServerUrl;
use crate::error::ConfigError;
use crate::host::Input;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Hook applied to every module served in dev mode, after placeholder rewriting.
pub type TransformOnServe = Arc<dyn Fn(&str, &DevServerUrl) -> String + Send + Sync>;

/// TypeScript compiler used for the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TsCompiler {
    #[default]
    Esbuild,
    Swc,
}

/// Plugin options as written by the user. Every field is optional.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginOptions {
    /// Entry points to compile.
    pub input: Option<Input>,
    /// Directory for public assets. Defaults to `public`.
    pub public_directory: Option<String>,
    /// Public subdirectory compiled assets are served from. Defaults to `build`.
    pub build_directory: Option<String>,
    /// Directory the bundle is written to. Defaults to `dist`.
    pub output_directory: Option<String>,
    pub ts_compiler: Option<TsCompiler>,
    pub swc_options: Option<serde_json::Value>,
    /// Path of the hot file. Defaults to `<publicDirectory>/hot`.
    pub hot_file: Option<PathBuf>,
    /// Path to the Java project root, used for version detection.
    pub java_project_base: Option<PathBuf>,
    #[serde(skip)]
    pub transform_on_serve: Option<TransformOnServe>,
}

impl PluginOptions {
    const KEYS: &'static [&'static str] = &[
        "input",
        "publicDirectory",
        "buildDirectory",
        "outputDirectory",
        "tsCompiler",
        "swcOptions",
        "hotFile",
        "javaProjectBase",
    ];

    #[must_use]
    pub fn new(input: impl Into<Input>) -> Self {
        Self {
            input: Some(input.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn transform_on_serve(
        mut self,
        hook: impl Fn(&str, &DevServerUrl) -> String + Send + Sync + 'static,
    ) -> Self {
        self.transform_on_serve = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for PluginOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginOptions")
            .field("input", &self.input)
            .field("public_directory", &self.public_directory)
            .field("build_directory", &self.build_directory)
            .field("output_directory", &self.output_directory)
            .field("ts_compiler", &self.ts_compiler)
            .field("hot_file", &self.hot_file)
            .field("java_project_base", &self.java_project_base)
            .field("transform_on_serve", &self.transform_on_serve.is_some())
            .finish_non_exhaustive()
    }
}

/// What the plugin factory accepts: a bare input or a full options object.
#[derive(Debug, Clone)]
pub enum RawPluginConfig {
    Input(Input),
    Options(PluginOptions),
}

impl From<Input> for RawPluginConfig {
    fn from(input: Input) -> Self {
        Self::Input(input)
    }
}

impl From<PluginOptions> for RawPluginConfig {
    fn from(options: PluginOptions) -> Self {
        Self::Options(options)
    }
}

impl From<&str> for RawPluginConfig {
    fn from(path: &str) -> Self {
        Self::Input(Input::from(path))
    }
}

// Strings and arrays are bare inputs. Objects are options when they carry a
// known option key, and an `alias → path` input otherwise.
impl<'de> Deserialize<'de> for RawPluginConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;

        let value = serde_json::Value::deserialize(deserializer)?;
        let is_options = value
            .as_object()
            .is_some_and(|obj| obj.is_empty() || PluginOptions::KEYS.iter().any(|k| obj.contains_key(*k)));

        if is_options {
            serde_json::from_value(value).map(Self::Options).map_err(D::Error::custom)
        } else {
            serde_json::from_value(value).map(Self::Input).map_err(D::Error::custom)
        }
    }
}

/// Canonical, validated plugin configuration.
#[derive(Clone)]
pub struct PluginConfig {
    pub input: Input,
    pub public_directory: String,
    pub build_directory: String,
    pub output_directory: String,
    pub ts_compiler: TsCompiler,
    pub swc_options: serde_json::Value,
    pub hot_file: PathBuf,
    pub java_project_base: Option<PathBuf>,
    pub transform_on_serve: TransformOnServe,
}

impl fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginConfig")
            .field("input", &self.input)
            .field("public_directory", &self.public_directory)
            .field("build_directory", &self.build_directory)
            .field("output_directory", &self.output_directory)
            .field("ts_compiler", &self.ts_compiler)
            .field("swc_options", &self.swc_options)
            .field("hot_file", &self.hot_file)
            .field("java_project_base", &self.java_project_base)
            .finish_non_exhaustive()
    }
}

fn identity_transform() -> TransformOnServe {
    Arc::new(|code: &str, _url: &DevServerUrl| code.to_string())
}

/// Trim whitespace and strip leading slashes. An empty result is invalid.
pub fn normalize_public_directory(dir: &str) -> Result<String, ConfigError> {
    let dir = dir.trim().trim_start_matches('/');
    if dir.is_empty() {
        return Err(ConfigError::InvalidPublicDirectory);
    }
    Ok(dir.to_string())
}

/// Trim whitespace and strip trailing slashes. An empty result is invalid.
pub fn normalize_build_directory(dir: &str) -> Result<String, ConfigError> {
    let dir = dir.trim().trim_end_matches('/');
    if dir.is_empty() {
        return Err(ConfigError::InvalidBuildDirectory);
    }
    Ok(dir.to_string())
}

/// Trim whitespace and strip trailing slashes. Empty means "no subdirectory".
#[must_use]
pub fn normalize_output_directory(dir: &str) -> String {
    dir.trim().trim_end_matches('/').to_string()
}

/// Validate raw plugin input and fill in defaults.
pub fn resolve_plugin_config(config: Option<RawPluginConfig>) -> Result<PluginConfig, ConfigError> {
    let options = match config.ok_or(ConfigError::Missing)? {
        RawPluginConfig::Input(input) => PluginOptions {
            input: Some(input),
            ..Default::default()
        },
        RawPluginConfig::Options(options) => options,
    };

    let input = options
        .input
        .filter(|input| !input.is_empty())
        .ok_or(ConfigError::MissingInput)?;

    let public_directory = options
        .public_directory
        .as_deref()
        .map(normalize_public_directory)
        .transpose()?
        .unwrap_or_else(|| "public".to_string());

    let build_directory = options
        .build_directory
        .as_deref()
        .map(normalize_build_directory)
        .transpose()?
        .unwrap_or_else(|| "build".to_string());

    let output_directory = options
        .output_directory
        .as_deref()
        .map_or_else(|| "dist".to_string(), normalize_output_directory);

    let hot_file = options
        .hot_file
        .unwrap_or_else(|| Path::new(&public_directory).join("hot"));

    Ok(PluginConfig {
        input,
        public_directory,
        build_directory,
        output_directory,
        ts_compiler: options.ts_compiler.unwrap_or_default(),
        swc_options: options
            .swc_options
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new())),
        hot_file,
        java_project_base: options.java_project_base,
        transform_on_serve: options.transform_on_serve.unwrap_or_else(identity_transform),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn options(f: impl FnOnce(&mut PluginOptions)) -> Option<RawPluginConfig> {
        let mut opts = PluginOptions::new("resources/js/app.ts");
        f(&mut opts);
        Some(opts.into())
    }

    #[test]
    fn test_missing_configuration() {
        let err = resolve_plugin_config(None).unwrap_err();
        assert_eq!(err, ConfigError::Missing);
        assert_eq!(err.to_string(), "javite: missing configuration.");
    }

    #[test]
    fn test_missing_input() {
        let err = resolve_plugin_config(Some(PluginOptions::default().into())).unwrap_err();
        assert_eq!(err, ConfigError::MissingInput);

        let err = resolve_plugin_config(Some(Input::Many(vec![]).into())).unwrap_err();
        assert_eq!(err, ConfigError::MissingInput);
    }

    #[test]
    fn test_bare_input_gets_defaults() {
        let config = resolve_plugin_config(Some("resources/js/app.ts".into())).unwrap();

        assert_eq!(config.input, Input::from("resources/js/app.ts"));
        assert_eq!(config.public_directory, "public");
        assert_eq!(config.build_directory, "build");
        assert_eq!(config.output_directory, "dist");
        assert_eq!(config.hot_file, PathBuf::from("public/hot"));
        assert_eq!(config.ts_compiler, TsCompiler::Esbuild);
        assert!(config.swc_options.as_object().is_some_and(serde_json::Map::is_empty));

        let url = DevServerUrl::new("http://localhost:5173");
        assert_eq!((config.transform_on_serve)("code", &url), "code");
    }

    #[test]
    fn test_public_directory_strips_leading_slashes() {
        for raw in ["static", "/static", "///static", "  //static  "] {
            let config = resolve_plugin_config(options(|o| {
                o.public_directory = Some(raw.to_string());
            }))
            .unwrap();
            assert_eq!(config.public_directory, "static", "input {raw:?}");
            assert_eq!(config.hot_file, PathBuf::from("static/hot"));
        }

        for raw in ["", "/", " // "] {
            let err = resolve_plugin_config(options(|o| {
                o.public_directory = Some(raw.to_string());
            }))
            .unwrap_err();
            assert_eq!(err, ConfigError::InvalidPublicDirectory, "input {raw:?}");
        }
    }

    #[test]
    fn test_build_directory_strips_trailing_slashes() {
        let config = resolve_plugin_config(options(|o| {
            o.build_directory = Some(" assets/build// ".to_string());
        }))
        .unwrap();
        assert_eq!(config.build_directory, "assets/build");

        let err = resolve_plugin_config(options(|o| {
            o.build_directory = Some("///".to_string());
        }))
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidBuildDirectory);
    }

    #[test]
    fn test_output_directory_may_be_empty() {
        let config = resolve_plugin_config(options(|o| {
            o.output_directory = Some(" / ".to_string());
        }))
        .unwrap();
        assert_eq!(config.output_directory, "");

        let config = resolve_plugin_config(options(|o| {
            o.output_directory = Some("../server/src/main/webapp/WEB-INF/dist/".to_string());
        }))
        .unwrap();
        assert_eq!(config.output_directory, "../server/src/main/webapp/WEB-INF/dist");
    }

    #[test]
    fn test_explicit_hot_file_wins() {
        let config = resolve_plugin_config(options(|o| {
            o.public_directory = Some("static".to_string());
            o.hot_file = Some(PathBuf::from("target/hot"));
        }))
        .unwrap();
        assert_eq!(config.hot_file, PathBuf::from("target/hot"));
    }

    #[test]
    fn test_custom_transform_is_kept() {
        let raw = PluginOptions::new("app.ts").transform_on_serve(|code, url| format!("{code}//{url}"));
        let config = resolve_plugin_config(Some(raw.into())).unwrap();
        let url = DevServerUrl::new("http://[::1]:5173");
        assert_eq!((config.transform_on_serve)("x", &url), "x//http://[::1]:5173");
    }

    #[test]
    fn test_deserialize_raw_config_shapes() {
        let raw: RawPluginConfig = serde_json::from_str(r#""src/main.ts""#).unwrap();
        assert!(matches!(raw, RawPluginConfig::Input(Input::Single(_))));

        let raw: RawPluginConfig = serde_json::from_str(r#"["a.ts", "b.ts"]"#).unwrap();
        assert!(matches!(raw, RawPluginConfig::Input(Input::Many(ref v)) if v.len() == 2));

        let raw: RawPluginConfig = serde_json::from_str(r#"{"app": "a.ts", "admin": "b.ts"}"#).unwrap();
        let mut expected = BTreeMap::new();
        expected.insert("app".to_string(), "a.ts".to_string());
        expected.insert("admin".to_string(), "b.ts".to_string());
        assert!(matches!(raw, RawPluginConfig::Input(Input::Named(ref m)) if *m == expected));

        let raw: RawPluginConfig = serde_json::from_str(
            r#"{"input": "a.ts", "tsCompiler": "swc", "outputDirectory": "out"}"#,
        )
        .unwrap();
        let RawPluginConfig::Options(opts) = raw else {
            panic!("expected options");
        };
        assert_eq!(opts.ts_compiler, Some(TsCompiler::Swc));
        assert_eq!(opts.output_directory.as_deref(), Some("out"));

        let raw: RawPluginConfig = serde_json::from_str("{}").unwrap();
        assert!(matches!(raw, RawPluginConfig::Options(_)));
    }
}
