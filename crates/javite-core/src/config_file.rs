//! Project config file discovery and parsing.
//!
//! Loads `javite.config.json` or `javite.config.js`. The `java` key holds the
//! plugin options; everything else is `vite.config`-shaped user config.
//!
//! ## Supported format
//!
//! ```js
//! export default {
//!   java: {
//!     input: ['resources/js/app.ts'],
//!     publicDirectory: 'src/main/resources/static',
//!   },
//!   server: { port: 5173 },
//!   resolve: { alias: { '~': '/resources' } },
//! };
//! ```
//!
//! JS files are read statically: the default export must be an object
//! literal (optionally wrapped in `defineConfig(...)`) with no computed values.

use crate::error::{Error, Result};
use crate::host::UserConfig;
use crate::java::RawPluginConfig;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Config file names in priority order.
pub const CONFIG_FILES: &[&str] = &["javite.config.json", "javite.config.js"];

/// Key holding the plugin options.
const JAVA_KEY: &str = "java";

/// Configuration read from a project config file.
#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    /// Plugin options, if declared.
    pub java: Option<RawPluginConfig>,
    /// Host user config.
    pub user: UserConfig,
}

/// Find a config file in `root`.
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Load the project config.
///
/// With `config_path`, that file must exist; otherwise the first of
/// [`CONFIG_FILES`] found in `root` is used. Returns `Ok(None)` when nothing
/// is found.
pub fn load_project_config(
    root: &Path,
    config_path: Option<&Path>,
) -> Result<Option<(PathBuf, ProjectConfig)>> {
    let path = match config_path {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => root.join(p),
        None => match find_config_file(root) {
            Some(p) => p,
            None => return Ok(None),
        },
    };

    let source = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
        path: path.clone(),
        source,
    })?;

    let parse_err = |message: String| Error::ConfigParse {
        path: path.clone(),
        message,
    };

    let value: Value = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&source).map_err(|e| parse_err(e.to_string()))?
    } else {
        let literal = extract_default_export(&source)
            .ok_or_else(|| parse_err("no `export default { ... }` found".to_string()))?;
        parse_js_literal(&literal).map_err(parse_err)?
    };

    let config = project_config_from_value(value).map_err(parse_err)?;
    Ok(Some((path, config)))
}

/// Split a parsed config object into plugin options and user config.
pub fn project_config_from_value(value: Value) -> std::result::Result<ProjectConfig, String> {
    let Value::Object(mut object) = value else {
        return Err("config must be an object".to_string());
    };

    let java = object
        .remove(JAVA_KEY)
        .map(serde_json::from_value::<RawPluginConfig>)
        .transpose()
        .map_err(|e| format!("invalid `{JAVA_KEY}` options: {e}"))?;
    let user = serde_json::from_value(Value::Object(object)).map_err(|e| e.to_string())?;

    Ok(ProjectConfig { java, user })
}

/// The object literal after `export default`, braces included.
///
/// A `defineConfig(` wrapper is skipped.
fn extract_default_export(source: &str) -> Option<String> {
    let stripped = strip_comments(source);

    let marker = "export default";
    let idx = stripped.find(marker)?;
    let mut rest = stripped[idx + marker.len()..].trim_start();
    if let Some(inner) = rest.strip_prefix("defineConfig") {
        rest = inner.trim_start().strip_prefix('(')?.trim_start();
    }
    if !rest.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, ch) in rest.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(rest[..=i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Remove `//` and `/* */` comments outside string literals. Newlines inside
/// block comments are kept.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        let next = chars.peek().copied();
        match (ch, next) {
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    if c == '\n' {
                        out.push('\n');
                    }
                    prev = c;
                }
            }
            _ => {
                if matches!(ch, '"' | '\'' | '`') {
                    quote = Some(ch);
                }
                out.push(ch);
            }
        }
    }

    out
}

/// Parse a JS object literal: unquoted keys, single quotes, trailing commas.
fn parse_js_literal(input: &str) -> std::result::Result<Value, String> {
    let mut parser = LiteralParser {
        chars: input.chars().collect(),
        pos: 0,
    };
    let value = parser.value()?;
    parser.skip_whitespace();
    match parser.peek() {
        None | Some(')' | ';') => Ok(value),
        Some(ch) => Err(format!("unexpected '{ch}' after config object at position {}", parser.pos)),
    }
}

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
}

impl LiteralParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> std::result::Result<Value, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => self.object(),
            Some('[') => self.array(),
            Some('"' | '\'' | '`') => self.string().map(Value::String),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.number(),
            Some(ch) if ch.is_alphabetic() => self.keyword(),
            Some(ch) => Err(format!("unexpected '{ch}' at position {}", self.pos)),
            None => Err("unexpected end of input".to_string()),
        }
    }

    /// Parse a delimited sequence, calling `item` for each element.
    fn sequence(
        &mut self,
        close: char,
        mut item: impl FnMut(&mut Self) -> std::result::Result<(), String>,
    ) -> std::result::Result<(), String> {
        self.bump();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(ch) if ch == close => {
                    self.bump();
                    return Ok(());
                }
                None => return Err(format!("unterminated literal, expected '{close}'")),
                _ => {}
            }

            item(self)?;

            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(ch) if ch == close => {}
                Some(ch) => return Err(format!("expected ',' or '{close}', got '{ch}'")),
                None => return Err(format!("unterminated literal, expected '{close}'")),
            }
        }
    }

    fn object(&mut self) -> std::result::Result<Value, String> {
        let mut map = Map::new();
        self.sequence('}', |p| {
            let key = p.key()?;
            p.skip_whitespace();
            match p.bump() {
                Some(':') => {}
                other => return Err(format!("expected ':' after key `{key}`, got {other:?}")),
            }
            let value = p.value()?;
            map.insert(key, value);
            Ok(())
        })?;
        Ok(Value::Object(map))
    }

    fn array(&mut self) -> std::result::Result<Value, String> {
        let mut items = Vec::new();
        self.sequence(']', |p| {
            items.push(p.value()?);
            Ok(())
        })?;
        Ok(Value::Array(items))
    }

    fn key(&mut self) -> std::result::Result<String, String> {
        match self.peek() {
            Some('"' | '\'') => self.string(),
            Some(ch) if ch.is_alphabetic() || ch == '_' || ch == '$' => Ok(self.identifier()),
            other => Err(format!("expected object key, got {other:?}")),
        }
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn string(&mut self) -> std::result::Result<String, String> {
        let Some(quote) = self.bump() else {
            return Err("expected string".to_string());
        };
        let mut s = String::new();
        loop {
            match self.bump() {
                Some(ch) if ch == quote => return Ok(s),
                Some('\\') => match self.bump() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some(ch) => s.push(ch),
                    None => return Err("unterminated string escape".to_string()),
                },
                Some(ch) => s.push(ch),
                None => return Err("unterminated string".to_string()),
            }
        }
    }

    fn number(&mut self) -> std::result::Result<Value, String> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_digit() || ch == '.' || ch == '_')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|ch| **ch != '_')
            .collect();

        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::from(n));
        }
        text.parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("invalid number '{text}'"))
    }

    fn keyword(&mut self) -> std::result::Result<Value, String> {
        let start = self.pos;
        match self.identifier().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" | "undefined" => Ok(Value::Null),
            other => Err(format!(
                "unsupported expression `{other}` at position {start}; config values must be literals"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AliasConfig, HmrSetting, Input};

    #[test]
    fn test_find_config_file_prefers_json() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_config_file(dir.path()).is_none());

        std::fs::write(dir.path().join("javite.config.js"), "export default {}").unwrap();
        assert_eq!(find_config_file(dir.path()).unwrap(), dir.path().join("javite.config.js"));

        std::fs::write(dir.path().join("javite.config.json"), "{}").unwrap();
        assert_eq!(find_config_file(dir.path()).unwrap(), dir.path().join("javite.config.json"));
    }

    #[test]
    fn test_load_js_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("javite.config.js"),
            r#"
            // Spring Boot frontend
            import { defineConfig } from 'vite'

            export default defineConfig({
              java: {
                input: ['src/main/resources/static/js/app.ts'],
                publicDirectory: 'src/main/resources/static', /* served by Spring */
                tsCompiler: 'swc',
              },
              server: { port: 3000, hmr: false },
              resolve: { alias: { '~': '/resources' } },
            })
            "#,
        )
        .unwrap();

        let (path, config) = load_project_config(dir.path(), None).unwrap().unwrap();
        assert_eq!(path, dir.path().join("javite.config.js"));

        let Some(RawPluginConfig::Options(options)) = config.java else {
            panic!("expected plugin options");
        };
        assert_eq!(
            options.input,
            Some(Input::Many(vec!["src/main/resources/static/js/app.ts".to_string()]))
        );
        assert_eq!(options.public_directory.as_deref(), Some("src/main/resources/static"));
        assert_eq!(config.user.server.port, Some(3000));
        assert_eq!(config.user.server.hmr, Some(HmrSetting::Flag(false)));
        assert!(matches!(config.user.resolve.alias, Some(AliasConfig::Map(ref m)) if m["~"] == "/resources"));
    }

    #[test]
    fn test_load_json_config_with_bare_input() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("javite.config.json"),
            r#"{ "java": "resources/js/app.ts", "base": "/static/" }"#,
        )
        .unwrap();

        let (_, config) = load_project_config(dir.path(), None).unwrap().unwrap();
        assert!(matches!(config.java, Some(RawPluginConfig::Input(Input::Single(ref s))) if s == "resources/js/app.ts"));
        assert_eq!(config.user.base.as_deref(), Some("/static/"));
    }

    #[test]
    fn test_config_without_java_key() {
        let config = project_config_from_value(serde_json::json!({ "base": "/" })).unwrap();
        assert!(config.java.is_none());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_project_config(dir.path(), Some(Path::new("missing.json"))).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));

        assert!(load_project_config(dir.path(), None).unwrap().is_none());
    }

    #[test]
    fn test_invalid_configs_report_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("javite.config.js");

        std::fs::write(&path, "module.exports = {}").unwrap();
        assert!(matches!(load_project_config(dir.path(), None), Err(Error::ConfigParse { .. })));

        std::fs::write(&path, "export default { java: resolveInput() }").unwrap();
        let err = load_project_config(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("resolveInput"));

        std::fs::write(&path, "export default { server: { port: 'eighty' } }").unwrap();
        assert!(matches!(load_project_config(dir.path(), None), Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_literal_parser_forms() {
        let value = parse_js_literal(
            r#"{ a: 'single', "b": "double", c: [1, -2, 3.5, 1_000,], d: { e: null, f: true }, }"#,
        )
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "a": "single", "b": "double", "c": [1, -2, 3.5, 1000], "d": { "e": null, "f": true } })
        );

        assert!(parse_js_literal("{ a: 1 ").is_err());
        assert!(parse_js_literal("{ a 1 }").is_err());
    }

    #[test]
    fn test_strip_comments_keeps_strings() {
        let out = strip_comments("a // gone\nb /* gone\n */ c 'http://kept' \"/* kept */\"");
        assert!(!out.contains("gone"));
        assert!(out.contains("'http://kept'"));
        assert!(out.contains("\"/* kept */\""));
        assert_eq!(out.matches('\n').count(), 2);
    }
}
