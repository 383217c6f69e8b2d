//! Theme generator configuration.
//!
//! [`ThemeConfig`] is what users write, as YAML or JSON. Keys are snake_case; the
//! camelCase names used by the JavaScript theme plugins are accepted as aliases so
//! existing configurations keep working. [`ThemeConfig::validate`] turns it into
//! [`ThemeOptions`], which is what the pipeline runs on.

use std::path::{Path, PathBuf};

use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::theme::compiler::LesscCompiler;
use crate::theme::constants::{DEFAULT_VAR_FILE, LIBRARY_LIB_DIR, PRIMARY_COLOR_VARIABLE};
use crate::theme::error::{IoContext, ThemeError, ThemeResult};

/// User facing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeConfig {
    /// Component library install directory; its `lib` folder holds the styles
    #[serde(default, alias = "antDir")]
    pub antd_dir: Option<PathBuf>,
    /// Overrides `<antd_dir>/lib` as the library styles directory
    #[serde(default, alias = "antdStylesDir")]
    pub antd_styles_dir: Option<PathBuf>,
    /// Directory with the caller's own LESS files
    #[serde(alias = "stylesDir")]
    pub styles_dir: PathBuf,
    /// The caller's entry LESS file
    #[serde(default, alias = "mainLessFile")]
    pub main_less_file: Option<PathBuf>,
    /// Variable definitions; defaults to the library's default theme
    #[serde(default, alias = "varFile")]
    pub var_file: Option<PathBuf>,
    /// Where the generated stylesheet is written
    #[serde(default, alias = "outputFilePath")]
    pub output_file_path: Option<PathBuf>,
    #[serde(default, alias = "cssModules")]
    pub css_modules: bool,
    #[serde(default = "default_theme_variables", alias = "themeVariables")]
    pub theme_variables: Vec<String>,
    /// Extra regular expressions for values that count as colors
    #[serde(default, alias = "customColorRegexArray")]
    pub custom_color_regex_array: Vec<String>,
    #[serde(default = "default_lessc_path", alias = "lesscPath")]
    pub lessc_path: PathBuf,
    /// Import prefix resolved from the package root
    #[serde(default = "default_import_prefix", alias = "importPrefix")]
    pub import_prefix: String,
    #[serde(default, alias = "logFile")]
    pub log_file: Option<PathBuf>,
}

fn default_theme_variables() -> Vec<String> {
    vec![PRIMARY_COLOR_VARIABLE.to_string()]
}

fn default_lessc_path() -> PathBuf {
    PathBuf::from("lessc")
}

fn default_import_prefix() -> String {
    "~".to_string()
}

/// Validated options the theme pipeline runs on
#[derive(Debug, Clone)]
pub struct ThemeOptions {
    /// Precompiled styles of the component library (`<antd_dir>/lib` by default)
    pub library_styles_dir: PathBuf,
    pub styles_dir: PathBuf,
    pub main_less_file: Option<PathBuf>,
    pub var_file: PathBuf,
    pub output_file_path: Option<PathBuf>,
    pub css_modules: bool,
    pub theme_variables: Vec<String>,
    pub custom_color_patterns: Vec<Regex>,
}

impl ThemeOptions {
    /// Options for a library styles directory with every optional setting at its default
    pub fn new(library_styles_dir: impl Into<PathBuf>, styles_dir: impl Into<PathBuf>) -> Self {
        let library_styles_dir = library_styles_dir.into();
        Self {
            var_file: library_styles_dir.join(DEFAULT_VAR_FILE),
            library_styles_dir,
            styles_dir: styles_dir.into(),
            main_less_file: None,
            output_file_path: None,
            css_modules: false,
            theme_variables: default_theme_variables(),
            custom_color_patterns: Vec::new(),
        }
    }
}

impl ThemeConfig {
    /// Load a configuration file, YAML or JSON by extension.
    ///
    /// Relative paths in the file are resolved against the file's directory.
    pub fn from_file(path: &Path) -> ThemeResult<Self> {
        let content = std::fs::read_to_string(path)
            .with_io_context(&format!("Failed to read config {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
        let config: ThemeConfig = match extension {
            "json" => serde_json::from_str(&content).map_err(|e| ThemeError::Config {
                message: format!("{}: {}", path.display(), e),
            })?,
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| ThemeError::Config {
                message: format!("{}: {}", path.display(), e),
            })?,
            other => {
                return Err(ThemeError::Config {
                    message: format!("Unsupported config format '{}', expected json or yaml", other),
                });
            }
        };

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        self.antd_dir = self.antd_dir.map(resolve);
        self.antd_styles_dir = self.antd_styles_dir.map(resolve);
        self.styles_dir = resolve(self.styles_dir);
        self.main_less_file = self.main_less_file.map(resolve);
        self.var_file = self.var_file.map(resolve);
        self.output_file_path = self.output_file_path.map(resolve);
        self.log_file = self.log_file.map(resolve);
        self
    }

    /// Check the configuration and fill in defaults
    pub fn validate(&self) -> ThemeResult<ThemeOptions> {
        let library_styles_dir = match (&self.antd_styles_dir, &self.antd_dir) {
            (Some(styles_dir), _) => styles_dir.clone(),
            (None, Some(antd_dir)) => antd_dir.join(LIBRARY_LIB_DIR),
            (None, None) => {
                return Err(ThemeError::Config {
                    message: "either antd_dir or antd_styles_dir must be set".to_string(),
                });
            }
        };

        if self.theme_variables.is_empty() {
            return Err(ThemeError::Config {
                message: "theme_variables must name at least one variable".to_string(),
            });
        }
        if let Some(name) = self.theme_variables.iter().find(|name| !name.starts_with('@')) {
            return Err(ThemeError::Config {
                message: format!("theme variable '{}' must start with '@'", name),
            });
        }

        let custom_color_patterns = self
            .custom_color_regex_array
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ThemeError::InvalidPattern {
                    pattern: pattern.clone(),
                    source: e,
                })
            })
            .collect::<ThemeResult<Vec<_>>>()?;

        if self.css_modules {
            debug!("CSS modules output requested");
        }

        let var_file = self
            .var_file
            .clone()
            .unwrap_or_else(|| library_styles_dir.join(DEFAULT_VAR_FILE));

        Ok(ThemeOptions {
            library_styles_dir,
            styles_dir: self.styles_dir.clone(),
            main_less_file: self.main_less_file.clone(),
            var_file,
            output_file_path: self.output_file_path.clone(),
            css_modules: self.css_modules,
            theme_variables: self.theme_variables.clone(),
            custom_color_patterns,
        })
    }

    /// The external compiler this configuration asks for
    pub fn compiler(&self) -> LesscCompiler {
        LesscCompiler::new(self.lessc_path.clone(), self.import_prefix.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: ThemeConfig = serde_yaml::from_str("antd_dir: /opt/antd\nstyles_dir: /app/styles\n").unwrap();
        let options = config.validate().unwrap();

        assert_eq!(options.library_styles_dir, PathBuf::from("/opt/antd/lib"));
        assert_eq!(options.var_file, PathBuf::from("/opt/antd/lib/style/themes/default.less"));
        assert_eq!(options.theme_variables, vec!["@primary-color".to_string()]);
        assert!(options.custom_color_patterns.is_empty());
        assert!(options.output_file_path.is_none());
        assert!(!options.css_modules);
        assert_eq!(config.lessc_path, PathBuf::from("lessc"));
        assert_eq!(config.import_prefix, "~");
    }

    #[test]
    fn test_camel_case_keys() {
        let json = r#"{
            "antDir": "/opt/antd",
            "antdStylesDir": "/opt/antd/es",
            "stylesDir": "/app/styles",
            "mainLessFile": "/app/styles/main.less",
            "outputFilePath": "/app/public/color.less",
            "themeVariables": ["@primary-color", "@link-color"],
            "customColorRegexArray": ["^transparent$"]
        }"#;
        let config: ThemeConfig = serde_json::from_str(json).unwrap();
        let options = config.validate().unwrap();

        assert_eq!(options.library_styles_dir, PathBuf::from("/opt/antd/es"));
        assert_eq!(options.theme_variables.len(), 2);
        assert_eq!(options.custom_color_patterns.len(), 1);
        assert!(options.custom_color_patterns[0].is_match("transparent"));
    }

    #[test]
    fn test_missing_library_dir() {
        let config: ThemeConfig = serde_yaml::from_str("styles_dir: /app/styles\n").unwrap();
        assert!(matches!(config.validate(), Err(ThemeError::Config { .. })));
    }

    #[test]
    fn test_invalid_theme_variable() {
        let config: ThemeConfig =
            serde_yaml::from_str("antd_dir: /opt/antd\nstyles_dir: /s\ntheme_variables: [primary-color]\n").unwrap();
        assert!(matches!(config.validate(), Err(ThemeError::Config { .. })));

        let config: ThemeConfig =
            serde_yaml::from_str("antd_dir: /opt/antd\nstyles_dir: /s\ntheme_variables: []\n").unwrap();
        assert!(matches!(config.validate(), Err(ThemeError::Config { .. })));
    }

    #[test]
    fn test_invalid_color_pattern() {
        let config: ThemeConfig = serde_yaml::from_str(
            "antd_dir: /opt/antd\nstyles_dir: /s\ncustom_color_regex_array: ['([a-z']\n",
        )
        .unwrap();
        match config.validate() {
            Err(ThemeError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "([a-z"),
            other => panic!("Expected invalid pattern error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.yaml");
        std::fs::write(
            &path,
            "antd_dir: node_modules/antd\nstyles_dir: src/styles\noutput_file_path: public/color.less\n",
        )
        .unwrap();

        let config = ThemeConfig::from_file(&path).unwrap();
        assert_eq!(config.antd_dir, Some(dir.path().join("node_modules/antd")));
        assert_eq!(config.styles_dir, dir.path().join("src/styles"));
        assert_eq!(config.output_file_path, Some(dir.path().join("public/color.less")));
    }

    #[test]
    fn test_from_file_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.toml");
        std::fs::write(&path, "styles_dir = 'x'\n").unwrap();
        assert!(matches!(ThemeConfig::from_file(&path), Err(ThemeError::Config { .. })));
    }
}
