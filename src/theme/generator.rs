//! Theme generation pipeline
//!
//! [`ThemeGenerator`] turns the component library's LESS sources plus the caller's
//! own styles into a single color-only stylesheet whose colors are LESS variables
//! again, so the theme can be recompiled in the browser with different values.
//!
//! The stages run strictly in order:
//!
//! 1. load the library entry, one import per component style, and the caller's entry
//! 2. short-circuit if the content digest matches the cached run
//! 3. map variable names to colors (library variables, then the caller's)
//! 4. synthesize a probe rule per theme variable and per palette shade
//! 5. compile the probes and read back the literal each one produced
//! 6. compile the full styles, together with the caller's custom styles
//! 7. reduce the result to color declarations
//! 8. replace every probed literal by its variable or palette expression
//! 9. prepend the variable declarations and persist
//!
//! The substitution in step 8 is textual. When two theme variables compile to the same
//! literal, the one whose probe comes first in the compiled probe output claims every
//! occurrence.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info, warn};
use regex::{NoExpand, Regex};
use sha2::{Digest, Sha256};

use crate::config::ThemeOptions;

use super::bundle::bundle_less_file;
use super::compiler::{compile_custom_styles, LessCompiler};
use super::constants::{
    IE_HACK_TOKEN, PATH_COMMENT_RE, PROBE_RULE_RE, PROBE_VALUE_PREFIXES, SHADE_INDICES, STYLE_DIR,
    STYLE_ENTRY_FILE,
};
use super::error::{IoContext, ThemeResult};
use super::reducer::reduce_to_colors;
use super::shade::{shade_expression, shade_variable_name};
use super::variables::{build_color_map, ColorMap};

/// Probe variable name to the literal the compiler produced for it, in the order the
/// probes appeared in the compiled output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledColorTable {
    entries: Vec<(String, String)>,
}

impl CompiledColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced entry keeps its original position.
    pub fn insert(&mut self, name: String, color: String) {
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            entry.1 = color;
        } else {
            self.entries.push((name, color));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, color)| color.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, color)| (name.as_str(), color.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
struct CachedTheme {
    digest: String,
    css: String,
}

/// Single slot cache of the last generated stylesheet, keyed by content digest
#[derive(Debug, Default)]
pub struct ThemeCache {
    slot: Mutex<Option<CachedTheme>>,
}

impl ThemeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached stylesheet, if it was generated from content with this digest
    pub fn get(&self, digest: &str) -> Option<String> {
        let slot = self.slot.lock().ok()?;
        slot.as_ref()
            .filter(|cached| cached.digest == digest)
            .map(|cached| cached.css.clone())
    }

    /// Replace digest and stylesheet together
    pub fn store(&self, digest: String, css: String) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(CachedTheme { digest, css });
        }
    }
}

/// Hex encoded SHA-256 of the concatenated sources
pub fn content_digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sources read by the load stage
struct LoadedSources {
    /// Library entry, component imports and the caller's entry, concatenated
    content: String,
    /// The caller's entry file on its own
    custom_styles: Option<String>,
}

/// Generates color themes, remembering the last result
pub struct ThemeGenerator<C: LessCompiler> {
    compiler: C,
    cache: ThemeCache,
}

impl<C: LessCompiler> ThemeGenerator<C> {
    pub fn new(compiler: C) -> Self {
        Self {
            compiler,
            cache: ThemeCache::new(),
        }
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Run the whole pipeline. Any failing stage aborts the run, leaving the output
    /// file and the cache untouched.
    pub async fn generate(&self, options: &ThemeOptions) -> ThemeResult<String> {
        let sources = load_sources(options).await?;

        let digest = content_digest(&sources.content);
        if let Some(css) = self.cache.get(&digest) {
            info!("Sources unchanged, reusing the cached theme");
            return Ok(css);
        }

        let variables_less = bundle_less_file(&options.var_file).await?;
        let mut mappings = build_color_map(&variables_less, &options.custom_color_patterns);
        if let Some(custom_styles) = &sources.custom_styles {
            mappings.extend(build_color_map(custom_styles, &options.custom_color_patterns));
        }
        debug!("Mapped {} color variables", mappings.len());

        let theme_variables = select_theme_variables(&options.theme_variables, &mappings);
        if theme_variables.len() < options.theme_variables.len() {
            warn!(
                "Ignoring theme variables without a color value: {:?}",
                options
                    .theme_variables
                    .iter()
                    .filter(|name| !mappings.contains_key(*name))
                    .collect::<Vec<_>>()
            );
        }

        let include_paths = vec![options.library_styles_dir.join(STYLE_DIR), options.styles_dir.clone()];

        let probes = synthesize_probes(&theme_variables);
        let probe_css = self
            .compiler
            .compile(&format!("{}\n{}", variables_less, probes), &include_paths)
            .await?;
        let compiled = extract_compiled_colors(&probe_css);
        debug!("Recovered {} compiled probe colors", compiled.len());

        let full_source = format!("{}\n{}", sources.content, variables_less);
        let (library_css, custom_css) = tokio::join!(
            self.compiler.compile(&full_source, &include_paths),
            compile_custom_styles(&self.compiler, &options.styles_dir, &options.library_styles_dir),
        );
        let css = format!("{}\n{}", custom_css, library_css?);

        let css = reduce_to_colors(&css)?;
        let css = substitute_compiled_colors(&css, &compiled);
        let output = assemble_output(&css, &variables_less, &theme_variables);

        match &options.output_file_path {
            Some(path) => {
                write_output(path, &output).await?;
                info!("Theme generated successfully. OutputFile: {}", path.display());
            }
            None => info!("Theme generated successfully"),
        }
        self.cache.store(digest, output.clone());

        Ok(output)
    }
}

async fn load_sources(options: &ThemeOptions) -> ThemeResult<LoadedSources> {
    let entry = options.library_styles_dir.join(STYLE_DIR).join(STYLE_ENTRY_FILE);
    let mut content = tokio::fs::read_to_string(&entry)
        .await
        .with_io_context(&format!("Failed to read library entry {}", entry.display()))?;
    content.push('\n');

    for style in find_component_styles(&options.library_styles_dir).await? {
        content.push_str(&format!("@import \"{}\";\n", style.to_string_lossy().replace('\\', "/")));
    }

    let custom_styles = match &options.main_less_file {
        Some(path) => {
            let custom = tokio::fs::read_to_string(path)
                .await
                .with_io_context(&format!("Failed to read {}", path.display()))?;
            content.push('\n');
            content.push_str(&custom);
            Some(custom)
        }
        None => None,
    };

    Ok(LoadedSources { content, custom_styles })
}

/// `<library>/*/style/index.less`, sorted
async fn find_component_styles(library_styles_dir: &Path) -> ThemeResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(library_styles_dir)
        .await
        .with_io_context(&format!("Failed to read {}", library_styles_dir.display()))?;

    let mut styles = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let candidate = entry.path().join(STYLE_DIR).join(STYLE_ENTRY_FILE);
        if tokio::fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
            styles.push(candidate);
        }
    }
    styles.sort();
    Ok(styles)
}

/// The configured theme variables that have a color, paired with it, in configured order
fn select_theme_variables<'a>(names: &'a [String], mappings: &'a ColorMap) -> Vec<(&'a str, &'a str)> {
    names
        .iter()
        .filter_map(|name| mappings.get(name).map(|color| (name.as_str(), color.as_str())))
        .collect()
}

/// One probe rule per variable holding its value, and one per palette shade.
///
/// Every probe is put in front of the previous ones, so the shades of the last
/// variable come first and the direct probe of the first variable comes last.
pub fn synthesize_probes(theme_variables: &[(&str, &str)]) -> String {
    let mut probes = String::new();
    for (name, color) in theme_variables {
        probes = format!("{}\n{}", probe_rule(name, color), probes);
    }
    for (name, _) in theme_variables {
        for index in SHADE_INDICES {
            let shade = shade_variable_name(name, index);
            if let Some(expression) = shade_expression(&shade) {
                probes = format!("{}\n{}", probe_rule(&shade, &expression), probes);
            }
        }
    }
    probes
}

fn probe_rule(variable: &str, value: &str) -> String {
    format!(".{} {{ color: {}; }}", variable.trim_start_matches('@'), value)
}

/// Read the literal each probe compiled to.
///
/// Only concrete hex and `rgba` values are taken, keyed by the probe's variable name.
pub fn extract_compiled_colors(css: &str) -> CompiledColorTable {
    let stripped = PATH_COMMENT_RE.replace_all(css, "");
    let mut table = CompiledColorTable::new();
    for captures in PROBE_RULE_RE.captures_iter(&stripped) {
        let value = captures[2].trim();
        if PROBE_VALUE_PREFIXES.iter().any(|prefix| value.starts_with(prefix)) {
            table.insert(format!("@{}", &captures[1]), value.to_string());
        }
    }
    table
}

/// Replace `<literal> *;` by `<variable>;` for every compiled probe, in table order
pub fn substitute_compiled_colors(css: &str, compiled: &CompiledColorTable) -> String {
    let mut css = css.to_string();
    for (name, color) in compiled.iter() {
        let replacement = shade_expression(name).unwrap_or_else(|| name.to_string());
        let pattern = match Regex::new(&format!("{} *;", regex::escape(color))) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!("Cannot substitute {} for {}: {}", color, name, e);
                continue;
            }
        };
        css = pattern
            .replace_all(&css, NoExpand(&format!("{};", replacement)))
            .into_owned();
    }
    css
}

/// Put the variable file in front of the reduced CSS, then lead with one fresh
/// declaration per theme variable, replacing any earlier declaration of it.
fn assemble_output(css: &str, variables_less: &str, theme_variables: &[(&str, &str)]) -> String {
    let mut output = format!("{}\n{}", variables_less, css);
    for (name, color) in theme_variables.iter().rev() {
        match Regex::new(&format!("{}( *):(.*);", regex::escape(name))) {
            Ok(declaration) => output = declaration.replace_all(&output, "").into_owned(),
            Err(e) => warn!("Cannot strip existing declarations of {}: {}", name, e),
        }
        output = format!("{}: {};\n{}\n", name, color, output);
    }
    output.replace(IE_HACK_TOKEN, "")
}

async fn write_output(path: &Path, css: &str) -> ThemeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_io_context(&format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, css)
        .await
        .with_io_context(&format!("Failed to write {}", path.display()))
}

