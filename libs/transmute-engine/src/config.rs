use std::path::PathBuf;

use serde::Deserialize;

use crate::blacklist::Blacklist;
use crate::error::EngineError;

/// Root configuration, parsed from TOML.
///
/// Values are taken as written; [`ConverterConfig::into_settings`] checks them
/// and falls back to the documented default for anything invalid.
#[derive(Debug, Clone, Deserialize)]
pub struct ConverterConfig {
    /// Root of the source plugin's data folder.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Root the converted tree is mirrored into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Material used when an item names none, or an unusable one.
    #[serde(default = "default_material")]
    pub default_material: String,

    /// Prefix display names and lore with `<!i>` so they render upright.
    #[serde(default = "default_disable_italic")]
    pub disable_italic: bool,

    /// Namespace for resource paths written without one.
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// `vanilla` or `custom`.
    #[serde(default = "default_durability")]
    pub durability: String,

    /// Asset paths never copied: `glob` or `namespace:glob`.
    #[serde(default)]
    pub blacklist: Vec<String>,

    /// Extra template documents merged over the bundled ones.
    #[serde(default)]
    pub templates: Vec<PathBuf>,

    #[serde(default)]
    pub paths: SourcePaths,

    #[serde(default)]
    pub asset_rules: Vec<AssetRuleConfig>,
}

/// Locations of each entity kind, relative to `source_dir`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcePaths {
    #[serde(default = "default_items_path")]
    pub items: PathBuf,
    #[serde(default = "default_images_path")]
    pub images: PathBuf,
    #[serde(default = "default_sounds_path")]
    pub sounds: PathBuf,
    #[serde(default = "default_languages_path")]
    pub languages: PathBuf,
    #[serde(default = "default_pack_path")]
    pub pack: PathBuf,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            items: default_items_path(),
            images: default_images_path(),
            sounds: default_sounds_path(),
            languages: default_languages_path(),
            pack: default_pack_path(),
        }
    }
}

/// One asset relocation rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssetRuleConfig {
    pub source_namespace: String,
    pub source_path: String,
    pub target_namespace: String,
    #[serde(default)]
    pub target_path: String,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("source")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("converted")
}
fn default_material() -> String {
    DEFAULT_MATERIAL.into()
}
fn default_disable_italic() -> bool {
    true
}
fn default_namespace() -> String {
    DEFAULT_NAMESPACE.into()
}
fn default_durability() -> String {
    "vanilla".into()
}
fn default_items_path() -> PathBuf {
    PathBuf::from("items")
}
fn default_images_path() -> PathBuf {
    PathBuf::from("glyphs")
}
fn default_sounds_path() -> PathBuf {
    PathBuf::from("sounds.yml")
}
fn default_languages_path() -> PathBuf {
    PathBuf::from("languages.yml")
}
fn default_pack_path() -> PathBuf {
    PathBuf::from("pack")
}

pub const DEFAULT_MATERIAL: &str = "paper";
pub const DEFAULT_NAMESPACE: &str = "minecraft";

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            default_material: default_material(),
            disable_italic: default_disable_italic(),
            default_namespace: default_namespace(),
            durability: default_durability(),
            blacklist: Vec::new(),
            templates: Vec::new(),
            paths: SourcePaths::default(),
            asset_rules: Vec::new(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Check every value, resetting invalid ones to their defaults.
    pub fn into_settings(self) -> Settings {
        let default_material = match normalize_id(&self.default_material) {
            Some(m) => m,
            None => {
                tracing::warn!(value = %self.default_material, fallback = DEFAULT_MATERIAL, "invalid default_material, using fallback");
                DEFAULT_MATERIAL.to_string()
            }
        };

        let default_namespace = if is_namespace(&self.default_namespace) {
            self.default_namespace.clone()
        } else {
            tracing::warn!(value = %self.default_namespace, fallback = DEFAULT_NAMESPACE, "invalid default_namespace, using fallback");
            DEFAULT_NAMESPACE.to_string()
        };

        let durability = match self.durability.to_ascii_lowercase().as_str() {
            "vanilla" => DurabilityStrategy::Vanilla,
            "custom" => DurabilityStrategy::Custom,
            other => {
                tracing::warn!(value = %other, fallback = "vanilla", "unknown durability strategy, using fallback");
                DurabilityStrategy::Vanilla
            }
        };

        let asset_rules = self
            .asset_rules
            .into_iter()
            .filter(|rule| {
                let ok = is_namespace(&rule.source_namespace)
                    && is_namespace(&rule.target_namespace)
                    && !rule.source_path.trim().is_empty();
                if !ok {
                    tracing::warn!(rule = ?rule, "ignoring invalid asset rule");
                }
                ok
            })
            .collect();

        Settings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            default_material,
            disable_italic: self.disable_italic,
            default_namespace,
            durability,
            blacklist: Blacklist::compile(&self.blacklist),
            templates: self.templates,
            paths: self.paths,
            asset_rules,
        }
    }
}

/// How item durability is represented in the target schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurabilityStrategy {
    /// Native max-damage data component.
    Vanilla,
    /// Plugin-tracked durability under `settings`.
    Custom,
}

/// Validated configuration, shared read-only by every conversion.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub default_material: String,
    pub disable_italic: bool,
    pub default_namespace: String,
    pub durability: DurabilityStrategy,
    pub blacklist: Blacklist,
    pub templates: Vec<PathBuf>,
    pub paths: SourcePaths,
    pub asset_rules: Vec<AssetRuleConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        ConverterConfig::default().into_settings()
    }
}

/// Lowercased resource id without the `minecraft:` prefix, if well formed.
pub(crate) fn normalize_id(raw: &str) -> Option<String> {
    let lower = raw.trim().to_ascii_lowercase();
    let id = lower.strip_prefix("minecraft:").unwrap_or(&lower);
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    valid.then(|| id.to_string())
}

pub(crate) fn is_namespace(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
}
