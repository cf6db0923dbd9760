use std::path::Path;

use transmute_api::DocumentCodec;
use transmute_format_json::JsonCodec;
use transmute_format_yaml::YamlCodec;

use crate::config::Settings;
use crate::error::EngineError;
use crate::registry::ImageRegistry;
use crate::remap::PathRemapper;
use crate::template::TemplateLibrary;

/// Document codecs known to the engine, picked by file extension.
/// Output is always YAML.
pub struct Codecs {
    yaml: YamlCodec,
    json: JsonCodec,
}

impl Default for Codecs {
    fn default() -> Self {
        Self {
            yaml: YamlCodec,
            json: JsonCodec,
        }
    }
}

impl Codecs {
    pub fn for_path(&self, path: &Path) -> Option<&dyn DocumentCodec> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let all: [&dyn DocumentCodec; 2] = [&self.yaml, &self.json];
        all.into_iter().find(|c| c.extensions().contains(&ext.as_str()))
    }

    pub fn output(&self) -> &dyn DocumentCodec {
        &self.yaml
    }

    pub fn output_extension(&self) -> &'static str {
        "yml"
    }
}

/// Everything one conversion run shares: validated settings, templates,
/// relocation rules and the image registry.
///
/// Built once and handed to every converter behind an `Arc`.
pub struct ConversionContext {
    pub settings: Settings,
    pub templates: TemplateLibrary,
    pub remapper: PathRemapper,
    pub images: ImageRegistry,
    pub codecs: Codecs,
}

impl std::fmt::Debug for ConversionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionContext")
            .field("settings", &self.settings)
            .field("templates", &self.templates.len())
            .field("rules", &self.remapper.len())
            .field("images", &self.images.len())
            .finish()
    }
}

impl ConversionContext {
    /// Load bundled templates, then user template files over them.
    /// A user file that cannot be read is skipped with an error log.
    pub fn new(settings: Settings) -> Result<Self, EngineError> {
        let codecs = Codecs::default();
        let mut templates = TemplateLibrary::bundled(codecs.output())
            .map_err(|e| EngineError::from(e).with_context("bundled templates"))?;

        for path in &settings.templates {
            let Some(codec) = codecs.for_path(path) else {
                tracing::warn!(path = %path.display(), "unsupported template file type, skipping");
                continue;
            };
            match templates.load_file(path, codec) {
                Ok(count) => tracing::info!(path = %path.display(), count, "loaded templates"),
                Err(e) => tracing::error!(path = %path.display(), error = %e, "failed to load templates"),
            }
        }

        let remapper = PathRemapper::from_rules(&settings.asset_rules);

        Ok(Self {
            settings,
            templates,
            remapper,
            images: ImageRegistry::new(),
            codecs,
        })
    }

    /// `"item/sword.png"` → `"<default ns>:item/sword"`; an explicit namespace
    /// is kept.
    pub fn resource_id(&self, raw: &str) -> String {
        namespaced(raw, &self.settings.default_namespace)
    }
}

/// Entry being converted, passed to every pipeline step.
#[derive(Clone, Copy)]
pub struct EntryContext<'a> {
    /// Fully qualified id, `"<file>:<key>"`.
    pub id: &'a str,
    pub ctx: &'a ConversionContext,
}

impl<'a> EntryContext<'a> {
    pub fn new(id: &'a str, ctx: &'a ConversionContext) -> Self {
        Self { id, ctx }
    }

    pub fn settings(&self) -> &'a Settings {
        &self.ctx.settings
    }
}

pub fn namespaced(raw: &str, default_namespace: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('/');
    let trimmed = trimmed
        .strip_suffix(".png")
        .or_else(|| trimmed.strip_suffix(".json"))
        .or_else(|| trimmed.strip_suffix(".ogg"))
        .unwrap_or(trimmed);
    if trimmed.contains(':') {
        trimmed.to_string()
    } else {
        format!("{default_namespace}:{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced() {
        assert_eq!(namespaced("item/sword.png", "minecraft"), "minecraft:item/sword");
        assert_eq!(namespaced("pack:item/sword", "minecraft"), "pack:item/sword");
        assert_eq!(namespaced("/block/ore.json", "x"), "x:block/ore");
    }

    #[test]
    fn test_codec_by_extension() {
        let codecs = Codecs::default();
        assert!(codecs.for_path(Path::new("a/b.YML")).is_some());
        assert!(codecs.for_path(Path::new("a/b.json")).is_some());
        assert!(codecs.for_path(Path::new("a/b.txt")).is_none());
        assert!(codecs.for_path(Path::new("a/noext")).is_none());
    }

    #[test]
    fn test_context_has_bundled_templates() {
        let ctx = ConversionContext::new(Settings::default()).unwrap();
        assert!(ctx.templates.contains("default:model/generated"));
        assert!(ctx.images.is_empty());
    }
}
