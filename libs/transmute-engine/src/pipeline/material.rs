use transmute_api::{ConvertError, Section};

use crate::config::normalize_id;
use crate::context::EntryContext;

use super::ConvertStep;

/// `material` → `material`. Always written: the configured default stands in
/// for a missing or unusable value.
pub struct MaterialStep;

impl ConvertStep for MaterialStep {
    fn name(&self) -> &'static str {
        "material"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        let fallback = &cx.settings().default_material;
        let raw = source.string_or("material", "");
        let material = if raw.trim().is_empty() {
            fallback.clone()
        } else {
            normalize_id(&raw).unwrap_or_else(|| {
                tracing::warn!(id = %cx.id, material = %raw, fallback = %fallback, "unknown material, using default");
                fallback.clone()
            })
        };
        target.set("material", material);
        Ok(())
    }
}
