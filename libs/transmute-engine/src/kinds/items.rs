use transmute_api::Section;

use crate::context::{ConversionContext, EntryContext};
use crate::error::EngineError;
use crate::pipeline::Pipeline;
use crate::walk;

use super::{Kind, KindReport};

const EXCLUDE_FLAG: &str = "excludeFromInventory";

/// Every item file below `paths.items` → `<output>/items/<relative>.yml`.
pub(super) fn convert(ctx: &ConversionContext) -> Result<KindReport, EngineError> {
    let settings = &ctx.settings;
    let root = settings.source_dir.join(&settings.paths.items);
    if !root.is_dir() {
        return Ok(KindReport::skipped(Kind::Items));
    }
    let output_root = settings.output_dir.join("items");
    let pipeline = Pipeline::items();
    let mut report = KindReport::new(Kind::Items);

    for file in walk::documents(&root, &ctx.codecs)? {
        let source = match walk::read_document(&file.path, &ctx.codecs) {
            Ok(source) => source,
            Err(e) => {
                tracing::error!(path = %file.path.display(), error = %e, "cannot read item file, skipping");
                report.failed += 1;
                continue;
            }
        };
        let prefix = file.prefix();
        let target = walk::mirrored(&output_root, &file.relative, ctx.codecs.output_extension());
        let written = walk::write_scoped(&target, ctx.codecs.output(), |document| {
            convert_document(ctx, &pipeline, &prefix, &source, document)
        });
        match written {
            Ok(stats) => {
                report.files += 1;
                report.entries += stats.entries;
                report.failed += stats.failed;
                tracing::debug!(path = %target.display(), entries = stats.entries, "item file converted");
            }
            Err(e) => {
                tracing::error!(path = %target.display(), error = %e, "cannot write item file");
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

#[derive(Debug, Default)]
pub(crate) struct DocumentStats {
    pub entries: usize,
    pub failed: usize,
}

/// Convert every entry of one source file into `document`, then add the
/// file's category.
pub(crate) fn convert_document(
    ctx: &ConversionContext,
    pipeline: &Pipeline,
    prefix: &str,
    source: &Section,
    document: &mut Section,
) -> DocumentStats {
    let mut stats = DocumentStats::default();
    let mut listed: Vec<String> = Vec::new();

    for (key, node) in source.iter() {
        let id = format!("{prefix}:{key}");
        let Some(entry) = node.as_section() else {
            tracing::warn!(id = %id, "item entry is not a map, skipping");
            stats.failed += 1;
            continue;
        };
        let mut target = Section::new();
        stats.failed += pipeline.run(&EntryContext::new(&id, ctx), entry, &mut target);
        document.section_mut("items").insert(id.clone(), target);
        stats.entries += 1;
        if !entry.bool_or(EXCLUDE_FLAG, false) {
            listed.push(id);
        }
    }

    if let Some(icon) = listed.first().cloned() {
        let mut category = Section::new();
        category.insert("name", prefix);
        category.insert("icon", icon);
        category.insert("list", listed);
        document
            .section_mut("categories")
            .insert(format!("{prefix}:{prefix}"), category);
    }
    stats
}
