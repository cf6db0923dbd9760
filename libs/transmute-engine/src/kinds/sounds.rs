use transmute_api::{ConvertError, Node, Section, Shape};

use crate::context::ConversionContext;
use crate::error::EngineError;
use crate::walk;

use super::{Kind, KindReport};

/// `paths.sounds` → `<output>/sounds.yml`.
///
/// Accepts `sounds:` as a list of maps carrying `id`, as a map keyed by id,
/// or a document whose top level is that map.
pub(super) fn convert(ctx: &ConversionContext) -> Result<KindReport, EngineError> {
    let settings = &ctx.settings;
    let path = settings.source_dir.join(&settings.paths.sounds);
    if !path.is_file() {
        return Ok(KindReport::skipped(Kind::Sounds));
    }
    let source = walk::read_document(&path, &ctx.codecs)?;
    let mut report = KindReport::new(Kind::Sounds);

    let target = settings
        .output_dir
        .join("sounds")
        .with_extension(ctx.codecs.output_extension());
    walk::write_scoped(&target, ctx.codecs.output(), |document| {
        convert_document(ctx, &source, document, &mut report)
    })?;
    report.files = 1;
    Ok(report)
}

fn convert_document(ctx: &ConversionContext, source: &Section, document: &mut Section, report: &mut KindReport) {
    let entries: Vec<(String, &Section)> = match source.shape("sounds") {
        Shape::Sequence(items) => items
            .iter()
            .filter_map(|item| {
                let Some(entry) = item.as_section() else {
                    tracing::warn!("sound entry is not a map, skipping");
                    report.failed += 1;
                    return None;
                };
                match entry.str_or("id", "") {
                    "" => {
                        tracing::warn!("sound entry without id, skipping");
                        report.failed += 1;
                        None
                    }
                    id => Some((id.to_string(), entry)),
                }
            })
            .collect(),
        Shape::Mapping(map) => keyed(map, report),
        Shape::Absent => keyed(source, report),
        Shape::Scalar(_) => {
            tracing::warn!("'sounds' must be a list or a map, nothing converted");
            report.failed += 1;
            return;
        }
    };

    for (id, entry) in entries {
        let key = namespaced_sound(&id, &ctx.settings.default_namespace);
        match sound_event(ctx, entry) {
            Ok(event) => {
                document.section_mut("sounds").insert(key, event);
                report.entries += 1;
            }
            Err(e) => {
                tracing::warn!(sound = %key, error = %e, "sound skipped");
                report.failed += 1;
            }
        }
    }
}

fn keyed<'a>(map: &'a Section, report: &mut KindReport) -> Vec<(String, &'a Section)> {
    map.iter()
        .filter_map(|(id, node)| match node.as_section() {
            Some(entry) => Some((id.to_string(), entry)),
            None => {
                tracing::warn!(sound = %id, "sound entry is not a map, skipping");
                report.failed += 1;
                None
            }
        })
        .collect()
}

fn namespaced_sound(id: &str, namespace: &str) -> String {
    let id = id.trim().to_ascii_lowercase();
    if id.contains(':') { id } else { format!("{namespace}:{id}") }
}

/// One sound event: a list of variants plus optional subtitle.
fn sound_event(ctx: &ConversionContext, entry: &Section) -> Result<Section, ConvertError> {
    let files: Vec<String> = match entry.shape("sounds") {
        Shape::Absent => entry.string_list("sound"),
        _ => entry.string_list("sounds"),
    };
    if files.is_empty() {
        return Err(ConvertError::malformed("no sound files"));
    }
    let volume = entry.f64_or("volume", 1.0);
    let pitch = entry.f64_or("pitch", 1.0);
    let stream = entry.bool_or("stream", false);

    let variants: Vec<Node> = files
        .iter()
        .map(|file| {
            let mut variant = Section::new();
            variant.insert("name", ctx.resource_id(file));
            variant.set_unless("volume", volume, 1.0);
            variant.set_unless("pitch", pitch, 1.0);
            variant.set_unless("stream", stream, false);
            Node::Map(variant)
        })
        .collect();

    let mut event = Section::new();
    event.set_unless("replace", entry.bool_or("replace", false), false);
    event.insert("sounds", variants);
    let subtitle = entry.str_or("subtitle", "");
    if !subtitle.is_empty() {
        event.insert("subtitle", subtitle);
    }
    Ok(event)
}
