use transmute_api::{ConvertError, Section};

use crate::context::ConversionContext;
use crate::error::EngineError;
use crate::registry::ImageEntry;
use crate::walk;

use super::{Kind, KindReport};

const DEFAULT_HEIGHT: i64 = 8;
const DEFAULT_ASCENT: i64 = 8;
/// First code point handed out to glyphs without an explicit `char`.
const PRIVATE_USE_START: u32 = 0xE000;
const PRIVATE_USE_END: u32 = 0xF8FF;

/// Glyph files below `paths.images` → `<output>/images/<relative>.yml`,
/// registering every converted glyph in the shared image registry.
pub(super) fn convert(ctx: &ConversionContext) -> Result<KindReport, EngineError> {
    let settings = &ctx.settings;
    let root = settings.source_dir.join(&settings.paths.images);
    if !root.is_dir() {
        return Ok(KindReport::skipped(Kind::Images));
    }
    let output_root = settings.output_dir.join("images");
    let mut report = KindReport::new(Kind::Images);
    let mut chars = CharAllocator::new();

    for file in walk::documents(&root, &ctx.codecs)? {
        let source = match walk::read_document(&file.path, &ctx.codecs) {
            Ok(source) => source,
            Err(e) => {
                tracing::error!(path = %file.path.display(), error = %e, "cannot read glyph file, skipping");
                report.failed += 1;
                continue;
            }
        };
        let prefix = file.prefix();
        let target = walk::mirrored(&output_root, &file.relative, ctx.codecs.output_extension());
        let written = walk::write_scoped(&target, ctx.codecs.output(), |document| {
            let mut converted = 0;
            for (key, node) in source.iter() {
                let id = format!("{prefix}:{key}");
                let result = node
                    .as_section()
                    .ok_or_else(|| ConvertError::malformed("glyph entry is not a map"))
                    .and_then(|glyph| convert_glyph(ctx, &mut chars, key, &id, glyph, document));
                match result {
                    Ok(()) => converted += 1,
                    Err(e) => {
                        tracing::warn!(id = %id, error = %e, "glyph skipped");
                        report.failed += 1;
                    }
                }
            }
            converted
        });
        match written {
            Ok(converted) => {
                report.files += 1;
                report.entries += converted;
            }
            Err(e) => {
                tracing::error!(path = %target.display(), error = %e, "cannot write glyph file");
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

fn convert_glyph(
    ctx: &ConversionContext,
    chars: &mut CharAllocator,
    key: &str,
    id: &str,
    glyph: &Section,
    document: &mut Section,
) -> Result<(), ConvertError> {
    let texture = glyph.str_or("texture", glyph.str_or("file", ""));
    if texture.is_empty() {
        return Err(ConvertError::malformed("glyph has no texture"));
    }
    let (rows, columns, cells) = grid(glyph.i64_or("rows", 1), glyph.i64_or("columns", 1))?;
    let height = glyph.i64_or("height", DEFAULT_HEIGHT);
    if height <= 0 {
        return Err(ConvertError::malformed(format!("glyph height {height} must be positive")));
    }

    let first = match glyph.str_or("char", "").chars().next() {
        Some(c) => c,
        None => chars.next(cells)?,
    };

    let mut image = Section::new();
    image.insert("file", format!("{}.png", ctx.resource_id(texture)));
    image.insert("height", height);
    image.set_unless("ascent", glyph.i64_or("ascent", DEFAULT_ASCENT), DEFAULT_ASCENT);
    image.insert("char", first.to_string());
    if cells > 1 {
        image.insert("grid", format!("{rows},{columns}"));
    }
    document.section_mut("images").insert(id, image);

    let placeholders = glyph.string_list("placeholders");
    if !placeholders.is_empty() {
        let mut emoji = Section::new();
        emoji.insert("image", id);
        emoji.insert("keywords", placeholders);
        document.section_mut("emoji").insert(id, emoji);
    }

    ctx.images.register(
        key,
        ImageEntry {
            key: id.to_string(),
            rows,
            columns,
        },
    );
    Ok(())
}

/// `(rows, columns, rows * columns)`; both sides at least 1 and the product
/// within `u32`.
fn grid(rows: i64, columns: i64) -> Result<(u32, u32, u32), ConvertError> {
    let bad = || ConvertError::malformed(format!("bad glyph grid {rows}x{columns}"));
    let r = u32::try_from(rows).ok().filter(|r| *r >= 1).ok_or_else(bad)?;
    let c = u32::try_from(columns).ok().filter(|c| *c >= 1).ok_or_else(bad)?;
    let cells = r.checked_mul(c).ok_or_else(bad)?;
    Ok((r, c, cells))
}

/// Sequential private-use code points, one block per glyph.
struct CharAllocator {
    next: u32,
}

impl CharAllocator {
    fn new() -> Self {
        Self {
            next: PRIVATE_USE_START,
        }
    }

    fn next(&mut self, count: u32) -> Result<char, ConvertError> {
        let start = self.next;
        let end = start
            .checked_add(count)
            .filter(|end| *end <= PRIVATE_USE_END + 1)
            .ok_or_else(|| ConvertError::unsupported("private use area exhausted"))?;
        self.next = end;
        char::from_u32(start).ok_or_else(|| ConvertError::logic("invalid private use code point"))
    }
}
