use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use crate::context::ConversionContext;
use crate::error::EngineError;

use super::{Kind, KindReport};

const EXTERNAL_PACKS: &str = "external_packs";
const ASSETS: &str = "assets";

/// Resource pack relocation: `paths.pack` → `<output>/resourcepack/`.
///
/// Sources are copied in order external pack directories, zip archives, then
/// the pack itself, so the pack's own files overwrite bundled ones.
pub(super) fn convert(ctx: &ConversionContext) -> Result<KindReport, EngineError> {
    let settings = &ctx.settings;
    let pack = settings.source_dir.join(&settings.paths.pack);
    if !pack.is_dir() {
        return Ok(KindReport::skipped(Kind::Assets));
    }
    let output_root = settings.output_dir.join("resourcepack");
    let mut report = KindReport::new(Kind::Assets);

    let external = pack.join(EXTERNAL_PACKS);
    let mut roots = sorted_children(&external, |p| p.is_dir())?;

    // Extracted archives live until the end of the pass.
    let mut extracted: Vec<TempDir> = Vec::new();
    let mut archives = sorted_children(&pack, is_zip)?;
    archives.extend(sorted_children(&external, is_zip)?);
    for archive in archives {
        match extract(&archive) {
            Ok(dir) => {
                roots.push(dir.path().to_path_buf());
                extracted.push(dir);
            }
            Err(e) => {
                tracing::error!(archive = %archive.display(), error = %e, "cannot extract archive, skipping");
                report.failed += 1;
            }
        }
    }
    roots.push(pack.clone());

    for root in &roots {
        let is_main = *root == pack;
        copy_tree(ctx, root, &output_root, is_main, &mut report);
    }
    Ok(report)
}

fn sorted_children(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>, EngineError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if keep(&path) {
            children.push(path);
        }
    }
    children.sort();
    Ok(children)
}

fn is_zip(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

fn extract(archive: &Path) -> Result<TempDir, EngineError> {
    let dir = TempDir::new()?;
    let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
    zip.extract(dir.path())?;
    tracing::debug!(archive = %archive.display(), files = zip.len(), "archive extracted");
    Ok(dir)
}

/// Where a pack-relative file goes, or why it doesn't.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Placement {
    Copy(PathBuf),
    Blocked(String),
}

/// Map one pack-relative path (`/`-separated) onto the output tree.
pub(crate) fn place(ctx: &ConversionContext, relative: &str) -> Placement {
    let blacklist = &ctx.settings.blacklist;
    let parts: Vec<&str> = relative.splitn(3, '/').collect();
    if let [ASSETS, namespace, path] = parts[..] {
        if let Some(pattern) = blacklist.find(Some(namespace), path) {
            return Placement::Blocked(pattern.to_string());
        }
        let moved = ctx.remapper.relocate(namespace, path);
        if let Some(pattern) = blacklist.find(Some(&moved.namespace), &moved.path) {
            return Placement::Blocked(pattern.to_string());
        }
        return Placement::Copy(
            Path::new(ASSETS)
                .join(&moved.namespace)
                .join(moved.path),
        );
    }
    match blacklist.find(None, relative) {
        Some(pattern) => Placement::Blocked(pattern.to_string()),
        None => Placement::Copy(PathBuf::from(relative)),
    }
}

fn copy_tree(ctx: &ConversionContext, root: &Path, output_root: &Path, is_main: bool, report: &mut KindReport) {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(is_main && e.depth() == 1 && (e.file_name() == EXTERNAL_PACKS || is_zip(e.path()))));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::error!(root = %root.display(), error = %e, "cannot read pack entry, skipping");
                report.failed += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(relative) = slash_path(entry.path(), root) else {
            continue;
        };
        match place(ctx, &relative) {
            Placement::Blocked(pattern) => {
                tracing::debug!(path = %relative, pattern = %pattern, "blacklisted, not copied");
            }
            Placement::Copy(target) => {
                let destination = output_root.join(&target);
                match copy_file(entry.path(), &destination) {
                    Ok(()) => report.files += 1,
                    Err(e) => {
                        tracing::error!(path = %relative, error = %e, "cannot copy asset");
                        report.failed += 1;
                    }
                }
            }
        }
    }
}

/// `path` relative to `root`, joined with `/`.
fn slash_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

fn copy_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AssetRuleConfig, ConverterConfig};

    fn context(blacklist: &[&str]) -> ConversionContext {
        let config = ConverterConfig {
            blacklist: blacklist.iter().map(|s| s.to_string()).collect(),
            asset_rules: vec![AssetRuleConfig {
                source_namespace: "oldpack".into(),
                source_path: "textures/item".into(),
                target_namespace: "newpack".into(),
                target_path: "item".into(),
            }],
            ..ConverterConfig::default()
        };
        ConversionContext::new(config.into_settings()).unwrap()
    }

    #[test]
    fn test_place_relocates_namespaced_assets() {
        let ctx = context(&[]);
        assert_eq!(
            place(&ctx, "assets/oldpack/textures/item/ruby.png"),
            Placement::Copy(PathBuf::from("assets/newpack/item/ruby.png"))
        );
        assert_eq!(
            place(&ctx, "assets/oldpack/sounds/a.ogg"),
            Placement::Copy(PathBuf::from("assets/oldpack/sounds/a.ogg"))
        );
        assert_eq!(place(&ctx, "pack.mcmeta"), Placement::Copy(PathBuf::from("pack.mcmeta")));
    }

    #[test]
    fn test_place_blacklist() {
        let ctx = context(&["*.psd", "oldpack:textures/secret/*", "pack.png"]);
        assert!(matches!(place(&ctx, "assets/x/textures/raw/a.psd"), Placement::Blocked(_)));
        assert!(matches!(place(&ctx, "assets/oldpack/textures/secret/b.png"), Placement::Blocked(_)));
        assert!(matches!(place(&ctx, "pack.png"), Placement::Blocked(_)));
        assert!(matches!(place(&ctx, "assets/other/textures/secret/b.png"), Placement::Copy(_)));
    }

    #[test]
    fn test_slash_path() {
        let root = Path::new("/pack");
        assert_eq!(slash_path(Path::new("/pack/assets/a/b.png"), root).as_deref(), Some("assets/a/b.png"));
        assert_eq!(slash_path(root, root), None);
    }
}
