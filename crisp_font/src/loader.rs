//! Fetches and installs metrics + atlas data for one or more font ids.
//! Transport is abstracted behind `FontAssetSource` so the orchestration
//! logic below never knows whether bytes came from disk or a network
//! client. Concurrency across ids uses plain scoped OS threads — the corpus
//! never reaches for an async runtime for this kind of bounded, blocking
//! fan-out.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::atlas::ImageSource;
use crate::codec;
use crate::error::{LoadError, ReconstructError};
use crate::identity::FontIdentity;
use crate::image_codec::decode_image;
use crate::reconstruct::AtlasReconstructor;
use crate::store::{AtlasDataStore, FontMetricsStore};

/// Default directory `FilesystemSource` reads from when none is configured.
pub const DEFAULT_FONT_ASSETS_DIR: &str = "font-assets";

/// Transport for fetching a font's two artifacts. Implementations may read
/// from disk, a bundled archive, or a network client; the loader core never
/// cares which.
pub trait FontAssetSource: Sync {
    fn fetch_metrics(&self, id: &FontIdentity) -> Result<String, std::io::Error>;
    fn fetch_atlas_image(&self, id: &FontIdentity) -> Result<Vec<u8>, std::io::Error>;
}

/// Reads `metrics-<id>.json` and `atlas-<id>.png`/`.qoi` from a directory on
/// disk, the concrete collaborator used by the CLI and by tests.
pub struct FilesystemSource {
    root: PathBuf,
}

impl FilesystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn default_dir() -> Self {
        Self::new(DEFAULT_FONT_ASSETS_DIR)
    }

    fn metrics_path(&self, id: &FontIdentity) -> PathBuf {
        self.root.join(format!("metrics-{}.json", id.id_string()))
    }

    fn atlas_path(&self, id: &FontIdentity) -> Option<PathBuf> {
        for ext in ["png", "qoi"] {
            let candidate = self.root.join(format!("atlas-{}.{ext}", id.id_string()));
            if candidate.exists() {
                return Some(candidate);
            }
        }
        None
    }
}

impl FontAssetSource for FilesystemSource {
    fn fetch_metrics(&self, id: &FontIdentity) -> Result<String, std::io::Error> {
        std::fs::read_to_string(self.metrics_path(id))
    }

    fn fetch_atlas_image(&self, id: &FontIdentity) -> Result<Vec<u8>, std::io::Error> {
        let path = self.atlas_path(id).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no atlas file for {}", id.id_string()))
        })?;
        std::fs::read(path)
    }
}

/// Progress callback shape: `(loaded_count, total_count)`.
pub type LoadProgress<'a> = dyn Fn(usize, usize) + Sync + 'a;

/// Loads one font's metrics and, if available, its atlas, installing both
/// into the given stores. Metrics are always fetched and installed first;
/// a metrics failure short-circuits before any atlas fetch is attempted.
pub fn load_font(
    id: &FontIdentity,
    source: &dyn FontAssetSource,
    metrics_store: &FontMetricsStore,
    atlas_store: &AtlasDataStore,
) -> Result<(), LoadError> {
    let raw_metrics = source.fetch_metrics(id).map_err(|e| LoadError::FetchMetrics {
        id: id.clone(),
        source: e,
    })?;

    let raw_json: serde_json::Value = serde_json::from_str(&raw_metrics).map_err(|e| {
        LoadError::InvalidMetrics(id.clone(), crate::error::CodecError::Malformed(e))
    })?;
    let metrics_value = raw_json.get("metrics").unwrap_or(&raw_json);
    let metrics = codec::expand(metrics_value).map_err(|e| LoadError::InvalidMetrics(id.clone(), e))?;

    metrics_store.insert(id.clone(), metrics);

    let atlas_bytes = match source.fetch_atlas_image(id) {
        Ok(bytes) => bytes,
        Err(_) => return Ok(()),
    };

    install_atlas(id, &atlas_bytes, metrics_store, atlas_store)
}

/// Decodes `atlas_bytes` and reconstructs it into `atlas_store`, looking its
/// font's metrics up in `metrics_store` rather than trusting an
/// already-resolved `FontMetrics` from the caller. `load_font` calls this
/// only after installing metrics itself, but a caller that fetches atlas and
/// metrics through independent channels (e.g. two separate network fetches
/// racing each other) can call this directly. If the atlas settles first,
/// metrics lookup fails and the atlas is discarded rather than reconstructed
/// against nothing.
pub fn install_atlas(
    id: &FontIdentity,
    atlas_bytes: &[u8],
    metrics_store: &FontMetricsStore,
    atlas_store: &AtlasDataStore,
) -> Result<(), LoadError> {
    let metrics = metrics_store
        .get(id)
        .ok_or_else(|| LoadError::Reconstruct(ReconstructError::MissingMetricsForAtlas(id.clone())))?;

    let decoded = decode_image(atlas_bytes).map_err(|e| LoadError::DecodeImage(id.clone(), e.to_string()))?;
    let wide_atlas = ImageSource::Decoded {
        width: decoded.width,
        height: decoded.height,
        pixels: decoded.pixels().to_vec(),
    }
    .into_atlas_image();

    let atlas_data = AtlasReconstructor::reconstruct(id, &metrics, &wide_atlas)?;
    atlas_store.insert(id.clone(), atlas_data);

    Ok(())
}

/// Loads every id in `ids` concurrently, one scoped thread each, reporting
/// progress as each settles. Per-font failures are logged and never abort
/// the batch — `load_fonts` always returns, with the store left in a
/// well-defined partial state for any font that degraded.
pub fn load_fonts(
    ids: &[FontIdentity],
    source: &(dyn FontAssetSource + Sync),
    metrics_store: &FontMetricsStore,
    atlas_store: &AtlasDataStore,
    on_progress: Option<&LoadProgress>,
) {
    let total = ids.len();
    let loaded = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for id in ids {
            scope.spawn(|| {
                if let Err(err) = load_font(id, source, metrics_store, atlas_store) {
                    crisp_dbg!("failed to load font {}: {}", id.id_string(), err);
                }
                let done = loaded.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(cb) = on_progress {
                    cb(done, total);
                }
            });
        }
    });
}

/// Discovers a manifest file (`{"fonts": [...]}` or a bare array) at `path`
/// and parses it into a list of id strings. Kept here, beside the loader it
/// feeds, rather than as a standalone parser module.
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Vec<String>, std::io::Error> {
    let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let list = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut obj) => match obj.remove("fonts") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "manifest missing `fonts` array")),
        },
        _ => return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "manifest must be an array or object")),
    };

    list.into_iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidData, "manifest entry is not a string"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::character_set;
    use crate::codec::minify;
    use crate::identity::{Style, Weight};
    use crate::metrics::{CharacterMetrics, FontBaselines, FontMetrics, FontMetricsBuilder};
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn complete_metrics() -> FontMetrics {
        let mut b = FontMetricsBuilder::new();
        b.set_baselines(FontBaselines {
            font_bounding_box_ascent: 14.0,
            font_bounding_box_descent: 4.0,
            hanging_baseline: 12.0,
            alphabetic_baseline: 0.0,
            ideographic_baseline: -2.0,
        });
        for &c in character_set() {
            b.set_character_metrics(
                c,
                CharacterMetrics {
                    width: 5.0,
                    actual_bounding_box_left: 0.5,
                    actual_bounding_box_right: 4.5,
                    actual_bounding_box_ascent: 9.0,
                    actual_bounding_box_descent: 1.0,
                },
            );
        }
        b.build()
    }

    struct FakeSource {
        metrics: HashMap<String, String>,
    }

    impl FontAssetSource for FakeSource {
        fn fetch_metrics(&self, id: &FontIdentity) -> Result<String, std::io::Error> {
            self.metrics
                .get(&id.id_string())
                .cloned()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no metrics"))
        }

        fn fetch_atlas_image(&self, _id: &FontIdentity) -> Result<Vec<u8>, std::io::Error> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no atlas in this fake"))
        }
    }

    #[test]
    fn load_font_installs_metrics_without_atlas() {
        let id = FontIdentity::new(1.0, "Arial", Style::Normal, Weight::Normal, 14.0);
        let minified = minify(&complete_metrics()).unwrap();
        let blob = serde_json::json!({ "id": id.id_string(), "metrics": minified });

        let mut metrics_map = HashMap::new();
        metrics_map.insert(id.id_string(), blob.to_string());
        let source = FakeSource { metrics: metrics_map };

        let metrics_store = FontMetricsStore::new();
        let atlas_store = AtlasDataStore::new();

        load_font(&id, &source, &metrics_store, &atlas_store).unwrap();

        assert!(metrics_store.contains(&id));
        assert!(!atlas_store.contains(&id));
    }

    #[test]
    fn load_font_surfaces_fetch_metrics_failure() {
        let id = FontIdentity::new(1.0, "Missing", Style::Normal, Weight::Normal, 14.0);
        let source = FakeSource { metrics: HashMap::new() };
        let metrics_store = FontMetricsStore::new();
        let atlas_store = AtlasDataStore::new();

        let err = load_font(&id, &source, &metrics_store, &atlas_store).unwrap_err();
        assert!(matches!(err, LoadError::FetchMetrics { .. }));
        assert!(!metrics_store.contains(&id));
    }

    #[test]
    fn load_fonts_never_aborts_the_batch_on_a_single_failure() {
        let ok_id = FontIdentity::new(1.0, "Arial", Style::Normal, Weight::Normal, 14.0);
        let missing_id = FontIdentity::new(1.0, "Missing", Style::Normal, Weight::Normal, 14.0);

        let minified = minify(&complete_metrics()).unwrap();
        let blob = serde_json::json!({ "id": ok_id.id_string(), "metrics": minified });
        let mut metrics_map = HashMap::new();
        metrics_map.insert(ok_id.id_string(), blob.to_string());
        let source = FakeSource { metrics: metrics_map };

        let metrics_store = FontMetricsStore::new();
        let atlas_store = AtlasDataStore::new();
        let progress_calls = Mutex::new(Vec::new());

        load_fonts(
            &[ok_id.clone(), missing_id.clone()],
            &source,
            &metrics_store,
            &atlas_store,
            Some(&|done, total| progress_calls.lock().unwrap().push((done, total))),
        );

        assert!(metrics_store.contains(&ok_id));
        assert!(!metrics_store.contains(&missing_id));
        assert_eq!(progress_calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn install_atlas_discards_the_atlas_when_metrics_are_missing() {
        let id = FontIdentity::new(1.0, "Orphan", Style::Normal, Weight::Normal, 14.0);
        let metrics_store = FontMetricsStore::new();
        let atlas_store = AtlasDataStore::new();

        let wide = crate::atlas::AtlasImage::new(4, 4, vec![255u8; 4 * 4 * 4]);
        let png_bytes = crate::image_codec::encode_png(&wide).unwrap();

        let err = install_atlas(&id, &png_bytes, &metrics_store, &atlas_store).unwrap_err();
        assert!(matches!(err, LoadError::Reconstruct(ReconstructError::MissingMetricsForAtlas(_))));
        assert!(!atlas_store.contains(&id));
    }

    #[test]
    fn install_atlas_succeeds_once_metrics_are_present() {
        let id = FontIdentity::new(1.0, "Arial", Style::Normal, Weight::Normal, 14.0);
        let metrics_store = FontMetricsStore::new();
        let atlas_store = AtlasDataStore::new();
        metrics_store.insert(id.clone(), complete_metrics());

        let columns = (character_set().len() as f64).sqrt().ceil() as u32;
        let rows = (character_set().len() as u32 + columns - 1) / columns;
        let cell = 10u32;
        let wide = crate::atlas::AtlasImage::new(
            columns * cell,
            rows * cell,
            vec![255u8; (columns * cell) as usize * (rows * cell) as usize * 4],
        );
        let png_bytes = crate::image_codec::encode_png(&wide).unwrap();

        install_atlas(&id, &png_bytes, &metrics_store, &atlas_store).unwrap();
        assert!(atlas_store.contains(&id));
    }

    #[test]
    fn manifest_accepts_bare_array_and_wrapped_object() {
        let dir = std::env::temp_dir().join(format!("crisp_font_manifest_test_{:?}", std::thread::current().id()));
        std::fs::create_dir_all(&dir).unwrap();

        let bare_path = dir.join("bare.json");
        std::fs::write(&bare_path, r#"["density-1-0-Arial-style-normal-weight-normal-size-14-0"]"#).unwrap();
        let bare = read_manifest(&bare_path).unwrap();
        assert_eq!(bare.len(), 1);

        let wrapped_path = dir.join("wrapped.json");
        std::fs::write(&wrapped_path, r#"{"fonts": ["a", "b"]}"#).unwrap();
        let wrapped = read_manifest(&wrapped_path).unwrap();
        assert_eq!(wrapped, vec!["a".to_string(), "b".to_string()]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
