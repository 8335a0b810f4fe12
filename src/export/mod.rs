//! # PNG Export
//!
//! Export works on a snapshot taken at click time, so later edits never leak
//! into an export in flight:
//!
//! ```text
//! EditorState ──capture──▶ ExportSnapshot ──ImageResolver──▶ background image
//!                                 │                                │
//!                                 └────────── spawn_blocking ◀─────┘
//!                                        SoftwareRasterizer + PNG
//! ```
//!
//! The canvas is rendered at `export_scale` (the smallest factor that meets
//! both nominal dimensions), so the PNG may be a few pixels larger than the
//! layout's nominal size on one axis.

mod resolve;

pub use resolve::{ImageResolver, RemoteImages};

use std::sync::Arc;

use image::DynamicImage;
use serde::Serialize;

use crate::editor::EditorState;
use crate::error::TripcardError;
use crate::model::Dimensions;
use crate::render::raster::{self, Rasterizer, SoftwareRasterizer};
use crate::render::{self, RenderedCanvas};

/// Everything needed to produce a PNG, detached from the editor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub layout_id: String,
    pub title: String,
    /// Nominal output size of the layout.
    pub dimensions: Dimensions,
    /// Display → export factor.
    pub scale: f64,
    /// Canvas rendered at export scale, without selection decoration.
    pub canvas: RenderedCanvas,
}

impl ExportSnapshot {
    pub fn capture(state: &EditorState) -> Self {
        Self {
            layout_id: state.layout.id.clone(),
            title: state.content.title.clone(),
            dimensions: state.layout.dimensions,
            scale: state.layout.export_scale(),
            canvas: render::render_export(state),
        }
    }

    pub fn filename(&self) -> String {
        export_filename(&self.title, &self.layout_id, self.dimensions)
    }

    /// Pixel size of the PNG this snapshot produces.
    pub fn pixel_size(&self) -> (u32, u32) {
        self.canvas.pixel_size()
    }
}

/// Lowercase the title and replace each whitespace run with `-`.
pub fn sanitize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut in_space = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
        } else if ch.is_control() || matches!(ch, '"' | '/' | '\\') {
            continue;
        } else {
            out.extend(ch.to_lowercase());
            in_space = false;
        }
    }
    out
}

/// `<sanitized title>-<layout id>-<W>x<H>.png`, using the nominal size.
pub fn export_filename(title: &str, layout_id: &str, dimensions: Dimensions) -> String {
    format!(
        "{}-{}-{}x{}.png",
        sanitize_title(title),
        layout_id,
        dimensions.width,
        dimensions.height
    )
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Resolves images and rasterizes snapshots.
#[derive(Clone)]
pub struct Exporter {
    resolver: ImageResolver,
    rasterizer: Arc<dyn Rasterizer>,
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl Exporter {
    pub fn new(resolver: ImageResolver) -> Self {
        Self::with_rasterizer(resolver, Arc::new(SoftwareRasterizer))
    }

    pub fn with_rasterizer(resolver: ImageResolver, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            resolver,
            rasterizer,
        }
    }

    pub fn resolver(&self) -> &ImageResolver {
        &self.resolver
    }

    /// Produce a PNG for `snapshot`.
    ///
    /// A background image that cannot be loaded is skipped with a warning;
    /// the export still succeeds with the background color alone.
    pub async fn export(&self, snapshot: ExportSnapshot) -> Result<ExportArtifact, TripcardError> {
        let background = match &snapshot.canvas.background.image {
            Some(source) => self.resolver.load_best_effort(source).await,
            None => None,
        };

        let rasterizer = Arc::clone(&self.rasterizer);
        let started = std::time::Instant::now();
        let artifact = tokio::task::spawn_blocking(move || {
            rasterize_snapshot(rasterizer.as_ref(), &snapshot, background.as_ref())
        })
        .await
        .map_err(|e| TripcardError::Render(format!("export task failed: {}", e)))??;

        tracing::info!(
            filename = %artifact.filename,
            width = artifact.width,
            height = artifact.height,
            bytes = artifact.png.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "export finished"
        );
        Ok(artifact)
    }
}

/// Rasterize and encode synchronously.
pub fn rasterize_snapshot(
    rasterizer: &dyn Rasterizer,
    snapshot: &ExportSnapshot,
    background: Option<&DynamicImage>,
) -> Result<ExportArtifact, TripcardError> {
    let img = rasterizer.rasterize(&snapshot.canvas, background)?;
    let (width, height) = img.dimensions();
    Ok(ExportArtifact {
        filename: snapshot.filename(),
        width,
        height,
        png: raster::encode_png(&img)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::content::FieldName;
    use crate::model::BackgroundProperty;
    use pretty_assertions::assert_eq;

    fn state(layout: &str) -> EditorState {
        EditorState::new(Catalog::builtin().by_id(layout).unwrap())
    }

    #[test]
    fn filename_from_title_layout_and_nominal_size() {
        let st = state("square");
        assert_eq!(
            ExportSnapshot::capture(&st).filename(),
            "amazing-bali-adventure-square-1080x1080.png"
        );
        assert_eq!(sanitize_title("  Two\t\nSpaces  "), "-two-spaces-");
        assert_eq!(sanitize_title("Bell\u{1}\u{7f} \"Quoted\" a/b\\c"), "bell-quoted-abc");
        assert_eq!(
            export_filename("Ölüdeniz Escape", "story", Dimensions::new(1080, 1920)),
            "ölüdeniz-escape-story-1080x1920.png"
        );
    }

    #[test]
    fn snapshot_is_detached_from_later_edits() {
        let mut st = state("square");
        let snapshot = ExportSnapshot::capture(&st);
        st.content.set_field(FieldName::Title, "Changed");
        assert_eq!(snapshot.title, "Amazing Bali Adventure");
        assert!(snapshot.canvas.get("title").unwrap().text.starts_with("Amazing"));
    }

    #[test]
    fn snapshot_ignores_selection() {
        let mut st = state("square");
        st.selected = Some("price".into());
        let snapshot = ExportSnapshot::capture(&st);
        assert!(snapshot.canvas.boxes.iter().all(|b| !b.selected && b.outline.is_none()));
    }

    #[test]
    fn story_export_scale_meets_both_axes() {
        let snapshot = ExportSnapshot::capture(&state("story"));
        assert!((snapshot.scale - 1080.0 / 337.0).abs() < 1e-9);
        let (w, h) = snapshot.pixel_size();
        assert!(w >= 1080 && h >= 1920);
    }

    #[tokio::test]
    async fn export_without_background_produces_png() {
        let mut st = state("portrait");
        st.layout
            .background_style
            .apply(BackgroundProperty::BackgroundImage(None));
        let exporter = Exporter::new(ImageResolver::new(None).unwrap());
        let artifact = exporter.export(ExportSnapshot::capture(&st)).await.unwrap();
        assert_eq!((artifact.width, artifact.height), (1080, 1350));
        assert_eq!(artifact.filename, "amazing-bali-adventure-portrait-1080x1350.png");
        assert_eq!(&artifact.png[1..4], b"PNG");
    }

    #[tokio::test]
    async fn missing_background_is_skipped() {
        // the default square background is a root-relative path; no asset dir is configured
        let exporter = Exporter::new(ImageResolver::new(None).unwrap());
        let artifact = exporter
            .export(ExportSnapshot::capture(&state("square")))
            .await
            .unwrap();
        assert_eq!((artifact.width, artifact.height), (1080, 1080));
    }
}
