use crate::foundation::core::Rgba8;
use crate::foundation::error::{CutawayError, CutawayResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Font bytes loaded once per job and shared by every raster worker.
#[derive(Clone)]
pub struct FontSource {
    bytes: Arc<Vec<u8>>,
    /// Face index inside a font collection file.
    index: u32,
}

impl std::fmt::Debug for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSource")
            .field("bytes", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

impl FontSource {
    pub fn load(path: &Path) -> CutawayResult<Self> {
        use anyhow::Context as _;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font '{}'", path.display()))?;
        if bytes.is_empty() {
            return Err(CutawayError::validation(format!(
                "font file '{}' is empty",
                path.display()
            )));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
            index: 0,
        })
    }

    /// The system's default sans-serif face, if font discovery finds one.
    pub fn system_default() -> Option<Self> {
        use parley::fontique::{Collection, CollectionOptions, GenericFamily};

        let mut collection = Collection::new(CollectionOptions {
            shared: false,
            system_fonts: true,
        });
        let ids: Vec<_> = collection
            .generic_families(GenericFamily::SansSerif)
            .collect();
        ids.into_iter().find_map(|id| {
            let family = collection.family(id)?;
            let font = family.default_font()?;
            let blob = font.load(None)?;
            if blob.data().is_empty() {
                return None;
            }
            Some(Self {
                bytes: Arc::new(blob.data().to_vec()),
                index: font.index(),
            })
        })
    }
}

type LayoutKey = (String, u32, Option<u32>, TextBrushRgba8);

/// Shapes text with Parley against a single registered font and caches the layouts.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
    cache: HashMap<LayoutKey, Arc<parley::Layout<TextBrushRgba8>>>,
}

impl TextLayoutEngine {
    pub(crate) fn new(source: &FontSource) -> CutawayResult<Self> {
        // Only the configured face is registered, so shaping never falls back to a font the
        // glyph runs cannot be drawn with.
        let mut font_ctx = parley::FontContext {
            collection: parley::fontique::Collection::new(parley::fontique::CollectionOptions {
                shared: false,
                system_fonts: false,
            }),
            source_cache: parley::fontique::SourceCache::default(),
        };
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(source.bytes.to_vec()), None);
        let family_id = families
            .iter()
            .find(|(_, fonts)| fonts.iter().any(|f| f.index() == source.index))
            .or_else(|| families.first())
            .map(|(id, _)| *id)
            .ok_or_else(|| {
                CutawayError::validation("no font families registered from font bytes")
            })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CutawayError::validation("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(source.bytes.to_vec()),
            source.index,
        );
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
            cache: HashMap::new(),
        })
    }

    pub(crate) fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Drop cached layouts. Animated text yields a new layout per frame, so callers clear
    /// the cache between effects.
    pub(crate) fn clear_cache(&mut self) {
        self.cache.clear();
    }

    #[cfg(test)]
    pub(crate) fn cached_layouts(&self) -> usize {
        self.cache.len()
    }

    /// Shape and lay out plain text, wrapping at `max_width_px` when given.
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: Option<f32>,
    ) -> CutawayResult<Arc<parley::Layout<TextBrushRgba8>>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CutawayError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let key = (
            text.to_owned(),
            size_px.to_bits(),
            max_width_px.map(f32::to_bits),
            brush,
        );
        if let Some(hit) = self.cache.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(max_width_px);
        if let Some(w) = max_width_px {
            layout.align(
                Some(w),
                parley::Alignment::Start,
                parley::AlignmentOptions::default(),
            );
        }

        let layout = Arc::new(layout);
        self.cache.insert(key, Arc::clone(&layout));
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/render/raster/text.rs"]
mod tests;
