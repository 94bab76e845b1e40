//! Procedural fallback backend: draws effect cards directly with `vello_cpu`.
//!
//! Lower fidelity than the DOM templates but needs no external engine. Text is shaped with
//! `parley` when a font is configured and skipped otherwise.

pub(crate) mod card;
pub(crate) mod text;

use crate::effects::document::{FancyStyle, Platform};
use crate::effects::model::{EffectContent, ResolvedEffect};
use crate::effects::theme::Palette;
use crate::foundation::core::{Affine, Rgba8};
use crate::foundation::error::{CutawayError, CutawayResult};
use crate::render::backend::{BackendKind, FrameRGBA, FrameRenderer, Placement};
use crate::timing::grid::SampleInstant;
use card::{BULLET_ROW_PX, BULLET_TOP_PX, MARGIN};
use kurbo::Shape;
use text::{FontSource, TextBrushRgba8, TextLayoutEngine};

const CORNER_RADIUS: f64 = 16.0;

/// Immediate-mode renderer. Holds one lazily created `vello_cpu` context, reused across effects.
pub struct RasterRenderer {
    font: Option<FontSource>,
    text: Option<TextLayoutEngine>,
    ctx: Option<vello_cpu::RenderContext>,
    current: Option<Placement>,
}

impl std::fmt::Debug for RasterRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterRenderer")
            .field("font", &self.font)
            .field("has_ctx", &self.ctx.is_some())
            .field("current", &self.current)
            .finish()
    }
}

impl RasterRenderer {
    pub fn new(font: Option<FontSource>) -> Self {
        Self {
            font,
            text: None,
            ctx: None,
            current: None,
        }
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> CutawayResult<R>,
    ) -> CutawayResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn text_engine(&mut self) -> CutawayResult<Option<&mut TextLayoutEngine>> {
        if self.text.is_none()
            && let Some(font) = &self.font
        {
            self.text = Some(TextLayoutEngine::new(font)?);
        }
        Ok(self.text.as_mut())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        base: Affine,
        text: &str,
        size_px: f32,
        color: Rgba8,
        at: (f64, f64),
        max_width: f64,
        centered: bool,
    ) -> CutawayResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let Some(engine) = self.text_engine()? else {
            return Ok(());
        };
        let layout = engine.layout_plain(
            text,
            size_px,
            TextBrushRgba8::from(color),
            Some(max_width as f32),
        )?;
        let dx = if centered {
            ((max_width - f64::from(layout.width())) / 2.0).max(0.0)
        } else {
            0.0
        };
        let font = engine.font().clone();

        ctx.set_transform(affine_to_cpu(base * Affine::translate((at.0 + dx, at.1))));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn draw_card(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        effect: &ResolvedEffect,
        at: SampleInstant,
        base: Affine,
    ) -> CutawayResult<()> {
        let p = effect.theme.palette();
        let g = card::geometry(&effect.content);
        let (w, h) = (f64::from(g.width), f64::from(g.height));
        let t = at.time_ms();

        fill_rounded(ctx, base, (0.0, 0.0, w, h), CORNER_RADIUS, panel_color(effect));

        match &effect.content {
            EffectContent::LowerThird {
                name,
                role,
                company,
            } => {
                fill_rect(ctx, base, (0.0, 20.0, 8.0, h - 20.0), p.accent);
                let detail = [role.as_str(), company.as_str()]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" · ");
                self.draw_text(ctx, base, name, 40.0, p.text, (32.0, 18.0), w - 56.0, false)?;
                self.draw_text(ctx, base, &detail, 24.0, p.muted, (32.0, 72.0), w - 56.0, false)?;
            }
            EffectContent::ChapterTitle {
                number,
                title,
                subtitle,
            } => {
                let inner = w - 96.0;
                self.draw_text(ctx, base, number, 28.0, p.accent, (48.0, 24.0), inner, true)?;
                self.draw_text(ctx, base, title, 64.0, p.text, (48.0, 70.0), inner, true)?;
                fill_rect(
                    ctx,
                    base,
                    (w / 2.0 - 60.0, 158.0, w / 2.0 + 60.0, 164.0),
                    p.accent,
                );
                self.draw_text(ctx, base, subtitle, 28.0, p.muted, (48.0, 184.0), inner, true)?;
            }
            EffectContent::FancyText { text, style } => {
                let (size, color) = match style {
                    FancyStyle::Emphasis => (44.0, solid(p.panel)),
                    FancyStyle::Term => (44.0, p.text),
                    FancyStyle::Number => (52.0, p.accent),
                };
                if *style == FancyStyle::Term {
                    fill_rect(ctx, base, (24.0, h - 14.0, w - 24.0, h - 8.0), p.accent);
                }
                let top = (h - f64::from(size) * 1.25) / 2.0;
                self.draw_text(ctx, base, text, size, color, (24.0, top), w - 48.0, true)?;
            }
            EffectContent::TermCard {
                chinese,
                english,
                description,
            } => {
                fill_rect(ctx, base, (CORNER_RADIUS, 0.0, w - CORNER_RADIUS, 6.0), p.accent);
                let inner = w - 48.0;
                self.draw_text(ctx, base, chinese, 36.0, p.text, (24.0, 24.0), inner, false)?;
                self.draw_text(ctx, base, english, 24.0, p.accent, (24.0, 76.0), inner, false)?;
                self.draw_text(ctx, base, description, 20.0, p.muted, (24.0, 118.0), inner, false)?;
            }
            EffectContent::QuoteCallout { text, author } => {
                fill_rect(ctx, base, (32.0, 32.0, 40.0, h - 32.0), p.accent);
                self.draw_text(ctx, base, text, 40.0, p.text, (72.0, 40.0), w - 136.0, false)?;
                self.draw_text(ctx, base, author, 26.0, p.muted, (72.0, h - 72.0), w - 136.0, false)?;
            }
            EffectContent::AnimatedStat {
                prefix,
                number,
                unit,
                label,
            } => {
                let figure = card::stat_text(prefix, number, unit, t, effect.span.duration_ms)?;
                let inner = w - 48.0;
                self.draw_text(ctx, base, &figure, 96.0, p.accent, (24.0, 24.0), inner, true)?;
                fill_rect(
                    ctx,
                    base,
                    (w / 2.0 - 40.0, 150.0, w / 2.0 + 40.0, 154.0),
                    p.accent,
                );
                self.draw_text(ctx, base, label, 30.0, p.muted, (24.0, 170.0), inner, true)?;
            }
            EffectContent::BulletPoints { title, points } => {
                self.draw_text(ctx, base, title, 36.0, p.text, (32.0, 24.0), w - 64.0, false)?;
                for (i, point) in points.iter().enumerate() {
                    let (shown, slide) = card::bullet_reveal(i, t)?;
                    if shown <= 0.0 {
                        continue;
                    }
                    let y = f64::from(BULLET_TOP_PX) + (i as f64) * f64::from(BULLET_ROW_PX);
                    let row = base * Affine::translate((-slide, y));
                    fill_rounded(ctx, row, (32.0, 10.0, 44.0, 22.0), 6.0, p.accent.with_opacity(shown));
                    self.draw_text(
                        ctx,
                        row,
                        point,
                        28.0,
                        p.text.with_opacity(shown),
                        (60.0, 0.0),
                        w - 92.0,
                        false,
                    )?;
                }
            }
            EffectContent::SocialBar {
                platform,
                handle,
                label,
            } => {
                fill_rounded(ctx, base, (16.0, 16.0, 74.0, 74.0), 12.0, p.accent);
                let badge = match platform {
                    Platform::Twitter => "X",
                    Platform::Weibo => "微",
                    Platform::Youtube => "▶",
                };
                self.draw_text(ctx, base, badge, 32.0, solid(p.panel), (16.0, 20.0), 58.0, true)?;
                self.draw_text(ctx, base, handle, 26.0, p.text, (90.0, 12.0), w - 106.0, false)?;
                self.draw_text(ctx, base, label, 20.0, p.muted, (90.0, 48.0), w - 106.0, false)?;
            }
        }
        Ok(())
    }
}

impl FrameRenderer for RasterRenderer {
    fn backend(&self) -> BackendKind {
        BackendKind::Raster
    }

    fn begin_effect(&mut self, effect: &ResolvedEffect) -> CutawayResult<Placement> {
        let placement = card::placement(effect)?;
        self.current = Some(placement);
        Ok(placement)
    }

    fn render(&mut self, effect: &ResolvedEffect, at: SampleInstant) -> CutawayResult<FrameRGBA> {
        let placement = self.current.ok_or_else(|| {
            CutawayError::validation(format!("{}: render called before begin_effect", effect.label))
        })?;
        let width = u16::try_from(placement.width)
            .map_err(|_| CutawayError::validation("raster frame width exceeds u16"))?;
        let height = u16::try_from(placement.height)
            .map_err(|_| CutawayError::validation("raster frame height exceeds u16"))?;

        let motion = card::motion(effect.kind(), at, effect.span.duration_ms)?;
        if motion.opacity <= 0.0 {
            return Ok(FrameRGBA::transparent(placement.width, placement.height));
        }

        let g = card::geometry(&effect.content);
        let center = (f64::from(g.width) / 2.0, f64::from(g.height) / 2.0);
        let base = Affine::translate((
            f64::from(MARGIN) + motion.offset.x,
            f64::from(MARGIN) + motion.offset.y,
        )) * Affine::translate(center)
            * Affine::scale(motion.scale)
            * Affine::translate((-center.0, -center.1));
        let opacity = motion.opacity as f32;

        self.with_ctx_mut(width, height, |this, ctx| {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            if opacity < 1.0 {
                ctx.push_opacity_layer(opacity);
            }
            this.draw_card(ctx, effect, at, base)?;
            if opacity < 1.0 {
                ctx.pop_layer();
            }

            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            FrameRGBA::from_premul(
                placement.width,
                placement.height,
                pixmap.data_as_u8_slice().to_vec(),
            )
        })
    }

    fn end_effect(&mut self) -> CutawayResult<()> {
        self.current = None;
        if let Some(text) = self.text.as_mut() {
            text.clear_cache();
        }
        Ok(())
    }

    fn close(&mut self) -> CutawayResult<()> {
        self.current = None;
        self.ctx = None;
        self.text = None;
        Ok(())
    }
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, tr: Affine, r: (f64, f64, f64, f64), c: Rgba8) {
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_paint(paint(c));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(r.0, r.1, r.2, r.3));
}

fn fill_rounded(
    ctx: &mut vello_cpu::RenderContext,
    tr: Affine,
    r: (f64, f64, f64, f64),
    radius: f64,
    c: Rgba8,
) {
    let path = kurbo::RoundedRect::new(r.0, r.1, r.2, r.3, radius).to_path(0.1);
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_paint(paint(c));
    ctx.fill_path(&bezpath_to_cpu(&path));
}

fn solid(c: Rgba8) -> Rgba8 {
    Rgba8 { a: 255, ..c }
}

fn paint(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Card background; emphasized key phrases sit on the accent color instead of the panel.
pub(crate) fn panel_color(effect: &ResolvedEffect) -> Rgba8 {
    let p: Palette = effect.theme.palette();
    match &effect.content {
        EffectContent::FancyText {
            style: FancyStyle::Emphasis,
            ..
        } => p.accent.with_opacity(0.85),
        _ => p.panel,
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/render/raster/mod.rs"]
mod tests;
