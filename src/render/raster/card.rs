use crate::animation::ease::ease_in_out;
use crate::animation::interpolate::{Extrapolate, interpolate};
use crate::animation::spring::spring;
use crate::effects::document::StatValue;
use crate::effects::model::{EffectContent, EffectKind, ResolvedEffect};
use crate::foundation::core::{Position, Vec2};
use crate::foundation::error::{CutawayError, CutawayResult};
use crate::render::backend::Placement;
use crate::timing::grid::SampleInstant;

/// Transparent padding around every card so entrance motion never clips.
pub(crate) const MARGIN: u32 = 48;

pub(crate) const ENTRANCE_DAMPING: f64 = 12.0;
pub(crate) const ENTRANCE_STIFFNESS: f64 = 200.0;
const FADE_IN_MS: f64 = 300.0;
const FADE_OUT_MS: f64 = 400.0;
const SLIDE_PX: f64 = 40.0;

/// What the effect position refers to on the card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Anchoring {
    TopLeft,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CardGeometry {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) anchoring: Anchoring,
}

pub(crate) const BULLET_ROW_PX: u32 = 56;
pub(crate) const BULLET_TOP_PX: u32 = 90;

pub(crate) fn geometry(content: &EffectContent) -> CardGeometry {
    use Anchoring::*;
    let (width, height, anchoring) = match content {
        EffectContent::LowerThird { .. } => (520, 120, TopLeft),
        EffectContent::ChapterTitle { .. } => (900, 260, Center),
        EffectContent::FancyText { text, .. } => {
            let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
            (chars.saturating_mul(28).saturating_add(64).clamp(200, 960), 88, Center)
        }
        EffectContent::TermCard { .. } => (400, 220, TopLeft),
        EffectContent::QuoteCallout { .. } => (900, 280, Center),
        EffectContent::AnimatedStat { .. } => (480, 240, Center),
        EffectContent::BulletPoints { points, .. } => {
            let rows = u32::try_from(points.len()).unwrap_or(u32::MAX);
            (
                700,
                rows.saturating_mul(BULLET_ROW_PX)
                    .saturating_add(BULLET_TOP_PX + 24),
                TopLeft,
            )
        }
        EffectContent::SocialBar { .. } => (300, 90, TopLeft),
    };
    CardGeometry {
        width,
        height,
        anchoring,
    }
}

/// Tight frame box for `effect`: the card plus [`MARGIN`] on every side.
pub(crate) fn placement(effect: &ResolvedEffect) -> CutawayResult<Placement> {
    let g = geometry(&effect.content);
    let width = g.width + 2 * MARGIN;
    let height = g.height + 2 * MARGIN;
    if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
        return Err(CutawayError::validation(format!(
            "{}: card of {width}x{height} exceeds the raster size limit",
            effect.label
        )));
    }

    let margin = MARGIN as i32;
    let Position { x, y } = effect.position;
    let origin = match g.anchoring {
        Anchoring::TopLeft => Position::new(x.saturating_sub(margin), y.saturating_sub(margin)),
        Anchoring::Center => Position::new(
            x.saturating_sub((g.width / 2) as i32).saturating_sub(margin),
            y.saturating_sub((g.height / 2) as i32).saturating_sub(margin),
        ),
    };
    Ok(Placement {
        origin,
        width,
        height,
    })
}

/// Per-frame card motion: overall opacity, translation and scale about the card center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Motion {
    pub(crate) opacity: f64,
    pub(crate) offset: Vec2,
    pub(crate) scale: f64,
}

pub(crate) fn entrance(at: SampleInstant) -> f64 {
    spring(
        at.frame_f64(),
        at.fps.as_f64(),
        0.0,
        1.0,
        ENTRANCE_DAMPING,
        ENTRANCE_STIFFNESS,
    )
}

pub(crate) fn motion(kind: EffectKind, at: SampleInstant, duration_ms: u64) -> CutawayResult<Motion> {
    let t = at.time_ms();
    let d = duration_ms as f64;
    let fade_in = interpolate(t, [0.0, FADE_IN_MS], [0.0, 1.0], Extrapolate::Clamp)?;
    let fade_len = FADE_OUT_MS.min(d / 2.0);
    let fade_out = if fade_len > 0.0 {
        interpolate(t, [d - fade_len, d], [1.0, 0.0], Extrapolate::Clamp)?
    } else {
        1.0
    };

    let rest = 1.0 - entrance(at);
    let (offset, scale) = match kind {
        EffectKind::LowerThird | EffectKind::BulletPoints => (Vec2::new(-rest * SLIDE_PX, 0.0), 1.0),
        EffectKind::TermCard => (Vec2::new(rest * SLIDE_PX, 0.0), 1.0),
        EffectKind::SocialBar => (Vec2::new(0.0, rest * SLIDE_PX), 1.0),
        EffectKind::FancyText => (Vec2::new(0.0, -rest * SLIDE_PX * 0.6), 1.0),
        EffectKind::ChapterTitle | EffectKind::QuoteCallout | EffectKind::AnimatedStat => {
            (Vec2::ZERO, 1.0 - 0.15 * rest)
        }
    };
    Ok(Motion {
        opacity: fade_in.min(fade_out).clamp(0.0, 1.0),
        offset,
        scale,
    })
}

/// Opacity and horizontal slide of bullet `index`, which enters after the ones before it.
pub(crate) fn bullet_reveal(index: usize, t_ms: f64) -> CutawayResult<(f64, f64)> {
    let delay = 300.0 + 250.0 * index as f64;
    let shown = interpolate(t_ms, [delay, delay + 300.0], [0.0, 1.0], Extrapolate::Clamp)?;
    Ok((shown, (1.0 - shown) * 20.0))
}

/// Counter text of an animated stat at `t_ms`, counting up over the first part of the window.
pub(crate) fn stat_text(
    prefix: &str,
    number: &StatValue,
    unit: &str,
    t_ms: f64,
    duration_ms: u64,
) -> CutawayResult<String> {
    let Some(target) = number.as_f64() else {
        return Ok(format!("{prefix}{}{unit}", number.display()));
    };
    let count_ms = (duration_ms as f64 * 0.6).clamp(1.0, 1500.0);
    let progress = interpolate(t_ms, [0.0, count_ms], [0.0, 1.0], Extrapolate::Clamp)?;
    let value = target * ease_in_out(progress);
    Ok(format!("{prefix}{:.*}{unit}", number.decimals(), value))
}

#[cfg(test)]
#[path = "../../../tests/unit/render/raster/card.rs"]
mod tests;
