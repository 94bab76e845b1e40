use crate::effects::defaults::DefaultsTable;
use crate::effects::document::{CommonDef, EffectsDocument};
use crate::effects::model::{EffectContent, EffectKind, ResolvedEffect};
use crate::foundation::core::{Canvas, Position};
use crate::foundation::error::{CutawayError, CutawayResult};
use crate::timing::window::{Span, TimeWindow};

/// Largest accepted magnitude for an explicit position coordinate.
const MAX_POSITION_PX: f64 = 1_000_000.0;

/// Validate the document and resolve every entry against `defaults`.
///
/// Entries come back in stacking order: kinds in [`EffectKind::ALL`] order, then array order
/// within a kind. All problems are collected and reported together in one validation error.
pub fn resolve_effects(
    doc: &EffectsDocument,
    canvas: Canvas,
    defaults: &DefaultsTable,
) -> CutawayResult<Vec<ResolvedEffect>> {
    let cx = ResolveCx {
        doc,
        canvas,
        defaults,
    };
    let mut out = Vec::with_capacity(doc.len());
    let mut errors = Vec::new();

    let mut push = |r: Result<ResolvedEffect, String>| match r {
        Ok(effect) => out.push(effect),
        Err(e) => errors.push(e),
    };

    for (i, d) in doc.lower_thirds.iter().enumerate() {
        push(cx.entry(EffectKind::LowerThird, i, &d.common, d.common.start_ms, None, |l| {
            Ok(EffectContent::LowerThird {
                name: required_text(l, "name", &d.name)?,
                role: d.role.clone().unwrap_or_default(),
                company: d.company.clone().unwrap_or_default(),
            })
        }));
    }
    for (i, d) in doc.chapter_titles.iter().enumerate() {
        push(cx.entry(EffectKind::ChapterTitle, i, &d.common, d.common.start_ms, None, |l| {
            Ok(EffectContent::ChapterTitle {
                number: d.number.as_ref().map(|n| n.display()).unwrap_or_default(),
                title: required_text(l, "title", &d.title)?,
                subtitle: d.subtitle.clone().unwrap_or_default(),
            })
        }));
    }
    for (i, d) in doc.key_phrases.iter().enumerate() {
        push(cx.entry(EffectKind::FancyText, i, &d.common, d.common.start_ms, None, |l| {
            Ok(EffectContent::FancyText {
                text: required_text(l, "text", &d.text)?,
                style: d.style.unwrap_or_default(),
            })
        }));
    }
    for (i, d) in doc.term_definitions.iter().enumerate() {
        let label = label(EffectKind::TermCard, i);
        let seconds = match d.display_duration_seconds {
            Some(s) if s.is_finite() && s > 0.0 => Some((s * 1000.0).round() as u64),
            Some(s) => {
                push(Err(format!(
                    "{label}: displayDurationSeconds must be > 0 (got {s})"
                )));
                continue;
            }
            None => None,
        };
        let start = d.first_appearance_ms.or(d.common.start_ms);
        push(cx.entry(EffectKind::TermCard, i, &d.common, start, seconds, |l| {
            Ok(EffectContent::TermCard {
                chinese: required_text(l, "chinese", &d.chinese)?,
                english: required_text(l, "english", &d.english)?,
                description: d
                    .description
                    .clone()
                    .ok_or_else(|| missing(l, "description"))?,
            })
        }));
    }
    for (i, d) in doc.quotes.iter().enumerate() {
        push(cx.entry(EffectKind::QuoteCallout, i, &d.common, d.common.start_ms, None, |l| {
            Ok(EffectContent::QuoteCallout {
                text: required_text(l, "text", &d.text)?,
                author: d.author.clone().unwrap_or_default(),
            })
        }));
    }
    for (i, d) in doc.stats.iter().enumerate() {
        push(cx.entry(EffectKind::AnimatedStat, i, &d.common, d.common.start_ms, None, |l| {
            Ok(EffectContent::AnimatedStat {
                prefix: d.prefix.clone().unwrap_or_default(),
                number: d.number.clone().ok_or_else(|| missing(l, "number"))?,
                unit: d.unit.clone().unwrap_or_default(),
                label: d.label.clone().unwrap_or_default(),
            })
        }));
    }
    for (i, d) in doc.bullet_points.iter().enumerate() {
        push(cx.entry(EffectKind::BulletPoints, i, &d.common, d.common.start_ms, None, |l| {
            let points = d.points.clone().ok_or_else(|| missing(l, "points"))?;
            if points.is_empty() {
                return Err(format!("{l}: `points` must not be empty"));
            }
            Ok(EffectContent::BulletPoints {
                title: d.title.clone().unwrap_or_default(),
                points,
            })
        }));
    }
    for (i, d) in doc.social_bars.iter().enumerate() {
        push(cx.entry(EffectKind::SocialBar, i, &d.common, d.common.start_ms, None, |l| {
            Ok(EffectContent::SocialBar {
                platform: d.platform.unwrap_or_default(),
                handle: required_text(l, "handle", &d.handle)?,
                label: d.label.clone().unwrap_or_else(|| "关注".to_owned()),
            })
        }));
    }

    if !errors.is_empty() {
        return Err(CutawayError::validation(errors.join("; ")));
    }
    Ok(out)
}

struct ResolveCx<'a> {
    doc: &'a EffectsDocument,
    canvas: Canvas,
    defaults: &'a DefaultsTable,
}

impl ResolveCx<'_> {
    fn entry(
        &self,
        kind: EffectKind,
        index: usize,
        common: &CommonDef,
        start_ms: Option<i64>,
        duration_override: Option<u64>,
        content: impl FnOnce(&str) -> Result<EffectContent, String>,
    ) -> Result<ResolvedEffect, String> {
        let label = label(kind, index);
        let content = content(&label)?;
        let kind_defaults = self.defaults.get(kind);
        let span = resolve_span(
            &label,
            kind,
            common,
            start_ms,
            duration_override.or(kind_defaults.duration_ms),
        )?;
        let position = match common.position {
            Some(p) => {
                if !p.x.is_finite() || !p.y.is_finite() {
                    return Err(format!("{label}: position must be finite"));
                }
                if p.x.abs() > MAX_POSITION_PX || p.y.abs() > MAX_POSITION_PX {
                    return Err(format!(
                        "{label}: position ({}, {}) is outside +/-{MAX_POSITION_PX} px",
                        p.x, p.y
                    ));
                }
                Position::new(p.x.round() as i32, p.y.round() as i32)
            }
            None => kind_defaults.position.resolve(self.canvas, index),
        };
        Ok(ResolvedEffect {
            label,
            content,
            theme: common.theme.unwrap_or(self.doc.theme),
            position,
            span,
        })
    }
}

fn resolve_span(
    label: &str,
    kind: EffectKind,
    common: &CommonDef,
    start_ms: Option<i64>,
    fallback_duration: Option<u64>,
) -> Result<Span, String> {
    let start_field = if kind == EffectKind::TermCard {
        "firstAppearanceMs"
    } else {
        "startMs"
    };
    let start = non_negative(label, start_field, start_ms.ok_or_else(|| missing(label, start_field))?)?;
    let window = match (common.end_ms, common.duration_ms) {
        (Some(_), Some(_)) => {
            return Err(format!(
                "{label}: `endMs` and `durationMs` are mutually exclusive"
            ));
        }
        (Some(end), None) => TimeWindow::until(start, non_negative(label, "endMs", end)?),
        (None, Some(d)) => TimeWindow::lasting(start, non_negative(label, "durationMs", d)?),
        (None, None) => match fallback_duration {
            Some(d) => TimeWindow::lasting(start, d),
            None => return Err(missing(label, "endMs")),
        },
    };
    window.normalize().map_err(|e| match e {
        CutawayError::Validation(msg) => format!("{label}: {msg}"),
        other => format!("{label}: {other}"),
    })
}

fn label(kind: EffectKind, index: usize) -> String {
    format!("{}[{index}]", kind.config_key())
}

fn missing(label: &str, field: &str) -> String {
    format!("{label}: missing required field `{field}`")
}

fn non_negative(label: &str, field: &str, v: i64) -> Result<u64, String> {
    u64::try_from(v).map_err(|_| format!("{label}: `{field}` must be non-negative (got {v})"))
}

fn required_text(label: &str, field: &str, v: &Option<String>) -> Result<String, String> {
    match v {
        Some(s) if !s.trim().is_empty() => Ok(s.clone()),
        Some(_) => Err(format!("{label}: `{field}` must not be empty")),
        None => Err(missing(label, field)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/resolve.rs"]
mod tests;
