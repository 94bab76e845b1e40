use crate::effects::model::EffectKind;
use crate::foundation::core::{Canvas, Position};

/// Reference point on the canvas that a default position is measured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    Center,
    BottomLeft,
    BottomRight,
}

impl Anchor {
    fn point(self, canvas: Canvas) -> Position {
        let w = i32::try_from(canvas.width).unwrap_or(i32::MAX);
        let h = i32::try_from(canvas.height).unwrap_or(i32::MAX);
        match self {
            Anchor::TopLeft => Position::new(0, 0),
            Anchor::TopCenter => Position::new(w / 2, 0),
            Anchor::TopRight => Position::new(w, 0),
            Anchor::Center => Position::new(w / 2, h / 2),
            Anchor::BottomLeft => Position::new(0, h),
            Anchor::BottomRight => Position::new(w, h),
        }
    }
}

/// How an effect's position is derived when the document leaves it unset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionRule {
    /// `anchor + offset`.
    Anchored { anchor: Anchor, offset: Position },
    /// `anchor + offset + (i mod cycle_x) * step_x, (i mod cycle_y) * step_y`, where `i` is the
    /// entry's index within its kind. Keeps neighbouring entries from landing on each other.
    Staggered {
        anchor: Anchor,
        offset: Position,
        step_x: i32,
        cycle_x: u32,
        step_y: i32,
        cycle_y: u32,
    },
}

impl PositionRule {
    pub fn anchored(anchor: Anchor, dx: i32, dy: i32) -> Self {
        Self::Anchored {
            anchor,
            offset: Position::new(dx, dy),
        }
    }

    pub fn resolve(self, canvas: Canvas, index: usize) -> Position {
        match self {
            PositionRule::Anchored { anchor, offset } => {
                let base = anchor.point(canvas);
                Position::new(
                    base.x.saturating_add(offset.x),
                    base.y.saturating_add(offset.y),
                )
            }
            PositionRule::Staggered {
                anchor,
                offset,
                step_x,
                cycle_x,
                step_y,
                cycle_y,
            } => {
                let base = anchor.point(canvas);
                let ix = stagger_step(index, cycle_x);
                let iy = stagger_step(index, cycle_y);
                Position::new(
                    base.x
                        .saturating_add(offset.x)
                        .saturating_add(ix.saturating_mul(step_x)),
                    base.y
                        .saturating_add(offset.y)
                        .saturating_add(iy.saturating_mul(step_y)),
                )
            }
        }
    }
}

fn stagger_step(index: usize, cycle: u32) -> i32 {
    if cycle == 0 {
        return 0;
    }
    (index % cycle as usize) as i32
}

/// Defaults applied to one effect kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KindDefaults {
    pub position: PositionRule,
    /// Length used when an entry has neither `endMs` nor `durationMs`; `None` makes the end
    /// time mandatory for the kind.
    pub duration_ms: Option<u64>,
}

/// Explicit per-kind defaults handed to the layer builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaultsTable {
    kinds: [KindDefaults; 8],
}

impl DefaultsTable {
    /// The stock layout: lower-thirds bottom-left, social bars bottom-right, term cards
    /// top-right, titles, quotes and stats centered.
    pub fn standard() -> Self {
        let centered = PositionRule::anchored(Anchor::Center, 0, 0);
        let mut kinds = [KindDefaults {
            position: centered,
            duration_ms: None,
        }; 8];

        kinds[EffectKind::LowerThird.slot()] = KindDefaults {
            position: PositionRule::anchored(Anchor::BottomLeft, 80, -200),
            duration_ms: Some(5000),
        };
        kinds[EffectKind::ChapterTitle.slot()] = KindDefaults {
            position: centered,
            duration_ms: Some(4000),
        };
        kinds[EffectKind::FancyText.slot()] = KindDefaults {
            position: PositionRule::Staggered {
                anchor: Anchor::TopCenter,
                offset: Position::new(-150, 120),
                step_x: 300,
                cycle_x: 2,
                step_y: 40,
                cycle_y: 3,
            },
            duration_ms: None,
        };
        kinds[EffectKind::TermCard.slot()] = KindDefaults {
            position: PositionRule::anchored(Anchor::TopRight, -450, 50),
            duration_ms: Some(6000),
        };
        kinds[EffectKind::QuoteCallout.slot()] = KindDefaults {
            position: centered,
            duration_ms: Some(5000),
        };
        kinds[EffectKind::AnimatedStat.slot()] = KindDefaults {
            position: centered,
            duration_ms: Some(4000),
        };
        kinds[EffectKind::BulletPoints.slot()] = KindDefaults {
            position: PositionRule::anchored(Anchor::TopLeft, 100, 300),
            duration_ms: Some(6000),
        };
        kinds[EffectKind::SocialBar.slot()] = KindDefaults {
            position: PositionRule::anchored(Anchor::BottomRight, -320, -130),
            duration_ms: Some(8000),
        };

        Self { kinds }
    }

    pub fn get(&self, kind: EffectKind) -> KindDefaults {
        self.kinds[kind.slot()]
    }

    pub fn set(&mut self, kind: EffectKind, defaults: KindDefaults) {
        self.kinds[kind.slot()] = defaults;
    }

    pub fn with_duration(mut self, kind: EffectKind, duration_ms: Option<u64>) -> Self {
        self.kinds[kind.slot()].duration_ms = duration_ms;
        self
    }

    pub fn with_position(mut self, kind: EffectKind, rule: PositionRule) -> Self {
        self.kinds[kind.slot()].position = rule;
        self
    }

    pub fn position(&self, kind: EffectKind, canvas: Canvas, index: usize) -> Position {
        self.get(kind).position.resolve(canvas, index)
    }
}

impl Default for DefaultsTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/defaults.rs"]
mod tests;
