/// Damped harmonic oscillator parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Spring {
    /// Damping coefficient.
    pub damping: f64,
    /// Stiffness coefficient; the undamped angular frequency is `sqrt(stiffness)`.
    pub stiffness: f64,
}

impl Default for Spring {
    fn default() -> Self {
        Self {
            damping: 12.0,
            stiffness: 200.0,
        }
    }
}

impl Spring {
    /// Damping ratio `zeta = damping / (2 * sqrt(stiffness))`.
    pub fn damping_ratio(self) -> f64 {
        self.damping / (2.0 * self.stiffness.sqrt())
    }

    /// Normalized displacement from rest at time `t` seconds: `1` at `t = 0`, `-> 0` as `t -> inf`.
    pub fn displacement(self, t: f64) -> f64 {
        let omega = self.stiffness.sqrt();
        let zeta = self.damping_ratio();
        if zeta < 1.0 {
            let omega_d = omega * (1.0 - zeta * zeta).sqrt();
            let b = zeta * omega / omega_d;
            ((omega_d * t).cos() + b * (omega_d * t).sin()) * (-zeta * omega * t).exp()
        } else {
            // Critical and overdamped springs share one monotone response.
            (1.0 + t) * (-t).exp()
        }
    }

    /// Value at `frame` (may be fractional) on a grid of `fps` frames per second.
    pub fn sample(self, frame: f64, fps: f64, from: f64, to: f64) -> f64 {
        let t = frame / fps;
        from + (to - from) * (1.0 - self.displacement(t))
    }
}

/// Sample a spring animation from `from` towards `to`.
///
/// `fps` must be > 0. Degenerate parameters (zero or negative stiffness) fall into the
/// overdamped branch.
pub fn spring(frame: f64, fps: f64, from: f64, to: f64, damping: f64, stiffness: f64) -> f64 {
    Spring { damping, stiffness }.sample(frame, fps, from, to)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spring.rs"]
mod tests;
