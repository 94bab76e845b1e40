use crate::effects::defaults::DefaultsTable;
use crate::foundation::error::{CutawayError, CutawayResult};
use crate::render::dom::SurfaceEngine;
use crate::render::dom::driver::{DriverCommand, DriverEngine};
use crate::render::negotiate::RendererChoice;
use crate::render::raster::text::FontSource;
use std::path::PathBuf;
use std::sync::Arc;

/// Driver command used when the DOM backend is requested.
pub const ENV_DOM_DRIVER: &str = "CUTAWAY_DOM_DRIVER";
/// Directory holding `<kind>.html` templates.
pub const ENV_TEMPLATES_DIR: &str = "CUTAWAY_TEMPLATES_DIR";
/// Font file for raster text.
pub const ENV_FONT: &str = "CUTAWAY_FONT";
/// Parent directory for per-layer scratch storage.
pub const ENV_SCRATCH_DIR: &str = "CUTAWAY_SCRATCH_DIR";
/// Worker thread count.
pub const ENV_THREADS: &str = "CUTAWAY_THREADS";

/// Job-level knobs. CLI flags override environment variables, which override defaults.
#[derive(Clone, Debug)]
pub struct JobOpts {
    pub renderer: RendererChoice,
    /// Worker threads for layer building and compositing; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Base frames decoded and blended per batch.
    pub chunk_size: usize,
    /// Parent directory for scratch storage; the system temp dir when unset.
    pub scratch_root: Option<PathBuf>,
    /// Command line of the DOM driver process. No driver means no DOM backend.
    pub dom_driver: Option<String>,
    pub templates_dir: PathBuf,
    pub font: Option<PathBuf>,
    /// Use the system sans-serif face when no `font` is set.
    pub system_fonts: bool,
    /// Replace an existing output file.
    pub overwrite: bool,
    pub defaults: DefaultsTable,
}

impl Default for JobOpts {
    fn default() -> Self {
        Self {
            renderer: RendererChoice::Auto,
            threads: None,
            chunk_size: 16,
            scratch_root: None,
            dom_driver: None,
            templates_dir: PathBuf::from("templates"),
            font: None,
            system_fonts: true,
            overwrite: true,
            defaults: DefaultsTable::standard(),
        }
    }
}

impl JobOpts {
    /// Defaults with the `CUTAWAY_*` environment variables applied.
    pub fn from_env() -> CutawayResult<Self> {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Apply variables from `lookup`. Empty values count as unset.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> CutawayResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_DOM_DRIVER) {
            self.dom_driver = Some(v);
        }
        if let Some(v) = get(ENV_TEMPLATES_DIR) {
            self.templates_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_FONT) {
            self.font = Some(PathBuf::from(v));
        }
        if let Some(v) = get(ENV_SCRATCH_DIR) {
            self.scratch_root = Some(PathBuf::from(v));
        }
        if let Some(v) = get(ENV_THREADS) {
            let n = v.trim().parse::<usize>().map_err(|_| {
                CutawayError::validation(format!("{ENV_THREADS} must be a positive integer, got '{v}'"))
            })?;
            self.threads = Some(n);
        }
        Ok(self)
    }

    pub(crate) fn dom_engine(&self) -> CutawayResult<Option<Arc<dyn SurfaceEngine>>> {
        let Some(cmd) = self.dom_driver.as_deref() else {
            return Ok(None);
        };
        let engine: Arc<dyn SurfaceEngine> = Arc::new(DriverEngine::new(DriverCommand::parse(cmd)?));
        Ok(Some(engine))
    }

    pub(crate) fn load_font(&self) -> CutawayResult<Option<FontSource>> {
        if let Some(path) = self.font.as_deref() {
            return FontSource::load(path).map(Some);
        }
        if !self.system_fonts {
            return Ok(None);
        }
        let found = FontSource::system_default();
        match &found {
            Some(font) => tracing::debug!(?font, "using system sans-serif font"),
            None => tracing::warn!("no font configured and no system sans-serif font found"),
        }
        Ok(found)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/opts.rs"]
mod tests;
