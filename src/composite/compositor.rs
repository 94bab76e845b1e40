use crate::composite::blend::over_at;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{CutawayError, CutawayResult};
use crate::layer::Layer;
use crate::media::source::BaseFrameSource;
use crate::render::backend::FrameRGBA;
use rayon::prelude::*;

/// Samples layers on the base video's frame grid and blends them in list order.
pub struct Compositor<'a> {
    layers: &'a [Layer],
    base_fps: Fps,
}

impl<'a> Compositor<'a> {
    pub fn new(layers: &'a [Layer], base_fps: Fps) -> Self {
        Self { layers, base_fps }
    }

    /// Blend every layer active at base frame `index` over `frame`; later layers land on top.
    ///
    /// `buf` is reused scratch space for reading layer frames. Returns how many layers
    /// contributed.
    pub fn composite_frame(
        &self,
        index: FrameIndex,
        frame: &mut FrameRGBA,
        buf: &mut Vec<u8>,
    ) -> CutawayResult<usize> {
        let mut applied = 0;
        for layer in self.layers {
            let Some(local) = layer.frame_for(index, self.base_fps) else {
                continue;
            };
            if !layer.read_frame_into(local, buf)? {
                continue;
            }
            let p = layer.placement();
            over_at(frame, buf, p.width, p.height, p.origin).map_err(|e| {
                CutawayError::composition(format!(
                    "blending {} at base frame {}: {e}",
                    layer.label(),
                    index.0
                ))
            })?;
            applied += 1;
        }
        Ok(applied)
    }
}

/// Counters from one composite pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositeStats {
    pub frames: u64,
    /// Sum over frames of the number of layers blended into that frame.
    pub layer_samples: u64,
}

/// Stream the base video through the compositor into `sink`.
///
/// Base frames are decoded sequentially in chunks of `chunk_size`, each chunk is blended in
/// parallel on `pool`, and frames reach the sink strictly in index order. The output has
/// exactly as many frames as the base video delivers. The sink is begun here; ending it is
/// left to the caller.
pub fn composite_video(
    source: &mut dyn BaseFrameSource,
    layers: &[Layer],
    sink: &mut dyn FrameSink,
    sink_cfg: SinkConfig,
    pool: &rayon::ThreadPool,
    chunk_size: usize,
    cancel: &CancelToken,
) -> CutawayResult<CompositeStats> {
    let info = source.info().clone();
    let compositor = Compositor::new(layers, info.fps);
    let chunk_size = chunk_size.max(1);

    sink.begin(sink_cfg)?;

    let mut stats = CompositeStats::default();
    let mut chunk: Vec<FrameRGBA> = Vec::with_capacity(chunk_size);
    loop {
        cancel.check()?;

        chunk.clear();
        while chunk.len() < chunk_size {
            match source.next_frame()? {
                Some(frame) => {
                    if frame.width != info.width || frame.height != info.height {
                        return Err(CutawayError::composition(format!(
                            "base frame {} is {}x{}, expected {}x{}",
                            stats.frames + chunk.len() as u64,
                            frame.width,
                            frame.height,
                            info.width,
                            info.height
                        )));
                    }
                    chunk.push(frame);
                }
                None => break,
            }
        }
        if chunk.is_empty() {
            break;
        }

        let first = stats.frames;
        let applied: Vec<CutawayResult<usize>> = pool.install(|| {
            chunk
                .par_iter_mut()
                .enumerate()
                .map_init(Vec::new, |buf, (i, frame)| {
                    compositor.composite_frame(FrameIndex(first + i as u64), frame, buf)
                })
                .collect()
        });
        for n in applied {
            stats.layer_samples += n? as u64;
        }

        for (i, frame) in chunk.iter().enumerate() {
            sink.push_frame(FrameIndex(first + i as u64), frame)?;
        }
        stats.frames += chunk.len() as u64;
        tracing::debug!(frames = stats.frames, "composited chunk");
    }

    source.finish()?;
    tracing::info!(
        frames = stats.frames,
        layer_samples = stats.layer_samples,
        "composition finished"
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/compositor.rs"]
mod tests;
