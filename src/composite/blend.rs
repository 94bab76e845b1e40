use crate::foundation::core::Position;
use crate::foundation::error::{CutawayError, CutawayResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::backend::FrameRGBA;

pub type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over for premultiplied pixels, with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> CutawayResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(CutawayError::composition(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Blend a `src_w x src_h` premultiplied raster over `dst` with its top-left at `origin`.
///
/// Parts falling outside `dst` are clipped; a raster entirely outside is a no-op.
pub fn over_at(
    dst: &mut FrameRGBA,
    src: &[u8],
    src_w: u32,
    src_h: u32,
    origin: Position,
) -> CutawayResult<()> {
    let expected = (src_w as usize) * (src_h as usize) * 4;
    if src.len() != expected {
        return Err(CutawayError::composition(format!(
            "layer raster is {} bytes, expected {expected} for {src_w}x{src_h}",
            src.len()
        )));
    }

    let dst_w = i64::from(dst.width);
    let dst_h = i64::from(dst.height);
    let x0 = i64::from(origin.x).max(0);
    let y0 = i64::from(origin.y).max(0);
    let x1 = (i64::from(origin.x) + i64::from(src_w)).min(dst_w);
    let y1 = (i64::from(origin.y) + i64::from(src_h)).min(dst_h);
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    let span = ((x1 - x0) as usize) * 4;
    let src_stride = (src_w as usize) * 4;
    let dst_stride = (dst.width as usize) * 4;
    let sx = (x0 - i64::from(origin.x)) as usize;
    for y in y0..y1 {
        let sy = (y - i64::from(origin.y)) as usize;
        let s_off = sy * src_stride + sx * 4;
        let d_off = (y as usize) * dst_stride + (x0 as usize) * 4;
        over_in_place(
            &mut dst.data[d_off..d_off + span],
            &src[s_off..s_off + span],
            1.0,
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/composite/blend.rs"]
mod tests;
