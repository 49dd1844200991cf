use image::{Rgb, RgbImage};

/// One axis of a bilinear sample: the two neighbouring source indices and the
/// weight of the upper one.
#[derive(Debug, Clone, Copy)]
struct Tap {
    lo: u32,
    hi: u32,
    frac: f32,
}

impl Tap {
    fn new(dst: u32, scale: f32, len: u32) -> Self {
        // Pixel centres are aligned: dst centre (d + 0.5) maps to src centre (s + 0.5).
        let center = ((dst as f32 + 0.5) * scale - 0.5).max(0.0);
        let lo = (center.floor() as u32).min(len - 1);
        let hi = (lo + 1).min(len - 1);
        let frac = (center - lo as f32).clamp(0.0, 1.0);
        Self { lo, hi, frac }
    }
}

/// Stretches `src` to exactly `width` x `height` with plain bilinear sampling.
///
/// There is no anti-aliasing pre-filter when shrinking: every output pixel is
/// interpolated from its four nearest source pixels only, with coordinates
/// clamped at the borders. Results are rounded back to 8 bits.
///
/// An empty `src` has no pixels to sample and yields an empty image.
pub fn resize_bilinear(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (in_w, in_h) = src.dimensions();
    if in_w == 0 || in_h == 0 {
        return RgbImage::new(0, 0);
    }

    let scale_x = in_w as f32 / width as f32;
    let scale_y = in_h as f32 / height as f32;
    let cols: Vec<Tap> = (0..width).map(|x| Tap::new(x, scale_x, in_w)).collect();
    let rows: Vec<Tap> = (0..height).map(|y| Tap::new(y, scale_y, in_h)).collect();

    let mut out = RgbImage::new(width, height);
    for (y, row) in rows.iter().enumerate() {
        for (x, col) in cols.iter().enumerate() {
            let p00 = src.get_pixel(col.lo, row.lo).0;
            let p10 = src.get_pixel(col.hi, row.lo).0;
            let p01 = src.get_pixel(col.lo, row.hi).0;
            let p11 = src.get_pixel(col.hi, row.hi).0;

            let mut px = [0u8; 3];
            for c in 0..3 {
                let top = p00[c] as f32 * (1.0 - col.frac) + p10[c] as f32 * col.frac;
                let bottom = p01[c] as f32 * (1.0 - col.frac) + p11[c] as f32 * col.frac;
                let value = top * (1.0 - row.frac) + bottom * row.frac;
                px[c] = value.round().clamp(0.0, 255.0) as u8;
            }
            out.put_pixel(x as u32, y as u32, Rgb(px));
        }
    }
    out
}
