//! Separable box blur approximating a Gaussian.
//!
//! Each iteration runs one horizontal sliding-window pass and one vertical
//! pass. The vertical pass reuses the horizontal kernel: every pass writes its
//! output transposed, so running it twice with swapped dimensions lands the
//! result back in row-major order.

use promosaic_core::{PixelBuffer, alpha, argb, blue, green, red};

use crate::CoverError;

/// Widest window resolved through a lookup table; wider windows divide directly.
const MAX_TABLE_WINDOW: usize = 4097;

/// Blurs `source` into a new buffer of identical dimensions.
///
/// Window edges replicate the border pixel, so any radius is valid, including
/// ones far larger than the image. Channel sums are integer and each average
/// truncates, so output is bit-exact.
///
/// # Errors
/// Returns [`CoverError::InvalidBlurParameters`] when `radius` or
/// `iterations` is zero.
pub fn box_blur(source: &PixelBuffer, radius: u32, iterations: u32) -> Result<PixelBuffer, CoverError> {
    if radius == 0 || iterations == 0 {
        return Err(CoverError::InvalidBlurParameters { radius, iterations });
    }

    if source.is_empty() {
        return Ok(source.clone());
    }

    let width = source.width() as usize;
    let height = source.height() as usize;
    let divide = Divisor::for_radius(radius as usize);

    let mut pixels = source.pixels().to_vec();
    let mut scratch = vec![0_u32; pixels.len()];
    for _ in 0..iterations {
        blur_pass(&pixels, &mut scratch, width, height, radius as usize, &divide);
        blur_pass(&scratch, &mut pixels, height, width, radius as usize, &divide);
    }

    Ok(PixelBuffer::new(source.width(), source.height(), pixels)?)
}

/// Resolves a channel sum to its window average.
#[derive(Debug)]
enum Divisor {
    /// `table[sum] == sum / window` for every reachable channel sum.
    Table(Vec<u8>),
    /// Plain integer division for windows too wide to tabulate.
    Direct(usize),
}

impl Divisor {
    fn for_radius(radius: usize) -> Self {
        let window = 2 * radius + 1;
        if window > MAX_TABLE_WINDOW {
            return Self::Direct(window);
        }
        Self::Table((0..=255 * window).map(|sum| (sum / window) as u8).collect())
    }

    fn divide(&self, sum: usize) -> u8 {
        match self {
            Self::Table(table) => table[sum],
            Self::Direct(window) => (sum / window) as u8,
        }
    }
}

/// One horizontal pass over `width x height` input, written transposed.
///
/// Output pixel `(x, y)` lands at `x * height + y`.
fn blur_pass(
    input: &[u32],
    output: &mut [u32],
    width: usize,
    height: usize,
    radius: usize,
    divide: &Divisor,
) {
    let last = width - 1;
    let inside = radius.min(last);

    for y in 0..height {
        let row = &input[y * width..(y + 1) * width];
        let mut sums = [0_usize; 4];

        // Window centered on x = 0: `radius` replicas of the left border,
        // columns 0..=inside, then replicas of the right border.
        add_weighted(&mut sums, row[0], radius);
        for &pixel in &row[..=inside] {
            add_channels(&mut sums, pixel);
        }
        add_weighted(&mut sums, row[last], radius - inside);

        let mut out_index = y;
        for x in 0..width {
            output[out_index] = argb(
                divide.divide(sums[0]),
                divide.divide(sums[1]),
                divide.divide(sums[2]),
                divide.divide(sums[3]),
            );

            // Slide the window one column right: x + radius + 1 enters,
            // x - radius leaves. Both indices replicate the border.
            let entering = row[x.saturating_add(radius + 1).min(last)];
            let leaving = row[x.saturating_sub(radius)];
            add_channels(&mut sums, entering);
            sub_channels(&mut sums, leaving);

            out_index += height;
        }
    }
}

fn add_channels(sums: &mut [usize; 4], pixel: u32) {
    add_weighted(sums, pixel, 1);
}

fn add_weighted(sums: &mut [usize; 4], pixel: u32, count: usize) {
    sums[0] += alpha(pixel) as usize * count;
    sums[1] += red(pixel) as usize * count;
    sums[2] += green(pixel) as usize * count;
    sums[3] += blue(pixel) as usize * count;
}

fn sub_channels(sums: &mut [usize; 4], pixel: u32) {
    sums[0] -= alpha(pixel) as usize;
    sums[1] -= red(pixel) as usize;
    sums[2] -= green(pixel) as usize;
    sums[3] -= blue(pixel) as usize;
}
