use crate::rng::hash2;

#[inline]
fn smootherstep(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// 2D gradient noise (Perlin-style), roughly in [-1, 1].
#[inline]
pub fn gradient_noise(x: f32, y: f32, seed: u32) -> f32 {
    let ix = x.floor() as i32;
    let iy = y.floor() as i32;
    let fx = x - ix as f32;
    let fy = y - iy as f32;
    let sx = smootherstep(fx);
    let sy = smootherstep(fy);

    #[inline]
    fn grad(hash: u32, dx: f32, dy: f32) -> f32 {
        // 16 evenly-spaced unit gradients (every 22.5°).
        match hash & 15 {
            0  =>  dx,
            1  =>  0.924 * dx + 0.383 * dy,
            2  =>  0.707 * (dx + dy),
            3  =>  0.383 * dx + 0.924 * dy,
            4  =>  dy,
            5  => -0.383 * dx + 0.924 * dy,
            6  =>  0.707 * (-dx + dy),
            7  => -0.924 * dx + 0.383 * dy,
            8  => -dx,
            9  => -0.924 * dx - 0.383 * dy,
            10 =>  0.707 * (-dx - dy),
            11 => -0.383 * dx - 0.924 * dy,
            12 => -dy,
            13 =>  0.383 * dx - 0.924 * dy,
            14 =>  0.707 * (dx - dy),
            _  =>  0.924 * dx - 0.383 * dy,
        }
    }

    let v00 = grad(hash2(ix, iy, seed), fx, fy);
    let v10 = grad(hash2(ix + 1, iy, seed), fx - 1.0, fy);
    let v01 = grad(hash2(ix, iy + 1, seed), fx, fy - 1.0);
    let v11 = grad(hash2(ix + 1, iy + 1, seed), fx - 1.0, fy - 1.0);

    let a = lerp(v00, v10, sx);
    let b = lerp(v01, v11, sx);
    // Scale to approximately [-1, 1] range (raw range is ~[-0.7, 0.7])
    lerp(a, b, sy) * 1.414
}

/// One layer of a weighted octave stack.
#[derive(Clone, Copy, Debug)]
pub struct Octave {
    pub freq: f32,
    pub weight: f32,
}

/// Weighted sum of octaves at fixed frequencies, clamped to [-1, 1].
/// Each octave gets its own seed so coincident lattice points do not line up.
pub fn octave_sum(x: f32, y: f32, seed: u32, octaves: &[Octave]) -> f32 {
    octaves
        .iter()
        .enumerate()
        .map(|(i, o)| o.weight * gradient_noise(x * o.freq, y * o.freq, seed.wrapping_add(i as u32)))
        .sum::<f32>()
        .clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_deterministic_and_bounded() {
        for i in 0..200 {
            let x = i as f32 * 0.137;
            let y = i as f32 * 0.291;
            let a = gradient_noise(x, y, 11);
            assert_eq!(a, gradient_noise(x, y, 11));
            assert!((-1.5..=1.5).contains(&a));
        }
    }

    #[test]
    fn octave_sum_is_clamped() {
        let octaves = [Octave { freq: 1.0, weight: 5.0 }];
        for i in 0..100 {
            let v = octave_sum(i as f32 * 0.31, 0.77, 3, &octaves);
            assert!((-1.0..=1.0).contains(&v));
        }
    }
}
