use super::*;

pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic Hermite spline between `p0` and `p1` with tangents `m0`, `m1`, for `t` in `[0, 1]`.
pub fn hermite(p0: f32, p1: f32, m0: f32, m1: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let h1 = 2. * t3 - 3. * t2 + 1.;
    let h2 = -2. * t3 + 3. * t2;
    let h3 = t3 - 2. * t2 + t;
    let h4 = t3 - t2;
    h1 * p0 + h2 * p1 + h3 * m0 + h4 * m1
}

impl Track {
    fn smooth(&self, hermite: bool) -> bool {
        hermite && self.element_count() >= 3
    }

    fn leaving_slope(&self, kf: &Keyframe) -> f32 {
        if self.element_count() == 4 {
            kf.out_slope
        } else {
            kf.in_slope
        }
    }

    /// Value of the curve at `frame`.
    ///
    /// Hermite evaluation only applies to layouts that store slopes; tracks with one or two
    /// elements per key always interpolate linearly.
    pub fn evaluate(&self, frame: f32, hermite: bool) -> f32 {
        let mut keyframes = self.keyframes();
        let first = match keyframes.next() {
            Some(kf) => kf,
            None => return 0.,
        };
        if self.len() == 1 {
            return self.evaluate_single(first, frame, hermite);
        }

        if frame < first.frame {
            return first.value;
        }
        let mut prev = first;
        let mut next = None;
        for kf in keyframes {
            if kf.frame <= frame {
                prev = kf;
            } else {
                next = Some(kf);
                break;
            }
        }
        let next = match next {
            Some(kf) => kf,
            None => return prev.value,
        };

        let t = (frame - prev.frame) / (next.frame - prev.frame);
        if self.smooth(hermite) {
            self::hermite(prev.value, next.value, self.leaving_slope(prev), next.in_slope, t)
        } else {
            mix(prev.value, next.value, t)
        }
    }

    fn evaluate_single(&self, kf: &Keyframe, frame: f32, hermite: bool) -> f32 {
        if self.ty.single_key() == SingleKey::Hold || frame >= kf.frame || kf.frame <= 0. {
            return kf.value;
        }
        let t = (frame / kf.frame).max(0.);
        if self.smooth(hermite) {
            self::hermite(0., kf.value, 1., kf.in_slope, t)
        } else {
            mix(0., kf.value, t)
        }
    }
}
