use glam::{Quat, Vec3, Vec4};

/// Interpolation parameters derived once from a shared time axis `T` and a
/// query `time` (spec §4.I). `i` is the largest index with `T[i] <= time`;
/// `clamp` is set once `i` is the last index, in which case the sampler
/// simply returns its last value regardless of `t`/`h*`.
#[derive(Debug, Clone, Copy)]
pub struct InterpolationParams {
    pub i: usize,
    pub clamp: bool,
    pub t: f32,
    pub t_inv: f32,
    pub h00: f32,
    pub h10: f32,
    pub h01: f32,
    pub h11: f32,
}

impl InterpolationParams {
    /// `times` must be sorted and non-empty.
    pub fn new(times: &[f32], time: f32) -> InterpolationParams {
        debug_assert!(!times.is_empty());

        let i = find(times, time);
        if i + 1 == times.len() {
            return InterpolationParams {
                i,
                clamp: true,
                t: 0.0,
                t_inv: 1.0,
                h00: 0.0,
                h10: 0.0,
                h01: 0.0,
                h11: 0.0,
            };
        }

        let (t0, t1) = (times[i], times[i + 1]);
        // Clamp into [0, 1]: `i` is the largest index with `times[i] <= time`,
        // so `t` is only ever negative when `time` is below the first key
        // (`i == 0`). Spec §8 requires `time <= T[0]` to return key 0
        // untouched, not an extrapolated value below it.
        let t = if t1 > t0 { ((time - t0) / (t1 - t0)).clamp(0.0, 1.0) } else { 0.0 };
        let t2 = t * t;
        let t3 = t2 * t;

        InterpolationParams {
            i,
            clamp: false,
            t,
            t_inv: 1.0 - t,
            h00: 2.0 * t3 - 3.0 * t2 + 1.0,
            h10: t3 - 2.0 * t2 + t,
            h01: -2.0 * t3 + 3.0 * t2,
            h11: t3 - t2,
        }
    }
}

/// Largest `i` with `times[i] <= time`, clamped to `times.len() - 1` (spec
/// §4.I "find"). `partition_point` finds the first index where the
/// predicate is false, which is one past the answer we want.
fn find(times: &[f32], time: f32) -> usize {
    let first_after = times.partition_point(|&t| t <= time);
    first_after.saturating_sub(1).min(times.len() - 1)
}

/// Spherical interpolation using the angle-sum formulation of spec §4.I,
/// deliberately *not* glam's `Quat::slerp`: the original engine never
/// flips `b` to take the shorter arc when `dot(a, b) < 0`, so neither does
/// this (see `SPEC_FULL.md`'s open question log). Two samplers fed the
/// same keyframe data but differing only in the sign of one quaternion key
/// will therefore interpolate differently here than they would through a
/// shortest-arc implementation.
pub fn slerp_no_flip(a: Quat, b: Quat, t: f32) -> Quat {
    let dot = (a.x * b.x + a.y * b.y + a.z * b.z + a.w * b.w).clamp(-1.0, 1.0);
    let angle = dot.acos();
    if angle.abs() < 0.0001 {
        return a;
    }
    let inv_sin = 1.0 / angle.sin();
    let factor_a = ((1.0 - t) * angle).sin() * inv_sin;
    let factor_b = (t * angle).sin() * inv_sin;
    Quat::from_xyzw(
        a.x * factor_a + b.x * factor_b,
        a.y * factor_a + b.y * factor_b,
        a.z * factor_a + b.z * factor_b,
        a.w * factor_a + b.w * factor_b,
    )
}

/// A CUBICSPLINE keyframe's three consecutive output values (spec §4.I).
#[derive(Debug, Clone, Copy)]
pub struct CubicKey<T> {
    pub in_tangent: T,
    pub value: T,
    pub out_tangent: T,
}

/// One sampler's decoded output stream, already typed to its declared
/// vector width and interpolation mode (spec §4.I). `Sampler` is built once
/// per glTF `AnimationSampler` and evaluated against an
/// [`InterpolationParams`] computed from its (possibly shared) input axis.
#[derive(Debug, Clone)]
pub enum Sampler {
    Step3(Vec<Vec3>),
    Step4(Vec<Vec4>),
    Linear3(Vec<Vec3>),
    LinearRotation(Vec<Quat>),
    Cubic3(Vec<CubicKey<Vec3>>),
    CubicRotation(Vec<CubicKey<Quat>>),
}

impl Sampler {
    pub fn eval_vec3(&self, params: &InterpolationParams) -> Option<Vec3> {
        match self {
            Sampler::Step3(values) => Some(values[params.i]),
            Sampler::Linear3(values) => {
                if params.clamp {
                    Some(values[params.i])
                } else {
                    Some(values[params.i] * params.t_inv + values[params.i + 1] * params.t)
                }
            }
            Sampler::Cubic3(keys) => {
                if params.clamp {
                    Some(keys[params.i].value)
                } else {
                    let s0 = &keys[params.i];
                    let s1 = &keys[params.i + 1];
                    Some(
                        s0.value * params.h00
                            + s0.out_tangent * params.h10
                            + s1.value * params.h01
                            + s1.in_tangent * params.h11,
                    )
                }
            }
            Sampler::Step4(_) | Sampler::LinearRotation(_) | Sampler::CubicRotation(_) => None,
        }
    }

    pub fn eval_rotation(&self, params: &InterpolationParams) -> Option<Quat> {
        match self {
            Sampler::Step4(values) => {
                let v = values[params.i];
                Some(Quat::from_xyzw(v.x, v.y, v.z, v.w))
            }
            Sampler::LinearRotation(values) => {
                if params.clamp {
                    Some(values[params.i])
                } else {
                    Some(slerp_no_flip(values[params.i], values[params.i + 1], params.t))
                }
            }
            Sampler::CubicRotation(keys) => {
                if params.clamp {
                    Some(keys[params.i].value)
                } else {
                    let s0 = &keys[params.i];
                    let s1 = &keys[params.i + 1];
                    let v = s0.value * params.h00
                        + s0.out_tangent * params.h10
                        + s1.value * params.h01
                        + s1.in_tangent * params.h11;
                    Some(v)
                }
            }
            Sampler::Step3(_) | Sampler::Linear3(_) | Sampler::Cubic3(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn find_clamps_to_last_index_past_the_end() {
        let times = [0.0, 1.0, 2.0];
        let params = InterpolationParams::new(&times, 10.0);
        assert_eq!(params.i, 2);
        assert!(params.clamp);
    }

    #[test]
    fn find_picks_largest_index_not_exceeding_time() {
        let times = [0.0, 1.0, 2.0, 3.0];
        let params = InterpolationParams::new(&times, 1.5);
        assert_eq!(params.i, 1);
        assert!((params.t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn time_before_first_key_returns_key_zero_without_extrapolating() {
        let times = [1.0, 2.0, 3.0];
        let params = InterpolationParams::new(&times, 0.0);
        assert_eq!(params.i, 0);
        assert_eq!(params.t, 0.0);

        let sampler = Sampler::Linear3(vec![Vec3::new(5.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO]);
        assert_eq!(sampler.eval_vec3(&params), Some(Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn step_sampler_returns_left_key_unconditionally() {
        let sampler = Sampler::Step3(vec![Vec3::X, Vec3::Y, Vec3::Z]);
        let times = [0.0, 1.0, 2.0];
        let params = InterpolationParams::new(&times, 0.9);
        assert_eq!(sampler.eval_vec3(&params), Some(Vec3::X));
    }

    #[test]
    fn linear_sampler_interpolates_halfway() {
        let sampler = Sampler::Linear3(vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)]);
        let times = [0.0, 1.0];
        let params = InterpolationParams::new(&times, 0.5);
        assert_eq!(sampler.eval_vec3(&params), Some(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn slerp_no_flip_takes_the_long_way_when_dot_is_negative() {
        let a = Quat::IDENTITY;
        let b = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2 * 3.0).normalize();
        // dot(a, b) < 0 here; a shortest-arc slerp would negate b first and
        // sweep the short way, this formulation sweeps the long way round
        // instead, so the midpoint differs from glam's own `Quat::slerp`.
        let ours = slerp_no_flip(a, b, 0.5);
        let shortest_arc = a.slerp(b, 0.5);
        assert!(ours.dot(shortest_arc).abs() < 0.999);
    }
}
