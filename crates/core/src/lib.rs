//! Core units, constants, and shared primitives for the Kerbol trajectory workspace.

pub mod stumpff;

/// Physical and calendar constants expressed in SI units.
pub mod constants {
    /// Seconds in a Kerbin solar day (6 hours).
    pub const KERBIN_DAY_S: f64 = 21_600.0;
    /// Full turn in radians.
    pub const TAU: f64 = std::f64::consts::TAU;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Convert degrees to radians.
    #[inline]
    pub fn deg_to_rad(v: f64) -> f64 {
        v * std::f64::consts::PI / 180.0
    }

    /// Wrap an angle into `[0, 2π)`.
    #[inline]
    pub fn wrap_two_pi(angle: f64) -> f64 {
        let wrapped = angle.rem_euclid(super::constants::TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if wrapped >= super::constants::TAU {
            0.0
        } else {
            wrapped
        }
    }
}

/// Lightweight time utilities based on the Kerbin calendar.
pub mod time {
    use super::constants::KERBIN_DAY_S;

    /// Convert seconds to Kerbin days.
    #[inline]
    pub fn seconds_to_days(seconds: f64) -> f64 {
        seconds / KERBIN_DAY_S
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in metres or m/s depending on context.
    pub type Vector3 = [f64; 3];

    /// Norms below this are treated as zero by [`normalize`].
    pub const NORMALIZE_EPSILON: f64 = 1e-12;

    /// The zero vector.
    pub const ZERO: Vector3 = [0.0; 3];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Right-handed cross product `a × b`.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Unit vector in the direction of `v`.
    ///
    /// Returns the zero vector when `|v| < NORMALIZE_EPSILON` instead of dividing by zero.
    #[inline]
    pub fn normalize(v: &Vector3) -> Vector3 {
        let n = norm(v);
        if n < NORMALIZE_EPSILON {
            ZERO
        } else {
            scale(v, 1.0 / n)
        }
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Angle between two vectors in `[0, π]`, clamped against rounding.
    pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
        let denom = norm(a) * norm(b);
        if denom < NORMALIZE_EPSILON {
            return 0.0;
        }
        (dot(a, b) / denom).clamp(-1.0, 1.0).acos()
    }
}

/// Row-major 3×3 matrices and the rotations used to orient orbital planes.
pub mod matrix {
    use super::vector::Vector3;

    pub type Matrix3 = [[f64; 3]; 3];

    /// Rotation about the x axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Matrix3 {
        let (s, c) = angle.sin_cos();
        [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]]
    }

    /// Rotation about the z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Matrix3 {
        let (s, c) = angle.sin_cos();
        [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
    }

    pub fn mul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
        let mut out = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                out[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            }
        }
        out
    }

    pub fn mul_vec(m: &Matrix3, v: &Vector3) -> Vector3 {
        [
            m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
            m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
            m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
        ]
    }

    /// Direction-cosine matrix taking perifocal coordinates into the reference frame.
    ///
    /// Built from the 3-1-3 sequence `Rz(Ω) · Rx(i) · Rz(ω)`.
    pub fn perifocal_to_reference(
        longitude_of_ascending_node: f64,
        inclination: f64,
        argument_of_periapsis: f64,
    ) -> Matrix3 {
        let node = rotation_z(longitude_of_ascending_node);
        let tilt = rotation_x(inclination);
        let apsis = rotation_z(argument_of_periapsis);
        mul(&mul(&node, &tilt), &apsis)
    }
}
