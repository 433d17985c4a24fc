//! Keplerian element sets, state vectors, and the conversions between them.

use kerbol_core::matrix;
use kerbol_core::units::wrap_two_pi;
use kerbol_core::vector::{self, Vector3};
use serde::{Deserialize, Serialize};

use crate::{OrbitError, anomaly, check_mu};

/// Eccentricities below this are treated as circular when recovering angles.
const CIRCULAR_EPSILON: f64 = 1e-11;
/// Node-vector magnitude (relative to `|h|`) below which an orbit is treated as equatorial.
const EQUATORIAL_EPSILON: f64 = 1e-11;

/// Position, velocity and epoch of a body or spacecraft.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub position: Vector3,
    pub velocity: Vector3,
    /// Epoch in seconds of universal time.
    pub time: f64,
}

impl StateVector {
    /// Zero position and velocity at `time`.
    pub fn zero(time: f64) -> Self {
        Self {
            position: vector::ZERO,
            velocity: vector::ZERO,
            time,
        }
    }

    /// Component-wise sum, keeping the epoch of `self`.
    pub fn offset_by(&self, other: &StateVector) -> StateVector {
        StateVector {
            position: vector::add(&self.position, &other.position),
            velocity: vector::add(&self.velocity, &other.velocity),
            time: self.time,
        }
    }

    /// Component-wise difference, keeping the epoch of `self`.
    pub fn relative_to(&self, origin: &StateVector) -> StateVector {
        StateVector {
            position: vector::sub(&self.position, &origin.position),
            velocity: vector::sub(&self.velocity, &origin.velocity),
            time: self.time,
        }
    }
}

/// Classical orbital elements with true anomaly at `epoch`.
///
/// `semi_major_axis` is negative for hyperbolic orbits. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeplerianElements {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub longitude_of_ascending_node: f64,
    pub argument_of_periapsis: f64,
    pub true_anomaly: f64,
    pub epoch: f64,
}

impl KeplerianElements {
    pub fn is_elliptical(&self) -> bool {
        self.eccentricity < 1.0 && self.semi_major_axis > 0.0
    }

    pub fn is_hyperbolic(&self) -> bool {
        self.eccentricity > 1.0 && self.semi_major_axis < 0.0
    }

    /// Semi-latus rectum `a (1 - e²)`.
    pub fn semi_latus_rectum(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity)
    }

    pub fn periapsis_radius(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    /// Same orbit, different position along it.
    pub fn with_true_anomaly(&self, true_anomaly: f64) -> Self {
        Self {
            true_anomaly,
            ..*self
        }
    }
}

/// Orbital elements of a fixed body, expressed with mean anomaly at epoch 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetaryKeplerianElements {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub longitude_of_ascending_node: f64,
    pub argument_of_periapsis: f64,
    pub mean_anomaly_at_epoch: f64,
}

impl PlanetaryKeplerianElements {
    /// Mean motion `√(μ / a³)` around a parent with gravitational parameter `mu`.
    pub fn mean_motion(&self, mu: f64) -> f64 {
        (mu / self.semi_major_axis.powi(3)).sqrt()
    }

    /// True-anomaly elements at universal time `t`, solving Kepler's equation.
    pub fn at_time(&self, t: f64, mu: f64) -> KeplerianElements {
        let mean_anomaly = self.mean_anomaly_at_epoch + self.mean_motion(mu) * t;
        let true_anomaly = anomaly::true_from_mean(mean_anomaly, self.eccentricity);
        KeplerianElements {
            semi_major_axis: self.semi_major_axis,
            eccentricity: self.eccentricity,
            inclination: self.inclination,
            longitude_of_ascending_node: self.longitude_of_ascending_node,
            argument_of_periapsis: self.argument_of_periapsis,
            true_anomaly: wrap_two_pi(true_anomaly),
            epoch: t,
        }
    }
}

/// Recover classical elements from a position/velocity pair around a body with `mu`.
///
/// Circular orbits report `argument_of_periapsis = 0` and measure true anomaly from the
/// ascending node; equatorial orbits report `longitude_of_ascending_node = 0` and measure
/// from the reference x axis.
pub fn elements_from_state_vector(
    state: &StateVector,
    mu: f64,
) -> Result<KeplerianElements, OrbitError> {
    check_mu(mu)?;

    let r_vec = &state.position;
    let v_vec = &state.velocity;
    let r = vector::norm(r_vec);
    let v = vector::norm(v_vec);

    let h = vector::cross(r_vec, v_vec);
    let h_norm = vector::norm(&h);
    if r == 0.0 || h_norm == 0.0 {
        return Err(OrbitError::DegenerateState);
    }

    // e = (v × h) / μ - r̂
    let e_vec = vector::sub(
        &vector::scale(&vector::cross(v_vec, &h), 1.0 / mu),
        &vector::scale(r_vec, 1.0 / r),
    );
    let e = vector::norm(&e_vec);

    // vis-viva; negative for hyperbolic trajectories
    let energy = 0.5 * v * v - mu / r;
    let a = -mu / (2.0 * energy);

    let i = (h[2] / h_norm).clamp(-1.0, 1.0).acos();

    let node = [-h[1], h[0], 0.0];
    let node_norm = vector::norm(&node);
    let equatorial = node_norm < EQUATORIAL_EPSILON * h_norm;
    let circular = e < CIRCULAR_EPSILON;
    let retrograde = h[2] < 0.0;

    let raan = if equatorial {
        0.0
    } else {
        wrap_two_pi(node[1].atan2(node[0]))
    };

    let aop = if circular {
        0.0
    } else if equatorial {
        let longitude = wrap_two_pi(e_vec[1].atan2(e_vec[0]));
        if retrograde {
            wrap_two_pi(-longitude)
        } else {
            longitude
        }
    } else {
        let mut omega = (vector::dot(&node, &e_vec) / (node_norm * e))
            .clamp(-1.0, 1.0)
            .acos();
        if e_vec[2] < 0.0 {
            omega = std::f64::consts::TAU - omega;
        }
        omega
    };

    let nu = if !circular {
        let mut nu = (vector::dot(&e_vec, r_vec) / (e * r)).clamp(-1.0, 1.0).acos();
        if vector::dot(r_vec, v_vec) < 0.0 {
            nu = std::f64::consts::TAU - nu;
        }
        nu
    } else if !equatorial {
        // argument of latitude
        let mut u = (vector::dot(&node, r_vec) / (node_norm * r))
            .clamp(-1.0, 1.0)
            .acos();
        if r_vec[2] < 0.0 {
            u = std::f64::consts::TAU - u;
        }
        u
    } else {
        let longitude = wrap_two_pi(r_vec[1].atan2(r_vec[0]));
        if retrograde {
            wrap_two_pi(-longitude)
        } else {
            longitude
        }
    };

    Ok(KeplerianElements {
        semi_major_axis: a,
        eccentricity: e,
        inclination: i,
        longitude_of_ascending_node: raan,
        argument_of_periapsis: aop,
        true_anomaly: wrap_two_pi(nu),
        epoch: state.time,
    })
}

/// State vector on the orbit described by `elements` at true anomaly `theta`.
///
/// The returned epoch is the element epoch; `theta` only moves the point along the conic.
pub fn state_at_true_anomaly(elements: &KeplerianElements, mu: f64, theta: f64) -> StateVector {
    let e = elements.eccentricity;
    let p = elements.semi_latus_rectum();
    let (sin_t, cos_t) = theta.sin_cos();

    let r = p / (1.0 + e * cos_t);
    let speed_scale = (mu / p).sqrt();

    let perifocal_position = [r * cos_t, r * sin_t, 0.0];
    let perifocal_velocity = [-speed_scale * sin_t, speed_scale * (e + cos_t), 0.0];

    let rotation = matrix::perifocal_to_reference(
        elements.longitude_of_ascending_node,
        elements.inclination,
        elements.argument_of_periapsis,
    );

    StateVector {
        position: matrix::mul_vec(&rotation, &perifocal_position),
        velocity: matrix::mul_vec(&rotation, &perifocal_velocity),
        time: elements.epoch,
    }
}

/// State vector at the element set's own true anomaly and epoch.
pub fn state_vector_from_elements(elements: &KeplerianElements, mu: f64) -> StateVector {
    state_at_true_anomaly(elements, mu, elements.true_anomaly)
}
