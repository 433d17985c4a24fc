//! Closed set of Kerbol-system bodies and their physical and orbital constants.

use std::fmt;
use std::str::FromStr;

use kerbol_core::units::deg_to_rad;
use kerbol_orbits::PlanetaryKeplerianElements;
use serde::{Deserialize, Serialize};

use crate::EphemerisError;

/// Identifier of every body in the Kerbol system.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BodyId {
    Kerbol,
    Moho,
    Eve,
    Gilly,
    Kerbin,
    Mun,
    Minmus,
    Duna,
    Ike,
    Dres,
    Jool,
    Laythe,
    Vall,
    Tylo,
    Bop,
    Pol,
    Eeloo,
}

impl BodyId {
    /// Every identifier, in table order.
    pub const ALL: [BodyId; 17] = [
        BodyId::Kerbol,
        BodyId::Moho,
        BodyId::Eve,
        BodyId::Gilly,
        BodyId::Kerbin,
        BodyId::Mun,
        BodyId::Minmus,
        BodyId::Duna,
        BodyId::Ike,
        BodyId::Dres,
        BodyId::Jool,
        BodyId::Laythe,
        BodyId::Vall,
        BodyId::Tylo,
        BodyId::Bop,
        BodyId::Pol,
        BodyId::Eeloo,
    ];

    /// Display name, e.g. `"Kerbin"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Kerbol => "Kerbol",
            Self::Moho => "Moho",
            Self::Eve => "Eve",
            Self::Gilly => "Gilly",
            Self::Kerbin => "Kerbin",
            Self::Mun => "Mun",
            Self::Minmus => "Minmus",
            Self::Duna => "Duna",
            Self::Ike => "Ike",
            Self::Dres => "Dres",
            Self::Jool => "Jool",
            Self::Laythe => "Laythe",
            Self::Vall => "Vall",
            Self::Tylo => "Tylo",
            Self::Bop => "Bop",
            Self::Pol => "Pol",
            Self::Eeloo => "Eeloo",
        }
    }

    /// Position of this identifier in [`BodyId::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyId {
    type Err = EphemerisError;

    /// Case-insensitive lookup by display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        BodyId::ALL
            .into_iter()
            .find(|id| id.name().to_uppercase() == upper)
            .ok_or_else(|| EphemerisError::UnknownBody(s.to_string()))
    }
}

/// Physical and orbital constants of one body. Angles are radians, lengths metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    /// `None` for the root of the hierarchy.
    pub parent: Option<BodyId>,
    pub mass: f64,
    /// Gravitational parameter `G·M` in m³/s².
    pub mu: f64,
    pub radius: f64,
    /// Orbit around `parent`; `None` for the root.
    pub orbit: Option<PlanetaryKeplerianElements>,
    pub soi_radius: f64,
    /// Display colour as `0xRRGGBB`.
    pub colour: u32,
}

impl Body {
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    /// Display colour formatted as `#rrggbb`.
    pub fn colour_hex(&self) -> String {
        format!("#{:06x}", self.colour & 0x00ff_ffff)
    }
}

/// Raw table entry with angles in degrees.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BodyRecord {
    pub id: BodyId,
    pub parent: Option<BodyId>,
    pub mass: f64,
    pub mu: f64,
    pub radius: f64,
    pub orbit: Option<OrbitRecord>,
    pub soi_radius: f64,
    pub colour: u32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct OrbitRecord {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub longitude_of_ascending_node_deg: f64,
    pub argument_of_periapsis_deg: f64,
    pub mean_anomaly_at_epoch: f64,
}

impl BodyRecord {
    pub(crate) fn to_body(self) -> Body {
        Body {
            id: self.id,
            parent: self.parent,
            mass: self.mass,
            mu: self.mu,
            radius: self.radius,
            orbit: self.orbit.map(|o| PlanetaryKeplerianElements {
                semi_major_axis: o.semi_major_axis,
                eccentricity: o.eccentricity,
                inclination: deg_to_rad(o.inclination_deg),
                longitude_of_ascending_node: deg_to_rad(o.longitude_of_ascending_node_deg),
                argument_of_periapsis: deg_to_rad(o.argument_of_periapsis_deg),
                mean_anomaly_at_epoch: o.mean_anomaly_at_epoch,
            }),
            soi_radius: self.soi_radius,
            colour: self.colour,
        }
    }
}

const fn orbit(
    semi_major_axis: f64,
    eccentricity: f64,
    inclination_deg: f64,
    longitude_of_ascending_node_deg: f64,
    argument_of_periapsis_deg: f64,
    mean_anomaly_at_epoch: f64,
) -> Option<OrbitRecord> {
    Some(OrbitRecord {
        semi_major_axis,
        eccentricity,
        inclination_deg,
        longitude_of_ascending_node_deg,
        argument_of_periapsis_deg,
        mean_anomaly_at_epoch,
    })
}

/// Stock Kerbol system at universal time 0.
pub(crate) const BODY_TABLE: [BodyRecord; 17] = [
    BodyRecord {
        id: BodyId::Kerbol,
        parent: None,
        mass: 1.756_545_9e28,
        mu: 1.172_332_8e18,
        radius: 261_600_000.0,
        orbit: None,
        soi_radius: f64::INFINITY,
        colour: 0xfff2a1,
    },
    BodyRecord {
        id: BodyId::Moho,
        parent: Some(BodyId::Kerbol),
        mass: 2.526_331_4e21,
        mu: 1.686_093_8e11,
        radius: 250_000.0,
        orbit: orbit(5_263_138_304.0, 0.2, 7.0, 70.0, 15.0, 3.14),
        soi_radius: 9_646_663.0,
        colour: 0x8c6e5d,
    },
    BodyRecord {
        id: BodyId::Eve,
        parent: Some(BodyId::Kerbol),
        mass: 1.224_398_0e23,
        mu: 8.171_730_2e12,
        radius: 700_000.0,
        orbit: orbit(9_832_684_544.0, 0.01, 2.1, 150.0, 0.0, 3.14),
        soi_radius: 85_109_365.0,
        colour: 0x7a3fa0,
    },
    BodyRecord {
        id: BodyId::Gilly,
        parent: Some(BodyId::Eve),
        mass: 1.242_036_3e17,
        mu: 8_289_449.8,
        radius: 13_000.0,
        orbit: orbit(31_500_000.0, 0.55, 12.0, 80.0, 10.0, 0.9),
        soi_radius: 126_123.27,
        colour: 0x9e8b7b,
    },
    BodyRecord {
        id: BodyId::Kerbin,
        parent: Some(BodyId::Kerbol),
        mass: 5.291_515_8e22,
        mu: 3.531_6e12,
        radius: 600_000.0,
        orbit: orbit(13_599_840_256.0, 0.0, 0.0, 0.0, 0.0, 3.14),
        soi_radius: 84_159_286.0,
        colour: 0x3c7dd9,
    },
    BodyRecord {
        id: BodyId::Mun,
        parent: Some(BodyId::Kerbin),
        mass: 9.759_906_6e20,
        mu: 6.513_839_8e10,
        radius: 200_000.0,
        orbit: orbit(12_000_000.0, 0.0, 0.0, 0.0, 0.0, 1.7),
        soi_radius: 2_429_559.1,
        colour: 0xa0a0a0,
    },
    BodyRecord {
        id: BodyId::Minmus,
        parent: Some(BodyId::Kerbin),
        mass: 2.645_758_0e19,
        mu: 1.765_8e9,
        radius: 60_000.0,
        orbit: orbit(47_000_000.0, 0.0, 6.0, 78.0, 38.0, 0.9),
        soi_radius: 2_247_428.4,
        colour: 0xb8e6d0,
    },
    BodyRecord {
        id: BodyId::Duna,
        parent: Some(BodyId::Kerbol),
        mass: 4.515_427_0e21,
        mu: 3.013_632_1e11,
        radius: 320_000.0,
        orbit: orbit(20_726_155_264.0, 0.051, 0.06, 135.5, 0.0, 3.14),
        soi_radius: 47_921_949.0,
        colour: 0xc4552b,
    },
    BodyRecord {
        id: BodyId::Ike,
        parent: Some(BodyId::Duna),
        mass: 2.782_161_5e20,
        mu: 1.856_836_9e10,
        radius: 130_000.0,
        orbit: orbit(3_200_000.0, 0.03, 0.2, 0.0, 0.0, 1.7),
        soi_radius: 1_049_598.9,
        colour: 0x7d7d7d,
    },
    BodyRecord {
        id: BodyId::Dres,
        parent: Some(BodyId::Kerbol),
        mass: 3.219_093_7e20,
        mu: 2.148_448_9e10,
        radius: 138_000.0,
        orbit: orbit(40_839_348_203.0, 0.145, 5.0, 280.0, 90.0, 3.14),
        soi_radius: 32_832_840.0,
        colour: 0x9c948a,
    },
    BodyRecord {
        id: BodyId::Jool,
        parent: Some(BodyId::Kerbol),
        mass: 4.233_212_7e24,
        mu: 2.825_28e14,
        radius: 6_000_000.0,
        orbit: orbit(68_773_560_320.0, 0.05, 1.304, 52.0, 0.0, 0.1),
        soi_radius: 2.455_985_2e9,
        colour: 0x5e9e2f,
    },
    BodyRecord {
        id: BodyId::Laythe,
        parent: Some(BodyId::Jool),
        mass: 2.939_731_1e22,
        mu: 1.962e12,
        radius: 500_000.0,
        orbit: orbit(27_184_000.0, 0.0, 0.0, 0.0, 0.0, 3.14),
        soi_radius: 3_723_645.8,
        colour: 0x3a5f9e,
    },
    BodyRecord {
        id: BodyId::Vall,
        parent: Some(BodyId::Jool),
        mass: 3.108_765_5e21,
        mu: 2.074_815e11,
        radius: 300_000.0,
        orbit: orbit(43_152_000.0, 0.0, 0.0, 0.0, 0.0, 0.9),
        soi_radius: 2_406_401.4,
        colour: 0x9db4c7,
    },
    BodyRecord {
        id: BodyId::Tylo,
        parent: Some(BodyId::Jool),
        mass: 4.233_212_7e22,
        mu: 2.825_28e12,
        radius: 600_000.0,
        orbit: orbit(68_500_000.0, 0.0, 0.025, 0.0, 0.0, 3.14),
        soi_radius: 10_856_518.0,
        colour: 0xd9cfc1,
    },
    BodyRecord {
        id: BodyId::Bop,
        parent: Some(BodyId::Jool),
        mass: 3.726_109_0e19,
        mu: 2.486_834_9e9,
        radius: 65_000.0,
        orbit: orbit(128_500_000.0, 0.235, 15.0, 10.0, 25.0, 0.9),
        soi_radius: 1_221_060.9,
        colour: 0x7a5c3e,
    },
    BodyRecord {
        id: BodyId::Pol,
        parent: Some(BodyId::Jool),
        mass: 1.081_350_7e19,
        mu: 7.217_020_8e8,
        radius: 44_000.0,
        orbit: orbit(179_890_000.0, 0.171, 4.25, 2.0, 15.0, 0.9),
        soi_radius: 1_042_138.9,
        colour: 0xe0d48a,
    },
    BodyRecord {
        id: BodyId::Eeloo,
        parent: Some(BodyId::Kerbol),
        mass: 1.114_922_4e21,
        mu: 7.441_081_5e10,
        radius: 210_000.0,
        orbit: orbit(90_118_820_000.0, 0.26, 6.15, 50.0, 260.0, 3.14),
        soi_radius: 119_082_940.0,
        colour: 0xd8d8d0,
    },
];
