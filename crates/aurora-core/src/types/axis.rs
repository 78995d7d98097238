//! Signed coordinate axis

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::BasisError;

/// A signed coordinate axis, written `X`, `-Z`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Axis {
    X,
    Y,
    Z,
    NegX,
    NegY,
    NegZ,
}

impl Axis {
    /// Unit vector pointing along this axis
    pub fn unit(&self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
            Axis::NegX => DVec3::NEG_X,
            Axis::NegY => DVec3::NEG_Y,
            Axis::NegZ => DVec3::NEG_Z,
        }
    }

    /// Component index (0 = X, 1 = Y, 2 = Z), ignoring the sign
    pub fn index(&self) -> usize {
        match self {
            Axis::X | Axis::NegX => 0,
            Axis::Y | Axis::NegY => 1,
            Axis::Z | Axis::NegZ => 2,
        }
    }

    /// Check whether two axes lie on the same line
    pub fn is_collinear(&self, other: Axis) -> bool {
        self.index() == other.index()
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
            Axis::NegX => "-X",
            Axis::NegY => "-Y",
            Axis::NegZ => "-Z",
        }
    }

    /// All axes
    pub fn all() -> &'static [Axis] {
        &[
            Axis::X,
            Axis::Y,
            Axis::Z,
            Axis::NegX,
            Axis::NegY,
            Axis::NegZ,
        ]
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = BasisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" | "+X" => Ok(Axis::X),
            "Y" | "+Y" => Ok(Axis::Y),
            "Z" | "+Z" => Ok(Axis::Z),
            "-X" => Ok(Axis::NegX),
            "-Y" => Ok(Axis::NegY),
            "-Z" => Ok(Axis::NegZ),
            _ => Err(BasisError::UnknownAxis(s.to_string())),
        }
    }
}

impl TryFrom<String> for Axis {
    type Error = BasisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Axis> for String {
    fn from(axis: Axis) -> Self {
        axis.name().to_string()
    }
}
