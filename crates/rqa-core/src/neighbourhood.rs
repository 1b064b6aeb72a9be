//! Neighbourhood criteria deciding which vector pairs recur.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Default radius of [`Neighbourhood::FixedRadius`].
pub const DEFAULT_RADIUS: f32 = 1.0;

/// Default neighbour count of [`Neighbourhood::FixedAmount`].
pub const DEFAULT_NEIGHBOURS: usize = 5;

/// Criterion turning a distance into a recurrence decision.
///
/// Cell `(x, y)` of the recurrence matrix is set when vector `y` lies in the
/// neighbourhood of vector `x`:
///
/// ```text
/// FixedRadius     d(x, y) < radius
/// RadiusCorridor  inner_radius < d(x, y) < outer_radius
/// FixedAmount     y is one of the k nearest vectors of x, ranked by (distance, index)
/// ```
///
/// The radius based criteria are symmetric whenever the metric is. A fixed
/// amount of neighbours is not: `y` may be among the nearest of `x` while `x`
/// is not among the nearest of `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Neighbourhood {
    /// Fixed radius around each vector.
    FixedRadius {
        /// Exclusive upper bound on the distance.
        radius: f32,
    },
    /// Open shell between two radii.
    RadiusCorridor {
        /// Exclusive lower bound on the distance.
        inner_radius: f32,
        /// Exclusive upper bound on the distance.
        outer_radius: f32,
    },
    /// Fixed amount of nearest neighbours (FAN).
    FixedAmount {
        /// Number of neighbours per vector, the vector itself included.
        k: usize,
    },
}

impl Default for Neighbourhood {
    fn default() -> Self {
        Neighbourhood::FixedRadius {
            radius: DEFAULT_RADIUS,
        }
    }
}

impl Neighbourhood {
    /// Fixed radius neighbourhood.
    pub const fn fixed_radius(radius: f32) -> Self {
        Neighbourhood::FixedRadius { radius }
    }

    /// Radius corridor neighbourhood.
    pub const fn radius_corridor(inner_radius: f32, outer_radius: f32) -> Self {
        Neighbourhood::RadiusCorridor {
            inner_radius,
            outer_radius,
        }
    }

    /// Fixed amount of nearest neighbours.
    pub const fn fixed_amount(k: usize) -> Self {
        Neighbourhood::FixedAmount { k }
    }

    /// Whether membership depends on the distance alone.
    pub const fn is_radius_based(&self) -> bool {
        matches!(
            self,
            Neighbourhood::FixedRadius { .. } | Neighbourhood::RadiusCorridor { .. }
        )
    }

    /// Membership test for the radius based criteria.
    ///
    /// Returns `None` for [`Neighbourhood::FixedAmount`], whose membership
    /// depends on the rank of the distance rather than its value.
    #[inline]
    pub fn admits(&self, distance: f32) -> Option<bool> {
        match *self {
            Neighbourhood::FixedRadius { radius } => Some(distance < radius),
            Neighbourhood::RadiusCorridor {
                inner_radius,
                outer_radius,
            } => Some(inner_radius < distance && distance < outer_radius),
            Neighbourhood::FixedAmount { .. } => None,
        }
    }

    /// Validate the criterion parameters.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - a radius is not finite and positive
    /// - the corridor is empty or has a negative inner radius
    /// - `k` is zero
    pub fn validate(&self) -> CoreResult<()> {
        match *self {
            Neighbourhood::FixedRadius { radius } => {
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(CoreError::invalid_config(
                        "analysis.neighbourhood.radius",
                        radius,
                        "radius must be finite and greater than 0",
                    ));
                }
            }
            Neighbourhood::RadiusCorridor {
                inner_radius,
                outer_radius,
            } => {
                if !(inner_radius.is_finite() && inner_radius >= 0.0) {
                    return Err(CoreError::invalid_config(
                        "analysis.neighbourhood.inner_radius",
                        inner_radius,
                        "inner radius must be finite and non-negative",
                    ));
                }
                if !(outer_radius.is_finite() && outer_radius > inner_radius) {
                    return Err(CoreError::invalid_config(
                        "analysis.neighbourhood.outer_radius",
                        outer_radius,
                        format!("outer radius must be finite and greater than {inner_radius}"),
                    ));
                }
            }
            Neighbourhood::FixedAmount { k } => {
                if k == 0 {
                    return Err(CoreError::invalid_config(
                        "analysis.neighbourhood.k",
                        k,
                        "number of neighbours must be at least 1",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Neighbourhood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Neighbourhood::FixedRadius { radius } => {
                write!(f, "Fixed Radius (radius: {radius:.2})")
            }
            Neighbourhood::RadiusCorridor {
                inner_radius,
                outer_radius,
            } => write!(
                f,
                "Radius Corridor (inner radius: {inner_radius:.2}, outer radius: {outer_radius:.2})"
            ),
            Neighbourhood::FixedAmount { k } => {
                write!(f, "Fixed Amount of Nearest Neighbours (k: {k})")
            }
        }
    }
}
