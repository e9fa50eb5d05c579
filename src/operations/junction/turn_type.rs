use crate::math::normalize_angle;
use crate::topology::TurnType;

use super::JunctionParams;

/// Classifies the maneuver from an entry heading to an exit heading, both
/// in the direction of travel.
///
/// Heading changes within `straight_angle` are straight, beyond
/// `u_turn_angle` are U-turns; otherwise the sign picks left (positive,
/// counter-clockwise) or right.
#[must_use]
pub fn determine_turn_type(entry_heading: f64, exit_heading: f64, params: &JunctionParams) -> TurnType {
    let delta = normalize_angle(exit_heading - entry_heading);
    if delta.abs() < params.straight_angle {
        TurnType::Straight
    } else if delta.abs() > params.u_turn_angle {
        TurnType::UTurn
    } else if delta > 0.0 {
        TurnType::Left
    } else {
        TurnType::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn classifies_by_heading_change() {
        let params = JunctionParams::default();
        assert_eq!(determine_turn_type(0.0, 0.2, &params), TurnType::Straight);
        assert_eq!(determine_turn_type(0.0, FRAC_PI_2, &params), TurnType::Left);
        assert_eq!(determine_turn_type(0.0, -FRAC_PI_2, &params), TurnType::Right);
        assert_eq!(determine_turn_type(0.0, PI, &params), TurnType::UTurn);
        // Wraps across ±π.
        assert_eq!(determine_turn_type(3.0, -3.0, &params), TurnType::Straight);
        assert_eq!(determine_turn_type(PI, -FRAC_PI_2, &params), TurnType::Left);
    }
}
