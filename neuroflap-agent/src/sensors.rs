//! Sensor derivation: from raw obstacles to the four
//! normalized network inputs.

use crate::config::{SensorConfig, Viewport};
use crate::state::{Obstacle, Position};

use neuroflap::SENSOR_COUNT;

use std::cmp::Ordering;

/// A top and a bottom obstacle standing at (nearly)
/// the same x, and the gap they leave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstaclePair {
    /// X of the top obstacle.
    pub x: f32,
    pub top_y: f32,
    pub bottom_y: f32,
    /// Y halfway between the top obstacle's lower edge
    /// and the bottom obstacle's upper edge.
    pub gap_center: f32,
    pub width: f32,
}

/// Pairs every top obstacle with the first bottom obstacle
/// whose x differs by less than `tolerance`. Top obstacles
/// without a partner, and obstacles with non-finite fields,
/// are left out.
///
/// # Examples
/// ```
/// use neuroflap_agent::sensors::pair_obstacles;
/// use neuroflap_agent::state::{Obstacle, Position};
///
/// let obstacles = vec![
///     Obstacle { position: Position::new(205.0, 600.0), is_top: false, height: 400.0, width: 50.0 },
///     Obstacle { position: Position::new(200.0, 100.0), is_top: true, height: 200.0, width: 50.0 },
/// ];
/// let pairs = pair_obstacles(&obstacles, 20.0);
///
/// assert_eq!(pairs.len(), 1);
/// // Gap spans from 200 (top's lower edge) to 400 (bottom's upper edge).
/// assert_eq!(pairs[0].gap_center, 300.0);
/// assert_eq!(pairs[0].x, 200.0);
/// ```
pub fn pair_obstacles(obstacles: &[Obstacle], tolerance: f32) -> Vec<ObstaclePair> {
    let valid = || obstacles.iter().filter(|o| o.is_finite());

    valid()
        .filter(|o| o.is_top)
        .filter_map(|top| {
            valid()
                .find(|o| !o.is_top && (o.position.x - top.position.x).abs() < tolerance)
                .map(|bottom| {
                    let (gap_top, gap_bottom) = (top.lower_edge(), bottom.upper_edge());
                    ObstaclePair {
                        x: top.position.x,
                        top_y: top.position.y,
                        bottom_y: bottom.position.y,
                        gap_center: gap_top + (gap_bottom - gap_top) / 2.0,
                        width: top.width,
                    }
                })
        })
        .collect()
}

/// Returns the nearest pair not yet left behind: the one
/// with the smallest x among those with
/// `x > actor_x - look_behind`.
pub fn next_pair(pairs: &[ObstaclePair], actor_x: f32, look_behind: f32) -> Option<ObstaclePair> {
    pairs
        .iter()
        .filter(|p| p.x > actor_x - look_behind)
        .min_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
        .copied()
}

/// Pairs the obstacles and picks the one to steer through.
pub fn resolve_target(
    obstacles: &[Obstacle],
    actor_x: f32,
    config: &SensorConfig,
) -> Option<ObstaclePair> {
    next_pair(
        &pair_obstacles(obstacles, config.pairing_tolerance),
        actor_x,
        config.look_behind,
    )
}

/// Returns the network inputs, in order:
/// actor height, horizontal distance to the pair, gap
/// height, and signed offset from the actor to the gap,
/// each normalized by the matching viewport dimension.
///
/// # Examples
/// ```
/// use neuroflap_agent::config::Viewport;
/// use neuroflap_agent::sensors::{sensor_values, ObstaclePair};
/// use neuroflap_agent::state::Position;
///
/// let viewport = Viewport { width: 400.0, height: 800.0 };
/// let pair = ObstaclePair { x: 250.0, top_y: 100.0, bottom_y: 700.0, gap_center: 400.0, width: 50.0 };
///
/// let inputs = sensor_values(Position::new(50.0, 600.0), &pair, &viewport);
/// assert_eq!(inputs, [0.75, 0.5, 0.5, 0.25]);
/// ```
pub fn sensor_values(
    actor: Position,
    pair: &ObstaclePair,
    viewport: &Viewport,
) -> [f32; SENSOR_COUNT] {
    [
        actor.y / viewport.height,
        (pair.x - actor.x) / viewport.width,
        pair.gap_center / viewport.height,
        (actor.y - pair.gap_center) / viewport.height,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacle(x: f32, y: f32, is_top: bool) -> Obstacle {
        Obstacle {
            position: Position::new(x, y),
            is_top,
            height: 200.0,
            width: 50.0,
        }
    }

    fn pair_at(x: f32) -> ObstaclePair {
        ObstaclePair {
            x,
            top_y: 0.0,
            bottom_y: 0.0,
            gap_center: 0.0,
            width: 0.0,
        }
    }

    #[test]
    fn unmatched_obstacles_are_dropped() {
        let obstacles = vec![
            obstacle(100.0, 100.0, true),
            obstacle(130.0, 700.0, false),
            obstacle(300.0, 100.0, true),
            obstacle(319.0, 700.0, false),
        ];
        let pairs = pair_obstacles(&obstacles, 20.0);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].x, 300.0);
        assert_eq!(pairs[0].bottom_y, 700.0);
        // 200 + (600 - 200) / 2
        assert_eq!(pairs[0].gap_center, 400.0);
    }

    #[test]
    fn tolerance_is_exclusive() {
        let obstacles = vec![obstacle(100.0, 100.0, true), obstacle(120.0, 700.0, false)];
        assert!(pair_obstacles(&obstacles, 20.0).is_empty());
        assert_eq!(pair_obstacles(&obstacles, 20.5).len(), 1);
    }

    #[test]
    fn non_finite_obstacles_are_ignored() {
        let mut broken = obstacle(100.0, 700.0, false);
        broken.height = f32::NAN;
        let obstacles = vec![obstacle(100.0, 100.0, true), broken];
        assert!(pair_obstacles(&obstacles, 20.0).is_empty());
    }

    #[test]
    fn next_pair_looks_slightly_behind() {
        let pairs = [pair_at(400.0), pair_at(75.0), pair_at(60.0), pair_at(250.0)];
        // Actor at 100: pairs past 70 still count.
        assert_eq!(next_pair(&pairs, 100.0, 30.0).unwrap().x, 75.0);
        assert_eq!(next_pair(&pairs, 300.0, 30.0).unwrap().x, 400.0);
        assert!(next_pair(&pairs, 500.0, 30.0).is_none());
        assert!(next_pair(&[], 0.0, 30.0).is_none());
    }

    #[test]
    fn resolve_target_uses_config() {
        let obstacles = vec![
            obstacle(40.0, 100.0, true),
            obstacle(40.0, 700.0, false),
            obstacle(240.0, 100.0, true),
            obstacle(240.0, 700.0, false),
        ];
        let config = SensorConfig::default();
        assert_eq!(resolve_target(&obstacles, 60.0, &config).unwrap().x, 40.0);
        assert_eq!(resolve_target(&obstacles, 80.0, &config).unwrap().x, 240.0);
    }
}
