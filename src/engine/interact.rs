//! "Use" key handling: doors, chests and levers.
//!
//! The facing ray is tried first; if it finds nothing usable inside the
//! reach, the 3×3 block around the player is scanned row by row.

use glam::IVec2;
use tracing::debug;

use crate::{
    engine::raycast::cast_probe,
    world::{GridMap, ObjectKind, ObjectState, Pose},
};

/// What an interaction did to the object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    DoorOpened,
    DoorClosed,
    /// Door is locked; nothing changed. Game code may [`GridMap::unlock`] it.
    Locked,
    ChestOpened,
    /// Chest lid was already up.
    ChestEmpty,
    LeverOn,
    LeverOff,
}

/// Result handed back to game code after a successful interaction.
#[derive(Clone, Debug, PartialEq)]
pub struct Interaction {
    pub symbol: char,
    pub cell: IVec2,
    pub outcome: Outcome,
    /// Object state after the change.
    pub state: ObjectState,
}

/// Try the facing ray, then the neighbourhood scan.
pub fn interact(map: &mut GridMap, pose: &Pose, range: f32) -> Option<Interaction> {
    let target = facing_target(map, pose, range).or_else(|| nearby_target(map, pose))?;
    let (cell, symbol) = target;

    let obj = map.object_mut(symbol)?;
    let outcome = apply(obj)?;
    let state = obj.clone();
    debug!(%symbol, x = cell.x, y = cell.y, ?outcome, "interaction");

    Some(Interaction {
        symbol,
        cell,
        outcome,
        state,
    })
}

fn facing_target(map: &GridMap, pose: &Pose, range: f32) -> Option<(IVec2, char)> {
    let hit = cast_probe(pose.pos, pose.angle(), map, range);
    if !hit.solid || hit.distance > range {
        return None;
    }
    let symbol = map.object_symbol_at(hit.map_x, hit.map_y)?;
    usable(map, symbol).then_some((IVec2::new(hit.map_x, hit.map_y), symbol))
}

fn nearby_target(map: &GridMap, pose: &Pose) -> Option<(IVec2, char)> {
    let (px, py) = GridMap::grid_of(pose.pos);
    (-1..=1)
        .flat_map(|dy| (-1..=1).map(move |dx| (px + dx, py + dy)))
        .find_map(|(gx, gy)| {
            let symbol = map.object_symbol_at(gx, gy)?;
            usable(map, symbol).then_some((IVec2::new(gx, gy), symbol))
        })
}

fn usable(map: &GridMap, symbol: char) -> bool {
    map.object(symbol).is_some_and(|o| {
        matches!(
            o.kind,
            ObjectKind::Door | ObjectKind::Chest | ObjectKind::Lever
        )
    })
}

fn apply(obj: &mut ObjectState) -> Option<Outcome> {
    let outcome = match obj.kind {
        ObjectKind::Door if obj.locked && !obj.open => Outcome::Locked,
        ObjectKind::Door => {
            obj.open = !obj.open;
            if obj.open {
                Outcome::DoorOpened
            } else {
                Outcome::DoorClosed
            }
        }
        ObjectKind::Chest if obj.opened => Outcome::ChestEmpty,
        ObjectKind::Chest => {
            obj.opened = true;
            Outcome::ChestOpened
        }
        ObjectKind::Lever => {
            obj.activated = !obj.activated;
            if obj.activated {
                Outcome::LeverOn
            } else {
                Outcome::LeverOff
            }
        }
        _ => return None,
    };
    Some(outcome)
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;
    use std::collections::HashMap;
    use std::f32::consts::PI;

    fn objects() -> HashMap<char, ObjectState> {
        HashMap::from([
            ('D', ObjectState::new(ObjectKind::Door)),
            ('C', ObjectState::new(ObjectKind::Chest)),
            ('L', ObjectState::new(ObjectKind::Lever)),
        ])
    }

    // door two cells east, chest far west, lever in the corner
    fn hall() -> GridMap {
        GridMap::from_rows(
            &[
                "WWWWWWWWW",
                "WC....D.W",
                "W.......W",
                "W......LW",
                "WWWWWWWWW",
            ],
            objects(),
        )
        .unwrap()
    }

    #[test]
    fn facing_door_toggles() {
        let mut map = hall();
        let pose = Pose::new(vec2(4.5, 1.5), 0.0);
        let first = interact(&mut map, &pose, 2.5).unwrap();
        assert_eq!(first.outcome, Outcome::DoorOpened);
        assert_eq!(first.cell, IVec2::new(6, 1));
        assert!(map.is_door_open());
        let second = interact(&mut map, &pose, 2.5).unwrap();
        assert_eq!(second.outcome, Outcome::DoorClosed);
        assert!(!second.state.open);
    }

    #[test]
    fn out_of_reach_is_none() {
        let mut map = hall();
        let pose = Pose::new(vec2(3.5, 2.5), 0.0);
        assert!(interact(&mut map, &pose, 2.5).is_none());
        assert!(!map.is_door_open());
    }

    #[test]
    fn locked_door_stays_shut() {
        let mut map = hall();
        map.object_mut('D').unwrap().locked = true;
        let pose = Pose::new(vec2(5.5, 1.5), 0.0);
        let hit = interact(&mut map, &pose, 2.5).unwrap();
        assert_eq!(hit.outcome, Outcome::Locked);
        assert!(!map.is_door_open());

        assert!(map.unlock('D'));
        let hit = interact(&mut map, &pose, 2.5).unwrap();
        assert_eq!(hit.outcome, Outcome::DoorOpened);
    }

    #[test]
    fn chest_opens_once() {
        let mut map = hall();
        let pose = Pose::new(vec2(3.5, 1.5), PI);
        assert_eq!(
            interact(&mut map, &pose, 2.5).unwrap().outcome,
            Outcome::ChestOpened
        );
        assert!(map.object('C').unwrap().opened);
        assert_eq!(
            interact(&mut map, &pose, 2.5).unwrap().outcome,
            Outcome::ChestEmpty
        );
    }

    #[test]
    fn neighbour_scan_finds_lever_off_ray() {
        let mut map = hall();
        // nothing ahead; the scan reaches the door row before the lever row
        let pose = Pose::new(vec2(6.5, 2.5), PI);
        let hit = interact(&mut map, &pose, 2.5).unwrap();
        assert_eq!(hit.symbol, 'D');

        let pose = Pose::new(vec2(6.5, 3.5), PI);
        let hit = interact(&mut map, &pose, 2.5).unwrap();
        assert_eq!(hit.symbol, 'L');
        assert_eq!(hit.outcome, Outcome::LeverOn);
        assert!(map.object('L').unwrap().activated);
    }
}
