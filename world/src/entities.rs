//! Fixed-capacity entity array shared with the rest of the game.

use std::ops::Range;

use skyweave_core::{EnemySlot, EnemySnapshot, PathIndex, PoolIndex, ShipModel, Vec3};

/// Sub-range of the entity array reserved for one kind of entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Player ships.
    Players,
    /// Projectiles fired by players.
    PlayerShots,
    /// Projectiles fired by enemies.
    EnemyShots,
    /// Enemy ships written by the choreography engine.
    Enemies,
}

/// Capacities of the entity array partitions, laid out in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityLayout {
    players: usize,
    player_shots: usize,
    enemy_shots: usize,
    enemies: usize,
}

impl EntityLayout {
    /// Creates a layout from explicit partition capacities.
    #[must_use]
    pub const fn new(
        players: usize,
        player_shots: usize,
        enemy_shots: usize,
        enemies: usize,
    ) -> Self {
        Self {
            players,
            player_shots,
            enemy_shots,
            enemies,
        }
    }

    /// Total number of slots in the array.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.players + self.player_shots + self.enemy_shots + self.enemies
    }

    /// Absolute slot range covered by a partition.
    #[must_use]
    pub const fn range(&self, partition: Partition) -> Range<usize> {
        let player_shots = self.players;
        let enemy_shots = player_shots + self.player_shots;
        let enemies = enemy_shots + self.enemy_shots;
        match partition {
            Partition::Players => 0..player_shots,
            Partition::PlayerShots => player_shots..enemy_shots,
            Partition::EnemyShots => enemy_shots..enemies,
            Partition::Enemies => enemies..enemies + self.enemies,
        }
    }
}

impl Default for EntityLayout {
    fn default() -> Self {
        Self::new(2, 32, 64, 64)
    }
}

#[derive(Clone, Copy, Debug)]
struct Entity {
    alive: bool,
    position: Vec3,
    path: PathIndex,
    birth_time_s: f32,
    model: ShipModel,
}

impl Entity {
    const VACANT: Self = Self {
        alive: false,
        position: Vec3::ZERO,
        path: PathIndex::SENTINEL,
        birth_time_s: 0.0,
        model: ShipModel::Drone,
    };
}

/// Entity storage with a wrapping write cursor over the enemy partition.
#[derive(Debug)]
pub(crate) struct EntityArray {
    layout: EntityLayout,
    entities: Vec<Entity>,
    enemy_cursor: usize,
}

impl EntityArray {
    pub(crate) fn new(layout: EntityLayout) -> Self {
        Self {
            layout,
            entities: vec![Entity::VACANT; layout.capacity()],
            enemy_cursor: 0,
        }
    }

    pub(crate) const fn layout(&self) -> EntityLayout {
        self.layout
    }

    /// Writes an enemy at the cursor, overwriting whatever occupied the slot.
    pub(crate) fn spawn_enemy(
        &mut self,
        path: PathIndex,
        birth_time_s: f32,
        model: ShipModel,
        position: Vec3,
    ) -> Option<EnemySlot> {
        let range = self.layout.range(Partition::Enemies);
        if range.is_empty() {
            return None;
        }
        let slot = range.start + self.enemy_cursor;
        self.enemy_cursor = (self.enemy_cursor + 1) % range.len();
        let entity = self.entities.get_mut(slot)?;
        *entity = Entity {
            alive: true,
            position,
            path,
            birth_time_s,
            model,
        };
        Some(EnemySlot::new(slot))
    }

    pub(crate) fn move_enemy(&mut self, enemy: EnemySlot, position: Vec3) {
        if let Some(entity) = self.enemy_mut(enemy) {
            if entity.alive {
                entity.position = position;
            }
        }
    }

    /// Returns `true` when the enemy was alive before the call.
    pub(crate) fn retire_enemy(&mut self, enemy: EnemySlot) -> bool {
        match self.enemy_mut(enemy) {
            Some(entity) if entity.alive => {
                entity.alive = false;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn live_enemy_slots(&self) -> Vec<EnemySlot> {
        self.enemies()
            .filter(|(_, entity)| entity.alive)
            .map(|(slot, _)| slot)
            .collect()
    }

    pub(crate) fn enemies_following(&self, path: PathIndex) -> usize {
        self.enemies()
            .filter(|(_, entity)| entity.alive && entity.path == path)
            .count()
    }

    /// Shifts enemy path references after a path removal.
    pub(crate) fn repair_paths(&mut self, removed: PathIndex) {
        let range = self.layout.range(Partition::Enemies);
        for entity in self.entities[range].iter_mut() {
            entity.path = entity
                .path
                .repaired_after_removal(removed)
                .unwrap_or(PathIndex::SENTINEL);
        }
    }

    pub(crate) fn snapshots(&self) -> Vec<EnemySnapshot> {
        self.enemies()
            .filter(|(_, entity)| entity.alive)
            .map(|(slot, entity)| EnemySnapshot {
                slot,
                path: entity.path,
                birth_time_s: entity.birth_time_s,
                position: entity.position,
                model: entity.model,
            })
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.entities.fill(Entity::VACANT);
        self.enemy_cursor = 0;
    }

    fn enemies(&self) -> impl Iterator<Item = (EnemySlot, &Entity)> {
        let range = self.layout.range(Partition::Enemies);
        let start = range.start;
        self.entities[range]
            .iter()
            .enumerate()
            .map(move |(offset, entity)| (EnemySlot::new(start + offset), entity))
    }

    fn enemy_mut(&mut self, enemy: EnemySlot) -> Option<&mut Entity> {
        if self.layout.range(Partition::Enemies).contains(&enemy.get()) {
            self.entities.get_mut(enemy.get())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_are_contiguous_and_ordered() {
        let layout = EntityLayout::new(2, 4, 6, 8);
        assert_eq!(layout.range(Partition::Players), 0..2);
        assert_eq!(layout.range(Partition::PlayerShots), 2..6);
        assert_eq!(layout.range(Partition::EnemyShots), 6..12);
        assert_eq!(layout.range(Partition::Enemies), 12..20);
        assert_eq!(layout.capacity(), 20);
    }

    #[test]
    fn enemy_cursor_wraps_and_overwrites_oldest_slot() {
        let mut array = EntityArray::new(EntityLayout::new(1, 0, 0, 2));
        let first = array.spawn_enemy(PathIndex::new(1), 0.0, ShipModel::Drone, Vec3::ZERO);
        let second = array.spawn_enemy(PathIndex::new(2), 0.0, ShipModel::Drone, Vec3::ZERO);
        let third = array.spawn_enemy(PathIndex::new(3), 0.0, ShipModel::Bomber, Vec3::ONE);

        assert_eq!(first, Some(EnemySlot::new(1)));
        assert_eq!(second, Some(EnemySlot::new(2)));
        assert_eq!(third, first);

        let snapshots = array.snapshots();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].path, PathIndex::new(3));
        assert_eq!(snapshots[0].model, ShipModel::Bomber);
    }

    #[test]
    fn empty_enemy_partition_refuses_spawns() {
        let mut array = EntityArray::new(EntityLayout::new(2, 2, 2, 0));
        assert_eq!(
            array.spawn_enemy(PathIndex::SENTINEL, 0.0, ShipModel::Drone, Vec3::ZERO),
            None
        );
    }

    #[test]
    fn slots_outside_enemy_partition_are_ignored() {
        let mut array = EntityArray::new(EntityLayout::new(2, 0, 0, 2));
        assert!(!array.retire_enemy(EnemySlot::new(0)));
        array.move_enemy(EnemySlot::new(40), Vec3::ONE);
        assert!(array.live_enemy_slots().is_empty());
    }
}
