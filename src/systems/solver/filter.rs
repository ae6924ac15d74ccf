use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::EntityId;

/// Category / mask / group filter data of a fixture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionFilter {
    pub category_bits: u16,
    pub mask_bits: u16,
    /// Same positive group always collides, same negative group never does
    pub group_index: i16,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            category_bits: 0x0001,
            mask_bits: 0xFFFF,
            group_index: 0,
        }
    }
}

/// Everything the pair filter needs, stored in each collider's `user_data`.
///
/// Layout (low to high bits): entity id (32), category (16), mask (16),
/// group index (16), anti-collision group (32).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixtureTag {
    pub entity: EntityId,
    pub filter: CollisionFilter,
    pub anti_collision_group: u32,
}

impl FixtureTag {
    pub fn pack(&self) -> u128 {
        (self.entity.0 as u128)
            | (self.filter.category_bits as u128) << 32
            | (self.filter.mask_bits as u128) << 48
            | (self.filter.group_index as u16 as u128) << 64
            | (self.anti_collision_group as u128) << 80
    }

    pub fn unpack(data: u128) -> Self {
        Self {
            entity: EntityId(data as u32),
            filter: CollisionFilter {
                category_bits: (data >> 32) as u16,
                mask_bits: (data >> 48) as u16,
                group_index: (data >> 64) as u16 as i16,
            },
            anti_collision_group: (data >> 80) as u32,
        }
    }
}

/// Decide whether two fixtures may generate contacts.
///
/// A shared nonzero anti-collision group wins over everything else. Then a
/// shared nonzero group index decides by its sign, and otherwise the
/// category/mask bits must match both ways.
pub fn should_collide(a: &FixtureTag, b: &FixtureTag) -> bool {
    if a.anti_collision_group != 0 && a.anti_collision_group == b.anti_collision_group {
        return false;
    }

    let (fa, fb) = (a.filter, b.filter);
    if fa.group_index != 0 && fa.group_index == fb.group_index {
        return fa.group_index > 0;
    }

    (fa.mask_bits & fb.category_bits) != 0 && (fa.category_bits & fb.mask_bits) != 0
}

/// Runs `should_collide` on every candidate pair before contacts are computed.
pub(super) struct PairFilter;

impl PhysicsHooks for PairFilter {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        let a = context.colliders.get(context.collider1)?;
        let b = context.colliders.get(context.collider2)?;
        let allowed = should_collide(&FixtureTag::unpack(a.user_data), &FixtureTag::unpack(b.user_data));
        allowed.then_some(SolverFlags::COMPUTE_IMPULSES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(category: u16, mask: u16, group: i16, anti: u32) -> FixtureTag {
        FixtureTag {
            entity: EntityId(7),
            filter: CollisionFilter {
                category_bits: category,
                mask_bits: mask,
                group_index: group,
            },
            anti_collision_group: anti,
        }
    }

    #[test]
    fn pack_preserves_every_field() {
        let original = FixtureTag {
            entity: EntityId(u32::MAX - 3),
            filter: CollisionFilter {
                category_bits: 0x8001,
                mask_bits: 0x00F0,
                group_index: -12,
            },
            anti_collision_group: 0xDEAD_BEEF,
        };
        assert_eq!(FixtureTag::unpack(original.pack()), original);
    }

    #[test]
    fn default_filters_collide() {
        assert!(should_collide(&tag(1, 0xFFFF, 0, 0), &tag(1, 0xFFFF, 0, 0)));
    }

    #[test]
    fn anti_collision_group_overrides_positive_group() {
        assert!(!should_collide(&tag(1, 0xFFFF, 3, 9), &tag(1, 0xFFFF, 3, 9)));
        // different anti groups fall through to the group rule
        assert!(should_collide(&tag(1, 0xFFFF, 3, 9), &tag(1, 0xFFFF, 3, 8)));
    }

    #[test]
    fn equal_group_sign_decides() {
        assert!(should_collide(&tag(1, 0, 4, 0), &tag(2, 0, 4, 0)));
        assert!(!should_collide(&tag(1, 0xFFFF, -4, 0), &tag(1, 0xFFFF, -4, 0)));
    }

    #[test]
    fn differing_groups_use_mask_bits() {
        assert!(!should_collide(&tag(0x0002, 0xFFFD, -1, 0), &tag(0x0002, 0xFFFF, -2, 0)));
        assert!(should_collide(&tag(0x0002, 0xFFFF, -1, 0), &tag(0x0004, 0xFFFF, -2, 0)));
        // one-sided mask match is not enough
        assert!(!should_collide(&tag(0x0001, 0x0002, 0, 0), &tag(0x0002, 0x0002, 0, 0)));
    }
}
