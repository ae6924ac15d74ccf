use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use contraption_engine::domain::definition::{definitions_from_json, definitions_to_json};
use contraption_engine::{
    BodyKind, CollisionFilter, ConstraintEntity, Entity, EntityDefinition, EntityId, JointKind,
    PhysicalEntity, Shape, WorldCore, WorldListener, WorldSettings,
};
use glam::Vec2;

fn zero_g() -> WorldCore {
    WorldCore::with_settings(WorldSettings {
        gravity: Vec2::ZERO,
        ..WorldSettings::default()
    })
    .unwrap()
}

fn add(world: &mut WorldCore, shape: Shape, kind: BodyKind, x: f32, y: f32) -> EntityId {
    let p = PhysicalEntity::new(shape, kind).at(x, y, 0.0);
    world.add_entity(Entity::physical(p)).unwrap()
}

fn link(world: &mut WorldCore, a: EntityId, b: EntityId, kind: JointKind) -> EntityId {
    let c = ConstraintEntity::new(a, b, kind);
    world.add_entity(Entity::constraint(c)).unwrap()
}

/// `n` balls two units apart along y = `y`, pinned neighbour to neighbour.
fn chain(world: &mut WorldCore, n: usize, y: f32) -> Vec<EntityId> {
    let balls: Vec<EntityId> = (0..n)
        .map(|i| add(world, Shape::circle(0.5), BodyKind::Dynamic, i as f32 * 2.0, y))
        .collect();
    for pair in balls.windows(2) {
        let c = ConstraintEntity::new(pair[0], pair[1], JointKind::Revolute)
            .with_anchors(Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0));
        world.add_entity(Entity::constraint(c)).unwrap();
    }
    balls
}

fn physical_only(world: &WorldCore, ids: &[EntityId]) -> Vec<EntityId> {
    ids.iter()
        .copied()
        .filter(|id| world.entity(*id).is_some_and(Entity::has_body))
        .collect()
}

#[test]
fn falling_circle_settles_on_the_ground() {
    let mut world = WorldCore::new();
    add(&mut world, Shape::rect(40.0, 1.0), BodyKind::Static, 0.0, -0.5);
    let ball = add(&mut world, Shape::circle(0.5), BodyKind::Dynamic, 0.0, 5.0);

    let dt = world.settings().fixed_step;
    for _ in 0..300 {
        world.fixed_step(dt);
    }
    let y = world.entity(ball).unwrap().interpolated_transform().unwrap().position.y;
    assert!((y - 0.5).abs() < 0.05, "ball rests at y = {y}");

    for _ in 0..60 {
        world.fixed_step(dt);
    }
    let later = world.entity(ball).unwrap().interpolated_transform().unwrap().position.y;
    assert!((later - y).abs() < 0.01, "ball drifted from {y} to {later}");
}

#[test]
fn chain_is_fully_connected_from_any_start() {
    let mut world = zero_g();
    let balls = chain(&mut world, 5, 0.0);

    for &start in &balls {
        let reached = world.all_connected_things(start);
        let unique: HashSet<EntityId> = reached.iter().copied().collect();
        assert_eq!(unique.len(), reached.len(), "duplicates from {start}");
        assert_eq!(reached.len(), 9, "5 balls and 4 pins");

        let mut bodies = physical_only(&world, &reached);
        bodies.sort();
        assert_eq!(bodies, balls);
    }
}

#[test]
fn two_chains_split_into_two_groups() {
    let mut world = zero_g();
    let first = chain(&mut world, 3, 0.0);
    let second = chain(&mut world, 4, 10.0);

    let all: Vec<EntityId> = world.entities().iter().map(Entity::id).collect();
    let groups = world.split_into_groups_of_connected(&all);
    assert_eq!(groups.len(), 2);

    let a: HashSet<EntityId> = groups[0].iter().copied().collect();
    let b: HashSet<EntityId> = groups[1].iter().copied().collect();
    assert!(a.is_disjoint(&b));
    assert_eq!(a.len() + b.len(), all.len());
    assert!(first.iter().all(|id| a.contains(id)));
    assert!(second.iter().all(|id| b.contains(id)));

    // Only the listed ids are partitioned.
    let groups = world.split_into_groups_of_connected(&[first[0], second[0], EntityId(999)]);
    assert_eq!(groups, vec![vec![first[0]], vec![second[0]], vec![EntityId(999)]]);
}

#[test]
fn removing_a_link_breaks_the_component() {
    let mut world = zero_g();
    let balls = chain(&mut world, 3, 0.0);
    world.remove_entity(balls[1]);

    assert_eq!(world.all_connected_things(balls[0]), vec![balls[0]]);
    assert_eq!(world.entity_count(), 2);
}

#[test]
fn circle_query_hits_shapes_and_constraint_anchors() {
    let mut world = zero_g();
    let ground = add(&mut world, Shape::rect(10.0, 2.0), BodyKind::Static, 0.0, -5.0);
    let a = add(&mut world, Shape::circle(0.5), BodyKind::Dynamic, 0.0, 0.0);
    let b = add(&mut world, Shape::circle(0.5), BodyKind::Dynamic, 3.0, 0.0);
    let pin = link(&mut world, a, b, JointKind::Weld);

    // well inside the ground box
    assert_eq!(world.things_intersecting_circle(2.0, -5.0, 0.1), vec![ground]);
    // pin anchors sit at the body origins
    assert_eq!(world.things_intersecting_circle(0.0, 0.0, 0.1), vec![a, pin]);
    assert!(world.things_intersecting_circle(1.5, 0.0, 0.5).is_empty());
}

#[test]
fn closest_query_bisects_down_to_one_candidate() {
    let mut world = zero_g();
    let near = add(&mut world, Shape::circle(0.5), BodyKind::Dynamic, 0.0, 0.0);
    let far = add(&mut world, Shape::circle(0.5), BodyKind::Dynamic, 3.0, 0.0);

    assert_eq!(world.things_intersecting_circle(1.0, 0.0, 3.0), vec![near, far]);
    assert_eq!(world.closest_thing_intersecting_circle(1.0, 0.0, 3.0), Some(near));
    assert_eq!(world.closest_thing_intersecting_circle(2.2, 0.0, 3.0), Some(far));
    assert_eq!(world.closest_thing_intersecting_circle(20.0, 0.0, 3.0), None);
}

#[test]
fn isolated_shape_is_the_closest() {
    let mut world = zero_g();
    let target = add(&mut world, Shape::rect(1.0, 1.0), BodyKind::Static, 0.0, 0.0);
    for i in 0..4 {
        add(&mut world, Shape::circle(0.5), BodyKind::Dynamic, 20.0 + i as f32, 20.0);
    }
    assert_eq!(world.closest_thing_intersecting_circle(0.8, 0.0, 2.0), Some(target));
}

struct ContactCount(Rc<RefCell<u32>>);

impl WorldListener for ContactCount {
    fn contact_began(&mut self, _a: &Entity, _b: &Entity) {
        *self.0.borrow_mut() += 1;
    }
}

#[test]
fn shared_anti_collision_group_never_collides() {
    let mut world = zero_g();
    let count = Rc::new(RefCell::new(0));
    world.add_listener(Box::new(ContactCount(Rc::clone(&count))));

    for x in [0.0, 0.5] {
        let p = PhysicalEntity::new(Shape::rect(1.0, 1.0), BodyKind::Dynamic)
            .at(x, 0.0, 0.0)
            .with_anti_collision_group(7);
        world.add_entity(Entity::physical(p)).unwrap();
    }
    for _ in 0..30 {
        world.fixed_step(world.settings().fixed_step);
    }
    assert_eq!(*count.borrow(), 0);

    // Different groups overlap and report.
    let mut world = zero_g();
    let count = Rc::new(RefCell::new(0));
    world.add_listener(Box::new(ContactCount(Rc::clone(&count))));
    for (x, group) in [(0.0, 7), (0.5, 8)] {
        let p = PhysicalEntity::new(Shape::rect(1.0, 1.0), BodyKind::Dynamic)
            .at(x, 0.0, 0.0)
            .with_anti_collision_group(group);
        world.add_entity(Entity::physical(p)).unwrap();
    }
    world.fixed_step(world.settings().fixed_step);
    assert!(*count.borrow() > 0);
}

#[test]
fn negative_group_index_suppresses_contacts() {
    let mut world = zero_g();
    let count = Rc::new(RefCell::new(0));
    world.add_listener(Box::new(ContactCount(Rc::clone(&count))));
    let filter = CollisionFilter {
        group_index: -2,
        ..CollisionFilter::default()
    };
    for x in [0.0, 0.6] {
        let p = PhysicalEntity::new(Shape::circle(0.5), BodyKind::Dynamic)
            .at(x, 0.0, 0.0)
            .with_filter(filter);
        world.add_entity(Entity::physical(p)).unwrap();
    }
    for _ in 0..10 {
        world.fixed_step(world.settings().fixed_step);
    }
    assert_eq!(*count.borrow(), 0);
}

/// Shapes in insertion order and constraint pairs as indices into that order.
fn fingerprint(world: &WorldCore) -> (Vec<Shape>, Vec<(usize, usize)>) {
    let mut index = HashMap::new();
    let mut shapes = Vec::new();
    for e in world.entities() {
        if let Some(p) = e.as_physical() {
            index.insert(e.id(), shapes.len());
            shapes.push(p.shape().clone());
        }
    }
    let pairs = world
        .entities()
        .iter()
        .filter_map(Entity::as_constraint)
        .map(|c| {
            let [a, b] = c.endpoints();
            (index[&a], index[&b])
        })
        .collect();
    (shapes, pairs)
}

#[test]
fn definitions_round_trip_through_clear() {
    let mut world = WorldCore::new();
    let ground = add(&mut world, Shape::rect(20.0, 1.0), BodyKind::Static, 0.0, -0.5);
    let a = add(&mut world, Shape::circle(0.5), BodyKind::Dynamic, 0.0, 3.0);
    let b = add(
        &mut world,
        Shape::polygon(vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)]),
        BodyKind::Dynamic,
        2.0,
        3.0,
    );
    link(&mut world, a, b, JointKind::Revolute);
    link(
        &mut world,
        ground,
        b,
        JointKind::Spring {
            rest_length: 2.0,
            stiffness: 10.0,
            damping: 0.5,
        },
    );
    world.fixed_step(0.05);

    let before = fingerprint(&world);
    let count = world.entity_count();
    let json = definitions_to_json(&world.to_definitions()).unwrap();

    world.clear();
    assert_eq!(world.entity_count(), 0);

    let definitions = definitions_from_json(&json).unwrap();
    assert_eq!(definitions.iter().filter(|d| d.is_constraint()).count(), 2);
    let ids = world.load_definitions(&definitions).unwrap();

    assert_eq!(ids.len(), count);
    assert_eq!(world.entity_count(), count);
    assert_eq!(fingerprint(&world), before);
    assert!(ids.iter().all(|id| id.0 > b.0), "fresh ids after clear");
}

#[test]
fn snapshot_keeps_user_payload() {
    let mut world = zero_g();
    let p = PhysicalEntity::new(Shape::circle(1.0), BodyKind::Dynamic);
    let id = world
        .add_entity(Entity::physical(p).with_payload(serde_json::json!({"name": "wheel"})))
        .unwrap();

    let defs = world.definitions_for(&[id]);
    let EntityDefinition::Physical(def) = &defs[0] else {
        panic!("expected a physical definition");
    };
    assert_eq!(def.payload, Some(serde_json::json!({"name": "wheel"})));
}
