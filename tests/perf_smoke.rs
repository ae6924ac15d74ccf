use contraption_engine::World;

#[test]
fn perf_smoke_step() {
    let mut world = World::new();
    world.enable_perf_metrics(true);
    world.add_rect(0.0, -0.5, 100.0, 1.0, 0.0, true).unwrap();
    for x in 0..20 {
        for y in 0..5 {
            world.add_circle(x as f32 - 10.0, 2.0 + y as f32 * 1.2, 0.5, false).unwrap();
        }
    }
    assert!(world.fixed_step(1.0 / 60.0));
    let stats = world.get_perf_stats();
    assert!(stats.step_ms() >= 0.0);
    assert_eq!(stats.steps(), 1);
    assert_eq!(stats.entities(), 101);
}

#[test]
fn facade_round_trip() {
    let mut world = World::new();
    let ground = world.add_rect(0.0, -0.5, 20.0, 1.0, 0.0, true).unwrap();
    let ball = world.add_circle(0.0, 0.4, 0.5, false).unwrap();
    let pin = world.pin_to_anchor(ball, 0.0, 0.4).unwrap();
    assert!(pin.is_some());
    assert_eq!(world.joint_anchor(), Some(ground));

    world.fixed_step(0.05);
    assert_eq!(world.interpolated_transforms().len(), 8);
    assert!(world.constraint_anchors(pin.unwrap()).is_some());
    assert_eq!(world.connected(ball).len(), 3);

    let json = world.save_definitions().unwrap();
    world.clear();
    assert_eq!(world.entity_count(), 0);
    let ids = world.load_definitions(&json).unwrap();
    assert_eq!(ids.len(), 3);
    world.take_contacts();
}
