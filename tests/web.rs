#![cfg(target_arch = "wasm32")]

use contraption_engine::World;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn steps_in_the_browser() {
    contraption_engine::init();
    let mut world = World::new();
    let id = world.add_circle(0.0, 5.0, 0.5, false).unwrap();
    assert!(world.fixed_step(0.1));
    let t = world.transform(id).unwrap();
    assert!(t[1] < 5.0);
}

#[wasm_bindgen_test]
fn init_installs_a_console_logger_once() {
    contraption_engine::init();
    contraption_engine::init();
    assert!(log::log_enabled!(log::Level::Warn));
}
