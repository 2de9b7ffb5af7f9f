use bevy::math::Vec2;
use perch::{
    config::PhysicsConfig,
    geometry::{rect, ScreenGeometry},
    test_support::FakeWindow,
    PhysicsSimulator, SittingKind,
};
use proptest::prelude::*;

const SIZE: Vec2 = Vec2::new(200.0, 300.0);

fn geometry(with_taskbar: bool) -> ScreenGeometry {
    let full = rect(0.0, 0.0, 1920.0, 1080.0);
    if with_taskbar {
        ScreenGeometry::new(full, rect(0.0, 0.0, 1920.0, 1040.0))
    } else {
        ScreenGeometry::uniform(full)
    }
}

fn floor(with_taskbar: bool) -> f32 {
    if with_taskbar {
        1040.0
    } else {
        1080.0
    }
}

fn simulator(with_taskbar: bool, pos: Vec2) -> PhysicsSimulator {
    let mut sim = PhysicsSimulator::seeded(PhysicsConfig::default(), geometry(with_taskbar), SIZE, 3);
    sim.attach(Box::new(FakeWindow::at(pos, SIZE)));
    sim
}

fn settle(sim: &mut PhysicsSimulator) {
    for _ in 0..2000 {
        if sim.state().is_sitting {
            return;
        }
        sim.update(1.0);
    }
    panic!("no settle: {:?}", sim.state());
}

proptest! {
    #[test]
    fn update_never_tunnels(
        with_taskbar in any::<bool>(),
        x in 0.0f32..1720.0,
        y in 0.0f32..740.0,
        vx in -60.0f32..60.0,
        vy in -60.0f32..60.0,
        delta in 0.0f32..=3.0,
    ) {
        let mut sim = simulator(with_taskbar, Vec2::new(x, y));
        sim.push(vx, vy);
        sim.update(delta);
        let pos = sim.state().position;
        prop_assert!(pos.x.is_finite() && pos.y.is_finite());
        prop_assert!(pos.x >= 0.0 && pos.x + SIZE.x <= 1920.0, "x out of bounds: {pos:?}");
        prop_assert!(pos.y >= 0.0 && pos.y + SIZE.y <= floor(with_taskbar), "y out of bounds: {pos:?}");
    }

    #[test]
    fn zero_delta_is_identity(
        with_taskbar in any::<bool>(),
        x in 0.0f32..1720.0,
        y in 0.0f32..740.0,
        vx in -60.0f32..60.0,
        vy in -60.0f32..60.0,
    ) {
        let mut sim = simulator(with_taskbar, Vec2::new(x, y));
        sim.push(vx, vy);
        let before = sim.state();
        sim.update(0.0);
        prop_assert_eq!(sim.state().position, before.position);
        prop_assert_eq!(sim.state().velocity, before.velocity);
    }

    #[test]
    fn sitting_stays_put(
        with_taskbar in any::<bool>(),
        x in 0.0f32..1720.0,
        y in 0.0f32..740.0,
        deltas in prop::collection::vec(0.0f32..=3.0, 1..40),
    ) {
        let mut sim = simulator(with_taskbar, Vec2::new(x, y));
        settle(&mut sim);
        let rest_y = sim.state().position.y;
        prop_assert_eq!(rest_y + SIZE.y, floor(with_taskbar));
        for d in deltas {
            sim.update(d);
            let st = sim.state();
            prop_assert!(st.is_sitting);
            prop_assert_eq!(st.velocity.y, 0.0);
            prop_assert_eq!(st.position.y, rest_y);
        }
    }

    #[test]
    fn jump_sets_exact_velocity(force in 0.0f32..50.0, with_taskbar in any::<bool>()) {
        let mut sim = simulator(with_taskbar, Vec2::new(600.0, 200.0));
        settle(&mut sim);
        prop_assert!(sim.jump(Some(force)));
        let st = sim.state();
        prop_assert!(!st.is_sitting);
        prop_assert_eq!(st.velocity.y, -force);
        prop_assert!(st.velocity.x.abs() <= 2.5);
    }
}

#[test]
fn bounce_heights_shrink_until_settled() {
    let mut sim = simulator(true, Vec2::new(600.0, 700.0));
    sim.push(0.0, 20.0);

    let mut rebounds = Vec::new();
    let mut frames = 0;
    while !sim.state().is_sitting {
        let before = sim.state().velocity.y;
        sim.update(1.0);
        let after = sim.state().velocity.y;
        if before > 0.0 && after < 0.0 {
            rebounds.push(after.abs());
        }
        frames += 1;
        assert!(frames < 300, "still bouncing after {frames} frames");
    }

    assert!(!rebounds.is_empty());
    assert!(
        rebounds.windows(2).all(|w| w[1] < w[0]),
        "rebounds not decreasing: {rebounds:?}"
    );
    let target = sim.state().sitting_target.unwrap();
    assert_eq!(target.kind, SittingKind::Taskbar);
}
