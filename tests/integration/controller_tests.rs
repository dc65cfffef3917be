//! Button → debounce → LED data path through a running controller.

use buttonlatch::{ActiveState, ControllerConfig, LogicLevel};

use super::mock_hw::{fast_config, settle, wait_for, Rig};

use LogicLevel::{High, Low};

#[test]
fn press_lights_led_and_release_clears_it() {
    let mut rig = Rig::new();
    rig.controller.start().unwrap();
    assert_eq!(rig.led(), Some(Low));

    // Low pulse longer than the 20 ms window.
    rig.button(Low, 25);
    assert!(wait_for(|| rig.led() == Some(High)), "LED should follow press");
    assert_eq!(rig.controller.led_is_on(), Some(true));

    rig.button(High, 25);
    assert!(wait_for(|| rig.led() == Some(Low)), "LED should follow release");
    assert_eq!(rig.controller.led_is_on(), Some(false));
}

#[test]
fn short_glitch_does_not_reach_led() {
    let mut rig = Rig::new();
    rig.controller.start().unwrap();

    rig.button(Low, 5);
    rig.button(High, 0);
    rig.clock.advance(100);
    settle();

    assert_eq!(rig.led(), Some(Low));
    assert_eq!(rig.gpio.writes("LED"), vec![Low], "only the initial write");
}

#[test]
fn contact_bounce_produces_one_led_write() {
    let mut rig = Rig::new();
    rig.controller.start().unwrap();

    for level in [Low, High, Low, High, Low] {
        rig.button(level, 1);
    }
    rig.clock.advance(30);
    assert!(wait_for(|| rig.led() == Some(High)));
    settle();

    assert_eq!(rig.gpio.writes("LED"), vec![Low, High]);
}

#[test]
fn active_high_button_inverts_mapping() {
    let config = ControllerConfig {
        button_active: ActiveState::ActiveHigh,
        ..fast_config()
    };
    let mut rig = Rig::with_config(config);
    rig.gpio.drive("BUTTON", Low).unwrap(); // idle level for active-high
    rig.controller.start().unwrap();

    rig.button(High, 25);
    assert!(wait_for(|| rig.led() == Some(High)));

    rig.button(Low, 25);
    assert!(wait_for(|| rig.led() == Some(Low)));
}

#[test]
fn repeated_presses_are_delivered_in_order() {
    let mut rig = Rig::new();
    rig.controller.start().unwrap();

    for _ in 0..3 {
        rig.button(Low, 25);
        assert!(wait_for(|| rig.led() == Some(High)));
        rig.button(High, 25);
        assert!(wait_for(|| rig.led() == Some(Low)));
    }

    assert_eq!(
        rig.gpio.writes("LED"),
        vec![Low, High, Low, High, Low, High, Low]
    );
}

#[test]
fn led_initial_level_is_configurable() {
    let config = ControllerConfig {
        led_initial: High,
        ..fast_config()
    };
    let mut rig = Rig::with_config(config);
    rig.controller.start().unwrap();
    assert_eq!(rig.led(), Some(High));
    assert_eq!(rig.controller.led_is_on(), Some(true));
}

#[test]
fn led_write_failure_does_not_stop_controller() {
    let mut rig = Rig::new();
    rig.controller.start().unwrap();

    rig.gpio.inject_write_fault("LED", -1);
    rig.button(Low, 25);
    assert!(wait_for(|| rig.gpio.failed_writes("LED") == 1));
    assert_eq!(rig.controller.led_is_on(), Some(false));

    rig.gpio.clear_faults("LED");
    rig.button(High, 25);
    assert!(wait_for(|| rig.gpio.writes("LED").len() == 2));
    rig.button(Low, 25);
    assert!(wait_for(|| rig.led() == Some(High)));
    assert_eq!(rig.gpio.writes("LED"), vec![Low, Low, High]);
}
