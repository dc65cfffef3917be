//! Controller start/stop lifecycle: acquisition, rollback, idempotence.

use buttonlatch::app::events::ControllerEvent;
use buttonlatch::{ControllerConfig, ControllerState, Error, LogicLevel, PinId, Unavailable};

use super::mock_hw::{fast_config, settle, wait_for, Rig};

#[test]
fn start_acquires_both_pins_and_reports() {
    let mut rig = Rig::new();
    assert_eq!(rig.controller.state(), ControllerState::Stopped);
    assert_eq!(rig.controller.led_is_on(), None);

    rig.controller.start().unwrap();

    assert_eq!(rig.controller.state(), ControllerState::Running);
    assert!(rig.gpio.is_owned("BUTTON"));
    assert!(rig.gpio.is_owned("LED"));
    assert!(rig.gpio.has_edge_callback("BUTTON"));
    assert_eq!(
        rig.sink.events(),
        vec![ControllerEvent::Started {
            button: PinId::new("BUTTON").unwrap(),
            led: PinId::new("LED").unwrap(),
        }]
    );
}

#[test]
fn stop_releases_both_pins() {
    let mut rig = Rig::new();
    rig.controller.start().unwrap();
    rig.controller.stop();

    assert_eq!(rig.controller.state(), ControllerState::Stopped);
    assert!(!rig.gpio.is_owned("BUTTON"));
    assert!(!rig.gpio.is_owned("LED"));
    assert!(!rig.gpio.has_edge_callback("BUTTON"));
    assert_eq!(rig.sink.last(), Some(ControllerEvent::Stopped));
}

#[test]
fn stop_twice_releases_once() {
    let mut rig = Rig::new();
    rig.controller.start().unwrap();
    rig.controller.stop();
    rig.controller.stop();

    assert_eq!(rig.gpio.release_count("BUTTON"), 1);
    assert_eq!(rig.gpio.release_count("LED"), 1);
    let stops = rig
        .sink
        .events()
        .iter()
        .filter(|e| **e == ControllerEvent::Stopped)
        .count();
    assert_eq!(stops, 1);
}

#[test]
fn stop_before_start_is_noop() {
    let mut rig = Rig::new();
    rig.controller.stop();

    assert_eq!(rig.controller.state(), ControllerState::Stopped);
    assert_eq!(rig.gpio.release_count("BUTTON"), 0);
    assert_eq!(rig.gpio.release_count("LED"), 0);
    assert!(rig.sink.events().is_empty());
}

#[test]
fn start_while_running_is_noop() {
    let mut rig = Rig::new();
    rig.controller.start().unwrap();
    rig.controller.start().unwrap();

    assert_eq!(rig.sink.events().len(), 1, "second start emits nothing");
    assert_eq!(rig.gpio.writes("LED"), vec![LogicLevel::Low]);
}

#[test]
fn input_failure_rolls_back_led() {
    let mut rig = Rig::new();
    // Someone else already holds the button.
    let mut squatter = rig.gpio.clone();
    let _held = buttonlatch::app::ports::GpioPort::acquire_input(
        &mut squatter,
        &PinId::new("BUTTON").unwrap(),
    )
    .unwrap();

    let err = rig.controller.start().unwrap_err();

    assert_eq!(err, Error::ResourceUnavailable(Unavailable::AlreadyOwned));
    assert!(!rig.gpio.is_owned("LED"), "LED must be released on rollback");
    assert_eq!(rig.gpio.release_count("LED"), 1);
    assert_eq!(rig.controller.state(), ControllerState::Stopped);
    assert_eq!(rig.sink.last(), Some(ControllerEvent::StartFailed(err)));
}

#[test]
fn missing_led_pin_fails_without_touching_button() {
    let config = ControllerConfig {
        led_pin: PinId::new("GPIO99").unwrap(),
        ..fast_config()
    };
    let mut rig = Rig::with_config(config);

    let err = rig.controller.start().unwrap_err();

    assert_eq!(err, Error::ResourceUnavailable(Unavailable::NoSuchPin));
    assert!(!rig.gpio.is_owned("BUTTON"));
    assert_eq!(rig.gpio.release_count("BUTTON"), 0);
}

#[test]
fn stop_after_failed_start_is_safe() {
    let config = ControllerConfig {
        button_pin: PinId::new("MISSING").unwrap(),
        ..fast_config()
    };
    let mut rig = Rig::with_config(config);

    assert!(rig.controller.start().is_err());
    rig.controller.stop();
    rig.controller.stop();

    assert_eq!(rig.gpio.release_count("LED"), 1);
    assert!(!rig.gpio.is_owned("LED"));
}

#[test]
fn invalid_config_is_rejected_before_acquisition() {
    let config = ControllerConfig {
        debounce_ms: 0,
        ..fast_config()
    };
    let mut rig = Rig::with_config(config);

    let err = rig.controller.start().unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(!rig.gpio.is_owned("LED"));
    assert_eq!(rig.gpio.writes("LED"), vec![]);
}

#[test]
fn release_faults_are_swallowed() {
    let mut rig = Rig::new();
    rig.controller.start().unwrap();
    rig.gpio.inject_release_fault("BUTTON", -7);
    rig.gpio.inject_release_fault("LED", -7);

    rig.controller.stop();

    assert_eq!(rig.controller.state(), ControllerState::Stopped);
    assert!(!rig.gpio.is_owned("BUTTON"));
    assert!(!rig.gpio.is_owned("LED"));
}

#[test]
fn restart_after_stop_works() {
    let mut rig = Rig::new();
    rig.controller.start().unwrap();
    rig.controller.stop();
    rig.controller.start().unwrap();

    rig.button(LogicLevel::Low, 25);
    assert!(wait_for(|| rig.led() == Some(LogicLevel::High)));
}

#[test]
fn pending_press_is_dropped_on_stop() {
    let mut rig = Rig::new();
    rig.controller.start().unwrap();

    rig.button(LogicLevel::Low, 5);
    rig.controller.stop();
    rig.clock.advance(100);
    settle();

    assert_eq!(rig.gpio.writes("LED"), vec![LogicLevel::Low]);
}

#[test]
fn dropping_controller_releases_pins() {
    let rig = Rig::new();
    let gpio = rig.gpio.clone();
    {
        let mut rig = rig;
        rig.controller.start().unwrap();
        assert!(gpio.is_owned("LED"));
    }
    assert!(!gpio.is_owned("BUTTON"));
    assert!(!gpio.is_owned("LED"));
}
