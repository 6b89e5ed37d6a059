use cncpanel_communication::firmware::grbl::{MotionLink, GRBL_ACK};
use cncpanel_communication::{LinkTiming, VirtualPort};
use proptest::prelude::*;
use std::thread;
use std::time::{Duration, Instant};

fn motion_with_reply(reply: &str) -> (VirtualPort, MotionLink) {
    let device = VirtualPort::replying("grbl", reply);
    let motion = MotionLink::new(device.boxed(), LinkTiming::simulated());
    (device, motion)
}

#[test]
fn test_read_settings_example() {
    let device = VirtualPort::new("grbl", |line| {
        (line == "$$").then(|| "$10=0\r\n$32=1\r\n\r\n".to_string())
    });
    let mut motion = MotionLink::new(device.boxed(), LinkTiming::simulated());

    let settings = motion.read_settings().unwrap();
    assert_eq!(settings.len(), 2);
    assert_eq!(settings.get(&10).map(String::as_str), Some("0"));
    assert_eq!(settings.get(&32).map(String::as_str), Some("1"));
    assert_eq!(device.written(), "$$\n");
}

#[test]
fn test_read_settings_empty_buffer() {
    let (_device, mut motion) = motion_with_reply("");
    assert!(motion.read_settings().unwrap().is_empty());
}

#[test]
fn test_home_times_out_on_silent_device() {
    let device = VirtualPort::silent("grbl");
    let timing = LinkTiming {
        homing_timeout: Duration::from_millis(150),
        homing_poll: Duration::from_millis(5),
        ..LinkTiming::simulated()
    };
    let mut motion = MotionLink::new(device.boxed(), timing);

    let started = Instant::now();
    let err = motion.home().unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_timeout(), "unexpected error: {}", err);
    assert!(elapsed >= Duration::from_millis(150));
    assert!(elapsed < Duration::from_secs(5));
    assert_eq!(device.written(), "$H\n");
}

#[test]
fn test_home_waits_for_late_acknowledgment() {
    let device = VirtualPort::silent("grbl");
    let timing = LinkTiming {
        homing_timeout: Duration::from_secs(5),
        homing_poll: Duration::from_millis(5),
        ..LinkTiming::simulated()
    };
    let mut motion = MotionLink::new(device.boxed(), timing);

    let machine = device.clone();
    let finisher = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        machine.push_rx("ok\r\n");
    });

    motion.home().unwrap();
    finisher.join().unwrap();
}

#[test]
fn test_home_rejects_alarm() {
    let (_device, mut motion) = motion_with_reply("ALARM:9\r\n");
    let err = motion.home().unwrap_err();
    assert!(err.is_protocol_mismatch());
}

#[test]
fn test_set_work_origin() {
    let (device, mut motion) = motion_with_reply("ok\r\n");
    motion.set_work_origin(-800.0, -400.0).unwrap();
    assert_eq!(device.written(), "G10 L2 P1 X-800.000 Y-400.000\n");
}

#[test]
fn test_default_homing_deadline_is_forty_seconds() {
    assert_eq!(LinkTiming::default().homing_timeout, Duration::from_secs(40));
}

proptest! {
    #[test]
    fn write_setting_accepts_exact_ack(key in 0u16..=132, value in "[0-9]{1,5}(\\.[0-9]{1,3})?") {
        let (device, mut motion) = motion_with_reply("ok\r\n");
        prop_assert!(motion.write_setting(key, &value).is_ok());
        prop_assert_eq!(device.written(), format!("${}={}\n", key, value));
    }

    #[test]
    fn write_setting_rejects_anything_else(
        key in 0u16..=132,
        reply in "[ -~\r\n]{0,12}",
    ) {
        prop_assume!(reply.replace('\r', "") != GRBL_ACK);
        let device = VirtualPort::replying("grbl", reply);
        let mut motion = MotionLink::new(device.boxed(), LinkTiming::simulated());
        let err = motion.write_setting(key, "1").unwrap_err();
        prop_assert!(err.is_protocol_mismatch());
    }
}
