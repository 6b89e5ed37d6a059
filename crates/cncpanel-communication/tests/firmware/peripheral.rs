use cncpanel_communication::firmware::peripheral::{PeripheralLink, PERIPHERAL_ACK};
use cncpanel_communication::{LinkTiming, VirtualPort};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

#[test]
fn test_status_reports_are_fresh_maps() {
    let reports = Arc::new(Mutex::new(vec![
        "air=0\r\n".to_string(),
        "air=1\r\nvacuum=0\r\n".to_string(),
    ]));
    let queue = reports.clone();
    let device = VirtualPort::new("board", move |line| {
        if line == "status" {
            queue.lock().unwrap().pop()
        } else {
            None
        }
    });
    let mut board = PeripheralLink::open(device.boxed(), LinkTiming::simulated());

    let first = board.read_status().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first["air"], "1");
    assert_eq!(first["vacuum"], "0");

    let second = board.read_status().unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second["air"], "0");
}

#[test]
fn test_write_value_truncated_ack() {
    let device = VirtualPort::replying("board", "don");
    let mut board = PeripheralLink::open(device.boxed(), LinkTiming::simulated());
    assert!(board.write_value("air", "1").unwrap_err().is_protocol_mismatch());
}

#[test]
fn test_close_releases_port() {
    let device = VirtualPort::silent("board");
    let board = PeripheralLink::open(device.boxed(), LinkTiming::simulated());
    board.close().unwrap();
    assert!(device.is_closed());
}

proptest! {
    #[test]
    fn write_value_accepts_exact_ack(key in "[a-z_]{1,16}", value in "[0-9]{1,4}") {
        let device = VirtualPort::replying("board", "done\r\n");
        let mut board = PeripheralLink::open(device.boxed(), LinkTiming::simulated());
        prop_assert!(board.write_value(&key, &value).is_ok());
        prop_assert_eq!(device.written(), format!("{}={}\n", key, value));
    }

    #[test]
    fn write_value_rejects_anything_else(reply in "[ -~\r\n]{0,12}") {
        prop_assume!(reply.replace('\r', "") != PERIPHERAL_ACK);
        let device = VirtualPort::replying("board", reply);
        let mut board = PeripheralLink::open(device.boxed(), LinkTiming::simulated());
        prop_assert!(board.write_value("air", "1").unwrap_err().is_protocol_mismatch());
    }
}
