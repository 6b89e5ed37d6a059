mod common;

use common::{companions, Event, FakeHost, LASER_IMAGE, ROUTER_IMAGE};
use cncpanel_machine::ProcessSupervisor;
use std::path::Path;

#[test]
fn test_terminate_by_image_matches_name_and_stem() {
    let host = FakeHost::new();
    host.start_external("LIGHTBURN.EXE");
    host.start_external("LightBurn");
    host.start_external("explorer.exe");
    let mut supervisor = ProcessSupervisor::new(host.boxed());

    let killed = supervisor
        .terminate_by_image(Path::new(r"C:\Program Files\LightBurn\LightBurn.exe"))
        .unwrap();

    assert_eq!(killed, 2);
    assert_eq!(host.running_images(), vec!["explorer.exe".to_string()]);
}

#[test]
fn test_ensure_exclusive_clears_both_companions() {
    let host = FakeHost::new();
    host.start_external(LASER_IMAGE);
    host.start_external(ROUTER_IMAGE);
    host.start_external(ROUTER_IMAGE);
    let mut supervisor = ProcessSupervisor::new(host.boxed());
    let companions = companions();

    let killed = supervisor
        .ensure_exclusive(&[companions.laser.as_path(), companions.router.as_path()])
        .unwrap();

    assert_eq!(killed, 3);
    assert!(host.running_images().is_empty());
    assert_eq!(supervisor.ensure_exclusive(&[companions.laser.as_path()]).unwrap(), 0);
}

#[test]
fn test_launch_replaces_retained_companion() {
    let host = FakeHost::new();
    let mut supervisor = ProcessSupervisor::new(host.boxed());
    let companions = companions();

    assert!(!supervisor.has_exited().unwrap());
    supervisor.launch(&companions.router).unwrap();
    supervisor.launch(&companions.laser).unwrap();

    assert_eq!(supervisor.companion(), Some(companions.laser.as_path()));
    assert_eq!(
        host.events(),
        vec![
            Event::Launched(ROUTER_IMAGE.to_string(), vec![]),
            Event::Killed(ROUTER_IMAGE.to_string()),
            Event::Launched(LASER_IMAGE.to_string(), vec![]),
        ]
    );
}

#[test]
fn test_launch_failure() {
    let host = FakeHost::new();
    let mut supervisor = ProcessSupervisor::new(host.boxed());

    let err = supervisor.launch(Path::new("/opt/missing-app")).unwrap_err();
    assert!(err.is_process_error());
    assert_eq!(supervisor.companion(), None);
}

#[test]
fn test_exited_companion_shutdown_is_quiet() {
    let host = FakeHost::new();
    let mut supervisor = ProcessSupervisor::new(host.boxed());
    supervisor.launch(&companions().laser).unwrap();

    host.exit(LASER_IMAGE);
    assert!(supervisor.has_exited().unwrap());
    supervisor.shutdown().unwrap();
    assert!(!host.events().iter().any(|e| matches!(e, Event::Killed(_))));
}

#[test]
fn test_drop_kills_companion() {
    let host = FakeHost::new();
    {
        let mut supervisor = ProcessSupervisor::new(host.boxed());
        supervisor.launch(&companions().router).unwrap();
        assert_eq!(host.running_images(), vec![ROUTER_IMAGE.to_string()]);
    }
    assert!(host.running_images().is_empty());
    assert_eq!(
        host.events().last(),
        Some(&Event::Killed(ROUTER_IMAGE.to_string()))
    );
}
