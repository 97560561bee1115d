use std::time::Duration;

use concord_master::{DisconnectEvent, ErrorEvent};
use concord_shared::{FaultTolerance, SyncError};
use concord_test::{AbcCodec, ClusterOptions, LocalCluster, MissingFieldCodec};

#[test]
fn lost_node_is_dropped_and_session_continues() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut cluster = LocalCluster::start(ClusterOptions {
        clients: 2,
        ..Default::default()
    });
    cluster.master.receive();
    cluster.lose_node_after(2, 2);

    let mut codec = AbcCodec::default();
    let run = cluster.run_frames(5, &mut codec, |frame, codec| {
        codec.set(frame as u32, 0.0, "dome")
    });

    assert_eq!(run.master, Ok(()));
    assert_eq!(run.client(1).error, None);
    assert_eq!(run.client(1).stamps.len(), 5);
    assert_eq!(run.client(2).stamps.len(), 2);

    assert_eq!(cluster.master.client_count(), 1);
    assert_eq!(cluster.clients.len(), 1);
    let mut events = cluster.master.receive();
    let disconnections: Vec<_> = events.read::<DisconnectEvent>().collect();
    assert_eq!(disconnections.len(), 1);
    assert_eq!(disconnections[0].1, Some(2));
    let errors: Vec<_> = events.read::<ErrorEvent>().collect();
    assert!(matches!(errors[..], [SyncError::PeerLost { .. }]));
}

#[test]
fn lost_node_tears_down_every_node() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut cluster = LocalCluster::start(ClusterOptions {
        clients: 2,
        fault_tolerance: FaultTolerance::TearDown,
        ..Default::default()
    });
    cluster.lose_node_after(2, 2);

    let mut codec = AbcCodec::default();
    let run = cluster.run_frames(5, &mut codec, |frame, codec| {
        codec.set(frame as u32, 0.0, "dome")
    });

    assert!(matches!(run.master, Err(SyncError::PeerLost { .. })));
    assert!(cluster.master.shutdown_signal().is_triggered());

    // the staying node either sees the master's disconnect or fails to
    // acknowledge its last frame after the master closed the link
    let staying = run.client(1);
    assert!(
        matches!(
            staying.error,
            Some(SyncError::Shutdown) | Some(SyncError::PeerLost { .. })
        ),
        "{:?}",
        staying.error
    );
    assert!(staying.stamps.len() >= 2 && staying.stamps.len() < 5);
    assert!(!cluster.clients[0].is_connected());
}

#[test]
fn reattached_node_receives_a_snapshot() {
    let mut cluster = LocalCluster::start(ClusterOptions::default());

    let mut codec = AbcCodec::new(10, 20.0, "snapshot");
    let first = cluster.run_frames(2, &mut codec, |_, _| {});
    assert_eq!(first.client(1).codec.history.len(), 1);

    let key = cluster.reattach(1);
    assert_eq!(cluster.master.client_keys(), vec![key]);

    // nothing changed on the master, but the new connection needs state
    let second = cluster.run_frames(2, &mut codec, |_, _| {});
    assert_eq!(second.master, Ok(()));
    let client = second.client(1);
    assert_eq!(client.error, None);
    assert!(client.stamps[0].has_state);
    assert!(!client.stamps[1].has_state);
    assert_eq!(client.codec.values(), (10, 20.0, "snapshot".to_string()));
}

#[test]
fn late_node_is_dropped_after_the_ack_timeout() {
    let mut cluster = LocalCluster::start(ClusterOptions {
        clients: 2,
        ack_timeout: Duration::from_millis(50),
        ..Default::default()
    });
    cluster.master.receive();
    let mut prompt = cluster.clients.remove(0);
    let mut late = cluster.clients.remove(0);

    let mut codec = AbcCodec::new(1, 1.0, "one");
    cluster.master.sync_frame(&mut codec).unwrap();
    prompt.sync_frame(&mut AbcCodec::default()).unwrap();
    prompt.end_frame().unwrap();
    // renders but never acknowledges
    late.sync_frame(&mut AbcCodec::default()).unwrap();
    cluster.master.end_frame().unwrap();

    let mut events = cluster.master.receive();
    let errors: Vec<_> = events.read::<ErrorEvent>().collect();
    assert!(matches!(
        errors[..],
        [
            SyncError::Timeout {
                frame: 0,
                waiting_for: "frame acknowledgements",
                ..
            },
            SyncError::PeerLost { frame: 0, .. }
        ]
    ));
    let disconnections: Vec<_> = events.read::<DisconnectEvent>().collect();
    assert_eq!(disconnections.len(), 1);
    assert_eq!(disconnections[0].1, Some(2));
    assert_eq!(cluster.master.client_count(), 1);

    cluster.master.sync_frame(&mut codec).unwrap();
    prompt.sync_frame(&mut AbcCodec::default()).unwrap();
    assert_eq!(prompt.frame().map(|frame| frame.get()), Some(1));
    // the master closed the late node's link
    assert!(matches!(late.end_frame(), Err(SyncError::PeerLost { .. })));
    assert!(!late.is_connected());
}

#[test]
fn late_node_tears_down_after_the_ack_timeout() {
    let mut cluster = LocalCluster::start(ClusterOptions {
        clients: 1,
        fault_tolerance: FaultTolerance::TearDown,
        ack_timeout: Duration::from_millis(50),
        ..Default::default()
    });
    let mut late = cluster.clients.remove(0);

    let mut codec = AbcCodec::new(1, 1.0, "one");
    cluster.master.sync_frame(&mut codec).unwrap();
    late.sync_frame(&mut AbcCodec::default()).unwrap();

    assert!(matches!(
        cluster.master.end_frame(),
        Err(SyncError::PeerLost { frame: 0, .. })
    ));
    assert!(cluster.master.shutdown_signal().is_triggered());
    assert_eq!(cluster.master.sync_frame(&mut codec), Err(SyncError::Shutdown));
    assert!(matches!(late.end_frame(), Err(SyncError::PeerLost { .. })));
}

#[test]
fn desynced_node_is_dropped_and_session_continues() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut cluster = LocalCluster::start(ClusterOptions {
        clients: 2,
        ..Default::default()
    });
    cluster.master.receive();
    let mut healthy = cluster.clients.remove(0);
    let mut desynced = cluster.clients.remove(0);

    let mut codec = MissingFieldCodec(AbcCodec::new(7, 1.5, "never sent"));
    cluster.master.sync_frame(&mut codec).unwrap();
    healthy.sync_frame(&mut MissingFieldCodec::default()).unwrap();
    healthy.end_frame().unwrap();
    // expects field C, which the master never writes
    let error = desynced.sync_frame(&mut AbcCodec::default()).unwrap_err();
    assert!(error.is_desync(), "{:?}", error);
    assert!(!desynced.is_connected());

    cluster.master.end_frame().unwrap();
    assert_eq!(cluster.master.client_count(), 1);
    let mut events = cluster.master.receive();
    let disconnections: Vec<_> = events.read::<DisconnectEvent>().collect();
    assert_eq!(disconnections.len(), 1);
    assert_eq!(disconnections[0].1, Some(2));
    let errors: Vec<_> = events.read::<ErrorEvent>().collect();
    assert!(matches!(errors[..], [SyncError::PeerLost { frame: 0, .. }]));

    cluster.master.sync_frame(&mut codec).unwrap();
    let stamp = healthy.sync_frame(&mut MissingFieldCodec::default()).unwrap();
    assert!(!stamp.has_state);
    assert_eq!(healthy.frame().map(|frame| frame.get()), Some(1));
}

#[test]
fn desynced_node_tears_down_every_node() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut cluster = LocalCluster::start(ClusterOptions {
        clients: 2,
        fault_tolerance: FaultTolerance::TearDown,
        ..Default::default()
    });
    let mut healthy = cluster.clients.remove(0);
    let mut desynced = cluster.clients.remove(0);

    let mut codec = MissingFieldCodec(AbcCodec::new(7, 1.5, "never sent"));
    cluster.master.sync_frame(&mut codec).unwrap();
    healthy.sync_frame(&mut MissingFieldCodec::default()).unwrap();
    healthy.end_frame().unwrap();
    assert!(desynced.sync_frame(&mut AbcCodec::default()).unwrap_err().is_desync());

    assert!(matches!(
        cluster.master.end_frame(),
        Err(SyncError::PeerLost { frame: 0, .. })
    ));
    assert!(cluster.master.shutdown_signal().is_triggered());
    assert_eq!(cluster.master.client_count(), 0);
    assert_eq!(cluster.master.sync_frame(&mut codec), Err(SyncError::Shutdown));
    assert_eq!(
        healthy.sync_frame(&mut MissingFieldCodec::default()),
        Err(SyncError::Shutdown)
    );
}
