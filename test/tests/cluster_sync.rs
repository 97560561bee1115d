use std::time::Duration;

use concord_client::{Client, ClientConfig};
use concord_master::{ConnectEvent, Master, MasterConfig};
use concord_shared::SyncError;
use concord_test::{AbcCodec, ClusterOptions, LocalCluster, MissingFieldCodec};

fn expected_history(frames: usize) -> Vec<(u32, f64, String)> {
    (0..frames)
        .map(|frame| (frame as u32 * 3, frame as f64 * 0.25, format!("frame-{}", frame)))
        .collect()
}

fn update_every_frame(frame: usize, codec: &mut AbcCodec) {
    codec.set(frame as u32 * 3, frame as f64 * 0.25, &format!("frame-{}", frame));
}

#[test]
fn two_nodes_decode_fields_in_order() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut cluster = LocalCluster::start(ClusterOptions {
        clients: 2,
        ..Default::default()
    });
    let connections: Vec<_> = cluster.master.receive().read::<ConnectEvent>().collect();
    assert_eq!(connections.len(), 2);

    let mut codec = AbcCodec::default();
    let run = cluster.run_frames(6, &mut codec, update_every_frame);

    assert_eq!(run.master, Ok(()));
    for client in &run.clients {
        assert_eq!(client.error, None);
        assert_eq!(client.stamps.len(), 6);
        assert!(client.stamps.iter().all(|stamp| stamp.has_state));
        assert_eq!(client.codec.history, expected_history(6));
    }
    assert_eq!(cluster.master.frame().get(), 6);
    assert_eq!(cluster.clients.len(), 2);
}

#[test]
fn fragmented_transport_delivers_the_same_frames() {
    let mut cluster = LocalCluster::start(ClusterOptions {
        clients: 2,
        max_chunk: Some(5),
        ..Default::default()
    });

    let mut codec = AbcCodec::default();
    let run = cluster.run_frames(6, &mut codec, update_every_frame);

    assert_eq!(run.master, Ok(()));
    for client in &run.clients {
        assert_eq!(client.error, None);
        assert_eq!(client.codec.history, expected_history(6));
    }
}

#[test]
fn unchanged_state_is_not_resent() {
    let mut cluster = LocalCluster::start(ClusterOptions::default());

    let mut codec = AbcCodec::new(1, 2.0, "three");
    let run = cluster.run_frames(4, &mut codec, |frame, codec| {
        if frame == 2 {
            codec.set(4, 5.0, "six");
        }
    });

    let client = run.client(1);
    let has_state: Vec<bool> = client.stamps.iter().map(|stamp| stamp.has_state).collect();
    assert_eq!(has_state, vec![true, false, true, false]);
    assert_eq!(
        client.codec.history,
        vec![(1, 2.0, "three".to_string()), (4, 5.0, "six".to_string())]
    );
    // master time is monotonic
    assert!(client
        .stamps
        .windows(2)
        .all(|pair| pair[0].master_time <= pair[1].master_time));
}

#[test]
fn missing_field_is_a_desync() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut cluster = LocalCluster::start(ClusterOptions::default());
    let mut codec = MissingFieldCodec(AbcCodec::new(7, 1.5, "never sent"));
    let master = &mut cluster.master;
    master.sync_frame(&mut codec).unwrap();

    let mut client = cluster.clients.remove(0);
    let result = client.sync_frame(&mut AbcCodec::default());
    match result {
        Err(error) => {
            assert!(error.is_desync(), "{:?}", error);
            assert!(matches!(error, SyncError::Desync { frame: 0, .. }));
        }
        Ok(stamp) => panic!("decoded a frame with a missing field: {:?}", stamp),
    }
    assert!(!client.is_connected());
}

#[test]
fn nodes_sync_over_tcp() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut master_config = MasterConfig::default();
    master_config.cluster.master_address = "127.0.0.1:0".parse().unwrap();
    master_config.cluster.expected_clients = 1;
    master_config.connection.read_poll_interval = Duration::from_millis(2);
    master_config.startup_timeout = Some(Duration::from_secs(5));
    let mut master = Master::new(master_config).unwrap();
    let address = master.listen().unwrap();

    let mut client_config = ClientConfig::default();
    client_config.node_id = 4;
    client_config.cluster.master_address = address;
    client_config.connection.read_poll_interval = Duration::from_millis(2);
    client_config.connection.frame_timeout = Duration::from_secs(5);

    let client_thread = std::thread::spawn(move || {
        let mut client = Client::new(client_config).unwrap();
        client.connect().unwrap();
        let mut codec = AbcCodec::default();
        for _ in 0..3 {
            client.sync_frame(&mut codec).unwrap();
            client.end_frame().unwrap();
        }
        let after_session = client.sync_frame(&mut codec);
        (codec, after_session)
    });

    master.wait_for_clients().unwrap();
    let mut codec = AbcCodec::default();
    for frame in 0..3 {
        update_every_frame(frame, &mut codec);
        master.sync_frame(&mut codec).unwrap();
        master.end_frame().unwrap();
    }
    let key = master.client_keys()[0];
    assert_eq!(master.peer(&key).and_then(|peer| peer.node_id()), Some(4));
    assert!(master.peer(&key).and_then(|peer| peer.round_trip()).is_some());
    master.shutdown();

    let (codec, after_session) = client_thread.join().unwrap();
    assert_eq!(codec.history, expected_history(3));
    assert_eq!(after_session, Err(SyncError::Shutdown));
}
