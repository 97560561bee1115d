use std::{
    collections::HashMap,
    thread,
    time::{Duration, Instant},
};

use log::info;

use concord_client::{Client, ClientConfig};
use concord_master::{Master, MasterConfig, PeerKey};
use concord_shared::{ConnectionConfig, FaultTolerance, FrameCodec, FrameStamp, SyncError};

use crate::local_link::LocalLinkPair;

/// How a [`LocalCluster`] is wired
#[derive(Clone, Debug)]
pub struct ClusterOptions {
    pub clients: usize,
    /// Cut every send into chunks of at most this many bytes
    pub max_chunk: Option<usize>,
    pub fault_tolerance: FaultTolerance,
    pub ack_timeout: Duration,
    pub frame_timeout: Duration,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            clients: 1,
            max_chunk: None,
            fault_tolerance: FaultTolerance::DropNode,
            ack_timeout: Duration::from_secs(5),
            frame_timeout: Duration::from_secs(5),
        }
    }
}

/// What one client thread saw during [`LocalCluster::run_frames`]
pub struct ClientRun<C> {
    pub node_id: u32,
    pub codec: C,
    pub stamps: Vec<FrameStamp>,
    pub error: Option<SyncError>,
}

pub struct ClusterRun<C> {
    pub master: Result<(), SyncError>,
    pub clients: Vec<ClientRun<C>>,
}

impl<C> ClusterRun<C> {
    pub fn client(&self, node_id: u32) -> &ClientRun<C> {
        match self.clients.iter().find(|run| run.node_id == node_id) {
            Some(run) => run,
            None => panic!("node {} did not take part in the run", node_id),
        }
    }
}

/// A master and its clients inside one process, connected over in-memory
/// links. Clients are numbered from 1.
pub struct LocalCluster {
    pub master: Master,
    pub clients: Vec<Client>,
    options: ClusterOptions,
    lose_after: HashMap<u32, usize>,
    next_seed: u64,
}

impl LocalCluster {
    /// Connects every client and waits until the master has seen all
    /// handshakes
    pub fn start(options: ClusterOptions) -> Self {
        let mut config = MasterConfig::default();
        config.cluster.expected_clients = options.clients;
        config.cluster.fault_tolerance = options.fault_tolerance;
        config.connection = connection_config(&options);
        config.startup_timeout = Some(Duration::from_secs(5));

        let mut cluster = Self {
            master: Master::new(config).expect("master"),
            clients: Vec::new(),
            options,
            lose_after: HashMap::new(),
            next_seed: 1,
        };
        for node_id in 1..=cluster.options.clients as u32 {
            let mut client = Client::new(cluster.client_config(node_id)).expect("client");
            cluster.attach(&mut client);
            cluster.clients.push(client);
        }
        cluster.master.wait_for_clients().expect("clients connect");
        info!("Local cluster with {} clients started", cluster.clients.len());
        cluster
    }

    pub fn client_config(&self, node_id: u32) -> ClientConfig {
        ClientConfig {
            node_id,
            connection: connection_config(&self.options),
            ..Default::default()
        }
    }

    pub fn client_mut(&mut self, node_id: u32) -> &mut Client {
        match self.clients.iter_mut().find(|client| client.node_id() == node_id) {
            Some(client) => client,
            None => panic!("no client with node id {}", node_id),
        }
    }

    /// Give `client` a fresh link to the master. Returns the key the master
    /// tracks the new connection under.
    pub fn attach(&mut self, client: &mut Client) -> PeerKey {
        let node_id = client.node_id();
        let pair = match self.options.max_chunk {
            Some(max_chunk) => {
                self.next_seed += 1;
                LocalLinkPair::fragmented(node_id, max_chunk, self.next_seed)
            }
            None => LocalLinkPair::new(node_id),
        };
        let key = self.master.add_link(pair.master_end).expect("master accepts link");
        client.attach(pair.client_end).expect("client attaches");
        key
    }

    /// Reconnect a client and wait until the master has accepted its
    /// handshake
    pub fn reattach(&mut self, node_id: u32) -> PeerKey {
        let index = match self.clients.iter().position(|client| client.node_id() == node_id) {
            Some(index) => index,
            None => panic!("no client with node id {}", node_id),
        };
        let mut client = self.clients.remove(index);
        let key = self.attach(&mut client);
        self.clients.insert(index, client);

        let deadline = Instant::now() + Duration::from_secs(5);
        while !self.master.peer(&key).map_or(false, |peer| peer.is_handshaken()) {
            assert!(Instant::now() < deadline, "node {} never handshook", node_id);
            self.master.poll().expect("master poll");
        }
        key
    }

    /// Drop the client's connection without telling the master once it has
    /// completed `frames` frames of the next run
    pub fn lose_node_after(&mut self, node_id: u32, frames: usize) {
        self.lose_after.insert(node_id, frames);
    }

    /// Run `frames` frames with every client on its own thread. The master
    /// calls `update` with the frame index before syncing each frame and
    /// stops at its first error. Lost nodes are not returned to the cluster.
    pub fn run_frames<C, U>(&mut self, frames: usize, codec: &mut C, mut update: U) -> ClusterRun<C>
    where
        C: FrameCodec + Default + Send + 'static,
        U: FnMut(usize, &mut C),
    {
        let handles: Vec<_> = self
            .clients
            .drain(..)
            .map(|client| {
                let budget = self
                    .lose_after
                    .remove(&client.node_id())
                    .map_or(frames, |lose_after| lose_after.min(frames));
                let lost = budget < frames;
                thread::spawn(move || run_client::<C>(client, budget, lost))
            })
            .collect();

        let mut master = Ok(());
        for frame in 0..frames {
            update(frame, codec);
            let result = self
                .master
                .sync_frame(codec)
                .and_then(|_| self.master.end_frame());
            if let Err(error) = result {
                master = Err(error);
                break;
            }
        }

        let mut clients = Vec::new();
        for handle in handles {
            let (client, run) = handle.join().expect("client thread");
            if let Some(client) = client {
                self.clients.push(client);
            }
            clients.push(run);
        }
        ClusterRun { master, clients }
    }
}

fn connection_config(options: &ClusterOptions) -> ConnectionConfig {
    ConnectionConfig {
        ack_timeout: options.ack_timeout,
        frame_timeout: options.frame_timeout,
        read_poll_interval: Duration::from_millis(2),
        ..Default::default()
    }
}

fn run_client<C: FrameCodec + Default>(
    mut client: Client,
    frames: usize,
    lost: bool,
) -> (Option<Client>, ClientRun<C>) {
    let mut run = ClientRun {
        node_id: client.node_id(),
        codec: C::default(),
        stamps: Vec::new(),
        error: None,
    };
    for _ in 0..frames {
        let result = client
            .sync_frame(&mut run.codec)
            .and_then(|stamp| client.end_frame().map(|_| stamp));
        match result {
            Ok(stamp) => run.stamps.push(stamp),
            Err(error) => {
                run.error = Some(error);
                break;
            }
        }
    }

    if lost {
        info!("Node {} drops its connection", run.node_id);
        return (None, run);
    }
    (Some(client), run)
}
