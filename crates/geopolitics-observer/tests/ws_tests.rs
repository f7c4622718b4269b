//! End-to-end tests for the observer `WebSocket`.
//!
//! Each test serves the real router on an ephemeral port and talks to it
//! with a `tokio-tungstenite` client.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use geopolitics_core::config::SimulationConfig;
use geopolitics_core::economy::EconomyModel;
use geopolitics_core::roster;
use geopolitics_core::simulation::Simulation;
use geopolitics_core::world::WorldState;
use geopolitics_observer::hub::BroadcastHub;
use geopolitics_observer::server::serve;
use geopolitics_observer::state::AppState;
use geopolitics_types::{GameSpeed, WorldSnapshot};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn start() -> (Arc<AppState>, SocketAddr) {
    let config = SimulationConfig::default();
    let catalog = roster::catalog().unwrap();
    let world = WorldState::bootstrap(&catalog, &roster::relations(), &config).unwrap();
    let hub = Arc::new(BroadcastHub::new(8));
    let sim = Arc::new(Simulation::new(world, hub.clone()));
    let state = Arc::new(AppState::new(
        sim,
        hub,
        Arc::new(catalog),
        EconomyModel::new(config.economy),
        false,
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, Arc::clone(&state)));
    (state, addr)
}

async fn connect(addr: SocketAddr, path: &str) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}{path}")).await.unwrap();
    client
}

async fn next_snapshot(client: &mut Client) -> WorldSnapshot {
    loop {
        let msg = tokio::time::timeout(WAIT, client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn send(client: &mut Client, frame: &str) {
    client.send(Message::text(frame)).await.unwrap();
}

async fn wait_for_connections(state: &AppState, expected: usize) {
    tokio::time::timeout(WAIT, async {
        while state.hub.connection_count() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn first_frame_is_the_current_snapshot() {
    let (state, addr) = start().await;
    let mut client = connect(addr, "/ws").await;

    let first = next_snapshot(&mut client).await;
    assert_eq!(first, state.sim.snapshot().await);
    assert!(first.paused);
    assert_eq!(first.date, "January 1, 2025");
}

#[tokio::test]
async fn api_ws_alias_serves_the_same_stream() {
    let (state, addr) = start().await;
    let mut client = connect(addr, "/api/ws").await;

    assert_eq!(next_snapshot(&mut client).await, state.sim.snapshot().await);
}

#[tokio::test]
async fn commands_from_one_observer_reach_every_observer_in_order() {
    let (state, addr) = start().await;
    let mut first = connect(addr, "/ws").await;
    let mut second = connect(addr, "/ws").await;
    next_snapshot(&mut first).await;
    next_snapshot(&mut second).await;
    wait_for_connections(&state, 2).await;

    send(&mut first, r#"{"action":"set_speed","speed":"fast"}"#).await;
    send(&mut first, r#"{"action":"resume"}"#).await;

    for client in [&mut first, &mut second] {
        let after_speed = next_snapshot(client).await;
        assert_eq!(after_speed.speed, GameSpeed::Fast);
        assert!(after_speed.paused);

        let after_resume = next_snapshot(client).await;
        assert_eq!(after_resume.speed, GameSpeed::Fast);
        assert!(!after_resume.paused);
    }
    assert_eq!(state.sim.stats().report().commands_applied, 2);
}

#[tokio::test]
async fn malformed_frames_get_no_reply_and_keep_the_connection() {
    let (state, addr) = start().await;
    let mut client = connect(addr, "/ws").await;
    next_snapshot(&mut client).await;

    send(&mut client, "not json").await;
    send(&mut client, r#"{"action":"launch"}"#).await;
    send(&mut client, r#"{"action":"set_speed","speed":"warp"}"#).await;
    send(&mut client, r#"{"action":"pause"}"#).await;

    // The only reply is the snapshot from the one valid command.
    let next = next_snapshot(&mut client).await;
    assert!(next.paused);
    let report = state.sim.stats().report();
    assert_eq!(report.commands_rejected, 3);
    assert_eq!(report.commands_applied, 1);
    assert_eq!(state.hub.connection_count(), 1);
}

#[tokio::test]
async fn closing_a_socket_unregisters_it() {
    let (state, addr) = start().await;
    let mut staying = connect(addr, "/ws").await;
    let mut leaving = connect(addr, "/ws").await;
    next_snapshot(&mut staying).await;
    next_snapshot(&mut leaving).await;
    wait_for_connections(&state, 2).await;

    leaving.close(None).await.unwrap();
    wait_for_connections(&state, 1).await;

    send(&mut staying, r#"{"action":"resume"}"#).await;
    assert!(!next_snapshot(&mut staying).await.paused);
}
