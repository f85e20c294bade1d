//! Bridged socket against a local echo server.
//!
//! Demonstrates:
//! - Connecting a Transport and registering it
//! - Driving the engine-facing callbacks by hand
//! - The sentinel answers for empty polls and dead sockets
//!
//! Usage:
//!   cargo run --example echo_bridge
//!   cargo run --example echo_bridge -- --debug

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ssh2_ws_bridge::{SocketRegistry, Transport, TransportOptions, bridge_recv, bridge_send};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let debug = std::env::args().any(|a| a == "--debug");
    init_logging(debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    println!("=== Echo Bridge ===\n");

    // ========================================================================
    // Local Echo Server
    // ========================================================================

    println!("[1] Starting local echo server...");
    let addr = spawn_echo_server().await;
    println!("    ✓ Listening on ws://{addr}\n");

    // ========================================================================
    // Transport + Registry
    // ========================================================================

    println!("[2] Connecting transport...");

    let registry = Arc::new(SocketRegistry::new());
    let transport = Arc::new(Transport::new(
        TransportOptions::new(format!("ws://{addr}"))
            .with_protocol("binary")
            .with_connect_timeout(Duration::from_secs(5)),
    )?);
    transport
        .connect()
        .await
        .context("connect to the local echo server")?;
    let socket_id = registry
        .register(Arc::clone(&transport))
        .context("register the transport")?;
    let socket = socket_id.as_i32();

    println!("    ✓ Connected, socket id {socket_id}\n");

    // ========================================================================
    // Engine-Style Poll Cycle
    // ========================================================================

    println!("[3] Driving the engine callbacks...");

    // The engine's view of the world: a flat memory with the outbound
    // payload at offset 0 and room for the reply at offset 128.
    let payload = b"SSH-2.0-echo_bridge\r\n";
    let mut memory = vec![0u8; 256];
    memory[..payload.len()].copy_from_slice(payload);

    let sent = bridge_send(&registry, &memory, socket, 0, payload.len() as u32);
    println!("    bridge_send -> {sent} (accepted {} bytes)", payload.len());

    let mut received = 0;
    let mut polls = 0u32;
    while received == 0 {
        polls += 1;
        received = bridge_recv(&registry, &mut memory, socket, 128, 100);
        if received == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
    println!("    bridge_recv -> {received} after {polls} poll(s)");

    let reply = &memory[128..128 + received as usize];
    println!("    ✓ Echo reply: {:?}\n", String::from_utf8_lossy(reply));

    // ========================================================================
    // Sentinel Behavior
    // ========================================================================

    println!("[4] Sentinels...");

    let empty = bridge_recv(&registry, &mut memory, socket, 128, 100);
    println!("    Empty queue poll -> {empty} (engine retries later)");

    registry.unregister(socket_id);
    let dead = bridge_send(&registry, &memory, socket, 0, payload.len() as u32);
    println!("    Send after unregister -> {dead} (EAGAIN, socket is dead)");

    println!("\n✓ Done");
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Accepts connections and echoes binary frames back.
async fn spawn_echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind echo server");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(message)) = ws.next().await {
                    if message.is_binary() && ws.send(message).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    addr
}

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let filter = if debug {
        "ssh2_ws_bridge=debug"
    } else {
        "ssh2_ws_bridge=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
