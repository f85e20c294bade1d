//! Bridge benchmark suite.
//!
//! Benchmarks the three hot paths of the bridge:
//! - Send handoff from the callback side into the I/O task
//! - Full engine poll cycle (send, then poll recv until data lands)
//! - Registry routing under many registered sockets
//!
//! Run with: cargo bench --bench bridge
//! Results saved to: target/criterion/

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

use ssh2_ws_bridge::{SocketRegistry, Transport, TransportOptions, bridge_recv, bridge_send};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const PAYLOAD_SIZES: &[usize] = &[256, 4 * 1024, 64 * 1024];
const REGISTRY_SIZES: &[usize] = &[1, 64, 512];

// ============================================================================
// Benchmark: Send Handoff
// ============================================================================

fn bench_send_handoff(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("send_handoff");
    group.measurement_time(Duration::from_secs(10));

    for &size in PAYLOAD_SIZES {
        let transport = rt.block_on(async {
            let addr = spawn_sink_server().await;
            let transport = Arc::new(
                Transport::new(TransportOptions::new(format!("ws://{addr}"))).expect("transport"),
            );
            transport.connect().await.expect("connect");
            transport
        });

        let payload = vec![0x5Au8; size];
        group.bench_with_input(BenchmarkId::new("bytes", size), &size, |b, _| {
            b.iter(|| transport.send(payload.clone()));
        });

        transport.close();
    }

    group.finish();
}

// ============================================================================
// Benchmark: Engine Poll Cycle
// ============================================================================

fn bench_poll_cycle(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("poll_cycle");
    group.sample_size(30);
    group.measurement_time(Duration::from_secs(15));

    for &size in PAYLOAD_SIZES {
        let (registry, socket) = rt.block_on(async {
            let addr = spawn_echo_server().await;
            let transport = Arc::new(
                Transport::new(TransportOptions::new(format!("ws://{addr}"))).expect("transport"),
            );
            transport.connect().await.expect("connect");
            let socket = transport.id().as_i32();
            let registry = SocketRegistry::new();
            registry.register(transport).expect("register");
            (Arc::new(registry), socket)
        });

        // Engine memory: payload in the lower half, reply in the upper.
        let memory = {
            let mut backing = vec![0u8; size * 2];
            backing[..size].fill(0xA7);
            Arc::new(Mutex::new(backing))
        };

        group.bench_with_input(BenchmarkId::new("roundtrip", size), &size, |b, &size| {
            let registry = Arc::clone(&registry);
            let memory = Arc::clone(&memory);
            b.to_async(&rt).iter(move || {
                let registry = Arc::clone(&registry);
                let memory = Arc::clone(&memory);
                async move {
                    let sent = bridge_send(&registry, &*memory.lock(), socket, 0, size as u32);
                    assert_eq!(sent, size as i32);

                    loop {
                        let got = bridge_recv(
                            &registry,
                            &mut *memory.lock(),
                            socket,
                            size as u32,
                            size as u32,
                        );
                        if got != 0 {
                            assert_eq!(got, size as i32);
                            break;
                        }
                        tokio::task::yield_now().await;
                    }
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Registry Routing
// ============================================================================

fn bench_registry_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_routing");

    for &count in REGISTRY_SIZES {
        let registry = SocketRegistry::new();
        let mut last_id = None;
        for _ in 0..count {
            let transport = Arc::new(
                Transport::new(TransportOptions::new("ws://127.0.0.1:1/")).expect("transport"),
            );
            last_id = Some(registry.register(transport).expect("register"));
        }
        let socket_id = last_id.expect("at least one socket");

        // Disconnected sockets: measures lookup and routing, not I/O.
        group.bench_with_input(BenchmarkId::new("send", count), &count, |b, _| {
            b.iter(|| registry.send(socket_id, [0u8; 32]));
        });
    }

    group.finish();
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Accepts connections and echoes binary frames back.
async fn spawn_echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
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

/// Accepts connections and discards everything received.
async fn spawn_sink_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(message)) = ws.next().await {
                    if message.is_close() {
                        break;
                    }
                }
            });
        }
    });

    addr
}

// ============================================================================
// Criterion Setup
// ============================================================================

criterion_group!(
    benches,
    bench_send_handoff,
    bench_poll_cycle,
    bench_registry_routing
);
criterion_main!(benches);
