//! Tests for Server, Connection and Client
//!
//! These tests verify:
//! - Status mapping end to end over TCP
//! - Several clients sharing one store
//! - Malformed frames get an ERROR response
//! - Graceful shutdown

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use userstore::network::{Client, Server, ShutdownHandle};
use userstore::protocol::{read_response, Status};
use userstore::router::MAX_FIELD_LEN;
use userstore::{Config, Result, Router, StoreError, UserStore};

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    addr: SocketAddr,
    store: Arc<UserStore>,
    shutdown: ShutdownHandle,
    handle: Option<JoinHandle<Result<()>>>,
}

impl TestServer {
    fn start() -> Self {
        Self::start_with(
            Config::builder()
                .listen_addr("127.0.0.1:0")
                .worker_threads(4)
                .max_connections(16)
                .read_timeout_ms(2000)
                .build(),
        )
    }

    fn start_with(config: Config) -> Self {
        let store = Arc::new(UserStore::new());
        let router = Arc::new(Router::new(Arc::clone(&store)));
        let server = Server::bind(config, router).unwrap();

        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle();
        let handle = thread::spawn(move || server.run());

        Self {
            addr,
            store,
            shutdown,
            handle: Some(handle),
        }
    }

    fn client(&self) -> Client {
        Client::connect(self.addr).unwrap()
    }

    fn stop(mut self) {
        self.shutdown.shutdown();
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap().unwrap();
        }
    }
}

// =============================================================================
// End-to-End Tests
// =============================================================================

#[test]
fn test_ping() {
    let server = TestServer::start();
    {
        let mut client = server.client();
        client.ping().unwrap();
    }
    server.stop();
}

#[test]
fn test_crud_over_tcp() {
    let server = TestServer::start();
    {
        let mut client = server.client();

        let alice = client.create("Alice", "a@x.com").unwrap();
        assert_eq!(alice.id, 1);
        let bob = client.create("Bob", "b@x.com").unwrap();
        assert_eq!(bob.id, 2);

        assert_eq!(client.list().unwrap(), vec![alice.clone(), bob]);

        let updated = client.update(1, "Alice2", "a2@x.com").unwrap();
        assert_eq!(updated.name, "Alice2");
        assert_eq!(client.get(1).unwrap(), updated);

        client.delete(2).unwrap();
        assert_eq!(client.list().unwrap(), vec![updated]);
    }
    server.stop();
}

#[test]
fn test_not_found_statuses() {
    let server = TestServer::start();
    {
        let mut client = server.client();

        assert!(matches!(client.get(9), Err(StoreError::NotFound(9))));
        assert!(matches!(
            client.update(9, "Ghost", "g@x.com"),
            Err(StoreError::NotFound(9))
        ));
        assert!(matches!(client.delete(9), Err(StoreError::NotFound(9))));

        // Connection stays usable after expected failures
        client.ping().unwrap();
    }
    server.stop();
}

#[test]
fn test_bad_request_status() {
    let server = TestServer::start();
    {
        let mut client = server.client();

        match client.create("", "a@x.com") {
            Err(StoreError::InvalidInput(message)) => assert_eq!(message, "name is required"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
        assert!(client.list().unwrap().is_empty());
    }
    assert!(server.store.is_empty());
    server.stop();
}

#[test]
fn test_clients_share_one_store() {
    let server = TestServer::start();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let addr = server.addr;
            thread::spawn(move || {
                let mut client = Client::connect(addr).unwrap();
                (0..25)
                    .map(|i| {
                        client
                            .create(&format!("user{}_{}", t, i), "u@x.com")
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    ids.sort_unstable();

    assert_eq!(ids, (1..=100).collect::<Vec<u64>>());
    assert_eq!(server.store.len(), 100);
    server.stop();
}

#[test]
fn test_malformed_frame_gets_error_response() {
    let server = TestServer::start();
    {
        let mut stream = TcpStream::connect(server.addr).unwrap();
        stream.write_all(&[0xEE, 0x00, 0x00, 0x00, 0x00]).unwrap();
        stream.flush().unwrap();

        let response = read_response(&mut stream).unwrap();
        assert_eq!(response.status, Status::Error);
        assert!(response.message().contains("Unknown command type"));

        // Server closes the connection after a protocol error
        let mut rest = Vec::new();
        let read = stream.read_to_end(&mut rest).unwrap_or(0);
        assert_eq!(read, 0);
    }
    server.stop();
}

#[test]
fn test_oversized_fields_rejected_on_create() {
    let server = TestServer::start();
    {
        let mut client = server.client();
        let huge = "n".repeat(6 * 1024 * 1024);

        for _ in 0..3 {
            match client.create(&huge, "e@x.com") {
                Err(StoreError::InvalidInput(message)) => {
                    assert_eq!(message, format!("name exceeds {} bytes", MAX_FIELD_LEN))
                }
                other => panic!("Expected InvalidInput, got {:?}", other),
            }
        }

        assert!(client.list().unwrap().is_empty());
    }
    server.stop();
}

#[test]
fn test_list_too_large_for_one_frame_keeps_connection_in_sync() {
    let server = TestServer::start();

    // Bypass the router's field limit to build a store whose listing
    // cannot fit in one frame
    let huge = "n".repeat(6 * 1024 * 1024);
    for _ in 0..3 {
        server.store.create(huge.as_str(), "e@x.com");
    }
    {
        let mut client = server.client();

        match client.list() {
            Err(StoreError::Remote(message)) => assert!(message.contains("reply too large")),
            other => panic!("Expected Remote error, got {:?}", other.map(|u| u.len())),
        }

        // A single user still fits, and the stream is still aligned
        assert_eq!(client.get(2).unwrap().name.len(), huge.len());
        client.ping().unwrap();
    }
    server.stop();
}

#[test]
fn test_shutdown_closes_idle_and_queued_connections() {
    let server = TestServer::start_with(
        Config::builder()
            .listen_addr("127.0.0.1:0")
            .worker_threads(1)
            .read_timeout_ms(0)
            .build(),
    );

    // Occupies the only worker and then sits idle with no read timeout
    let mut idle = server.client();
    idle.ping().unwrap();

    // Accepted but left waiting in the queue behind `idle`
    let mut queued = TcpStream::connect(server.addr).unwrap();
    thread::sleep(Duration::from_millis(200));

    server.stop();

    let response = read_response(&mut queued).unwrap();
    assert_eq!(response.status, Status::Error);
    assert_eq!(response.message(), "server shutting down");

    assert!(idle.ping().is_err());
}

#[test]
fn test_bind_rejects_invalid_config() {
    let config = Config::builder()
        .listen_addr("127.0.0.1:0")
        .worker_threads(0)
        .build();
    let router = Arc::new(Router::new(Arc::new(UserStore::new())));

    let result = Server::bind(config, router);
    assert!(matches!(result, Err(StoreError::Config(_))));
}

#[test]
fn test_shutdown_stops_run() {
    let server = TestServer::start();
    let shutdown = server.shutdown.clone();

    server.stop();
    assert!(shutdown.is_shutdown());
}
