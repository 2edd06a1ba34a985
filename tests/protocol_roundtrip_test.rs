//! Client/server protocol tests over an in-process duplex pipe

use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;

use treecmp::checksum::{checksum, checksum_bytes, checksum_file};
use treecmp::error::ConnectionError;
use treecmp::protocol::{serve, ProtocolClient, ProtocolError};
use treecmp::scan::{scan_local, scan_remote, ScanOptions};
use treecmp::session::{LocalSession, RemoteSession, SessionError};
use treecmp::strategies::ChecksumAlgorithm;
use treecmp::types::{EntryKind, RemoteEntry};

type Client = ProtocolClient<BufReader<ReadHalf<DuplexStream>>, WriteHalf<DuplexStream>>;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Serve `base` over a duplex pipe and return a connected client
async fn start(base: &std::path::Path) -> (Client, JoinHandle<Result<(), ProtocolError>>) {
	let (client_io, server_io) = tokio::io::duplex(64 * 1024);

	let base = base.to_path_buf();
	let server = tokio::spawn(async move {
		let (read, write) = tokio::io::split(server_io);
		let mut session = LocalSession::new("server", base);
		serve(&mut session, BufReader::new(read), write).await
	});

	let (read, write) = tokio::io::split(client_io);
	let client = ProtocolClient::connect("duplex", BufReader::new(read), write, TIMEOUT, TIMEOUT)
		.await
		.unwrap();
	(client, server)
}

fn sample_tree() -> TempDir {
	let temp = TempDir::new().unwrap();
	fs::create_dir_all(temp.path().join("srv/sub")).unwrap();
	fs::write(temp.path().join("srv/a.txt"), "hi").unwrap();
	fs::write(temp.path().join("srv/sub/b.txt"), "x").unwrap();
	temp
}

// ============================================================================
// Session Operations
// ============================================================================

#[tokio::test]
async fn test_list_directory() {
	let temp = sample_tree();
	let (mut client, server) = start(temp.path()).await;

	let entries = client.list_directory("/srv").await.unwrap();
	assert_eq!(
		entries,
		vec![RemoteEntry::new("a.txt", EntryKind::File), RemoteEntry::new("sub", EntryKind::Directory)]
	);

	let err = client.list_directory("/missing").await.unwrap_err();
	assert!(err.is_not_found());

	client.close().await.unwrap();
	server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_remote_checksum_matches_local() {
	let temp = sample_tree();
	// spans several DATA frames
	let big: Vec<u8> = (0..200_000u32).map(|i| (i % 253) as u8).collect();
	fs::write(temp.path().join("srv/big.bin"), &big).unwrap();
	let (mut client, server) = start(temp.path()).await;

	for algorithm in [ChecksumAlgorithm::Sha256, ChecksumAlgorithm::Blake3] {
		let local = checksum_file(&temp.path().join("srv/big.bin"), algorithm).await.unwrap();
		let remote = {
			let mut stream = client.open_read("/srv/big.bin").await.unwrap();
			checksum(stream.as_mut(), algorithm).await.unwrap()
		};
		assert_eq!(local, remote);
		assert_eq!(remote, checksum_bytes(&big, algorithm));
	}

	// session still usable after streaming
	assert_eq!(client.list_directory("/srv/sub").await.unwrap().len(), 1);

	client.close().await.unwrap();
	server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_empty_file_stream() {
	let temp = sample_tree();
	fs::write(temp.path().join("srv/empty"), "").unwrap();
	let (mut client, server) = start(temp.path()).await;

	let digest = {
		let mut stream = client.open_read("/srv/empty").await.unwrap();
		checksum(stream.as_mut(), ChecksumAlgorithm::Sha256).await.unwrap()
	};
	assert_eq!(digest, checksum_bytes(b"", ChecksumAlgorithm::Sha256));

	client.close().await.unwrap();
	server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_open_missing_file() {
	let temp = sample_tree();
	let (mut client, server) = start(temp.path()).await;

	match client.open_read("/srv/nope.txt").await {
		Err(e) => assert!(e.is_not_found()),
		Ok(_) => panic!("opened a missing file"),
	}

	client.close().await.unwrap();
	server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_delete_then_not_found() {
	let temp = sample_tree();
	let (mut client, server) = start(temp.path()).await;

	client.delete_file("/srv/a.txt").await.unwrap();
	assert!(!temp.path().join("srv/a.txt").exists());

	let err = client.delete_file("/srv/a.txt").await.unwrap_err();
	assert!(matches!(err, SessionError::NotFound { .. }));

	client.close().await.unwrap();
	server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_scan_over_protocol_equals_local_scan() {
	let temp = sample_tree();
	let (mut client, server) = start(temp.path()).await;
	let options = ScanOptions::default();

	let remote = scan_remote(&mut client, "/srv", &options).await.unwrap();
	let local = scan_local(&temp.path().join("srv"), &options).await.unwrap();

	assert_eq!(remote.keys().collect::<Vec<_>>(), local.keys().collect::<Vec<_>>());
	for (path, record) in &remote {
		assert_eq!(record.checksum, local[path].checksum);
	}

	client.close().await.unwrap();
	server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_close_is_idempotent() {
	let temp = sample_tree();
	let (mut client, server) = start(temp.path()).await;
	client.close().await.unwrap();
	client.close().await.unwrap();
	server.await.unwrap().unwrap();
}

// ============================================================================
// Handshake and Malformed Input
// ============================================================================

#[tokio::test]
async fn test_version_mismatch_rejected() {
	let (client_io, mut server_io) = tokio::io::duplex(1024);
	server_io.write_all(b"{\"cmd\":\"READY\",\"ver\":99}\n").await.unwrap();

	let (read, write) = tokio::io::split(client_io);
	let result = ProtocolClient::connect("old", BufReader::new(read), write, TIMEOUT, TIMEOUT).await;
	assert!(matches!(result, Err(ConnectionError::HandshakeFailed { .. })));
}

#[tokio::test]
async fn test_silent_server_times_out() {
	let (client_io, _server_io) = tokio::io::duplex(1024);
	let (read, write) = tokio::io::split(client_io);
	let result =
		ProtocolClient::connect("mute", BufReader::new(read), write, Duration::from_millis(100), TIMEOUT).await;
	assert!(matches!(result, Err(ConnectionError::Timeout { .. })));
}

#[tokio::test]
async fn test_closed_before_greeting() {
	let (client_io, server_io) = tokio::io::duplex(1024);
	drop(server_io);
	let (read, write) = tokio::io::split(client_io);
	let result = ProtocolClient::connect("gone", BufReader::new(read), write, TIMEOUT, TIMEOUT).await;
	assert!(matches!(result, Err(ConnectionError::HandshakeFailed { .. })));
}

#[tokio::test]
async fn test_server_answers_garbage_with_err() {
	let temp = sample_tree();
	let (client_io, server_io) = tokio::io::duplex(64 * 1024);
	let base = temp.path().to_path_buf();
	let server = tokio::spawn(async move {
		let (read, write) = tokio::io::split(server_io);
		let mut session = LocalSession::new("server", base);
		serve(&mut session, BufReader::new(read), write).await
	});

	let (read, mut write) = tokio::io::split(client_io);
	let mut lines = BufReader::new(read).lines();
	assert_eq!(lines.next_line().await.unwrap().unwrap(), r#"{"cmd":"READY","ver":1}"#);

	write.write_all(b"this is not json\n").await.unwrap();
	let reply = lines.next_line().await.unwrap().unwrap();
	assert!(reply.starts_with(r#"{"cmd":"ERR","kind":"other""#));

	write.write_all(b"{\"cmd\":\"DEL\",\"pth\":\"/srv/a.txt\"}\n").await.unwrap();
	assert_eq!(lines.next_line().await.unwrap().unwrap(), r#"{"cmd":"OK"}"#);

	write.write_all(b"{\"cmd\":\"QUIT\"}\n").await.unwrap();
	server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_unresponsive_server_surfaces_timeout() {
	let (client_io, mut server_io) = tokio::io::duplex(1024);
	server_io.write_all(b"{\"cmd\":\"READY\",\"ver\":1}\n").await.unwrap();

	let (read, write) = tokio::io::split(client_io);
	let mut client =
		ProtocolClient::connect("slow", BufReader::new(read), write, TIMEOUT, Duration::from_millis(100))
			.await
			.unwrap();

	let err = client.list_directory("/srv").await.unwrap_err();
	assert!(matches!(err, SessionError::Protocol(ProtocolError::Timeout { .. })));
	drop(server_io);
}

// vim: ts=4
