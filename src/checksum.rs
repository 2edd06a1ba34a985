//! Streaming content checksums
//!
//! Local files and remote streams are hashed through the same [`ByteSource`]
//! capability, so a digest computed on either side can be compared directly.

use async_trait::async_trait;
use sha2::{Digest, Sha256, Sha512};
use std::io;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ChecksumError;
use crate::strategies::ChecksumAlgorithm;

/// Read buffer size used for hashing
pub const CHUNK_SIZE: usize = 4096;

/// Sequential byte read with end-of-stream signal
///
/// `read_chunk` fills a prefix of `buf` and returns its length. `Ok(0)`
/// means end of stream; a short read does not.
#[async_trait]
pub trait ByteSource: Send {
	async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Adapter turning any tokio reader into a [`ByteSource`]
pub struct ReaderSource<R> {
	inner: R,
}

impl<R: AsyncRead + Unpin + Send> ReaderSource<R> {
	pub fn new(inner: R) -> Self {
		Self { inner }
	}
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> ByteSource for ReaderSource<R> {
	async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		self.inner.read(buf).await
	}
}

/// Incremental digest accumulator
pub enum Hasher {
	Sha256(Sha256),
	Sha512(Sha512),
	Blake3(Box<blake3::Hasher>),
}

impl Hasher {
	pub fn new(algorithm: ChecksumAlgorithm) -> Self {
		match algorithm {
			ChecksumAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
			ChecksumAlgorithm::Sha512 => Hasher::Sha512(Sha512::new()),
			ChecksumAlgorithm::Blake3 => Hasher::Blake3(Box::new(blake3::Hasher::new())),
		}
	}

	pub fn update(&mut self, data: &[u8]) {
		match self {
			Hasher::Sha256(h) => Digest::update(h, data),
			Hasher::Sha512(h) => Digest::update(h, data),
			Hasher::Blake3(h) => {
				h.update(data);
			}
		}
	}

	/// Consume the accumulator, returning the lowercase hex digest
	pub fn finalize_hex(self) -> String {
		match self {
			Hasher::Sha256(h) => hex::encode(h.finalize()),
			Hasher::Sha512(h) => hex::encode(h.finalize()),
			Hasher::Blake3(h) => h.finalize().to_hex().to_string(),
		}
	}
}

/// Hash a source to exhaustion using [`CHUNK_SIZE`] reads
pub async fn checksum<S>(source: &mut S, algorithm: ChecksumAlgorithm) -> io::Result<String>
where
	S: ByteSource + ?Sized,
{
	checksum_with_chunk_size(source, algorithm, CHUNK_SIZE).await
}

/// Hash a source to exhaustion using reads of at most `chunk_size` bytes
pub async fn checksum_with_chunk_size<S>(
	source: &mut S,
	algorithm: ChecksumAlgorithm,
	chunk_size: usize,
) -> io::Result<String>
where
	S: ByteSource + ?Sized,
{
	let mut hasher = Hasher::new(algorithm);
	let mut buf = vec![0u8; chunk_size.max(1)];

	loop {
		let n = match source.read_chunk(&mut buf).await {
			Ok(0) => break,
			Ok(n) => n,
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => return Err(e),
		};
		hasher.update(&buf[..n]);
	}

	Ok(hasher.finalize_hex())
}

/// Hash a local file
pub async fn checksum_file(path: &Path, algorithm: ChecksumAlgorithm) -> Result<String, ChecksumError> {
	let file = tokio::fs::File::open(path).await.map_err(|e| ChecksumError::Open {
		path: path.display().to_string(),
		source: e,
	})?;
	let mut source = ReaderSource::new(file);
	checksum(&mut source, algorithm)
		.await
		.map_err(|e| ChecksumError::Read { path: path.display().to_string(), source: e })
}

/// Hash an in-memory buffer in one call
pub fn checksum_bytes(data: &[u8], algorithm: ChecksumAlgorithm) -> String {
	let mut hasher = Hasher::new(algorithm);
	hasher.update(data);
	hasher.finalize_hex()
}


// vim: ts=4
