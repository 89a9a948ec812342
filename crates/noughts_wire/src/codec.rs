//! Primitive field codec.
//!
//! Integers are 32-bit two's complement, big-endian. Strings map bytes to
//! characters one to one (Latin-1), with no multi-byte decoding. There is no
//! length prefix anywhere: each opcode implies the shape of its payload.

use super::error::{WireError, WireErrorKind};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{instrument, trace};

/// Byte written in place of characters outside Latin-1.
const UNMAPPABLE: u8 = b'?';

/// Reads wire fields from an async byte stream.
#[derive(Debug)]
pub struct WireReader<R> {
    inner: R,
}

impl<R: AsyncRead + Unpin> WireReader<R> {
    /// Wraps a byte stream. Callers reading a socket should hand in a
    /// buffered reader, since terminated strings are read byte by byte.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwraps the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads one byte.
    pub async fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.inner.read_u8().await?)
    }

    /// Reads one byte, failing with `Timeout` if none arrives within `limit`.
    #[instrument(skip(self))]
    pub async fn read_u8_within(&mut self, limit: Duration) -> Result<u8, WireError> {
        match tokio::time::timeout(limit, self.inner.read_u8()).await {
            Ok(byte) => Ok(byte?),
            Err(_) => Err(WireError::new(WireErrorKind::Timeout(limit))),
        }
    }

    /// Reads exactly 4 bytes as a big-endian `i32`.
    pub async fn read_int32(&mut self) -> Result<i32, WireError> {
        Ok(self.inner.read_i32().await?)
    }

    /// Reads exactly `len` bytes, maps each to a character and strips
    /// trailing whitespace.
    pub async fn read_fixed_string(&mut self, len: usize) -> Result<String, WireError> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf).await?;
        let text: String = buf.iter().map(|&b| char::from(b)).collect();
        Ok(text.trim_end_matches(|c: char| c <= ' ').to_string())
    }

    /// Reads a string ended by two consecutive zero bytes.
    ///
    /// Every non-zero byte is kept; a lone zero followed by a non-zero
    /// byte is dropped. There is no length limit.
    pub async fn read_terminated_string(&mut self) -> Result<String, WireError> {
        let mut text = String::new();
        let mut previous_zero = false;
        loop {
            let byte = self.read_u8().await?;
            if byte == 0 {
                if previous_zero {
                    break;
                }
                previous_zero = true;
            } else {
                previous_zero = false;
                text.push(char::from(byte));
            }
        }
        trace!(len = text.len(), "Read terminated string");
        Ok(text)
    }
}

/// Stages wire fields and writes them to an async byte stream in one go.
#[derive(Debug)]
pub struct WireWriter<W> {
    inner: W,
    staged: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> WireWriter<W> {
    /// Wraps a byte stream.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            staged: Vec::new(),
        }
    }

    /// Unwraps the underlying stream, discarding anything not yet flushed.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Stages one byte.
    pub fn write_u8(&mut self, byte: u8) {
        self.staged.push(byte);
    }

    /// Stages 4 bytes: `value` as big-endian two's complement.
    pub fn write_int32(&mut self, value: i32) {
        self.staged.extend_from_slice(&value.to_be_bytes());
    }

    /// Stages one byte per character, with no prefix or terminator.
    pub fn write_raw_string(&mut self, text: &str) {
        self.staged
            .extend(text.chars().map(|c| u8::try_from(c).unwrap_or(UNMAPPABLE)));
    }

    /// Stages exactly `len` bytes: `text` cut to length or padded with
    /// spaces, which the reader strips.
    pub fn write_fixed_string(&mut self, text: &str, len: usize) {
        let start = self.staged.len();
        self.write_raw_string(text);
        self.staged.resize(start + len, b' ');
    }

    /// Stages raw bytes of `text` followed by two zero bytes.
    pub fn write_terminated_string(&mut self, text: &str) {
        self.write_raw_string(text);
        self.staged.extend_from_slice(&[0, 0]);
    }

    /// Writes everything staged so far and flushes the stream.
    pub async fn flush(&mut self) -> Result<(), WireError> {
        let bytes = std::mem::take(&mut self.staged);
        self.inner.write_all(&bytes).await?;
        self.inner.flush().await?;
        trace!(len = bytes.len(), "Flushed frame");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn staged<F>(stage: F) -> Vec<u8>
    where
        F: FnOnce(&mut WireWriter<Vec<u8>>),
    {
        let mut writer = WireWriter::new(Vec::new());
        stage(&mut writer);
        writer.flush().await.unwrap();
        writer.into_inner()
    }

    #[tokio::test]
    async fn test_int32_round_trip_boundaries() {
        for value in [0, 1, -1, 42, 10_000, 99_999, i32::MIN, i32::MAX] {
            let bytes = staged(|w| w.write_int32(value)).await;
            assert_eq!(bytes, value.to_be_bytes().to_vec());
            let mut reader = WireReader::new(bytes.as_slice());
            assert_eq!(reader.read_int32().await.unwrap(), value);
        }
    }

    #[tokio::test]
    async fn test_int32_is_big_endian() {
        let bytes = staged(|w| w.write_int32(0x0102_0304)).await;
        assert_eq!(bytes, vec![1, 2, 3, 4]);
        let bytes = staged(|w| w.write_int32(-2)).await;
        assert_eq!(bytes, vec![0xFF, 0xFF, 0xFF, 0xFE]);
    }

    #[tokio::test]
    async fn test_truncated_int32() {
        let mut reader = WireReader::new(&[0u8, 0, 1][..]);
        let err = reader.read_int32().await.unwrap_err();
        assert_eq!(err.kind(), &WireErrorKind::Truncated);
    }

    #[tokio::test]
    async fn test_fixed_string_strips_trailing_whitespace() {
        let mut reader = WireReader::new(&b"1-1\0\0 2-2xyz"[..]);
        assert_eq!(reader.read_fixed_string(5).await.unwrap(), "1-1");
        assert_eq!(reader.read_fixed_string(3).await.unwrap(), " 2-");
        assert_eq!(reader.read_fixed_string(1).await.unwrap(), "2");
    }

    #[tokio::test]
    async fn test_fixed_string_maps_bytes_one_to_one() {
        let mut reader = WireReader::new(&[0xE9u8, b'-', b'1'][..]);
        assert_eq!(reader.read_fixed_string(3).await.unwrap(), "é-1");
    }

    #[tokio::test]
    async fn test_truncated_fixed_string() {
        let mut reader = WireReader::new(&b"1-"[..]);
        let err = reader.read_fixed_string(3).await.unwrap_err();
        assert_eq!(err.kind(), &WireErrorKind::Truncated);
    }

    #[tokio::test]
    async fn test_write_fixed_string_pads_and_cuts() {
        let bytes = staged(|w| {
            w.write_fixed_string("1", 3);
            w.write_fixed_string("0-0-0", 3);
        })
        .await;
        assert_eq!(bytes, b"1  0-0".to_vec());
    }

    #[tokio::test]
    async fn test_terminated_string_round_trip() {
        let samples = ["", "Ada", "Grace Hopper", "tabs\tand ~ punctuation!"];
        for text in samples {
            let bytes = staged(|w| w.write_terminated_string(text)).await;
            assert_eq!(bytes.len(), text.len() + 2);
            let mut reader = WireReader::new(bytes.as_slice());
            assert_eq!(reader.read_terminated_string().await.unwrap(), text);
        }
    }

    #[tokio::test]
    async fn test_terminated_string_all_ascii() {
        let text: String = (1u8..=127).map(char::from).collect();
        let bytes = staged(|w| w.write_terminated_string(&text)).await;
        let mut reader = WireReader::new(bytes.as_slice());
        assert_eq!(reader.read_terminated_string().await.unwrap(), text);
    }

    #[tokio::test]
    async fn test_terminated_string_skips_lone_zero() {
        let mut reader = WireReader::new(&b"ab\0cd\0\0rest"[..]);
        assert_eq!(reader.read_terminated_string().await.unwrap(), "abcd");
        assert_eq!(reader.read_fixed_string(4).await.unwrap(), "rest");
    }

    #[tokio::test]
    async fn test_terminated_string_needs_both_zeros() {
        let mut reader = WireReader::new(&b"abc\0"[..]);
        let err = reader.read_terminated_string().await.unwrap_err();
        assert_eq!(err.kind(), &WireErrorKind::Truncated);
    }

    #[tokio::test]
    async fn test_raw_string_replaces_wide_characters() {
        let bytes = staged(|w| w.write_raw_string("né€")).await;
        assert_eq!(bytes, vec![b'n', 0xE9, b'?']);
    }

    #[tokio::test]
    async fn test_read_within_times_out() {
        let (_client, server) = tokio::io::duplex(16);
        let mut reader = WireReader::new(server);
        let limit = Duration::from_millis(20);
        let err = reader.read_u8_within(limit).await.unwrap_err();
        assert_eq!(err.kind(), &WireErrorKind::Timeout(limit));
        assert!(err.is_connection_failure());
    }
}
