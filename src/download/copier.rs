//! Chunked stream copy with progress reporting.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{TransferError, TransferSide};

use super::progress::ProgressObserver;

/// Bytes read per chunk.
pub const CHUNK_SIZE: usize = 81920;

/// Copies `source` into `destination` in [`CHUNK_SIZE`] chunks.
pub async fn copy<R, W, P>(
    source: &mut R,
    destination: &mut W,
    observer: &P,
) -> Result<u64, TransferError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
    P: ProgressObserver + ?Sized,
{
    copy_with_chunk_size(source, destination, observer, CHUNK_SIZE).await
}

/// Copies `source` into `destination`, reading at most `chunk_size` bytes at
/// a time. Each chunk is fully written before the next read, then the
/// observer receives the cumulative count. On error the destination keeps
/// what was already written.
pub async fn copy_with_chunk_size<R, W, P>(
    source: &mut R,
    destination: &mut W,
    observer: &P,
    chunk_size: usize,
) -> Result<u64, TransferError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
    P: ProgressObserver + ?Sized,
{
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut total: u64 = 0;

    loop {
        let read = source
            .read(&mut buffer)
            .await
            .map_err(|source| TransferError {
                side: TransferSide::Read,
                bytes_copied: total,
                source,
            })?;
        if read == 0 {
            break;
        }

        destination
            .write_all(&buffer[..read])
            .await
            .map_err(|source| TransferError {
                side: TransferSide::Write,
                bytes_copied: total,
                source,
            })?;

        total += read as u64;
        observer.on_progress(total);
    }

    destination.flush().await.map_err(|source| TransferError {
        side: TransferSide::Write,
        bytes_copied: total,
        source,
    })?;

    Ok(total)
}
