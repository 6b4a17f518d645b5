// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::task::Poll;

/// Helper used when converting Future interfaces to poll-based interfaces.
/// Stores excess data, and how much of it was already consumed, so it can be
/// drained across several polls of a smaller caller-provided buffer.
#[derive(Default)]
pub(crate) struct ReadBuffer(Option<(Vec<u8>, usize)>);

impl ReadBuffer {
    /// Removes any data stashed from a previous `put_data` call.
    pub fn take_data(&mut self) -> Option<(Vec<u8>, usize)> {
        self.0.take()
    }

    /// Writes as many bytes as possible, starting at `start`, to `target`,
    /// stashing whatever doesn't fit for the next call.
    pub fn put_data(
        &mut self,
        target: &mut tokio::io::ReadBuf<'_>,
        bytes: Vec<u8>,
        start: usize,
    ) -> Poll<std::io::Result<()>> {
        let remaining = &bytes[start..];
        if remaining.is_empty() {
            self.0 = None;
            // should not return Ok(), since if nothing is written to the target
            // it signals EOF. Instead wait for more data from the source.
            return Poll::Pending;
        }

        if target.remaining() >= remaining.len() {
            self.0 = None;
            target.put_slice(remaining);
        } else {
            let consumed = start + target.remaining();
            target.put_slice(&remaining[..target.remaining()]);
            self.0 = Some((bytes, consumed));
        }

        Poll::Ready(Ok(()))
    }
}
