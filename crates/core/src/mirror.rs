//! Host buffers with an explicit device-resident snapshot.

/// A host-owned buffer, optionally mirrored to accelerator memory.
///
/// The device copy is never an independent source of truth: it is written
/// only by [`Mirrored::sync_to_device`], which snapshots the host contents
/// wholesale. `sync_count` makes the synchronization observable in tests.
#[derive(Debug, Clone)]
pub struct Mirrored<T> {
    host: Vec<T>,
    device: Option<Vec<T>>,
    sync_count: usize,
}

impl<T: Copy> Mirrored<T> {
    pub fn new(host: Vec<T>) -> Self {
        Self {
            host,
            device: None,
            sync_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.host.len()
    }

    pub fn is_empty(&self) -> bool {
        self.host.is_empty()
    }

    pub fn host(&self) -> &[T] {
        &self.host
    }

    /// Mutable host access; used during construction only. A mirrored copy
    /// becomes stale until the next `sync_to_device`.
    pub fn host_mut(&mut self) -> &mut [T] {
        &mut self.host
    }

    /// Copy the host contents to the device side as one immutable snapshot.
    pub fn sync_to_device(&mut self) {
        self.device = Some(self.host.clone());
        self.sync_count += 1;
    }

    pub fn is_mirrored(&self) -> bool {
        self.device.is_some()
    }

    pub fn device(&self) -> Option<&[T]> {
        self.device.as_deref()
    }

    pub fn sync_count(&self) -> usize {
        self.sync_count
    }
}
