use std::fmt;
use std::sync::Arc;

use bridge_traits::RawHandle;
use parking_lot::Mutex;
use tracing::trace;

use crate::context::SessionCore;
use crate::error::{Result, SessionError};
use crate::handle::NativeHandle;
use crate::objects::Track;

struct Batch {
    total: usize,
    tracks: Vec<Option<RawHandle>>,
}

/// Tracks added to a playlist since the container last cleared them.
///
/// Fetched from the native side in growing batches as indexes are requested.
/// Holds its own references to both the container and the playlist.
pub struct PlaylistUnseenTracks {
    container: NativeHandle,
    playlist: NativeHandle,
    batch_size: usize,
    batch: Mutex<Batch>,
}

impl PlaylistUnseenTracks {
    pub(crate) fn new(
        core: &Arc<SessionCore>,
        container: RawHandle,
        playlist: RawHandle,
    ) -> Result<Self> {
        let unseen = Self {
            container: NativeHandle::acquire(core, container),
            playlist: NativeHandle::acquire(core, playlist),
            batch_size: core.config().unseen_tracks_batch_size.max(1),
            batch: Mutex::new(Batch {
                total: 0,
                tracks: Vec::new(),
            }),
        };
        {
            let mut batch = unseen.batch.lock();
            unseen.fetch(&mut batch, unseen.batch_size)?;
        }
        Ok(unseen)
    }

    fn fetch(&self, batch: &mut Batch, capacity: usize) -> Result<()> {
        let core = self.container.core();
        let _serial = core.lock();
        let mut buffer = vec![None; capacity];
        let count = core.sdk().container_get_unseen_tracks(
            self.container.raw(),
            self.playlist.raw(),
            &mut buffer,
        );
        let total = usize::try_from(count).map_err(|_| {
            SessionError::Operation("Failed to get unseen tracks for playlist".to_owned())
        })?;
        buffer.truncate(total.min(capacity));
        trace!(total, fetched = buffer.len(), "Fetched unseen tracks");
        batch.total = total;
        batch.tracks = buffer;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.batch.lock().total
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Result<Track> {
        let mut batch = self.batch.lock();
        while index < batch.total && index >= batch.tracks.len() {
            let fetched = batch.tracks.len();
            let capacity = batch.total.min(fetched + self.batch_size);
            self.fetch(&mut batch, capacity)?;
            if batch.tracks.len() <= fetched {
                break;
            }
        }
        let raw = batch
            .tracks
            .get(index)
            .copied()
            .flatten()
            .ok_or_else(|| SessionError::out_of_range(index, batch.total))?;
        drop(batch);
        Ok(Track::acquire(self.container.core(), raw))
    }

    pub fn iter(&self) -> impl Iterator<Item = Track> + '_ {
        (0..self.len()).map_while(move |index| self.get(index).ok())
    }

    pub fn to_vec(&self) -> Vec<Track> {
        self.iter().collect()
    }
}

impl fmt::Debug for PlaylistUnseenTracks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaylistUnseenTracks")
            .field("playlist", &self.playlist)
            .field("len", &self.len())
            .finish()
    }
}
