//! Live, read-only views over native arrays.

use std::fmt;
use std::sync::Arc;

use bridge_traits::{NativeSdk, RawHandle};

use crate::context::SessionCore;
use crate::error::{Result, SessionError};
use crate::handle::NativeHandle;

type LenFn = fn(&dyn NativeSdk, RawHandle) -> i32;
type ItemFn = fn(&dyn NativeSdk, RawHandle, i32) -> Option<RawHandle>;
type WrapFn<T> = fn(&Arc<SessionCore>, RawHandle) -> T;

struct Source<T> {
    owner: NativeHandle,
    len: LenFn,
    item: ItemFn,
    wrap: WrapFn<T>,
}

/// An indexable view over items owned by a native object.
///
/// The length is read from the native side on every call and never cached,
/// so the view follows the owner as it loads. The view holds its own
/// reference to the owner. An empty view stands in for results that are not
/// available yet.
pub struct SequenceView<T> {
    source: Option<Source<T>>,
}

impl<T> SequenceView<T> {
    pub(crate) fn new(
        core: &Arc<SessionCore>,
        owner: RawHandle,
        len: LenFn,
        item: ItemFn,
        wrap: WrapFn<T>,
    ) -> Self {
        Self {
            source: Some(Source {
                owner: NativeHandle::acquire(core, owner),
                len,
                item,
                wrap,
            }),
        }
    }

    pub fn empty() -> Self {
        Self { source: None }
    }

    pub fn len(&self) -> usize {
        let Some(source) = &self.source else {
            return 0;
        };
        let core = source.owner.core();
        let _serial = core.lock();
        usize::try_from((source.len)(core.sdk(), source.owner.raw())).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Result<T> {
        let len = self.len();
        let Some(source) = self.source.as_ref().filter(|_| index < len) else {
            return Err(SessionError::out_of_range(index, len));
        };
        let core = source.owner.core();
        let _serial = core.lock();
        let position = i32::try_from(index).map_err(|_| SessionError::out_of_range(index, len))?;
        match (source.item)(core.sdk(), source.owner.raw(), position) {
            Some(raw) => Ok((source.wrap)(core, raw)),
            None => Err(SessionError::out_of_range(index, len)),
        }
    }

    /// Items in order, stopping early if the native array shrinks underneath.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len()).map_while(move |index| self.get(index).ok())
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for SequenceView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
