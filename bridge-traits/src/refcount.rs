use crate::handle::RawHandle;

/// Reference counting on native resources.
///
/// Every kind of handle shares one counting scheme. `release` on a handle
/// whose count has reached zero is undefined behaviour in the real library;
/// the core guarantees it never happens.
pub trait ReferenceCounting: Send + Sync {
    /// Increment the reference count of `handle`.
    fn add_ref(&self, handle: RawHandle);

    /// Decrement the reference count of `handle`, freeing it at zero.
    fn release(&self, handle: RawHandle);
}
