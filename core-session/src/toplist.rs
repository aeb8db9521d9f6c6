use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{ErrorType, RawHandle, ToplistType, REGION_EVERYWHERE, REGION_USER};

use crate::callback::Completion;
use crate::context::SessionCore;
use crate::error::{Result, SessionError};
use crate::handle::NativeHandle;
use crate::load::Loadable;
use crate::objects::{Album, Artist, Track};
use crate::sequence::SequenceView;
use crate::signal::CompletionSignal;

/// Where a toplist is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToplistRegion {
    Everywhere,
    /// A single user's toplist.
    User,
    /// A country, by upper-case ISO 3166-1 alpha-2 code.
    Country([u8; 2]),
}

impl ToplistRegion {
    /// Parse a two-letter country code, in any case.
    pub fn country(code: &str) -> Result<Self> {
        match code.as_bytes() {
            [first, second] if first.is_ascii_alphabetic() && second.is_ascii_alphabetic() => Ok(
                ToplistRegion::Country([first.to_ascii_uppercase(), second.to_ascii_uppercase()]),
            ),
            _ => Err(SessionError::InvalidValue(format!(
                "Country code must be two ASCII letters, got {code:?}"
            ))),
        }
    }

    /// The native region value. Countries pack their two letters as
    /// `first << 8 | second`.
    pub fn code(&self) -> i32 {
        match self {
            ToplistRegion::Everywhere => REGION_EVERYWHERE,
            ToplistRegion::User => REGION_USER,
            ToplistRegion::Country([first, second]) => (i32::from(*first) << 8) | i32::from(*second),
        }
    }
}

impl fmt::Display for ToplistRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToplistRegion::Everywhere => f.write_str("everywhere"),
            ToplistRegion::User => f.write_str("user"),
            ToplistRegion::Country([first, second]) => {
                write!(f, "{}{}", char::from(*first), char::from(*second))
            }
        }
    }
}

/// How long a completed request took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDuration {
    /// Time spent waiting for the backend.
    Backend(Duration),
    /// Served from the local cache.
    LocalCache,
}

impl RequestDuration {
    /// Negative native values mean the local cache answered.
    pub(crate) fn from_millis(millis: i32) -> Self {
        u64::try_from(millis).map_or(RequestDuration::LocalCache, |millis| {
            RequestDuration::Backend(Duration::from_millis(millis))
        })
    }
}

struct ToplistInner {
    handle: NativeHandle,
    toplist_type: ToplistType,
    region: ToplistRegion,
    canonical_username: Option<String>,
    complete: CompletionSignal,
}

/// The result of a toplist browse request.
///
/// Toplists are not cached: every request yields a new object. Results are
/// empty until the request completes.
#[derive(Clone)]
pub struct Toplist(Arc<ToplistInner>);

impl Toplist {
    pub(crate) fn adopt(
        core: &Arc<SessionCore>,
        raw: RawHandle,
        toplist_type: ToplistType,
        region: ToplistRegion,
        canonical_username: Option<String>,
    ) -> Self {
        Self(Arc::new(ToplistInner {
            handle: NativeHandle::adopt(core, raw),
            toplist_type,
            region,
            canonical_username,
            complete: CompletionSignal::new(),
        }))
    }

    /// Completion work for this request: signal waiters, then run `callback`.
    pub(crate) fn completion<F>(&self, callback: Option<F>) -> Completion
    where
        F: FnOnce(&Toplist) + Send + 'static,
    {
        let toplist = self.clone();
        Box::new(move || {
            toplist.0.complete.set();
            if let Some(callback) = callback {
                callback(&toplist);
            }
        })
    }

    fn core(&self) -> &Arc<SessionCore> {
        self.0.handle.core()
    }

    pub fn raw(&self) -> RawHandle {
        self.0.handle.raw()
    }

    pub fn toplist_type(&self) -> ToplistType {
        self.0.toplist_type
    }

    pub fn region(&self) -> ToplistRegion {
        self.0.region
    }

    pub fn canonical_username(&self) -> Option<&str> {
        self.0.canonical_username.as_deref()
    }

    /// Set once the browse request has completed.
    pub fn complete_event(&self) -> &CompletionSignal {
        &self.0.complete
    }

    /// Native status of the request; [`ErrorType::IsLoading`] until it completes.
    pub fn error(&self) -> ErrorType {
        let core = self.core();
        let _serial = core.lock();
        core.sdk().toplistbrowse_error(self.raw())
    }

    /// Backend time spent on the request, once loaded.
    pub fn backend_request_duration(&self) -> Option<RequestDuration> {
        if !self.is_loaded() {
            return None;
        }
        let core = self.core();
        let _serial = core.lock();
        let millis = core.sdk().toplistbrowse_backend_request_duration(self.raw());
        Some(RequestDuration::from_millis(millis))
    }

    /// Fails on a request error other than still loading.
    fn check_error(&self) -> Result<()> {
        SessionError::maybe_raise_ignoring(self.error(), &[ErrorType::IsLoading])
    }

    pub fn tracks(&self) -> Result<SequenceView<Track>> {
        self.check_error()?;
        if !self.is_loaded() {
            return Ok(SequenceView::empty());
        }
        Ok(SequenceView::new(
            self.core(),
            self.raw(),
            |sdk, raw| sdk.toplistbrowse_num_tracks(raw),
            |sdk, raw, index| sdk.toplistbrowse_track(raw, index),
            Track::acquire,
        ))
    }

    pub fn albums(&self) -> Result<SequenceView<Album>> {
        self.check_error()?;
        if !self.is_loaded() {
            return Ok(SequenceView::empty());
        }
        Ok(SequenceView::new(
            self.core(),
            self.raw(),
            |sdk, raw| sdk.toplistbrowse_num_albums(raw),
            |sdk, raw, index| sdk.toplistbrowse_album(raw, index),
            Album::acquire,
        ))
    }

    pub fn artists(&self) -> Result<SequenceView<Artist>> {
        self.check_error()?;
        if !self.is_loaded() {
            return Ok(SequenceView::empty());
        }
        Ok(SequenceView::new(
            self.core(),
            self.raw(),
            |sdk, raw| sdk.toplistbrowse_num_artists(raw),
            |sdk, raw, index| sdk.toplistbrowse_artist(raw, index),
            Artist::acquire,
        ))
    }
}

impl Loadable for Toplist {
    fn is_loaded(&self) -> bool {
        let core = self.core();
        let _serial = core.lock();
        core.sdk().toplistbrowse_is_loaded(self.raw())
    }

    fn load(&self, timeout: Option<Duration>) -> Result<&Self> {
        self.core()
            .wait_loaded("toplist", timeout, Some(&self.0.complete), || self.is_loaded())?;
        Ok(self)
    }
}

impl PartialEq for Toplist {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}

impl Eq for Toplist {}

impl Hash for Toplist {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw().hash(state);
    }
}

impl fmt::Debug for Toplist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toplist")
            .field("type", &self.0.toplist_type)
            .field("region", &self.0.region)
            .field("canonical_username", &self.0.canonical_username)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_region_codes() {
        assert_eq!(ToplistRegion::Everywhere.code(), REGION_EVERYWHERE);
        assert_eq!(ToplistRegion::User.code(), REGION_USER);
    }

    #[test]
    fn test_country_code_packing() {
        let sweden = ToplistRegion::country("se").unwrap();
        assert_eq!(sweden, ToplistRegion::Country(*b"SE"));
        assert_eq!(sweden.code(), (i32::from(b'S') << 8) | i32::from(b'E'));
        assert_eq!(sweden.to_string(), "SE");
    }

    #[test]
    fn test_request_duration_sources() {
        assert_eq!(
            RequestDuration::from_millis(42),
            RequestDuration::Backend(Duration::from_millis(42))
        );
        assert_eq!(
            RequestDuration::from_millis(0),
            RequestDuration::Backend(Duration::ZERO)
        );
        assert_eq!(RequestDuration::from_millis(-1), RequestDuration::LocalCache);
    }

    #[test]
    fn test_invalid_country_codes() {
        for code in ["", "S", "SWE", "S1", "ÅÄ"] {
            assert!(
                matches!(ToplistRegion::country(code), Err(SessionError::InvalidValue(_))),
                "{code:?} should be rejected"
            );
        }
    }
}
