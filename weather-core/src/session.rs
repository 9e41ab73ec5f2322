//! What a front end shows for the most recent lookup.
//!
//! Every lookup gets a [`RequestToken`]. Only the newest token may change the
//! view, so a slow response for a city the user has already moved away from
//! is dropped instead of overwriting the current one.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    WeatherError,
    model::{City, WeatherReading},
    provider::WeatherProvider,
};

/// Identifies one lookup. Tokens from the same session increase strictly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading {
        city: City,
    },
    Failed {
        city: City,
        message: String,
    },
    Ready(WeatherReading),
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading { .. })
    }

    pub fn reading(&self) -> Option<&WeatherReading> {
        match self {
            ViewState::Ready(reading) => Some(reading),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    latest: u64,
    view: ViewState,
}

/// Shared view state. Cloning gives another handle to the same session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<Inner>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ViewState {
        self.inner.lock().view.clone()
    }

    /// Start a lookup for `city`; the view switches to loading.
    pub fn begin(&self, city: &City) -> RequestToken {
        let mut inner = self.inner.lock();
        inner.latest += 1;
        inner.view = ViewState::Loading { city: city.clone() };
        RequestToken(inner.latest)
    }

    /// Record the outcome of a lookup.
    ///
    /// Returns `false` without touching the view when a newer lookup has
    /// started since `token` was issued.
    pub fn complete(
        &self,
        token: RequestToken,
        city: &City,
        result: Result<WeatherReading, WeatherError>,
    ) -> bool {
        let mut inner = self.inner.lock();
        if token.0 != inner.latest {
            tracing::debug!(
                "Dropping stale weather response for {} (request {}, latest {})",
                city,
                token.0,
                inner.latest
            );
            return false;
        }

        inner.view = match result {
            Ok(reading) => ViewState::Ready(reading),
            Err(e) => ViewState::Failed {
                city: city.clone(),
                message: e.to_string(),
            },
        };
        true
    }

    /// Run a full lookup and return the view afterwards.
    ///
    /// If a newer lookup was started meanwhile, the returned view is that
    /// lookup's state, not this one's.
    pub async fn fetch(&self, provider: &dyn WeatherProvider, city: &City) -> ViewState {
        let token = self.begin(city);
        let result = provider.fetch(city).await;
        if let Err(e) = &result {
            tracing::warn!("Weather lookup for {} via {} failed: {}", city, provider.id(), e);
        }
        self.complete(token, city, result);
        self.view()
    }
}
