// Copyright Rouven Bauer
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::result::Result as StdResult;
use std::sync::Arc;
use std::time::Duration;

use super::bookmarks::{BookmarkManager, Bookmarks};
use crate::driver::config::auth::AuthToken;
use crate::driver::config::notification::NotificationFilter;
use crate::driver::config::ConfigureFetchSizeError;

/// Configuration for a [`Session`](super::super::Session).
///
/// Created with [`SessionConfig::new()`] and passed to [`Driver::session()`](super::super::Driver::session()).
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub(crate) database: Option<Arc<String>>,
    pub(crate) bookmarks: Option<Arc<Bookmarks>>,
    pub(crate) bookmark_manager: Option<Arc<dyn BookmarkManager>>,
    pub(crate) impersonated_user: Option<Arc<String>>,
    pub(crate) auth: Option<Arc<AuthToken>>,
    pub(crate) fetch_size: Option<i64>,
    pub(crate) notification_filter: NotificationFilter,
}

impl SessionConfig {
    /// Create a new session configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the session to a specific database.
    ///
    /// Without this, the driver has to guess the home database of every query, which costs an
    /// extra network round trip against a clustered (causal) deployment.
    pub fn with_database(mut self, database: Arc<String>) -> Self {
        self.database = Some(database);
        self
    }

    /// Let the driver resolve the home database for every query.
    ///
    /// This is the *default*.
    pub fn without_database(mut self) -> Self {
        self.database = None;
        self
    }

    /// Make all work done in this session causally consistent with the given bookmarks.
    pub fn with_bookmarks(mut self, bookmarks: Arc<Bookmarks>) -> Self {
        self.bookmarks = Some(bookmarks);
        self
    }

    /// Don't causally chain this session to any prior bookmarks.
    ///
    /// This is the *default*.
    pub fn without_bookmarks(mut self) -> Self {
        self.bookmarks = None;
        self
    }

    /// Use the given [`BookmarkManager`] to automatically track and supply bookmarks for this
    /// session.
    pub fn with_bookmark_manager(mut self, manager: Arc<dyn BookmarkManager>) -> Self {
        self.bookmark_manager = Some(manager);
        self
    }

    /// Don't use a [`BookmarkManager`].
    ///
    /// This is the *default*.
    pub fn without_bookmark_manager(mut self) -> Self {
        self.bookmark_manager = None;
        self
    }

    /// Impersonate a different user for all queries run in this session.
    pub fn with_impersonated_user(mut self, user: Arc<String>) -> Self {
        self.impersonated_user = Some(user);
        self
    }

    /// Don't impersonate any user.
    ///
    /// This is the *default*.
    pub fn without_impersonated_user(mut self) -> Self {
        self.impersonated_user = None;
        self
    }

    /// Use a different auth token for connections acquired through this session, overriding
    /// whatever was configured on the [`Driver`](super::super::Driver).
    pub fn with_session_auth(mut self, auth: Arc<AuthToken>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Use the driver's default auth for this session.
    ///
    /// This is the *default*.
    pub fn without_session_auth(mut self) -> Self {
        self.auth = None;
        self
    }

    /// Change the fetch size to fetch `fetch_size` records at once for this session.
    ///
    /// See also [`DriverConfig::with_fetch_size()`](super::super::config::DriverConfig::with_fetch_size())
    /// which is the same setting but for the whole driver.
    ///
    /// # Errors
    /// A [`ConfigureFetchSizeError`] is returned if `fetch_size` is greater than [`i64::MAX`].
    #[allow(clippy::result_large_err)]
    pub fn with_fetch_size(
        mut self,
        fetch_size: u64,
    ) -> StdResult<Self, ConfigureFetchSizeError<Self>> {
        match i64::try_from(fetch_size) {
            Ok(fetch_size) => {
                self.fetch_size = Some(fetch_size);
                Ok(self)
            }
            Err(_) => Err(ConfigureFetchSizeError { builder: self }),
        }
    }

    /// Fetch all records at once for this session.
    pub fn with_fetch_all(mut self) -> Self {
        self.fetch_size = Some(-1);
        self
    }

    /// Use the driver's default fetch size for this session.
    ///
    /// This is the *default*.
    pub fn with_default_fetch_size(mut self) -> Self {
        self.fetch_size = None;
        self
    }

    /// Overwrite which notifications the server should send back for queries run in this
    /// session.
    pub fn with_notification_filter(mut self, filter: NotificationFilter) -> Self {
        self.notification_filter = filter;
        self
    }
}

impl AsRef<SessionConfig> for SessionConfig {
    #[inline]
    fn as_ref(&self) -> &SessionConfig {
        self
    }
}

/// Fully resolved session configuration, carrying the pieces that aren't part of the public
/// builder surface (like whether to eagerly open transactions).
#[derive(Debug)]
pub(crate) struct InternalSessionConfig {
    pub(crate) config: SessionConfig,
    pub(crate) eager_begin: bool,
    pub(crate) idle_time_before_connection_test: Option<Duration>,
}

impl InternalSessionConfig {
    pub(crate) fn new(config: SessionConfig, idle_time_before_connection_test: Option<Duration>) -> Self {
        Self {
            config,
            eager_begin: false,
            idle_time_before_connection_test,
        }
    }
}
