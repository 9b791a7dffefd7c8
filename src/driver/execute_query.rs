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

use std::collections::HashMap;
use std::result::Result as StdResult;
use std::sync::Arc;

use super::config::auth::AuthToken;
use super::config::notification::NotificationFilter;
use super::session::bookmarks::BookmarkManager;
use super::session::config::SessionConfig;
use super::session::retry::RetryPolicy;
use super::{Driver, EagerResult, RoutingControl};
use crate::error_::Result;
use crate::value::ValueSend;

/// Convenience builder to run a single auto-commit query without having to manage a
/// [`Session`](super::Session) explicitly.
///
/// Use [`Driver::execute_query()`] for creating one and call [`ExecuteQueryBuilder::run()`] or
/// [`ExecuteQueryBuilder::run_with_retry()`] to execute the query when you're done configuring it.
///
/// Internally, this opens a throwaway [`Session`](super::Session) configured from the options set
/// on this builder and runs the query as an auto-commit transaction on it.
pub struct ExecuteQueryBuilder<'driver> {
    driver: &'driver Driver,
    query: String,
    param: HashMap<String, ValueSend>,
    meta: HashMap<String, ValueSend>,
    mode: RoutingControl,
    database: Option<Arc<String>>,
    impersonated_user: Option<Arc<String>>,
    bookmark_manager: Option<Arc<dyn BookmarkManager>>,
    notification_filter: Option<NotificationFilter>,
    session_auth: Option<Arc<AuthToken>>,
}

impl<'driver> ExecuteQueryBuilder<'driver> {
    pub(crate) fn new(driver: &'driver Driver, query: impl Into<String>) -> Self {
        Self {
            driver,
            query: query.into(),
            param: Default::default(),
            meta: Default::default(),
            mode: RoutingControl::Write,
            database: None,
            impersonated_user: None,
            bookmark_manager: None,
            notification_filter: None,
            session_auth: None,
        }
    }

    /// Configure query parameters.
    #[inline]
    pub fn with_parameters(mut self, param: HashMap<String, ValueSend>) -> Self {
        self.param = param;
        self
    }

    /// Attach transaction metadata to the query.
    #[inline]
    pub fn with_transaction_meta(mut self, meta: HashMap<String, ValueSend>) -> Self {
        self.meta = meta;
        self
    }

    /// Choose whether to run the query against a reader or a writer in a clustered deployment.
    ///
    /// This is [`RoutingControl::Write`] by *default*.
    #[inline]
    pub fn with_routing_control(mut self, mode: RoutingControl) -> Self {
        self.mode = mode;
        self
    }

    /// Run the query against a specific database.
    ///
    /// Always specify this, if possible, to save the driver a round trip figuring out the home
    /// database.
    #[inline]
    pub fn with_database(mut self, database: Arc<String>) -> Self {
        self.database = Some(database);
        self
    }

    /// Impersonate a different user for this query.
    #[inline]
    pub fn with_impersonated_user(mut self, user: Arc<String>) -> Self {
        self.impersonated_user = Some(user);
        self
    }

    /// Use the given [`BookmarkManager`] to causally chain this query with other work.
    #[inline]
    pub fn with_bookmark_manager(mut self, manager: Arc<dyn BookmarkManager>) -> Self {
        self.bookmark_manager = Some(manager);
        self
    }

    /// Overwrite which notifications the server should send back for this query.
    #[inline]
    pub fn with_notification_filter(mut self, filter: NotificationFilter) -> Self {
        self.notification_filter = Some(filter);
        self
    }

    /// Use a different auth token for this query, overriding the driver's default.
    #[inline]
    pub fn with_session_auth(mut self, auth: Arc<AuthToken>) -> Self {
        self.session_auth = Some(auth);
        self
    }

    fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::new();
        if let Some(database) = self.database.clone() {
            config = config.with_database(database);
        }
        if let Some(user) = self.impersonated_user.clone() {
            config = config.with_impersonated_user(user);
        }
        if let Some(manager) = self.bookmark_manager.clone() {
            config = config.with_bookmark_manager(manager);
        }
        if let Some(filter) = self.notification_filter.clone() {
            config = config.with_notification_filter(filter);
        }
        if let Some(auth) = self.session_auth.clone() {
            config = config.with_session_auth(auth);
        }
        config
    }

    /// Run the query once.
    ///
    /// See also [`ExecuteQueryBuilder::run_with_retry()`] for running against a clustered or
    /// cloud-hosted DBMS, where many intermittent errors can occur.
    pub fn run(self) -> Result<EagerResult> {
        let config = self.session_config();
        let mut session = self.driver.session(config);
        session
            .auto_commit(self.query)
            .with_parameters(&self.param)
            .with_transaction_meta(&self.meta)
            .with_routing_control(self.mode)
            .run()
    }

    /// Run the query, retrying it if it fails with an error deemed retryable by the given
    /// `retry_policy`.
    ///
    /// See also [`RetryPolicy`].
    pub fn run_with_retry<P: RetryPolicy>(self, retry_policy: P) -> StdResult<EagerResult, P::Error> {
        let config = self.session_config();
        let mut session = self.driver.session(config);
        let query = self.query;
        let param = self.param;
        let meta = self.meta;
        let mode = self.mode;
        retry_policy.execute(|| {
            session
                .auto_commit(query.as_str())
                .with_parameters(&param)
                .with_transaction_meta(&meta)
                .with_routing_control(mode)
                .run()
        })
    }
}
