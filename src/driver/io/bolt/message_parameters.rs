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

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::driver::config::auth::AuthToken;
use crate::driver::config::notification::NotificationFilter;
use crate::driver::session::bookmarks::Bookmarks;
use crate::value::ValueSend;

#[derive(Debug, Copy, Clone)]
pub(crate) struct HelloParameters<'a> {
    pub(crate) user_agent: &'a str,
    pub(crate) auth: &'a Arc<AuthToken>,
    pub(crate) routing_context: Option<&'a HashMap<String, ValueSend>>,
    pub(crate) notification_filter: &'a NotificationFilter,
}

impl<'a> HelloParameters<'a> {
    pub(crate) fn new(
        user_agent: &'a str,
        auth: &'a Arc<AuthToken>,
        routing_context: Option<&'a HashMap<String, ValueSend>>,
        notification_filter: &'a NotificationFilter,
    ) -> Self {
        Self {
            user_agent,
            auth,
            routing_context,
            notification_filter,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct ReauthParameters<'a> {
    pub(crate) auth: &'a Arc<AuthToken>,
    pub(crate) session_auth: bool,
}

impl<'a> ReauthParameters<'a> {
    pub(crate) fn new(auth: &'a Arc<AuthToken>, session_auth: bool) -> Self {
        Self { auth, session_auth }
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub(crate) struct GoodbyeParameters {}

impl GoodbyeParameters {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub(crate) struct ResetParameters {}

impl ResetParameters {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct RunParameters<'a, KP: Borrow<str> + Debug, KM: Borrow<str> + Debug> {
    pub(crate) query: &'a str,
    pub(crate) parameters: Option<&'a HashMap<KP, ValueSend>>,
    pub(crate) bookmarks: Option<&'a Bookmarks>,
    pub(crate) tx_timeout: Option<i64>,
    pub(crate) tx_metadata: Option<&'a HashMap<KM, ValueSend>>,
    pub(crate) mode: Option<&'a str>,
    pub(crate) db: Option<&'a str>,
    pub(crate) imp_user: Option<&'a str>,
    pub(crate) notification_filter: Option<&'a NotificationFilter>,
}

impl<'a, KP: Borrow<str> + Debug, KM: Borrow<str> + Debug> RunParameters<'a, KP, KM> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_auto_commit_run(
        query: &'a str,
        parameters: Option<&'a HashMap<KP, ValueSend>>,
        bookmarks: Option<&'a Bookmarks>,
        tx_timeout: Option<i64>,
        tx_metadata: Option<&'a HashMap<KM, ValueSend>>,
        mode: &'a str,
        db: Option<&'a str>,
        imp_user: Option<&'a str>,
        notification_filter: &'a NotificationFilter,
    ) -> Self {
        Self {
            query,
            parameters,
            bookmarks,
            tx_timeout,
            tx_metadata,
            mode: Some(mode),
            db,
            imp_user,
            notification_filter: Some(notification_filter),
        }
    }

    pub(crate) fn new_transaction_run(
        query: &'a str,
        parameters: Option<&'a HashMap<KP, ValueSend>>,
    ) -> Self {
        Self {
            query,
            parameters,
            bookmarks: None,
            tx_timeout: None,
            tx_metadata: None,
            mode: None,
            db: None,
            imp_user: None,
            notification_filter: None,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct DiscardParameters {
    pub(crate) n: i64,
    pub(crate) qid: i64,
}

impl DiscardParameters {
    pub(crate) fn new(n: i64, qid: i64) -> Self {
        Self { n, qid }
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct PullParameters {
    pub(crate) n: i64,
    pub(crate) qid: i64,
}

impl PullParameters {
    pub(crate) fn new(n: i64, qid: i64) -> Self {
        Self { n, qid }
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct BeginParameters<'a, K: Borrow<str> + Debug> {
    pub(crate) bookmarks: Option<&'a Bookmarks>,
    pub(crate) tx_timeout: Option<i64>,
    pub(crate) tx_metadata: Option<&'a HashMap<K, ValueSend>>,
    pub(crate) mode: Option<&'a str>,
    pub(crate) db: Option<&'a str>,
    pub(crate) imp_user: Option<&'a str>,
    pub(crate) notification_filter: &'a NotificationFilter,
}

impl<'a, K: Borrow<str> + Debug> BeginParameters<'a, K> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        bookmarks: Option<&'a Bookmarks>,
        tx_timeout: Option<i64>,
        tx_metadata: Option<&'a HashMap<K, ValueSend>>,
        mode: &'a str,
        db: Option<&'a str>,
        imp_user: Option<&'a str>,
        notification_filter: &'a NotificationFilter,
    ) -> Self {
        Self {
            bookmarks,
            tx_timeout,
            tx_metadata,
            mode: Some(mode),
            db,
            imp_user,
            notification_filter,
        }
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub(crate) struct CommitParameters {}

impl CommitParameters {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub(crate) struct RollbackParameters {}

impl RollbackParameters {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct RouteParameters<'a> {
    pub(crate) routing_context: &'a HashMap<String, ValueSend>,
    pub(crate) bookmarks: Option<&'a Bookmarks>,
    pub(crate) db: Option<&'a str>,
    pub(crate) imp_user: Option<&'a str>,
}

impl<'a> RouteParameters<'a> {
    pub(crate) fn new(
        routing_context: &'a HashMap<String, ValueSend>,
        bookmarks: Option<&'a Bookmarks>,
        db: Option<&'a str>,
        imp_user: Option<&'a str>,
    ) -> Self {
        Self {
            routing_context,
            bookmarks,
            db,
            imp_user,
        }
    }
}

/// Identifies which high-level API triggered a query, reported to the server via `TELEMETRY`
/// so it can be surfaced in product usage metrics.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum TelemetryAPI {
    TxFunc,
    UnmanagedTx,
    AutoCommit,
    DriverLevel,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct TelemetryParameters {
    pub(crate) api: TelemetryAPI,
}

impl TelemetryParameters {
    pub(crate) fn new(api: TelemetryAPI) -> Self {
        Self { api }
    }
}
