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

//! Everything needed to connect to and work with a Neo4j DBMS.

pub mod config;
mod eager_result;
mod execute_query;
mod home_db_cache;
pub(crate) mod io;
mod record;
pub mod record_stream;
pub(crate) mod session;
pub mod summary;
pub mod transaction;

use std::sync::Arc;

pub use config::{ConnectionConfig, DriverConfig};
pub use eager_result::EagerResult;
pub use execute_query::ExecuteQueryBuilder;
pub use record::Record;

use io::{Pool, PoolConfig};
use session::config::{InternalSessionConfig, SessionConfig};
use session::Session;

/// Re-exported under its canonical, public path.
///
/// See [`config::auth`] for the actual definitions.
pub use config::auth;

/// Whether to run a piece of work against a reader or a writer of a (clustered) DBMS.
///
/// Queries sent to a read server never cause writes to be persisted (the DBMS enforces this
/// server-side), so picking the right mode for read-only work lets the driver load-balance across
/// replicas instead of always hitting the single writer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum RoutingControl {
    /// Route to a server that can serve reads.
    Read,
    /// Route to a server that can serve writes.
    #[default]
    Write,
}

impl RoutingControl {
    pub(crate) fn as_protocol_str(&self) -> &'static str {
        match self {
            RoutingControl::Read => "r",
            RoutingControl::Write => "w",
        }
    }
}

/// The subset of [`DriverConfig`] that sessions need direct, cheap access to.
///
/// [`DriverConfig`] itself holds trait objects (auth managers, address resolvers) that aren't
/// [`Clone`], so sessions are handed this small, [`Copy`]able extract instead of the whole config.
#[derive(Debug, Copy, Clone)]
pub(crate) struct ReducedDriverConfig {
    pub(crate) fetch_size: i64,
}

impl From<&DriverConfig> for ReducedDriverConfig {
    fn from(config: &DriverConfig) -> Self {
        Self {
            fetch_size: config.fetch_size,
        }
    }
}

/// Entry point for working with a Neo4j DBMS.
///
/// A [`Driver`] manages a connection pool (and, for a clustered/cloud deployment, the routing
/// table) to a DBMS. Creating a driver is expensive, so applications should create a single
/// instance and share it (it's `Send + Sync`) for the lifetime of the application.
///
/// Use [`Driver::session()`] to obtain a [`Session`] for running queries and transactions, or
/// [`Driver::execute_query()`] for a one-off auto-commit query.
#[derive(Debug)]
pub struct Driver {
    reduced_config: ReducedDriverConfig,
    idle_time_before_connection_test: Option<std::time::Duration>,
    pool: Pool,
    home_db_cache: Arc<home_db_cache::HomeDbCache>,
}

const HOME_DB_CACHE_SIZE: usize = 100;

impl Driver {
    /// Create a new driver connected to the DBMS described by `connection_config`, configured
    /// with `config`.
    ///
    /// This does not eagerly open any connections; the pool fills lazily as sessions acquire
    /// connections.
    pub fn new(connection_config: ConnectionConfig, config: DriverConfig) -> Self {
        let reduced_config = ReducedDriverConfig::from(&config);
        let DriverConfig {
            user_agent,
            auth,
            max_connection_lifetime,
            idle_time_before_connection_test,
            max_connection_pool_size,
            fetch_size: _,
            connection_timeout,
            connection_acquisition_timeout,
            resolver,
            keep_alive,
            notification_filter,
            telemetry,
        } = config;
        let ConnectionConfig {
            address,
            routing_context,
            tls_config,
        } = connection_config;
        let pool_config = PoolConfig {
            routing_context,
            tls_config: tls_config.map(Arc::new),
            user_agent,
            auth,
            max_connection_lifetime,
            max_connection_pool_size,
            connection_timeout,
            keep_alive,
            connection_acquisition_timeout,
            resolver,
            notification_filters: Arc::new(notification_filter),
            telemetry,
        };
        let pool = Pool::new(Arc::new(address), pool_config);
        Driver {
            reduced_config,
            idle_time_before_connection_test,
            pool,
            home_db_cache: Arc::new(home_db_cache::HomeDbCache::new(HOME_DB_CACHE_SIZE)),
        }
    }

    /// Open a new [`Session`] for running queries and transactions against the DBMS.
    ///
    /// Sessions are cheap to create and are not meant to be long-lived or shared between threads.
    /// Open one per unit of work (e.g., per incoming request) and let it go out of scope once
    /// you're done with it.
    pub fn session(&self, config: SessionConfig) -> Session<'_> {
        let config = InternalSessionConfig::new(config, self.idle_time_before_connection_test);
        Session::new(
            config,
            &self.pool,
            Arc::clone(&self.home_db_cache),
            &self.reduced_config,
        )
    }

    /// Prepare to run a single auto-commit query without having to manage a [`Session`]
    /// explicitly.
    ///
    /// This is merely a convenience wrapper around [`Driver::session()`] and
    /// [`Session::auto_commit()`].
    pub fn execute_query(&self, query: impl Into<String>) -> ExecuteQueryBuilder<'_> {
        ExecuteQueryBuilder::new(self, query)
    }
}
