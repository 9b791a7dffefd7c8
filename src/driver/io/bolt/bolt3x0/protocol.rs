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
use std::fmt::Debug;
use std::io::{Read, Write};
use std::mem;
use std::net::TcpStream;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use log::warn;

use super::super::bolt_common::{unsupported_protocol_feature_error, ServerAwareBoltVersion};
use super::super::message::BoltMessage;
use super::super::message_parameters::{
    BeginParameters, CommitParameters, DiscardParameters, GoodbyeParameters, HelloParameters,
    PullParameters, ReauthParameters, ResetParameters, RollbackParameters, RouteParameters,
    RunParameters,
};
use super::super::packstream::{
    PackStreamDeserializer, PackStreamDeserializerImpl, PackStreamSerializer,
    PackStreamSerializerDebugImpl, PackStreamSerializerImpl,
};
use super::super::{
    assert_response_field_count, bolt_debug, bolt_debug_extra, dbg_extra, debug_buf,
    debug_buf_end, debug_buf_start, BoltData, BoltProtocol, BoltResponse, BoltStructTranslator,
    ConnectionState, OnServerErrorCb, ResponseCallbacks, ResponseMessage,
};
use crate::driver::config::notification::NotificationFilter;
use crate::error_::{Neo4jError, Result, ServerError};
use crate::value::ValueReceive;

const SERVER_AGENT_KEY: &str = "server";
const HINTS_KEY: &str = "hints";
const RECV_TIMEOUT_KEY: &str = "connection.recv_timeout_seconds";

#[derive(Debug)]
pub(crate) struct Bolt3x0<T: BoltStructTranslator> {
    translator: T,
    protocol_version: ServerAwareBoltVersion,
}

impl<T: BoltStructTranslator> Bolt3x0<T> {
    pub(in super::super) fn new(protocol_version: ServerAwareBoltVersion) -> Self {
        Bolt3x0 {
            translator: T::default(),
            protocol_version,
        }
    }

    fn try_parse_error(meta: ValueReceive) -> Result<ServerError> {
        let meta = meta
            .try_into_map()
            .map_err(|_| Neo4jError::protocol_error("FAILURE meta was not a Dictionary"))?;
        Ok(ServerError::from_meta(meta))
    }

    pub(crate) fn check_no_notification_filter(
        &self,
        notification_filter: Option<&NotificationFilter>,
    ) -> Result<()> {
        if !notification_filter.map(|n| n.is_default()).unwrap_or(true) {
            return Err(unsupported_protocol_feature_error(
                "notification filtering",
                self.protocol_version,
                ServerAwareBoltVersion::V5x2,
            ));
        }
        Ok(())
    }

    fn check_no_database_selection(&self, db: Option<&str>, imp_user: Option<&str>) -> Result<()> {
        if db.is_some() || imp_user.is_some() {
            return Err(unsupported_protocol_feature_error(
                "multi-database selection",
                self.protocol_version,
                ServerAwareBoltVersion::V4x4,
            ));
        }
        Ok(())
    }
}

impl<T: BoltStructTranslator> Default for Bolt3x0<T> {
    fn default() -> Self {
        Self::new(ServerAwareBoltVersion::V3x0)
    }
}

impl<T: BoltStructTranslator> BoltProtocol for Bolt3x0<T> {
    fn hello<RW: Read + Write>(
        &mut self,
        data: &mut BoltData<RW>,
        parameters: HelloParameters,
    ) -> Result<()> {
        let HelloParameters {
            user_agent,
            auth,
            routing_context,
            notification_filter,
        } = parameters;
        self.check_no_notification_filter(Some(notification_filter))?;
        if routing_context.is_some() {
            return Err(unsupported_protocol_feature_error(
                "routing context",
                self.protocol_version,
                ServerAwareBoltVersion::V4x4,
            ));
        }
        debug_buf_start!(log_buf);
        debug_buf!(log_buf, "C: HELLO");
        let mut dbg_serializer = PackStreamSerializerDebugImpl::new();
        let mut message_buff = Vec::new();
        let mut serializer = PackStreamSerializerImpl::new(&mut message_buff);
        serializer.write_struct_header(0x01, 1)?;

        let extra_size = 1 + auth.data.len() as u64;
        serializer.write_dict_header(extra_size)?;
        debug_buf!(log_buf, " {}", {
            dbg_serializer.write_dict_header(extra_size).unwrap();
            dbg_serializer.flush()
        });

        serializer.write_string("user_agent")?;
        serializer.write_string(user_agent)?;
        debug_buf!(log_buf, "{}", {
            dbg_serializer.write_string("user_agent").unwrap();
            dbg_serializer.write_string(user_agent).unwrap();
            dbg_serializer.flush()
        });

        for (k, v) in &auth.data {
            serializer.write_string(k)?;
            data.serialize_value(&mut serializer, &self.translator, v)?;
            debug_buf!(log_buf, "{}", {
                dbg_serializer.write_string(k).unwrap();
                if k == "credentials" {
                    dbg_serializer.write_string("**********").unwrap();
                } else {
                    data.serialize_value(&mut dbg_serializer, &self.translator, v)
                        .unwrap();
                }
                dbg_serializer.flush()
            });
        }
        data.auth = Some(Arc::clone(auth));

        data.message_buff.push_back(vec![message_buff]);
        debug_buf_end!(data, log_buf);

        let bolt_meta = Arc::clone(&data.meta);
        let bolt_server_agent = Arc::clone(&data.server_agent);
        let socket = Arc::clone(&data.socket);
        data.responses.push_back(BoltResponse::new(
            ResponseMessage::Hello,
            ResponseCallbacks::new().with_on_success(move |mut meta| {
                if let Some((key, value)) = meta.remove_entry(SERVER_AGENT_KEY) {
                    match value {
                        ValueReceive::String(value) => {
                            mem::swap(&mut *bolt_server_agent.borrow_mut(), &mut Arc::new(value));
                        }
                        _ => {
                            warn!("Server sent unexpected server_agent type {:?}", &value);
                            meta.insert(key, value);
                        }
                    }
                }
                if let Some(ValueReceive::Map(hints)) = meta.get(HINTS_KEY) {
                    if let Some(ValueReceive::Integer(timeout)) = hints.get(RECV_TIMEOUT_KEY) {
                        if *timeout > 0 {
                            socket
                                .deref()
                                .as_ref()
                                .map(|socket: &TcpStream| {
                                    socket.set_read_timeout(Some(Duration::from_secs(
                                        *timeout as u64,
                                    )))
                                })
                                .transpose()
                                .unwrap_or_else(|err| {
                                    warn!(
                                        "Failed to set socket timeout as hinted by the server: {err}"
                                    );
                                    None
                                });
                        }
                    }
                }
                mem::swap(&mut *bolt_meta.borrow_mut(), &mut meta);
                Ok(())
            }),
        ));
        Ok(())
    }

    #[inline]
    fn reauth<RW: Read + Write>(
        &mut self,
        _: &mut BoltData<RW>,
        _: ReauthParameters,
    ) -> Result<()> {
        Err(unsupported_protocol_feature_error(
            "session authentication",
            self.protocol_version,
            ServerAwareBoltVersion::V5x1,
        ))
    }

    #[inline]
    fn supports_reauth(&self) -> bool {
        false
    }

    fn goodbye<RW: Read + Write>(
        &mut self,
        data: &mut BoltData<RW>,
        _: GoodbyeParameters,
    ) -> Result<()> {
        let mut message_buff = Vec::new();
        let mut serializer = PackStreamSerializerImpl::new(&mut message_buff);
        serializer.write_struct_header(0x02, 0)?;
        data.message_buff.push_back(vec![message_buff]);
        data.connection_state = ConnectionState::Closed;
        bolt_debug!(data, "C: GOODBYE");
        Ok(())
    }

    fn reset<RW: Read + Write>(
        &mut self,
        data: &mut BoltData<RW>,
        _: ResetParameters,
    ) -> Result<()> {
        let mut message_buff = Vec::new();
        let mut serializer = PackStreamSerializerImpl::new(&mut message_buff);
        serializer.write_struct_header(0x0F, 0)?;
        data.message_buff.push_back(vec![message_buff]);
        data.responses
            .push_back(BoltResponse::from_message(ResponseMessage::Reset));
        bolt_debug!(data, "C: RESET");
        Ok(())
    }

    fn run<RW: Read + Write, KP: Borrow<str> + Debug, KM: Borrow<str> + Debug>(
        &mut self,
        data: &mut BoltData<RW>,
        parameters: RunParameters<KP, KM>,
        callbacks: ResponseCallbacks,
    ) -> Result<()> {
        let RunParameters {
            query,
            parameters,
            bookmarks,
            tx_timeout,
            tx_metadata,
            mode,
            db,
            imp_user,
            notification_filter,
        } = parameters;
        self.check_no_notification_filter(notification_filter)?;
        self.check_no_database_selection(db, imp_user)?;
        debug_buf_start!(log_buf);
        debug_buf!(log_buf, "C: RUN");
        let mut dbg_serializer = PackStreamSerializerDebugImpl::new();
        let mut message_buff = Vec::new();
        let mut serializer = PackStreamSerializerImpl::new(&mut message_buff);
        serializer.write_struct_header(0x10, 3)?;

        serializer.write_string(query)?;
        debug_buf!(log_buf, " {}", {
            dbg_serializer.write_string(query).unwrap();
            dbg_serializer.flush()
        });

        match parameters {
            Some(parameters) => {
                data.serialize_dict(&mut serializer, &self.translator, parameters)?;
                debug_buf!(log_buf, " {}", {
                    data.serialize_dict(&mut dbg_serializer, &self.translator, parameters)
                        .unwrap();
                    dbg_serializer.flush()
                });
            }
            None => {
                serializer.write_dict_header(0)?;
                debug_buf!(log_buf, " {}", {
                    dbg_serializer.write_dict_header(0).unwrap();
                    dbg_serializer.flush()
                });
            }
        }

        let extra_size = [
            bookmarks.is_some() && !bookmarks.unwrap().is_empty(),
            tx_timeout.is_some(),
            tx_metadata.is_some() && !tx_metadata.unwrap().is_empty(),
            mode.is_some() && mode.unwrap() != "w",
        ]
        .into_iter()
        .map(<bool as Into<u64>>::into)
        .sum();

        serializer.write_dict_header(extra_size)?;
        debug_buf!(log_buf, " {}", {
            dbg_serializer.write_dict_header(extra_size).unwrap();
            dbg_serializer.flush()
        });

        if let Some(bookmarks) = bookmarks {
            if !bookmarks.is_empty() {
                serializer.write_string("bookmarks")?;
                data.serialize_str_iter(&mut serializer, bookmarks.raw())?;
                debug_buf!(log_buf, "{}", {
                    dbg_serializer.write_string("bookmarks").unwrap();
                    data.serialize_str_iter(&mut dbg_serializer, bookmarks.raw())
                        .unwrap();
                    dbg_serializer.flush()
                });
            }
        }

        if let Some(tx_timeout) = tx_timeout {
            serializer.write_string("tx_timeout")?;
            serializer.write_int(tx_timeout)?;
            debug_buf!(log_buf, "{}", {
                dbg_serializer.write_string("tx_timeout").unwrap();
                dbg_serializer.write_int(tx_timeout).unwrap();
                dbg_serializer.flush()
            });
        }

        if let Some(tx_metadata) = tx_metadata {
            if !tx_metadata.is_empty() {
                serializer.write_string("tx_metadata")?;
                data.serialize_dict(&mut serializer, &self.translator, tx_metadata)?;
                debug_buf!(log_buf, "{}", {
                    dbg_serializer.write_string("tx_metadata").unwrap();
                    data.serialize_dict(&mut dbg_serializer, &self.translator, tx_metadata)
                        .unwrap();
                    dbg_serializer.flush()
                });
            }
        }

        if let Some(mode) = mode {
            if mode != "w" {
                serializer.write_string("mode")?;
                serializer.write_string(mode)?;
                debug_buf!(log_buf, "{}", {
                    dbg_serializer.write_string("mode").unwrap();
                    dbg_serializer.write_string(mode).unwrap();
                    dbg_serializer.flush()
                });
            }
        }

        data.message_buff.push_back(vec![message_buff]);
        data.responses
            .push_back(BoltResponse::new(ResponseMessage::Run, callbacks));
        debug_buf_end!(data, log_buf);
        Ok(())
    }

    fn discard<RW: Read + Write>(
        &mut self,
        data: &mut BoltData<RW>,
        _: DiscardParameters,
        callbacks: ResponseCallbacks,
    ) -> Result<()> {
        let mut message_buff = Vec::new();
        let mut serializer = PackStreamSerializerImpl::new(&mut message_buff);
        serializer.write_struct_header(0x2F, 0)?;
        data.message_buff.push_back(vec![message_buff]);
        data.responses
            .push_back(BoltResponse::new(ResponseMessage::Discard, callbacks));
        bolt_debug!(data, "C: DISCARD_ALL");
        Ok(())
    }

    fn pull<RW: Read + Write>(
        &mut self,
        data: &mut BoltData<RW>,
        _: PullParameters,
        callbacks: ResponseCallbacks,
    ) -> Result<()> {
        let mut message_buff = Vec::new();
        let mut serializer = PackStreamSerializerImpl::new(&mut message_buff);
        serializer.write_struct_header(0x3F, 0)?;
        data.message_buff.push_back(vec![message_buff]);
        data.responses
            .push_back(BoltResponse::new(ResponseMessage::Pull, callbacks));
        bolt_debug!(data, "C: PULL_ALL");
        Ok(())
    }

    fn begin<RW: Read + Write, K: Borrow<str> + Debug>(
        &mut self,
        data: &mut BoltData<RW>,
        parameters: BeginParameters<K>,
        callbacks: ResponseCallbacks,
    ) -> Result<()> {
        let BeginParameters {
            bookmarks,
            tx_timeout,
            tx_metadata,
            mode,
            db,
            imp_user,
            notification_filter,
        } = parameters;
        self.check_no_notification_filter(Some(notification_filter))?;
        self.check_no_database_selection(db, imp_user)?;
        debug_buf_start!(log_buf);
        debug_buf!(log_buf, "C: BEGIN");
        let mut dbg_serializer = PackStreamSerializerDebugImpl::new();
        let mut message_buff = Vec::new();
        let mut serializer = PackStreamSerializerImpl::new(&mut message_buff);
        serializer.write_struct_header(0x11, 1)?;

        let extra_size = [
            bookmarks.is_some() && !bookmarks.unwrap().is_empty(),
            tx_timeout.is_some(),
            tx_metadata.map(|m| !m.is_empty()).unwrap_or_default(),
            mode.is_some() && mode.unwrap() != "w",
        ]
        .into_iter()
        .map(<bool as Into<u64>>::into)
        .sum();

        debug_buf!(log_buf, " {}", {
            dbg_serializer.write_dict_header(extra_size).unwrap();
            dbg_serializer.flush()
        });
        serializer.write_dict_header(extra_size)?;

        if let Some(bookmarks) = bookmarks {
            if !bookmarks.is_empty() {
                serializer.write_string("bookmarks")?;
                data.serialize_str_iter(&mut serializer, bookmarks.raw())?;
                debug_buf!(log_buf, "{}", {
                    dbg_serializer.write_string("bookmarks").unwrap();
                    data.serialize_str_iter(&mut dbg_serializer, bookmarks.raw())
                        .unwrap();
                    dbg_serializer.flush()
                });
            }
        }

        if let Some(tx_timeout) = tx_timeout {
            serializer.write_string("tx_timeout")?;
            serializer.write_int(tx_timeout)?;
            debug_buf!(log_buf, "{}", {
                dbg_serializer.write_string("tx_timeout").unwrap();
                dbg_serializer.write_int(tx_timeout).unwrap();
                dbg_serializer.flush()
            });
        }

        if let Some(tx_metadata) = tx_metadata {
            if !tx_metadata.is_empty() {
                serializer.write_string("tx_metadata")?;
                data.serialize_dict(&mut serializer, &self.translator, tx_metadata)?;
                debug_buf!(log_buf, "{}", {
                    dbg_serializer.write_string("tx_metadata").unwrap();
                    data.serialize_dict(&mut dbg_serializer, &self.translator, tx_metadata)
                        .unwrap();
                    dbg_serializer.flush()
                });
            }
        }

        if let Some(mode) = mode {
            if mode != "w" {
                serializer.write_string("mode")?;
                serializer.write_string(mode)?;
                debug_buf!(log_buf, "{}", {
                    dbg_serializer.write_string("mode").unwrap();
                    dbg_serializer.write_string(mode).unwrap();
                    dbg_serializer.flush()
                });
            }
        }

        data.message_buff.push_back(vec![message_buff]);
        data.responses
            .push_back(BoltResponse::new(ResponseMessage::Begin, callbacks));
        debug_buf_end!(data, log_buf);
        Ok(())
    }

    fn commit<RW: Read + Write>(
        &mut self,
        data: &mut BoltData<RW>,
        _: CommitParameters,
        callbacks: ResponseCallbacks,
    ) -> Result<()> {
        let mut message_buff = Vec::new();
        let mut serializer = PackStreamSerializerImpl::new(&mut message_buff);
        serializer.write_struct_header(0x12, 0)?;

        data.message_buff.push_back(vec![message_buff]);
        data.responses
            .push_back(BoltResponse::new(ResponseMessage::Commit, callbacks));
        bolt_debug!(data, "C: COMMIT");
        Ok(())
    }

    fn rollback<RW: Read + Write>(
        &mut self,
        data: &mut BoltData<RW>,
        _: RollbackParameters,
    ) -> Result<()> {
        let mut message_buff = Vec::new();
        let mut serializer = PackStreamSerializerImpl::new(&mut message_buff);
        serializer.write_struct_header(0x13, 0)?;

        data.message_buff.push_back(vec![message_buff]);
        data.responses
            .push_back(BoltResponse::from_message(ResponseMessage::Rollback));
        bolt_debug!(data, "C: ROLLBACK");
        Ok(())
    }

    #[inline]
    fn route<RW: Read + Write>(
        &mut self,
        _: &mut BoltData<RW>,
        _: RouteParameters,
        _: ResponseCallbacks,
    ) -> Result<()> {
        Err(unsupported_protocol_feature_error(
            "routing",
            self.protocol_version,
            ServerAwareBoltVersion::V4x4,
        ))
    }

    fn load_value<R: Read>(&mut self, reader: &mut R) -> Result<ValueReceive> {
        let mut deserializer = PackStreamDeserializerImpl::new(reader);
        deserializer.load(&self.translator).map_err(Into::into)
    }

    fn handle_response<RW: Read + Write>(
        &mut self,
        bolt_data: &mut BoltData<RW>,
        message: BoltMessage<ValueReceive>,
        on_server_error: OnServerErrorCb<RW>,
    ) -> Result<()> {
        let mut response = bolt_data
            .responses
            .pop_front()
            .expect("called Bolt::read_one with empty response queue");
        match message {
            BoltMessage {
                tag: 0x70,
                mut fields,
            } => {
                // SUCCESS
                assert_response_field_count("SUCCESS", &fields, 1)?;
                let meta = fields.pop().unwrap();
                bolt_debug!(bolt_data, "S: SUCCESS {}", meta.dbg_print());
                bolt_data.bolt_state.success(
                    response.message,
                    &meta,
                    bolt_data.local_port,
                    bolt_data.meta.try_borrow().as_deref(),
                );
                response.callbacks.on_success(meta)
            }
            BoltMessage { tag: 0x7E, fields } => {
                // IGNORED
                assert_response_field_count("IGNORED", &fields, 0)?;
                bolt_debug!(bolt_data, "S: IGNORED");
                response.callbacks.on_ignored()
            }
            BoltMessage {
                tag: 0x7F,
                mut fields,
            } => {
                // FAILURE
                assert_response_field_count("FAILURE", &fields, 1)?;
                let meta = fields.pop().unwrap();
                bolt_debug!(bolt_data, "S: FAILURE {}", meta.dbg_print());
                let mut error = Self::try_parse_error(meta)?;
                bolt_data.bolt_state.failure();
                match on_server_error {
                    None => response.callbacks.on_failure(error),
                    Some(cb) => {
                        let res1 = cb(bolt_data, &mut error);
                        let res2 = response.callbacks.on_failure(error);
                        match res1 {
                            Ok(()) => res2,
                            Err(e1) => {
                                if let Err(e2) = res2 {
                                    warn!(
                                        "server error swallowed because of user callback error: {e2}"
                                    );
                                }
                                Err(e1)
                            }
                        }
                    }
                }
            }
            BoltMessage {
                tag: 0x71,
                mut fields,
            } => {
                // RECORD
                assert_response_field_count("RECORD", &fields, 1)?;
                let data = fields.pop().unwrap();
                bolt_debug!(bolt_data, "S: RECORD [...]");
                let res = response.callbacks.on_record(data);
                bolt_data.responses.push_front(response);
                res
            }
            BoltMessage { tag, .. } => Err(Neo4jError::protocol_error(format!(
                "unknown response message tag {:02X?}",
                tag
            ))),
        }
    }
}
