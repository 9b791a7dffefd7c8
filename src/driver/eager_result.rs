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

use std::sync::Arc;

use super::summary::Summary;
use super::Record;

/// The result of a query, eagerly collected into memory.
///
/// Returned by [`RecordStream::try_as_eager_result()`](super::record_stream::RecordStream::try_as_eager_result())
/// and [`ExecuteQueryBuilder::run()`](super::ExecuteQueryBuilder::run()).
#[derive(Debug)]
#[non_exhaustive]
pub struct EagerResult {
    /// The keys of the records, in the order the values appear in each [`Record`].
    pub keys: Vec<Arc<String>>,
    /// The records returned by the query.
    pub records: Vec<Record>,
    /// Metadata about the query that produced this result.
    pub summary: Summary,
}
