// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Scalar values appearing as literals in planner expressions. The planner
//! only ever manipulates literals structurally, so this is a deliberately
//! small subset of a full scalar representation.

use std::fmt::{self, Display, Formatter};

use arrow_schema::DataType;

/// A single constant value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Hash)]
pub enum ScalarValue {
    /// Untyped null value
    Null,
    /// Boolean value
    Boolean(Option<bool>),
    /// Signed 64-bit integer value
    Int64(Option<i64>),
    /// UTF-8 encoded string value
    Utf8(Option<String>),
}

impl ScalarValue {
    /// Returns the [DataType] of this scalar value.
    pub fn data_type(&self) -> DataType {
        match self {
            ScalarValue::Null => DataType::Null,
            ScalarValue::Boolean(_) => DataType::Boolean,
            ScalarValue::Int64(_) => DataType::Int64,
            ScalarValue::Utf8(_) => DataType::Utf8,
        }
    }

    /// Whether this scalar is a null value of any type.
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            ScalarValue::Null
                | ScalarValue::Boolean(None)
                | ScalarValue::Int64(None)
                | ScalarValue::Utf8(None)
        )
    }
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "NULL"),
            ScalarValue::Boolean(v) => fmt_option(f, v),
            ScalarValue::Int64(v) => fmt_option(f, v),
            ScalarValue::Utf8(v) => fmt_option(f, v),
        }
    }
}

fn fmt_option<T: Display>(f: &mut Formatter, value: &Option<T>) -> fmt::Result {
    match value {
        Some(value) => write!(f, "{value}"),
        None => write!(f, "NULL"),
    }
}
