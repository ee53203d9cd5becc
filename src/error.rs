// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Errors reported by the library.
//!
//! Localized defects in a Markdown document are not errors: the
//! affected region is treated as plain text and the pass continues.
//! Missing translations are not errors either.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The input cannot be read as a Markdown document at all.
    #[error("Malformed input {source_name}: {reason}")]
    MalformedInput { source_name: String, reason: String },
    /// An option has an invalid value. Reported before any pass runs.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A PO file could not be parsed.
    #[error("Could not parse catalog at line {line}: {reason}")]
    CatalogParse { line: usize, reason: String },
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
