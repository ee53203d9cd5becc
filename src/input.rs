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

//! Markdown input given as a glob, as literal content or on stdin.

use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};

/// Label used for documents read from stdin.
pub const STDIN_LABEL: &str = "-";

/// A Markdown document and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Path of the document, [`STDIN_LABEL`] for stdin and `None` for
    /// literal content. Used in the occurrences of extracted messages.
    pub label: Option<String>,
    pub text: String,
}

impl Source {
    /// A document given directly as a string.
    pub fn content(text: impl Into<String>) -> Source {
        Source {
            label: None,
            text: text.into(),
        }
    }

    /// Decode `bytes` read from `label`, which must be UTF-8.
    pub fn from_bytes(label: &str, bytes: Vec<u8>) -> Result<Source> {
        let text = String::from_utf8(bytes).map_err(|err| Error::MalformedInput {
            source_name: String::from(label),
            reason: err.to_string(),
        })?;
        Ok(Source {
            label: Some(String::from(label)),
            text,
        })
    }

    /// Read a document from a file.
    pub fn from_file(path: &Path) -> Result<Source> {
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Source::from_bytes(&path.display().to_string(), bytes)
    }

    /// Read a document from `reader`, usually stdin.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Source> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(|source| Error::Io {
            path: PathBuf::from(STDIN_LABEL),
            source,
        })?;
        Source::from_bytes(STDIN_LABEL, bytes)
    }
}

fn is_ignored(path: &Path, ignore: &[PathBuf]) -> bool {
    ignore
        .iter()
        .any(|ignored| path == ignored || path.ends_with(ignored))
}

/// Find the files matching `pattern`, in alphabetical order.
///
/// Returns `None` when `pattern` is not a glob or matches no files.
fn glob_files(pattern: &str, ignore: &[PathBuf]) -> Result<Option<Vec<PathBuf>>> {
    if pattern.contains('\n') {
        return Ok(None);
    }
    let paths = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(err) => {
            debug!("Not a glob pattern ({err}), using it as content");
            return Ok(None);
        }
    };
    let mut files = Vec::new();
    for path in paths {
        let path = path.map_err(|err| Error::Io {
            path: err.path().to_path_buf(),
            source: err.into_error(),
        })?;
        if !path.is_file() {
            continue;
        }
        if is_ignored(&path, ignore) {
            info!("Ignoring {}", path.display());
            continue;
        }
        files.push(path);
    }
    if files.is_empty() && !ignore.is_empty() && Path::new(pattern).exists() {
        // Everything matched was ignored.
        return Ok(Some(files));
    }
    Ok((!files.is_empty()).then_some(files))
}

/// Resolve the `GLOB_OR_CONTENT` argument of the command line tools.
///
/// `-` reads a single document from `stdin`. A glob matching at least
/// one file reads every matching file not listed in `ignore`. Anything
/// else is Markdown content.
pub fn read_sources<R: Read>(
    glob_or_content: &str,
    ignore: &[PathBuf],
    stdin: R,
) -> Result<Vec<Source>> {
    if glob_or_content == STDIN_LABEL {
        return Ok(vec![Source::from_reader(stdin)?]);
    }
    match glob_files(glob_or_content, ignore)? {
        Some(files) => {
            debug!("Reading {} files matching {glob_or_content:?}", files.len());
            files.iter().map(|path| Source::from_file(path)).collect()
        }
        None => Ok(vec![Source::content(glob_or_content)]),
    }
}
