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

//! Command line arguments shared by the `md2po`, `po2md` and
//! `mdpo2html` binaries.

use std::io::Read;
use std::path::PathBuf;

use log::info;

use crate::catalog::Catalog;
use crate::config::{Configuration, Options};
use crate::error::{Error, Result};
use crate::input::read_sources;

/// Flags controlling how messages are rendered.
///
/// Extraction and translation must use the same flags, otherwise
/// the messages will not be found in the catalog.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct KeyArgs {
    /// Keep Markdown markup in messages instead of plain text.
    #[arg(short, long)]
    pub markuptext: bool,
    /// Maximum line width of the PO file, 0 to disable wrapping.
    #[arg(short, long, value_name = "N")]
    pub wrapwidth: Option<usize>,
    /// JSON object of substitutions applied to every message.
    #[arg(long, value_name = "JSON")]
    pub replacement_chars: Option<String>,
    /// Messages which are never extracted.
    #[arg(long, value_name = "MSGID", value_delimiter = ',')]
    pub forbidden_msgids: Vec<String>,
    #[arg(long, value_name = "STRING")]
    pub bold_string: Option<String>,
    #[arg(long, value_name = "STRING")]
    pub italic_string: Option<String>,
    #[arg(long, value_name = "STRING")]
    pub code_string: Option<String>,
    #[arg(long, value_name = "STRING")]
    pub link_start_string: Option<String>,
    #[arg(long, value_name = "STRING")]
    pub link_end_string: Option<String>,
    /// JSON file with options. Command line flags take precedence.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl KeyArgs {
    /// Combine the `--config` file with the command line flags.
    ///
    /// Without an options file, messages are plain text unless
    /// `--markuptext` is given. With one, its `plaintext` value is used
    /// unless `--markuptext` is given.
    pub fn options(&self) -> Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::from_json_file(path)?,
            None => Options {
                plaintext: true,
                ..Options::default()
            },
        };
        if self.markuptext {
            options.plaintext = false;
        }
        if self.wrapwidth.is_some() {
            options.wrapwidth = self.wrapwidth;
        }
        if let Some(json) = &self.replacement_chars {
            options
                .replacement_chars
                .extend(Options::parse_replacement_chars(json)?);
        }
        options
            .forbidden_msgids
            .extend(self.forbidden_msgids.iter().cloned());

        let overrides = [
            (&mut options.bold_string, &self.bold_string),
            (&mut options.italic_string, &self.italic_string),
            (&mut options.code_string, &self.code_string),
            (&mut options.link_start_string, &self.link_start_string),
            (&mut options.link_end_string, &self.link_end_string),
        ];
        for (option, flag) in overrides {
            if flag.is_some() {
                option.clone_from(flag);
            }
        }
        Ok(options)
    }
}

/// Turns one Markdown document into translated output.
pub type Renderer = fn(&str, &Catalog, &Configuration) -> String;

/// Arguments of the binaries which translate documents.
#[derive(Debug, Clone, clap::Args)]
pub struct TranslateArgs {
    /// Glob matching Markdown files, Markdown content, or `-` for stdin.
    #[arg(value_name = "GLOB_OR_CONTENT")]
    pub glob_or_content: String,
    /// PO files with translations. Earlier files win when a message is
    /// translated in several files.
    #[arg(short, long, value_name = "FILE", required = true, num_args = 1..)]
    pub pofiles: Vec<PathBuf>,
    /// Write the output to this file.
    #[arg(short, long, value_name = "PATH")]
    pub save: Option<PathBuf>,
    /// Don't print the output to stdout.
    #[arg(short, long)]
    pub quiet: bool,
    #[command(flatten)]
    pub keys: KeyArgs,
}

impl TranslateArgs {
    /// Translate the input documents with `render` and save the
    /// result if requested.
    ///
    /// Several documents are joined with a newline.
    pub fn run<R: Read>(&self, stdin: R, render: Renderer) -> Result<String> {
        let options = self.keys.options()?;
        let config = Configuration::try_from(&options)?;
        let catalog = Catalog::load_all(&self.pofiles)?;
        let sources = read_sources(&self.glob_or_content, &options.ignore, stdin)?;
        let output = sources
            .iter()
            .map(|source| render(&source.text, &catalog, &config))
            .collect::<Vec<_>>()
            .join("\n");
        if let Some(path) = &self.save {
            std::fs::write(path, &output).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            info!("Saved output to {}", path.display());
        }
        Ok(output)
    }
}

/// Set up logging to stderr.
///
/// The level is taken from `RUST_LOG` and defaults to `warn`.
pub fn init_logging() {
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", "warn"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        keys: KeyArgs,
    }

    fn parse(args: &[&str]) -> KeyArgs {
        Cli::parse_from(std::iter::once("test").chain(args.iter().copied())).keys
    }

    #[test]
    fn test_defaults_to_plaintext() -> anyhow::Result<()> {
        let options = parse(&[]).options()?;
        assert!(options.plaintext);
        assert_eq!(options.wrapwidth, None);
        Ok(())
    }

    #[test]
    fn test_flags() -> anyhow::Result<()> {
        let options = parse(&[
            "-m",
            "-w",
            "0",
            "--replacement-chars",
            r#"{"’": "'"}"#,
            "--forbidden-msgids",
            "TODO,FIXME",
            "--bold-string",
            "__",
        ])
        .options()?;
        assert!(!options.plaintext);
        assert_eq!(options.wrapwidth, Some(0));
        assert_eq!(options.forbidden_msgids, vec!["TODO", "FIXME"]);
        assert_eq!(options.bold_string.as_deref(), Some("__"));

        let config = Configuration::try_from(&options)?;
        assert_eq!(config.lexicon().bold, "__");
        assert!(config.is_forbidden("FIXME"));
        Ok(())
    }

    #[test]
    fn test_flags_override_config_file() -> anyhow::Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let path = tmp_dir.path().join("mdpo.json");
        std::fs::write(
            &path,
            r#"{"wrapwidth": 40, "code_string": "``", "italic_string": "_"}"#,
        )?;
        let config = path.display().to_string();
        let options = parse(&["--config", config.as_str(), "--code-string", "'"]).options()?;
        // Without `plaintext` in the file, markup is kept.
        assert!(!options.plaintext);
        assert_eq!(options.wrapwidth, Some(40));
        assert_eq!(options.code_string.as_deref(), Some("'"));
        assert_eq!(options.italic_string.as_deref(), Some("_"));
        Ok(())
    }

    #[derive(Debug, Parser)]
    struct TranslateCli {
        #[command(flatten)]
        args: TranslateArgs,
    }

    fn upper(document: &str, catalog: &Catalog, _: &Configuration) -> String {
        format!("{}:{}", catalog.len(), document.to_uppercase())
    }

    #[test]
    fn test_translate_args_run() -> anyhow::Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let po = tmp_dir.path().join("es.po");
        std::fs::write(&po, "msgid \"a\"\nmsgstr \"b\"\n")?;
        let output = tmp_dir.path().join("out.md");
        let cli = TranslateCli::parse_from([
            "test",
            "-",
            "-p",
            po.to_str().unwrap(),
            "-s",
            output.to_str().unwrap(),
        ]);
        assert_eq!(cli.args.run("text".as_bytes(), upper)?, "1:TEXT");
        assert_eq!(std::fs::read_to_string(&output)?, "1:TEXT");
        Ok(())
    }

    #[test]
    fn test_translate_args_require_pofiles() {
        assert!(TranslateCli::try_parse_from(["test", "content"]).is_err());
    }

    #[test]
    fn test_invalid_replacement_chars() {
        assert!(parse(&["--replacement-chars", "nope"]).options().is_err());
    }
}
