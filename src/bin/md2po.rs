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

//! `xgettext` for Markdown
//!
//! This program extracts the translatable messages of Markdown files
//! into a GNU Gettext PO file. When the PO file exists, the messages
//! are merged into it and existing translations are kept.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use mdpo::cli::{init_logging, KeyArgs};
use mdpo::input::{read_sources, STDIN_LABEL};
use mdpo::{markdown_to_catalog, Catalog, Configuration, Error};

#[derive(Debug, Parser)]
#[command(version, about = "Extract the messages of Markdown files into a PO file")]
struct Cli {
    /// Glob matching Markdown files, Markdown content, or `-` for stdin.
    #[arg(value_name = "GLOB_OR_CONTENT", default_value = STDIN_LABEL)]
    glob_or_content: String,
    /// Don't print the catalog to stdout.
    #[arg(short, long)]
    quiet: bool,
    /// Files to skip when GLOB_OR_CONTENT is a glob.
    #[arg(short, long, value_name = "PATH", value_delimiter = ',')]
    ignore: Vec<PathBuf>,
    /// PO file to merge the messages into.
    #[arg(short = 'f', long, value_name = "FILE")]
    filepath: Option<PathBuf>,
    /// Save the catalog to the `--filepath` file.
    #[arg(short, long)]
    save: bool,
    /// Keep messages which are no longer found as obsolete entries.
    #[arg(short = 'o', long)]
    mark_not_found_as_obsolete: bool,
    #[command(flatten)]
    keys: KeyArgs,
}

fn run<R: Read>(cli: &Cli, stdin: R) -> anyhow::Result<Catalog> {
    let mut options = cli.keys.options()?;
    options.ignore.extend(cli.ignore.iter().cloned());
    options.save |= cli.save;
    options.mark_not_found_as_obsolete |= cli.mark_not_found_as_obsolete;
    let config = Configuration::try_from(&options)?;

    let existing = match &cli.filepath {
        Some(path) if path.exists() => Some(
            Catalog::load(path).with_context(|| format!("Could not read {}", path.display()))?,
        ),
        Some(path) if !options.save => {
            return Err(Error::InvalidConfiguration(format!(
                "{} does not exist, use --save to create it",
                path.display()
            ))
            .into())
        }
        Some(_) => None,
        None if options.save => {
            return Err(Error::InvalidConfiguration(String::from(
                "--save needs a catalog given with --filepath",
            ))
            .into())
        }
        None => None,
    };
    let is_new = existing.is_none();

    let sources = read_sources(&cli.glob_or_content, &options.ignore, stdin)
        .with_context(|| format!("Could not read {:?}", cli.glob_or_content))?;
    let mut catalog = markdown_to_catalog(&sources, existing, &config);

    if let (true, Some(path)) = (options.save, &cli.filepath) {
        if is_new {
            let now = chrono::Local::now();
            catalog
                .header
                .set("POT-Creation-Date", &now.format("%Y-%m-%d %H:%M%z").to_string());
        }
        catalog
            .save(path)
            .with_context(|| format!("Could not save {}", path.display()))?;
    }
    Ok(catalog)
}

#[allow(clippy::print_stdout)]
fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let catalog = run(&cli, io::stdin())?;
    if !cli.quiet {
        print!("{catalog}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("md2po").chain(args.iter().copied()))
    }

    #[test]
    fn test_content_to_stdout() -> anyhow::Result<()> {
        let catalog = run(&parse(&["# Hello\n\nSome **text**\n"]), io::empty())?;
        assert_eq!(
            catalog.to_string(),
            "msgid \"\"\n\
             msgstr \"\"\n\
             \"MIME-Version: 1.0\\n\"\n\
             \"Content-Type: text/plain; charset=UTF-8\\n\"\n\
             \"Content-Transfer-Encoding: 8bit\\n\"\n\
             \n\
             msgid \"Hello\"\n\
             msgstr \"\"\n\
             \n\
             msgid \"Some text\"\n\
             msgstr \"\"\n"
        );
        Ok(())
    }

    #[test]
    fn test_markuptext() -> anyhow::Result<()> {
        let catalog = run(&parse(&["-m", "Some **text**"]), io::empty())?;
        assert!(catalog.get("Some **text**").is_some());
        Ok(())
    }

    #[test]
    fn test_stdin_occurrences() -> anyhow::Result<()> {
        let catalog = run(&parse(&["-"]), "One\n\nTwo\n".as_bytes())?;
        assert_eq!(catalog.get("Two").unwrap().occurrences, vec!["-:3"]);
        Ok(())
    }

    #[test]
    fn test_reads_stdin_by_default() -> anyhow::Result<()> {
        let cli = parse(&["-q"]);
        assert_eq!(cli.glob_or_content, "-");
        let catalog = run(&cli, "# Title\n".as_bytes())?;
        assert_eq!(catalog.get("Title").unwrap().occurrences, vec!["-:1"]);
        Ok(())
    }

    #[test]
    fn test_missing_filepath_without_save() {
        let err = run(&parse(&["Text", "-f", "/nonexistent/es.po"]), io::empty()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_save_without_filepath() {
        assert!(run(&parse(&["Text", "-s"]), io::empty()).is_err());
    }

    #[test]
    fn test_save_and_update() -> anyhow::Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let doc = tmp_dir.path().join("doc.md");
        let po = tmp_dir.path().join("es.po");
        let doc_arg = doc.display().to_string();
        let po_arg = po.display().to_string();
        fs::write(&doc, "# Title\n\nFirst\n")?;

        run(&parse(&[doc_arg.as_str(), "-f", po_arg.as_str(), "-s"]), io::empty())?;
        let mut catalog = Catalog::load(&po)?;
        assert!(catalog.header.get("POT-Creation-Date").is_some());
        assert_eq!(
            catalog.get("First").unwrap().occurrences,
            vec![format!("{doc_arg}:3")]
        );
        catalog.set_translation("Title", "Título");
        catalog.set_translation("First", "Primero");
        catalog.save(&po)?;

        fs::write(&doc, "# Title\n\nSecond\n")?;
        let args = [doc_arg.as_str(), "-f", po_arg.as_str(), "-s", "-o"];
        let catalog = run(&parse(&args), io::empty())?;
        assert_eq!(catalog, Catalog::load(&po)?);
        assert_eq!(catalog.translation("Title"), Some("Título"));
        assert!(catalog.get("First").unwrap().obsolete);
        assert_eq!(catalog.get("First").unwrap().msgstr, "Primero");
        assert_eq!(catalog.translation("Second"), None);

        // A second run with the same input changes nothing.
        let saved = fs::read_to_string(&po)?;
        run(&parse(&args), io::empty())?;
        assert_eq!(fs::read_to_string(&po)?, saved);
        Ok(())
    }

    #[test]
    fn test_ignore() -> anyhow::Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        fs::write(tmp_dir.path().join("a.md"), "Kept")?;
        fs::write(tmp_dir.path().join("b.md"), "Ignored")?;
        let pattern = format!("{}/*.md", tmp_dir.path().display());
        let catalog = run(&parse(&[pattern.as_str(), "-i", "b.md"]), io::empty())?;
        assert!(catalog.get("Kept").is_some());
        assert!(catalog.get("Ignored").is_none());
        Ok(())
    }
}
