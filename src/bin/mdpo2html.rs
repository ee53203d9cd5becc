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

//! Translate Markdown files with PO files and render them as HTML.

use std::io;

use clap::Parser;
use mdpo::cli::{init_logging, TranslateArgs};
use mdpo::translate_markdown_to_html;

#[derive(Debug, Parser)]
#[command(version, about = "Translate Markdown files using PO files and render HTML")]
struct Cli {
    #[command(flatten)]
    args: TranslateArgs,
}

#[allow(clippy::print_stdout)]
fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let html = cli.args.run(io::stdin(), translate_markdown_to_html)?;
    if !cli.args.quiet {
        print!("{html}");
    }
    Ok(())
}
