//! richedit - replay host events against a text view
//!
//! Reads a script of messages, plays it through `update` with the monospace
//! reference layout and prints the final view state as JSON.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use cli::CliArgs;
use richedit::config::TextViewConfig;
use richedit::script::{Script, ScriptRunner};

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => TextViewConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TextViewConfig::load(),
    };
    richedit::tracing::init(config.file_logging && !args.no_log_file);

    let script = Script::load(&args.script)
        .with_context(|| format!("loading script {}", args.script.display()))?;
    tracing::info!(steps = script.steps.len(), "replaying {}", args.script.display());

    let mut runner = ScriptRunner::new(&config, script.frame);
    if let Some(text) = &args.text {
        runner.view_mut().set_text(text);
    }
    runner.run(&script.steps);

    let mut report = runner.report();
    if args.no_commands {
        report.commands.clear();
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("serializing report")?;
    println!("{}", json);
    Ok(())
}
