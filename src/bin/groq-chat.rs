//! Command-line chat with Groq-hosted models.
//!
//! Each invocation sends one message, with the recent conversation from the
//! working directory's history file as context, and prints the reply.
//!
//! # Usage
//!
//! ```bash
//! # Ask a question; the reply streams as it is generated
//! groq-chat what is a borrow checker
//!
//! # Start a fresh conversation
//! groq-chat --reset explain lifetimes
//!
//! # Use a different model and wait for the complete reply
//! groq-chat --model llama-3.1-8b-instant --no-stream hello
//!
//! # Add this binary's directory to PATH in ~/.zshrc / ~/.bashrc
//! groq-chat --install
//! ```
//!
//! The API key is read from `.groq_key.json`; if it is missing you are asked
//! for it once and it is saved there.  Set `GROQ_CHAT_LOG` (for example to
//! `debug`) to see diagnostics on stderr.

use arrrg::CommandLine;
use tracing_subscriber::EnvFilter;

use groq_chat::Groq;
use groq_chat::chat::{
    ChatArgs, ChatConfig, PlainTextRenderer, Renderer, TerminalPrompt, join_message, run_chat,
};
use groq_chat::setup::install_current_exe;

const LOG_ENV: &str = "GROQ_CHAT_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn install(renderer: &mut dyn Renderer) -> Result<(), Box<dyn std::error::Error>> {
    let (bin_dir, report) = install_current_exe()?;
    if report.already_on_path {
        renderer.print_info(&format!("{} is already on PATH", bin_dir.as_str()));
        return Ok(());
    }
    if report.updated.is_empty() {
        renderer.print_info("Shell profiles already add the install directory to PATH");
        return Ok(());
    }
    for profile in &report.updated {
        renderer.print_info(&format!(
            "[ PATH updated in {} with {} ]",
            profile.as_str(),
            bin_dir.as_str()
        ));
    }
    for profile in &report.updated {
        renderer.print_info(&format!(
            "[ Run 'source {}' or restart your terminal to use it ]",
            profile.as_str()
        ));
    }
    Ok(())
}

/// Main entry point for the groq-chat application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let (args, words) = ChatArgs::from_command_line_relaxed("groq-chat [OPTIONS] <MESSAGE>...");
    let run_install = args.install;
    let config = ChatConfig::from(args);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);

    if run_install {
        return install(&mut renderer);
    }

    let message = match join_message(&words) {
        Ok(message) => message,
        Err(err) => {
            renderer.print_error(&err.to_string());
            std::process::exit(2);
        }
    };

    let base_url = config.base_url.clone();
    let result = run_chat(
        config,
        &message,
        &mut TerminalPrompt,
        |api_key| Groq::with_options(api_key, base_url, None),
        &mut renderer,
    )
    .await;

    if let Err(err) = result {
        tracing::debug!(error = ?err, "chat failed");
        renderer.print_error(&err.to_string());
        std::process::exit(1);
    }
    Ok(())
}
