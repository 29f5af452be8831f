use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use deepchat_core::{EmbedOptions, Position, Theme};

mod app;
mod commands;

#[derive(Parser)]
#[command(name = "deepchat")]
#[command(about = "DeepChat - chat with OpenRouter models from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Run a single prompt and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// OpenRouter model to use
    #[arg(short, long)]
    model: Option<String>,

    /// System prompt prepended to every request
    #[arg(long)]
    system: Option<String>,

    /// OpenRouter API key (saved for later runs)
    #[arg(long)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print an HTML snippet that embeds the chat widget
    Embed {
        #[arg(long, value_enum, default_value = "right")]
        position: PositionArg,

        #[arg(long, value_enum, default_value = "light")]
        theme: ThemeArg,

        /// Open the widget on page load
        #[arg(long)]
        open: bool,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,

        /// Origin serving chatbot-widget.js
        #[arg(long, default_value = "http://localhost:8080")]
        script_url: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PositionArg {
    Right,
    Left,
    Center,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
    Auto,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(Command::Embed {
        position,
        theme,
        open,
        width,
        height,
        script_url,
    }) = cli.command
    {
        let options = EmbedOptions {
            position: match position {
                PositionArg::Right => Position::Right,
                PositionArg::Left => Position::Left,
                PositionArg::Center => Position::Center,
            },
            theme: match theme {
                ThemeArg::Light => Theme::Light,
                ThemeArg::Dark => Theme::Dark,
                ThemeArg::Auto => Theme::Auto,
            },
            initially_open: open,
            width,
            height,
        };
        app::print_embed(&options, &script_url);
        return Ok(());
    }

    let mut settings = deepchat_core::Settings::load();
    if let Some(ref model) = cli.model {
        settings.chat.model = model.clone();
    }
    if let Some(ref system) = cli.system {
        settings.chat.system_prompt = Some(system.clone());
    }

    let session = app::build_session(&settings, cli.api_key.as_deref()).await;

    if let Some(prompt) = cli.prompt {
        app::run_single_prompt(&session, &prompt).await?;
    } else {
        app::run_interactive(&session).await?;
    }

    Ok(())
}
