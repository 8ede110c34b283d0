use std::path::PathBuf;
use std::process::ExitCode;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use pitboy_gateway::client::{Dictation, Playback, Speaker, abort_pair};
use pitboy_gateway::{ApiServerBuilder, Config, ProxyClient, Session, SpeechAudio};

/// PitBoy - voice assistant proxy for a watch dictation client
#[derive(Parser)]
#[command(name = "pitboy", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the proxy server (default)
    Serve {
        /// Port to listen on (overrides the configured port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Send an utterance to a running proxy and play the reply
    Ask {
        /// Proxy base URL
        #[arg(long, env = "PITBOY_URL", default_value = "http://localhost:8787")]
        url: String,
        /// Shared secret sent as x-api-key
        #[arg(long, env = "PITBOY_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Write synthesized reply audio to this file
        #[arg(long)]
        audio: Option<PathBuf>,
        /// Utterance; read line by line from stdin when omitted
        text: Vec<String>,
    },
    /// Show the resolved provider configuration
    Providers,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,pitboy_gateway=info",
        1 => "info,pitboy_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(port).await,
        Command::Ask {
            url,
            api_key,
            audio,
            text,
        } => ask(&url, api_key, audio, text).await,
        Command::Providers => providers(),
    }
}

/// Run the proxy until interrupted
async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    ApiServerBuilder::from_config(&config)?.build().run().await?;
    Ok(())
}

/// Drive one client session against a running proxy
async fn ask(
    url: &str,
    api_key: Option<String>,
    audio: Option<PathBuf>,
    text: Vec<String>,
) -> anyhow::Result<()> {
    let api_key = api_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .map(SecretString::from);
    let uplink = ProxyClient::new(url, api_key)?;

    let dictation = if text.is_empty() {
        eprintln!("Speak (type) your message, end with an empty line:");
        ConsoleDictation::Stdin {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            transcript: String::new(),
        }
    } else {
        ConsoleDictation::Args(Some(text.join(" ")))
    };

    let playback = if audio.is_some() {
        Playback::Audio
    } else {
        Playback::Text
    };
    let speaker = ConsoleSpeaker { audio_path: audio };

    let mut session = Session::new(uplink, dictation, speaker, playback);

    let (handle, signal) = abort_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.abort();
        }
    });

    eprintln!("[{}]", session.status_text());
    let mut status = session.subscribe();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let state = *status.borrow_and_update();
            eprintln!("[{}]", state.status_text());
        }
    });
    session.listen(&signal).await;
    if signal.is_aborted() {
        anyhow::bail!("aborted");
    }

    eprintln!("> {}", session.transcript());
    session.send(&signal).await;

    if let Some(err) = session.last_error() {
        anyhow::bail!("{err}");
    }
    if signal.is_aborted() {
        anyhow::bail!("aborted");
    }
    if playback == Playback::Audio {
        println!("{}", session.response());
    }

    Ok(())
}

/// Print the provider configuration without secrets
fn providers() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    println!("port:          {}", config.port);
    let auth = if config.api_key.is_some() {
        "x-api-key required"
    } else {
        "disabled"
    };
    println!("auth:          {auth}");
    println!("chat provider: {}", config.chat.provider.as_str());
    println!("chat model:    {}", config.chat.model);
    println!(
        "gateway url:   {}",
        config.chat.gateway_url.as_deref().unwrap_or("(unset)")
    );
    println!("tts provider:  {}", config.speech.provider);
    println!(
        "tts voice:     {} ({}, {})",
        config.speech.voice, config.speech.model, config.speech.format
    );
    Ok(())
}

/// Dictation from the command line or stdin
enum ConsoleDictation {
    Args(Option<String>),
    Stdin {
        lines: Lines<BufReader<Stdin>>,
        transcript: String,
    },
}

#[async_trait]
impl Dictation for ConsoleDictation {
    async fn next_partial(&mut self) -> pitboy_gateway::Result<Option<String>> {
        match self {
            Self::Args(text) => Ok(text.take()),
            Self::Stdin { lines, transcript } => match lines.next_line().await? {
                Some(line) if !line.trim().is_empty() => {
                    if !transcript.is_empty() {
                        transcript.push(' ');
                    }
                    transcript.push_str(line.trim());
                    Ok(Some(transcript.clone()))
                }
                _ => Ok(None),
            },
        }
    }
}

/// Prints replies and writes synthesized audio to disk
struct ConsoleSpeaker {
    audio_path: Option<PathBuf>,
}

#[async_trait]
impl Speaker for ConsoleSpeaker {
    async fn speak(&mut self, text: &str) -> pitboy_gateway::Result<()> {
        println!("{text}");
        Ok(())
    }

    async fn play(&mut self, audio: &SpeechAudio) -> pitboy_gateway::Result<()> {
        let Some(path) = &self.audio_path else {
            return Ok(());
        };
        tokio::fs::write(path, &audio.bytes).await?;
        eprintln!(
            "wrote {} bytes of {} to {}",
            audio.bytes.len(),
            audio.mime_type,
            path.display()
        );
        Ok(())
    }
}
