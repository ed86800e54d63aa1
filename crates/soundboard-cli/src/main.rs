//! soundboard CLI — standalone host for the soundboard skill.
//!
//! ```text
//! soundboard serve [--skill-dir skill] [--port 2004] [--speech-server http://localhost:2003]
//! soundboard say "let one rip" [--server http://localhost:2004]
//! soundboard intent random / stop / status [--server ...]
//! soundboard sounds [--skill-dir skill]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use soundboard_lib::config::default_config_paths;
use soundboard_lib::host::SystemClock;
use soundboard_lib::intents::IntentRouter;
use soundboard_lib::library::{SymphoniaProbe, SoundLibrary};
use soundboard_lib::playback::RodioPlayer;
use soundboard_lib::scheduler::TokioScheduler;
use soundboard_lib::server::{self, ApiState};
use soundboard_lib::skill::{SkillServices, SoundboardSkill};
use soundboard_lib::soundboard_core::types::{DIALOG_DIR, SOUND_EXTENSIONS, SOUNDS_DIR, VOCAB_DIR};
use soundboard_lib::speech::{DialogSpeech, HttpSink, LogSink, SpeechSink};

/// soundboard — plays random clips on request or on a random timer
#[derive(Parser)]
#[command(name = "soundboard", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the skill and serve its HTTP API
    Serve {
        /// Skill directory holding sounds/, dialog/ and vocab/
        #[arg(long, default_value = "skill")]
        skill_dir: PathBuf,
        /// Listen port
        #[arg(long, default_value = "2004")]
        port: u16,
        /// Listen host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// TTS server for spoken lines (POST /speak); log only when unset
        #[arg(long)]
        speech_server: Option<String>,
        /// Host config files, lowest precedence first (default: system then user)
        #[arg(long = "config")]
        config: Vec<PathBuf>,
    },
    /// Send an utterance to the running host
    Say {
        /// Utterance to recognize
        utterance: String,
        /// Server URL
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Fire an intent by name
    Intent {
        /// Intent name (accuse, request, random, halt_farting)
        name: String,
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Call the skill's stop hook
    Stop {
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Get skill status
    Status {
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// List the clips the skill would load
    Sounds {
        #[arg(long, default_value = "skill")]
        skill_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soundboard=info,soundboard_lib=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            skill_dir,
            port,
            host,
            speech_server,
            config,
        } => serve(skill_dir, &host, port, speech_server, config).await?,

        Command::Say { utterance, server } => {
            let resp = reqwest::Client::new()
                .post(format!("{server}/utterance"))
                .json(&serde_json::json!({ "utterance": utterance }))
                .send()
                .await
                .context("request failed")?;
            println!("{}", resp.text().await.unwrap_or_default());
        }

        Command::Intent { name, server } => post_simple(&server, &format!("intent/{name}")).await?,
        Command::Stop { server } => post_simple(&server, "stop").await?,

        Command::Status { server } => {
            let resp = reqwest::Client::new()
                .get(format!("{server}/status"))
                .send()
                .await
                .context("request failed")?;
            println!("{}", resp.text().await.unwrap_or_default());
        }

        Command::Sounds { skill_dir } => {
            let library = SoundLibrary::load(&skill_dir.join(SOUNDS_DIR), SOUND_EXTENSIONS)?;
            for path in library.paths() {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

async fn serve(
    skill_dir: PathBuf,
    host: &str,
    port: u16,
    speech_server: Option<String>,
    config: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let handle = tokio::runtime::Handle::current();

    let sink: Box<dyn SpeechSink> = match speech_server {
        Some(url) => Box::new(HttpSink::new(&url, handle.clone())),
        None => Box::new(LogSink),
    };
    let speech = DialogSpeech::load(&skill_dir.join(DIALOG_DIR), sink)
        .with_context(|| format!("loading dialogs from {}", skill_dir.display()))?;

    let services = SkillServices {
        scheduler: Arc::new(TokioScheduler::new(handle)),
        speech: Arc::new(speech),
        clock: Arc::new(SystemClock),
        probe: Arc::new(SymphoniaProbe),
    };
    let config_paths = if config.is_empty() {
        default_config_paths()
    } else {
        config
    };
    let skill = Arc::new(SoundboardSkill::load(&skill_dir, &config_paths, services)?);

    let mut intents = IntentRouter::new(&skill_dir.join(VOCAB_DIR));
    skill.initialize(&mut intents, Arc::new(RodioPlayer::new()?))?;
    info!("intents: {}", intents.intent_names().join(", "));

    let app = server::router(ApiState {
        skill,
        intents: Arc::new(intents),
    });

    let addr = format!("{host}:{port}");
    info!("soundboard listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn post_simple(server: &str, endpoint: &str) -> anyhow::Result<()> {
    let resp = reqwest::Client::new()
        .post(format!("{server}/{endpoint}"))
        .send()
        .await
        .context("request failed")?;
    println!("{}", resp.text().await.unwrap_or_default());
    Ok(())
}
