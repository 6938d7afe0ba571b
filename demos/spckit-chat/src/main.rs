//! Terminal chat for the Spckit recommendation session.
//!
//! Reads settings from the environment (after loading `.env.local` and `.env`),
//! then runs a line-based chat: plain text goes to the model, slash commands
//! select parts, walk the guided build, or return home.

mod render;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use spckit::config::SpckitConfig;
use spckit::primitives::BuildCategory;
use spckit::session::{
    CompositeSessionObserver, IgnoreReason, RecommendationSession, Selection, SessionObserver,
    StageAdvance, SubmitOutcome, TracingSessionObserver,
};
use spckit::telemetry::{LogFormat, TelemetryConfig, init_tracing};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::render::{TerminalObserver, print_help, print_parts};

/// Spckit AI: PC parts recommendations in the terminal.
#[derive(Parser, Debug)]
#[command(name = "spckit-chat")]
#[command(about = "Chat with Spckit AI to assemble a PC parts quote", long_about = None)]
struct Cli {
    /// Walk the parts one category at a time (overrides SPCKIT_GUIDED_BUILD)
    #[arg(long, action = ArgAction::SetTrue)]
    guided: bool,

    /// Model identifier (overrides SPCKIT_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Earlier turns sent with each message (overrides SPCKIT_HISTORY_TURNS)
    #[arg(long)]
    history_turns: Option<usize>,

    /// Multi-line log output
    #[arg(long, action = ArgAction::SetTrue)]
    pretty_logs: bool,

    /// Exit after answering the inline prompt
    #[arg(long, action = ArgAction::SetTrue)]
    once: bool,

    /// First message to send, e.g. "150만원 게이밍 PC"
    #[arg(value_parser, trailing_var_arg = true)]
    prompt: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Message(String),
    Select(usize),
    Remove(String),
    Next,
    Parts,
    Home,
    Help,
    Quit,
    Invalid(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Message(line.to_owned());
        };
        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(name, arg)| (name, arg.trim()));
        match name {
            "select" => arg
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .map_or_else(|| Self::Invalid("사용법: /select 번호".to_owned()), Self::Select),
            "remove" if !arg.is_empty() => Self::Remove(arg.to_owned()),
            "remove" => Self::Invalid("사용법: /remove 분류".to_owned()),
            "next" => Self::Next,
            "parts" => Self::Parts,
            "home" => Self::Home,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Invalid(format!("알 수 없는 명령어: /{other}")),
        }
    }
}

fn stage_request(category: BuildCategory) -> String {
    format!("{category} 부품을 추천해주세요.")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    let telemetry = TelemetryConfig {
        format: if cli.pretty_logs {
            LogFormat::Pretty
        } else {
            LogFormat::Compact
        },
        default_directive: "warn".to_owned(),
        ..TelemetryConfig::default()
    };
    init_tracing(&telemetry)?;

    let mut config = SpckitConfig::from_env().context("failed to load configuration")?;
    if cli.guided {
        config = config.with_guided_build(true);
    }
    if let Some(model) = cli.model {
        config = config.with_model(model);
    }
    if let Some(turns) = cli.history_turns {
        config = config.with_history_turns(turns);
    }

    let client = config.build_client()?;
    let observer = CompositeSessionObserver::new([
        Arc::new(TerminalObserver) as Arc<dyn SessionObserver>,
        Arc::new(TracingSessionObserver),
    ]);
    let session =
        RecommendationSession::with_observer(client, config.session_config(), Arc::new(observer));
    info!(session_id = %session.id(), model = config.model(), "chat started");

    println!("Spckit AI에 오신 것을 환영합니다. 원하는 PC의 용도와 예산을 알려주세요. (/help)");
    if let Some(stage) = session.current_stage() {
        println!("단계별 견적 모드: {stage}부터 시작합니다.");
    }

    if !cli.prompt.is_empty() {
        session.submit_message(&cli.prompt.join(" ")).await;
        if cli.once {
            return Ok(());
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !handle(&session, Command::parse(&line)).await {
            break;
        }
    }
    Ok(())
}

/// Runs one command. Returns `false` when the chat should end.
async fn handle(session: &RecommendationSession, command: Command) -> bool {
    match command {
        Command::Message(text) => {
            if let SubmitOutcome::Ignored(IgnoreReason::Busy) = session.submit_message(&text).await
            {
                println!("이전 요청을 처리하는 중입니다.");
            }
        }
        Command::Select(number) => match session.candidates().get(number - 1) {
            Some(component) => {
                if session.select_component(component.clone()) == Selection::Unchanged {
                    println!("이미 선택한 부품입니다.");
                }
            }
            None => println!("{number}번 추천 부품이 없습니다."),
        },
        Command::Remove(category) => {
            if !session.remove_component(&category) {
                println!("{category} 분류에 선택한 부품이 없습니다.");
            }
        }
        Command::Next => match session.advance_stage() {
            StageAdvance::Next(category) => {
                session.submit_message(&stage_request(category)).await;
            }
            StageAdvance::Complete => print_parts(&session.selected_parts()),
            StageAdvance::Disabled => println!("단계별 견적 모드가 아닙니다. --guided 로 실행하세요."),
        },
        Command::Parts => print_parts(&session.selected_parts()),
        Command::Home => {
            session.reset();
            println!("처음으로 돌아왔습니다. 새로운 요청을 입력하세요.");
        }
        Command::Help => print_help(),
        Command::Quit => return false,
        Command::Invalid(message) => println!("{message}"),
    }
    true
}
