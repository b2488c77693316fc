use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use tandem_call::config::SessionConfig;
use tandem_call::device::{MediaToggles, SyntheticDevices};
use tandem_call::session::{RoomSession, RoomSnapshot, RoomState, SessionNotice};
use tandem_call::signaling::WsChannel;

#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Two-person calls from the terminal")]
struct Args {
    /// Relay websocket URL.
    #[arg(long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Room to join.
    #[arg(long)]
    room: String,

    /// Name shown to the other member.
    #[arg(long, default_value = "anonymous")]
    name: String,

    /// Send audio on calls.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    audio: bool,

    /// Send video on calls.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    video: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    println!(
        "{}",
        format!("📞 Joining room '{}' as '{}'...", args.room, args.name)
            .green()
            .bold()
    );

    let (channel, server_rx) = WsChannel::connect(&args.url)
        .await
        .context("Failed to reach the relay")?;

    let devices = Arc::new(SyntheticDevices::new(MediaToggles {
        audio: args.audio,
        video: args.video,
    }));
    let config = SessionConfig::new(args.room.as_str(), args.name.clone());
    let handle = RoomSession::spawn(config, Arc::new(channel), server_rx, devices);

    let mut snapshots = handle.watch();
    let printer = tokio::spawn(async move {
        loop {
            {
                let snap = snapshots.borrow_and_update().clone();
                render(&snap);
            }
            if snapshots.changed().await.is_err() {
                break;
            }
        }
    });

    println!(
        "   Commands: {}",
        "call, accept, reject, hangup, rejoin, quit".cyan()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let result = match line.trim() {
            "" => Ok(()),
            "call" => handle.start_call().await,
            "accept" => handle.accept_call().await,
            "reject" => handle.reject_call().await,
            "hangup" => handle.end_call().await,
            "rejoin" => handle.rejoin().await,
            "quit" => {
                let _ = handle.shutdown().await;
                break;
            }
            other => {
                println!(
                    "{}",
                    format!("Unknown command '{other}'. Try: call, accept, reject, hangup, rejoin, quit.")
                        .red()
                );
                Ok(())
            }
        };
        if result.is_err() {
            println!("{}", "Session is gone. Bye!".red());
            break;
        }
    }

    let _ = handle.shutdown().await;
    printer.abort();
    Ok(())
}

fn render(snap: &RoomSnapshot) {
    let line = match snap.state {
        RoomState::Waiting => "⏳ Waiting for someone to join...".yellow(),
        RoomState::CanCall => "✅ Peer present. Type 'call' to ring them.".green(),
        RoomState::Calling => "📤 Calling...".cyan(),
        RoomState::Ringing => match &snap.peer_name {
            Some(name) => format!("📥 {name} is calling. Type 'accept' or 'reject'.").cyan(),
            None => "📥 Incoming call. Type 'accept' or 'reject'.".cyan(),
        },
        RoomState::Connecting => "🔗 Negotiating media...".cyan(),
        RoomState::Connected => match &snap.peer_name {
            Some(name) => format!("🎉 In a call with {name}.").green().bold(),
            None => "🎉 Call is live.".green().bold(),
        },
        RoomState::Rejected => "🚫 They turned the call down. 'rejoin' to try again.".red(),
        RoomState::Full => "🈵 That room already has two people.".red(),
        RoomState::Ended => "👋 Call over. 'rejoin' to go again or 'quit' to leave.".yellow(),
    };
    println!("{line}");

    if let Some(SessionNotice::CannotStartCall) = snap.notice {
        println!("{}", "⚠ The call could not be started on this side.".red());
    }
}
