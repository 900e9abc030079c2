// Tribunal CLI - Session Timeline Review
// Reconstructs recorded sessions into steppable timelines for forensic review

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tribunal_core::{
    build_timeline, drive_auto_advance, ArchiveStore, Event, EventKind, PlaybackController,
    SessionRecord, Snapshot, SuspicionLevel, TimelineWriter, AUTO_ADVANCE_INTERVAL,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    match &cli.command {
        Command::Review(cmd) => handle_review(cmd).await?,
        Command::Inspect(cmd) => handle_inspect(cmd)?,
        Command::Export(cmd) => handle_export(cmd)?,
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    name = "tribunal",
    author,
    version,
    about = "Tribunal: forensic review of recorded session timelines",
    long_about = "Reconstruct recorded sessions into steppable timelines.\nReview interactively, inspect summaries, or export to JSONL."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Step through a session timeline interactively
    Review(ReviewArgs),
    /// Print a summary of a session record
    Inspect(InspectArgs),
    /// Export a session timeline to JSONL
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ReviewArgs {
    /// Session record to review (latest in the archive if not specified)
    #[arg(short, long)]
    archive: Option<PathBuf>,
    /// Auto-advance delay in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Print event text at once instead of revealing it
    #[arg(long)]
    no_typewriter: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Session record to inspect (latest in the archive if not specified)
    #[arg(short, long)]
    archive: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Session record to export (latest in the archive if not specified)
    #[arg(short, long)]
    archive: Option<PathBuf>,
    /// Output directory (default: ~/Archives/tribunal/exports)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Resolve and load a record, surfacing the corrupted-archive state
/// (missing record or empty timeline) as a fatal diagnostic.
fn load_session(archive: &Option<PathBuf>) -> Result<(PathBuf, SessionRecord, Vec<Event>)> {
    let store = ArchiveStore::new()?;
    let path = match archive {
        Some(path) => path.clone(),
        None => store.find_latest_record()?,
    };

    let record = match store.load_record(&path)? {
        Some(record) => record,
        None => {
            report_corrupted(&path, "record not found");
            std::process::exit(1);
        }
    };

    let events = build_timeline(&record);
    if events.is_empty() {
        report_corrupted(&path, "no reconstructable events");
        std::process::exit(1);
    }

    Ok((path, record, events))
}

fn report_corrupted(path: &Path, reason: &str) {
    eprintln!("⚠ ARCHIVE CORRUPTED");
    eprintln!("  {}", path.display());
    eprintln!("  {}", reason);
}

fn session_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

async fn handle_review(args: &ReviewArgs) -> Result<()> {
    let (path, record, events) = load_session(&args.archive)?;
    let participants: Vec<String> = record.participants.keys().cloned().collect();
    let total = events.len();

    eprintln!("✓ Loaded session: {} ({} events)", path.display(), total);
    eprintln!("  [Enter/n] next  [p] previous  [a] auto-advance  [q] quit");

    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or(AUTO_ADVANCE_INTERVAL);
    let typewriter = !args.no_typewriter;

    let controller = Arc::new(Mutex::new(PlaybackController::new(events, participants)?));

    {
        let mut guard = controller.lock().expect("replay state lock poisoned");
        let snapshot = guard.snapshot();
        present(&mut guard, &snapshot, typewriter);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" | "n" => {
                let mut guard = controller.lock().expect("replay state lock poisoned");
                let snapshot = guard.step(1);
                present(&mut guard, &snapshot, typewriter);
            }
            "p" => {
                let mut guard = controller.lock().expect("replay state lock poisoned");
                let snapshot = guard.step(-1);
                present(&mut guard, &snapshot, typewriter);
            }
            "a" => {
                let mut guard = controller.lock().expect("replay state lock poisoned");
                if guard.toggle_auto_play() {
                    eprintln!("✓ Auto-advance on ({} ms)", interval.as_millis());
                    let shared = Arc::clone(&controller);
                    let loop_controller = Arc::clone(&controller);
                    let handle = tokio::spawn(async move {
                        drive_auto_advance(loop_controller, interval, move |snapshot| {
                            let mut guard =
                                shared.lock().expect("replay state lock poisoned");
                            present(&mut guard, &snapshot, typewriter);
                        })
                        .await;
                    });
                    guard.set_advance_task(handle);
                } else {
                    eprintln!("⚠ Auto-advance off");
                }
            }
            "q" => break,
            other => eprintln!("⚠ Unknown command: {}", other),
        }
    }

    Ok(())
}

/// Render a snapshot and, when enabled, hand the text reveal to a
/// fresh task in the controller's reveal slot. The reveal task is
/// spawned last so its output lands below the frame.
fn present(controller: &mut PlaybackController, snapshot: &Snapshot, typewriter: bool) {
    render_header(snapshot);
    render_footer(snapshot, controller.events().len());
    if typewriter {
        let text = snapshot.event.text.clone();
        controller.set_reveal_task(tokio::spawn(async move {
            reveal_text(&text).await;
        }));
    } else {
        println!("  {}", snapshot.event.text);
    }
}

fn render_header(snapshot: &Snapshot) {
    let event = &snapshot.event;
    let kind = match event.kind {
        EventKind::System => "SYSTEM",
        EventKind::Speak => "SPEAK",
        EventKind::Action => "ACTION",
        EventKind::Reveal => "REVEAL",
    };
    let phase = event
        .phase
        .map(|p| format!(" [{:?}]", p).to_lowercase())
        .unwrap_or_default();
    let exile = if event.is_elimination { " ✗ EXILED" } else { "" };

    println!();
    println!(
        "── [{}] {} · {}{}{}",
        kind,
        event.actor_label(),
        event.meta,
        phase,
        exile
    );
}

fn render_footer(snapshot: &Snapshot, total: usize) {
    if let Some(ref roles) = snapshot.event.roles {
        if !roles.is_empty() {
            println!("  Roles:");
            for (player, role) in roles {
                println!("    {}: {}", player, role);
            }
        }
    }

    if !snapshot.suspicion_scores.is_empty() {
        println!("  Suspicion:");
        for (player, score) in &snapshot.suspicion_scores {
            println!(
                "    {:<12} {} {:>3} ({})",
                player,
                score_bar(*score),
                score,
                SuspicionLevel::from_score(*score).label()
            );
        }
    }

    println!(
        "  Event {}/{} · {:.0}%",
        snapshot.index + 1,
        total,
        snapshot.progress_percent
    );
}

fn score_bar(score: u8) -> String {
    let filled = (score as usize * 10) / 100;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(10 - filled))
}

/// Character-by-character text reveal. Cancelled mid-word when the
/// cursor moves before the line completes.
async fn reveal_text(text: &str) {
    print!("  ");
    for ch in text.chars() {
        print!("{}", ch);
        let _ = std::io::stdout().flush();
        tokio::time::sleep(Duration::from_millis(18)).await;
    }
    println!();
}

fn handle_inspect(args: &InspectArgs) -> Result<()> {
    let (path, record, events) = load_session(&args.archive)?;

    let mut kind_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut eliminations = 0;
    for event in &events {
        let kind = match event.kind {
            EventKind::System => "system",
            EventKind::Speak => "speak",
            EventKind::Action => "action",
            EventKind::Reveal => "reveal",
        };
        *kind_counts.entry(kind).or_insert(0) += 1;
        if event.is_elimination {
            eliminations += 1;
        }
    }

    println!("Session: {}", session_id(&path));
    println!("  Events: {}", events.len());
    for (kind, count) in &kind_counts {
        println!("    {:<8} {}", kind, count);
    }
    println!("  Eliminations: {}", eliminations);
    println!(
        "  Participants: {}",
        if record.participants.is_empty() {
            "(none recorded)".to_string()
        } else {
            record
                .participants
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        }
    );
    println!(
        "  Winner: {}",
        record.winner.as_deref().unwrap_or("UNKNOWN")
    );

    Ok(())
}

fn handle_export(args: &ExportArgs) -> Result<()> {
    let (path, record, events) = load_session(&args.archive)?;

    let writer = match &args.output {
        Some(output) => TimelineWriter::with_base_dir(output.clone()),
        None => {
            let store = ArchiveStore::new()?;
            TimelineWriter::with_base_dir(store.base_dir().join("exports"))
        }
    };

    let id = session_id(&path);
    let session_dir = writer.write_timeline(&id, &record, &events)?;
    eprintln!(
        "✓ Exported {} events to {}",
        events.len(),
        session_dir.display()
    );

    Ok(())
}
