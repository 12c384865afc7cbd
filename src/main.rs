use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use exercise_segment_sync::logging;
use exercise_segment_sync::player::{SimulatedLoader, SimulatedPlatform};
use exercise_segment_sync::{
    validate_submission, AnalysisClient, Config, MountState, PlatformProvider, Segment, SegmentSource,
    SegmentSynchronizer, SyncSettings, VideoId,
};

#[tokio::main]
async fn main() -> Result<()> {
    let url_arg = || {
        Arg::new("url")
            .short('u')
            .long("url")
            .value_name("URL")
            .help("Video URL")
            .required(true)
    };
    let segments_arg = || {
        Arg::new("segments")
            .short('s')
            .long("segments")
            .value_name("FILE")
            .help("JSON file with the exercise segments")
            .required(true)
    };

    let matches = Command::new("Exercise Segments")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Exercise segment playback planning and simulation")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .global(true)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
                .global(true)
        )
        .subcommand(
            Command::new("video-id")
                .about("Extract the video id from a URL")
                .arg(Arg::new("url").value_name("URL").required(true))
        )
        .subcommand(
            Command::new("plan")
                .about("Show the playback window of every segment")
                .arg(url_arg())
                .arg(segments_arg())
        )
        .subcommand(
            Command::new("analyze")
                .about("Ask the analysis service for the segments of a video")
                .arg(url_arg())
        )
        .subcommand(
            Command::new("simulate")
                .about("Play every segment on a simulated player and report corrections")
                .arg(url_arg())
                .arg(segments_arg())
                .arg(
                    Arg::new("seconds")
                        .long("seconds")
                        .value_name("SECONDS")
                        .help("Simulated playback time")
                        .default_value("30")
                )
        )
        .get_matches();

    let log_handle = logging::init(matches.get_flag("verbose"))?;

    let config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(path)?.with_env_overrides(),
        None => Config::load()?,
    };
    config.validate()?;
    log_handle.apply(&config.logging)?;

    match matches.subcommand() {
        Some(("video-id", sub)) => video_id_command(sub),
        Some(("plan", sub)) => plan_command(sub).await,
        Some(("analyze", sub)) => analyze_command(sub, &config).await,
        Some(("simulate", sub)) => simulate_command(sub, &config).await,
        _ => unreachable!("subcommand is required"),
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(name)
        .with_context(|| format!("missing --{}", name))
}

async fn load_segments(path: &Path) -> Result<Vec<Segment>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Cannot read segments file {}", path.display()))?;
    exercise_segment_sync::analysis::parse_analysis_response(&content)
        .with_context(|| format!("Invalid segments file {}", path.display()))
}

fn video_id_command(matches: &ArgMatches) -> Result<()> {
    let url = required(matches, "url")?;
    let video_id = VideoId::from_url(url).with_context(|| format!("No video id found in {}", url))?;
    println!("{}", video_id);
    Ok(())
}

async fn plan_command(matches: &ArgMatches) -> Result<()> {
    let url = required(matches, "url")?;
    let segments = load_segments(Path::new(required(matches, "segments")?)).await?;
    let video_id = VideoId::from_url(url).with_context(|| format!("Invalid YouTube URL: {}", url))?;

    info!("🎬 Video {} with {} segments", video_id, segments.len());
    for (index, segment) in segments.iter().enumerate() {
        let window = segment.window();
        println!("{}. {}", index + 1, segment.name);
        println!("   Timestamp: {} {}", segment.timestamp_range, window);
        if !segment.description.is_empty() {
            println!("   Description: {}", segment.description);
        }
        println!("   Link: {}", video_id.watch_url(window.start));
        if window.is_degenerate() {
            warn!("⚠️ '{}' has an empty window, playback stays pinned at {}s", segment.name, window.start);
        }
    }
    Ok(())
}

async fn analyze_command(matches: &ArgMatches, config: &Config) -> Result<()> {
    let url = required(matches, "url")?;
    validate_submission(url)?;

    let client = AnalysisClient::new(&config.analysis)?;
    info!("🔍 Analyzing {} via {}", url, client.endpoint());
    let segments = client.fetch_segments(url).await?;
    println!("{}", serde_json::to_string_pretty(&segments)?);
    Ok(())
}

async fn simulate_command(matches: &ArgMatches, config: &Config) -> Result<()> {
    let url = required(matches, "url")?;
    let segments = load_segments(Path::new(required(matches, "segments")?)).await?;
    let seconds: u64 = required(matches, "seconds")?.parse()?;

    let platform = Arc::new(SimulatedPlatform::new());
    let provider = PlatformProvider::new(SimulatedLoader::with_platform(platform.clone()));
    let settings = SyncSettings::from(config);
    let step = settings.poll_interval;

    let mut synchronizer = SegmentSynchronizer::mount(&provider, url, &segments, settings).await;
    if synchronizer.state() != MountState::Active {
        anyhow::bail!("Cannot display segments: {:?}", synchronizer.state());
    }

    // Ready must be applied before play: cueing stops the player
    let players = platform.players();
    for player in &players {
        player.emit_ready();
    }
    synchronizer.process_pending();
    for player in &players {
        player.play_from(0.0);
    }
    synchronizer.process_pending();

    info!("▶️ Simulating {}s of playback on {} surfaces", seconds, players.len());
    let ticks = Duration::from_secs(seconds).as_millis() / step.as_millis().max(1);
    for _ in 0..ticks {
        tokio::time::sleep(step).await;
        for player in &players {
            player.advance(step.as_secs_f64());
        }
        synchronizer.process_pending();
    }

    for surface in synchronizer.surfaces() {
        if let Some(player) = platform.player(surface.mount_id()) {
            println!(
                "{}: window {} settled at {:.1}s after {} corrective seeks",
                surface.segment().name,
                surface.window(),
                player.position(),
                player.seek_count()
            );
        }
    }

    synchronizer.teardown().await;
    info!("🧹 Simulation finished, {} players still live", platform.live_count());
    Ok(())
}
