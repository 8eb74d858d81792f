//! Reddit Archiver - CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use rand::Rng;
use tokio::time::sleep;
use tracing_subscriber::{fmt, EnvFilter};

use reddit_archiver::{
    api::{CommentSource, PrefetchedComments, RedditApi, Submission},
    cli::{Args, Source},
    config::{validate_config, Config},
    download::{archive_submission, ArchiveOptions, Downloader, RunStats},
    error::{exit_codes, Error, Result},
    fs::{submissions_dir, subreddit_dir},
    output::{print_banner, print_config_summary, print_error, print_info, print_run_stats, print_warning},
};

/// Local configuration file looked up before the platform one.
const LOCAL_CONFIG: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::Api(_) | Error::NotFound(_) | Error::RateLimited(_) | Error::Http(_) => {
                    ExitCode::from(exit_codes::API_ERROR as u8)
                }
                Error::Download(_) | Error::Fetch(_) => {
                    ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8)
                }
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<i32> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    if !args.quiet {
        print_banner();
    }

    // Load configuration
    let mut config = match config_path(args.config.as_deref()) {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            Config::load(&path)?
        }
        None => {
            print_warning("No configuration file found, using defaults and CLI arguments");
            Config::default()
        }
    };

    let sources = args.sources()?;
    if sources.is_empty() {
        return Err(Error::Config(
            "Nothing to archive. Pass --subreddit or --submission.".to_string(),
        ));
    }

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate configuration
    validate_config(&config)?;

    let output_dir = config.output_directory();
    if config.options.show_progress {
        print_config_summary(
            &sources.iter().map(ToString::to_string).collect::<Vec<_>>(),
            &enabled_options(&config),
            &output_dir.display().to_string(),
        );
    }

    let api = RedditApi::new(&config.reddit.user_agent, &config.endpoints.reddit_api)?;
    let downloader = Downloader::from_config(&config)?;
    let options = ArchiveOptions::from_config(&config);

    let mut stats = RunStats::default();

    for source in &sources {
        print_info(&format!("Archiving {}", source));

        let result = match source {
            Source::Subreddit { name, sort, limit } => match api.listing(name, *sort, *limit).await {
                Ok(submissions) => {
                    tracing::info!("Listing returned {} submission(s)", submissions.len());
                    let parent = subreddit_dir(&output_dir, name, *sort);
                    archive_all(&api, &downloader, &options, &parent, submissions, &mut stats).await;
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Source::Submissions(ids) => {
                let parent = submissions_dir(&output_dir);
                let prefetched = PrefetchedComments::new(&api);
                let mut submissions = Vec::with_capacity(ids.len());
                for id in ids {
                    match api.submission(id).await {
                        Ok((submission, forest)) => {
                            prefetched.insert(&submission.id, forest);
                            submissions.push(submission);
                        }
                        Err(e) => {
                            print_error(&format!("Failed to fetch submission {}: {}", id, e));
                            stats.record_error();
                        }
                    }
                }
                archive_all(&prefetched, &downloader, &options, &parent, submissions, &mut stats).await;
                Ok(())
            }
        };

        match result {
            Ok(()) => stats.source_done(),
            Err(e) => {
                print_error(&format!("Failed to archive {}: {}", source, e));
                stats.source_failed();
            }
        }
    }

    print_run_stats(&stats);

    if stats.sources_failed > 0 || stats.errored > 0 {
        return Ok(exit_codes::SOME_SOURCES_FAILED);
    }

    Ok(exit_codes::SUCCESS)
}

/// Archive submissions in order, pausing briefly after each one that hit the network.
async fn archive_all(
    comments: &dyn CommentSource,
    downloader: &Downloader,
    options: &ArchiveOptions,
    parent: &Path,
    submissions: Vec<Submission>,
    stats: &mut RunStats,
) {
    let count = submissions.len();

    for (index, submission) in submissions.iter().enumerate() {
        match archive_submission(downloader, comments, submission, parent, index, options).await {
            Ok(report) => {
                stats.record(&report);

                if report.touched_network() && index + 1 < count {
                    let delay_ms = rand::thread_rng().gen_range(400..750);
                    sleep(Duration::from_millis(delay_ms)).await;
                }
            }
            Err(e) => {
                print_error(&format!("Failed to archive {}: {}", submission.id, e));
                stats.record_error();
            }
        }
    }
}

/// Explicit path, else `./config.toml`, else the platform configuration file.
fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Some(local);
    }

    Config::default_path().filter(|path| path.exists())
}

fn enabled_options(config: &Config) -> Vec<String> {
    let mut enabled = Vec::new();
    if config.options.skip_videos {
        enabled.push("skip videos".to_string());
    }
    if config.options.skip_meta {
        enabled.push("skip metadata".to_string());
    }
    if config.options.skip_comments {
        enabled.push("skip comments".to_string());
    }
    if let Some(limit) = config.options.comment_limit {
        enabled.push(format!("comment limit {}", limit));
    }
    if config.imgur_client_id().is_none() {
        enabled.push("no Imgur".to_string());
    }
    enabled
}
