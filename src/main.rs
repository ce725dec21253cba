// src/main.rs

use clap::ArgMatches;
use colored::*;
use env_logger::Builder;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc;
use tokio::runtime::Runtime;
use ytloader::cookies::{self, Browser, CookieSource};
use ytloader::options::{AudioCodec, Container, Quality};
use ytloader::settings::Settings;
use ytloader::{cli, command, options, orchestrator, process, urls};
use ytloader::{AppError, DownloadEvent, DownloadMode, VERSION};

fn init_logger() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Warn)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    init_logger();
    info!("ytloader starting up - version {}", VERSION);

    let matches = cli::build_cli().get_matches();
    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("ytloader.json"));

    let result = match matches.subcommand() {
        Some(("download", sub)) => run_download(sub, &config_path),
        Some(("formats", sub)) => run_formats(sub, &config_path),
        Some(("check-cookies", sub)) => run_check_cookies(sub),
        Some(("test-cookies", sub)) => run_test_cookies(sub, &config_path),
        Some(("settings", sub)) => run_settings(sub, &config_path),
        _ => unreachable!("subcommand is required"),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Overlay command-line arguments on the persisted settings and pick the
/// download mode from which flags are present.
fn build_options(
    sub: &ArgMatches,
    settings: &Settings,
) -> Result<(ytloader::DownloadOptions, DownloadMode), AppError> {
    let mut opts = settings.to_options();

    if let Some(quality) = sub.get_one::<String>("quality") {
        opts.quality = quality
            .parse::<Quality>()
            .map_err(AppError::Validation)?;
    }
    if let Some(container) = sub.get_one::<String>("container") {
        opts.container = container
            .parse::<Container>()
            .map_err(AppError::Validation)?;
    }
    if let Some(codec) = sub.get_one::<String>("audio-codec") {
        opts.audio_codec = codec
            .parse::<AudioCodec>()
            .map_err(AppError::Validation)?;
    }
    if let Some(spec) = sub.get_one::<String>("custom-format") {
        opts.quality = Quality::Custom;
        opts.custom_format = Some(spec.clone());
    }
    if let Some(dir) = sub.get_one::<String>("output-dir") {
        opts.download_dir = PathBuf::from(dir);
    }
    if let Some(template) = sub.get_one::<String>("template") {
        opts.output_template = Some(template.clone());
    }
    if let Some(archive) = sub.get_one::<String>("archive") {
        opts.download_archive = Some(PathBuf::from(archive));
    }
    opts.start_index = sub.get_one::<usize>("start").copied();
    opts.count = sub.get_one::<usize>("count").copied();
    opts.date_after = sub.get_one::<String>("date-after").cloned();

    if let Some(source) = cookie_source_from_args(sub)? {
        opts.cookies = source;
    }

    let mode = if opts.start_index.is_some() || opts.count.is_some() {
        DownloadMode::ByRange
    } else if opts.date_after.is_some() {
        DownloadMode::ByDate
    } else {
        DownloadMode::Single
    };

    Ok((opts, mode))
}

fn cookie_source_from_args(sub: &ArgMatches) -> Result<Option<CookieSource>, AppError> {
    if let Some(file) = sub.get_one::<String>("cookie-file") {
        return Ok(Some(CookieSource::File(PathBuf::from(file))));
    }
    if let Some(name) = sub.get_one::<String>("browser") {
        let browser = Browser::from_name(name)
            .ok_or_else(|| AppError::Validation(format!("unknown browser: {}", name)))?;
        return Ok(Some(CookieSource::Browser(browser)));
    }
    Ok(None)
}

fn run_download(sub: &ArgMatches, config_path: &Path) -> Result<(), AppError> {
    let settings = Settings::load(config_path);
    let url = sub.get_one::<String>("url").cloned().unwrap_or_default();
    let (opts, mode) = build_options(sub, &settings)?;

    let errors = options::validate(&opts);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{} {}", "✗".red(), error.red());
        }
        return Err(AppError::Validation(
            "the download options are not usable".to_string(),
        ));
    }

    println!("{}", format!("ytloader {} - downloading {}", VERSION, url).bright_cyan());

    let (tx, rx) = mpsc::channel::<DownloadEvent>();
    let handle = ytloader::start_download(&url, mode, opts, tx)?;

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut failure: Option<String> = None;
    for event in rx {
        match event {
            DownloadEvent::Log(line) => bar.println(line),
            DownloadEvent::Percent(percent) => bar.set_position(percent.round() as u64),
            DownloadEvent::Rate(rate) => bar.set_message(rate),
            DownloadEvent::Eta(eta) => {
                let rate = bar.message();
                bar.set_message(if rate.is_empty() {
                    format!("ETA {}", eta)
                } else {
                    format!("{} ETA {}", rate, eta)
                });
            }
            DownloadEvent::Completed => {
                bar.finish_and_clear();
                break;
            }
            DownloadEvent::Failed(message) => {
                bar.finish_and_clear();
                failure = Some(message);
                break;
            }
        }
    }
    handle.join();

    match failure {
        None => {
            println!("{}", "Done.".green().bold());
            Ok(())
        }
        Some(message) => Err(AppError::General(message)),
    }
}

fn run_formats(sub: &ArgMatches, config_path: &Path) -> Result<(), AppError> {
    let settings = Settings::load(config_path);
    let opts = settings.to_options();
    let url = urls::normalize_url(sub.get_one::<String>("url").map(String::as_str).unwrap_or(""));

    let argv = command::format_list_command(&opts.tool, &url, &opts.cookies)?;
    let runtime = Runtime::new()?;
    let output = runtime.block_on(process::run_to_completion(&argv, true))?;

    let info = orchestrator::scrape_video_info(&output.stdout, &url);
    println!("{} {}", "Title:".bold(), info.title);
    println!("{}", "Available format ids:".bold());
    for id in &info.format_ids {
        println!("  {}", id);
    }
    Ok(())
}

fn run_check_cookies(sub: &ArgMatches) -> Result<(), AppError> {
    let path = PathBuf::from(sub.get_one::<String>("file").map(String::as_str).unwrap_or(""));
    let report = cookies::validate_cookie_file(&path);

    println!("{} {}", "Cookie file:".bold(), path.display());
    println!("  total cookies:     {}", report.total_cookies);
    println!("  youtube cookies:   {}", report.youtube_cookies);
    println!("  login cookies:     {}", report.important_cookies.join(", "));
    println!("  expired cookies:   {}", report.expired_cookies);

    for issue in &report.issues {
        println!("{} {}", "!".yellow(), issue.yellow());
    }

    if report.is_valid {
        println!("{}", "The cookie file looks usable.".green());
        Ok(())
    } else {
        for suggestion in cookies::suggest_fixes(&report) {
            println!("{} {}", "→".cyan(), suggestion);
        }
        Err(AppError::Validation(
            "the cookie file is not usable".to_string(),
        ))
    }
}

fn run_test_cookies(sub: &ArgMatches, config_path: &Path) -> Result<(), AppError> {
    let settings = Settings::load(config_path);
    let mut opts = settings.to_options();
    if let Some(source) = cookie_source_from_args(sub)? {
        opts.cookies = source;
    }

    let argv = command::cookie_test_command(&opts.tool, &opts.cookies)?;
    println!("{}", "Probing YouTube access...".blue());

    let runtime = Runtime::new()?;
    let output = runtime.block_on(process::run_to_completion(&argv, false))?;

    if output.exit_code == 0 {
        println!("{}", "Cookies grant access to YouTube.".green().bold());
        Ok(())
    } else {
        eprintln!("{}", output.stderr.trim());
        Err(AppError::Configuration(
            "the cookie source did not grant access".to_string(),
        ))
    }
}

fn run_settings(sub: &ArgMatches, config_path: &Path) -> Result<(), AppError> {
    if sub.get_flag("init") {
        let settings = Settings::default();
        settings.save(config_path)?;
        println!("Wrote default settings to {}", config_path.display());
        return Ok(());
    }

    let settings = Settings::load(config_path);
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
