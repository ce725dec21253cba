// src/cli.rs

use clap::{Arg, ArgAction, Command};

/// Build the command-line interface for the application
pub fn build_cli() -> Command {
    Command::new("ytloader")
        .version(crate::VERSION)
        .about("yt-dlp front-end for single, date-filtered and range playlist downloads")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Path to the settings file")
                .value_name("FILE")
                .default_value("ytloader.json"),
        )
        .subcommand(
            Command::new("download")
                .about("Download a video, or part of a playlist")
                .arg(
                    Arg::new("url")
                        .help("Video or playlist URL (a bare 11-character video id also works)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("quality")
                        .long("quality")
                        .short('q')
                        .help("Target quality")
                        .value_parser([
                            "best", "8K", "4K", "1440p", "1080p", "720p", "480p", "360p", "240p",
                            "custom",
                        ]),
                )
                .arg(
                    Arg::new("container")
                        .long("container")
                        .short('c')
                        .help("Container/codec preference")
                        .value_parser(["auto", "mp4-h264", "webm-vp9", "mp4-av1", "audio-only"]),
                )
                .arg(
                    Arg::new("audio-codec")
                        .long("audio-codec")
                        .help("Audio codec preference")
                        .value_parser(["best", "opus", "aac"]),
                )
                .arg(
                    Arg::new("custom-format")
                        .long("custom-format")
                        .short('f')
                        .help("Raw yt-dlp format selector (implies --quality custom)")
                        .value_name("SPEC"),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .short('o')
                        .help("Destination directory")
                        .value_name("DIRECTORY"),
                )
                .arg(
                    Arg::new("template")
                        .long("template")
                        .help("Output filename template, e.g. %(title)s.%(ext)s")
                        .value_name("TEMPLATE"),
                )
                .arg(
                    Arg::new("archive")
                        .long("archive")
                        .help("Download-archive file; already-listed videos are skipped")
                        .value_name("FILE"),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .help("0-based playlist index to start from (range mode)")
                        .value_name("INDEX")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("count")
                        .long("count")
                        .help("Number of playlist videos to download (range mode)")
                        .value_name("COUNT")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("date-after")
                        .long("date-after")
                        .help("Only download videos uploaded on or after this date (YYYYMMDD)")
                        .value_name("DATE"),
                )
                .arg(
                    Arg::new("browser")
                        .long("browser")
                        .help("Browser to read cookies from")
                        .value_parser(["firefox", "chrome", "edge"]),
                )
                .arg(
                    Arg::new("cookie-file")
                        .long("cookie-file")
                        .help("Netscape cookie file to use instead of a browser")
                        .value_name("FILE"),
                ),
        )
        .subcommand(
            Command::new("formats")
                .about("List the formats available for a video")
                .arg(
                    Arg::new("url")
                        .help("Video URL")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("check-cookies")
                .about("Validate an exported Netscape cookie file")
                .arg(
                    Arg::new("file")
                        .help("Path to the cookie file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("test-cookies")
                .about("Probe YouTube access with the configured cookie source")
                .arg(
                    Arg::new("browser")
                        .long("browser")
                        .help("Browser to read cookies from")
                        .value_parser(["firefox", "chrome", "edge"]),
                )
                .arg(
                    Arg::new("cookie-file")
                        .long("cookie-file")
                        .help("Netscape cookie file to use instead of a browser")
                        .value_name("FILE"),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Show the effective settings, writing the file if missing")
                .arg(
                    Arg::new("init")
                        .long("init")
                        .help("Write the default settings file and exit")
                        .action(ArgAction::SetTrue),
                ),
        )
}
