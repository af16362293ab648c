use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use rasp_stat::commands;

fn cli() -> Command {
    Command::new("rasp-stat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Samples Raspberry Pi clocks, temperature, voltage, throttling and memory and serves them over HTTP")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .env("PORT")
                .value_name("PORT")
                .help("Port the HTTP API listens on [default: 4322]")
                .value_parser(clap::value_parser!(u16))
                .global(true),
        )
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .env("RASP_STAT_INTERVAL")
                .value_name("SECONDS")
                .help("Pause between sampling rounds [default: 1]")
                .value_parser(clap::value_parser!(u64).range(1..))
                .global(true),
        )
        .arg(
            Arg::new("points")
                .short('n')
                .long("points")
                .env("RASP_STAT_POINTS")
                .value_name("COUNT")
                .help("Samples kept in memory per metric [default: 2]")
                .value_parser(clap::value_parser!(usize))
                .global(true),
        )
        .arg(
            Arg::new("command-timeout")
                .long("command-timeout")
                .env("RASP_STAT_COMMAND_TIMEOUT_MS")
                .value_name("MILLIS")
                .help("Kill a measurement command that runs longer than this [default: 2000]")
                .value_parser(clap::value_parser!(u64).range(1..))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("serve")
                .about("Sample in the background and serve the HTTP API (default)"),
        )
        .subcommand(
            Command::new("sample")
                .about("Sample every metric once and print the result as JSON"),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    rasp_stat::init_logging(level);

    match matches.subcommand() {
        Some(("sample", sub_matches)) => commands::sample::execute(sub_matches),
        Some(("version", _)) => commands::version::execute(),
        Some(("serve", sub_matches)) => commands::serve::execute(sub_matches),
        _ => commands::serve::execute(&matches),
    }
}
