extern crate nevermind_seg;

use clap::{Arg, ArgAction, ArgMatches, Command};

use log::LevelFilter;

pub mod dataset_info;
pub mod gen_cfg;

use nevermind_seg::config::ProviderConfig;
use nevermind_seg::err::ProviderError;

#[cfg(feature = "log_log4rs")]
fn init_logger() {
    use log4rs::append::console::ConsoleAppender;
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::default()))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .build(Root::builder().appender("console").build(LevelFilter::Info));

    match config {
        Ok(config) => {
            if log4rs::init_config(config).is_err() {
                panic!("Couldn't initialize logger !!!");
            }
        }
        Err(_) => panic!("Couldn't initialize logger !!!"),
    }
}

#[cfg(all(feature = "log_env_logger", not(feature = "log_log4rs")))]
fn init_logger() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
}

#[cfg(not(any(feature = "log_env_logger", feature = "log_log4rs")))]
fn init_logger() {}

fn provider_args(cmd: Command<'static>) -> Command<'static> {
    cmd.arg(
        Arg::new("SearchPath")
            .long("search_path")
            .help("Glob pattern locating data and mask images, e.g. train/*.tif")
            .action(ArgAction::Set)
            .require_equals(true)
    )
    .arg(
        Arg::new("Config")
            .long("config")
            .short('c')
            .help("Provider configuration file (yaml or json). Command line values take precedence")
            .action(ArgAction::Set)
            .require_equals(true)
    )
    .arg(
        Arg::new("DataSuffix")
            .long("data_suffix")
            .help("Suffix of the data images. Default '.tif'")
            .action(ArgAction::Set)
            .require_equals(true)
    )
    .arg(
        Arg::new("MaskSuffix")
            .long("mask_suffix")
            .help("Suffix of the mask images. Default '_mask.tif'")
            .action(ArgAction::Set)
            .require_equals(true)
    )
    .arg(
        Arg::new("Shuffle")
            .long("shuffle")
            .help("Randomize file order on every pass. Default true")
            .action(ArgAction::Set)
            .value_parser(clap::value_parser!(bool))
            .require_equals(true)
    )
    .arg(
        Arg::new("Seed")
            .long("seed")
            .help("Seed for a reproducible shuffle")
            .action(ArgAction::Set)
            .value_parser(clap::value_parser!(u64))
            .require_equals(true)
    )
    .arg(
        Arg::new("AMin")
            .long("a_min")
            .help("Min value used for clipping")
            .action(ArgAction::Set)
            .value_parser(clap::value_parser!(f32))
            .require_equals(true)
    )
    .arg(
        Arg::new("AMax")
            .long("a_max")
            .help("Max value used for clipping")
            .action(ArgAction::Set)
            .value_parser(clap::value_parser!(f32))
            .require_equals(true)
    )
}

/// Config file (if any) overridden by command line values
pub fn provider_cfg(args: &ArgMatches) -> Result<ProviderConfig, ProviderError> {
    let mut cfg = match args.get_one::<String>("Config") {
        Some(filepath) => ProviderConfig::from_file(filepath)?,
        None => ProviderConfig::default(),
    };

    if let Some(search_path) = args.get_one::<String>("SearchPath") {
        cfg.search_path = search_path.clone();
    }
    if let Some(suffix) = args.get_one::<String>("DataSuffix") {
        cfg.data_suffix = suffix.clone();
    }
    if let Some(suffix) = args.get_one::<String>("MaskSuffix") {
        cfg.mask_suffix = suffix.clone();
    }
    if let Some(shuffle) = args.get_one::<bool>("Shuffle") {
        cfg.shuffle_data = *shuffle;
    }
    if let Some(seed) = args.get_one::<u64>("Seed") {
        cfg.seed = Some(*seed);
    }
    if let Some(a_min) = args.get_one::<f32>("AMin") {
        cfg.a_min = Some(*a_min);
    }
    if let Some(a_max) = args.get_one::<f32>("AMax") {
        cfg.a_max = Some(*a_max);
    }

    Ok(cfg)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();

    let matches = Command::new("nevermind-seg tool")
        .version("0.1.0")
        .author("Regular-dev")
        .about("Inspect segmentation datasets of paired image/mask files")
        .subcommand_required(true)
        .subcommand(
            provider_args(Command::new("dataset_info").about("Inspect dataset")).arg(
                Arg::new("ShowN")
                    .long("show_n")
                    .help("Number of image/mask pairs to load and describe")
                    .action(ArgAction::Set)
                    .value_parser(clap::value_parser!(usize))
                    .require_equals(true)
                    .default_value("0")
            ),
        )
        .subcommand(
            provider_args(Command::new("gen_cfg").about("Write a provider configuration file")).arg(
                Arg::new("OutFile")
                    .long("out")
                    .short('o')
                    .help("Specifies configuration output file, '.json' writes json")
                    .action(ArgAction::Set)
                    .require_equals(true)
                    .default_value("provider.yaml")
            ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("dataset_info", args)) => dataset_info::dataset_info(args)?,
        Some(("gen_cfg", args)) => gen_cfg::gen_cfg(args)?,
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}
