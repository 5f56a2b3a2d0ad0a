extern crate backprop_nn;

use clap::{Arg, ArgAction, ArgMatches, Command};

#[cfg(feature = "log_env_logger")]
use env_logger::Env;

#[cfg(feature = "log_log4rs")]
use log::LevelFilter;
#[cfg(feature = "log_log4rs")]
use log4rs::append::console::ConsoleAppender;
#[cfg(feature = "log_log4rs")]
use log4rs::append::file::FileAppender;
#[cfg(feature = "log_log4rs")]
use log4rs::config::{Appender, Config, Root};
#[cfg(feature = "log_log4rs")]
use log4rs::encode::pattern::PatternEncoder;

use backprop_nn::err::NetError;

pub mod dataset_info;
pub mod test;
pub mod train;

#[cfg(feature = "log_log4rs")]
fn init_logger() -> Result<(), Box<dyn std::error::Error>> {
    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::default()))
        .build("log.txt")?;

    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::default()))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .appender(Appender::builder().build("console", Box::new(console)))
        .build(
            Root::builder()
                .appender("console")
                .appender("logfile")
                .build(LevelFilter::Info),
        )?;

    log4rs::init_config(config)?;
    Ok(())
}

#[cfg(all(feature = "log_env_logger", not(feature = "log_log4rs")))]
fn init_logger() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    Ok(())
}

#[cfg(not(any(feature = "log_env_logger", feature = "log_log4rs")))]
fn init_logger() -> Result<(), Box<dyn std::error::Error>> {
    Ok(())
}

/// Value of an argument clap already marked as required
pub fn required_arg<'a>(args: &'a ArgMatches, id: &str) -> Result<&'a String, NetError> {
    args.get_one::<String>(id)
        .ok_or_else(|| NetError::config(id, "argument is required"))
}

fn model_cfg_arg() -> Arg<'static> {
    Arg::new("ModelCfg")
        .long("model_cfg")
        .help("Provide model configuration yaml file")
        .required(true)
        .takes_value(true)
        .require_equals(true)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger()?;

    let matches = Command::new("backprop-nn tool")
        .version("0.1.0")
        .about("Train feed-forward networks on small images, test them and inspect datasets")
        .subcommand_required(true)
        .subcommand(
            Command::new("train")
                .about("Start a new training or continue from a parameter folder")
                .arg(model_cfg_arg())
                .arg(
                    Arg::new("Params")
                        .short('p')
                        .long("params")
                        .help("Parameter folder to start from, relative to the model folder. Random weights otherwise")
                        .takes_value(true)
                        .require_equals(true),
                )
                .arg(
                    Arg::new("Epochs")
                        .long("epochs")
                        .help("Number of epochs, asks after every epoch when omitted")
                        .action(ArgAction::Set)
                        .value_parser(clap::value_parser!(usize))
                        .require_equals(true),
                )
                .arg(
                    Arg::new("Seed")
                        .long("seed")
                        .help("Seed for weights initialization and shuffling")
                        .action(ArgAction::Set)
                        .value_parser(clap::value_parser!(u64))
                        .require_equals(true),
                )
                .arg(
                    Arg::new("Shuffle")
                        .long("shuffle")
                        .help("Shuffle the train set before every epoch")
                        .action(ArgAction::Set)
                        .value_parser(clap::value_parser!(bool))
                        .require_equals(true)
                        .default_value("false"),
                )
                .arg(
                    Arg::new("StateOut")
                        .long("state_out")
                        .help("Also write a protobuf snapshot of the trained model")
                        .takes_value(true)
                        .require_equals(true),
                ),
        )
        .subcommand(
            Command::new("test")
                .about("Test net")
                .arg(model_cfg_arg())
                .arg(
                    Arg::new("Params")
                        .short('p')
                        .long("params")
                        .help("Parameter folder of the trained network, relative to the model folder")
                        .required(true)
                        .takes_value(true)
                        .require_equals(true),
                )
                .arg(
                    Arg::new("TestSize")
                        .long("test_size")
                        .help("Maximum number of test examples (per category for image folders)")
                        .action(ArgAction::Set)
                        .value_parser(clap::value_parser!(usize))
                        .require_equals(true),
                ),
        )
        .subcommand(
            Command::new("gen_init_state")
                .about("Generate initial parameters (random weights)")
                .arg(model_cfg_arg())
                .arg(
                    Arg::new("OutDir")
                        .long("out")
                        .takes_value(true)
                        .require_equals(true)
                        .default_value("init_params"),
                )
                .arg(
                    Arg::new("Seed")
                        .long("seed")
                        .action(ArgAction::Set)
                        .value_parser(clap::value_parser!(u64))
                        .require_equals(true),
                ),
        )
        .subcommand(
            Command::new("dataset_info")
                .about("Inspect the datasets of a model")
                .arg(model_cfg_arg()),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", args)) => train::train_net(args)?,
        Some(("test", args)) => test::test_net(args)?,
        Some(("gen_init_state", args)) => train::gen_init_state(args)?,
        Some(("dataset_info", args)) => dataset_info::dataset_info(args)?,
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}
