use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

use log::{info, warn};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use clap::ArgMatches;

use backprop_nn::dataloader::*;
use backprop_nn::layer_fabric::ParamSource;
use backprop_nn::models::*;
use backprop_nn::orchestra::*;
use backprop_nn::settings::ModelSettings;

use crate::required_arg;

fn seeded_rng(args: &ArgMatches) -> StdRng {
    match args.get_one::<u64>("Seed") {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_entropy(),
    }
}

/// Reads Y/N from stdin, anything but Y stops
fn ask_next_epoch() -> CallbackReturnAction {
    print!("Continue training with the next epoch? (Y/N) ");
    if let Err(e) = io::stdout().flush() {
        warn!("Couldn't flush stdout : {}", e);
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) if answer.trim().eq_ignore_ascii_case("y") => CallbackReturnAction::None,
        Ok(_) => CallbackReturnAction::Stop,
        Err(e) => {
            warn!("Couldn't read the answer : {}", e);
            CallbackReturnAction::Stop
        }
    }
}

/// Starts train a network with required model configuration
pub fn train_net(args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let model_cfg = required_arg(args, "ModelCfg")?;
    let settings = ModelSettings::from_file(Path::new(model_cfg))?;
    let activation = settings.activation()?;

    let mut rng = seeded_rng(args);

    let source = settings.param_source(args.get_one::<String>("Params").map(String::as_str));
    if let ParamSource::Folder(dir) = &source {
        info!("Starting from parameters : {}", dir.display());
    }

    let model = Sequential::build(
        &settings.layer_sizes(),
        activation,
        settings.learning_rate,
        &source,
        &mut rng,
    )?;

    let train_dl = settings.train_loader()?;
    let test_dl = settings.test_loader(None)?;
    info!(
        "Train examples : {}, test examples : {}",
        train_dl.len(),
        test_dl.len()
    );

    let mut net = Orchestra::new(model, TargetEncoding::for_activation(activation))
        .train_dataloader(Box::new(train_dl))
        .test_dataloader(Box::new(test_dl));

    if args.get_one::<bool>("Shuffle").copied().unwrap_or(false) {
        net = net.shuffle(rng.gen());
    }

    let before = net.test_net()?;
    println!("Before training : {}", before);

    let now_time = Instant::now();

    let last = match args.get_one::<usize>("Epochs") {
        Some(epochs) => {
            info!("Start train for {} epochs", epochs);
            net.train_epochs(*epochs)?.pop().unwrap_or(before)
        }
        None => {
            net.add_callback(Box::new(|_epoch: usize, _report: &EvalReport| ask_next_epoch()));
            net.train_until_stopped(None)?
        }
    };

    info!("Elapsed for training : {} ms", now_time.elapsed().as_millis());
    println!("After {} epochs : {}", net.epoch(), last);

    let folder = net.save_parameters_snapshot(&settings.base_dir)?;
    println!("Parameters saved to {}", folder.display());

    if let Some(state_out) = args.get_one::<String>("StateOut") {
        net.model().save_state(Path::new(state_out))?;
        info!("Saved model state to {}", state_out);
    }

    Ok(())
}

pub fn gen_init_state(args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let model_cfg = required_arg(args, "ModelCfg")?;
    let out_dir = required_arg(args, "OutDir")?;
    let settings = ModelSettings::from_file(Path::new(model_cfg))?;

    let model = Sequential::build(
        &settings.layer_sizes(),
        settings.activation()?,
        settings.learning_rate,
        &ParamSource::Random {
            range: settings.init_range,
        },
        &mut seeded_rng(args),
    )?;
    model.save_parameters(Path::new(out_dir))?;

    info!(
        "Saved initial parameters for model {} to folder {}",
        model_cfg, out_dir
    );

    Ok(())
}
