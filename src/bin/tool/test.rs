use std::path::Path;

use log::info;

use rand::rngs::StdRng;
use rand::SeedableRng;

use clap::ArgMatches;

use backprop_nn::dataloader::*;
use backprop_nn::models::*;
use backprop_nn::orchestra::*;
use backprop_nn::settings::ModelSettings;

use crate::required_arg;

pub fn test_net(args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let model_cfg = required_arg(args, "ModelCfg")?;
    let params = required_arg(args, "Params")?;
    let settings = ModelSettings::from_file(Path::new(model_cfg))?;
    let activation = settings.activation()?;

    // parameters come from files, the generator stays unused
    let model = Sequential::build(
        &settings.layer_sizes(),
        activation,
        settings.learning_rate,
        &settings.param_source(Some(params.as_str())),
        &mut StdRng::seed_from_u64(0),
    )?;

    let test_dl = settings.test_loader(args.get_one::<usize>("TestSize").copied())?;
    info!("Test examples : {}", test_dl.len());

    let net = Orchestra::new(model, TargetEncoding::for_activation(activation))
        .test_dataloader(Box::new(test_dl));

    let report = net.test_net()?;

    println!("Test cases : {}", report.total);
    println!(
        "Success : {} ({}%)",
        report.correct,
        report.success_percentage()
    );
    println!(
        "Mistake : {} ({}%)",
        report.mistakes(),
        100 - report.success_percentage()
    );

    Ok(())
}
