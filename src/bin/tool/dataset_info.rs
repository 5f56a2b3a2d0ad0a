use std::path::Path;

use clap::ArgMatches;

use backprop_nn::dataloader::*;
use backprop_nn::settings::ModelSettings;

use crate::required_arg;

fn print_counts(title: &str, dl: &SimpleDataLoader, categories: &[String]) {
    println!("{} : {} examples", title, dl.len());

    for (category, count) in categories
        .iter()
        .zip(dl.label_counts(categories.len()))
    {
        println!("  {:>12} : {}", category, count);
    }
}

pub fn dataset_info(args: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let model_cfg = required_arg(args, "ModelCfg")?;
    let settings = ModelSettings::from_file(Path::new(model_cfg))?;

    println!(
        "Input : {}x{} ({} values), layers : {:?}",
        settings.width,
        settings.height,
        settings.input_size(),
        settings.layer_sizes()
    );

    print_counts("Train", &settings.train_loader()?, &settings.categories);
    print_counts("Test", &settings.test_loader(None)?, &settings.categories);

    Ok(())
}
