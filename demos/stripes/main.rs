use std::error::Error;

#[cfg(feature = "log_env_logger")]
use env_logger::Env;
use log::info;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use backprop_nn::prelude::*;

const SIDE: usize = 28;
const CLASSES: usize = 10;

#[cfg(feature = "log_env_logger")]
fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

#[cfg(not(feature = "log_env_logger"))]
fn init_logger() {}

/// Horizontal band of rows for `label`, a little pixel noise on top
fn stripe_image(label: usize, rng: &mut StdRng) -> Vec<Float> {
    let band = SIDE / CLASSES;
    let mut pixels = vec![0.0; SIDE * SIDE];

    for row in label * band..(label + 1) * band {
        for col in 0..SIDE {
            pixels[row * SIDE + col] = 1.0;
        }
    }
    for p in pixels.iter_mut() {
        *p = (*p + rng.gen_range(-0.1..0.1) as Float).clamp(0.0, 1.0);
    }

    pixels
}

fn stripes(count: usize, rng: &mut StdRng) -> SimpleDataLoader {
    SimpleDataLoader::new(
        (0..count)
            .map(|i| Example::new(stripe_image(i % CLASSES, rng), i % CLASSES))
            .collect(),
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logger();

    let mut rng = StdRng::seed_from_u64(7);
    let activation = Activation::Sigmoid;

    let model = Sequential::build(
        &[SIDE * SIDE, 32, CLASSES],
        activation,
        0.1,
        &ParamSource::Random { range: 0.5 },
        &mut rng,
    )?;

    let train_dl = stripes(500, &mut rng);
    let test_dl = stripes(100, &mut rng);

    let mut net = Orchestra::new(model, TargetEncoding::for_activation(activation))
        .train_dataloader(Box::new(train_dl))
        .test_dataloader(Box::new(test_dl))
        .shuffle(11);

    net.add_callback(Box::new(|epoch: usize, report: &EvalReport| {
        info!("Epoch {} accuracy : {:.3}", epoch, report.accuracy());

        if report.success_percentage() >= 95 {
            CallbackReturnAction::Stop
        } else {
            CallbackReturnAction::None
        }
    }));

    let report = net.train_until_stopped(Some(20))?;
    println!("{}", report);

    let dir = std::env::temp_dir().join("stripes-demo");
    let folder = net.save_parameters_snapshot(&dir)?;
    println!("Parameters saved to {}", folder.display());

    Ok(())
}
