use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{error, info};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::dataloader::{DataLoader, TargetEncoding};
use crate::err::{NetError, NetResult};
use crate::models::Model;
use crate::util::{argmax_first, Float};

pub enum CallbackReturnAction {
    None,
    Stop,
}

/// Outcome of classifying a test set
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EvalReport {
    pub correct: usize,
    pub total: usize,
    /// Mean of `0.5 * sum(err^2)` over the test set
    pub loss: Float,
}

impl EvalReport {
    pub fn mistakes(&self) -> usize {
        self.total - self.correct
    }

    pub fn accuracy(&self) -> Float {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as Float / self.total as Float
    }

    /// Whole percent, rounded down
    pub fn success_percentage(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        100 * self.correct / self.total
    }
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Test cases : {}, success : {} ({}%), mistake : {} ({}%)",
            self.total,
            self.correct,
            self.success_percentage(),
            self.mistakes(),
            100 - self.success_percentage()
        )
    }
}

/// Neural-Network learning orchestrator, one example per step
pub struct Orchestra<T>
where
    T: Model,
{
    pub train_dl: Option<Box<dyn DataLoader>>,
    pub test_dl: Option<Box<dyn DataLoader>>,
    model: T,
    encoding: TargetEncoding,
    category_count: usize,
    shuffle: bool,
    rng: StdRng,
    epoch: usize,
    pub name: String,
    // callback fn args : (epoch number, test result after the epoch)
    callbacks: Vec<Box<dyn FnMut(usize, &EvalReport) -> CallbackReturnAction>>,
}

impl<T> Orchestra<T>
where
    T: Model,
{
    pub fn new(model: T, encoding: TargetEncoding) -> Self {
        let category_count = model.output_size();

        Orchestra {
            train_dl: None,
            test_dl: None,
            model,
            encoding,
            category_count,
            shuffle: false,
            rng: StdRng::seed_from_u64(0),
            epoch: 0,
            name: "network".to_owned(),
            callbacks: Vec::new(),
        }
    }

    pub fn train_dataloader(mut self, train_dl: Box<dyn DataLoader>) -> Self {
        self.train_dl = Some(train_dl);
        self
    }

    pub fn test_dataloader(mut self, test_dl: Box<dyn DataLoader>) -> Self {
        self.test_dl = Some(test_dl);
        self
    }

    /// Shuffles the train set before every epoch with a generator seeded by `seed`
    pub fn shuffle(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn set_train_dataset(&mut self, data: Box<dyn DataLoader>) {
        self.train_dl = Some(data)
    }

    pub fn set_test_dataset(&mut self, data: Box<dyn DataLoader>) {
        self.test_dl = Some(data)
    }

    pub fn add_callback(&mut self, c: Box<dyn FnMut(usize, &EvalReport) -> CallbackReturnAction>) {
        self.callbacks.push(c);
    }

    pub fn model(&self) -> &T {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut T {
        &mut self.model
    }

    pub fn into_model(self) -> T {
        self.model
    }

    /// Completed epochs
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// One pass over the train set, returns the mean loss of the steps
    pub fn train_epoch(&mut self) -> NetResult<Float> {
        let train_dl = match self.train_dl.as_mut() {
            Some(dl) if !dl.is_empty() => dl,
            _ => {
                error!("Train dataset isn't set !!!");
                return Err(NetError::Dataset("train dataset is empty or not set".to_owned()));
            }
        };

        if self.shuffle {
            train_dl.shuffle(&mut self.rng);
        }
        train_dl.reset();

        let bench_time = Instant::now();
        let mut loss_sum = 0.0;

        for _ in 0..train_dl.len() {
            let example = train_dl.next();
            let target = self.encoding.encode(example.label, self.category_count)?;
            loss_sum += self.model.train(example.pixels.view(), target.view())?;
        }

        self.epoch += 1;
        let loss = loss_sum / train_dl.len() as Float;

        info!(
            "Epoch {} : {} examples for {} ms, mean loss {:.6}",
            self.epoch,
            train_dl.len(),
            bench_time.elapsed().as_millis(),
            loss
        );

        Ok(loss)
    }

    /// Classifies every test example, the model is not modified
    pub fn test_net(&self) -> NetResult<EvalReport> {
        let test_dl = match self.test_dl.as_ref() {
            Some(dl) if !dl.is_empty() => dl,
            _ => {
                return Err(NetError::Dataset("test dataset is empty or not set".to_owned()));
            }
        };

        let mut report = EvalReport::default();
        let mut loss_sum = 0.0;

        for _ in 0..test_dl.len() {
            let example = test_dl.next();
            let out = self.model.feedforward(example.pixels.view())?;

            if argmax_first(out.view())? == example.label {
                report.correct += 1;
            }

            let target = self.encoding.encode(example.label, self.category_count)?;
            let err = &out - &target;
            loss_sum += 0.5 * err.dot(&err);

            report.total += 1;
        }

        report.loss = loss_sum / report.total as Float;

        info!("{}", report);

        Ok(report)
    }

    /// Trains `epochs` epochs testing after each one when a test set is present
    pub fn train_epochs(&mut self, epochs: usize) -> NetResult<Vec<EvalReport>> {
        let mut reports = Vec::with_capacity(epochs);

        for _ in 0..epochs {
            self.train_epoch()?;

            if self.test_dl.is_some() {
                reports.push(self.test_net()?);
            }
        }

        Ok(reports)
    }

    /// Trains epoch by epoch until a callback asks to stop or `max_epochs`
    /// is reached. Returns the last test report.
    pub fn train_until_stopped(&mut self, max_epochs: Option<usize>) -> NetResult<EvalReport> {
        let mut last_report = EvalReport::default();
        let mut trained = 0;

        loop {
            if max_epochs.map_or(false, |max| trained >= max) {
                info!("Reached max epoch");
                break;
            }

            self.train_epoch()?;
            trained += 1;

            last_report = self.test_net()?;

            let mut flag_stop = false;
            for it_cb in self.callbacks.iter_mut() {
                if let CallbackReturnAction::Stop = it_cb(self.epoch, &last_report) {
                    flag_stop = true;
                }
            }

            if flag_stop {
                info!("Stopping training loop after epoch {}", self.epoch);
                break;
            }
        }

        info!("Training of {} finished !", self.name);
        info!("Epochs : {}, {}", self.epoch, last_report);

        Ok(last_report)
    }

    /// Writes the parameters into `<base_dir>/parameters-<timestamp>` and
    /// returns that folder
    pub fn save_parameters_snapshot(&self, base_dir: &Path) -> NetResult<PathBuf> {
        let time = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S");
        let folder = base_dir.join(format!("parameters-{}", time));

        self.save_parameters_into(&folder)?;

        Ok(folder)
    }

    /// Creates `folder` and writes the parameters there. An existing folder
    /// is never reused, an earlier snapshot is not overwritten.
    pub fn save_parameters_into(&self, folder: &Path) -> NetResult<()> {
        if let Some(parent) = folder.parent() {
            fs::create_dir_all(parent).map_err(|e| NetError::param_io(parent, e))?;
        }
        fs::create_dir(folder).map_err(|e| {
            NetError::param_io(folder, format!("parameter folder creation error : {}", e))
        })?;

        info!("Saving {} parameters...", self.model.model_type());
        self.model.save_parameters(folder)
    }
}
