use std::cell::RefCell;
use std::path::Path;

use log::info;

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::dataloader::{DataLoader, Example};
use crate::err::{NetError, NetResult};
use crate::util::{normalize_pixel, Float};

/// In-memory examples served in order
pub struct SimpleDataLoader {
    pub id: RefCell<usize>,
    pub data: Vec<Example>,
}

impl DataLoader for SimpleDataLoader {
    fn next(&self) -> &Example {
        assert!(!self.data.is_empty(), "SimpleDataLoader has no examples");

        let mut self_id = self.id.borrow_mut();

        if *self_id >= self.data.len() {
            *self_id = 0;
        }

        let ret = &self.data[*self_id];
        *self_id += 1;
        ret
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn reset(&mut self) {
        *self.id.borrow_mut() = 0;
    }

    fn pos(&self) -> Option<usize> {
        Some(*self.id.borrow())
    }

    fn shuffle(&mut self, rng: &mut dyn RngCore) {
        self.data.shuffle(rng);
        self.reset();
    }
}

impl SimpleDataLoader {
    pub fn new(data: Vec<Example>) -> Self {
        Self {
            id: RefCell::new(0),
            data,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Keeps at most `count` examples
    pub fn truncate(&mut self, count: usize) {
        self.data.truncate(count);
        self.reset();
    }

    /// Number of examples per label, indexed by label
    pub fn label_counts(&self, category_count: usize) -> Vec<usize> {
        let mut counts = vec![0; category_count];
        for ex in self.data.iter() {
            if let Some(c) = counts.get_mut(ex.label) {
                *c += 1;
            }
        }
        counts
    }

    /// Reads headerless MNIST style rows: `label,p0,p1,...` with 8-bit pixels
    pub fn from_csv_files<P: AsRef<Path>>(
        filepaths: &[P],
        input_size: usize,
        category_count: usize,
    ) -> NetResult<Self> {
        let mut data = Vec::new();

        for filepath in filepaths {
            let filepath = filepath.as_ref();
            let before = data.len();

            read_csv_file(filepath, input_size, category_count, &mut data)?;

            info!(
                "Read {} examples from {}",
                data.len() - before,
                filepath.display()
            );
        }

        Ok(SimpleDataLoader::new(data))
    }
}

fn read_csv_file(
    filepath: &Path,
    input_size: usize,
    category_count: usize,
    data: &mut Vec<Example>,
) -> NetResult<()> {
    let dataset_err = |line: u64, msg: String| {
        NetError::Dataset(format!("{}:{} : {}", filepath.display(), line, msg))
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(filepath)
        .map_err(|e| NetError::Dataset(format!("{} : {}", filepath.display(), e)))?;

    for (row_idx, row) in rdr.records().enumerate() {
        let line = row_idx as u64 + 1;
        let row = row.map_err(|e| dataset_err(line, e.to_string()))?;

        if row.len() != input_size + 1 {
            return Err(NetError::ShapeMismatch(format!(
                "{}:{} has {} pixels, expected {}",
                filepath.display(),
                line,
                row.len().saturating_sub(1),
                input_size
            )));
        }

        let label: usize = row[0]
            .parse()
            .map_err(|e| dataset_err(line, format!("label `{}` : {}", &row[0], e)))?;

        if label >= category_count {
            return Err(dataset_err(
                line,
                format!("label {} is out of range for {} categories", label, category_count),
            ));
        }

        let mut pixels = Vec::with_capacity(input_size);
        for val in row.iter().skip(1) {
            let val: Float = val
                .parse()
                .map_err(|e| dataset_err(line, format!("pixel `{}` : {}", val, e)))?;
            pixels.push(normalize_pixel(val));
        }

        data.push(Example::new(pixels, label));
    }

    Ok(())
}
