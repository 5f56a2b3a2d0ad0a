use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::dataloader::{Example, SimpleDataLoader};
use crate::err::{NetError, NetResult};
use crate::util::{normalize_pixel, Float};

/// Decodes one image into normalized grayscale pixels, row by row
pub fn read_png_file(path: &Path, width: usize, height: usize) -> NetResult<Vec<Float>> {
    let img = image::open(path)
        .map_err(|e| NetError::Dataset(format!("{} : {}", path.display(), e)))?
        .to_luma8();

    let (w, h) = img.dimensions();
    if w as usize != width || h as usize != height {
        return Err(NetError::ShapeMismatch(format!(
            "{} is {}x{}, expected {}x{}",
            path.display(),
            w,
            h,
            width,
            height
        )));
    }

    Ok(img
        .into_raw()
        .into_iter()
        .map(|p| normalize_pixel(p as Float))
        .collect())
}

/// PNG files of one folder in name order
pub fn list_png_files(dir: &Path) -> NetResult<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).map_err(|e| NetError::Dataset(format!("{} : {}", dir.display(), e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_png = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false);

        if is_png {
            files.push(path);
        } else if path.is_file() {
            warn!("Skipping non-png file {}", path.display());
        }
    }

    files.sort();
    Ok(files)
}

impl SimpleDataLoader {
    /// Reads `<root>/<category>/*.png`, the label is the position of the category.
    /// `limit` caps the number of images taken from each category.
    pub fn from_image_dir(
        root: &Path,
        categories: &[String],
        width: usize,
        height: usize,
        limit: Option<usize>,
    ) -> NetResult<Self> {
        let mut data = Vec::new();

        for (label, category) in categories.iter().enumerate() {
            let files = list_png_files(&root.join(category))?;
            let take = limit.unwrap_or(files.len()).min(files.len());

            for file in files.iter().take(take) {
                data.push(Example::new(read_png_file(file, width, height)?, label));
            }

            info!("Category '{}' : {} images", category, take);
        }

        Ok(SimpleDataLoader::new(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataloader::DataLoader;
    use approx::assert_relative_eq;
    use image::GrayImage;

    fn write_png(path: &Path, w: u32, h: u32, val: u8) {
        GrayImage::from_raw(w, h, vec![val; (w * h) as usize])
            .unwrap()
            .save(path)
            .unwrap();
    }

    #[test]
    fn reads_category_folders() {
        let dir = tempfile::tempdir().unwrap();
        let categories = vec!["circle".to_owned(), "square".to_owned()];

        for (idx, c) in categories.iter().enumerate() {
            let cat_dir = dir.path().join(c);
            fs::create_dir_all(&cat_dir).unwrap();
            for n in 0..3 {
                write_png(&cat_dir.join(format!("{}.png", n)), 4, 2, 255 * idx as u8);
            }
        }
        fs::write(dir.path().join("circle").join("notes.txt"), "x").unwrap();

        let dl = SimpleDataLoader::from_image_dir(dir.path(), &categories, 4, 2, Some(2)).unwrap();

        assert_eq!(dl.len(), 4);
        assert_eq!(dl.label_counts(2), vec![2, 2]);
        assert_eq!(dl.data[0].pixels.len(), 8);
        assert_relative_eq!(dl.data[0].pixels[0], 0.0);
        assert_relative_eq!(dl.data[3].pixels[7], 1.0);
    }

    #[test]
    fn wrong_image_size_is_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        write_png(&path, 3, 3, 0);

        assert!(matches!(
            read_png_file(&path, 4, 4),
            Err(NetError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn missing_category_folder() {
        let dir = tempfile::tempdir().unwrap();
        let res = SimpleDataLoader::from_image_dir(dir.path(), &["none".to_owned()], 2, 2, None);

        assert!(matches!(res, Err(NetError::Dataset(_))));
    }
}
