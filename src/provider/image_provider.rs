use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};

use ndarray::ArrayD;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use crate::err::{ProviderError, Result};
use crate::provider::{find_data_files, mask_path_for, DataProvider, FileImageDecoder, ImageDecoder};
use crate::util::*;

pub const DEFAULT_DATA_SUFFIX: &str = ".tif";
pub const DEFAULT_MASK_SUFFIX: &str = "_mask.tif";

/// Generic provider for gray scale and colored images with their masks.
///
/// Data and mask images live side by side and differ only by suffix,
/// e.g. `train/fish_1.tif` and `train/fish_1_mask.tif`. The mask path of
/// every sample is derived from its data path by replacing `data_suffix`
/// with `mask_suffix`, nothing checks that the two belong together.
///
/// ```no_run
/// use nevermind_seg::prelude::*;
///
/// let mut provider = ImageDataProvider::new("fishes/train/*.tif")?;
/// let (img, mask) = provider.next_data()?;
/// # Ok::<(), nevermind_seg::err::ProviderError>(())
/// ```
pub struct ImageDataProvider {
    data_files: Vec<PathBuf>,
    data_suffix: String,
    mask_suffix: String,
    shuffle_data: bool,
    // None until the first pair was requested
    file_idx: Option<usize>,
    clip: ClipRange,
    channels: usize,
    n_class: usize,
    decoder: Box<dyn ImageDecoder>,
    rng: Box<dyn RngCore>,
}

pub struct ImageDataProviderBuilder {
    search_path: String,
    a_min: Option<Float>,
    a_max: Option<Float>,
    data_suffix: String,
    mask_suffix: String,
    shuffle_data: bool,
    rng: Option<Box<dyn RngCore>>,
    decoder: Option<Box<dyn ImageDecoder>>,
}

impl ImageDataProviderBuilder {
    pub fn new(search_path: &str) -> Self {
        Self {
            search_path: search_path.to_string(),
            a_min: None,
            a_max: None,
            data_suffix: DEFAULT_DATA_SUFFIX.to_string(),
            mask_suffix: DEFAULT_MASK_SUFFIX.to_string(),
            shuffle_data: true,
            rng: None,
            decoder: None,
        }
    }

    pub fn clip(mut self, a_min: Option<Float>, a_max: Option<Float>) -> Self {
        self.a_min = a_min;
        self.a_max = a_max;
        self
    }

    pub fn data_suffix(mut self, suffix: &str) -> Self {
        self.data_suffix = suffix.to_string();
        self
    }

    pub fn mask_suffix(mut self, suffix: &str) -> Self {
        self.mask_suffix = suffix.to_string();
        self
    }

    pub fn shuffle(mut self, shuffle_data: bool) -> Self {
        self.shuffle_data = shuffle_data;
        self
    }

    /// Random source for the shuffles, entropy seeded `StdRng` if not set
    pub fn rng<R: RngCore + 'static>(mut self, rng: R) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn seed(self, seed: u64) -> Self {
        self.rng(StdRng::seed_from_u64(seed))
    }

    pub fn decoder<D: ImageDecoder + 'static>(mut self, decoder: D) -> Self {
        self.decoder = Some(Box::new(decoder));
        self
    }

    pub fn build(self) -> Result<ImageDataProvider> {
        let clip = ClipRange::new(self.a_min, self.a_max)?;

        let mut rng = self
            .rng
            .unwrap_or_else(|| Box::new(StdRng::from_entropy()));
        let decoder = self
            .decoder
            .unwrap_or_else(|| Box::new(FileImageDecoder));

        let mut data_files = find_data_files(&self.search_path, &self.data_suffix, &self.mask_suffix)?;

        if self.shuffle_data {
            data_files.shuffle(&mut *rng);
        }

        if data_files.is_empty() {
            return Err(ProviderError::NoTrainingFiles {
                pattern: self.search_path,
            });
        }

        info!("Number of files used: {}", data_files.len());

        // Sample layout is taken from the first pair only
        let image_path = &data_files[0];
        let mask_path = mask_path_for(image_path, &self.data_suffix, &self.mask_suffix);

        let img = decoder.decode(image_path)?;
        let mask = decoder.decode(&mask_path)?;

        let channels = trailing_dim(&img, 1);
        let n_class = trailing_dim(&mask, 2);

        info!("Number of channels: {}", channels);
        info!("Number of classes: {}", n_class);

        Ok(ImageDataProvider {
            data_files,
            data_suffix: self.data_suffix,
            mask_suffix: self.mask_suffix,
            shuffle_data: self.shuffle_data,
            file_idx: None,
            clip,
            channels,
            n_class,
            decoder,
            rng,
        })
    }
}

/// `default` for a 2-D array, otherwise the size of the last axis
fn trailing_dim(arr: &RawImage, default: usize) -> usize {
    if arr.ndim() == 2 {
        return default;
    }

    arr.shape().last().copied().unwrap_or(default)
}

impl ImageDataProvider {
    pub fn builder(search_path: &str) -> ImageDataProviderBuilder {
        ImageDataProviderBuilder::new(search_path)
    }

    /// Provider with default suffixes, no clipping and shuffling enabled
    pub fn new(search_path: &str) -> Result<Self> {
        Self::builder(search_path).build()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn n_class(&self) -> usize {
        self.n_class
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.data_files
    }

    /// Data file of the last returned pair
    pub fn current_file(&self) -> Option<&Path> {
        self.file_idx.map(|idx| self.data_files[idx].as_path())
    }

    pub fn data_suffix(&self) -> &str {
        &self.data_suffix
    }

    pub fn mask_suffix(&self) -> &str {
        &self.mask_suffix
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffle_data
    }

    pub fn mask_path(&self, data_path: &Path) -> PathBuf {
        mask_path_for(data_path, &self.data_suffix, &self.mask_suffix)
    }

    /// Moves the cursor one file forward, wrapping to the start (and reshuffling) after the last one
    fn cycle_file(&mut self) -> usize {
        let next = self.file_idx.map_or(0, |idx| idx + 1);

        if next >= self.data_files.len() {
            if self.shuffle_data {
                self.data_files.shuffle(&mut *self.rng);
                debug!("Pass over {} files finished, reshuffled", self.data_files.len());
            }

            self.file_idx = Some(0);
            return 0;
        }

        self.file_idx = Some(next);
        next
    }
}

impl DataProvider for ImageDataProvider {
    fn clip_range(&self) -> &ClipRange {
        &self.clip
    }

    fn load_file<T: Element>(&self, path: &Path) -> Result<ArrayD<T>> {
        let raw = self.decoder.decode(path)?;
        Ok(cast_image::<T>(&raw))
    }

    fn next_data(&mut self) -> Result<(ImageArray, MaskArray)> {
        let idx = self.cycle_file();

        let image_path = self.data_files[idx].clone();
        let mask_path = self.mask_path(&image_path);

        let img = self.load_file::<Float>(&image_path)?;
        let mask = self.load_file::<bool>(&mask_path)?;

        Ok((img, mask))
    }

    fn reset(&mut self) {
        self.file_idx = None;
    }

    fn len(&self) -> Option< usize > {
        Some(self.data_files.len())
    }

    fn pos(&self) -> Option< usize > {
        self.file_idx
    }
}

/// Endless: wraps around the file list forever
impl Iterator for ImageDataProvider {
    type Item = Result<(ImageArray, MaskArray)>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_data())
    }
}

impl WithParams for ImageDataProvider {
    fn cfg(&self) -> HashMap<String, Variant> {
        let mut cfg = HashMap::new();

        cfg.insert("data_suffix".to_string(), Variant::String(self.data_suffix.clone()));
        cfg.insert("mask_suffix".to_string(), Variant::String(self.mask_suffix.clone()));
        cfg.insert("shuffle_data".to_string(), Variant::Bool(self.shuffle_data));
        cfg.insert("files".to_string(), Variant::Int(self.data_files.len() as i32));
        cfg.insert("channels".to_string(), Variant::Int(self.channels as i32));
        cfg.insert("n_class".to_string(), Variant::Int(self.n_class as i32));

        if let Some(a_min) = self.clip.a_min {
            cfg.insert("a_min".to_string(), Variant::Float(a_min));
        }
        if let Some(a_max) = self.clip.a_max {
            cfg.insert("a_max".to_string(), Variant::Float(a_max));
        }

        cfg
    }
}

impl fmt::Debug for ImageDataProvider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ImageDataProvider")
            .field("files", &self.data_files.len())
            .field("data_suffix", &self.data_suffix)
            .field("mask_suffix", &self.mask_suffix)
            .field("shuffle_data", &self.shuffle_data)
            .field("file_idx", &self.file_idx)
            .field("channels", &self.channels)
            .field("n_class", &self.n_class)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::fs::File;
    use std::rc::Rc;

    use ndarray::IxDyn;
    use tempfile::TempDir;

    /// Serves fixed shapes without touching pixel data, logs every decoded path
    struct StubDecoder {
        image_shape: Vec<usize>,
        mask_shape: Vec<usize>,
        decoded: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl StubDecoder {
        fn new(image_shape: &[usize], mask_shape: &[usize]) -> Self {
            Self {
                image_shape: image_shape.to_vec(),
                mask_shape: mask_shape.to_vec(),
                decoded: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    impl ImageDecoder for StubDecoder {
        fn decode(&self, path: &Path) -> Result<RawImage> {
            if !path.exists() {
                return FileImageDecoder.decode(path);
            }

            self.decoded.borrow_mut().push(path.to_path_buf());

            let shape = if path.to_string_lossy().contains(DEFAULT_MASK_SUFFIX) {
                &self.mask_shape
            } else {
                &self.image_shape
            };

            Ok(RawImage::from_elem(IxDyn(shape), 1.0))
        }
    }

    fn dataset(names: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();

        for name in names {
            File::create(dir.path().join(format!("{}.tif", name))).unwrap();
            File::create(dir.path().join(format!("{}_mask.tif", name))).unwrap();
        }

        dir
    }

    fn pattern(dir: &TempDir) -> String {
        format!("{}/*.tif", dir.path().display())
    }

    fn provider(dir: &TempDir, shuffle: bool) -> ImageDataProvider {
        ImageDataProvider::builder(&pattern(dir))
            .shuffle(shuffle)
            .seed(7)
            .decoder(StubDecoder::new(&[4, 4], &[4, 4]))
            .build()
            .unwrap()
    }

    fn next_file(provider: &mut ImageDataProvider) -> PathBuf {
        provider.next_data().unwrap();
        provider.current_file().unwrap().to_path_buf()
    }

    #[test]
    fn empty_manifest_fails() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("only_mask.tif_mask.tif")).unwrap();

        let res = ImageDataProvider::builder(&pattern(&dir))
            .decoder(StubDecoder::new(&[4, 4], &[4, 4]))
            .build();

        assert!(matches!(res, Err(ProviderError::NoTrainingFiles { .. })));
    }

    #[test]
    fn sequential_order_wraps_to_first() {
        let dir = dataset(&["a", "b", "c"]);
        let mut provider = provider(&dir, false);

        let visited: Vec<PathBuf> = (0..4).map(|_| next_file(&mut provider)).collect();

        assert_eq!(visited[0], dir.path().join("a.tif"));
        assert_eq!(visited[1], dir.path().join("b.tif"));
        assert_eq!(visited[2], dir.path().join("c.tif"));
        assert_eq!(visited[3], dir.path().join("a.tif"));
        assert_eq!(provider.pos(), Some(0));
    }

    #[test]
    fn every_pass_visits_each_file_once() {
        let names = ["f0", "f1", "f2", "f3", "f4", "f5", "f6"];
        let dir = dataset(&names);
        let mut provider = provider(&dir, true);

        let manifest: HashSet<PathBuf> = provider.files().iter().cloned().collect();
        assert_eq!(manifest.len(), names.len());

        for _pass in 0..3 {
            let visited: HashSet<PathBuf> = (0..names.len()).map(|_| next_file(&mut provider)).collect();
            assert_eq!(visited, manifest);
        }
    }

    #[test]
    fn reshuffle_keeps_manifest_contents() {
        let dir = dataset(&["a", "b", "c", "d", "e"]);
        let mut provider = provider(&dir, true);

        let mut before = provider.files().to_vec();

        for _ in 0..provider.files().len() + 1 {
            next_file(&mut provider);
        }

        let mut after = provider.files().to_vec();
        before.sort();
        after.sort();

        assert_eq!(before, after);
        assert_eq!(provider.pos(), Some(0));
    }

    #[test]
    fn first_pass_uses_construction_order() {
        let dir = dataset(&["a", "b", "c", "d"]);
        let mut provider = provider(&dir, true);

        let order = provider.files().to_vec();
        let visited: Vec<PathBuf> = (0..order.len()).map(|_| next_file(&mut provider)).collect();

        assert_eq!(visited, order);
    }

    #[test]
    fn mask_is_derived_from_current_file() {
        let dir = dataset(&["a", "b"]);
        let decoder = StubDecoder::new(&[4, 4], &[4, 4]);
        let decoded = decoder.decoded.clone();

        let mut provider = ImageDataProvider::builder(&pattern(&dir))
            .shuffle(false)
            .decoder(decoder)
            .build()
            .unwrap();

        decoded.borrow_mut().clear();
        provider.next_data().unwrap();
        provider.next_data().unwrap();

        assert_eq!(
            *decoded.borrow(),
            vec![
                dir.path().join("a.tif"),
                dir.path().join("a_mask.tif"),
                dir.path().join("b.tif"),
                dir.path().join("b_mask.tif"),
            ]
        );
    }

    #[test]
    fn layout_inferred_from_first_pair() {
        let dir = dataset(&["a"]);

        let gray = ImageDataProvider::builder(&pattern(&dir))
            .decoder(StubDecoder::new(&[8, 6], &[8, 6]))
            .build()
            .unwrap();
        assert_eq!(gray.channels(), 1);
        assert_eq!(gray.n_class(), 2);

        let color = ImageDataProvider::builder(&pattern(&dir))
            .decoder(StubDecoder::new(&[8, 6, 3], &[8, 6, 5]))
            .build()
            .unwrap();
        assert_eq!(color.channels(), 3);
        assert_eq!(color.n_class(), 5);
    }

    #[test]
    fn missing_mask_propagates_decoder_error() {
        let dir = dataset(&["a"]);
        File::create(dir.path().join("orphan.tif")).unwrap();

        let mut provider = ImageDataProvider::builder(&pattern(&dir))
            .shuffle(false)
            .decoder(StubDecoder::new(&[4, 4], &[4, 4]))
            .build()
            .unwrap();

        provider.next_data().unwrap();
        let res = provider.next_data();

        assert!(matches!(res, Err(ProviderError::Image { .. })));
        assert_eq!(provider.current_file(), Some(dir.path().join("orphan.tif").as_path()));
    }

    #[test]
    fn reset_restarts_without_reshuffle() {
        let dir = dataset(&["a", "b", "c"]);
        let mut provider = provider(&dir, true);

        let order = provider.files().to_vec();
        next_file(&mut provider);
        next_file(&mut provider);

        provider.reset();
        assert_eq!(provider.pos(), None);
        assert_eq!(provider.current_file(), None);
        assert_eq!(next_file(&mut provider), order[0]);
    }

    #[test]
    fn iterator_yields_pairs() {
        let dir = dataset(&["a", "b"]);
        let provider = provider(&dir, false);

        let pairs: Vec<_> = provider.take(5).collect::<Result<Vec<_>>>().unwrap();

        assert_eq!(pairs.len(), 5);
        assert!(pairs.iter().all(|(img, mask)| img.shape() == [4, 4] && mask.shape() == [4, 4]));
    }

    #[test]
    fn params_report_layout_and_clip() {
        let dir = dataset(&["a"]);
        let provider = ImageDataProvider::builder(&pattern(&dir))
            .clip(Some(-1.0), Some(1.0))
            .decoder(StubDecoder::new(&[4, 4, 3], &[4, 4]))
            .build()
            .unwrap();

        let cfg = provider.cfg();

        assert_eq!(cfg["channels"], Variant::Int(3));
        assert_eq!(cfg["a_min"], Variant::Float(-1.0));
        assert_eq!(cfg["a_max"], Variant::Float(1.0));
        assert_eq!(provider.clip_range(), &ClipRange::new(Some(-1.0), Some(1.0)).unwrap());
    }

    #[test]
    fn inverted_clip_range_fails() {
        let dir = dataset(&["a"]);
        let res = ImageDataProvider::builder(&pattern(&dir))
            .clip(Some(2.0), Some(1.0))
            .decoder(StubDecoder::new(&[4, 4], &[4, 4]))
            .build();

        assert!(matches!(res, Err(ProviderError::WrongArg(_))));
    }
}
