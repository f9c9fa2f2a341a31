//! `dvidmsg` global configuration options.

use std::sync::OnceLock;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options for the `dvidmsg` crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Default Axis Labels
/// > default: `"tzyxc"`
///
/// The canonical axis labels assigned by the [`CutoutService`](crate::cutout::CutoutService) to a dataset without stored axis names.
/// A dataset with `n` axes is labelled with the last `n` labels.
/// Leading axes beyond the number of labels are labelled `'?'`.
///
/// These labels are a placeholder convention, they are not inferred from the data.
///
/// ## Cutout Element Limit
/// > default: [`None`]
///
/// The maximum number of elements in a single cutout.
/// Cutouts are materialised in memory, so a limit bounds the memory used by a request.
///
/// ## Sort Listings
/// > default: [`true`]
///
/// If enabled, a newly created [`FilesystemRepository`](crate::repository::FilesystemRepository) lists its datasets in sorted order.
/// Otherwise the order is that of the filesystem.
#[derive(Debug, Clone)]
pub struct Config {
    default_axis_labels: Vec<char>,
    cutout_element_limit: Option<u64>,
    sort_listings: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_axis_labels: vec!['t', 'z', 'y', 'x', 'c'],
            cutout_element_limit: None,
            sort_listings: true,
        }
    }
}

impl Config {
    /// Get the [default axis labels](#default-axis-labels) configuration.
    #[must_use]
    pub fn default_axis_labels(&self) -> &[char] {
        &self.default_axis_labels
    }

    /// Set the [default axis labels](#default-axis-labels) configuration.
    pub fn set_default_axis_labels(&mut self, default_axis_labels: Vec<char>) {
        self.default_axis_labels = default_axis_labels;
    }

    /// Get the [cutout element limit](#cutout-element-limit) configuration.
    #[must_use]
    pub fn cutout_element_limit(&self) -> Option<u64> {
        self.cutout_element_limit
    }

    /// Set the [cutout element limit](#cutout-element-limit) configuration.
    pub fn set_cutout_element_limit(&mut self, cutout_element_limit: Option<u64>) {
        self.cutout_element_limit = cutout_element_limit;
    }

    /// Get the [sort listings](#sort-listings) configuration.
    #[must_use]
    pub fn sort_listings(&self) -> bool {
        self.sort_listings
    }

    /// Set the [sort listings](#sort-listings) configuration.
    pub fn set_sort_listings(&mut self, sort_listings: bool) {
        self.sort_listings = sort_listings;
    }

    /// Returns the labels of the axes of a `dimensionality` dimensional dataset without stored axis names.
    ///
    /// See [default axis labels](#default-axis-labels).
    #[must_use]
    pub fn axis_labels_for(&self, dimensionality: usize) -> Vec<char> {
        let labels = &self.default_axis_labels;
        let unlabelled = dimensionality.saturating_sub(labels.len());
        std::iter::repeat('?')
            .take(unlabelled)
            .chain(labels[labels.len() - (dimensionality - unlabelled)..].iter().copied())
            .collect()
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global `dvidmsg` configuration.
///
/// This function might deadlock if the global config is already mutably held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).read()
}

/// Returns a mutable reference to the global `dvidmsg` configuration.
///
/// This function might deadlock if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default())).write()
}
