//! Choosing a palette size by the elbow of the inertia curve.

use std::collections::BTreeMap;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::error::{PaletteError, Result};
use crate::extract::{Extraction, Extractor, Palette};
use crate::knee::{DEFAULT_SENSITIVITY, find_knee};
use crate::preprocess::PixelSet;
use crate::progress::ProgressEvent;

/// Smallest palette size the search tries.
pub const MIN_SEARCH_COLORS: usize = 2;

/// Palettes and fit quality for every size from 2 up to the search limit.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimalSearch {
    pub palettes: BTreeMap<usize, Palette>,
    /// Inertia per palette size.
    pub inertia: BTreeMap<usize, f64>,
    /// Knee of the inertia curve; `None` when the curve has no clear elbow.
    pub best_k: Option<usize>,
}

impl OptimalSearch {
    /// The palette at the knee, if one was found.
    pub fn best_palette(&self) -> Option<&Palette> {
        self.best_k.and_then(|k| self.palettes.get(&k))
    }
}

impl Extractor<'_> {
    /// Extract palettes of 2..=`max_colors` colors and pick the size where
    /// adding colors stops paying off.
    ///
    /// Every size is clustered from scratch with the same `seed`. Sizes run
    /// in parallel on native targets; results are keyed by size, so the
    /// outcome does not depend on scheduling.
    pub fn search_optimal(
        &self,
        pixels: &PixelSet,
        max_colors: usize,
        name: Option<&str>,
        seed: Option<u64>,
    ) -> Result<OptimalSearch> {
        if max_colors < MIN_SEARCH_COLORS {
            return Err(PaletteError::InvalidParameter(format!(
                "max colors must be at least {MIN_SEARCH_COLORS}, got {max_colors}"
            )));
        }
        self.sink().emit(&ProgressEvent::SearchStarted { max_colors });

        let sizes: Vec<usize> = (MIN_SEARCH_COLORS..=max_colors).collect();
        let run = |&k: &usize| -> Result<(usize, Extraction)> {
            Ok((k, self.extract(pixels, k as i64, name, seed)?))
        };

        #[cfg(not(target_arch = "wasm32"))]
        let runs: Vec<(usize, Extraction)> = sizes.par_iter().map(run).collect::<Result<_>>()?;
        #[cfg(target_arch = "wasm32")]
        let runs: Vec<(usize, Extraction)> = sizes.iter().map(run).collect::<Result<_>>()?;

        let mut palettes = BTreeMap::new();
        let mut inertia = BTreeMap::new();
        for (k, extraction) in runs {
            inertia.insert(k, extraction.inertia);
            palettes.insert(k, extraction.palette);
        }

        let curve: Vec<(f64, f64)> = inertia.iter().map(|(&k, &v)| (k as f64, v)).collect();
        let best_k = find_knee(&curve, DEFAULT_SENSITIVITY).map(|k| k.round() as usize);

        self.sink().emit(&ProgressEvent::SearchFinished { best_k });

        Ok(OptimalSearch { palettes, inertia, best_k })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::KmeansConfig;
    use crate::progress::SilentSink;
    use crate::progress::tests::RecordingSink;

    fn two_tone() -> PixelSet {
        let pixels = (0..200u8)
            .map(|i| {
                let j = i % 9;
                if i % 2 == 0 { [20 + j, 30, 200 - j] } else { [220 - j, 200, 40 + j] }
            })
            .collect();
        PixelSet::from_rgb("two_tone", pixels)
    }

    #[test]
    fn rejects_limit_below_two() {
        let ex = Extractor::new(KmeansConfig::default(), &SilentSink);
        for max in [0, 1] {
            let err = ex.search_optimal(&two_tone(), max, None, Some(1)).unwrap_err();
            assert!(matches!(err, PaletteError::InvalidParameter(_)));
        }
    }

    #[test]
    fn keys_cover_every_size() {
        let ex = Extractor::new(KmeansConfig::default(), &SilentSink);
        let out = ex.search_optimal(&two_tone(), 6, Some("tt"), Some(9)).unwrap();
        assert_eq!(out.palettes.keys().copied().collect::<Vec<_>>(), [2, 3, 4, 5, 6]);
        assert_eq!(out.inertia.keys().copied().collect::<Vec<_>>(), [2, 3, 4, 5, 6]);
        for (k, p) in &out.palettes {
            assert_eq!(p.len(), *k);
            assert_eq!(p.name(), "tt");
        }
    }

    #[test]
    fn low_variety_input_keeps_keys_and_lengths_in_step() {
        let ex = Extractor::new(KmeansConfig::default(), &SilentSink);
        let flat = PixelSet::from_rgb("flat", vec![[40, 80, 120]; 50]);
        let out = ex.search_optimal(&flat, 6, None, Some(42)).unwrap();
        for k in 2..=6 {
            assert_eq!(out.palettes[&k].len(), k);
            assert_eq!(out.palettes[&k].hex_codes(), vec!["#285078"; k]);
        }
    }

    #[test]
    fn two_sizes_are_too_few_for_a_knee() {
        let ex = Extractor::new(KmeansConfig::default(), &SilentSink);
        let out = ex.search_optimal(&two_tone(), 3, None, Some(2)).unwrap();
        assert_eq!(out.best_k, None);
        assert!(out.best_palette().is_none());
    }

    #[test]
    fn reports_search_bounds_to_sink() {
        let sink = RecordingSink::default();
        let ex = Extractor::new(KmeansConfig::default(), &sink);
        let out = ex.search_optimal(&two_tone(), 4, None, Some(4)).unwrap();
        let events = sink.0.into_inner().unwrap();
        assert_eq!(events.first(), Some(&ProgressEvent::SearchStarted { max_colors: 4 }));
        assert_eq!(events.last(), Some(&ProgressEvent::SearchFinished { best_k: out.best_k }));
        let finished = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::ClusteringFinished { .. }))
            .count();
        assert_eq!(finished, 3);
    }
}
