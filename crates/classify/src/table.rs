use tilescape_common::Terrain;

use crate::{ClassifyError, ConfigError};

/// Ordered upper bounds that bucket a continuous sample into a category.
///
/// Band `k` covers `[bound[k-1], bound[k])`; values at or above the last
/// bound fall into the catch-all. Bounds are strictly increasing and finite.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable<C> {
    bounds: Vec<f64>,
    /// One more entry than `bounds`; the last is the catch-all.
    categories: Vec<C>,
}

impl<C: Copy> ThresholdTable<C> {
    /// Build a table from `(upper_bound, category)` pairs plus a catch-all.
    pub fn new(bands: Vec<(f64, C)>, catch_all: C) -> Result<Self, ConfigError> {
        if bands.is_empty() {
            return Err(ConfigError::EmptyTable);
        }

        let mut bounds = Vec::with_capacity(bands.len());
        let mut categories = Vec::with_capacity(bands.len() + 1);
        for (index, (bound, category)) in bands.into_iter().enumerate() {
            if !bound.is_finite() {
                return Err(ConfigError::NonFiniteBound { index, bound });
            }
            if let Some(&previous) = bounds.last() {
                if bound <= previous {
                    return Err(ConfigError::NotIncreasing {
                        index,
                        previous,
                        bound,
                    });
                }
            }
            bounds.push(bound);
            categories.push(category);
        }
        categories.push(catch_all);

        Ok(Self { bounds, categories })
    }

    /// Index of the band `value` falls into; `bounds().len()` is the catch-all.
    ///
    /// Comparison is strict, so a value equal to a bound lands in the band above it.
    pub fn band_index(&self, value: f64) -> Result<usize, ClassifyError> {
        if !value.is_finite() {
            return Err(ClassifyError::NumericAnomaly { value });
        }
        Ok(self
            .bounds
            .iter()
            .position(|&bound| value < bound)
            .unwrap_or(self.bounds.len()))
    }

    pub fn classify(&self, value: f64) -> Result<C, ClassifyError> {
        let index = self.band_index(value)?;
        Ok(self.categories[index])
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Categories in band order, catch-all last.
    pub fn categories(&self) -> &[C] {
        &self.categories
    }

    pub fn catch_all(&self) -> C {
        self.categories[self.bounds.len()]
    }

    /// Number of bands including the catch-all.
    pub fn band_count(&self) -> usize {
        self.categories.len()
    }
}

impl ThresholdTable<Terrain> {
    /// Water / plains / forest / pines below `-0.2 / 0.0 / 0.2 / 0.4`, mountain above.
    pub fn terrain_default() -> Self {
        Self {
            bounds: vec![-0.2, 0.0, 0.2, 0.4],
            categories: Terrain::ALL.to_vec(),
        }
    }
}

/// Classify `value` against `table`.
pub fn classify<C: Copy>(value: f64, table: &ThresholdTable<C>) -> Result<C, ClassifyError> {
    table.classify(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ThresholdTable<Terrain> {
        ThresholdTable::new(
            vec![
                (-0.2, Terrain::Water),
                (0.0, Terrain::Plains),
                (0.2, Terrain::Forest),
                (0.4, Terrain::Pines),
            ],
            Terrain::Mountain,
        )
        .unwrap()
    }

    #[test]
    fn boundary_value_goes_to_higher_band() {
        let t = table();
        assert_eq!(t.classify(-0.2).unwrap(), Terrain::Plains);
        assert_eq!(t.classify(-0.2000001).unwrap(), Terrain::Water);
        assert_eq!(t.classify(0.0).unwrap(), Terrain::Forest);
        assert_eq!(t.classify(0.4).unwrap(), Terrain::Mountain);
    }

    #[test]
    fn extremes_hit_first_and_catch_all() {
        let t = table();
        assert_eq!(t.classify(-1.0).unwrap(), Terrain::Water);
        assert_eq!(t.classify(1.0).unwrap(), Terrain::Mountain);
        assert_eq!(t.catch_all(), Terrain::Mountain);
    }

    #[test]
    fn classification_is_monotonic() {
        let t = table();
        let mut previous = 0;
        for step in 0..=2000 {
            let v = -1.0 + step as f64 * 0.001;
            let band = t.band_index(v).unwrap();
            assert!(band >= previous, "band dropped from {previous} to {band} at {v}");
            previous = band;
        }
        assert_eq!(previous, t.band_count() - 1);
    }

    #[test]
    fn nan_and_infinity_fail_fast() {
        let t = table();
        assert!(matches!(
            t.classify(f64::NAN),
            Err(ClassifyError::NumericAnomaly { .. })
        ));
        assert!(t.classify(f64::INFINITY).is_err());
        assert!(t.band_index(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn empty_table_rejected() {
        let result = ThresholdTable::<Terrain>::new(vec![], Terrain::Water);
        assert!(matches!(result, Err(ConfigError::EmptyTable)));
    }

    #[test]
    fn equal_bounds_rejected() {
        let result = ThresholdTable::new(
            vec![(0.0, Terrain::Water), (0.0, Terrain::Plains)],
            Terrain::Mountain,
        );
        assert!(matches!(
            result,
            Err(ConfigError::NotIncreasing { index: 1, .. })
        ));
    }

    #[test]
    fn decreasing_bounds_rejected() {
        let result = ThresholdTable::new(
            vec![(0.5, Terrain::Water), (0.1, Terrain::Plains)],
            Terrain::Mountain,
        );
        assert!(result.is_err());
    }

    #[test]
    fn non_finite_bound_rejected() {
        let result = ThresholdTable::new(vec![(f64::NAN, 1u8)], 2u8);
        assert!(matches!(result, Err(ConfigError::NonFiniteBound { index: 0, .. })));
    }

    #[test]
    fn terrain_default_matches_explicit_table() {
        assert_eq!(ThresholdTable::terrain_default(), table());
    }

    #[test]
    fn free_function_mirrors_method() {
        let t = table();
        assert_eq!(classify(0.1, &t).unwrap(), t.classify(0.1).unwrap());
    }

    #[test]
    fn works_with_plain_integer_categories() {
        let heights = ThresholdTable::new(vec![(-2.0, 0u8), (3.0, 1u8)], 2u8).unwrap();
        assert_eq!(heights.classify(-5.0).unwrap(), 0);
        assert_eq!(heights.classify(-2.0).unwrap(), 1);
        assert_eq!(heights.classify(9.0).unwrap(), 2);
    }
}
