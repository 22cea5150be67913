//! Static color-ramp table for choropleth styling.
//!
//! Each palette defines one ramp per bin count from [`MIN_BIN_COUNT`] to
//! [`MAX_BIN_COUNT`], ordered light to dark.

use crate::StyleError;

/// Smallest supported number of choropleth bins.
pub const MIN_BIN_COUNT: usize = 3;

/// Largest supported number of choropleth bins.
pub const MAX_BIN_COUNT: usize = 7;

/// A named palette with one ramp per supported bin count.
#[derive(Debug)]
pub struct ColorRamp {
    /// Palette name (e.g. `"blue"`).
    pub name: &'static str,
    /// Ramps indexed by `bin_count - MIN_BIN_COUNT`.
    ramps: [&'static [&'static str]; MAX_BIN_COUNT - MIN_BIN_COUNT + 1],
}

impl ColorRamp {
    /// Returns the ramp for `bin_count`, if defined.
    #[must_use]
    pub fn colors(&self, bin_count: usize) -> Option<&'static [&'static str]> {
        bin_count
            .checked_sub(MIN_BIN_COUNT)
            .and_then(|idx| self.ramps.get(idx))
            .copied()
    }
}

/// All registered palettes.
pub static COLOR_RAMPS: &[ColorRamp] = &[
    ColorRamp {
        name: "orange",
        ramps: [
            &["#fee8c8", "#fdbb84", "#e34a33"],
            &["#fef0d9", "#fdcc8a", "#fc8d59", "#d7301f"],
            &["#fef0d9", "#fdcc8a", "#fc8d59", "#e34a33", "#b30000"],
            &[
                "#fef0d9", "#fdd49e", "#fdbb84", "#fc8d59", "#e34a33", "#b30000",
            ],
            &[
                "#fef0d9", "#fdd49e", "#fdbb84", "#fc8d59", "#ef6548", "#d7301f", "#990000",
            ],
        ],
    },
    ColorRamp {
        name: "blue",
        ramps: [
            &["#deebf7", "#9ecae1", "#3182bd"],
            &["#eff3ff", "#bdd7e7", "#6baed6", "#2171b5"],
            &["#eff3ff", "#bdd7e7", "#6baed6", "#3182bd", "#08519c"],
            &[
                "#eff3ff", "#c6dbef", "#9ecae1", "#6baed6", "#3182bd", "#08519c",
            ],
            &[
                "#eff3ff", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#084594",
            ],
        ],
    },
    ColorRamp {
        name: "black",
        ramps: [
            &["#f0f0f0", "#bdbdbd", "#636363"],
            &["#f7f7f7", "#cccccc", "#969696", "#525252"],
            &["#f7f7f7", "#cccccc", "#969696", "#636363", "#252525"],
            &[
                "#f7f7f7", "#d9d9d9", "#bdbdbd", "#969696", "#636363", "#252525",
            ],
            &[
                "#f7f7f7", "#d9d9d9", "#bdbdbd", "#969696", "#737373", "#525252", "#252525",
            ],
        ],
    },
    ColorRamp {
        name: "yellow-blue",
        ramps: [
            &["#edf8b1", "#7fcdbb", "#2c7fb8"],
            &["#ffffcc", "#a1dab4", "#41b6c4", "#225ea8"],
            &["#ffffcc", "#a1dab4", "#41b6c4", "#2c7fb8", "#253494"],
            &[
                "#ffffcc", "#c7e9b4", "#7fcdbb", "#41b6c4", "#2c7fb8", "#253494",
            ],
            &[
                "#ffffcc", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#0c2c84",
            ],
        ],
    },
];

/// Names of all registered palettes, in registration order.
#[must_use]
pub fn palette_names() -> Vec<&'static str> {
    COLOR_RAMPS.iter().map(|ramp| ramp.name).collect()
}

/// Finds a palette by name.
///
/// # Errors
///
/// Returns [`StyleError::UnknownPalette`] if no palette has that name.
pub fn palette(name: &str) -> Result<&'static ColorRamp, StyleError> {
    COLOR_RAMPS
        .iter()
        .find(|ramp| ramp.name == name)
        .ok_or_else(|| StyleError::UnknownPalette {
            palette: name.to_string(),
        })
}

/// Returns the registered ramp for `(palette, bin_count)`.
///
/// # Errors
///
/// Returns [`StyleError::UnknownPalette`] or [`StyleError::UnknownBinCount`]
/// on a lookup miss.
pub fn lookup(name: &str, bin_count: usize) -> Result<&'static [&'static str], StyleError> {
    palette(name)?
        .colors(bin_count)
        .ok_or_else(|| StyleError::UnknownBinCount {
            palette: name.to_string(),
            bin_count,
        })
}

/// Returns the ramp for `(palette, bin_count)` as owned colors, reversed when
/// `reverse` is set. The static table itself is never modified.
///
/// # Errors
///
/// See [`lookup`].
pub fn resolve(name: &str, bin_count: usize, reverse: bool) -> Result<Vec<String>, StyleError> {
    let colors = lookup(name, bin_count)?.iter().map(ToString::to_string);
    Ok(if reverse {
        colors.rev().collect()
    } else {
        colors.collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_palette_defines_every_bin_count() {
        for ramp in COLOR_RAMPS {
            for n in MIN_BIN_COUNT..=MAX_BIN_COUNT {
                let colors = lookup(ramp.name, n).unwrap();
                assert_eq!(colors.len(), n, "{} with {n} bins", ramp.name);
            }
        }
    }

    #[test]
    fn reverse_is_exact_reverse() {
        for name in palette_names() {
            for n in MIN_BIN_COUNT..=MAX_BIN_COUNT {
                let mut forward = resolve(name, n, false).unwrap();
                let reversed = resolve(name, n, true).unwrap();
                forward.reverse();
                assert_eq!(forward, reversed);
            }
        }
    }

    #[test]
    fn reversing_does_not_mutate_table() {
        let before = lookup("orange", 4).unwrap().to_vec();
        let _ = resolve("orange", 4, true).unwrap();
        assert_eq!(lookup("orange", 4).unwrap(), before.as_slice());
    }

    #[test]
    fn lookup_misses() {
        assert_eq!(
            lookup("purple", 5),
            Err(StyleError::UnknownPalette {
                palette: "purple".to_string()
            })
        );
        assert_eq!(
            lookup("blue", 2),
            Err(StyleError::UnknownBinCount {
                palette: "blue".to_string(),
                bin_count: 2
            })
        );
        assert!(matches!(
            lookup("blue", 8),
            Err(StyleError::UnknownBinCount { bin_count: 8, .. })
        ));
    }

    #[test]
    fn palette_names_are_unique() {
        let mut names = palette_names();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), COLOR_RAMPS.len());
    }
}
