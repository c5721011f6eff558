/// A single substring rewrite applied to a report column label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationRule {
    pub pattern: &'static str,
    pub replacement: &'static str,
}

impl NormalizationRule {
    const fn new(pattern: &'static str, replacement: &'static str) -> Self {
        Self {
            pattern,
            replacement,
        }
    }

    #[must_use]
    pub fn apply(&self, label: &str) -> String {
        label.replace(self.pattern, self.replacement)
    }
}

/// Label rewrites in application order.
///
/// Every rule runs over the output of the previous one, so the order matters:
/// the ` (ms)` suffix is stripped before the percentile rules see the label.
///
/// `80%ile` maps to `p90`, the same key as `90%ile`. Reports that carry both
/// columns end up with a single `p90` entry holding the 90th percentile.
pub const NORMALIZATION_RULES: &[NormalizationRule] = &[
    NormalizationRule::new(" (ms)", ""),
    NormalizationRule::new("Average size (bytes)", "AverageSize"),
    NormalizationRule::new("50%ile", "p50"),
    NormalizationRule::new("60%ile", "p60"),
    NormalizationRule::new("70%ile", "p70"),
    NormalizationRule::new("80%ile", "p90"),
    NormalizationRule::new("90%ile", "p90"),
    NormalizationRule::new("95%ile", "p95"),
    NormalizationRule::new("99%ile", "p99"),
    NormalizationRule::new("100%ile", "p100"),
    NormalizationRule::new("# Fails", "Fails"),
    NormalizationRule::new("# Requests", "Requests"),
];

/// Maps a raw header label to its canonical metric key.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    NORMALIZATION_RULES
        .iter()
        .fold(label.trim().to_string(), |acc, rule| rule.apply(&acc))
}
