//! Module holding the results structs for the `samstats flagstat` subcommand.

use serde::Serialize;

use crate::flagstat::compute::Category;
use crate::flagstat::compute::FlagstatTotals;
use crate::utils::display::RatioFormat;

/// The categories reported alongside their ratio of primary reads.
pub const CATEGORIES_WITH_RATIOS: [Category; 3] = [
    Category::Mapped,
    Category::ProperlyPaired,
    Category::Singletons,
];

/// One reported flagstat category.
#[derive(Debug, Serialize)]
pub struct CategoryResult {
    /// The label of the category.
    pub category: &'static str,

    /// Reads that passed QC.
    pub qc_passed: u64,

    /// Reads that failed QC.
    pub qc_failed: u64,

    /// The fraction of primary QC-passed reads in the category, where
    /// reported and defined.
    pub qc_passed_ratio: Option<f64>,

    /// The fraction of primary QC-failed reads in the category, where
    /// reported and defined.
    pub qc_failed_ratio: Option<f64>,

    #[serde(skip)]
    has_ratio: bool,
}

impl CategoryResult {
    /// Renders the category as a `samtools flagstat` style line.
    pub fn render(&self) -> String {
        let line = format!("{} + {} {}", self.qc_passed, self.qc_failed, self.category);

        if self.has_ratio {
            format!(
                "{} ({} : {})",
                line,
                RatioFormat(self.qc_passed_ratio),
                RatioFormat(self.qc_failed_ratio)
            )
        } else {
            line
        }
    }
}

/// Struct holding the final results for a `samstats flagstat` subcommand call.
#[derive(Debug, Serialize)]
pub struct FlagstatResult {
    /// Primary QC-passed reads (the denominator for the QC-passed ratios).
    pub qc_passed_primary: u64,

    /// Primary QC-failed reads (the denominator for the QC-failed ratios).
    pub qc_failed_primary: u64,

    /// Every category, in reporting order.
    pub categories: Vec<CategoryResult>,
}

impl FlagstatResult {
    /// Creates a new [`FlagstatResult`] from the accumulated totals.
    pub fn new(totals: &FlagstatTotals) -> Self {
        let pass = &totals.qc_passed;
        let fail = &totals.qc_failed;

        let categories = Category::ALL
            .iter()
            .map(|category| {
                let has_ratio = CATEGORIES_WITH_RATIOS.contains(category);

                CategoryResult {
                    category: category.label(),
                    qc_passed: pass.get(*category),
                    qc_failed: fail.get(*category),
                    qc_passed_ratio: pass.ratio(*category).filter(|_| has_ratio),
                    qc_failed_ratio: fail.ratio(*category).filter(|_| has_ratio),
                    has_ratio,
                }
            })
            .collect();

        FlagstatResult {
            qc_passed_primary: pass.primary,
            qc_failed_primary: fail.primary,
            categories,
        }
    }

    /// The report, one line per category.
    pub fn to_lines(&self) -> Vec<String> {
        self.categories.iter().map(CategoryResult::render).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flagstat::compute::FlagstatCounts;
    use crate::flagstat::compute::NUM_CATEGORIES;

    #[test]
    fn test_render_flagstat_lines() {
        let mut counts = [0; NUM_CATEGORIES];
        counts[Category::Total as usize] = 4;
        counts[Category::Mapped as usize] = 3;
        counts[Category::Singletons as usize] = 1;

        let totals = FlagstatTotals {
            qc_passed: FlagstatCounts { counts, primary: 4 },
            qc_failed: FlagstatCounts::default(),
        };

        let lines = FlagstatResult::new(&totals).to_lines();
        assert_eq!(lines.len(), NUM_CATEGORIES);
        assert_eq!(lines[0], "4 + 0 in total");
        assert_eq!(lines[4], "3 + 0 mapped (0.750 : NA)");
        assert_eq!(lines[8], "0 + 0 properly paired (0.000 : NA)");
        assert_eq!(lines[10], "1 + 0 singletons (0.250 : NA)");
        assert_eq!(
            lines[12],
            "0 + 0 with mate mapped to a different chr (mapQ>=5)"
        );
    }
}
