pub mod chart;
pub mod composer;
pub mod data;
pub mod heading;
pub mod price_target;
pub mod rules;
pub mod sidebar;

use crate::errors::CoreError;
use crate::models::combined::CombinedTable;
use crate::models::config::ReportConfig;
use crate::models::portfolio::PortfolioRow;
use crate::models::ticker::ResolvedTicker;

/// Everything a section producer may draw on for one holding.
pub struct SectionContext<'a> {
    pub row: &'a PortfolioRow,
    pub row_index: usize,
    pub ticker: &'a ResolvedTicker,
    pub comparison: &'a ResolvedTicker,
    pub combined: &'a CombinedTable,
    pub config: &'a ReportConfig,
}

/// A producer of one LaTeX fragment per holding.
///
/// Producers are stateless; the composer runs them in order for every
/// portfolio row and treats a returned error as "this section is blank",
/// never as a reason to abort the document.
pub trait Section: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate(&self, ctx: &SectionContext<'_>) -> Result<String, CoreError>;

    /// The sidebar is injected directly after the section that returns
    /// true here (the heading, in the default arrangement).
    fn anchors_sidebar(&self) -> bool {
        false
    }
}
