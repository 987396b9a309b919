use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use log::{info, warn};

use crate::errors::CoreError;
use crate::models::config::ReportConfig;
use crate::models::portfolio::{Portfolio, PortfolioRow};
use crate::services::exchange::ExchangeRateService;
use crate::services::inflation::InflationService;
use crate::services::join::join_all;
use crate::services::overview::build_overview;
use crate::services::tickers::TickerService;
use super::chart::ChartGraph;
use super::data::DataAndRecommendations;
use super::heading::SectionHeading;
use super::price_target::PriceTargetStrip;
use super::rules::{FullWidthRule, NewPage};
use super::sidebar::Sidebar;
use super::{Section, SectionContext};

const DOCUMENT_CLASS: &str = include_str!("../../resources/perftracker.cls");
const CLASS_FILE_NAME: &str = "perftracker.cls";

/// Drives the whole document: one `.tex` fragment per holding, a
/// `main.tex` that inputs them, the document class alongside, and a
/// `latexmk` run at the end.
///
/// A section that fails renders as a blank line; a holding that cannot
/// be resolved or joined is skipped with a warning. Only I/O and the
/// final render abort the run.
pub struct Composer {
    sections: Vec<Box<dyn Section>>,
    tickers: Arc<TickerService>,
    exchange: Arc<ExchangeRateService>,
    inflation: Arc<InflationService>,
}

impl Composer {
    pub fn new(
        sections: Vec<Box<dyn Section>>,
        tickers: Arc<TickerService>,
        exchange: Arc<ExchangeRateService>,
        inflation: Arc<InflationService>,
    ) -> Self {
        Self {
            sections,
            tickers,
            exchange,
            inflation,
        }
    }

    /// The standard page arrangement: heading (with sidebar), chart,
    /// fundamentals and recommendations, price targets, rule, page break.
    pub fn with_default_sections(
        tickers: Arc<TickerService>,
        exchange: Arc<ExchangeRateService>,
        inflation: Arc<InflationService>,
    ) -> Self {
        Self::new(
            vec![
                Box::new(SectionHeading),
                Box::new(ChartGraph),
                Box::new(DataAndRecommendations),
                Box::new(PriceTargetStrip),
                Box::new(FullWidthRule),
                Box::new(NewPage),
            ],
            tickers,
            exchange,
            inflation,
        )
    }

    /// Write the full document tree and render it to PDF.
    pub async fn compose(
        &self,
        portfolio: &Portfolio,
        config: &ReportConfig,
        output_dir: &Path,
        on_progress: impl FnMut(f32),
    ) -> Result<(), CoreError> {
        self.compose_document(portfolio, config, output_dir, on_progress)
            .await?;
        render_pdf(output_dir)
    }

    /// Write the per-holding fragments, the document class, and
    /// `main.tex` without invoking the renderer. Returns the fragment
    /// file names in page order.
    pub async fn compose_document(
        &self,
        portfolio: &Portfolio,
        config: &ReportConfig,
        output_dir: &Path,
        mut on_progress: impl FnMut(f32),
    ) -> Result<Vec<String>, CoreError> {
        let overview = build_overview(&self.tickers, &self.exchange, portfolio, config).await?;
        let sidebar = Sidebar::new(overview, config);

        fs::create_dir_all(output_dir)?;

        let total = portfolio.len().max(1);
        let mut file_names = Vec::new();

        for (index, row) in portfolio.rows.iter().enumerate() {
            if row.has_symbol() {
                match self
                    .compose_row(row, index, config, &sidebar, output_dir)
                    .await
                {
                    Ok(file_name) => file_names.push(file_name),
                    Err(e) => warn!("skipping {} in the report: {e}", row.ticker),
                }
            }
            on_progress((index + 1) as f32 / total as f32);
        }

        fs::write(output_dir.join(CLASS_FILE_NAME), DOCUMENT_CLASS)?;
        let main_tex = main_tex(&file_names);
        fs::write(output_dir.join("main.tex"), main_tex)?;

        Ok(file_names)
    }

    async fn compose_row(
        &self,
        row: &PortfolioRow,
        index: usize,
        config: &ReportConfig,
        sidebar: &Sidebar,
        output_dir: &Path,
    ) -> Result<String, CoreError> {
        let ticker = self.tickers.resolve(&row.ticker, config.period).await?;
        let comparison = self
            .tickers
            .resolve(&config.comparison_ticker, config.period)
            .await?;
        let combined = join_all(&self.exchange, &self.inflation, config, &ticker, &comparison)
            .await?;

        let ctx = SectionContext {
            row,
            row_index: index,
            ticker: &ticker,
            comparison: &comparison,
            combined: &combined,
            config,
        };

        let mut output = Vec::new();
        for section in &self.sections {
            match section.generate(&ctx) {
                Ok(fragment) => output.push(fragment),
                Err(e) => {
                    warn!("section {} failed for {}: {e}", section.name(), row.ticker);
                    output.push("\n".to_string());
                }
            }
            if section.anchors_sidebar() {
                output.push(sidebar.render(index, &ticker, row.quantity));
            }
        }

        let file_name = fragment_file_name(&row.ticker, index);
        fs::write(output_dir.join(&file_name), output.join("\n"))?;

        Ok(file_name)
    }
}

/// Render `main.tex` in `output_dir` to PDF with latexmk.
pub fn render_pdf(output_dir: &Path) -> Result<(), CoreError> {
    info!("rendering {}", output_dir.join("main.tex").display());

    let output = Command::new("latexmk")
        .args(["-pdf", "-interaction=nonstopmode", "main.tex"])
        .current_dir(output_dir)
        .output()
        .map_err(|e| CoreError::Render(format!("could not start latexmk: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CoreError::Render(format!(
            "latexmk exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(())
}

fn main_tex(file_names: &[String]) -> String {
    let inputs = file_names
        .iter()
        .map(|f| format!("\\input{{{f}}}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\\documentclass{{perftracker}}\n\n\\begin{{document}}\n\n{inputs}\n\n\\end{{document}}\n"
    )
}

/// Deterministic per-holding fragment name; the row index keeps
/// duplicate symbols apart.
fn fragment_file_name(symbol: &str, index: usize) -> String {
    let safe: String = symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{safe}_{index}.tex")
}

#[cfg(test)]
mod tests {
    use super::{fragment_file_name, main_tex};

    #[test]
    fn fragment_names_are_filesystem_safe() {
        assert_eq!(fragment_file_name("SAP.DE", 0), "SAP_DE_0.tex");
        assert_eq!(fragment_file_name("EURUSD=X", 3), "EURUSD_X_3.tex");
    }

    #[test]
    fn main_tex_inputs_every_fragment() {
        let tex = main_tex(&["A_0.tex".into(), "B_1.tex".into()]);
        assert!(tex.contains("\\documentclass{perftracker}"));
        assert!(tex.contains("\\input{A_0.tex}"));
        assert!(tex.contains("\\input{B_1.tex}"));
        assert!(tex.ends_with("\\end{document}\n"));
    }
}
