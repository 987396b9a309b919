use chrono::{Datelike, NaiveDate};

use crate::errors::CoreError;
use crate::models::config::Period;
use crate::models::series::TimeSeries;
use crate::services::join::total_minmax;
use crate::util::maps::currency_symbol;
use super::{Section, SectionContext};

/// Rebased level every comparison column starts from.
const BASE_LEVEL: f64 = 100.0;

/// The pgfplots performance chart: the holding's currency-adjusted
/// close against the benchmark and the inflation index, all rebased to
/// 100, with dividend dates marked as extra ticks on the x axis.
pub struct ChartGraph;

impl Section for ChartGraph {
    fn name(&self) -> &'static str {
        "chart"
    }

    fn generate(&self, ctx: &SectionContext<'_>) -> Result<String, CoreError> {
        let combined = ctx.combined;
        let profile = &ctx.ticker.profile;

        let last_price = profile.previous_close.ok_or_else(|| {
            CoreError::InvalidSeries(format!("no previous close for {}", profile.symbol))
        })?;
        let start_date = combined
            .start_date()
            .ok_or_else(|| CoreError::InvalidSeries("empty combined table".into()))?;
        let end_date = combined
            .end_date()
            .ok_or_else(|| CoreError::InvalidSeries("empty combined table".into()))?;

        let (min_val, max_val) = total_minmax(&[
            &combined.close_adjusted,
            &combined.inflation_adjusted,
            &combined.close_comparison_adjusted,
        ]);
        if !min_val.is_finite() || !max_val.is_finite() {
            return Err(CoreError::InvalidSeries(format!(
                "no finite chart values for {}",
                profile.symbol
            )));
        }

        let padding = 0.05 * (max_val - min_val);
        let graph_min = format!("{:.2}", min_val - padding);
        let graph_max = format!("{:.2}", max_val + padding);

        let (xticks, xticklabels) = year_ticks(end_date, ctx.config.period);
        let dividend_ticks = extra_xticks(&ctx.ticker.dividends, start_date);

        let last_level = combined
            .close_adjusted
            .last()
            .copied()
            .unwrap_or(f64::NAN);
        let performance_label = percent_performance(last_level);

        let inflation_points = datapoints(combined, &combined.inflation_adjusted);
        let comparison_points = datapoints(combined, &combined.close_comparison_adjusted);
        let adjusted_points = datapoints(combined, &combined.close_adjusted);

        let comparison_symbol = if ctx.comparison.symbol().is_empty() {
            "Reference"
        } else {
            ctx.comparison.symbol()
        };
        let price_symbol = currency_symbol(&profile.currency).unwrap_or("");

        Ok(format!(
            r#"
\begin{{center}}
\resizebox{{\textwidth}}{{!}}{{%
    \begin{{tikzpicture}}
        \begin{{axis}}[
            width=0.9\textwidth,
            height=8cm,
            date coordinates in=x,
            date ZERO={start},
            xmin={start}, xmax={end},
            ymin={graph_min}, ymax={graph_max},
            tick label style={{font=\footnotesize\sffamily, color=black}},
            xticklabels={{ {xticklabels} }},
            xtick={{ {xticks} }},
            {dividend_ticks},
            extra x tick style={{
                tick pos=lower,
                major tick length=5pt,
                tick style={{green!70!black, ultra thick}},
            }},
            yticklabel={{\pgfmathprintnumber{{\tick}}\%}},
            yticklabel style={{
                /pgf/number format/fixed,
                /pgf/number format/precision=0,
                /pgf/number format/assume math mode=true,
            }},
            ymajorgrids=true,
            extra y ticks={{ {last_level} }},
            extra y tick labels={{ {performance_label} }},
            extra y tick style={{
                tick pos=right,
                yticklabel pos=right,
                draw=none,
            }},
            tick pos=lower,
            legend style={{
                at={{(axis description cs:0, 1.025)}},
                anchor=south west,
                draw=none,
                fill=none,
                legend columns=-1,
                inner sep=0pt,
            }},
            grid style={{dotted, black}},
            clip=false,
        ]
        \addplot[
            red,
            thin,
            ] coordinates {{
            {inflation_points}
        }};
        \addlegendentry{{Inflation}}
        \addplot[
            green,
            thin,
            ] coordinates {{
            {comparison_points}
        }};
        \addlegendentry{{ {comparison_symbol} }}
        \addplot[
            mainColour,
            thick,
            ] coordinates {{
            {adjusted_points}
        }};
        \node[anchor=south east] at (axis description cs:1, 1.025)
            {{ \textcolor{{mainColour}}{{ \textbf{{ {last_price:.2} {price_symbol} }} }} on {end_label} }};
        \end{{axis}}
    \end{{tikzpicture}}%
    }}
    \end{{center}}
"#,
            start = start_date.format("%Y-%m-%d"),
            end = end_date.format("%Y-%m-%d"),
            end_label = end_date.format("%d.%m.%Y"),
        ))
    }
}

/// Year boundary ticks, scaled down as the window shortens: every year
/// labelled for 5y, every other year for 10y, none below 5y.
fn year_ticks(end_date: NaiveDate, period: Period) -> (String, String) {
    let mut xticks: Vec<String> = Vec::new();
    let mut xticklabels: Vec<String> = Vec::new();
    let end_year = end_date.year();

    match period {
        Period::TenYears => {
            for i in 0..10 {
                xticks.push(format!("{}-01-01", end_year - i));
                if i % 2 == 0 {
                    xticklabels.push(format!("Jan {}", end_year - i));
                } else {
                    xticklabels.push(String::new());
                }
            }
        }
        Period::FiveYears => {
            for i in 0..5 {
                xticks.push(format!("{}-01-01", end_year - i));
                xticklabels.push(format!("Jan {}", end_year - i));
            }
        }
        Period::OneYear | Period::TwoYears => {}
    }

    (xticks.join(", "), xticklabels.join(", "))
}

/// Unlabelled extra ticks at every dividend date inside the window.
fn extra_xticks(dividends: &TimeSeries, start_date: NaiveDate) -> String {
    let tick_dates: Vec<String> = dividends
        .iter()
        .filter(|p| p.date >= start_date)
        .map(|p| p.date.format("%Y-%m-%d").to_string())
        .collect();

    if tick_dates.is_empty() {
        return String::new();
    }

    let ticks = format!("extra x ticks={{ {} }}", tick_dates.join(", "));
    let labels = format!(
        "extra x tick labels={{ {} }}",
        ",".repeat(tick_dates.len() - 1)
    );

    format!("{ticks},\n{labels}")
}

fn datapoints(combined: &crate::models::combined::CombinedTable, column: &[f64]) -> String {
    combined
        .dates
        .iter()
        .zip(column.iter())
        .filter(|(_, v)| v.is_finite())
        .map(|(d, v)| format!("({}, {})", d.format("%Y-%m-%d"), v))
        .collect::<Vec<_>>()
        .join("\n\t\t\t\t\t")
}

fn percent_performance(last_level: f64) -> String {
    if last_level >= BASE_LEVEL {
        format!(
            r"\textcolor{{green!70!black}}{{ \textbf{{ +{:.2}\% }}}}",
            last_level - BASE_LEVEL
        )
    } else {
        format!(
            r"\textcolor{{red!70!black}}{{ \textbf{{ -{:.2}\% }}}}",
            BASE_LEVEL - last_level
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{extra_xticks, percent_performance, year_ticks};
    use crate::models::config::Period;
    use crate::models::series::{SeriesPoint, TimeSeries};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn short_periods_have_no_year_ticks() {
        let (ticks, labels) = year_ticks(date(2026, 8, 30), Period::OneYear);
        assert!(ticks.is_empty());
        assert!(labels.is_empty());
    }

    #[test]
    fn ten_year_ticks_label_every_other_year() {
        let (ticks, labels) = year_ticks(date(2026, 8, 30), Period::TenYears);
        assert!(ticks.starts_with("2026-01-01, 2025-01-01"));
        assert!(labels.starts_with("Jan 2026, , Jan 2024"));
    }

    #[test]
    fn dividend_ticks_skip_dates_before_window() {
        let dividends = TimeSeries::from_points(vec![
            SeriesPoint { date: date(2025, 3, 1), value: 1.2 },
            SeriesPoint { date: date(2026, 3, 1), value: 1.3 },
        ]);
        let out = extra_xticks(&dividends, date(2026, 1, 1));
        assert!(out.contains("2026-03-01"));
        assert!(!out.contains("2025-03-01"));
    }

    #[test]
    fn performance_label_signs() {
        assert!(percent_performance(112.5).contains("+12.50"));
        assert!(percent_performance(91.0).contains("-9.00"));
    }
}
