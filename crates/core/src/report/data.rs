use crate::errors::CoreError;
use crate::models::combined::CombinedTable;
use crate::models::ticker::RecommendationCounts;
use crate::util::format::short_rep;
use crate::util::maps::currency_symbol;
use super::{Section, SectionContext};

/// Above this share of days the "better than" comparisons render in the
/// accent colour, below it in red.
const PERFORMANCE_THRESHOLD: f64 = 50.0;

/// Side-by-side fundamentals table and analyst recommendation bar.
pub struct DataAndRecommendations;

impl Section for DataAndRecommendations {
    fn name(&self) -> &'static str {
        "data-and-recommendations"
    }

    fn generate(&self, ctx: &SectionContext<'_>) -> Result<String, CoreError> {
        let recommendations_latex =
            recommendations_bar_graph(&ctx.ticker.profile.recommendations);
        let data_table_latex = data_table(ctx, &ctx.config.currency);

        Ok(format!(
            r#"
\noindent
\begin{{minipage}}{{0.48\textwidth}}
    \centering
    {data_table_latex}
\end{{minipage}}
\hfill
\begin{{minipage}}{{0.48\textwidth}}
    \centering
    {recommendations_latex}
\end{{minipage}}
\vspace{{1em}}

"#
        ))
    }
}

fn recommendations_bar_graph(counts: &RecommendationCounts) -> String {
    let total = counts.total();
    if total == 0 {
        return "No recommendations available".to_string();
    }

    let hold_half = f64::from(counts.hold) / 2.0;

    format!(
        r#"
\begin{{tikzpicture}}
    \begin{{axis}}[
        title={{\textcolor{{mainColour}}{{\textbf{{Recommendations ({total})}}}} }},
        width=\textwidth,
        height=4cm,
        xbar stacked,
        stack negative=separate,
        bar width=40pt,
        ymin=-0.2, ymax=0.2,
        axis lines=none,
        ticks=none,
        legend image code/.code={{
            \draw[draw=none] (0cm,-0.1cm) rectangle (0.2cm,0.1cm);
        }},
        axis vline/.style={{
            execute at end axis={{
                \draw [thick, gray!50] (axis cs:0,-0.2) -- (axis cs:0,0.2);
            }}
        }},
        axis vline,
        clip=false,
        legend style={{
            at={{(0.5,-0.1)}},
            anchor=north,
            draw=none,
            legend columns=2
        }}
    ]
    \addplot[fill=gray!50, draw=none, forget plot] coordinates {{(-{hold_half},0)}};
    \addplot[fill=gray!50, draw=none, forget plot] coordinates {{({hold_half},0)}};

    \addplot[fill=mainColour!50!black, draw=none, forget plot] coordinates {{({buy},0)}};
    \addplot[fill=mainColour, draw=none, forget plot] coordinates {{({strong_buy},0)}};

    \addplot[fill=red!50!black, draw=none, forget plot] coordinates {{(-{sell},0)}};
    \addplot[fill=red, draw=none, forget plot] coordinates {{(-{strong_sell},0)}};

    \addlegendimage{{fill=red!50!black, draw=none}}
    \addlegendentry{{Sell ({sell})}}

    \addlegendimage{{fill=mainColour!50!black, draw=none}}
    \addlegendentry{{Buy ({buy})}}

    \addlegendimage{{fill=red, draw=none}}
    \addlegendentry{{Strong Sell ({strong_sell})}}

    \addlegendimage{{fill=mainColour, draw=none}}
    \addlegendentry{{Strong Buy ({strong_buy})}}

    \end{{axis}}
\end{{tikzpicture}}
"#,
        buy = counts.buy,
        strong_buy = counts.strong_buy,
        sell = counts.sell,
        strong_sell = counts.strong_sell,
    )
}

fn data_table(ctx: &SectionContext<'_>, currency: &str) -> String {
    let profile = &ctx.ticker.profile;
    let symbol = currency_symbol(currency).unwrap_or("");

    let with_currency = |v: Option<f64>| -> String {
        let rep = short_rep(v);
        if rep.is_empty() {
            rep
        } else {
            format!("{rep} {symbol}")
        }
    };

    let growth = profile
        .growth_estimate
        .map(|g| format!(r"{:.1}\%", g * 100.0))
        .unwrap_or_default();
    let free_cash_flow = with_currency(profile.free_cashflow);
    let operating_cash_flow = with_currency(profile.operating_cashflow);
    let enterprise_value = with_currency(profile.enterprise_value);
    let employees = short_rep(profile.full_time_employees.map(|e| e as f64));
    let overall_risk = profile
        .overall_risk
        .map(|r| r.to_string())
        .unwrap_or_default();
    let five_year_avg_dividend = with_currency(profile.five_year_avg_dividend_yield);
    let beta = profile
        .beta
        .map(|b| format!("{b:.3}"))
        .unwrap_or_default();

    let combined = ctx.combined;
    let better_than_reference = percentage_larger(
        &combined.close_adjusted,
        &combined.close_comparison_adjusted,
    );
    let better_than_inflation =
        percentage_larger(&combined.close_adjusted, &combined.inflation_adjusted);

    format!(
        r#"
\begin{{tabularx}}{{\textwidth}}{{p{{3.5cm}}R}}
    \textcolor{{mainColour}}{{\textbf{{Better than inflation:}}}} & {better_than_inflation} \\
    \textcolor{{mainColour}}{{\textbf{{Better than reference:}}}} & {better_than_reference} \\
\end{{tabularx}}

\vspace{{0.5cm}}\par

\begin{{tabularx}}{{\textwidth}}{{p{{3.5cm}}R}}
    Growth Estimate: & {growth} \\
    Free Cash Flow: & {free_cash_flow} \\
    Operating Cash Flow: & {operating_cash_flow} \\
    Enterprise Value: & {enterprise_value} \\
\end{{tabularx}}

\vspace{{0.5cm}}\par

\begin{{tabularx}}{{\textwidth}}{{p{{3.5cm}}R}}
    Employees: & {employees} \\
    Overall Risk: & {overall_risk} \\
    5-year $\varnothing$ Dividend: & {five_year_avg_dividend} \\
    Beta: & {beta} \\
\end{{tabularx}}
"#
    )
}

/// Share of overlapping days on which the first column beat the second,
/// as a coloured percentage. "n/a" when the columns never overlap.
fn percentage_larger(first: &[f64], second: &[f64]) -> String {
    let Some(fraction) = CombinedTable::fraction_above(first, second) else {
        return "n/a".to_string();
    };

    let percentage = fraction * 100.0;
    let colour = if percentage >= PERFORMANCE_THRESHOLD {
        "mainColour"
    } else {
        "red"
    };

    format!(r"\textcolor{{{colour}}}{{\textbf{{ {percentage:.1}\% }}}}")
}
