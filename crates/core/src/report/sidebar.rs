use chrono::Local;

use crate::models::config::ReportConfig;
use crate::models::ticker::ResolvedTicker;
use crate::services::overview::PortfolioOverview;
use crate::util::format::short_rep;
use crate::util::maps::{currency_symbol_table, escape_latex};

/// Per-page sidebar: the current position's details on top, the whole
/// portfolio's value breakdown below, with the current row in bold.
///
/// Built once per report run from the valued portfolio; rendering per
/// row only varies the emphasized line.
pub struct Sidebar {
    overview: PortfolioOverview,
    display_currency: String,
    generated: String,
}

impl Sidebar {
    pub fn new(overview: PortfolioOverview, config: &ReportConfig) -> Self {
        Self {
            overview,
            display_currency: config.currency.clone(),
            generated: format!("Generated: {}", Local::now().format("%d.%m.%Y")),
        }
    }

    pub fn render(&self, index: usize, ticker: &ResolvedTicker, quantity: f64) -> String {
        let profile = &ticker.profile;
        let currency = &profile.currency;
        let symbol = currency_symbol_table(currency).unwrap_or("USD");

        let name = escape_latex(&profile.long_name);
        let position_type = if profile.quote_type.is_empty() {
            "Equity"
        } else {
            &profile.quote_type
        };
        let close = profile
            .previous_close
            .map(|c| format!("{c:.2} {symbol}"))
            .unwrap_or_default();
        let dividend_yield = profile.dividend_yield.unwrap_or(0.0);
        let dividend = profile.dividend_rate.unwrap_or(0.0);

        let display_symbol =
            currency_symbol_table(&self.display_currency).unwrap_or("USD");
        let total = format!("{} {}", short_rep(Some(self.overview.total_value)), display_symbol);

        format!(
            r#"
\setsidebar{{
    {{\bfseries
    Current Position: \\[0pt]
    \textcolor{{mainColour}}{{ {name} }} \par}}

    \vspace{{0.5cm}}

    \begin{{tabularx}}{{\linewidth}}{{p{{2.25cm}}X}}
      Type: & {position_type} \\
      Country & {country} \\
      Symbol: & {ticker_symbol} \\
      Sector: & {sector} \\
      Currency: & {currency} \\
      Quantity: & {quantity} \\
      Close: & \textcolor{{mainColour}}{{\textbf{{{close}}}}} \\
    \end{{tabularx}}

    \vspace{{0.5cm}}\par

    \begin{{tabularx}}{{\linewidth}}{{p{{2.25cm}}X}}

      Dividend Yield: & {dividend_yield}\% p.a.\\
      Dividend: & {dividend:.2} {symbol}
    \end{{tabularx}}


    \vspace{{0.5cm}}
    \noindent{{\color{{black}}\rule{{\linewidth}}{{1pt}}}}\par
    \vspace{{0.5cm}}

    \noindent
    \begin{{tabularx}}{{\linewidth}}{{
      X
      >{{\raggedleft\arraybackslash}}p{{1.0cm}}
      >{{\raggedleft\arraybackslash}}p{{1.4cm}}
    }}
        {{\textcolor{{mainColour}}{{\textbf{{Position}}}}}}
        & {{\textcolor{{mainColour}}{{\textbf{{\%}}}}}}
        & {{\textcolor{{mainColour}}{{\textbf{{Value}}}}}} \\
        \midrule
        {table_rows}
        \bottomrule
        Total: & \multicolumn{{2}}{{r}}{{ {total} }}
    \end{{tabularx}}

    \vspace{{0.5cm}}
    \noindent{{\color{{black}}\rule{{\linewidth}}{{1pt}}}}\par
    \vspace{{0.5cm}}
    \noindent
    {generated}
}}
"#,
            country = escape_latex(&profile.country),
            ticker_symbol = escape_latex(&profile.symbol),
            sector = escape_latex(&profile.sector),
            table_rows = self.overview_rows(index),
            generated = self.generated,
        )
    }

    fn overview_rows(&self, index: usize) -> String {
        let display_symbol =
            currency_symbol_table(&self.display_currency).unwrap_or("USD");

        self.overview
            .entries
            .iter()
            .filter(|entry| !entry.symbol.is_empty())
            .map(|entry| {
                let name: String = entry.symbol.chars().take(7).collect();
                let percent = 100.0 * entry.share;
                let value = format!("{} {}", short_rep(Some(entry.value)), display_symbol);

                if entry.index == index {
                    format!(
                        "\\textbf{{{name}}} & \\textbf{{{percent:.2}}} & \\textbf{{{value}}}\\\\\n"
                    )
                } else {
                    format!("{name} & {percent:.2} & {value} \\\\\n")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
