use crate::errors::CoreError;
use crate::util::maps::currency_symbol;
use super::{Section, SectionContext};

/// Horizontal strip placing the current price between the analyst
/// low/high targets, with mean and median marked in colour.
pub struct PriceTargetStrip;

impl Section for PriceTargetStrip {
    fn name(&self) -> &'static str {
        "price-targets"
    }

    fn generate(&self, ctx: &SectionContext<'_>) -> Result<String, CoreError> {
        let profile = &ctx.ticker.profile;
        let currency = currency_symbol(&profile.currency).unwrap_or(r"\$");

        let current = profile.previous_close.unwrap_or(0.0);
        let targets = &profile.price_targets;

        let bounded: Vec<f64> = [Some(current), targets.high, targets.low]
            .into_iter()
            .flatten()
            .collect();
        let maximum = bounded.iter().copied().fold(0.0_f64, f64::max);
        let minimum = bounded
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
            .min(maximum)
            .max(0.0);
        let width = maximum - minimum;

        let (display_width, offset) = if width == 0.0 {
            (1.0, current - 0.5)
        } else {
            (1.25 * width, minimum - 0.125 * width)
        };

        let min_draw = target_rep(
            current,
            Some(minimum),
            offset,
            "black",
            &format!("Min: {minimum:.2} {currency}"),
        );
        let max_draw = target_rep(
            current,
            Some(maximum),
            offset,
            "black",
            &format!("Max: {maximum:.2} {currency}"),
        );
        let mean_draw = target_rep(current, targets.mean, offset, "red", "");
        let median_draw = target_rep(current, targets.median, offset, "mainColour!50!black", "");

        let (mean_legend, median_legend) = if targets.mean.is_some() {
            (
                r"
\draw[red, line width=0.1cm] (0, -1.0) -- (0.4cm, -1.0);
\node[right] at  (0.5cm, -1.0cm) {Mean Analyst Price Target};
",
                r"
\draw[mainColour!50!black, line width=0.1cm] (5cm, -1.0) -- (5.4cm, -1.0);
\node[right] at  (5.5cm, -1.0cm) {Median Analyst Price Target};
",
            )
        } else {
            ("", "")
        };

        Ok(format!(
            r#"
\noindent%
    \begin{{tikzpicture}}[x=\textwidth/{display_width}, y=1cm]
        \path[use as bounding box] (0, -1.2) rectangle ({display_width}, 0.6);
        \fill[gray!50] (0,0) rectangle ({display_width}, 0.2);

        \draw[mainColour, line width=0.1cm] ({current_pos}, -0.1) -- ({current_pos}, 0.3);
        \node[above] at ({current_pos}, 0.35) {{ \textcolor{{mainColour}}{{Currently: {current:.2} {currency} }} }};

        {min_draw}
        {max_draw}
        {mean_draw}
        {median_draw}

        {mean_legend}
        {median_legend}

    \end{{tikzpicture}}
"#,
            current_pos = current - offset,
        ))
    }
}

/// A tick mark for one target price; nothing when the target is absent,
/// zero, or indistinguishable from the current price.
fn target_rep(current: f64, target: Option<f64>, offset: f64, colour: &str, text: &str) -> String {
    let target = match target {
        Some(t) if t != 0.0 && current != 0.0 => t,
        _ => return String::new(),
    };

    if target == current {
        return String::new();
    }

    let pos = target - offset;
    format!(
        r#"
\draw[{colour}, line width=0.1cm] ({pos}, -0.1) -- ({pos}, 0.3);
\node[below] at ({pos}, -0.1) {{ \textcolor{{{colour}}}{{ {text} }} }};
"#
    )
}
