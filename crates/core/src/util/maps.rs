/// LaTeX symbol for a currency as used inline in chart labels.
/// "EUR" carries a trailing control space so the glyph does not glue to
/// the following token inside tikz nodes.
pub fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some(r"\$"),
        "EUR" => Some(r"\euro\"),
        _ => None,
    }
}

/// LaTeX symbol for a currency inside tabular cells.
pub fn currency_symbol_table(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some(r"\$"),
        "EUR" => Some(r"\euro"),
        _ => None,
    }
}

/// Escape the characters LaTeX treats specially in plain text fields.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str(r"\&"),
            '%' => out.push_str(r"\%"),
            '#' => out.push_str(r"\#"),
            '_' => out.push_str(r"\_"),
            _ => out.push(c),
        }
    }
    out
}
