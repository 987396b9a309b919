use crate::errors::CoreError;
use crate::util::maps::escape_latex;
use super::{Section, SectionContext};

/// Opens each holding's part of the document with its display name.
pub struct SectionHeading;

impl Section for SectionHeading {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn generate(&self, ctx: &SectionContext<'_>) -> Result<String, CoreError> {
        let profile = &ctx.ticker.profile;
        let name = if profile.long_name.is_empty() {
            profile.symbol.clone()
        } else {
            profile.long_name.clone()
        };

        Ok(format!(
            "\\section*{{\\textcolor{{mainColour}}{{ {} }}}}\n",
            escape_latex(&name)
        ))
    }

    fn anchors_sidebar(&self) -> bool {
        true
    }
}
