use crate::errors::CoreError;
use super::{Section, SectionContext};

/// Horizontal separator across the full text width.
pub struct FullWidthRule;

impl Section for FullWidthRule {
    fn name(&self) -> &'static str {
        "full-width-rule"
    }

    fn generate(&self, _ctx: &SectionContext<'_>) -> Result<String, CoreError> {
        Ok(r"\noindent{\color{black}\rule{\textwidth}{1pt}}\par".to_string())
    }
}

/// Page break between holdings; labels the page so the class can tell
/// the final page apart.
pub struct NewPage;

impl Section for NewPage {
    fn name(&self) -> &'static str {
        "new-page"
    }

    fn generate(&self, _ctx: &SectionContext<'_>) -> Result<String, CoreError> {
        Ok("\\zlabel{LastPage}\n\\newpage\n".to_string())
    }
}
