//! OD letter synthesis.
//!
//! - `composer`: participant grouping, grammatical number, date phrase, text blocks
//! - `renderer`: A4 PDF layout with signature images and the approval mark

pub mod composer;
pub mod renderer;

pub use composer::{compose, LetterContent};
pub use renderer::{render, LetterImages};

use crate::configuration::InstitutionConfig;
use crate::domain::{OdRequest, Profile};
use crate::error_handling::types::LetterError;

/// Compose and render in one step. `approver` selects the approved variant.
pub fn generate(
    request: &OdRequest,
    institution: &InstitutionConfig,
    approver: Option<&Profile>,
    images: &LetterImages,
) -> Result<Vec<u8>, LetterError> {
    render(&compose(request, institution, approver), images)
}
