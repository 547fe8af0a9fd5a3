//! Landmarks command handler.

use anyhow::Result;

use wayfinder_lib::LANDMARKS;

use crate::output::{render_landmarks, OutputFormat};

/// Print the built-in landmarks.
pub fn handle_landmarks(format: OutputFormat) -> Result<()> {
    render_landmarks(&LANDMARKS, format)
}
