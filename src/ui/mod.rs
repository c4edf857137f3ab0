/// Presentation layer
///
/// Pure functions from session state to widgets:
/// - Landing screen (input.rs)
/// - Webcam capture card (webcam.rs)
/// - Editor screen with prompt and actions (editor.rs)
/// - Image slot with loading overlay (panel.rs)

pub mod editor;
pub mod input;
pub mod panel;
pub mod webcam;
