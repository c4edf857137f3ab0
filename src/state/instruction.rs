/// Instruction templates sent alongside the photo
///
/// Both templates pin the 3:4 aspect ratio.

/// Fixed instruction for the automatic first edit
pub const INITIAL_ID_PHOTO: &str = "Convert this into a professional ID photo suitable for a resume. \
The background should be a solid, neutral light gray. Ensure the person is centered. \
Perform subtle enhancements like removing minor skin blemishes and improving lighting for a natural, clean look. \
Do not change the person's facial features, expression or hair. \
Maintain a 3:4 aspect ratio.";

/// Quick modifications offered under the prompt field
pub const PRESET_PROMPTS: [&str; 3] = [
    "Change background to blue",
    "Make me smile slightly",
    "Change to a professional business attire",
];

/// Wrap a user modification in the follow-up template
pub fn user_modification(text: &str) -> String {
    format!(
        "Using the original photo, generate a professional ID photo. \
Apply the following modification: \"{}\". Maintain a 3:4 aspect ratio.",
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_keep_aspect_ratio() {
        assert!(INITIAL_ID_PHOTO.contains("3:4 aspect ratio"));

        let prompt = user_modification("make background blue");
        assert!(prompt.contains("\"make background blue\""));
        assert!(prompt.contains("3:4 aspect ratio"));
        assert_ne!(prompt, INITIAL_ID_PHOTO);
    }
}
