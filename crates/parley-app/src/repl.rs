//! Line-oriented input handling and transcript rendering.

use std::path::{Path, PathBuf};

use parley_chat::{ConversationSession, ImageHandle};
use parley_core::error::Result;

pub const IMAGE_USAGE: &str = "usage: /image <path> <question>";

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain message for the router.
    Say(String),
    /// Question about an image file.
    Image { path: PathBuf, question: String },
    /// Leave the chat.
    Quit,
    /// Nothing to do (blank line).
    Skip,
    /// Unusable input, with a hint for the user.
    Invalid(String),
}

/// Parse a line typed at the prompt.
pub fn parse_input(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Command::Skip;
    }

    let trimmed = line.trim_start();
    if trimmed == "/quit" || trimmed == "/exit" {
        return Command::Quit;
    }

    if let Some(rest) = trimmed.strip_prefix("/image") {
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return Command::Say(line.to_string());
        }
        let rest = rest.trim_start();
        let (path, question) = match rest.split_once(char::is_whitespace) {
            Some((path, question)) => (path, question.trim()),
            None => (rest, ""),
        };
        if path.is_empty() || question.is_empty() {
            return Command::Invalid(IMAGE_USAGE.to_string());
        }
        return Command::Image {
            path: PathBuf::from(path),
            question: question.to_string(),
        };
    }

    Command::Say(line.to_string())
}

/// Read an image file into an opaque handle named after the file.
pub fn load_image(path: &Path) -> Result<ImageHandle> {
    let bytes = std::fs::read(path)?;
    let mut image = ImageHandle::new(bytes);
    if let Some(name) = path.file_name() {
        image = image.with_name(name.to_string_lossy());
    }
    Ok(image)
}

/// Render the retained transcript, one `label: text` line per turn.
pub fn render_transcript(session: &ConversationSession) -> String {
    session
        .iter()
        .map(|turn| format!("{}: {}", turn.label(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_chat::Turn;
    use std::io::Write;

    #[test]
    fn test_parse_plain_message() {
        assert_eq!(
            parse_input("weather in Paris\n"),
            Command::Say("weather in Paris".to_string())
        );
    }

    #[test]
    fn test_parse_blank_is_skip() {
        assert_eq!(parse_input(""), Command::Skip);
        assert_eq!(parse_input("   \r\n"), Command::Skip);
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse_input("/quit"), Command::Quit);
        assert_eq!(parse_input("  /exit"), Command::Quit);
    }

    #[test]
    fn test_parse_image_command() {
        assert_eq!(
            parse_input("/image cat.png what color is this?"),
            Command::Image {
                path: PathBuf::from("cat.png"),
                question: "what color is this?".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_image_without_question() {
        assert_eq!(
            parse_input("/image cat.png"),
            Command::Invalid(IMAGE_USAGE.to_string())
        );
        assert_eq!(parse_input("/image"), Command::Invalid(IMAGE_USAGE.to_string()));
    }

    #[test]
    fn test_parse_image_prefix_inside_word_is_message() {
        assert_eq!(
            parse_input("/imagery is nice"),
            Command::Say("/imagery is nice".to_string())
        );
    }

    #[test]
    fn test_load_image_reads_bytes_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF]).unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.bytes(), &[0xFF, 0xD8, 0xFF]);
        assert_eq!(image.name(), Some("photo.jpg"));
    }

    #[test]
    fn test_load_image_missing_file() {
        assert!(load_image(Path::new("/nonexistent/photo.jpg")).is_err());
    }

    #[test]
    fn test_render_transcript() {
        let mut session = ConversationSession::new(8);
        session.append_pair(Turn::user("hello"), Turn::bot("Hi there!"));
        assert_eq!(render_transcript(&session), "User: hello\nBot: Hi there!");
    }

    #[test]
    fn test_render_empty_transcript() {
        assert_eq!(render_transcript(&ConversationSession::new(8)), "");
    }
}
