use url::Url;

/// Watch page URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

fn is_video_id(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extract the video id from a YouTube URL or accept a bare 11-character id.
///
/// Handles `watch?v=`, `youtu.be/`, `/embed/`, `/shorts/` and `/v/` forms.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.len() == 11 && is_video_id(input) {
        return Some(input.to_string());
    }

    let parsed = Url::parse(input).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let host = parsed.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    let id = match host {
        "youtu.be" => parsed.path_segments()?.next()?.to_string(),
        "youtube.com" | "music.youtube.com" => {
            if let Some((_, v)) = parsed.query_pairs().find(|(key, _)| key == "v") {
                v.into_owned()
            } else {
                let mut segments = parsed.path_segments()?;
                match segments.next()? {
                    "embed" | "shorts" | "v" | "live" => segments.next()?.to_string(),
                    _ => return None,
                }
            }
        }
        _ => return None,
    };

    is_video_id(&id).then_some(id)
}

/// Sanitize filename for safe filesystem usage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Default file name for a downloaded transcript
pub fn transcript_filename(video_id: &str) -> String {
    format!("{}_transcript.txt", sanitize_filename(video_id))
}

/// Format seconds as `M:SS` or `H:MM:SS`
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Check if the current environment has required tools
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available("yt-dlp").await {
        missing.push("yt-dlp - required for fetching YouTube captions".to_string());
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .kill_on_drop(true)
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let id = Some("dQw4w9WgXcQ".to_string());
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), id);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?t=10&v=dQw4w9WgXcQ"), id);
        assert_eq!(extract_video_id("https://m.youtube.com/watch?v=dQw4w9WgXcQ"), id);
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=3"), id);
        assert_eq!(extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"), id);
        assert_eq!(extract_video_id("https://youtube.com/shorts/dQw4w9WgXcQ"), id);
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), id);
    }

    #[test]
    fn test_extract_video_id_rejects_garbage() {
        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/feed/trending"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v="), None);
        assert_eq!(extract_video_id("ftp://youtube.com/watch?v=dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Hello World!"), "Hello World_");
        assert_eq!(sanitize_filename("test/file?name"), "test_file_name");
        assert_eq!(sanitize_filename("  spaced  "), "spaced");
    }

    #[test]
    fn test_transcript_filename() {
        assert_eq!(transcript_filename("abc-123_X"), "abc-123_X_transcript.txt");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(5.4), "0:05");
        assert_eq!(format_timestamp(90.0), "1:30");
        assert_eq!(format_timestamp(3661.0), "1:01:01");
    }

    #[tokio::test]
    async fn test_missing_command_is_unavailable() {
        assert!(!check_command_available("tubescript-no-such-command").await);
    }
}
