use crate::models::{Announcement, EMOJI_ANNOUNCE, EMOJI_SEARCH};

/// Body for one new announcement: fixed header line, blank line,
/// then title and link. One message per announcement, no batching.
pub fn announcement_body(announcement: &Announcement) -> String {
    format!(
        "{} New administrative job posting in Canarias:\n\n{}\n{}",
        EMOJI_ANNOUNCE, announcement.title, announcement.link
    )
}

/// Body for the optional "still alive" message sent when a pass
/// finds nothing new.
pub fn heartbeat_body() -> String {
    format!(
        "{} No new postings today in Canarias. The monitor is alive.",
        EMOJI_SEARCH
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_announcement_body_layout() {
        let announcement = Announcement {
            title: "Auxiliar Administrativo, Grupo C1".to_string(),
            link: "https://www.gobiernodecanarias.org/boc/2024/anuncio1".to_string(),
        };

        assert_eq!(
            announcement_body(&announcement),
            "📢 New administrative job posting in Canarias:\n\n\
             Auxiliar Administrativo, Grupo C1\n\
             https://www.gobiernodecanarias.org/boc/2024/anuncio1"
        );
    }

    #[test]
    fn test_heartbeat_body_is_fixed() {
        assert_eq!(heartbeat_body(), heartbeat_body());
        assert!(heartbeat_body().contains("No new postings"));
    }
}
