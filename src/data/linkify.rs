//! URL extraction from assistant replies
//!
//! Single-pass scan that splits a message into plain text and link segments
//! so the chat panel can render clickable links. Percent-encoded quote
//! sequences (`%22`) toggle a "quoted, spaces allowed" sub-state, so URLs
//! containing encoded spaces are not truncated at the first space.

/// A piece of a scanned message.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Link(String),
}

/// Punctuation that ends a sentence rather than a URL.
const TRAILING_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

/// Split `text` into text and link segments.
pub fn scan_links(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let rest = &text[i..];
        let at_scheme = rest.starts_with("http://") || rest.starts_with("https://");
        let at_word_start = i == 0 || {
            // The scheme must start a word, not sit inside one.
            let prev = text[..i].chars().next_back();
            prev.is_none_or(|c| c.is_whitespace() || c == '(' || c == '<')
        };

        if !(at_scheme && at_word_start) {
            i += text[i..].chars().next().map_or(1, char::len_utf8);
            continue;
        }

        // Consume the URL: stop at whitespace unless inside a %22 quote.
        let url_start = i;
        let mut quoted = false;
        let mut j = i;
        while j < bytes.len() {
            let rest = &text[j..];
            if rest.starts_with("%22") {
                quoted = !quoted;
                j += 3;
                continue;
            }
            let Some(c) = rest.chars().next() else {
                break;
            };
            if c.is_whitespace() && !quoted {
                break;
            }
            j += c.len_utf8();
        }

        // Trailing sentence punctuation belongs to the text, not the URL.
        let mut url_end = j;
        while url_end > url_start {
            let Some(last) = text[url_start..url_end].chars().next_back() else {
                break;
            };
            if TRAILING_PUNCT.contains(&last) {
                url_end -= last.len_utf8();
            } else {
                break;
            }
        }

        if url_end > url_start {
            if plain_start < url_start {
                segments.push(Segment::Text(text[plain_start..url_start].to_string()));
            }
            segments.push(Segment::Link(text[url_start..url_end].to_string()));
            plain_start = url_end;
        }
        i = j.max(url_end).max(url_start + 1);
    }

    if plain_start < text.len() {
        segments.push(Segment::Text(text[plain_start..].to_string()));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_segment() {
        assert_eq!(
            scan_links("no links here"),
            vec![Segment::Text("no links here".into())]
        );
    }

    #[test]
    fn extracts_simple_url() {
        assert_eq!(
            scan_links("see https://ala.org.au for details"),
            vec![
                Segment::Text("see ".into()),
                Segment::Link("https://ala.org.au".into()),
                Segment::Text(" for details".into()),
            ]
        );
    }

    #[test]
    fn quoted_encoded_space_does_not_split_the_url() {
        let segments = scan_links("See https://x.test/q?n=%22a b%22 now");
        assert_eq!(
            segments,
            vec![
                Segment::Text("See ".into()),
                Segment::Link("https://x.test/q?n=%22a b%22".into()),
                Segment::Text(" now".into()),
            ]
        );
    }

    #[test]
    fn trailing_punctuation_stays_text() {
        assert_eq!(
            scan_links("Go to https://ala.org.au."),
            vec![
                Segment::Text("Go to ".into()),
                Segment::Link("https://ala.org.au".into()),
                Segment::Text(".".into()),
            ]
        );
    }

    #[test]
    fn url_at_end_of_text() {
        assert_eq!(
            scan_links("https://ala.org.au/search?q=%22grey kangaroo%22"),
            vec![Segment::Link(
                "https://ala.org.au/search?q=%22grey kangaroo%22".into()
            )]
        );
    }

    #[test]
    fn scheme_inside_a_word_is_not_a_link() {
        assert_eq!(
            scan_links("xhttps://not-a-link"),
            vec![Segment::Text("xhttps://not-a-link".into())]
        );
    }

    #[test]
    fn multiple_links() {
        let segments = scan_links("a https://one.test b http://two.test c");
        assert_eq!(
            segments,
            vec![
                Segment::Text("a ".into()),
                Segment::Link("https://one.test".into()),
                Segment::Text(" b ".into()),
                Segment::Link("http://two.test".into()),
                Segment::Text(" c".into()),
            ]
        );
    }
}
