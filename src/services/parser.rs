use lazy_static::lazy_static;
use regex::Regex;

use crate::models::ChannelRecord;

lazy_static! {
    /// Trailing comma-delimited display title of an #EXTINF line.
    static ref TRAILING_TITLE: Regex = Regex::new(r",(.+)").unwrap();
    static ref TVG_NAME: Regex = Regex::new(r#"(?i)tvg-name="([^"]+)""#).unwrap();
    static ref GROUP_TITLE: Regex = Regex::new(r#"(?i)group-title="([^"]+)""#).unwrap();
    static ref TVG_LOGO: Regex = Regex::new(r#"(?i)tvg-logo="([^"]+)""#).unwrap();
    /// Collapse runs of whitespace into a single space.
    static ref MULTI_SPACE: Regex = Regex::new(r"\s{2,}").unwrap();
}

/// Placeholder title when an #EXTINF line carries no usable name.
pub const UNKNOWN_CHANNEL: &str = "Canal Desconhecido";

/// Trim and collapse internal whitespace.
fn normalize_text(text: &str) -> String {
    MULTI_SPACE.replace_all(text.trim(), " ").to_string()
}

/// Extract the display title from an #EXTINF line: trailing comma text first,
/// tvg-name attribute as fallback.
fn extract_title(line: &str) -> Option<String> {
    if let Some(caps) = TRAILING_TITLE.captures(line) {
        let title = caps.get(1).map(|m| m.as_str().trim())?;
        if !title.is_empty() {
            return Some(title.to_string());
        }
    }
    TVG_NAME
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Build a pending record from an #EXTINF metadata line. Missing attributes
/// default to the empty string; a missing title defaults to
/// [`UNKNOWN_CHANNEL`]. The URL is filled in by the following stream line.
fn parse_metadata_line(line: &str) -> ChannelRecord {
    let title = extract_title(line).unwrap_or_else(|| UNKNOWN_CHANNEL.to_string());
    let group_raw = GROUP_TITLE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let logo = TVG_LOGO
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    ChannelRecord {
        title: normalize_text(&title),
        url: String::new(),
        group_raw: normalize_text(&group_raw),
        logo,
    }
}

/// Tokenize raw M3U text into an ordered sequence of channel records.
///
/// A metadata line opens a pending record; the next non-comment, non-blank
/// line supplies the stream URL and completes it. A malformed or interleaved
/// metadata line only discards the pending record, never the whole parse.
/// Output order matches input line order.
pub fn parse_playlist(content: &str) -> Vec<ChannelRecord> {
    let mut records = Vec::new();
    let mut pending: Option<ChannelRecord> = None;
    let mut dropped = 0usize;

    for (line_no, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();

        if line.starts_with("#EXTINF:") {
            if pending.take().is_some() {
                // Metadata line without a URL in between: the earlier record
                // never completes.
                dropped += 1;
                tracing::warn!(line = line_no, "registro sem URL descartado");
            }
            pending = Some(parse_metadata_line(line));
        } else if !line.is_empty() && !line.starts_with('#') {
            if let Some(mut record) = pending.take() {
                record.url = line.to_string();
                records.push(record);
            }
        }
        // Blank lines and other comments (#EXTM3U included) are skipped and
        // leave any pending record open.
    }

    if pending.is_some() {
        dropped += 1;
    }
    if dropped > 0 {
        tracing::warn!(dropped, "registros incompletos descartados no parse");
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_metadata() {
        let content = "#EXTINF:-1 tvg-name=\"Globo HD\" tvg-logo=\"http://logo/globo.png\" group-title=\"Canais|Abertos\",Globo HD\nhttp://stream/globo.ts\n";
        let records = parse_playlist(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Globo HD");
        assert_eq!(records[0].url, "http://stream/globo.ts");
        assert_eq!(records[0].group_raw, "Canais|Abertos");
        assert_eq!(records[0].logo, "http://logo/globo.png");
    }

    #[test]
    fn test_parse_defaults_when_attributes_missing() {
        let content = "#EXTINF:-1,Filme Qualquer\nhttp://stream/filme.mp4\n";
        let records = parse_playlist(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Filme Qualquer");
        assert_eq!(records[0].group_raw, "");
        assert_eq!(records[0].logo, "");
    }

    #[test]
    fn test_parse_title_falls_back_to_tvg_name() {
        let content = "#EXTINF:-1 tvg-name=\"Canal X\"\nhttp://stream/x.ts\n";
        let records = parse_playlist(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Canal X");
    }

    #[test]
    fn test_parse_unknown_title_placeholder() {
        let content = "#EXTINF:-1\nhttp://stream/y.ts\n";
        let records = parse_playlist(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, UNKNOWN_CHANNEL);
    }

    #[test]
    fn test_blank_lines_do_not_complete_a_record() {
        let content = "#EXTINF:-1,Canal A\n\n\nhttp://stream/a.ts\n";
        let records = parse_playlist(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "http://stream/a.ts");
    }

    #[test]
    fn test_comments_are_skipped() {
        let content = "#EXTM3U\n#EXTINF:-1,Canal A\n#EXTVLCOPT:network-caching=1000\nhttp://stream/a.ts\n";
        let records = parse_playlist(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Canal A");
    }

    #[test]
    fn test_bad_line_never_aborts_the_parse() {
        // Two metadata lines back to back: the first pending record is
        // discarded, the rest of the file still parses.
        let content = "#EXTINF:-1,Perdido\n#EXTINF:-1,Canal B\nhttp://stream/b.ts\n#EXTINF:-1,Canal C\nhttp://stream/c.ts\n";
        let records = parse_playlist(content);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Canal B");
        assert_eq!(records[1].title, "Canal C");
    }

    #[test]
    fn test_url_without_pending_metadata_is_ignored() {
        let content = "http://stream/orfao.ts\n#EXTINF:-1,Canal A\nhttp://stream/a.ts\n";
        let records = parse_playlist(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Canal A");
    }

    #[test]
    fn test_output_preserves_input_order() {
        let content = "#EXTINF:-1,Um\nhttp://s/1\n#EXTINF:-1,Dois\nhttp://s/2\n#EXTINF:-1,Tres\nhttp://s/3\n";
        let titles: Vec<String> = parse_playlist(content).into_iter().map(|r| r.title).collect();

        assert_eq!(titles, vec!["Um", "Dois", "Tres"]);
    }

    #[test]
    fn test_whitespace_normalization() {
        let content = "#EXTINF:-1 group-title=\"Filmes  |  Acao\",  Matrix   Reloaded \nhttp://s/m\n";
        let records = parse_playlist(content);

        assert_eq!(records[0].title, "Matrix Reloaded");
        assert_eq!(records[0].group_raw, "Filmes | Acao");
    }
}
