use lazy_static::lazy_static;
use lru::LruCache;
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::models::{CatalogTree, ChannelRecord, MediaEntry};

// Memo for episode extraction; large feeds repeat the same titles heavily.
lazy_static! {
    static ref EPISODE_MEMO: Mutex<LruCache<String, ExtractedEpisode>> =
        Mutex::new(LruCache::new(NonZeroUsize::new(10_000).unwrap()));

    // ============ TITLE SIGNALS ============
    static ref EPISODE_PATTERN: Regex =
        Regex::new(r"(?i)(s\d{1,2}e\d{1,2})|(temporada\s*\d+)|(episodio\s*\d+)").unwrap();
    static ref LINEAR_CHANNEL_PATTERN: Regex =
        Regex::new(r"(?i)(24h|canal|mix|ao vivo|live|4k|fhd|hd|sd|channel|tv|plus)").unwrap();

    // ============ EPISODE EXTRACTORS ============
    static ref SEASON_EPISODE: Regex = Regex::new(r"^(.*?)\s*[Ss](\d{1,2})\s*[Ee](\d{1,2})").unwrap();
    static ref SEASON_KEYWORD_TAIL: Regex = Regex::new(r"(?i)(temporada|episodio).*").unwrap();

    // ============ GROUP CLEANUP ============
    static ref DECORATIVE_GLYPHS: Regex = Regex::new(r"[◆]").unwrap();
}

/// Fallback subcategory for unmatched or irrecoverable records.
pub const FALLBACK_SUBCATEGORY: &str = "Outros";

/// Placeholder for empty titles after normalization.
pub const UNTITLED: &str = "Sem Título";

/// Group hint split into its primary domain marker and subcategory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupHint {
    /// Lowercased main segment, matched against domain keywords.
    pub main: String,
    /// Subcategory segment, `"Outros"` when absent.
    pub sub: String,
}

/// Strip decorative glyphs and split the group hint on `|`.
pub fn parse_group(raw: &str) -> GroupHint {
    let clean = DECORATIVE_GLYPHS.replace_all(raw, "");
    let mut parts = clean.split('|').map(str::trim);
    let main = parts.next().unwrap_or("").to_lowercase();
    let sub = parts
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_SUBCATEGORY)
        .to_string();
    GroupHint { main, sub }
}

/// Uppercase the first letter of each word; empty titles become the
/// placeholder label.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return UNTITLED.to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    let mut at_word_start = true;
    for c in trimmed.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Series name, season key and episode title pulled out of a lowercased
/// episode title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEpisode {
    pub series_name: String,
    pub season: String,
    pub episode_title: String,
}

/// Extract series name / season / episode title from a title matching an
/// episode pattern.
///
/// The `SxxEyy` form yields `("Nome", "x", "Episodio y")` with leading zeros
/// stripped from the numbers; otherwise the season/episode keywords are cut
/// off the title, the season defaults to `"1"` and the episode title is the
/// full normalized title.
pub fn extract_episode(title_lower: &str) -> ExtractedEpisode {
    {
        let mut memo = EPISODE_MEMO.lock().unwrap();
        if let Some(cached) = memo.get(title_lower) {
            return cached.clone();
        }
    }

    let extracted = if let Some(caps) = SEASON_EPISODE.captures(title_lower) {
        let series_name = normalize_title(caps.get(1).map(|m| m.as_str()).unwrap_or(""));
        let season = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(1)
            .to_string();
        let episode = caps
            .get(3)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(1);
        ExtractedEpisode {
            series_name,
            season,
            episode_title: format!("Episodio {}", episode),
        }
    } else {
        let stripped = SEASON_KEYWORD_TAIL.replace(title_lower, "");
        ExtractedEpisode {
            series_name: normalize_title(stripped.trim()),
            season: "1".to_string(),
            episode_title: normalize_title(title_lower),
        }
    };

    let mut memo = EPISODE_MEMO.lock().unwrap();
    memo.put(title_lower.to_string(), extracted.clone());
    extracted
}

/// Where one record lands in the catalog tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Channel {
        sub: String,
    },
    Movie {
        sub: String,
    },
    Episode {
        sub: String,
        series_name: String,
        season: String,
        episode_title: String,
    },
}

/// Precomputed signals for one record, shared by every rule.
struct RecordContext<'a> {
    record: &'a ChannelRecord,
    title_lower: String,
    hint: GroupHint,
    has_episode_pattern: bool,
    looks_like_linear_channel: bool,
}

impl<'a> RecordContext<'a> {
    fn new(record: &'a ChannelRecord) -> Self {
        let title_lower = record.title.to_lowercase();
        let hint = parse_group(&record.group_raw);
        let has_episode_pattern = EPISODE_PATTERN.is_match(&title_lower);
        let looks_like_linear_channel = LINEAR_CHANNEL_PATTERN.is_match(&title_lower);
        Self {
            record,
            title_lower,
            hint,
            has_episode_pattern,
            looks_like_linear_channel,
        }
    }
}

/// One entry of the ordered rule table.
struct Rule {
    name: &'static str,
    applies: fn(&RecordContext) -> bool,
    route: fn(&RecordContext) -> Placement,
}

/// Heuristic rule table, evaluated top to bottom; the first matching rule
/// decides the placement, no match falls back to `tv["Outros"]`.
static RULES: &[Rule] = &[
    Rule {
        name: "canal-ou-linear",
        applies: |ctx| is_channel_main(&ctx.hint.main) || ctx.looks_like_linear_channel,
        route: |ctx| Placement::Channel {
            sub: ctx.hint.sub.clone(),
        },
    },
    Rule {
        name: "serie-com-episodio",
        applies: |ctx| {
            is_series_main(&ctx.hint.main)
                && ctx.has_episode_pattern
                && !ctx.looks_like_linear_channel
        },
        route: |ctx| {
            let extracted = extract_episode(&ctx.title_lower);
            Placement::Episode {
                sub: ctx.hint.sub.clone(),
                series_name: extracted.series_name,
                season: extracted.season,
                episode_title: extracted.episode_title,
            }
        },
    },
    Rule {
        // Series group without episode numbering reads as a linear or
        // irregular entry.
        name: "serie-irregular",
        applies: |ctx| is_series_main(&ctx.hint.main),
        route: |ctx| Placement::Channel {
            sub: ctx.hint.sub.clone(),
        },
    },
    Rule {
        name: "filme",
        applies: |ctx| {
            is_movie_main(&ctx.hint.main)
                && !ctx.looks_like_linear_channel
                && ctx.title_lower.chars().count() > 5
        },
        route: |ctx| Placement::Movie {
            sub: ctx.hint.sub.clone(),
        },
    },
    Rule {
        name: "filme-irregular",
        applies: |ctx| is_movie_main(&ctx.hint.main),
        route: |ctx| Placement::Channel {
            sub: ctx.hint.sub.clone(),
        },
    },
];

fn is_channel_main(main: &str) -> bool {
    main.contains("canais") || main.contains("canal")
}

fn is_series_main(main: &str) -> bool {
    main.contains("series") || main.contains("série")
}

fn is_movie_main(main: &str) -> bool {
    main.contains("filme")
}

/// Decide the placement for one record by walking the rule table.
///
/// Records without a stream URL violate the tree invariant and are routed to
/// `tv["Outros"]` up front instead of being dropped.
pub fn route(record: &ChannelRecord) -> Placement {
    if record.url.trim().is_empty() {
        tracing::warn!(title = %record.title, "registro sem URL roteado para fallback");
        return Placement::Channel {
            sub: FALLBACK_SUBCATEGORY.to_string(),
        };
    }

    let ctx = RecordContext::new(record);
    match RULES.iter().find(|rule| (rule.applies)(&ctx)) {
        Some(rule) => {
            tracing::trace!(rule = rule.name, title = %ctx.record.title, "regra aplicada");
            (rule.route)(&ctx)
        }
        None => Placement::Channel {
            sub: FALLBACK_SUBCATEGORY.to_string(),
        },
    }
}

/// Apply one record's placement into the accumulating tree.
pub fn classify_into(tree: &mut CatalogTree, record: ChannelRecord) {
    let placement = route(&record);
    let entry = MediaEntry {
        title: normalize_title(&record.title),
        url: record.url,
        logo: record.logo,
    };
    match placement {
        Placement::Channel { sub } => tree.push_channel(&sub, entry),
        Placement::Movie { sub } => tree.push_movie(&sub, entry),
        Placement::Episode {
            sub,
            series_name,
            season,
            episode_title,
        } => {
            let episode = MediaEntry {
                title: episode_title,
                ..entry
            };
            tree.push_episode(&sub, &series_name, &season, episode);
        }
    }
}

/// Classify a whole parse batch into a fresh tree.
pub fn classify_all(records: Vec<ChannelRecord>) -> CatalogTree {
    let mut tree = CatalogTree::default();
    for record in records {
        classify_into(&mut tree, record);
    }
    tree
}
