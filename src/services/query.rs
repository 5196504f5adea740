use std::collections::BTreeMap;

use crate::models::{CatalogTree, Domain, MediaEntry, SeriesEntry};

/// Fixed page size for the presentation layer.
pub const ITEMS_PER_PAGE: usize = 20;

/// Pseudo-subcategory selecting every subcategory of a domain.
pub const ALL_SUBCATEGORIES: &str = "all";

/// A filtered view over one domain. Movies and linear channels share the
/// flat entry shape; series carry their season maps for the episode picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Media(Vec<MediaEntry>),
    Series(Vec<SeriesEntry>),
}

impl QueryResult {
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Media(items) => items.len(),
            QueryResult::Series(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sorted subcategory names for a domain.
pub fn list_subcategories(tree: &CatalogTree, domain: Domain) -> Vec<String> {
    // BTreeMap already iterates keys in sorted order.
    match domain {
        Domain::Filmes => tree.filmes.keys().cloned().collect(),
        Domain::Series => tree.series.keys().cloned().collect(),
        Domain::Tv => tree.tv.keys().cloned().collect(),
    }
}

/// Merge series maps by series key with a season-wise union.
///
/// The first-seen entry wins the display name, logo and any season both
/// entries carry; seasons missing from the accumulated entry are added.
/// Idempotent under re-merge, and episode lists never lose members.
pub fn merge_series<'a, I>(subcategories: I) -> BTreeMap<String, SeriesEntry>
where
    I: IntoIterator<Item = &'a BTreeMap<String, SeriesEntry>>,
{
    let mut merged: BTreeMap<String, SeriesEntry> = BTreeMap::new();
    for subcat in subcategories {
        for (key, series) in subcat {
            match merged.get_mut(key) {
                None => {
                    merged.insert(key.clone(), series.clone());
                }
                Some(existing) => {
                    tracing::debug!(
                        series = key.as_str(),
                        "série duplicada entre subcategorias, mesclando temporadas"
                    );
                    for (season, episodes) in &series.seasons {
                        existing
                            .seasons
                            .entry(season.clone())
                            .or_insert_with(|| episodes.clone());
                    }
                }
            }
        }
    }
    merged
}

fn matches(text: &str, query_lower: &str) -> bool {
    query_lower.is_empty() || text.to_lowercase().contains(query_lower)
}

fn collect_media(
    data: &BTreeMap<String, Vec<MediaEntry>>,
    subcategory: &str,
    query_lower: &str,
) -> Vec<MediaEntry> {
    let mut items: Vec<MediaEntry> = Vec::new();
    if subcategory == ALL_SUBCATEGORIES {
        for entries in data.values() {
            items.extend(entries.iter().cloned());
        }
    } else if let Some(entries) = data.get(subcategory) {
        items.extend(entries.iter().cloned());
    }
    items.retain(|item| matches(&item.title, query_lower));
    items
}

/// Filter one domain by subcategory and case-insensitive substring query.
///
/// `"all"` concatenates subcategory lists (filmes/tv) or merges the series
/// maps season-wise; the empty query matches everything.
pub fn filter_entries(
    tree: &CatalogTree,
    domain: Domain,
    subcategory: &str,
    query: &str,
) -> QueryResult {
    let query_lower = query.to_lowercase();
    match domain {
        Domain::Filmes => QueryResult::Media(collect_media(&tree.filmes, subcategory, &query_lower)),
        Domain::Tv => QueryResult::Media(collect_media(&tree.tv, subcategory, &query_lower)),
        Domain::Series => {
            let merged = if subcategory == ALL_SUBCATEGORIES {
                merge_series(tree.series.values())
            } else {
                tree.series
                    .get(subcategory)
                    .cloned()
                    .unwrap_or_default()
            };
            let mut items: Vec<SeriesEntry> = merged.into_values().collect();
            items.retain(|series| matches(&series.display_name, &query_lower));
            QueryResult::Series(items)
        }
    }
}

/// Number of pages needed for `len` items at the fixed page size.
pub fn total_pages(len: usize) -> usize {
    len.div_ceil(ITEMS_PER_PAGE)
}

/// One-based page slice. Page numbers outside `1..=total_pages` yield an
/// empty slice; the presentation layer disables navigation at the bounds.
pub fn page<T>(items: &[T], number: usize) -> &[T] {
    if number == 0 {
        return &[];
    }
    let start = (number - 1) * ITEMS_PER_PAGE;
    if start >= items.len() {
        return &[];
    }
    let end = (start + ITEMS_PER_PAGE).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str) -> MediaEntry {
        MediaEntry {
            title: title.to_string(),
            url: format!("http://x/{}", title),
            logo: String::new(),
        }
    }

    fn sample_tree() -> CatalogTree {
        let mut tree = CatalogTree::default();
        tree.push_movie("Acao", entry("Matrix"));
        tree.push_movie("Acao", entry("John Wick"));
        tree.push_movie("Drama", entry("Clube Da Luta"));
        tree.push_channel("Abertos", entry("Globo"));
        tree.push_channel("Esportes", entry("Sportv"));
        tree.push_episode("Drama", "Breaking Bad", "1", entry("Episodio 1"));
        tree.push_episode("Drama", "Breaking Bad", "1", entry("Episodio 2"));
        tree.push_episode("Suspense", "Breaking Bad", "2", entry("Episodio 1"));
        tree.push_episode("Suspense", "Dark", "1", entry("Episodio 1"));
        tree
    }

    #[test]
    fn test_list_subcategories_sorted() {
        let tree = sample_tree();
        assert_eq!(list_subcategories(&tree, Domain::Filmes), vec!["Acao", "Drama"]);
        assert_eq!(
            list_subcategories(&tree, Domain::Tv),
            vec!["Abertos", "Esportes"]
        );
        assert_eq!(
            list_subcategories(&tree, Domain::Series),
            vec!["Drama", "Suspense"]
        );
    }

    #[test]
    fn test_filter_all_concatenates_movie_subcategories() {
        let tree = sample_tree();
        let result = filter_entries(&tree, Domain::Filmes, ALL_SUBCATEGORIES, "");
        let per_subcat: usize = tree.filmes.values().map(|v| v.len()).sum();
        assert_eq!(result.len(), per_subcat);
    }

    #[test]
    fn test_filter_all_dedups_series_by_key() {
        let tree = sample_tree();
        let result = filter_entries(&tree, Domain::Series, ALL_SUBCATEGORIES, "");
        // "breaking bad" appears under two subcategories and counts once.
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_series_merge_is_season_wise_union() {
        let tree = sample_tree();
        let merged = merge_series(tree.series.values());
        let bb = &merged["breaking bad"];

        assert_eq!(bb.seasons.len(), 2);
        assert_eq!(bb.seasons["1"].len(), 2);
        assert_eq!(bb.seasons["2"].len(), 1);
    }

    #[test]
    fn test_series_merge_is_idempotent() {
        let tree = sample_tree();
        let once = merge_series(tree.series.values());
        let twice = merge_series([&once].into_iter());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_by_subcategory() {
        let tree = sample_tree();
        let result = filter_entries(&tree, Domain::Filmes, "Acao", "");
        assert_eq!(result.len(), 2);

        let missing = filter_entries(&tree, Domain::Filmes, "Terror", "");
        assert!(missing.is_empty());
    }

    #[test]
    fn test_text_filter_is_case_insensitive_substring() {
        let tree = sample_tree();
        let result = filter_entries(&tree, Domain::Filmes, ALL_SUBCATEGORIES, "mAtR");
        match result {
            QueryResult::Media(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].title, "Matrix");
            }
            QueryResult::Series(_) => panic!("expected media result"),
        }

        let series = filter_entries(&tree, Domain::Series, ALL_SUBCATEGORIES, "BREAKING");
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_pagination_reproduces_items_exactly() {
        let items: Vec<usize> = (0..53).collect();
        let pages = total_pages(items.len());
        assert_eq!(pages, 3);

        let mut rebuilt = Vec::new();
        for n in 1..=pages {
            rebuilt.extend_from_slice(page(&items, n));
        }
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn test_pagination_bounds_are_noops() {
        let items: Vec<usize> = (0..30).collect();
        assert!(page(&items, 0).is_empty());
        assert!(page(&items, 3).is_empty());
        assert_eq!(page(&items, 2).len(), 10);
    }

    #[test]
    fn test_total_pages_edge_cases() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(20), 1);
        assert_eq!(total_pages(21), 2);
    }
}
