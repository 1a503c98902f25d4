use indexmap::IndexSet;

use crate::item::{BrowserItem, ItemKind, ItemKinds};

/// Name filter applied to the items of the folder view.
///
/// Each mask holds a single wildcard pattern such as `*.jpg` or
/// `budget201*.*`. Masks are stored upper-cased and matching is always
/// case-insensitive. The masks apply only to items whose kind is in
/// [`FilterSpec::kinds`]; every other item is shown.
///
/// Filtering is advisory for query-backed views (libraries, search results):
/// the engine does not consult the filter for those.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterSpec {
    masks: IndexSet<String>,
    kinds: ItemKinds,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            masks: IndexSet::new(),
            kinds: ItemKinds::FILE,
        }
    }
}

impl FilterSpec {
    /// Build a filter from masks and the kinds they apply to.
    ///
    /// Masks are upper-cased and otherwise kept as given, so a blank mask
    /// matches only items with a blank name. Duplicates are dropped while
    /// the order of first appearance is kept. Only an empty collection
    /// leaves the filter inactive.
    ///
    /// ```
    /// use explorer_browser::{FilterSpec, ItemKinds};
    /// let filter = FilterSpec::new(["*.doc*", "*.RTF", "*.DOC*"], ItemKinds::FILE);
    /// assert_eq!(filter.masks().collect::<Vec<_>>(), ["*.DOC*", "*.RTF"]);
    /// ```
    pub fn new<I, S>(masks: I, kinds: ItemKinds) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let masks = masks
            .into_iter()
            .map(|m| m.as_ref().to_uppercase())
            .collect();
        Self { masks, kinds }
    }

    /// Normalized masks in their original order.
    pub fn masks(&self) -> impl Iterator<Item = &str> + '_ {
        self.masks.iter().map(String::as_str)
    }

    /// Kinds the masks apply to.
    pub fn kinds(&self) -> ItemKinds {
        self.kinds
    }

    /// Whether any mask is configured. An inactive filter shows everything.
    pub fn is_active(&self) -> bool {
        !self.masks.is_empty()
    }

    /// Whether `item` passes the filter.
    ///
    /// `Unknown` items never pass an active filter: they cannot be
    /// classified, so the mask cannot be applied to them.
    pub fn matches(&self, item: &BrowserItem) -> bool {
        if !self.is_active() {
            return true;
        }
        if item.kind() == ItemKind::Unknown {
            return false;
        }
        if !self.kinds.contains_kind(item.kind()) {
            return true;
        }
        let name = item.match_name().to_uppercase();
        self.masks.iter().any(|mask| wildcard_match(mask, &name))
    }
}

/// `*` stands for any run of characters (including none) and `?` for exactly
/// one. Both sides are compared per `char`, so callers normalize case first.
pub(crate) fn wildcard_match(mask: &str, text: &str) -> bool {
    let mask: Vec<char> = mask.chars().collect();
    let text: Vec<char> = text.chars().collect();
    // mask position after the last `*`, and the text position it resumed at
    let mut resume: Option<(usize, usize)> = None;
    let (mut m, mut t) = (0, 0);

    while t < text.len() {
        match mask.get(m) {
            Some('*') => {
                m += 1;
                resume = Some((m, t));
            }
            Some(&c) if c == '?' || c == text[t] => {
                m += 1;
                t += 1;
            }
            _ => match resume {
                Some((after_star, from)) => {
                    m = after_star;
                    t = from + 1;
                    resume = Some((after_star, t));
                }
                None => return false,
            },
        }
    }
    mask[m..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ShellAttributes;

    fn file(name: &str) -> BrowserItem {
        BrowserItem::new(
            ShellAttributes::FILESYSTEM | ShellAttributes::STREAM,
            format!("/docs/{name}"),
            name,
        )
    }

    fn dir(name: &str) -> BrowserItem {
        BrowserItem::new(
            ShellAttributes::FILESYSTEM | ShellAttributes::FOLDER,
            format!("/docs/{name}"),
            name,
        )
    }

    fn other(name: &str) -> BrowserItem {
        BrowserItem::new(ShellAttributes::STREAM, "", name)
    }

    #[test]
    fn wildcard_basics() {
        assert!(wildcard_match("*.DOC", "A.DOC"));
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("BUDGET201?.*", "BUDGET2019.XLS"));
        assert!(!wildcard_match("BUDGET201?.*", "BUDGET20.XLS"));
        assert!(wildcard_match("*.DOC*", "A.DOCX"));
        assert!(!wildcard_match("*.DOC", "A.DOCX"));
        assert!(wildcard_match("A*B*C", "AXXBYYC"));
        assert!(!wildcard_match("A*B*C", "AXXBYY"));
    }

    #[test]
    fn wildcard_matches_non_ascii_per_character() {
        assert!(wildcard_match("Ö?.TXT", "ÖL.TXT"));
        assert!(!wildcard_match("?.TXT", "ÖL.TXT"));
    }

    #[test]
    fn matching_ignores_case() {
        let filter = FilterSpec::new(["*.DOC"], ItemKinds::FILE);
        assert!(filter.matches(&file("report.doc")));
        assert!(filter.matches(&file("REPORT.DOC")));
        assert!(filter.matches(&file("Report.Doc")));
        assert!(!filter.matches(&file("report.txt")));
    }

    #[test]
    fn lower_case_masks_are_normalized() {
        let filter = FilterSpec::new(["*.rtf"], ItemKinds::FILE);
        assert_eq!(filter.masks().collect::<Vec<_>>(), ["*.RTF"]);
        assert!(filter.matches(&file("Letter.RTF")));
    }

    #[test]
    fn blank_mask_is_an_active_filter_that_hides_named_files() {
        let filter = FilterSpec::new([""], ItemKinds::FILE);
        assert!(filter.is_active());
        assert_eq!(filter.masks().collect::<Vec<_>>(), [""]);
        assert!(!filter.matches(&file("a.doc")));
        assert!(filter.matches(&dir("d")));
    }

    #[test]
    fn masks_are_not_trimmed() {
        let filter = FilterSpec::new([" *.rtf"], ItemKinds::FILE);
        assert_eq!(filter.masks().collect::<Vec<_>>(), [" *.RTF"]);
        assert!(!filter.matches(&file("Letter.rtf")));
    }

    #[test]
    fn kinds_outside_the_set_always_pass() {
        let filter = FilterSpec::new(["*.DOC"], ItemKinds::FILE);
        assert!(filter.matches(&dir("subfolder")));
        assert!(filter.matches(&other("Control Panel")));
    }

    #[test]
    fn other_items_match_on_display_name() {
        let filter = FilterSpec::new(["*.TXT"], ItemKinds::OTHER);
        assert!(filter.matches(&other("notes.txt")));
        assert!(!filter.matches(&other("notes.md")));
        assert!(filter.matches(&file("report.doc")));
    }

    #[test]
    fn empty_filter_accepts_everything() {
        let filter = FilterSpec::new(Vec::<String>::new(), ItemKinds::all());
        assert!(!filter.is_active());
        for item in [file("a.doc"), dir("d"), other("x"), BrowserItem::default()] {
            assert!(filter.matches(&item));
        }
    }

    #[test]
    fn unknown_items_fail_an_active_filter() {
        let filter = FilterSpec::new(["*"], ItemKinds::all());
        assert!(!filter.matches(&BrowserItem::from_display_name("ghost")));
    }

    #[test]
    fn matching_is_deterministic() {
        let filter = FilterSpec::new(["*.DOC*", "*.RTF"], ItemKinds::FILE);
        for item in [file("a.doc"), file("b.txt"), file("c.rtf"), dir("d")] {
            assert_eq!(filter.matches(&item), filter.matches(&item));
        }
    }

    #[test]
    fn default_filter_targets_files_and_is_inactive() {
        let filter = FilterSpec::default();
        assert_eq!(filter.kinds(), ItemKinds::FILE);
        assert!(!filter.is_active());
    }
}
