use serde::{Deserialize, Serialize};
use std::fmt;

/// Crawler tabs that sfaudit knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExportKind {
    InternalAll,
    InternalHtml,
    ResponseCodes,
    PageTitles,
    MetaDescription,
    Images,
    RedirectChains,
    AllInlinks,
    PageSpeed,
    H1,
}

impl ExportKind {
    /// Every kind, in file-name matching order.
    pub const ALL: [ExportKind; 10] = [
        ExportKind::InternalAll,
        ExportKind::InternalHtml,
        ExportKind::ResponseCodes,
        ExportKind::PageTitles,
        ExportKind::MetaDescription,
        ExportKind::Images,
        ExportKind::RedirectChains,
        ExportKind::AllInlinks,
        ExportKind::PageSpeed,
        // "h1" is short enough to appear inside other names, so it goes last
        ExportKind::H1,
    ];

    /// Tab name as the crawler labels it (`--export-tabs` value).
    pub fn name(&self) -> &'static str {
        match self {
            ExportKind::InternalAll => "Internal:All",
            ExportKind::InternalHtml => "Internal:HTML",
            ExportKind::ResponseCodes => "Response Codes",
            ExportKind::PageTitles => "Page Titles",
            ExportKind::MetaDescription => "Meta Description",
            ExportKind::Images => "Images",
            ExportKind::RedirectChains => "Redirect Chains",
            ExportKind::AllInlinks => "All Inlinks",
            ExportKind::PageSpeed => "Page Speed",
            ExportKind::H1 => "H1",
        }
    }

    /// Stem the crawler uses when it writes the tab to disk.
    pub fn file_stem(&self) -> &'static str {
        match self {
            ExportKind::InternalAll => "internal_all",
            ExportKind::InternalHtml => "internal_html",
            ExportKind::ResponseCodes => "response_codes",
            ExportKind::PageTitles => "page_titles",
            ExportKind::MetaDescription => "meta_description",
            ExportKind::Images => "images",
            ExportKind::RedirectChains => "redirect_chains",
            ExportKind::AllInlinks => "all_inlinks",
            ExportKind::PageSpeed => "page_speed",
            ExportKind::H1 => "h1",
        }
    }

    /// Map a CSV file name to the export it holds.
    ///
    /// Matching is a case-insensitive substring test against each kind's
    /// file stem, so `example.com_internal_all (1).csv` still resolves.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.to_lowercase();
        if !lower.ends_with(".csv") {
            return None;
        }

        Self::ALL
            .iter()
            .copied()
            .find(|kind| lower.contains(kind.file_stem()))
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().to_lowercase() == wanted)
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
