use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Critical,
    High,
    Medium,
    Low,
}

impl Category {
    /// All categories, most urgent first.
    pub const ALL: [Category; 4] = [
        Category::Critical,
        Category::High,
        Category::Medium,
        Category::Low,
    ];

    /// Higher rank sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            Category::Critical => 4,
            Category::High => 3,
            Category::Medium => 2,
            Category::Low => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Critical => "critical",
            Category::High => "high",
            Category::Medium => "medium",
            Category::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Critical => "Critical",
            Category::High => "High",
            Category::Medium => "Medium",
            Category::Low => "Low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "critical" => Some(Category::Critical),
            "high" => Some(Category::High),
            "medium" => Some(Category::Medium),
            "low" => Some(Category::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scoring parameters and copy for one kind of issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub recommendation: &'static str,
    /// 1-10, how much fixing it helps
    pub impact: u8,
    /// 1-10, how much work the fix takes
    pub effort: u8,
    pub category: Category,
}

impl IssueDefinition {
    pub fn priority_score(&self) -> f64 {
        f64::from(self.impact) / f64::from(self.effort)
    }
}

/// Immutable, ordered set of issue definitions.
///
/// Built once and handed to the detector; the only source of scoring
/// weights.
#[derive(Debug, Clone)]
pub struct Catalog {
    issues: Vec<IssueDefinition>,
}

impl Catalog {
    pub fn new(issues: Vec<IssueDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for issue in &issues {
            if !seen.insert(issue.id) {
                return Err(CatalogError::DuplicateId(issue.id.to_string()));
            }
            for (field, score) in [("impact", issue.impact), ("effort", issue.effort)] {
                if !(1..=10).contains(&score) {
                    return Err(CatalogError::ScoreOutOfRange {
                        id: issue.id.to_string(),
                        field,
                        score,
                    });
                }
            }
        }
        Ok(Self { issues })
    }

    /// The built-in sixteen issue catalog.
    pub fn standard() -> Self {
        Self {
            issues: STANDARD_ISSUES.to_vec(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&IssueDefinition> {
        self.issues.iter().find(|issue| issue.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Declaration order, used as a stable tie-break when sorting.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.issues.iter().position(|issue| issue.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IssueDefinition> {
        self.issues.iter()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// One issue detected on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub issue_id: &'static str,
    pub url: String,
    pub category: Category,
    pub impact: u8,
    pub effort: u8,
    pub priority_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Finding {
    /// Scores are copied from the definition, never supplied by the caller.
    pub fn new(issue: &IssueDefinition, url: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            issue_id: issue.id,
            url: url.into(),
            category: issue.category,
            impact: issue.impact,
            effort: issue.effort,
            priority_score: issue.priority_score(),
            detail,
        }
    }
}

const STANDARD_ISSUES: [IssueDefinition; 16] = [
    // Critical
    IssueDefinition {
        id: "broken_links",
        title: "Broken Links (4xx)",
        description: "Pages returning client error status codes",
        recommendation: "Fix or redirect broken links to maintain user experience and link equity",
        impact: 10,
        effort: 5,
        category: Category::Critical,
    },
    IssueDefinition {
        id: "server_errors",
        title: "Server Errors (5xx)",
        description: "Pages returning server error status codes",
        recommendation: "Investigate server issues and fix the root cause to ensure page availability",
        impact: 10,
        effort: 6,
        category: Category::Critical,
    },
    IssueDefinition {
        id: "redirect_chains",
        title: "Redirect Chains",
        description: "URLs with multiple redirects in sequence",
        recommendation: "Reduce redirect chains to a single redirect to improve page speed and reduce crawl budget waste",
        impact: 9,
        effort: 4,
        category: Category::Critical,
    },
    IssueDefinition {
        id: "duplicate_titles",
        title: "Duplicate Page Titles",
        description: "Multiple pages using the same title",
        recommendation: "Create unique page titles to improve SEO and user experience",
        impact: 8,
        effort: 3,
        category: Category::Critical,
    },
    // High
    IssueDefinition {
        id: "missing_meta_descriptions",
        title: "Missing Meta Descriptions",
        description: "Pages without meta descriptions",
        recommendation: "Add compelling meta descriptions to improve click-through rates from search results",
        impact: 7,
        effort: 2,
        category: Category::High,
    },
    IssueDefinition {
        id: "missing_h1",
        title: "Missing H1 Tags",
        description: "Pages without H1 headings",
        recommendation: "Add H1 tags to all pages to improve content hierarchy and relevance signals",
        impact: 7,
        effort: 2,
        category: Category::High,
    },
    IssueDefinition {
        id: "duplicate_content",
        title: "Duplicate Content",
        description: "Pages whose content hash matches another page",
        recommendation: "Consolidate duplicate pages or point them at a canonical URL",
        impact: 8,
        effort: 6,
        category: Category::High,
    },
    IssueDefinition {
        id: "slow_pages",
        title: "Slow-Loading Pages",
        description: "Pages whose load time exceeds the threshold",
        recommendation: "Optimize page speed by reducing file sizes, implementing caching, and minimizing render-blocking resources",
        impact: 7,
        effort: 7,
        category: Category::High,
    },
    // Medium
    IssueDefinition {
        id: "title_too_long",
        title: "Page Titles Too Long",
        description: "Page titles longer than the configured limit",
        recommendation: "Shorten page titles to avoid truncation in search results",
        impact: 5,
        effort: 2,
        category: Category::Medium,
    },
    IssueDefinition {
        id: "description_too_long",
        title: "Meta Descriptions Too Long",
        description: "Meta descriptions longer than the configured limit",
        recommendation: "Shorten meta descriptions to avoid truncation in search results",
        impact: 5,
        effort: 2,
        category: Category::Medium,
    },
    IssueDefinition {
        id: "low_word_count",
        title: "Low Word Count",
        description: "Pages with thin content",
        recommendation: "Expand thin pages with useful content or merge them into stronger pages",
        impact: 6,
        effort: 5,
        category: Category::Medium,
    },
    IssueDefinition {
        id: "missing_alt_text",
        title: "Images Missing Alt Text",
        description: "Images without alternative text",
        recommendation: "Add descriptive alt text to all images to improve accessibility and image search visibility",
        impact: 5,
        effort: 4,
        category: Category::Medium,
    },
    // Low
    IssueDefinition {
        id: "multiple_h1",
        title: "Multiple H1 Tags",
        description: "Pages with more than one H1 heading",
        recommendation: "Use a single H1 tag per page to maintain clear content hierarchy",
        impact: 3,
        effort: 2,
        category: Category::Low,
    },
    IssueDefinition {
        id: "missing_meta_keywords",
        title: "Missing Meta Keywords",
        description: "Pages without a meta keywords tag",
        recommendation: "Add meta keywords where internal search or other tooling still relies on them",
        impact: 2,
        effort: 1,
        category: Category::Low,
    },
    IssueDefinition {
        id: "excessive_outlinks",
        title: "Excessive Outlinks",
        description: "Pages linking out more than the configured limit",
        recommendation: "Trim navigation and footer links so each page passes equity to the links that matter",
        impact: 3,
        effort: 4,
        category: Category::Low,
    },
    IssueDefinition {
        id: "low_text_html_ratio",
        title: "Low Text to HTML Ratio",
        description: "Pages where visible text is a small share of the HTML",
        recommendation: "Reduce markup bloat and inline scripts, or add meaningful body copy",
        impact: 3,
        effort: 5,
        category: Category::Low,
    },
];
