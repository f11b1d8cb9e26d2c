// Tests for the issue catalog and findings

use sfaudit_core::data::{Catalog, Category, Finding, IssueDefinition};
use sfaudit_core::error::CatalogError;
use std::collections::HashSet;

fn issue(id: &'static str, impact: u8, effort: u8) -> IssueDefinition {
    IssueDefinition {
        id,
        title: "Test Issue",
        description: "desc",
        recommendation: "fix it",
        impact,
        effort,
        category: Category::Medium,
    }
}

// ============================================================================
// Category Tests
// ============================================================================

#[test]
fn test_category_rank_order() {
    assert!(Category::Critical.rank() > Category::High.rank());
    assert!(Category::High.rank() > Category::Medium.rank());
    assert!(Category::Medium.rank() > Category::Low.rank());
}

#[test]
fn test_category_from_str() {
    assert_eq!(Category::from_str("critical"), Some(Category::Critical));
    assert_eq!(Category::from_str("HIGH"), Some(Category::High));
    assert_eq!(Category::from_str("Medium"), Some(Category::Medium));
    assert_eq!(Category::from_str("low"), Some(Category::Low));
    assert_eq!(Category::from_str("urgent"), None);
}

#[test]
fn test_category_serializes_lowercase() {
    let json = serde_json::to_string(&Category::Critical).unwrap();
    assert_eq!(json, "\"critical\"");
    assert_eq!(Category::High.to_string(), "high");
}

// ============================================================================
// Standard Catalog Tests
// ============================================================================

#[test]
fn test_standard_catalog_size() {
    let catalog = Catalog::standard();
    assert_eq!(catalog.len(), 16);
    assert!(!catalog.is_empty());
}

#[test]
fn test_standard_catalog_is_valid() {
    let catalog = Catalog::standard();
    let issues: Vec<IssueDefinition> = catalog.iter().cloned().collect();

    // must pass the same checks as a user-built catalog
    assert!(Catalog::new(issues).is_ok());
}

#[test]
fn test_standard_catalog_ids_unique() {
    let catalog = Catalog::standard();
    let ids: HashSet<&str> = catalog.iter().map(|i| i.id).collect();
    assert_eq!(ids.len(), catalog.len());
}

#[test]
fn test_standard_catalog_scores() {
    let catalog = Catalog::standard();

    let broken = catalog.get("broken_links").unwrap();
    assert_eq!(broken.category, Category::Critical);
    assert_eq!(broken.impact, 10);
    assert_eq!(broken.effort, 5);
    assert_eq!(broken.priority_score(), 2.0);

    let keywords = catalog.get("missing_meta_keywords").unwrap();
    assert_eq!(keywords.category, Category::Low);
}

#[test]
fn test_standard_catalog_category_counts() {
    let catalog = Catalog::standard();
    let count = |c: Category| catalog.iter().filter(|i| i.category == c).count();

    for category in Category::ALL {
        assert_eq!(count(category), 4, "{}", category);
    }
}

#[test]
fn test_catalog_position_follows_declaration() {
    let catalog = Catalog::standard();
    assert_eq!(catalog.position("broken_links"), Some(0));
    assert_eq!(catalog.position("server_errors"), Some(1));
    assert_eq!(catalog.position("not_an_issue"), None);
    assert!(!catalog.contains("not_an_issue"));
}

// ============================================================================
// Catalog Validation Tests
// ============================================================================

#[test]
fn test_catalog_rejects_duplicate_ids() {
    let result = Catalog::new(vec![issue("a", 5, 5), issue("a", 6, 6)]);
    assert_eq!(result.unwrap_err(), CatalogError::DuplicateId("a".to_string()));
}

#[test]
fn test_catalog_rejects_out_of_range_scores() {
    let result = Catalog::new(vec![issue("a", 0, 5)]);
    assert_eq!(
        result.unwrap_err(),
        CatalogError::ScoreOutOfRange {
            id: "a".to_string(),
            field: "impact",
            score: 0,
        }
    );

    let result = Catalog::new(vec![issue("b", 5, 11)]);
    assert!(matches!(
        result,
        Err(CatalogError::ScoreOutOfRange { field: "effort", score: 11, .. })
    ));
}

#[test]
fn test_catalog_accepts_bounds() {
    let catalog = Catalog::new(vec![issue("a", 1, 10), issue("b", 10, 1)]).unwrap();
    assert_eq!(catalog.len(), 2);
}

// ============================================================================
// Finding Tests
// ============================================================================

#[test]
fn test_finding_copies_scores_from_definition() {
    let definition = issue("thin", 7, 2);
    let finding = Finding::new(&definition, "https://a.test/", Some("detail".to_string()));

    assert_eq!(finding.issue_id, "thin");
    assert_eq!(finding.category, Category::Medium);
    assert_eq!(finding.impact, 7);
    assert_eq!(finding.effort, 2);
    assert_eq!(finding.priority_score, 3.5);
    assert_eq!(finding.detail.as_deref(), Some("detail"));
}

#[test]
fn test_finding_serialization_omits_empty_detail() {
    let definition = issue("thin", 7, 2);
    let finding = Finding::new(&definition, "https://a.test/", None);
    let json = serde_json::to_value(&finding).unwrap();

    assert_eq!(json["issue_id"], "thin");
    assert_eq!(json["category"], "medium");
    assert!(json.get("detail").is_none());
}
