use tdvq::error::TdvqError;
use tdvq::limit::{is_catalog_query, rewrite, validate_strategies, LimitStrategy};

// --- validate_strategies ---

#[test]
fn test_fetch_is_accepted() {
    assert_eq!(validate_strategies("fetch").unwrap(), vec![LimitStrategy::Fetch]);
}

#[test]
fn test_entries_are_trimmed_and_lowercased() {
    assert_eq!(
        validate_strategies("  FETCH , ,Fetch").unwrap(),
        vec![LimitStrategy::Fetch, LimitStrategy::Fetch]
    );
}

#[test]
fn test_empty_list_is_no_strategies() {
    assert!(validate_strategies("").unwrap().is_empty());
    assert!(validate_strategies(" , ,").unwrap().is_empty());
}

#[test]
fn test_unknown_strategy_is_config_error() {
    let err = validate_strategies("fetch,top,limit").unwrap_err();
    match err {
        TdvqError::Configuration { message } => {
            assert!(message.contains("'top'"), "Got: {}", message);
            assert!(!message.contains("'limit'"), "only the first unknown entry is named: {}", message);
            assert!(message.contains("allowed: fetch"), "Got: {}", message);
        }
        other => panic!("Expected Configuration error, got {:?}", other),
    }
}

#[test]
fn test_validation_is_idempotent() {
    assert_eq!(
        validate_strategies("fetch").unwrap(),
        validate_strategies("fetch").unwrap()
    );
    assert_eq!(
        validate_strategies("first").unwrap_err().to_string(),
        validate_strategies("first").unwrap_err().to_string()
    );
}

// --- rewrite ---

#[test]
fn test_no_strategies_leaves_query_unchanged() {
    let sql = "SELECT * FROM orders";
    for cap in [0, 1, 11, 10_001] {
        assert_eq!(rewrite(sql, &[], cap), sql);
    }
}

#[test]
fn test_fetch_clause_appended() {
    let rewritten = rewrite("SELECT * FROM T", &[LimitStrategy::Fetch], 3);
    assert!(rewritten.starts_with("SELECT * FROM T"), "Got: {}", rewritten);
    assert!(rewritten.ends_with("FETCH FIRST 3 ROWS ONLY"), "Got: {}", rewritten);
}

#[test]
fn test_trailing_semicolon_handled() {
    let rewritten = rewrite("SELECT id FROM T;", &[LimitStrategy::Fetch], 11);
    assert!(rewritten.ends_with("FETCH FIRST 11 ROWS ONLY"), "Got: {}", rewritten);
}

#[test]
fn test_smaller_existing_fetch_kept() {
    let sql = "SELECT a FROM t ORDER BY a FETCH FIRST 5 ROWS ONLY";
    assert_eq!(rewrite(sql, &[LimitStrategy::Fetch], 11), sql);
}

#[test]
fn test_larger_existing_fetch_lowered() {
    let rewritten = rewrite(
        "SELECT a FROM t FETCH FIRST 100 ROWS ONLY",
        &[LimitStrategy::Fetch],
        11,
    );
    assert!(rewritten.contains("FETCH FIRST 11 ROWS ONLY"), "Got: {}", rewritten);
    assert!(!rewritten.contains("100"), "Got: {}", rewritten);
}

#[test]
fn test_every_select_statement_bounded() {
    let rewritten = rewrite("SELECT 1; SELECT 2", &[LimitStrategy::Fetch], 4);
    assert_eq!(rewritten.matches("FETCH FIRST 4 ROWS ONLY").count(), 2, "Got: {}", rewritten);
}

#[test]
fn test_non_query_statements_untouched() {
    for sql in [
        "INSERT INTO t VALUES (1)",
        "CREATE TABLE t (a INT)",
        "DELETE FROM t WHERE a = 1",
    ] {
        assert_eq!(rewrite(sql, &[LimitStrategy::Fetch], 11), sql);
    }
}

#[test]
fn test_single_row_fetch_kept() {
    for sql in [
        "SELECT a FROM t FETCH FIRST ROW ONLY",
        "SELECT a FROM t FETCH NEXT 1 ROW ONLY",
    ] {
        assert_eq!(rewrite(sql, &[LimitStrategy::Fetch], 11), sql);
    }
}

#[test]
fn test_percent_fetch_kept() {
    let sql = "SELECT a FROM t FETCH FIRST 50 PERCENT ROWS ONLY";
    assert_eq!(rewrite(sql, &[LimitStrategy::Fetch], 11), sql);
}

#[test]
fn test_smaller_existing_limit_kept() {
    let sql = "SELECT a FROM t LIMIT 5";
    assert_eq!(rewrite(sql, &[LimitStrategy::Fetch], 11), sql);
}

#[test]
fn test_larger_existing_limit_lowered_in_place() {
    let rewritten = rewrite("SELECT a FROM t LIMIT 500", &[LimitStrategy::Fetch], 11);
    assert_eq!(rewritten, "SELECT a FROM t LIMIT 11");
    assert!(!rewritten.contains("FETCH"), "Got: {}", rewritten);
}

#[test]
fn test_non_literal_limit_kept() {
    let sql = "SELECT a FROM t LIMIT 2 + 3";
    assert_eq!(rewrite(sql, &[LimitStrategy::Fetch], 11), sql);
}

#[test]
fn test_resource_path_query_bounded_by_tokens() {
    let rewritten = rewrite(
        "SELECT * FROM /shared/examples/ds_orders/orders",
        &[LimitStrategy::Fetch],
        11,
    );
    assert_eq!(
        rewritten,
        "SELECT * FROM /shared/examples/ds_orders/orders FETCH FIRST 11 ROWS ONLY"
    );
}

#[test]
fn test_resource_path_query_keeps_trailing_semicolon_and_comment() {
    assert_eq!(
        rewrite("SELECT o.id FROM /shared/ds/orders o;", &[LimitStrategy::Fetch], 3),
        "SELECT o.id FROM /shared/ds/orders o FETCH FIRST 3 ROWS ONLY;"
    );
    assert_eq!(
        rewrite(
            "SELECT name FROM /shared/ds/t WHERE name = 'it''s' -- latest",
            &[LimitStrategy::Fetch],
            3
        ),
        "SELECT name FROM /shared/ds/t WHERE name = 'it''s' FETCH FIRST 3 ROWS ONLY -- latest"
    );
}

#[test]
fn test_resource_path_query_with_own_limit_untouched() {
    for sql in [
        "SELECT * FROM /shared/ds/orders FETCH FIRST 5 ROWS ONLY",
        "SELECT * FROM /shared/ds/orders LIMIT 5",
    ] {
        assert_eq!(rewrite(sql, &[LimitStrategy::Fetch], 11), sql);
    }
}

#[test]
fn test_unparseable_non_select_untouched() {
    for sql in [
        "INSERT INTO /shared/ds/orders VALUES (1)",
        "SELECT * FROM /shared/a; SELECT * FROM /shared/b",
    ] {
        assert_eq!(rewrite(sql, &[LimitStrategy::Fetch], 11), sql);
    }
}

#[test]
fn test_catalog_query_never_rewritten() {
    let sql = "SELECT * FROM ALL_COLUMNS WHERE PARENT_PATH LIKE '/services/databases/system/%'";
    assert!(is_catalog_query(sql));
    assert_eq!(rewrite(sql, &[LimitStrategy::Fetch], 2), sql);
}

#[test]
fn test_catalog_match_is_case_insensitive() {
    assert!(is_catalog_query("select * from /SERVICES/DATABASES/SYSTEM/ALL_TABLES"));
    assert!(!is_catalog_query("SELECT * FROM services.system_tables"));
}
