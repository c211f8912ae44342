//! Query gate - safety layer for caller-supplied SQL
//!
//! Decides whether a raw query may reach the database. The checks are plain
//! text scans (prefix, substring, separator position), not a SQL parser, so
//! they over-block: a column named `updated_at` trips the `UPDATE` check.

use std::fmt;

use crate::config::SecurityConfig;

/// Statement separator that must not appear before the final character
const STATEMENT_SEPARATOR: char = ';';

/// Why the gate refused a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Query does not start with SELECT; carries the leading word found instead
    NotSelect(String),
    /// Query contains a forbidden keyword somewhere in its text
    ForbiddenKeyword(String),
    /// Query contains a statement separator before its final character
    MultiStatement,
}

impl Rejection {
    /// Reason text written to the security alert log
    pub fn alert_reason(&self) -> String {
        match self {
            Rejection::NotSelect(found) if found.is_empty() => {
                "UNAUTHORIZED COMMAND (did not start with SELECT)".to_string()
            }
            Rejection::NotSelect(found) => {
                format!("UNAUTHORIZED COMMAND (did not start with SELECT): {}", found)
            }
            Rejection::ForbiddenKeyword(word) => format!("FORBIDDEN KEYWORD DETECTED: {}", word),
            Rejection::MultiStatement => "MULTI-STATEMENT ATTEMPT (injection)".to_string(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotSelect(found) if found.is_empty() => {
                write!(f, "Only SELECT queries are allowed.")
            }
            Rejection::NotSelect(found) => {
                write!(f, "Only SELECT queries are allowed, got '{}'.", found)
            }
            Rejection::ForbiddenKeyword(word) => write!(f, "Use of '{}' is forbidden.", word),
            Rejection::MultiStatement => write!(f, "Multiple statements are not allowed."),
        }
    }
}

/// A query that passed the gate
///
/// Only [`QueryGate::validate`] can build one, so holding an `AllowedQuery`
/// proves the text went through every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedQuery(String);

impl AllowedQuery {
    /// The query text exactly as submitted
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of running a raw query through the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Allowed(AllowedQuery),
    Rejected(Rejection),
}

/// Read-only query gate
#[derive(Debug, Clone)]
pub struct QueryGate {
    forbidden: Vec<String>,
}

impl QueryGate {
    /// Create a gate from the security config
    ///
    /// Keywords are compared against uppercased query text, so they are
    /// uppercased here once.
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            forbidden: config
                .forbidden_keywords
                .iter()
                .map(|w| w.trim().to_uppercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Forbidden keywords in scan order
    #[cfg(test)]
    fn forbidden_keywords(&self) -> &[String] {
        &self.forbidden
    }

    /// Check a raw query
    ///
    /// Checks run in a fixed order and stop at the first violation:
    /// statement type, forbidden keywords, then stacked statements.
    pub fn validate(&self, raw: &str) -> ValidationOutcome {
        let normalized = raw.trim().to_uppercase();

        if !normalized.starts_with("SELECT") {
            return ValidationOutcome::Rejected(Rejection::NotSelect(leading_word(&normalized)));
        }

        if let Some(word) = self.forbidden.iter().find(|w| normalized.contains(w.as_str())) {
            return ValidationOutcome::Rejected(Rejection::ForbiddenKeyword(word.clone()));
        }

        if has_inner_separator(raw) {
            return ValidationOutcome::Rejected(Rejection::MultiStatement);
        }

        ValidationOutcome::Allowed(AllowedQuery(raw.to_string()))
    }
}

/// First run of word characters, used to name the refused command
fn leading_word(normalized: &str) -> String {
    normalized
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or_default()
        .to_string()
}

/// True when a separator appears anywhere but the last character of the
/// trimmed text
fn has_inner_separator(raw: &str) -> bool {
    let trimmed = raw.trim();
    let body = match trimmed.char_indices().last() {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    };
    body.contains(STATEMENT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> QueryGate {
        QueryGate::new(&SecurityConfig::default())
    }

    fn rejection(query: &str) -> Option<Rejection> {
        match gate().validate(query) {
            ValidationOutcome::Allowed(_) => None,
            ValidationOutcome::Rejected(r) => Some(r),
        }
    }

    #[test]
    fn test_non_select_rejected() {
        for (query, found) in [
            ("", ""),
            ("   ", ""),
            ("DROP TABLE customer;", "DROP"),
            ("insert into actor values (1)", "INSERT"),
            ("WITH x AS (SELECT 1) SELECT * FROM x", "WITH"),
            ("EXPLAIN SELECT 1", "EXPLAIN"),
            ("  show tables", "SHOW"),
            ("(SELECT 1)", ""),
        ] {
            assert_eq!(
                rejection(query),
                Some(Rejection::NotSelect(found.to_string())),
                "query: {:?}",
                query
            );
        }
    }

    #[test]
    fn test_not_select_messages_name_the_command() {
        let r = Rejection::NotSelect("DROP".to_string());
        assert_eq!(r.to_string(), "Only SELECT queries are allowed, got 'DROP'.");
        assert!(r.alert_reason().ends_with(": DROP"));

        let r = Rejection::NotSelect(String::new());
        assert_eq!(r.to_string(), "Only SELECT queries are allowed.");
    }

    #[test]
    fn test_select_prefix_is_case_insensitive() {
        assert_eq!(rejection("select 1"), None);
        assert_eq!(rejection("  SeLeCt 1  "), None);
        assert_eq!(rejection("\n\tSELECT first_name FROM customer"), None);
    }

    #[test]
    fn test_forbidden_keywords_rejected() {
        assert_eq!(
            rejection("SELECT 1; DROP TABLE customer"),
            Some(Rejection::ForbiddenKeyword("DROP".to_string()))
        );
        assert_eq!(
            rejection("select * from payment where delete_flag"),
            Some(Rejection::ForbiddenKeyword("DELETE".to_string()))
        );
        assert_eq!(
            rejection("SELECT grant_id FROM x"),
            Some(Rejection::ForbiddenKeyword("GRANT".to_string()))
        );
    }

    #[test]
    fn test_forbidden_keyword_inside_identifier_still_rejected() {
        assert_eq!(
            rejection("SELECT last_update FROM film"),
            Some(Rejection::ForbiddenKeyword("UPDATE".to_string()))
        );
        assert_eq!(
            rejection("SELECT 'please insert coin'"),
            Some(Rejection::ForbiddenKeyword("INSERT".to_string()))
        );
    }

    #[test]
    fn test_first_forbidden_keyword_in_list_order_is_reported() {
        // ALTER comes before INSERT in the scan order regardless of position in the query
        assert_eq!(
            rejection("SELECT insert_alter FROM t"),
            Some(Rejection::ForbiddenKeyword("ALTER".to_string()))
        );
    }

    #[test]
    fn test_keyword_check_runs_before_multi_statement_check() {
        assert_eq!(
            rejection("SELECT * FROM customer; DELETE FROM customer"),
            Some(Rejection::ForbiddenKeyword("DELETE".to_string()))
        );
    }

    #[test]
    fn test_stacked_statements_rejected() {
        assert_eq!(
            rejection("SELECT * FROM customer; SELECT * FROM payment"),
            Some(Rejection::MultiStatement)
        );
        assert_eq!(rejection("SELECT 1;;"), Some(Rejection::MultiStatement));
        assert_eq!(rejection("SELECT ';' AS semi"), Some(Rejection::MultiStatement));
    }

    #[test]
    fn test_single_trailing_separator_allowed() {
        assert_eq!(rejection("SELECT first_name FROM customer LIMIT 1;"), None);
        assert_eq!(rejection("SELECT 1;   "), None);
    }

    #[test]
    fn test_bare_select_allowed() {
        assert_eq!(rejection("SELECT"), None);
    }

    #[test]
    fn test_allowed_query_is_passed_through_unmodified() {
        let raw = "  select first_name from customer limit 1;  ";
        match gate().validate(raw) {
            ValidationOutcome::Allowed(q) => assert_eq!(q.as_str(), raw),
            other => panic!("expected allowed, got {:?}", other),
        }
    }

    #[test]
    fn test_multibyte_last_character() {
        assert_eq!(rejection("SELECT 'ñ'"), None);
        assert_eq!(rejection("SELECT ';ñ'"), Some(Rejection::MultiStatement));
    }

    #[test]
    fn test_custom_keyword_list() {
        let config = SecurityConfig {
            forbidden_keywords: vec!["pg_sleep".to_string(), " ".to_string()],
            ..Default::default()
        };
        let gate = QueryGate::new(&config);
        assert_eq!(gate.forbidden_keywords(), ["PG_SLEEP".to_string()]);
        assert_eq!(
            gate.validate("SELECT pg_sleep(10)"),
            ValidationOutcome::Rejected(Rejection::ForbiddenKeyword("PG_SLEEP".to_string()))
        );
        assert!(matches!(
            gate.validate("SELECT 1 FROM film WHERE last_update IS NULL"),
            ValidationOutcome::Allowed(_)
        ));
    }

    #[test]
    fn test_rejection_messages_name_the_keyword() {
        let r = Rejection::ForbiddenKeyword("DROP".to_string());
        assert!(r.to_string().contains("DROP"));
        assert!(r.alert_reason().contains("DROP"));
    }
}
