//! Fixed reporting queries and their formatters
//!
//! The SQL here is written by us, never by the caller, so it skips the gate.

use crate::types::QueryResult;

pub const LIST_TABLES_SQL: &str = "\
SELECT table_name
FROM information_schema.tables
WHERE table_schema = 'public'
ORDER BY table_name";

pub const CREATIVE_CUSTOMERS_SQL: &str = "\
SELECT c.first_name, c.last_name,
       (SELECT SUM(amount) FROM payment p WHERE p.customer_id = c.customer_id) AS total_spent
FROM customer c
LIMIT 10";

pub const LOW_PERFORMING_CATEGORIES_SQL: &str = "\
SELECT c.name, COUNT(r.rental_id) AS total_rentals
FROM category c
JOIN film_category fc ON c.category_id = fc.category_id
JOIN inventory i ON fc.film_id = i.film_id
JOIN rental r ON i.inventory_id = r.inventory_id
GROUP BY c.name
ORDER BY total_rentals ASC
LIMIT 3";

/// Customer loyalty tier derived from total spend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Base,
    Middle,
    Top,
}

impl Tier {
    const TOP_THRESHOLD: f64 = 150.0;
    const MIDDLE_THRESHOLD: f64 = 100.0;

    pub fn from_spend(spent: f64) -> Self {
        if spent > Self::TOP_THRESHOLD {
            Tier::Top
        } else if spent > Self::MIDDLE_THRESHOLD {
            Tier::Middle
        } else {
            Tier::Base
        }
    }

    pub fn avatar(self) -> &'static str {
        match self {
            Tier::Top => "👑",
            Tier::Middle => "💎",
            Tier::Base => "👤",
        }
    }
}

/// `Tables found in Pagila: actor, address, ...`
pub fn format_tables(result: &QueryResult) -> String {
    let tables: Vec<&str> = result.column_values("table_name").flatten().collect();
    format!("Tables found in Pagila: {}", tables.join(", "))
}

/// Markdown directory with a tier avatar per customer
///
/// A missing or unparseable total counts as zero spend.
pub fn format_customer_directory(result: &QueryResult) -> String {
    let mut text = String::from(
        "### 👥 Customer Directory\n| Avatar | Name | Level |\n| :--- | :--- | :--- |\n",
    );

    let first = result.column_index("first_name");
    let last = result.column_index("last_name");
    let spent = result.column_index("total_spent");

    for row in &result.rows {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).and_then(|v| v.as_deref());
        let total = cell(spent)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(0.0);

        text.push_str(&format!(
            "| {} | {} {} | ${:.2} |\n",
            Tier::from_spend(total).avatar(),
            cell(first).unwrap_or_default(),
            cell(last).unwrap_or_default(),
            total
        ));
    }

    text
}

/// Advisory narrative naming the least rented categories
pub fn format_category_advice(result: &QueryResult) -> String {
    let categories: Vec<&str> = result.column_values("name").flatten().collect();

    format!(
        "🤖 **Business Analyst Report:**\n\
         I have detected that the categories {} have very little movement.\n\
         💡 **Suggestion:** We should run a 2-for-1 promotion on these categories \
         this weekend to free up inventory.",
        categories.join(", ")
    )
}
