//! Parameter types for Pagila MCP tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RunSelectQueryParams {
    #[schemars(
        description = "A single read-only SELECT statement. One trailing ';' is allowed; \
                       write keywords (DROP, DELETE, UPDATE, TRUNCATE, ALTER, GRANT, INSERT) \
                       are refused anywhere in the text, including inside identifiers."
    )]
    pub query: String,
}
