use serde::Serialize;

pub const DEFAULT_TOKEN_LIMIT: usize = 5000;
pub const DEFAULT_CHARS_PER_TOKEN: usize = 3;
pub const DEFAULT_SAFETY_FACTOR: f64 = 0.8;

const OVER_BUDGET_ERROR: &str = "Result exceeds token budget";

/// Response-size budget for tool output, measured in estimated tokens.
///
/// The estimate is `ceil(chars / chars_per_token)`, a fixed approximation rather
/// than a real tokenizer. `safety_factor` scales the suggested row cap down to
/// leave headroom for estimation error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenBudget {
    pub limit: usize,
    pub chars_per_token: usize,
    pub safety_factor: f64,
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self {
            limit: DEFAULT_TOKEN_LIMIT,
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
            safety_factor: DEFAULT_SAFETY_FACTOR,
        }
    }
}

impl TokenBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token.max(1))
    }

    /// Row cap expected to bring `rows` rows back under the limit.
    ///
    /// `None` when the row count is zero; otherwise never below 1.
    pub fn suggested_limit(&self, rows: usize, estimated_tokens: usize) -> Option<usize> {
        if rows == 0 || estimated_tokens == 0 {
            return None;
        }
        let ratio = self.limit as f64 / estimated_tokens as f64;
        let suggested = (rows as f64 * ratio * self.safety_factor).floor() as usize;
        Some(suggested.max(1))
    }

    /// Returns `payload` untouched when it fits, or a diagnostic in its place.
    pub fn enforce(&self, payload: String, row_count: Option<usize>, context: &str) -> BudgetedResponse {
        let estimated_tokens = self.estimate(&payload);
        if estimated_tokens <= self.limit {
            return BudgetedResponse::WithinBudget(payload);
        }

        let suggested_limit = row_count.and_then(|rows| self.suggested_limit(rows, estimated_tokens));
        tracing::warn!(
            context,
            estimated_tokens,
            token_limit = self.limit,
            rows = ?row_count,
            suggested = ?suggested_limit,
            "tool output over token budget"
        );

        BudgetedResponse::OverBudget(BudgetDiagnostic {
            error: OVER_BUDGET_ERROR.to_string(),
            context: context.to_string(),
            estimated_tokens,
            token_limit: self.limit,
            rows_returned: row_count,
            suggested_limit,
            suggestion: suggestion_text(suggested_limit),
        })
    }
}

fn suggestion_text(suggested_limit: Option<usize>) -> String {
    let limit_hint = match suggested_limit {
        Some(limit) => format!(" (try LIMIT {})", limit),
        None => String::new(),
    };

    [
        "The query result is too large. Please adjust your query:".to_string(),
        format!("  • Reduce the LIMIT value{}", limit_hint),
        "  • Filter rows with WHERE clauses to reduce result size".to_string(),
        "  • Select only necessary columns instead of SELECT *".to_string(),
        "  • Use aggregation (COUNT, SUM, AVG) instead of retrieving raw rows".to_string(),
    ]
    .join("\n")
}

/// Overflow report returned in place of an oversized payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetDiagnostic {
    pub error: String,
    pub context: String,
    pub estimated_tokens: usize,
    pub token_limit: usize,
    pub rows_returned: Option<usize>,
    pub suggested_limit: Option<usize>,
    pub suggestion: String,
}

impl BudgetDiagnostic {
    pub fn to_json(&self) -> String {
        // strings and integers only; serialization cannot fail
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| format!("{}: {} ({})", self.error, self.context, e))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BudgetedResponse {
    WithinBudget(String),
    OverBudget(BudgetDiagnostic),
}

impl BudgetedResponse {
    pub fn into_text(self) -> String {
        match self {
            BudgetedResponse::WithinBudget(payload) => payload,
            BudgetedResponse::OverBudget(diagnostic) => diagnostic.to_json(),
        }
    }
}
