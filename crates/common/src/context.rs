use chrono::{DateTime, Utc};
use tracing::Span;
use uuid::Uuid;

/// State that lives for exactly one trading cycle.
///
/// Created by the driver when a cycle starts and dropped when it ends. Every
/// log line emitted while the cycle's span is entered carries its
/// `transaction_id`, which ties the calls of one cycle together.
#[derive(Debug, Clone)]
pub struct CycleContext {
    pub transaction_id: String,
    pub started_at: DateTime<Utc>,
    span: Span,
}

impl CycleContext {
    pub fn new() -> Self {
        let transaction_id = Uuid::new_v4().simple().to_string();
        let span = tracing::info_span!("cycle", transaction_id = %transaction_id);
        Self {
            transaction_id,
            started_at: Utc::now(),
            span,
        }
    }

    /// The tracing span for this cycle. Instrument the cycle's future with it.
    pub fn span(&self) -> Span {
        self.span.clone()
    }

    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}

impl Default for CycleContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Masks a secret for logging, keeping just enough to tell two keys apart.
///
/// Empty stays empty, one character becomes `*`, up to four characters keep
/// the first one, longer values keep the first two and the last one.
pub fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    match chars.len() {
        0 => String::new(),
        1 => "*".to_string(),
        n if n <= 4 => format!("{}{}", chars[0], "*".repeat(n - 1)),
        n => format!(
            "{}{}{}{}",
            chars[0],
            chars[1],
            "*".repeat(n - 3),
            chars[n - 1]
        ),
    }
}
