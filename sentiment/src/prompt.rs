//! Rating prompt for manager statements

/// Rating guideline shown before every statement.
pub const RATING_GUIDELINES: &str = "\
## Task:

Please read each text carefully and rate the overall sentiment of the manager's statement as positive or negative.
Your rating should reflect the manager’s expressed tone, not your judgment of the match.

## Rating Scale:

| **Score** | **Meaning** |
|----------|------------|
| **2** | Strongly positive sentiment (clear optimism, satisfaction, praise). |
| **1** | Mildly positive sentiment (generally positive, slight reservations). |
| **0** | Neutral or unclear sentiment. |
| **-1** | Mildly negative sentiment (general disappointment, frustration). |
| **-2** | Strongly negative sentiment (clear criticism, significant disappointment). |

### Final Notes:
- Use **0** if unsure or if sentiment is mixed without clear dominance.
";

/// Full prompt for one statement: guidelines, the fenced statement, and the
/// reply-format instruction.
pub fn build_prompt(statement: &str) -> String {
    format!(
        "{RATING_GUIDELINES}\nNow rate this manager statement (below):\n\n---\n{statement}\n---\n\nReply with only the integer score (e.g., 2 or -1)."
    )
}
