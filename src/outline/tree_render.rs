//! ASCII tree rendering for outline hierarchies.

use crate::models::BulletPointsRequest;

const SUMMARY: char = '●';
const MESSAGE: char = '○';
const BODY: char = '·';

/// Render an outline as ASCII art, one line per bullet.
///
/// Example output:
/// ```text
/// Quarterly review
/// ├── ● Revenue grew
/// │   ├── ○ Enterprise deals closed
/// │   │   └── · Three renewals
/// │   └── ○ Churn fell
/// └── ● Costs are flat
/// ```
pub fn render_outline(outline: &BulletPointsRequest) -> String {
    let mut output = String::new();
    if let Some(title) = &outline.title {
        output.push_str(title);
        output.push('\n');
    }

    let summary_count = outline.summaries.len();
    for (i, summary) in outline.summaries.iter().enumerate() {
        let summary_last = i == summary_count - 1;
        push_line(&mut output, "", summary_last, SUMMARY, &summary.content);

        let message_prefix = continuation("", summary_last);
        let message_count = summary.messages.len();
        for (j, message) in summary.messages.iter().enumerate() {
            let message_last = j == message_count - 1;
            push_line(&mut output, &message_prefix, message_last, MESSAGE, &message.content);

            let body_prefix = continuation(&message_prefix, message_last);
            let body_count = message.bodies.len();
            for (k, body) in message.bodies.iter().enumerate() {
                push_line(&mut output, &body_prefix, k == body_count - 1, BODY, &body.content);
            }
        }
    }
    output
}

fn push_line(output: &mut String, prefix: &str, is_last: bool, symbol: char, text: &str) {
    let branch = if is_last { "└── " } else { "├── " };
    output.push_str(prefix);
    output.push_str(branch);
    output.push(symbol);
    output.push(' ');
    output.push_str(text);
    output.push('\n');
}

fn continuation(prefix: &str, is_last: bool) -> String {
    let continuation = if is_last { "    " } else { "│   " };
    format!("{}{}", prefix, continuation)
}
