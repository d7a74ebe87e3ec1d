//! Server-side HTML for the comparison dashboard.

use crate::api::{CountDiff, DiffIndicator, ServiceComparison};

use super::dto::CompareQuery;

pub const PRIMARY: &str = "#2563EB";
pub const SUCCESS: &str = "#10B981";
pub const ERROR: &str = "#EF4444";
pub const WARNING: &str = "#F59E0B";
pub const TEXT_PRIMARY: &str = "#18181B";
pub const TEXT_SECONDARY: &str = "#71717A";
pub const TEXT_MUTED: &str = "#A1A1AA";
pub const BORDER: &str = "#E4E4E7";
pub const BACKGROUND: &str = "#FAFAFA";
pub const SURFACE: &str = "#FFFFFF";

pub const PROMPT_MESSAGE: &str = "Enter two service IDs above to compare.";
pub const SAME_IDS_MESSAGE: &str = "Please enter two different service IDs.";
pub const CONNECTION_HINT: &str =
    "Please check that the database connection is properly configured.";

/// A status message shown below the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

impl Notice {
    /// Notices shown when building the comparison failed.
    pub fn failure(message: impl std::fmt::Display) -> Vec<Notice> {
        vec![
            Notice::Error(format!("An error occurred: {}", message)),
            Notice::Info(CONNECTION_HINT.to_string()),
        ]
    }

    fn colors(&self) -> (&'static str, &'static str) {
        match self {
            Notice::Info(_) => (PRIMARY, "#EFF6FF"),
            Notice::Warning(_) => (WARNING, "#FFFBEB"),
            Notice::Error(_) => (ERROR, "#FEF2F2"),
        }
    }

    fn text(&self) -> &str {
        match self {
            Notice::Info(t) | Notice::Warning(t) | Notice::Error(t) => t,
        }
    }

    fn class(&self) -> &'static str {
        match self {
            Notice::Info(_) => "notice-info",
            Notice::Warning(_) => "notice-warning",
            Notice::Error(_) => "notice-error",
        }
    }
}

/// What the page shows under the form.
#[derive(Debug, Clone)]
pub enum PageContent {
    Notices(Vec<Notice>),
    Comparison(Box<ServiceComparison>),
}

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a count with `,` thousands separators, keeping the sign.
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Diff cell: red `▼ +N` when the first service is ahead, green `▲ -N`
/// when the second is, muted `0` when even.
pub fn diff_cell(diff: &CountDiff) -> String {
    match diff.indicator {
        DiffIndicator::FirstAhead => format!(
            r#"<span class="diff diff-first" style="color:{};font-weight:700;">&#x25BC; +{}</span>"#,
            ERROR,
            format_count(diff.value)
        ),
        DiffIndicator::SecondAhead => format!(
            r#"<span class="diff diff-second" style="color:{};font-weight:700;">&#x25B2; {}</span>"#,
            SUCCESS,
            format_count(diff.value)
        ),
        DiffIndicator::Even => format!(
            r#"<span class="diff diff-even" style="color:{};font-weight:700;">0</span>"#,
            TEXT_MUTED
        ),
    }
}

/// The single-row comparison table.
pub fn comparison_table(report: &ServiceComparison) -> String {
    let th = format!(
        "padding:10px 8px;font-size:0.65rem;font-weight:600;color:{};text-align:center;text-transform:uppercase;letter-spacing:0.03em;",
        TEXT_MUTED
    );
    let td = format!(
        "padding:16px 8px;font-size:1rem;font-weight:700;color:{};text-align:center;",
        TEXT_PRIMARY
    );
    let td_name = format!(
        "padding:16px 8px;font-size:0.85rem;font-weight:600;color:{};text-align:center;",
        TEXT_SECONDARY
    );
    let first = &report.first;
    let second = &report.second;
    let count = |v: u64| format_count(v as i64);

    format!(
        r#"<div class="card" style="background:{surface};border:1px solid {border};border-radius:8px;padding:1.25rem;overflow-x:auto;">
  <p style="font-size:0.75rem;font-weight:600;color:{muted};text-transform:uppercase;letter-spacing:0.05em;margin:0 0 12px 0;">Service Comparison</p>
  <table id="comparison" style="width:100%;border-collapse:collapse;">
    <thead>
      <tr style="border-bottom:2px solid {border};">
        <th style="{th}" rowspan="2">Username</th>
        <th style="{th}color:{primary};" colspan="3">Organic</th>
        <th style="{th}color:{primary};" colspan="3">Non-Organic</th>
      </tr>
      <tr style="border-bottom:1px solid {border};">
        <th style="{th}">Svc {a}</th>
        <th style="{th}">Svc {b}</th>
        <th style="{th}">Diff</th>
        <th style="{th}">Svc {a}</th>
        <th style="{th}">Svc {b}</th>
        <th style="{th}">Diff</th>
      </tr>
    </thead>
    <tbody>
      <tr>
        <td class="username" style="{td_name}">{owner}</td>
        <td style="{td}">{a_org}</td>
        <td style="{td}">{b_org}</td>
        <td style="{td}">{org_diff}</td>
        <td style="{td}">{a_non}</td>
        <td style="{td}">{b_non}</td>
        <td style="{td}">{non_diff}</td>
      </tr>
    </tbody>
  </table>
</div>"#,
        surface = SURFACE,
        border = BORDER,
        muted = TEXT_MUTED,
        primary = PRIMARY,
        th = th,
        td = td,
        td_name = td_name,
        a = first.service_id,
        b = second.service_id,
        owner = escape_html(&report.owner_display),
        a_org = count(first.counts.organic),
        b_org = count(second.counts.organic),
        org_diff = diff_cell(&report.organic_diff),
        a_non = count(first.counts.non_organic),
        b_non = count(second.counts.non_organic),
        non_diff = diff_cell(&report.non_organic_diff),
    )
}

fn notice_html(notice: &Notice) -> String {
    let (accent, background) = notice.colors();
    format!(
        r#"<div class="notice {}" style="border-left:4px solid {};background:{};color:{};padding:0.75rem 1rem;border-radius:6px;margin-bottom:0.5rem;font-size:0.875rem;">{}</div>"#,
        notice.class(),
        accent,
        background,
        TEXT_PRIMARY,
        escape_html(notice.text())
    )
}

fn input_html(label: &str, name: &str, value: Option<&str>) -> String {
    format!(
        r#"<label style="flex:1;font-size:0.8rem;font-weight:600;color:{};">{}
      <input type="number" name="{}" min="1" step="1" placeholder="Enter service ID" value="{}" style="display:block;width:100%;margin-top:4px;padding:8px;border:1px solid {};border-radius:6px;font-size:0.9rem;">
    </label>"#,
        TEXT_SECONDARY,
        label,
        name,
        escape_html(value.unwrap_or_default()),
        BORDER
    )
}

/// Render the whole dashboard page.
pub fn render_page(query: &CompareQuery, content: &PageContent) -> String {
    let mut body = String::new();
    match content {
        PageContent::Notices(notices) => {
            for notice in notices {
                body.push_str(&notice_html(notice));
                body.push('\n');
            }
        }
        PageContent::Comparison(report) => {
            body.push_str(&comparison_table(report));
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Service Comparison</title>
  <style>
    body {{ font-family: Inter, sans-serif; background: {bg}; margin: 0; }}
    main {{ max-width: 1200px; margin: 0 auto; padding: 1.5rem 1rem; }}
    hr {{ margin: 0.75rem 0; border: 0; border-top: 1px solid {border}; }}
  </style>
</head>
<body>
<main>
  <div style="margin-bottom:4px;"><span style="font-size:1.5rem;font-weight:700;color:{text};">Service Comparison</span></div>
  <span style="font-size:0.875rem;color:{secondary};">Compare two services side by side</span>
  <hr>
  <form method="get" action="/compare" style="display:flex;gap:0.75rem;align-items:flex-end;">
    {input_a}
    {input_b}
    <button type="submit" style="padding:9px 16px;background:{primary};color:#FFFFFF;border:0;border-radius:6px;font-weight:600;">Compare</button>
  </form>
  <hr>
  {body}
  <hr>
  <p style="text-align:center;font-size:0.75rem;color:{muted};">Service Comparison</p>
</main>
</body>
</html>
"#,
        bg = BACKGROUND,
        border = BORDER,
        text = TEXT_PRIMARY,
        secondary = TEXT_SECONDARY,
        muted = TEXT_MUTED,
        primary = PRIMARY,
        input_a = input_html("Service 1 ID", "service_a", query.service_a_text()),
        input_b = input_html("Service 2 ID", "service_b", query.service_b_text()),
        body = body,
    )
}
