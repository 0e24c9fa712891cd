use crate::report::SummaryData;

pub fn render_summary_json(data: &SummaryData<'_>) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(data)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/json.rs"]
mod tests;
