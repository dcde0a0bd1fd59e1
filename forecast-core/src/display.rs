use std::fmt;

use crate::{
    result::{ForecastResult, ResultKind},
    table::Table,
};

/// Rows shown per block.
pub const PREVIEW_ROWS: usize = 6;

/// Human-readable summary of a result, chosen by its [`ResultKind`].
pub fn render(result: &ForecastResult) -> String {
    result.to_string()
}

impl fmt::Display for ForecastResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ResultKind::Forecast => fmt_forecast(self, f),
        }
    }
}

fn fmt_forecast(result: &ForecastResult, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if result.blocks().is_empty() {
        writeln!(f, "No forecast blocks in response.")?;
    }

    for (name, table) in result.blocks() {
        writeln!(f, "${name} ({} rows)", table.len())?;
        fmt_table(f, table, PREVIEW_ROWS)?;
        writeln!(f)?;
    }

    for (name, value) in result.headers() {
        writeln!(f, "{name}: {value}")?;
    }

    if let Some(json) = result.json() {
        let keys: Vec<&str> = json
            .as_object()
            .map(|o| o.keys().map(String::as_str).collect())
            .unwrap_or_default();
        let keys = keys.join(", ");
        writeln!(f, "$json: {{{keys}}}")?;
    }

    Ok(())
}

fn fmt_table(f: &mut fmt::Formatter<'_>, table: &Table, max_rows: usize) -> fmt::Result {
    let columns = table.columns();
    if columns.is_empty() {
        return writeln!(f, "  <empty>");
    }

    let shown = table.len().min(max_rows);
    let cells: Vec<Vec<String>> = (0..shown)
        .filter_map(|idx| table.row(idx))
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|r| r[i].len())
                .chain([col.len()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    write_row(f, columns.iter().copied(), &widths)?;
    for row in &cells {
        write_row(f, row.iter().map(String::as_str), &widths)?;
    }

    if table.len() > max_rows {
        writeln!(f, "  ... {} more rows", table.len() - max_rows)?;
    }
    Ok(())
}

fn write_row<'a, I>(f: &mut fmt::Formatter<'_>, values: I, widths: &[usize]) -> fmt::Result
where
    I: Iterator<Item = &'a str>,
{
    f.write_str(" ")?;
    for (value, &width) in values.zip(widths) {
        write!(f, " {value:>width$}")?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        normalize::{normalize, normalize_currently},
        result::assemble,
    };
    use serde_json::json;

    fn result_for(raw: serde_json::Value) -> ForecastResult {
        let blocks = normalize(&raw).unwrap();
        let currently = normalize_currently(&raw).unwrap();
        assemble(blocks, currently, None, None)
    }

    #[test]
    fn names_every_block_with_row_count() {
        let data: Vec<_> = (0..10)
            .map(|i| json!({"time": i * 60, "precipIntensity": 0}))
            .collect();
        let out = render(&result_for(json!({
            "minutely": {"data": data},
            "currently": {"time": 0, "summary": "Clear"},
        })));

        assert!(out.contains("$minutely (10 rows)"));
        assert!(out.contains("$currently (1 rows)"));
        assert!(out.contains("... 4 more rows"));
        assert!(out.contains("1970-01-01T00:00:00Z"));
        assert!(out.find("$minutely").unwrap() < out.find("$currently").unwrap());
    }

    #[test]
    fn missing_cells_show_as_na() {
        let out = render(&result_for(json!({
            "hourly": {"data": [{"time": 0, "temperature": 50}, {"time": 60}]}
        })));
        assert!(out.contains("NA"));
    }

    #[test]
    fn columns_are_right_aligned() {
        let out = render(&result_for(json!({
            "hourly": {"data": [{"icon": "rain"}, {"icon": "partly-cloudy-day"}]}
        })));
        assert!(out.contains("               icon\n"));
        assert!(out.contains("               rain\n"));
    }

    #[test]
    fn empty_result() {
        let out = render(&result_for(json!({})));
        assert!(out.contains("No forecast blocks"));
    }

    #[test]
    fn shows_headers_and_json_keys() {
        let raw = json!({"latitude": 1, "flags": {}});
        let headers = vec![("X-Forecast-API-Calls".to_string(), "3".to_string())];
        let result = assemble(Vec::new(), None, Some(raw), Some(&headers));
        let out = render(&result);

        assert!(out.contains("x-forecast-api-calls: 3"));
        assert!(out.contains("$json: {latitude, flags}"));
    }
}
