// ============================================================================
// Minimal CSV Field Handling
// ============================================================================
//
// Comma-separated fields, optionally wrapped in double quotes with `""` as an
// escaped quote. Records never span lines in the datasets we read.
//
// ============================================================================

/// Splits one line into fields.
pub fn split_record(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match (quoted, c) {
            (true, '"') if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            (true, '"') => quoted = false,
            (true, c) => field.push(c),
            (false, '"') if field.is_empty() => quoted = true,
            (false, ',') => fields.push(std::mem::take(&mut field)),
            (false, c) => field.push(c),
        }
    }

    if quoted {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field);
    Ok(fields)
}

/// Quotes `value` when it would not survive `split_record` as-is.
///
/// Values come from `split_record` on a single line, so they never hold a
/// line break.
pub fn quote_field(value: &str) -> String {
    if value.contains([',', '"']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
