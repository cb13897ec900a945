//! `key=value` argument parsing shared by the subcommands

use serde_json::Value;

use crate::options::OptionBag;

/// Parse one `key=value` pair.
///
/// The value is read as JSON when it parses (`300`, `true`, `[100,200]`,
/// `{"function_type":"wasm","source":"blur.wasm"}`) and as a plain string
/// otherwise.
pub fn parse_pair(arg: &str) -> Result<(String, Value), String> {
    let (key, raw) =
        arg.split_once('=').ok_or_else(|| format!("expected key=value, got '{}'", arg))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", arg));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Parse a list of `key=value` pairs into a bag, in order.
pub fn parse_pairs<S: AsRef<str>>(args: &[S]) -> Result<OptionBag, String> {
    let mut bag = OptionBag::new();
    for arg in args {
        let (key, value) = parse_pair(arg.as_ref())?;
        bag.push(key, value);
    }
    Ok(bag)
}

/// Parse a comma-separated `k=v,k=v` list into a bag.
///
/// Commas inside brackets, braces or double quotes do not split.
pub fn parse_list(arg: &str) -> Result<OptionBag, String> {
    parse_pairs(&split_top_level(arg))
}

fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => depth -= 1,
            ',' if depth <= 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}
