//! Placeholder substitution
//!
//! `{name}` is replaced by the value bound to `name`; unknown placeholders
//! and unmatched braces are kept as written.

pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match values.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => output.push_str(value),
                    None => {
                        output.push('{');
                        output.push_str(name);
                        output.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                output.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    output.push_str(rest);
    output
}
