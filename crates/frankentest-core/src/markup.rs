//! Inline markup: `{color}`, `{color,attr}`, `{reset}`.
//!
//! Tags made only of known color and attribute names are translated to ANSI SGR
//! sequences, or dropped when color is off. Anything else in braces is left as text,
//! so case names like `parse {x}` survive untouched.

fn sgr_code(name: &str) -> Option<u8> {
    let code = match name {
        "reset" => 0,
        "bold" => 1,
        "dim" => 2,
        "italic" => 3,
        "underline" => 4,
        "blink" => 5,
        "reverse" => 7,
        "hidden" => 8,
        "black" => 30,
        "red" => 31,
        "green" => 32,
        "yellow" => 33,
        "blue" => 34,
        "magenta" => 35,
        "cyan" => 36,
        "white" => 37,
        "gray" | "grey" => 90,
        "bright_red" => 91,
        "bright_green" => 92,
        "bright_yellow" => 93,
        "bright_blue" => 94,
        "bright_magenta" => 95,
        "bright_cyan" => 96,
        "bright_white" => 97,
        _ => return None,
    };
    Some(code)
}

/// SGR codes for a tag body, or `None` if it is not markup.
fn parse_tag(body: &str) -> Option<Vec<u8>> {
    if body.is_empty() {
        return None;
    }
    body.split(',').map(|part| sgr_code(part.trim())).collect()
}

/// Translate markup to ANSI (`color == true`) or remove it.
#[must_use]
pub fn render(text: &str, color: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => match parse_tag(&after[..close]) {
                Some(codes) => {
                    if color {
                        let joined: Vec<String> = codes.iter().map(u8::to_string).collect();
                        out.push_str("\x1b[");
                        out.push_str(&joined.join(";"));
                        out.push('m');
                    }
                    rest = &after[close + 1..];
                }
                // Not a tag: keep the brace and rescan from the next character.
                None => {
                    out.push('{');
                    rest = after;
                }
            },
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Remove markup tags.
#[must_use]
pub fn strip(text: &str) -> String {
    render(text, false)
}
