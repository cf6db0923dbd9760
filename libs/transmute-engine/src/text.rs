//! Display text conversion: legacy `&`/`§` formatting codes to MiniMessage tags.

const NON_ITALIC: &str = "<!i>";

fn legacy_tag(code: char) -> Option<&'static str> {
    Some(match code.to_ascii_lowercase() {
        '0' => "<black>",
        '1' => "<dark_blue>",
        '2' => "<dark_green>",
        '3' => "<dark_aqua>",
        '4' => "<dark_red>",
        '5' => "<dark_purple>",
        '6' => "<gold>",
        '7' => "<gray>",
        '8' => "<dark_gray>",
        '9' => "<blue>",
        'a' => "<green>",
        'b' => "<aqua>",
        'c' => "<red>",
        'd' => "<light_purple>",
        'e' => "<yellow>",
        'f' => "<white>",
        'k' => "<obfuscated>",
        'l' => "<bold>",
        'm' => "<strikethrough>",
        'n' => "<underlined>",
        'o' => "<italic>",
        'r' => "<reset>",
        _ => return None,
    })
}

/// Replace legacy codes (`&a`, `§l`, `&#55ffaa`) with MiniMessage tags.
/// Unknown codes are left as written.
pub fn legacy_to_minimessage(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if (c == '&' || c == '§') && i + 1 < chars.len() {
            let next = chars[i + 1];
            if next == '#' && i + 8 <= chars.len() {
                let hex: String = chars[i + 2..i + 8].iter().collect();
                if hex.chars().all(|h| h.is_ascii_hexdigit()) {
                    out.push_str(&format!("<#{}>", hex.to_ascii_lowercase()));
                    i += 8;
                    continue;
                }
            }
            if let Some(tag) = legacy_tag(next) {
                out.push_str(tag);
                i += 2;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

/// Prefix `<!i>` unless the text is empty or already starts non-italic.
pub fn suppress_italic(text: &str) -> String {
    if text.is_empty() || text.starts_with(NON_ITALIC) || text.starts_with("<!italic>") {
        text.to_string()
    } else {
        format!("{NON_ITALIC}{text}")
    }
}

/// Legacy conversion plus optional italic suppression.
pub fn display_text(text: &str, disable_italic: bool) -> String {
    let converted = legacy_to_minimessage(text);
    if disable_italic {
        suppress_italic(&converted)
    } else {
        converted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_colors() {
        assert_eq!(legacy_to_minimessage("&cRed &lBold"), "<red>Red <bold>Bold");
        assert_eq!(legacy_to_minimessage("§aGreen"), "<green>Green");
        assert_eq!(legacy_to_minimessage("&#FF00aaHex"), "<#ff00aa>Hex");
    }

    #[test]
    fn test_unknown_codes_kept() {
        assert_eq!(legacy_to_minimessage("Fish & Chips &z"), "Fish & Chips &z");
        assert_eq!(legacy_to_minimessage("&#12"), "&#12");
        assert_eq!(legacy_to_minimessage("trailing &"), "trailing &");
    }

    #[test]
    fn test_italic_suppression() {
        assert_eq!(suppress_italic("<red>Sword"), "<!i><red>Sword");
        assert_eq!(suppress_italic("<!i>Sword"), "<!i>Sword");
        assert_eq!(suppress_italic(""), "");
        assert_eq!(display_text("&6Gold", true), "<!i><gold>Gold");
        assert_eq!(display_text("&6Gold", false), "<gold>Gold");
    }
}
